// Committee governance: the registry of committees, proposals and votes,
// permission evaluation, tallying, and execution of passed proposals.

pub mod decimal;
pub mod dispatcher;
pub mod events;
pub mod finalize;
pub mod genesis;
pub mod keeper;
pub mod permission;
pub mod proposal;
pub mod registry;
pub mod store;
pub mod tally;
pub mod types;

pub use decimal::{Decimal, DecimalParseError};
pub use dispatcher::{ContentHandler, DispatchOutcome, Dispatcher, ExecutionContext, RegistryOp};
pub use events::{FailureReason, GovernanceEvent};
pub use genesis::GenesisState;
pub use keeper::Keeper;
pub use permission::{AllowedParamChange, Permission, ValueRule};
pub use proposal::{ContentKind, ParamChange, Proposal, ProposalContent, UpgradePlan, Vote, VoteOption};
pub use store::{ProposalStore, INITIAL_PROPOSAL_ID};
pub use tally::{decide, TallyDecision, TallyResult};
pub use types::{Address, Committee, CommitteeValidationError, TallyOption, VotingScheme};

#[cfg(test)]
mod tests;
