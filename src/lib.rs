//! Permissioned committee governance for a replicated state machine.
//!
//! Committees with scoped permissions submit and vote on proposals; a tally
//! pass at the end of every block finalizes them and routes passed content
//! to registered handlers.

pub mod app;
pub mod committee;
pub mod config;
pub mod errors;
pub mod storage;
pub mod utils;

// Re-export commonly used items
pub use app::{AppState, BlockContext, InMemoryLedger, TokenLedger};
pub use committee::{
    Address, Committee, ContentKind, Decimal, Dispatcher, GenesisState, GovernanceEvent, Keeper, Permission,
    Proposal, ProposalContent, TallyOption, Vote, VoteOption,
};
pub use config::EngineConfig;
pub use errors::{ExecutionError, GovernanceError, GovernanceResult};
pub use storage::{AnyBackend, BackendChoice, KvBackend, MemoryBackend, SledBackend};
