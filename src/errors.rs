use thiserror::Error;

use crate::committee::types::CommitteeValidationError;
use crate::storage::StorageError;

/// Errors reported synchronously by the governance boundary operations.
///
/// Nothing is written to the store when one of these is returned.
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("Committee {0} not found")]
    CommitteeNotFound(u64),

    #[error("Committee {committee_id} does not permit {kind} proposals with this content")]
    PermissionDenied { committee_id: u64, kind: String },

    #[error("Content type not permitted here: {0}")]
    UnregisteredContent(String),

    #[error("Invalid proposal content: {0}")]
    InvalidContent(String),

    #[error("Proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("Proposal {0} is no longer accepting votes")]
    ProposalNotActive(u64),

    #[error("Voter {voter} is not eligible to vote on proposal {proposal_id}")]
    NotEligible { proposal_id: u64, voter: String },

    #[error("Invalid committee: {0}")]
    InvalidCommittee(#[from] CommitteeValidationError),

    #[error("Invalid genesis state: {0}")]
    InvalidGenesis(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a content handler while applying a passed proposal.
///
/// These never abort a tally pass; the proposal is finalized as failed instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Unknown parameter {subspace}/{key}")]
    UnknownParameter { subspace: String, key: String },

    #[error("Invalid value for parameter {subspace}/{key}: {reason}")]
    InvalidParameterValue {
        subspace: String,
        key: String,
        reason: String,
    },

    #[error("Upgrade height {height} must be above current height {current}")]
    UpgradeHeightPassed { height: u64, current: u64 },

    #[error("Upgrade {0} has already been applied")]
    UpgradeAlreadyApplied(String),

    #[error("No upgrade is scheduled")]
    NoUpgradeScheduled,

    #[error("Committee mutation rejected: {0}")]
    CommitteeMutation(String),

    #[error("Handler for {expected} received {actual} content")]
    UnexpectedContent { expected: String, actual: String },
}

pub type GovernanceResult<T> = Result<T, GovernanceError>;
