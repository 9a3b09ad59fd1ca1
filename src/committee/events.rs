use std::fmt;

use serde::{Deserialize, Serialize};

use crate::committee::proposal::VoteOption;
use crate::committee::types::Address;

/// Why a proposal was finalized as failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The tally did not reach the threshold at the deadline
    Rejected,
    /// The tally passed but the content handler failed; nothing was applied
    ExecutionFailed(String),
    /// The tally passed but the committee no longer permits the content
    PermissionRevoked,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Rejected => write!(f, "rejected"),
            FailureReason::ExecutionFailed(err) => write!(f, "execution_failed: {}", err),
            FailureReason::PermissionRevoked => write!(f, "permission_revoked"),
        }
    }
}

/// Events recorded in the block's event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GovernanceEvent {
    ProposalSubmitted {
        proposal_id: u64,
        committee_id: u64,
        submitter: Address,
    },
    VoteCast {
        proposal_id: u64,
        committee_id: u64,
        voter: Address,
        option: VoteOption,
    },
    ProposalPassed {
        proposal_id: u64,
        committee_id: u64,
    },
    ProposalFailed {
        proposal_id: u64,
        committee_id: u64,
        reason: FailureReason,
    },
    ProposalExpired {
        proposal_id: u64,
        committee_id: u64,
    },
    /// Removed because its committee was deleted
    ProposalVoided {
        proposal_id: u64,
        committee_id: u64,
    },
}

impl GovernanceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GovernanceEvent::ProposalSubmitted { .. } => "proposal_submitted",
            GovernanceEvent::VoteCast { .. } => "vote_cast",
            GovernanceEvent::ProposalPassed { .. } => "proposal_passed",
            GovernanceEvent::ProposalFailed { .. } => "proposal_failed",
            GovernanceEvent::ProposalExpired { .. } => "proposal_expired",
            GovernanceEvent::ProposalVoided { .. } => "proposal_voided",
        }
    }

    pub fn proposal_id(&self) -> u64 {
        match self {
            GovernanceEvent::ProposalSubmitted { proposal_id, .. }
            | GovernanceEvent::VoteCast { proposal_id, .. }
            | GovernanceEvent::ProposalPassed { proposal_id, .. }
            | GovernanceEvent::ProposalFailed { proposal_id, .. }
            | GovernanceEvent::ProposalExpired { proposal_id, .. }
            | GovernanceEvent::ProposalVoided { proposal_id, .. } => *proposal_id,
        }
    }

    pub fn committee_id(&self) -> u64 {
        match self {
            GovernanceEvent::ProposalSubmitted { committee_id, .. }
            | GovernanceEvent::VoteCast { committee_id, .. }
            | GovernanceEvent::ProposalPassed { committee_id, .. }
            | GovernanceEvent::ProposalFailed { committee_id, .. }
            | GovernanceEvent::ProposalExpired { committee_id, .. }
            | GovernanceEvent::ProposalVoided { committee_id, .. } => *committee_id,
        }
    }
}

impl fmt::Display for GovernanceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} proposal={} committee={}",
            self.name(),
            self.proposal_id(),
            self.committee_id()
        )?;
        match self {
            GovernanceEvent::ProposalSubmitted { submitter, .. } => write!(f, " submitter={}", submitter),
            GovernanceEvent::VoteCast { voter, option, .. } => write!(f, " voter={} option={}", voter, option),
            GovernanceEvent::ProposalFailed { reason, .. } => write!(f, " reason={}", reason),
            _ => Ok(()),
        }
    }
}
