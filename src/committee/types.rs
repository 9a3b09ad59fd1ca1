use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::app::BlockContext;
use crate::committee::decimal::Decimal;
use crate::committee::permission::Permission;
use crate::committee::proposal::{ContentKind, ProposalContent};

/// Upper bound on a committee description
pub const MAX_COMMITTEE_DESCRIPTION_LENGTH: usize = 512;

/// Error type for committee configuration problems
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitteeValidationError {
    #[error("committee id must be positive")]
    ZeroId,
    #[error("committee must have at least one member")]
    NoMembers,
    #[error("duplicate member {0}")]
    DuplicateMember(Address),
    #[error("vote threshold {0} must be in (0, 1]")]
    ThresholdOutOfRange(Decimal),
    #[error("committee must have at least one permission")]
    NoPermissions,
    #[error("max proposal duration must be positive")]
    ZeroDuration,
    #[error("quorum {0} must be in [0, 1]")]
    QuorumOutOfRange(Decimal),
    #[error("token committee must name a tally denom")]
    EmptyTallyDenom,
    #[error("description exceeds 512 bytes")]
    DescriptionTooLong,
}

/// 20-byte account identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub const fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// An address with every byte set to `byte`
    pub const fn repeat_byte(byte: u8) -> Self {
        Address([byte; 20])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// When a committee's tally is allowed to finalize a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum TallyOption {
    /// Pass as soon as the threshold is reached, even before the deadline
    #[serde(rename = "FIRST_PAST_THE_POST")]
    FirstPastThePost,
    /// Evaluate once, at the deadline
    #[serde(rename = "DEADLINE")]
    Deadline,
}

impl fmt::Display for TallyOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TallyOption::FirstPastThePost => write!(f, "FIRST_PAST_THE_POST"),
            TallyOption::Deadline => write!(f, "DEADLINE"),
        }
    }
}

/// How a vote is weighted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VotingScheme {
    /// One vote per member
    Member,
    /// Weight is the voter's `tally_denom` balance when the proposal was submitted
    Token { tally_denom: String, quorum: Decimal },
}

/// A configured group with authority over a restricted class of proposals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Committee {
    pub id: u64,
    pub description: String,
    pub members: Vec<Address>,
    pub permissions: Vec<Permission>,
    pub vote_threshold: Decimal,
    /// Voting window in seconds, inherited by every proposal at submission
    pub max_proposal_duration: u64,
    pub tally_option: TallyOption,
    pub voting: VotingScheme,
}

impl Committee {
    /// Create a validated one-member-one-vote committee
    pub fn new_member(
        id: u64,
        description: impl Into<String>,
        members: Vec<Address>,
        permissions: Vec<Permission>,
        vote_threshold: Decimal,
        max_proposal_duration: u64,
        tally_option: TallyOption,
    ) -> Result<Self, CommitteeValidationError> {
        let committee = Committee {
            id,
            description: description.into(),
            members,
            permissions,
            vote_threshold,
            max_proposal_duration,
            tally_option,
            voting: VotingScheme::Member,
        };
        committee.validate()?;
        Ok(committee)
    }

    /// Create a validated token-weighted committee
    #[allow(clippy::too_many_arguments)]
    pub fn new_token(
        id: u64,
        description: impl Into<String>,
        members: Vec<Address>,
        permissions: Vec<Permission>,
        vote_threshold: Decimal,
        max_proposal_duration: u64,
        tally_option: TallyOption,
        tally_denom: impl Into<String>,
        quorum: Decimal,
    ) -> Result<Self, CommitteeValidationError> {
        let committee = Committee {
            id,
            description: description.into(),
            members,
            permissions,
            vote_threshold,
            max_proposal_duration,
            tally_option,
            voting: VotingScheme::Token {
                tally_denom: tally_denom.into(),
                quorum,
            },
        };
        committee.validate()?;
        Ok(committee)
    }

    /// Check the configuration invariants enforced on every write
    pub fn validate(&self) -> Result<(), CommitteeValidationError> {
        if self.id == 0 {
            return Err(CommitteeValidationError::ZeroId);
        }
        if self.description.len() > MAX_COMMITTEE_DESCRIPTION_LENGTH {
            return Err(CommitteeValidationError::DescriptionTooLong);
        }
        if self.members.is_empty() {
            return Err(CommitteeValidationError::NoMembers);
        }
        let mut seen = HashSet::with_capacity(self.members.len());
        for member in &self.members {
            if !seen.insert(member) {
                return Err(CommitteeValidationError::DuplicateMember(*member));
            }
        }
        if self.vote_threshold.is_zero() || self.vote_threshold > Decimal::ONE {
            return Err(CommitteeValidationError::ThresholdOutOfRange(self.vote_threshold));
        }
        if self.permissions.is_empty() {
            return Err(CommitteeValidationError::NoPermissions);
        }
        if self.max_proposal_duration == 0 {
            return Err(CommitteeValidationError::ZeroDuration);
        }
        if let VotingScheme::Token { tally_denom, quorum } = &self.voting {
            if tally_denom.trim().is_empty() {
                return Err(CommitteeValidationError::EmptyTallyDenom);
            }
            if *quorum > Decimal::ONE {
                return Err(CommitteeValidationError::QuorumOutOfRange(*quorum));
            }
        }
        Ok(())
    }

    pub fn has_member(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    /// Submission is allowed iff at least one configured permission allows the content
    pub fn permits(&self, content: &ProposalContent, block: &BlockContext) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.allows(content, block))
    }

    /// Whether some permission could ever allow content of this kind
    pub fn may_permit_kind(&self, kind: ContentKind) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.may_allow_kind(kind))
    }
}
