use std::collections::BTreeMap;
use std::fmt;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::committee::types::{Address, Committee};
use crate::config::GovernanceConfig;
use crate::errors::GovernanceError;

/// Discriminator for [`ProposalContent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    ParamChange,
    SoftwareUpgrade,
    CancelSoftwareUpgrade,
    CommitteeChange,
    CommitteeDelete,
}

impl ContentKind {
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Text,
        ContentKind::ParamChange,
        ContentKind::SoftwareUpgrade,
        ContentKind::CancelSoftwareUpgrade,
        ContentKind::CommitteeChange,
        ContentKind::CommitteeDelete,
    ];

    /// Tag used in the JSON encoding of the content
    pub fn tag(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::ParamChange => "param_change",
            ContentKind::SoftwareUpgrade => "software_upgrade",
            ContentKind::CancelSoftwareUpgrade => "cancel_software_upgrade",
            ContentKind::CommitteeChange => "committee_change",
            ContentKind::CommitteeDelete => "committee_delete",
        }
    }

    /// Stable type URL used by external submitters
    pub fn type_url(&self) -> &'static str {
        match self {
            ContentKind::Text => "/committee.v1.TextProposal",
            ContentKind::ParamChange => "/committee.v1.ParameterChangeProposal",
            ContentKind::SoftwareUpgrade => "/committee.v1.SoftwareUpgradeProposal",
            ContentKind::CancelSoftwareUpgrade => "/committee.v1.CancelSoftwareUpgradeProposal",
            ContentKind::CommitteeChange => "/committee.v1.CommitteeChangeProposal",
            ContentKind::CommitteeDelete => "/committee.v1.CommitteeDeleteProposal",
        }
    }

    pub fn from_type_url(type_url: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_url() == type_url)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A single parameter write; `value` is JSON text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ParamChange {
    pub subspace: String,
    pub key: String,
    pub value: String,
}

impl ParamChange {
    pub fn new(subspace: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            subspace: subspace.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A scheduled software upgrade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct UpgradePlan {
    pub name: String,
    pub height: u64,
    #[serde(default)]
    pub info: String,
}

/// The typed payload of a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProposalContent {
    Text {
        title: String,
        description: String,
    },
    ParamChange {
        title: String,
        description: String,
        changes: Vec<ParamChange>,
    },
    SoftwareUpgrade {
        title: String,
        description: String,
        plan: UpgradePlan,
    },
    CancelSoftwareUpgrade {
        title: String,
        description: String,
    },
    CommitteeChange {
        title: String,
        description: String,
        new_committee: Committee,
    },
    CommitteeDelete {
        title: String,
        description: String,
        committee_id: u64,
    },
}

impl ProposalContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            ProposalContent::Text { .. } => ContentKind::Text,
            ProposalContent::ParamChange { .. } => ContentKind::ParamChange,
            ProposalContent::SoftwareUpgrade { .. } => ContentKind::SoftwareUpgrade,
            ProposalContent::CancelSoftwareUpgrade { .. } => ContentKind::CancelSoftwareUpgrade,
            ProposalContent::CommitteeChange { .. } => ContentKind::CommitteeChange,
            ProposalContent::CommitteeDelete { .. } => ContentKind::CommitteeDelete,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ProposalContent::Text { title, .. }
            | ProposalContent::ParamChange { title, .. }
            | ProposalContent::SoftwareUpgrade { title, .. }
            | ProposalContent::CancelSoftwareUpgrade { title, .. }
            | ProposalContent::CommitteeChange { title, .. }
            | ProposalContent::CommitteeDelete { title, .. } => title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ProposalContent::Text { description, .. }
            | ProposalContent::ParamChange { description, .. }
            | ProposalContent::SoftwareUpgrade { description, .. }
            | ProposalContent::CancelSoftwareUpgrade { description, .. }
            | ProposalContent::CommitteeChange { description, .. }
            | ProposalContent::CommitteeDelete { description, .. } => description,
        }
    }

    /// Stateless checks performed before any permission evaluation
    pub fn validate_basic(&self, limits: &GovernanceConfig) -> Result<(), GovernanceError> {
        let invalid = |reason: String| -> Result<(), GovernanceError> {
            Err(GovernanceError::InvalidContent(reason))
        };

        if self.title().trim().is_empty() {
            return invalid("title cannot be blank".into());
        }
        if self.title().len() > limits.max_title_length {
            return invalid(format!("title longer than {} bytes", limits.max_title_length));
        }
        if self.description().trim().is_empty() {
            return invalid("description cannot be blank".into());
        }
        if self.description().len() > limits.max_description_length {
            return invalid(format!(
                "description longer than {} bytes",
                limits.max_description_length
            ));
        }

        match self {
            ProposalContent::ParamChange { changes, .. } => {
                if changes.is_empty() {
                    return invalid("parameter change proposal has no changes".into());
                }
                if changes.len() > limits.max_param_changes {
                    return invalid(format!(
                        "more than {} parameter changes",
                        limits.max_param_changes
                    ));
                }
                for change in changes {
                    if change.subspace.is_empty() || change.key.is_empty() {
                        return invalid("parameter change must name a subspace and key".into());
                    }
                    if serde_json::from_str::<serde_json::Value>(&change.value).is_err() {
                        return invalid(format!(
                            "value for {}/{} is not valid JSON",
                            change.subspace, change.key
                        ));
                    }
                }
            }
            ProposalContent::SoftwareUpgrade { plan, .. } => {
                if plan.name.trim().is_empty() {
                    return invalid("upgrade plan name cannot be blank".into());
                }
                if plan.height == 0 {
                    return invalid("upgrade plan height must be positive".into());
                }
            }
            ProposalContent::CommitteeChange { new_committee, .. } => {
                new_committee
                    .validate()
                    .map_err(|e| GovernanceError::InvalidContent(format!("new committee: {}", e)))?;
            }
            ProposalContent::CommitteeDelete { committee_id, .. } => {
                if *committee_id == 0 {
                    return invalid("committee id must be positive".into());
                }
            }
            ProposalContent::Text { .. } | ProposalContent::CancelSoftwareUpgrade { .. } => {}
        }

        Ok(())
    }

    /// Decode content supplied as `(type_url, JSON body)`.
    ///
    /// Unknown type URLs fail with [`GovernanceError::UnregisteredContent`].
    pub fn decode(type_url: &str, body: &str) -> Result<Self, GovernanceError> {
        let kind = ContentKind::from_type_url(type_url)
            .ok_or_else(|| GovernanceError::UnregisteredContent(type_url.to_string()))?;

        let mut value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| GovernanceError::InvalidContent(e.to_string()))?;
        let object = value.as_object_mut().ok_or_else(|| {
            GovernanceError::InvalidContent("content body must be a JSON object".into())
        })?;
        object.insert("type".into(), serde_json::Value::String(kind.tag().into()));

        serde_json::from_value(value).map_err(|e| GovernanceError::InvalidContent(e.to_string()))
    }
}

/// A governance action awaiting a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Proposal {
    pub id: u64,
    pub committee_id: u64,
    pub content: ProposalContent,
    pub submitter: Address,
    pub submit_time: u64,
    /// `submit_time + max_proposal_duration`, fixed at submission
    pub deadline: u64,
    /// Voter weights captured at submission (token committees only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weight_snapshot: BTreeMap<Address, u64>,
}

impl Proposal {
    /// Votes are accepted up to and including the deadline
    pub fn is_open_at(&self, time: u64) -> bool {
        time <= self.deadline
    }

    pub fn has_expired_by(&self, time: u64) -> bool {
        time > self.deadline
    }

    pub fn snapshot_weight(&self, voter: &Address) -> u64 {
        self.weight_snapshot.get(voter).copied().unwrap_or(0)
    }
}

/// A voter's choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum VoteOption {
    Yes,
    No,
    Abstain,
    NoWithVeto,
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteOption::Yes => write!(f, "yes"),
            VoteOption::No => write!(f, "no"),
            VoteOption::Abstain => write!(f, "abstain"),
            VoteOption::NoWithVeto => write!(f, "no_with_veto"),
        }
    }
}

/// The live vote of one voter on one proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Vote {
    pub proposal_id: u64,
    pub voter: Address,
    pub option: VoteOption,
}

impl Vote {
    pub fn new(proposal_id: u64, voter: Address, option: VoteOption) -> Self {
        Self {
            proposal_id,
            voter,
            option,
        }
    }
}
