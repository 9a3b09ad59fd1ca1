use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::app::params::{parse_json_decimal, parse_json_uint};
use crate::app::BlockContext;
use crate::committee::decimal::Decimal;
use crate::committee::proposal::{ContentKind, ProposalContent};

/// Predicate over a proposed parameter value (JSON text)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValueRule {
    /// Any well-formed JSON value
    Any,
    /// Unsigned integer (number or quoted) within `[min, max]`
    UintRange { min: u64, max: u64 },
    /// Decimal (number or quoted) within `[min, max]`
    DecimalRange { min: Decimal, max: Decimal },
    /// Equal to one of the listed JSON values
    OneOf { values: Vec<String> },
    /// A JSON boolean
    Bool,
}

impl ValueRule {
    pub fn accepts(&self, raw: &str) -> bool {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => return false,
        };

        match self {
            ValueRule::Any => true,
            ValueRule::UintRange { min, max } => {
                parse_json_uint(&value).is_some_and(|v| v >= *min && v <= *max)
            }
            ValueRule::DecimalRange { min, max } => {
                parse_json_decimal(&value).is_some_and(|d| d >= *min && d <= *max)
            }
            ValueRule::OneOf { values } => values.iter().any(|allowed| {
                serde_json::from_str::<serde_json::Value>(allowed)
                    .map(|allowed| allowed == value)
                    .unwrap_or(false)
            }),
            ValueRule::Bool => value.is_boolean(),
        }
    }
}

/// One parameter a committee may change, and what it may change it to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct AllowedParamChange {
    pub subspace: String,
    pub key: String,
    pub rule: ValueRule,
}

impl AllowedParamChange {
    pub fn new(subspace: impl Into<String>, key: impl Into<String>, rule: ValueRule) -> Self {
        Self {
            subspace: subspace.into(),
            key: key.into(),
            rule,
        }
    }
}

/// A predicate deciding whether a committee may consider some content.
///
/// Composites only ever hold other permissions, so evaluation is a finite
/// recursive walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Permission {
    /// Allows everything; for emergency committees
    Unconditional,
    /// Allows content with no executable payload
    TextOnly,
    /// Allows upgrade plans scheduled strictly above the current height, and cancellations
    SoftwareUpgrade,
    /// Allows parameter changes restricted to an allow set
    ParamsChange { allowed: Vec<AllowedParamChange> },
    /// Allows content every child allows. Empty allows nothing.
    AllOf { permissions: Vec<Permission> },
    /// Allows content any child allows. Empty allows nothing.
    AnyOf { permissions: Vec<Permission> },
}

impl Permission {
    pub fn name(&self) -> &'static str {
        match self {
            Permission::Unconditional => "unconditional",
            Permission::TextOnly => "text_only",
            Permission::SoftwareUpgrade => "software_upgrade",
            Permission::ParamsChange { .. } => "params_change",
            Permission::AllOf { .. } => "all_of",
            Permission::AnyOf { .. } => "any_of",
        }
    }

    /// Whether this permission allows `content` at the given block
    pub fn allows(&self, content: &ProposalContent, block: &BlockContext) -> bool {
        match self {
            Permission::Unconditional => true,
            Permission::TextOnly => matches!(content, ProposalContent::Text { .. }),
            Permission::SoftwareUpgrade => match content {
                ProposalContent::SoftwareUpgrade { plan, .. } => {
                    !plan.name.trim().is_empty() && plan.height > block.height
                }
                ProposalContent::CancelSoftwareUpgrade { .. } => true,
                _ => false,
            },
            Permission::ParamsChange { allowed } => match content {
                ProposalContent::ParamChange { changes, .. } => {
                    !changes.is_empty()
                        && changes.iter().all(|change| {
                            allowed.iter().any(|entry| {
                                entry.subspace == change.subspace
                                    && entry.key == change.key
                                    && entry.rule.accepts(&change.value)
                            })
                        })
                }
                _ => false,
            },
            Permission::AllOf { permissions } => {
                !permissions.is_empty() && permissions.iter().all(|p| p.allows(content, block))
            }
            Permission::AnyOf { permissions } => {
                permissions.iter().any(|p| p.allows(content, block))
            }
        }
    }

    /// Whether this permission could allow some content of `kind`,
    /// ignoring the content's fields and chain state
    pub fn may_allow_kind(&self, kind: ContentKind) -> bool {
        match self {
            Permission::Unconditional => true,
            Permission::TextOnly => kind == ContentKind::Text,
            Permission::SoftwareUpgrade => matches!(
                kind,
                ContentKind::SoftwareUpgrade | ContentKind::CancelSoftwareUpgrade
            ),
            Permission::ParamsChange { allowed } => {
                kind == ContentKind::ParamChange && !allowed.is_empty()
            }
            Permission::AllOf { permissions } => {
                !permissions.is_empty() && permissions.iter().all(|p| p.may_allow_kind(kind))
            }
            Permission::AnyOf { permissions } => {
                permissions.iter().any(|p| p.may_allow_kind(kind))
            }
        }
    }
}
