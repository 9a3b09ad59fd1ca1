use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::committee::decimal::Decimal;
use crate::errors::ExecutionError;

/// Read an unsigned integer from a JSON number or quoted string
pub fn parse_json_uint(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Read a decimal from a JSON number or quoted string
pub fn parse_json_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Type of a registered parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Uint,
    Decimal,
    Bool,
    Text,
    Json,
}

impl ParamKind {
    /// Check that `raw` is JSON of this kind
    pub fn check(&self, raw: &str) -> Result<(), String> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| format!("not valid JSON: {}", e))?;
        let ok = match self {
            ParamKind::Uint => parse_json_uint(&value).is_some(),
            ParamKind::Decimal => parse_json_decimal(&value).is_some(),
            ParamKind::Bool => value.is_boolean(),
            ParamKind::Text => value.is_string(),
            ParamKind::Json => true,
        };
        if ok {
            Ok(())
        } else {
            Err(format!("expected {:?} value, got {}", self, raw))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParamEntry {
    kind: ParamKind,
    value: String,
}

/// Registered module parameters, grouped by subspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamStore {
    subspaces: BTreeMap<String, BTreeMap<String, ParamEntry>>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self {
            subspaces: BTreeMap::new(),
        }
    }

    /// Register a parameter with its initial value
    pub fn register(
        &mut self,
        subspace: &str,
        key: &str,
        kind: ParamKind,
        initial: &str,
    ) -> Result<(), ExecutionError> {
        kind.check(initial).map_err(|reason| ExecutionError::InvalidParameterValue {
            subspace: subspace.to_string(),
            key: key.to_string(),
            reason,
        })?;
        self.subspaces
            .entry(subspace.to_string())
            .or_default()
            .insert(
                key.to_string(),
                ParamEntry {
                    kind,
                    value: initial.to_string(),
                },
            );
        Ok(())
    }

    pub fn get(&self, subspace: &str, key: &str) -> Option<&str> {
        self.subspaces
            .get(subspace)
            .and_then(|params| params.get(key))
            .map(|entry| entry.value.as_str())
    }

    /// Overwrite a registered parameter, rejecting unknown keys and ill-typed values
    pub fn set(&mut self, subspace: &str, key: &str, value: &str) -> Result<(), ExecutionError> {
        let entry = self
            .subspaces
            .get_mut(subspace)
            .and_then(|params| params.get_mut(key))
            .ok_or_else(|| ExecutionError::UnknownParameter {
                subspace: subspace.to_string(),
                key: key.to_string(),
            })?;
        entry
            .kind
            .check(value)
            .map_err(|reason| ExecutionError::InvalidParameterValue {
                subspace: subspace.to_string(),
                key: key.to_string(),
                reason,
            })?;
        entry.value = value.to_string();
        Ok(())
    }

    /// `(subspace, key, value)` for every parameter, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.subspaces.iter().flat_map(|(subspace, params)| {
            params
                .iter()
                .map(move |(key, entry)| (subspace.as_str(), key.as_str(), entry.value.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_checks_registration_and_kind() {
        let mut params = ParamStore::new();
        params.register("staking", "max_validators", ParamKind::Uint, "100").unwrap();

        params.set("staking", "max_validators", "\"125\"").unwrap();
        assert_eq!(params.get("staking", "max_validators"), Some("\"125\""));

        assert!(matches!(
            params.set("staking", "max_validators", "true"),
            Err(ExecutionError::InvalidParameterValue { .. })
        ));
        assert!(matches!(
            params.set("staking", "unbonding_time", "1"),
            Err(ExecutionError::UnknownParameter { .. })
        ));
        // Failed writes leave the previous value in place
        assert_eq!(params.get("staking", "max_validators"), Some("\"125\""));
    }

    #[test]
    fn test_json_number_helpers() {
        let v: serde_json::Value = serde_json::from_str("0.25").unwrap();
        assert_eq!(parse_json_decimal(&v), Some("0.25".parse().unwrap()));
        assert_eq!(parse_json_uint(&v), None);
        let v: serde_json::Value = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(parse_json_uint(&v), Some(7));
    }
}
