use std::collections::BTreeMap;

use log::info;

use crate::committee::proposal::UpgradePlan;
use crate::errors::ExecutionError;

/// Holds at most one pending upgrade plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeScheduler {
    pending: Option<UpgradePlan>,
    /// Applied plan names and the height they were applied at
    applied: BTreeMap<String, u64>,
}

impl UpgradeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `plan`, replacing any pending plan
    pub fn schedule(&mut self, plan: UpgradePlan, current_height: u64) -> Result<(), ExecutionError> {
        if plan.height <= current_height {
            return Err(ExecutionError::UpgradeHeightPassed {
                height: plan.height,
                current: current_height,
            });
        }
        if self.applied.contains_key(&plan.name) {
            return Err(ExecutionError::UpgradeAlreadyApplied(plan.name));
        }
        info!("Scheduling upgrade {} at height {}", plan.name, plan.height);
        self.pending = Some(plan);
        Ok(())
    }

    /// Drop the pending plan
    pub fn cancel(&mut self) -> Result<UpgradePlan, ExecutionError> {
        self.pending.take().ok_or(ExecutionError::NoUpgradeScheduled)
    }

    /// Mark the pending plan applied once the host reaches its height
    pub fn mark_applied(&mut self, height: u64) -> Option<UpgradePlan> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|plan| plan.height <= height);
        if !due {
            return None;
        }
        let plan = self.pending.take()?;
        self.applied.insert(plan.name.clone(), height);
        Some(plan)
    }

    pub fn pending(&self) -> Option<&UpgradePlan> {
        self.pending.as_ref()
    }

    pub fn applied_height(&self, name: &str) -> Option<u64> {
        self.applied.get(name).copied()
    }
}
