use std::collections::BTreeMap;

use crate::committee::types::Address;

/// Read access to token balances, used to weight token-committee votes
#[cfg_attr(test, mockall::automock)]
pub trait TokenLedger {
    /// Every account with a non-zero balance of `denom`
    fn holders(&self, denom: &str) -> Vec<(Address, u64)>;
}

/// Balances kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: BTreeMap<String, BTreeMap<Address, u64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&mut self, denom: &str, account: Address, amount: u64) {
        let balances = self.balances.entry(denom.to_string()).or_default();
        if amount == 0 {
            balances.remove(&account);
        } else {
            balances.insert(account, amount);
        }
    }
}

impl TokenLedger for InMemoryLedger {
    fn holders(&self, denom: &str) -> Vec<(Address, u64)> {
        self.balances
            .get(denom)
            .map(|balances| balances.iter().map(|(a, v)| (*a, *v)).collect())
            .unwrap_or_default()
    }
}

