// Narrow views of the rest of the application that the governance engine
// reads from or writes to. The real host supplies its own implementations;
// the ones here back tests, simulations and the node binary.

pub mod ledger;
pub mod params;
pub mod upgrade;

use serde::{Deserialize, Serialize};

pub use ledger::{InMemoryLedger, TokenLedger};
#[cfg(test)]
pub use ledger::MockTokenLedger;
pub use params::{ParamKind, ParamStore};
pub use upgrade::UpgradeScheduler;

/// Height and time of the block being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: u64,
    /// Block time in seconds since the Unix epoch
    pub time: u64,
}

impl BlockContext {
    pub fn new(height: u64, time: u64) -> Self {
        Self { height, time }
    }

    /// The next block, `block_time` seconds later
    pub fn next(&self, block_time: u64) -> Self {
        Self {
            height: self.height.saturating_add(1),
            time: self.time.saturating_add(block_time),
        }
    }
}

/// Application state that passed proposals may modify
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub params: ParamStore,
    pub upgrades: UpgradeScheduler,
}

impl AppState {
    pub fn new(params: ParamStore) -> Self {
        Self {
            params,
            upgrades: UpgradeScheduler::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_block_advances_height_and_time() {
        let next = BlockContext::new(7, 1_000).next(6);
        assert_eq!(next, BlockContext::new(8, 1_006));
    }

    #[test]
    fn test_next_block_saturates_at_the_end_of_time() {
        let next = BlockContext::new(u64::MAX, u64::MAX - 2).next(6);
        assert_eq!(next, BlockContext::new(u64::MAX, u64::MAX));
    }
}
