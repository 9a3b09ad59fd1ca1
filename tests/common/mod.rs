#![allow(dead_code)]

use committee_core::app::{AppState, InMemoryLedger, ParamKind, ParamStore};
use committee_core::committee::{
    Address, AllowedParamChange, Committee, Keeper, ParamChange, Permission, ProposalContent, TallyOption,
    ValueRule,
};
use committee_core::storage::{KvBackend, MemoryBackend};
use committee_core::utils::{DAY, WEEK};
use committee_core::BlockContext;

pub const GENESIS_TIME: u64 = 1_700_000_000;
pub const BLOCK_TIME: u64 = 6;

pub fn addr(n: u8) -> Address {
    Address::repeat_byte(n)
}

pub fn text(title: &str) -> ProposalContent {
    ProposalContent::Text {
        title: title.to_string(),
        description: "integration test proposal".to_string(),
    }
}

pub fn param_change(subspace: &str, key: &str, value: &str) -> ProposalContent {
    ProposalContent::ParamChange {
        title: format!("Set {}/{}", subspace, key),
        description: "integration test parameter change".to_string(),
        changes: vec![ParamChange::new(subspace, key, value)],
    }
}

/// Emergency committee able to do anything, passing on a simple majority
pub fn emergency_committee() -> Committee {
    Committee::new_member(
        1,
        "emergency committee",
        vec![addr(1), addr(2), addr(3)],
        vec![Permission::Unconditional],
        "0.5".parse().unwrap(),
        WEEK,
        TallyOption::FirstPastThePost,
    )
    .unwrap()
}

/// Committee limited to tuning the auction bid duration, decided at the deadline
pub fn auction_committee() -> Committee {
    Committee::new_member(
        2,
        "auction risk committee",
        vec![addr(4), addr(5)],
        vec![Permission::ParamsChange {
            allowed: vec![AllowedParamChange::new(
                "auction",
                "bid_duration",
                ValueRule::UintRange { min: 600, max: 86_400 },
            )],
        }],
        "1".parse().unwrap(),
        3 * DAY,
        TallyOption::Deadline,
    )
    .unwrap()
}

pub fn app_state() -> AppState {
    let mut params = ParamStore::new();
    params.register("auction", "bid_duration", ParamKind::Uint, "\"3600\"").unwrap();
    params.register("cdp", "surplus_threshold", ParamKind::Uint, "\"500000\"").unwrap();
    AppState::new(params)
}

/// Drives a keeper block by block
pub struct Chain<B: KvBackend> {
    pub keeper: Keeper<B, InMemoryLedger>,
    pub block: BlockContext,
}

impl Chain<MemoryBackend> {
    pub fn new() -> Self {
        Self::with_backend(MemoryBackend::new())
    }
}

impl<B: KvBackend> Chain<B> {
    pub fn with_backend(backend: B) -> Self {
        let keeper = Keeper::new(backend, InMemoryLedger::new()).with_app_state(app_state());
        Chain {
            keeper,
            block: BlockContext::new(1, GENESIS_TIME),
        }
    }

    /// Run the tally pass for the current block, then move to the next one
    pub fn end_block(&mut self) -> Vec<committee_core::GovernanceEvent> {
        let events = self.keeper.run_tally_pass(&self.block).unwrap();
        self.block = self.block.next(BLOCK_TIME);
        events
    }

    /// Skip ahead `seconds` without running any tally pass
    pub fn advance(&mut self, seconds: u64) {
        self.block = BlockContext::new(self.block.height + 1, self.block.time + seconds);
    }
}
