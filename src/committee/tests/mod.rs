use crate::app::{BlockContext, InMemoryLedger, ParamKind, ParamStore};
use crate::committee::decimal::Decimal;
use crate::committee::keeper::Keeper;
use crate::committee::permission::Permission;
use crate::committee::proposal::ProposalContent;
use crate::committee::types::{Address, Committee, TallyOption};
use crate::storage::MemoryBackend;
use crate::utils::DAY;

mod dispatcher_tests;

pub const GENESIS_TIME: u64 = 1_700_000_000;

pub type TestKeeper = Keeper<MemoryBackend, InMemoryLedger>;

pub fn addr(n: u8) -> Address {
    Address::repeat_byte(n)
}

pub fn half() -> Decimal {
    "0.5".parse().unwrap()
}

pub fn block(height: u64, time: u64) -> BlockContext {
    BlockContext::new(height, time)
}

pub fn genesis_block() -> BlockContext {
    block(1, GENESIS_TIME)
}

/// Three members, threshold 0.5, seven day window
pub fn member_committee(id: u64, tally_option: TallyOption, permissions: Vec<Permission>) -> Committee {
    Committee::new_member(
        id,
        "test committee",
        vec![addr(1), addr(2), addr(3)],
        permissions,
        half(),
        7 * DAY,
        tally_option,
    )
    .unwrap()
}

pub fn text(title: &str) -> ProposalContent {
    ProposalContent::Text {
        title: title.to_string(),
        description: "a description".to_string(),
    }
}

pub fn test_params() -> ParamStore {
    let mut params = ParamStore::new();
    params.register("auction", "bid_duration", ParamKind::Uint, "\"3600\"").unwrap();
    params.register("cdp", "debt_ratio", ParamKind::Decimal, "\"1.5\"").unwrap();
    params.register("cdp", "circuit_breaker", ParamKind::Bool, "false").unwrap();
    params
}

pub fn new_keeper() -> TestKeeper {
    Keeper::new(MemoryBackend::new(), InMemoryLedger::new())
}

/// A keeper holding one unconditional first-past-the-post committee with id 1
pub fn keeper_with_committee() -> TestKeeper {
    let mut keeper = new_keeper();
    keeper
        .set_committee(member_committee(
            1,
            TallyOption::FirstPastThePost,
            vec![Permission::Unconditional],
        ))
        .unwrap();
    keeper
}
