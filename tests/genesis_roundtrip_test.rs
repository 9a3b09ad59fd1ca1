mod common;

use committee_core::committee::{GenesisState, VoteOption};
use committee_core::storage::SledBackend;
use common::*;
use tempfile::TempDir;

fn busy_chain() -> Chain<committee_core::MemoryBackend> {
    let mut chain = Chain::new();
    chain.keeper.set_committee(emergency_committee()).unwrap();
    chain.keeper.set_committee(auction_committee()).unwrap();
    let a = chain.keeper.submit_proposal(&chain.block, 1, text("Signal"), addr(9)).unwrap();
    let b = chain
        .keeper
        .submit_proposal(&chain.block, 2, param_change("auction", "bid_duration", "\"1200\""), addr(4))
        .unwrap();
    chain.keeper.vote(&chain.block, a, addr(1), VoteOption::Yes).unwrap();
    chain.keeper.vote(&chain.block, b, addr(5), VoteOption::Abstain).unwrap();
    chain.end_block();
    chain
}

#[test]
fn test_export_import_preserves_state() {
    let chain = busy_chain();
    let exported = chain.keeper.export_genesis().unwrap();
    exported.validate().unwrap();
    assert_eq!(exported.committees.len(), 2);
    assert_eq!(exported.proposals.len(), 2);
    assert_eq!(exported.votes.len(), 2);
    assert_eq!(exported.next_proposal_id, 3);

    let mut restored = Chain::new();
    restored.keeper.init_genesis(&exported).unwrap();
    let again = restored.keeper.export_genesis().unwrap();
    assert_eq!(again, exported);
    assert_eq!(again.digest().unwrap(), exported.digest().unwrap());
}

#[test]
fn test_genesis_file_into_sled_store() {
    let chain = busy_chain();
    let exported = chain.keeper.export_genesis().unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genesis.json");
    exported.save(&path).unwrap();

    let loaded = GenesisState::load(&path).unwrap();
    let mut restored = Chain::with_backend(SledBackend::open(&dir.path().join("db")).unwrap());
    restored.keeper.init_genesis(&loaded).unwrap();
    assert_eq!(restored.keeper.export_genesis().unwrap(), exported);

    // A second import into the same store is refused
    assert!(restored.keeper.init_genesis(&loaded).is_err());
}

#[test]
fn test_restored_chain_continues() {
    let chain = busy_chain();
    let exported = chain.keeper.export_genesis().unwrap();

    let mut restored = Chain::new();
    restored.block = chain.block;
    restored.keeper.init_genesis(&exported).unwrap();

    restored.keeper.vote(&restored.block, 1, addr(3), VoteOption::Yes).unwrap();
    let events = restored.end_block();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].proposal_id(), 1);

    let next = restored
        .keeper
        .submit_proposal(&restored.block, 1, text("After restore"), addr(1))
        .unwrap();
    assert_eq!(next, 3);
}
