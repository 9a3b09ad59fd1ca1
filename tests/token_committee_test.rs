mod common;

use committee_core::committee::{Committee, GovernanceEvent, Permission, TallyOption, VoteOption};
use committee_core::utils::DAY;
use committee_core::GovernanceError;
use common::*;

fn stakers_committee() -> Committee {
    Committee::new_token(
        7,
        "HARD token holders",
        vec![addr(1)],
        vec![Permission::TextOnly],
        "0.5".parse().unwrap(),
        2 * DAY,
        TallyOption::Deadline,
        "hard",
        "0.33".parse().unwrap(),
    )
    .unwrap()
}

fn chain_with_holders() -> Chain<committee_core::MemoryBackend> {
    let mut chain = Chain::new();
    chain.keeper.set_committee(stakers_committee()).unwrap();
    let ledger = chain.keeper.ledger_mut();
    ledger.set_balance("hard", addr(10), 500);
    ledger.set_balance("hard", addr(11), 300);
    ledger.set_balance("hard", addr(12), 200);
    ledger.set_balance("usdx", addr(13), 10_000);
    chain
}

#[test]
fn test_weights_are_frozen_at_submission() {
    let mut chain = chain_with_holders();
    let id = chain
        .keeper
        .submit_proposal(&chain.block, 7, text("Listing"), addr(99))
        .unwrap();

    // Balances moving after submission do not change the outcome
    chain.keeper.ledger_mut().set_balance("hard", addr(10), 0);
    chain.keeper.ledger_mut().set_balance("hard", addr(14), 1_000_000);

    chain.keeper.vote(&chain.block, id, addr(10), VoteOption::Yes).unwrap();
    assert!(matches!(
        chain.keeper.vote(&chain.block, id, addr(14), VoteOption::Yes),
        Err(GovernanceError::NotEligible { .. })
    ));
    assert!(matches!(
        chain.keeper.vote(&chain.block, id, addr(13), VoteOption::Yes),
        Err(GovernanceError::NotEligible { .. })
    ));

    let tally = chain.keeper.get_tally_result(id).unwrap();
    assert_eq!((tally.yes, tally.possible), (500, 1_000));

    let deadline = chain.keeper.get_proposal(id).unwrap().deadline;
    chain.advance(deadline - chain.block.time);
    assert_eq!(
        chain.end_block(),
        vec![GovernanceEvent::ProposalPassed {
            proposal_id: id,
            committee_id: 7
        }]
    );
}

#[test]
fn test_quorum_required() {
    let mut chain = chain_with_holders();
    let id = chain
        .keeper
        .submit_proposal(&chain.block, 7, text("Low turnout"), addr(1))
        .unwrap();
    // 200 of 1000 turned out, below the 0.33 quorum and the 0.5 threshold
    chain.keeper.vote(&chain.block, id, addr(12), VoteOption::Yes).unwrap();

    let deadline = chain.keeper.get_proposal(id).unwrap().deadline;
    chain.advance(deadline - chain.block.time);
    let events = chain.end_block();
    assert_eq!(events[0].name(), "proposal_failed");
}

#[test]
fn test_no_votes_do_not_count_as_yes() {
    let mut chain = chain_with_holders();
    let id = chain
        .keeper
        .submit_proposal(&chain.block, 7, text("Contested"), addr(1))
        .unwrap();
    chain.keeper.vote(&chain.block, id, addr(10), VoteOption::NoWithVeto).unwrap();
    chain.keeper.vote(&chain.block, id, addr(11), VoteOption::Yes).unwrap();
    chain.keeper.vote(&chain.block, id, addr(12), VoteOption::Abstain).unwrap();

    let tally = chain.keeper.get_tally_result(id).unwrap();
    assert_eq!(tally.no_with_veto, 500);
    assert_eq!(tally.cast, 1_000);

    let deadline = chain.keeper.get_proposal(id).unwrap().deadline;
    chain.advance(deadline - chain.block.time);
    assert_eq!(chain.end_block()[0].name(), "proposal_failed");
}
