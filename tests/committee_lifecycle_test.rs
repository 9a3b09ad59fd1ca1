mod common;

use committee_core::committee::{FailureReason, GovernanceEvent, VoteOption};
use committee_core::GovernanceError;
use common::*;

#[test]
fn test_emergency_committee_passes_text_proposal() {
    let mut chain = Chain::new();
    chain.keeper.set_committee(emergency_committee()).unwrap();

    let id = chain
        .keeper
        .submit_proposal(&chain.block, 1, text("Halt deposits"), addr(1))
        .unwrap();
    assert_eq!(id, 1);

    chain.keeper.vote(&chain.block, id, addr(1), VoteOption::Yes).unwrap();
    assert!(chain.end_block().is_empty());

    chain.keeper.vote(&chain.block, id, addr(2), VoteOption::Yes).unwrap();
    let events = chain.end_block();
    assert_eq!(
        events,
        vec![GovernanceEvent::ProposalPassed {
            proposal_id: 1,
            committee_id: 1
        }]
    );
    assert!(chain.keeper.get_proposals().unwrap().is_empty());
    assert!(chain.keeper.get_votes_by_proposal(1).unwrap().is_empty());
}

#[test]
fn test_scoped_committee_parameter_change() {
    let mut chain = Chain::new();
    chain.keeper.set_committee(auction_committee()).unwrap();

    // Outside the allowed range
    assert!(matches!(
        chain
            .keeper
            .submit_proposal(&chain.block, 2, param_change("auction", "bid_duration", "\"60\""), addr(4)),
        Err(GovernanceError::PermissionDenied { .. })
    ));
    // Not an allowed key
    assert!(matches!(
        chain.keeper.submit_proposal(
            &chain.block,
            2,
            param_change("cdp", "surplus_threshold", "\"1\""),
            addr(4)
        ),
        Err(GovernanceError::PermissionDenied { .. })
    ));

    let id = chain
        .keeper
        .submit_proposal(&chain.block, 2, param_change("auction", "bid_duration", "\"7200\""), addr(4))
        .unwrap();
    chain.keeper.vote(&chain.block, id, addr(4), VoteOption::Yes).unwrap();
    chain.keeper.vote(&chain.block, id, addr(5), VoteOption::Yes).unwrap();

    // Unanimous, but a deadline committee waits
    assert!(chain.end_block().is_empty());
    assert_eq!(chain.keeper.app_state().params.get("auction", "bid_duration"), Some("\"3600\""));

    let deadline = chain.keeper.get_proposal(id).unwrap().deadline;
    chain.advance(deadline - chain.block.time);
    let events = chain.end_block();
    assert_eq!(events[0].name(), "proposal_passed");
    assert_eq!(chain.keeper.app_state().params.get("auction", "bid_duration"), Some("\"7200\""));
}

#[test]
fn test_deadline_rejection_and_expiry() {
    let mut chain = Chain::new();
    chain.keeper.set_committee(auction_committee()).unwrap();
    let first = chain
        .keeper
        .submit_proposal(&chain.block, 2, param_change("auction", "bid_duration", "\"900\""), addr(4))
        .unwrap();
    let second = chain
        .keeper
        .submit_proposal(&chain.block, 2, param_change("auction", "bid_duration", "\"1800\""), addr(5))
        .unwrap();
    chain.keeper.vote(&chain.block, first, addr(4), VoteOption::Yes).unwrap();
    chain.keeper.vote(&chain.block, first, addr(5), VoteOption::No).unwrap();

    let deadline = chain.keeper.get_proposal(first).unwrap().deadline;
    // Both deadlines are equal; the first pass to see them is late
    chain.advance(deadline - chain.block.time + 1);
    let events = chain.end_block();
    assert_eq!(
        events,
        vec![
            GovernanceEvent::ProposalExpired {
                proposal_id: first,
                committee_id: 2
            },
            GovernanceEvent::ProposalExpired {
                proposal_id: second,
                committee_id: 2
            },
        ]
    );
}

#[test]
fn test_deadline_rejection_at_exact_deadline() {
    let mut chain = Chain::new();
    chain.keeper.set_committee(auction_committee()).unwrap();
    let id = chain
        .keeper
        .submit_proposal(&chain.block, 2, param_change("auction", "bid_duration", "\"900\""), addr(4))
        .unwrap();
    chain.keeper.vote(&chain.block, id, addr(4), VoteOption::Yes).unwrap();

    let deadline = chain.keeper.get_proposal(id).unwrap().deadline;
    chain.advance(deadline - chain.block.time);
    let events = chain.end_block();
    assert_eq!(
        events,
        vec![GovernanceEvent::ProposalFailed {
            proposal_id: id,
            committee_id: 2,
            reason: FailureReason::Rejected
        }]
    );
}

#[test]
fn test_emergency_committee_replaces_scoped_committee() {
    let mut chain = Chain::new();
    chain.keeper.set_committee(emergency_committee()).unwrap();
    chain.keeper.set_committee(auction_committee()).unwrap();
    let open = chain
        .keeper
        .submit_proposal(&chain.block, 2, param_change("auction", "bid_duration", "\"900\""), addr(4))
        .unwrap();

    let mut replacement = auction_committee();
    replacement.members = vec![addr(4), addr(6)];
    let change = committee_core::ProposalContent::CommitteeChange {
        title: "Rotate auction committee".to_string(),
        description: "Replace member 5".to_string(),
        new_committee: replacement.clone(),
    };
    let id = chain.keeper.submit_proposal(&chain.block, 1, change, addr(1)).unwrap();
    chain.keeper.vote(&chain.block, id, addr(1), VoteOption::Yes).unwrap();
    chain.keeper.vote(&chain.block, id, addr(3), VoteOption::Yes).unwrap();
    let events = chain.end_block();
    assert_eq!(events.len(), 1);

    assert_eq!(chain.keeper.get_committee(2).unwrap().members, replacement.members);
    // The new member may vote on the open proposal, the removed one may not
    chain.keeper.vote(&chain.block, open, addr(6), VoteOption::Yes).unwrap();
    assert!(matches!(
        chain.keeper.vote(&chain.block, open, addr(5), VoteOption::Yes),
        Err(GovernanceError::NotEligible { .. })
    ));
}

#[test]
fn test_sled_backed_chain() {
    let dir = tempfile::TempDir::new().unwrap();
    let backend = committee_core::SledBackend::open(dir.path()).unwrap();
    let mut chain = Chain::with_backend(backend);
    chain.keeper.set_committee(emergency_committee()).unwrap();

    let id = chain
        .keeper
        .submit_proposal(&chain.block, 1, param_change("cdp", "surplus_threshold", "\"750000\""), addr(2))
        .unwrap();
    for voter in [addr(1), addr(2), addr(3)] {
        chain.keeper.vote(&chain.block, id, voter, VoteOption::Yes).unwrap();
    }
    let events = chain.end_block();
    assert_eq!(events[0].name(), "proposal_passed");
    assert_eq!(
        chain.keeper.app_state().params.get("cdp", "surplus_threshold"),
        Some("\"750000\"")
    );
}
