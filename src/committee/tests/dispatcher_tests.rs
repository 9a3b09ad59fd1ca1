use super::{block, member_committee, test_params, text};
use crate::app::AppState;
use crate::committee::dispatcher::{Dispatcher, ExecutionContext, RegistryOp};
use crate::committee::permission::Permission;
use crate::committee::proposal::{ContentKind, ParamChange, ProposalContent, UpgradePlan};
use crate::committee::types::TallyOption;
use crate::errors::ExecutionError;

fn params_content(changes: Vec<ParamChange>) -> ProposalContent {
    ProposalContent::ParamChange {
        title: "Params".to_string(),
        description: "Update".to_string(),
        changes,
    }
}

#[test]
fn test_default_handlers_cover_every_kind() {
    let dispatcher = Dispatcher::default();
    assert_eq!(dispatcher.registered_kinds(), ContentKind::ALL.to_vec());
    assert!(Dispatcher::empty().registered_kinds().is_empty());
}

#[test]
fn test_dispatch_works_on_a_copy() {
    let dispatcher = Dispatcher::with_default_handlers();
    let state = AppState::new(test_params());
    let content = params_content(vec![ParamChange::new("cdp", "debt_ratio", "\"2.25\"")]);

    let outcome = dispatcher.dispatch(&content, &block(1, 0), &state).unwrap();
    assert_eq!(outcome.state.params.get("cdp", "debt_ratio"), Some("\"2.25\""));
    assert_eq!(state.params.get("cdp", "debt_ratio"), Some("\"1.5\""));
    assert!(outcome.registry_ops.is_empty());
}

#[test]
fn test_dispatch_reports_handler_errors() {
    let dispatcher = Dispatcher::with_default_handlers();
    let state = AppState::new(test_params());

    let err = dispatcher
        .dispatch(
            &params_content(vec![ParamChange::new("cdp", "missing", "1")]),
            &block(1, 0),
            &state,
        )
        .unwrap_err();
    assert_eq!(
        err,
        ExecutionError::UnknownParameter {
            subspace: "cdp".to_string(),
            key: "missing".to_string()
        }
    );

    let cancel = ProposalContent::CancelSoftwareUpgrade {
        title: "Cancel".to_string(),
        description: "Nothing to cancel".to_string(),
    };
    assert_eq!(
        dispatcher.dispatch(&cancel, &block(1, 0), &state).unwrap_err(),
        ExecutionError::NoUpgradeScheduled
    );
}

#[test]
fn test_upgrade_handler_rejects_past_heights() {
    let dispatcher = Dispatcher::with_default_handlers();
    let content = ProposalContent::SoftwareUpgrade {
        title: "Upgrade".to_string(),
        description: "Late".to_string(),
        plan: UpgradePlan {
            name: "v3".to_string(),
            height: 10,
            info: String::new(),
        },
    };
    let err = dispatcher
        .dispatch(&content, &block(10, 0), &AppState::default())
        .unwrap_err();
    assert_eq!(err, ExecutionError::UpgradeHeightPassed { height: 10, current: 10 });
}

#[test]
fn test_committee_handlers_emit_registry_ops() {
    let dispatcher = Dispatcher::with_default_handlers();
    let committee = member_committee(4, TallyOption::Deadline, vec![Permission::TextOnly]);
    let change = ProposalContent::CommitteeChange {
        title: "Add".to_string(),
        description: "New committee".to_string(),
        new_committee: committee.clone(),
    };
    let outcome = dispatcher.dispatch(&change, &block(1, 0), &AppState::default()).unwrap();
    assert_eq!(outcome.registry_ops, vec![RegistryOp::Set(committee)]);

    let delete = ProposalContent::CommitteeDelete {
        title: "Remove".to_string(),
        description: "Old committee".to_string(),
        committee_id: 4,
    };
    let outcome = dispatcher.dispatch(&delete, &block(1, 0), &AppState::default()).unwrap();
    assert_eq!(outcome.registry_ops, vec![RegistryOp::Delete(4)]);
}

fn reject_everything(_: &ProposalContent, ctx: &mut ExecutionContext<'_>) -> Result<(), ExecutionError> {
    ctx.delete_committee(1);
    Err(ExecutionError::CommitteeMutation("refused".to_string()))
}

#[test]
fn test_custom_handler_replaces_default() {
    let mut dispatcher = Dispatcher::with_default_handlers();
    dispatcher.register(ContentKind::Text, reject_everything);
    let err = dispatcher
        .dispatch(&text("t"), &block(1, 0), &AppState::default())
        .unwrap_err();
    assert_eq!(err, ExecutionError::CommitteeMutation("refused".to_string()));

    dispatcher.unregister(ContentKind::Text);
    assert!(!dispatcher.is_registered(ContentKind::Text));
    assert!(dispatcher.dispatch(&text("t"), &block(1, 0), &AppState::default()).is_err());
}
