use std::collections::BTreeMap;

use log::debug;

use crate::app::{AppState, BlockContext};
use crate::committee::proposal::{ContentKind, ProposalContent};
use crate::committee::types::Committee;
use crate::errors::ExecutionError;

/// Committee registry write requested by a handler.
///
/// Handlers never touch the registry directly; the engine applies these in
/// the same atomic commit as the rest of the proposal's effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOp {
    Set(Committee),
    Delete(u64),
}

/// What a handler sees while applying a proposal
pub struct ExecutionContext<'a> {
    pub block: &'a BlockContext,
    /// Scratch copy of the application state. Discarded if the handler fails.
    pub state: &'a mut AppState,
    registry_ops: Vec<RegistryOp>,
}

impl<'a> ExecutionContext<'a> {
    fn new(block: &'a BlockContext, state: &'a mut AppState) -> Self {
        Self {
            block,
            state,
            registry_ops: Vec::new(),
        }
    }

    pub fn set_committee(&mut self, committee: Committee) {
        self.registry_ops.push(RegistryOp::Set(committee));
    }

    pub fn delete_committee(&mut self, id: u64) {
        self.registry_ops.push(RegistryOp::Delete(id));
    }
}

/// Applies one kind of content to the application state
pub type ContentHandler = fn(&ProposalContent, &mut ExecutionContext<'_>) -> Result<(), ExecutionError>;

/// Effects of a successful dispatch, not yet committed
#[derive(Debug)]
pub struct DispatchOutcome {
    pub state: AppState,
    pub registry_ops: Vec<RegistryOp>,
}

/// Registry of content handlers keyed by content kind
#[derive(Clone)]
pub struct Dispatcher {
    handlers: BTreeMap<ContentKind, ContentHandler>,
}

impl Dispatcher {
    /// A dispatcher with no handlers; every content kind is unregistered
    pub fn empty() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// A dispatcher with a handler for every built-in content kind
    pub fn with_default_handlers() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register(ContentKind::Text, handle_text);
        dispatcher.register(ContentKind::ParamChange, handle_param_change);
        dispatcher.register(ContentKind::SoftwareUpgrade, handle_software_upgrade);
        dispatcher.register(ContentKind::CancelSoftwareUpgrade, handle_cancel_software_upgrade);
        dispatcher.register(ContentKind::CommitteeChange, handle_committee_change);
        dispatcher.register(ContentKind::CommitteeDelete, handle_committee_delete);
        dispatcher
    }

    /// Register (or replace) the handler for a kind
    pub fn register(&mut self, kind: ContentKind, handler: ContentHandler) {
        self.handlers.insert(kind, handler);
    }

    pub fn unregister(&mut self, kind: ContentKind) {
        self.handlers.remove(&kind);
    }

    pub fn is_registered(&self, kind: ContentKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn registered_kinds(&self) -> Vec<ContentKind> {
        self.handlers.keys().copied().collect()
    }

    /// Run the handler for `content` against a copy of `state`.
    ///
    /// Nothing observable changes until the caller commits the outcome.
    pub fn dispatch(
        &self,
        content: &ProposalContent,
        block: &BlockContext,
        state: &AppState,
    ) -> Result<DispatchOutcome, ExecutionError> {
        let kind = content.kind();
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| ExecutionError::UnexpectedContent {
                expected: "a registered kind".to_string(),
                actual: kind.to_string(),
            })?;

        let mut scratch = state.clone();
        let mut ctx = ExecutionContext::new(block, &mut scratch);
        handler(content, &mut ctx)?;
        let registry_ops = ctx.registry_ops;

        debug!("Dispatched {} content with {} registry ops", kind, registry_ops.len());
        Ok(DispatchOutcome {
            state: scratch,
            registry_ops,
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_default_handlers()
    }
}

fn unexpected(expected: ContentKind, content: &ProposalContent) -> ExecutionError {
    ExecutionError::UnexpectedContent {
        expected: expected.to_string(),
        actual: content.kind().to_string(),
    }
}

fn handle_text(content: &ProposalContent, _ctx: &mut ExecutionContext<'_>) -> Result<(), ExecutionError> {
    match content {
        ProposalContent::Text { .. } => Ok(()),
        other => Err(unexpected(ContentKind::Text, other)),
    }
}

fn handle_param_change(content: &ProposalContent, ctx: &mut ExecutionContext<'_>) -> Result<(), ExecutionError> {
    let changes = match content {
        ProposalContent::ParamChange { changes, .. } => changes,
        other => return Err(unexpected(ContentKind::ParamChange, other)),
    };
    for change in changes {
        ctx.state.params.set(&change.subspace, &change.key, &change.value)?;
    }
    Ok(())
}

fn handle_software_upgrade(content: &ProposalContent, ctx: &mut ExecutionContext<'_>) -> Result<(), ExecutionError> {
    match content {
        ProposalContent::SoftwareUpgrade { plan, .. } => {
            ctx.state.upgrades.schedule(plan.clone(), ctx.block.height)
        }
        other => Err(unexpected(ContentKind::SoftwareUpgrade, other)),
    }
}

fn handle_cancel_software_upgrade(
    content: &ProposalContent,
    ctx: &mut ExecutionContext<'_>,
) -> Result<(), ExecutionError> {
    match content {
        ProposalContent::CancelSoftwareUpgrade { .. } => ctx.state.upgrades.cancel().map(|_| ()),
        other => Err(unexpected(ContentKind::CancelSoftwareUpgrade, other)),
    }
}

fn handle_committee_change(content: &ProposalContent, ctx: &mut ExecutionContext<'_>) -> Result<(), ExecutionError> {
    match content {
        ProposalContent::CommitteeChange { new_committee, .. } => {
            new_committee
                .validate()
                .map_err(|e| ExecutionError::CommitteeMutation(e.to_string()))?;
            ctx.set_committee(new_committee.clone());
            Ok(())
        }
        other => Err(unexpected(ContentKind::CommitteeChange, other)),
    }
}

fn handle_committee_delete(content: &ProposalContent, ctx: &mut ExecutionContext<'_>) -> Result<(), ExecutionError> {
    match content {
        ProposalContent::CommitteeDelete { committee_id, .. } => {
            ctx.delete_committee(*committee_id);
            Ok(())
        }
        other => Err(unexpected(ContentKind::CommitteeDelete, other)),
    }
}
