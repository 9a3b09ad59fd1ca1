use std::collections::BTreeMap;

use log::{debug, info};

use crate::app::{AppState, BlockContext, TokenLedger};
use crate::committee::dispatcher::Dispatcher;
use crate::committee::events::GovernanceEvent;
use crate::committee::proposal::{Proposal, ProposalContent, Vote, VoteOption};
use crate::committee::store::ProposalStore;
use crate::committee::tally::TallyResult;
use crate::committee::types::{Address, TallyOption, VotingScheme};
use crate::config::GovernanceConfig;
use crate::errors::{GovernanceError, GovernanceResult};
use crate::storage::{KvBackend, WriteBatch};

/// The committee governance engine.
///
/// Owns the proposal store and is the only writer of committees, proposals
/// and votes. Every operation runs to completion on the caller's thread;
/// the host drives it with transactions in block order and one
/// [`Keeper::run_tally_pass`] per block.
pub struct Keeper<B: KvBackend, L: TokenLedger> {
    pub(crate) store: ProposalStore<B>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) ledger: L,
    pub(crate) state: AppState,
    pub(crate) limits: GovernanceConfig,
    pub(crate) events: Vec<GovernanceEvent>,
}

impl<B: KvBackend, L: TokenLedger> Keeper<B, L> {
    /// Create a keeper with the built-in handlers and default content limits
    pub fn new(backend: B, ledger: L) -> Self {
        Self {
            store: ProposalStore::new(backend),
            dispatcher: Dispatcher::with_default_handlers(),
            ledger,
            state: AppState::default(),
            limits: GovernanceConfig::default(),
            events: Vec::new(),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_app_state(mut self, state: AppState) -> Self {
        self.state = state;
        self
    }

    pub fn with_limits(mut self, limits: GovernanceConfig) -> Self {
        self.limits = limits;
        self
    }

    /// Submit `content` to a committee.
    ///
    /// The submitter need not be a member; the committee's permissions decide.
    pub fn submit_proposal(
        &mut self,
        block: &BlockContext,
        committee_id: u64,
        content: ProposalContent,
        submitter: Address,
    ) -> GovernanceResult<u64> {
        let committee = self
            .store
            .get_committee(committee_id)?
            .ok_or(GovernanceError::CommitteeNotFound(committee_id))?;

        let kind = content.kind();
        if !self.dispatcher.is_registered(kind) {
            return Err(GovernanceError::UnregisteredContent(kind.type_url().to_string()));
        }
        content.validate_basic(&self.limits)?;
        if !committee.permits(&content, block) {
            return Err(GovernanceError::PermissionDenied {
                committee_id,
                kind: kind.to_string(),
            });
        }

        let weight_snapshot = match &committee.voting {
            VotingScheme::Member => BTreeMap::new(),
            VotingScheme::Token { tally_denom, .. } => self
                .ledger
                .holders(tally_denom)
                .into_iter()
                .filter(|(_, weight)| *weight > 0)
                .collect(),
        };

        let id = self.store.next_proposal_id()?;
        let proposal = Proposal {
            id,
            committee_id,
            content,
            submitter,
            submit_time: block.time,
            deadline: block.time.saturating_add(committee.max_proposal_duration),
            weight_snapshot,
        };

        let mut batch = WriteBatch::new();
        self.store.stage_proposal(&mut batch, &proposal)?;
        self.store.stage_next_proposal_id(&mut batch, id + 1);
        self.store.commit(batch)?;

        info!(
            "Proposal {} ({}) submitted to committee {} by {}, deadline {}",
            id, kind, committee_id, submitter, proposal.deadline
        );
        self.events.push(GovernanceEvent::ProposalSubmitted {
            proposal_id: id,
            committee_id,
            submitter,
        });
        Ok(id)
    }

    /// Submit content given as a type URL and a JSON body
    pub fn submit_raw(
        &mut self,
        block: &BlockContext,
        committee_id: u64,
        type_url: &str,
        body: &str,
        submitter: Address,
    ) -> GovernanceResult<u64> {
        let content = ProposalContent::decode(type_url, body)?;
        self.submit_proposal(block, committee_id, content, submitter)
    }

    /// Record `voter`'s choice, replacing any earlier vote by the same voter.
    ///
    /// The vote is only counted by the next tally pass.
    pub fn vote(
        &mut self,
        block: &BlockContext,
        proposal_id: u64,
        voter: Address,
        option: VoteOption,
    ) -> GovernanceResult<()> {
        let proposal = self
            .store
            .get_proposal(proposal_id)?
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
        if !proposal.is_open_at(block.time) {
            return Err(GovernanceError::ProposalNotActive(proposal_id));
        }
        let committee = self
            .store
            .get_committee(proposal.committee_id)?
            .ok_or(GovernanceError::ProposalNotActive(proposal_id))?;

        let eligible = match &committee.voting {
            VotingScheme::Member => committee.has_member(&voter),
            VotingScheme::Token { .. } => proposal.snapshot_weight(&voter) > 0,
        };
        if !eligible {
            return Err(GovernanceError::NotEligible {
                proposal_id,
                voter: voter.to_string(),
            });
        }

        let mut batch = WriteBatch::new();
        self.store
            .stage_vote(&mut batch, &Vote::new(proposal_id, voter, option))?;
        if committee.tally_option == TallyOption::FirstPastThePost {
            self.store.stage_pending(&mut batch, proposal_id);
        }
        self.store.commit(batch)?;

        debug!("Vote {} by {} on proposal {}", option, voter, proposal_id);
        self.events.push(GovernanceEvent::VoteCast {
            proposal_id,
            committee_id: committee.id,
            voter,
            option,
        });
        Ok(())
    }

    // Queries

    pub fn get_proposal(&self, proposal_id: u64) -> GovernanceResult<Proposal> {
        self.store
            .get_proposal(proposal_id)?
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))
    }

    /// Every open proposal, ascending by id
    pub fn get_proposals(&self) -> GovernanceResult<Vec<Proposal>> {
        Ok(self.store.get_proposals()?)
    }

    pub fn get_proposals_by_committee(&self, committee_id: u64) -> GovernanceResult<Vec<Proposal>> {
        Ok(self.store.get_proposals_by_committee(committee_id)?)
    }

    pub fn get_votes_by_proposal(&self, proposal_id: u64) -> GovernanceResult<Vec<Vote>> {
        Ok(self.store.get_votes_by_proposal(proposal_id)?)
    }

    pub fn get_vote(&self, proposal_id: u64, voter: &Address) -> GovernanceResult<Option<Vote>> {
        Ok(self.store.get_vote(proposal_id, voter)?)
    }

    /// Current tally of a proposal without changing anything
    pub fn get_tally_result(&self, proposal_id: u64) -> GovernanceResult<TallyResult> {
        let proposal = self.get_proposal(proposal_id)?;
        let committee = self.get_committee(proposal.committee_id)?;
        let votes = self.store.get_votes_by_proposal(proposal_id)?;
        Ok(TallyResult::compute(&committee, &proposal, &votes))
    }

    pub fn next_proposal_id(&self) -> GovernanceResult<u64> {
        Ok(self.store.next_proposal_id()?)
    }

    /// Drain the events emitted since the last call, in emission order
    pub fn take_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn app_state(&self) -> &AppState {
        &self.state
    }

    /// Host access to the application state, e.g. to apply a due upgrade
    pub fn app_state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &ProposalStore<B> {
        &self.store
    }
}
