use log::info;

use crate::app::TokenLedger;
use crate::committee::events::GovernanceEvent;
use crate::committee::keeper::Keeper;
use crate::committee::proposal::{ContentKind, Proposal};
use crate::committee::types::{Committee, TallyOption};
use crate::errors::{GovernanceError, GovernanceResult};
use crate::storage::{KvBackend, WriteBatch};

// Committee registry operations. Outside genesis, only the execution of a
// committee-change or committee-delete proposal calls the write side.
impl<B: KvBackend, L: TokenLedger> Keeper<B, L> {
    pub fn get_committee(&self, id: u64) -> GovernanceResult<Committee> {
        self.store
            .get_committee(id)?
            .ok_or(GovernanceError::CommitteeNotFound(id))
    }

    /// All committees, ascending by id
    pub fn get_committees(&self) -> GovernanceResult<Vec<Committee>> {
        Ok(self.store.get_committees()?)
    }

    /// Committees with some permission that could allow content of `kind`
    pub fn get_committees_permitting(&self, kind: ContentKind) -> GovernanceResult<Vec<Committee>> {
        Ok(self
            .store
            .get_committees()?
            .into_iter()
            .filter(|committee| committee.may_permit_kind(kind))
            .collect())
    }

    /// Insert or replace a committee after validating it
    pub fn set_committee(&mut self, committee: Committee) -> GovernanceResult<()> {
        let mut batch = WriteBatch::new();
        self.stage_set_committee(&mut batch, &committee)?;
        self.store.commit(batch)?;
        Ok(())
    }

    /// Remove a committee and void its open proposals.
    ///
    /// Returns the ids of the voided proposals.
    pub fn delete_committee(&mut self, id: u64) -> GovernanceResult<Vec<u64>> {
        let mut batch = WriteBatch::new();
        let voided = self.stage_delete_committee(&mut batch, id)?;
        self.store.commit(batch)?;

        let ids = voided.iter().map(|p| p.id).collect();
        self.events.extend(voided.into_iter().map(|p| GovernanceEvent::ProposalVoided {
            proposal_id: p.id,
            committee_id: p.committee_id,
        }));
        Ok(ids)
    }

    /// Stage a committee write. Open proposals under a replaced
    /// first-past-the-post committee are marked for re-tally, since the new
    /// members or threshold may already decide them.
    pub(crate) fn stage_set_committee(
        &self,
        batch: &mut WriteBatch,
        committee: &Committee,
    ) -> GovernanceResult<()> {
        committee.validate()?;
        self.store.stage_committee(batch, committee)?;
        if committee.tally_option == TallyOption::FirstPastThePost {
            for proposal_id in self.store.proposal_ids_by_committee(committee.id)? {
                self.store.stage_pending(batch, proposal_id);
            }
        }
        info!(
            "Committee {} written: {} members, threshold {}, {}",
            committee.id,
            committee.members.len(),
            committee.vote_threshold,
            committee.tally_option
        );
        Ok(())
    }

    /// Stage a committee removal along with all of its proposals and votes
    pub(crate) fn stage_delete_committee(
        &self,
        batch: &mut WriteBatch,
        id: u64,
    ) -> GovernanceResult<Vec<Proposal>> {
        if self.store.get_committee(id)?.is_none() {
            return Err(GovernanceError::CommitteeNotFound(id));
        }
        let proposals = self.store.get_proposals_by_committee(id)?;
        for proposal in &proposals {
            self.store.stage_proposal_delete(batch, proposal)?;
        }
        self.store.stage_committee_delete(batch, id);
        info!("Committee {} deleted, {} open proposals voided", id, proposals.len());
        Ok(proposals)
    }
}
