use std::collections::BTreeSet;

use log::{debug, error, info, warn};

use crate::app::{BlockContext, TokenLedger};
use crate::committee::dispatcher::RegistryOp;
use crate::committee::events::{FailureReason, GovernanceEvent};
use crate::committee::keeper::Keeper;
use crate::committee::proposal::Proposal;
use crate::committee::tally::{decide, TallyDecision, TallyResult};
use crate::committee::types::Committee;
use crate::errors::{ExecutionError, GovernanceResult};
use crate::storage::{KvBackend, WriteBatch};

impl<B: KvBackend, L: TokenLedger> Keeper<B, L> {
    /// End-of-block tally pass.
    ///
    /// Looks at every proposal whose deadline is at or before `block.time`
    /// plus every proposal marked for re-tally, in ascending id order, and
    /// finalizes those that are decided. Each finalization commits on its own,
    /// so a failing content handler never affects another proposal.
    ///
    /// The returned events are also appended to the keeper's event buffer. If
    /// storage fails partway, the error is returned and the buffer still holds
    /// the events of every finalization committed before the failure.
    pub fn run_tally_pass(&mut self, block: &BlockContext) -> GovernanceResult<Vec<GovernanceEvent>> {
        let mut candidates: BTreeSet<u64> = self.store.proposal_ids_due(block.time)?.into_iter().collect();
        candidates.extend(self.store.pending_proposal_ids()?);

        let mut emitted = Vec::new();
        for proposal_id in candidates {
            // An earlier finalization in this pass may have voided it
            let proposal = match self.store.get_proposal(proposal_id)? {
                Some(proposal) => proposal,
                None => continue,
            };
            let produced = self.finalize_one(block, &proposal)?;
            // Buffer as each outcome commits
            self.events.extend(produced.iter().cloned());
            emitted.extend(produced);
        }

        if !emitted.is_empty() {
            debug!("Tally pass at height {} finalized {} events", block.height, emitted.len());
        }
        Ok(emitted)
    }

    fn finalize_one(&mut self, block: &BlockContext, proposal: &Proposal) -> GovernanceResult<Vec<GovernanceEvent>> {
        let committee = match self.store.get_committee(proposal.committee_id)? {
            Some(committee) => committee,
            None => {
                error!(
                    "Proposal {} refers to missing committee {}, voiding",
                    proposal.id, proposal.committee_id
                );
                return Ok(vec![self.close(
                    proposal,
                    GovernanceEvent::ProposalVoided {
                        proposal_id: proposal.id,
                        committee_id: proposal.committee_id,
                    },
                )?]);
            }
        };

        let votes = self.store.get_votes_by_proposal(proposal.id)?;
        let tally = TallyResult::compute(&committee, proposal, &votes);
        match decide(&committee, proposal, &tally, block.time) {
            TallyDecision::Pending => {
                let mut batch = WriteBatch::new();
                self.store.stage_pending_clear(&mut batch, proposal.id);
                self.store.commit(batch)?;
                Ok(Vec::new())
            }
            TallyDecision::Pass => self.enact(block, &committee, proposal),
            TallyDecision::Reject => Ok(vec![self.close(
                proposal,
                GovernanceEvent::ProposalFailed {
                    proposal_id: proposal.id,
                    committee_id: committee.id,
                    reason: FailureReason::Rejected,
                },
            )?]),
            TallyDecision::Expire => Ok(vec![self.close(
                proposal,
                GovernanceEvent::ProposalExpired {
                    proposal_id: proposal.id,
                    committee_id: committee.id,
                },
            )?]),
        }
    }

    /// Delete a proposal with its votes and report `event`
    fn close(&mut self, proposal: &Proposal, event: GovernanceEvent) -> GovernanceResult<GovernanceEvent> {
        let mut batch = WriteBatch::new();
        self.store.stage_proposal_delete(&mut batch, proposal)?;
        self.store.commit(batch)?;
        info!("{}", event);
        Ok(event)
    }

    fn fail(&mut self, proposal: &Proposal, reason: FailureReason) -> GovernanceResult<GovernanceEvent> {
        self.close(
            proposal,
            GovernanceEvent::ProposalFailed {
                proposal_id: proposal.id,
                committee_id: proposal.committee_id,
                reason,
            },
        )
    }

    /// Apply a passed proposal's content. Registry writes, the application
    /// state swap and the proposal's removal land together or not at all.
    fn enact(
        &mut self,
        block: &BlockContext,
        committee: &Committee,
        proposal: &Proposal,
    ) -> GovernanceResult<Vec<GovernanceEvent>> {
        if !committee.permits(&proposal.content, block) {
            warn!(
                "Proposal {} passed but committee {} no longer permits {} content",
                proposal.id,
                committee.id,
                proposal.content.kind()
            );
            return Ok(vec![self.fail(proposal, FailureReason::PermissionRevoked)?]);
        }

        let outcome = match self.dispatcher.dispatch(&proposal.content, block, &self.state) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("Proposal {} passed but execution failed: {}", proposal.id, err);
                return Ok(vec![self.fail(proposal, FailureReason::ExecutionFailed(err.to_string()))?]);
            }
        };

        if let Err(err) = self.check_registry_ops(&outcome.registry_ops) {
            warn!("Proposal {} passed but execution failed: {}", proposal.id, err);
            return Ok(vec![self.fail(proposal, FailureReason::ExecutionFailed(err.to_string()))?]);
        }

        let mut batch = WriteBatch::new();
        let mut events = vec![GovernanceEvent::ProposalPassed {
            proposal_id: proposal.id,
            committee_id: committee.id,
        }];
        for op in &outcome.registry_ops {
            match op {
                RegistryOp::Set(new_committee) => self.stage_set_committee(&mut batch, new_committee)?,
                RegistryOp::Delete(id) => {
                    for voided in self.stage_delete_committee(&mut batch, *id)? {
                        if voided.id != proposal.id {
                            events.push(GovernanceEvent::ProposalVoided {
                                proposal_id: voided.id,
                                committee_id: voided.committee_id,
                            });
                        }
                    }
                }
            }
        }
        self.store.stage_proposal_delete(&mut batch, proposal)?;
        self.store.commit(batch)?;
        self.state = outcome.state;

        for event in &events {
            info!("{}", event);
        }
        Ok(events)
    }

    /// Registry writes are checked against the committed registry before
    /// anything is staged
    fn check_registry_ops(&self, ops: &[RegistryOp]) -> Result<(), ExecutionError> {
        for op in ops {
            match op {
                RegistryOp::Set(committee) => committee
                    .validate()
                    .map_err(|e| ExecutionError::CommitteeMutation(e.to_string()))?,
                RegistryOp::Delete(id) => {
                    let exists = self
                        .store
                        .get_committee(*id)
                        .map_err(|e| ExecutionError::CommitteeMutation(e.to_string()))?
                        .is_some();
                    if !exists {
                        return Err(ExecutionError::CommitteeMutation(format!(
                            "committee {} does not exist",
                            id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
