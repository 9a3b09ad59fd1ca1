use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use bincode::{Decode, Encode};
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::app::TokenLedger;
use crate::committee::keeper::Keeper;
use crate::committee::proposal::{Proposal, Vote};
use crate::committee::store::INITIAL_PROPOSAL_ID;
use crate::committee::types::{Committee, TallyOption};
use crate::errors::{GovernanceError, GovernanceResult};
use crate::storage::codec::encode;
use crate::storage::{KvBackend, WriteBatch};

fn default_next_proposal_id() -> u64 {
    INITIAL_PROPOSAL_ID
}

/// Complete governance state, as imported at chain start and exported for
/// upgrades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct GenesisState {
    #[serde(default = "default_next_proposal_id")]
    pub next_proposal_id: u64,
    #[serde(default)]
    pub committees: Vec<Committee>,
    #[serde(default)]
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            next_proposal_id: INITIAL_PROPOSAL_ID,
            committees: Vec::new(),
            proposals: Vec::new(),
            votes: Vec::new(),
        }
    }
}

impl GenesisState {
    pub fn new(
        next_proposal_id: u64,
        committees: Vec<Committee>,
        proposals: Vec<Proposal>,
        votes: Vec<Vote>,
    ) -> Self {
        Self {
            next_proposal_id,
            committees,
            proposals,
            votes,
        }
    }

    /// Check that the state could have been produced by a running engine
    pub fn validate(&self) -> GovernanceResult<()> {
        let invalid = |reason: String| GovernanceError::InvalidGenesis(reason);

        if self.next_proposal_id < INITIAL_PROPOSAL_ID {
            return Err(invalid(format!(
                "next proposal id must be at least {}",
                INITIAL_PROPOSAL_ID
            )));
        }

        let mut committees = BTreeMap::new();
        for committee in &self.committees {
            committee
                .validate()
                .map_err(|e| invalid(format!("committee {}: {}", committee.id, e)))?;
            if committees.insert(committee.id, committee).is_some() {
                return Err(invalid(format!("duplicate committee id {}", committee.id)));
            }
        }

        let mut proposal_ids = BTreeSet::new();
        for proposal in &self.proposals {
            if !proposal_ids.insert(proposal.id) {
                return Err(invalid(format!("duplicate proposal id {}", proposal.id)));
            }
            if proposal.id >= self.next_proposal_id {
                return Err(invalid(format!(
                    "proposal id {} is not below next proposal id {}",
                    proposal.id, self.next_proposal_id
                )));
            }
            if !committees.contains_key(&proposal.committee_id) {
                return Err(invalid(format!(
                    "proposal {} refers to unknown committee {}",
                    proposal.id, proposal.committee_id
                )));
            }
            if proposal.deadline < proposal.submit_time {
                return Err(invalid(format!("proposal {} has a deadline before its submission", proposal.id)));
            }
        }

        let mut voters = HashSet::new();
        for vote in &self.votes {
            if !proposal_ids.contains(&vote.proposal_id) {
                return Err(invalid(format!(
                    "vote by {} refers to unknown proposal {}",
                    vote.voter, vote.proposal_id
                )));
            }
            if !voters.insert((vote.proposal_id, vote.voter)) {
                return Err(invalid(format!(
                    "duplicate vote by {} on proposal {}",
                    vote.voter, vote.proposal_id
                )));
            }
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> GovernanceResult<Self> {
        serde_json::from_str(json).map_err(|e| GovernanceError::InvalidGenesis(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> GovernanceResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GovernanceError::InvalidGenesis(e.to_string()))
    }

    pub fn load(path: &Path) -> GovernanceResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn save(&self, path: &Path) -> GovernanceResult<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Hex SHA-256 of the binary encoding; equal states have equal digests
    pub fn digest(&self) -> GovernanceResult<String> {
        let bytes = encode(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

impl<B: KvBackend, L: TokenLedger> Keeper<B, L> {
    /// Load a validated genesis state into an empty store
    pub fn init_genesis(&mut self, genesis: &GenesisState) -> GovernanceResult<()> {
        genesis.validate()?;
        if !self.store.is_empty()? {
            return Err(GovernanceError::InvalidGenesis(
                "store already holds governance state".into(),
            ));
        }

        let fptp: HashSet<u64> = genesis
            .committees
            .iter()
            .filter(|c| c.tally_option == TallyOption::FirstPastThePost)
            .map(|c| c.id)
            .collect();

        let mut batch = WriteBatch::new();
        for committee in &genesis.committees {
            self.store.stage_committee(&mut batch, committee)?;
        }
        for proposal in &genesis.proposals {
            self.store.stage_proposal(&mut batch, proposal)?;
            // Imported votes may already decide these
            if fptp.contains(&proposal.committee_id) {
                self.store.stage_pending(&mut batch, proposal.id);
            }
        }
        for vote in &genesis.votes {
            self.store.stage_vote(&mut batch, vote)?;
        }
        self.store.stage_next_proposal_id(&mut batch, genesis.next_proposal_id);
        self.store.commit(batch)?;

        info!(
            "Genesis loaded: {} committees, {} proposals, {} votes, next proposal id {}",
            genesis.committees.len(),
            genesis.proposals.len(),
            genesis.votes.len(),
            genesis.next_proposal_id
        );
        Ok(())
    }

    /// Snapshot the full governance state, every collection ascending by id
    pub fn export_genesis(&self) -> GovernanceResult<GenesisState> {
        Ok(GenesisState {
            next_proposal_id: self.store.next_proposal_id()?,
            committees: self.store.get_committees()?,
            proposals: self.store.get_proposals()?,
            votes: self.store.get_votes()?,
        })
    }
}
