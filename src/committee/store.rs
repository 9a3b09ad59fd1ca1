use crate::committee::proposal::{Proposal, Vote};
use crate::committee::types::{Address, Committee};
use crate::storage::codec::{decode, encode, read_u64, u64_key};
use crate::storage::{KvBackend, StorageError, WriteBatch};

// Key families. Every numeric key component is big-endian so that prefix
// scans return records in ascending numeric order.
const COMMITTEE_PREFIX: u8 = 0x01;
const PROPOSAL_PREFIX: u8 = 0x02;
const VOTE_PREFIX: u8 = 0x03;
const NEXT_PROPOSAL_ID_KEY: u8 = 0x04;
/// committee id ++ proposal id -> ()
const BY_COMMITTEE_PREFIX: u8 = 0x05;
/// deadline ++ proposal id -> ()
const DEADLINE_PREFIX: u8 = 0x06;
/// proposal id -> (), proposals to re-tally on the next pass
const PENDING_PREFIX: u8 = 0x07;

/// The first id handed out by an empty store
pub const INITIAL_PROPOSAL_ID: u64 = 1;

fn key(prefix: u8, parts: &[&[u8]]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + parts.iter().map(|p| p.len()).sum::<usize>());
    key.push(prefix);
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

fn committee_key(id: u64) -> Vec<u8> {
    key(COMMITTEE_PREFIX, &[&u64_key(id)])
}

fn proposal_key(id: u64) -> Vec<u8> {
    key(PROPOSAL_PREFIX, &[&u64_key(id)])
}

fn vote_key(proposal_id: u64, voter: &Address) -> Vec<u8> {
    key(VOTE_PREFIX, &[&u64_key(proposal_id), voter.as_bytes()])
}

fn by_committee_key(committee_id: u64, proposal_id: u64) -> Vec<u8> {
    key(BY_COMMITTEE_PREFIX, &[&u64_key(committee_id), &u64_key(proposal_id)])
}

fn deadline_key(deadline: u64, proposal_id: u64) -> Vec<u8> {
    key(DEADLINE_PREFIX, &[&u64_key(deadline), &u64_key(proposal_id)])
}

fn pending_key(proposal_id: u64) -> Vec<u8> {
    key(PENDING_PREFIX, &[&u64_key(proposal_id)])
}

/// Keyed storage for committees, proposals and votes, with the secondary
/// indices the engine needs.
///
/// Reads go straight to the backend. Writes are staged into a [`WriteBatch`]
/// and applied with [`ProposalStore::commit`], so a caller can combine
/// several record changes into one atomic unit.
pub struct ProposalStore<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> ProposalStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn commit(&mut self, batch: WriteBatch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.backend.apply(batch)
    }

    /// Whether nothing governance-related has ever been written
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.backend.get(&[NEXT_PROPOSAL_ID_KEY])?.is_none()
            && self.backend.scan_prefix(&[COMMITTEE_PREFIX])?.is_empty()
            && self.backend.scan_prefix(&[PROPOSAL_PREFIX])?.is_empty())
    }

    // Committees

    pub fn get_committee(&self, id: u64) -> Result<Option<Committee>, StorageError> {
        self.backend
            .get(&committee_key(id))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// All committees, ascending by id
    pub fn get_committees(&self) -> Result<Vec<Committee>, StorageError> {
        self.backend
            .scan_prefix(&[COMMITTEE_PREFIX])?
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }

    pub fn stage_committee(&self, batch: &mut WriteBatch, committee: &Committee) -> Result<(), StorageError> {
        batch.put(committee_key(committee.id), encode(committee)?);
        Ok(())
    }

    pub fn stage_committee_delete(&self, batch: &mut WriteBatch, id: u64) {
        batch.delete(committee_key(id));
    }

    // Proposal ids

    pub fn next_proposal_id(&self) -> Result<u64, StorageError> {
        match self.backend.get(&[NEXT_PROPOSAL_ID_KEY])? {
            Some(bytes) => read_u64(&bytes, 0),
            None => Ok(INITIAL_PROPOSAL_ID),
        }
    }

    pub fn stage_next_proposal_id(&self, batch: &mut WriteBatch, id: u64) {
        batch.put(vec![NEXT_PROPOSAL_ID_KEY], u64_key(id).to_vec());
    }

    // Proposals

    pub fn get_proposal(&self, id: u64) -> Result<Option<Proposal>, StorageError> {
        self.backend
            .get(&proposal_key(id))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Every stored proposal, ascending by id. Stored proposals are the active ones.
    pub fn get_proposals(&self) -> Result<Vec<Proposal>, StorageError> {
        self.backend
            .scan_prefix(&[PROPOSAL_PREFIX])?
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }

    /// Ids of the proposals under a committee, ascending
    pub fn proposal_ids_by_committee(&self, committee_id: u64) -> Result<Vec<u64>, StorageError> {
        let prefix = key(BY_COMMITTEE_PREFIX, &[&u64_key(committee_id)]);
        self.backend
            .scan_prefix(&prefix)?
            .into_iter()
            .map(|(k, _)| read_u64(&k, 9))
            .collect()
    }

    pub fn get_proposals_by_committee(&self, committee_id: u64) -> Result<Vec<Proposal>, StorageError> {
        let mut proposals = Vec::new();
        for id in self.proposal_ids_by_committee(committee_id)? {
            if let Some(proposal) = self.get_proposal(id)? {
                proposals.push(proposal);
            }
        }
        Ok(proposals)
    }

    /// Ids of proposals whose deadline is at or before `time`, ascending by id
    pub fn proposal_ids_due(&self, time: u64) -> Result<Vec<u64>, StorageError> {
        let entries = match time.checked_add(1) {
            Some(end) => self.backend.scan_range(
                &key(DEADLINE_PREFIX, &[&u64_key(0)]),
                &key(DEADLINE_PREFIX, &[&u64_key(end)]),
            )?,
            None => self.backend.scan_prefix(&[DEADLINE_PREFIX])?,
        };
        let mut ids = entries
            .into_iter()
            .map(|(k, _)| read_u64(&k, 9))
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort_unstable();
        Ok(ids)
    }

    /// Stage the proposal record and its committee and deadline index entries
    pub fn stage_proposal(&self, batch: &mut WriteBatch, proposal: &Proposal) -> Result<(), StorageError> {
        batch.put(proposal_key(proposal.id), encode(proposal)?);
        batch.put(by_committee_key(proposal.committee_id, proposal.id), Vec::new());
        batch.put(deadline_key(proposal.deadline, proposal.id), Vec::new());
        Ok(())
    }

    /// Stage removal of a proposal together with every vote and index entry
    /// that refers to it
    pub fn stage_proposal_delete(&self, batch: &mut WriteBatch, proposal: &Proposal) -> Result<(), StorageError> {
        let vote_prefix = key(VOTE_PREFIX, &[&u64_key(proposal.id)]);
        for (vote_key, _) in self.backend.scan_prefix(&vote_prefix)? {
            batch.delete(vote_key);
        }
        batch.delete(proposal_key(proposal.id));
        batch.delete(by_committee_key(proposal.committee_id, proposal.id));
        batch.delete(deadline_key(proposal.deadline, proposal.id));
        batch.delete(pending_key(proposal.id));
        Ok(())
    }

    // Pending re-tally marks

    pub fn stage_pending(&self, batch: &mut WriteBatch, proposal_id: u64) {
        batch.put(pending_key(proposal_id), Vec::new());
    }

    pub fn stage_pending_clear(&self, batch: &mut WriteBatch, proposal_id: u64) {
        batch.delete(pending_key(proposal_id));
    }

    pub fn pending_proposal_ids(&self) -> Result<Vec<u64>, StorageError> {
        self.backend
            .scan_prefix(&[PENDING_PREFIX])?
            .into_iter()
            .map(|(k, _)| read_u64(&k, 1))
            .collect()
    }

    // Votes

    pub fn get_vote(&self, proposal_id: u64, voter: &Address) -> Result<Option<Vote>, StorageError> {
        self.backend
            .get(&vote_key(proposal_id, voter))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Votes on one proposal, ascending by voter
    pub fn get_votes_by_proposal(&self, proposal_id: u64) -> Result<Vec<Vote>, StorageError> {
        let prefix = key(VOTE_PREFIX, &[&u64_key(proposal_id)]);
        self.backend
            .scan_prefix(&prefix)?
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }

    /// Every vote, ascending by proposal id then voter
    pub fn get_votes(&self) -> Result<Vec<Vote>, StorageError> {
        self.backend
            .scan_prefix(&[VOTE_PREFIX])?
            .into_iter()
            .map(|(_, bytes)| decode(&bytes))
            .collect()
    }

    /// Stage a vote, replacing the voter's previous vote on the same proposal
    pub fn stage_vote(&self, batch: &mut WriteBatch, vote: &Vote) -> Result<(), StorageError> {
        batch.put(vote_key(vote.proposal_id, &vote.voter), encode(vote)?);
        Ok(())
    }
}
