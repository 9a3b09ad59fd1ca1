use serde::{Deserialize, Serialize};

use crate::committee::proposal::{Proposal, Vote, VoteOption};
use crate::committee::types::{Committee, TallyOption, VotingScheme};

/// Weighted vote totals for one proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TallyResult {
    pub yes: u64,
    pub no: u64,
    pub abstain: u64,
    pub no_with_veto: u64,
    /// Sum of all cast weight
    pub cast: u64,
    /// Total weight that could possibly be cast
    pub possible: u64,
}

impl TallyResult {
    /// Pure function of the stored votes, the committee and the proposal's snapshot
    pub fn compute(committee: &Committee, proposal: &Proposal, votes: &[Vote]) -> Self {
        let mut tally = TallyResult::default();

        match &committee.voting {
            VotingScheme::Member => {
                tally.possible = committee.members.len() as u64;
            }
            VotingScheme::Token { .. } => {
                tally.possible = proposal
                    .weight_snapshot
                    .values()
                    .fold(0u64, |acc, w| acc.saturating_add(*w));
            }
        }

        for vote in votes {
            let weight = match &committee.voting {
                // Votes from accounts removed by a committee change no longer count
                VotingScheme::Member => u64::from(committee.has_member(&vote.voter)),
                VotingScheme::Token { .. } => proposal.snapshot_weight(&vote.voter),
            };
            if weight == 0 {
                continue;
            }
            match vote.option {
                VoteOption::Yes => tally.yes = tally.yes.saturating_add(weight),
                VoteOption::No => tally.no = tally.no.saturating_add(weight),
                VoteOption::Abstain => tally.abstain = tally.abstain.saturating_add(weight),
                VoteOption::NoWithVeto => {
                    tally.no_with_veto = tally.no_with_veto.saturating_add(weight)
                }
            }
            tally.cast = tally.cast.saturating_add(weight);
        }

        tally
    }

    /// Whether the yes share of possible weight reaches the committee threshold,
    /// and for token committees whether turnout reaches the quorum
    pub fn meets_threshold(&self, committee: &Committee) -> bool {
        if !committee.vote_threshold.is_met_by(self.yes, self.possible) {
            return false;
        }
        match &committee.voting {
            VotingScheme::Member => true,
            VotingScheme::Token { quorum, .. } => quorum.is_met_by(self.cast, self.possible),
        }
    }
}

/// What a tally pass should do with a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyDecision {
    /// Leave it open
    Pending,
    /// Enact the content
    Pass,
    /// Close as failed: threshold unmet at the deadline
    Reject,
    /// Close as expired: threshold unmet and the window is over
    Expire,
}

/// Decide a proposal's fate at block time `now`.
///
/// The window is inclusive: a proposal is still open at `now == deadline`.
/// A threshold met by the stored votes always passes once it is looked at,
/// even if the first pass to look is after the deadline.
pub fn decide(committee: &Committee, proposal: &Proposal, tally: &TallyResult, now: u64) -> TallyDecision {
    let met = tally.meets_threshold(committee);
    match committee.tally_option {
        TallyOption::FirstPastThePost => {
            if met {
                TallyDecision::Pass
            } else if proposal.has_expired_by(now) {
                TallyDecision::Expire
            } else {
                TallyDecision::Pending
            }
        }
        TallyOption::Deadline => {
            if now < proposal.deadline {
                TallyDecision::Pending
            } else if met {
                TallyDecision::Pass
            } else if proposal.has_expired_by(now) {
                TallyDecision::Expire
            } else {
                TallyDecision::Reject
            }
        }
    }
}
