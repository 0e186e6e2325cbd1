//! Commit-reveal voting engine. Owns every poll and the vote escrow account.

use crate::error::VotingError;
use crate::poll::{Commitment, Poll, PollSchedule, VoteOption};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tcr_crypto::vote_secret_hash;
use tcr_token::TokenLedger;
use tcr_types::{Account, PollId, SecretHash, Timestamp};

/// Manages polls: opening, commits, reveals, tallies and token release.
///
/// The engine does not own a ledger or a clock. Every mutating call takes the
/// ledger and the current time explicitly, validates all preconditions, makes
/// at most one ledger call, and only then updates the poll.
pub struct VotingEngine {
    escrow: Account,
    polls: BTreeMap<PollId, Poll>,
    next_poll_id: PollId,
}

impl VotingEngine {
    pub fn new(escrow: Account) -> Self {
        Self {
            escrow,
            polls: BTreeMap::new(),
            next_poll_id: 1,
        }
    }

    /// Ledger account holding every locked vote token.
    pub fn escrow_account(&self) -> &Account {
        &self.escrow
    }

    /// Id the next [`start_poll`](Self::start_poll) will return.
    pub fn next_poll_id(&self) -> PollId {
        self.next_poll_id
    }

    /// Open a poll. Infallible so callers can settle their own ledger call
    /// first and open the poll afterwards.
    pub fn start_poll(&mut self, schedule: PollSchedule, vote_quorum: u8) -> PollId {
        let id = self.next_poll_id;
        self.next_poll_id += 1;
        self.polls.insert(id, Poll::new(id, schedule, vote_quorum.min(100)));
        tracing::info!(
            poll_id = id,
            commit_end = %schedule.commit_end_date,
            reveal_end = %schedule.reveal_end_date,
            vote_quorum,
            "poll opened"
        );
        id
    }

    /// Commit (or re-commit) a hidden vote backed by `tokens`.
    ///
    /// A re-commit before the deadline replaces the stored secret and locked
    /// amount; only the difference moves on the ledger.
    pub fn commit_vote<L: TokenLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        voter: &Account,
        poll_id: PollId,
        secret_hash: SecretHash,
        tokens: u128,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        let poll = self.get(poll_id)?;
        if !poll.commit_period_active(now) {
            return Err(VotingError::CommitPhaseClosed(poll_id));
        }
        if tokens == 0 {
            return Err(VotingError::ZeroTokens);
        }
        if secret_hash.is_zero() {
            return Err(VotingError::InvalidSecret);
        }
        let previous = poll
            .commitments
            .get(voter)
            .map(|c| c.locked_tokens)
            .unwrap_or(0);

        if tokens > previous {
            ledger
                .transfer_from(&self.escrow, voter, &self.escrow, tokens - previous)
                .inspect_err(|e| tracing::warn!(%voter, poll_id, error = %e, "vote escrow deposit failed"))?;
        } else if tokens < previous {
            ledger
                .transfer(&self.escrow, voter, previous - tokens)
                .inspect_err(|e| tracing::warn!(%voter, poll_id, error = %e, "vote escrow refund failed"))?;
        }

        let poll = self.get_mut(poll_id)?;
        poll.commitments.insert(
            voter.clone(),
            Commitment {
                secret_hash,
                locked_tokens: tokens,
            },
        );
        tracing::debug!(%voter, poll_id, tokens, previous, "vote committed");
        Ok(())
    }

    /// Reveal a committed vote. The option and salt must hash to the commitment.
    pub fn reveal_vote(
        &mut self,
        voter: &Account,
        poll_id: PollId,
        option: VoteOption,
        salt: u128,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        let poll = self.get_mut(poll_id)?;
        if !poll.reveal_period_active(now) {
            return Err(VotingError::RevealPhaseClosed(poll_id));
        }
        let commitment = poll
            .commitments
            .get(voter)
            .ok_or_else(|| VotingError::NoCommitment {
                voter: voter.to_string(),
                poll_id,
            })?;
        if poll.revealed.contains_key(voter) {
            return Err(VotingError::DoubleReveal(voter.to_string()));
        }
        if vote_secret_hash(option.as_u8(), salt) != commitment.secret_hash {
            return Err(VotingError::RevealMismatch(voter.to_string()));
        }

        let weight = commitment.locked_tokens;
        match option {
            VoteOption::For => {
                poll.votes_for = poll.votes_for.checked_add(weight).ok_or(VotingError::Overflow)?;
            }
            VoteOption::Against => {
                poll.votes_against = poll
                    .votes_against
                    .checked_add(weight)
                    .ok_or(VotingError::Overflow)?;
            }
        }
        poll.revealed.insert(voter.clone(), option);
        tracing::debug!(%voter, poll_id, ?option, weight, "vote revealed");
        Ok(())
    }

    /// Release a voter's locked tokens once the poll has ended, whether or not
    /// they revealed. Returns the amount released.
    pub fn withdraw_tokens<L: TokenLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        voter: &Account,
        poll_id: PollId,
        now: Timestamp,
    ) -> Result<u128, VotingError> {
        let poll = self.get(poll_id)?;
        if !poll.has_ended(now) {
            return Err(VotingError::NotReady {
                poll_id,
                reveal_end: poll.reveal_end_date.as_secs(),
            });
        }
        let amount = poll
            .commitments
            .get(voter)
            .map(|c| c.locked_tokens)
            .ok_or_else(|| VotingError::NoCommitment {
                voter: voter.to_string(),
                poll_id,
            })?;
        if poll.withdrawn.contains(voter) {
            return Err(VotingError::AlreadyWithdrawn(voter.to_string()));
        }

        ledger
            .transfer(&self.escrow, voter, amount)
            .inspect_err(|e| tracing::warn!(%voter, poll_id, error = %e, "vote token release failed"))?;

        self.get_mut(poll_id)?.withdrawn.insert(voter.clone());
        tracing::debug!(%voter, poll_id, amount, "vote tokens withdrawn");
        Ok(amount)
    }

    /// Whether the poll passed. Only defined once the reveal phase is over.
    pub fn is_passed(&self, poll_id: PollId, now: Timestamp) -> Result<bool, VotingError> {
        let poll = self.ended(poll_id, now)?;
        Ok(poll.tally_passes())
    }

    /// Tokens revealed for the winning option of an ended poll.
    pub fn total_tokens(&self, poll_id: PollId, now: Timestamp) -> Result<u128, VotingError> {
        Ok(self.ended(poll_id, now)?.winning_tokens())
    }

    /// Tokens `voter` revealed for the winning option of an ended poll; 0 if
    /// they voted for the losing side or never revealed.
    pub fn passing_tokens(
        &self,
        voter: &Account,
        poll_id: PollId,
        now: Timestamp,
    ) -> Result<u128, VotingError> {
        let poll = self.ended(poll_id, now)?;
        let winner = poll.winning_option();
        Ok(match (poll.revealed.get(voter), poll.commitments.get(voter)) {
            (Some(option), Some(c)) if *option == winner => c.locked_tokens,
            _ => 0,
        })
    }

    pub fn poll(&self, poll_id: PollId) -> Option<&Poll> {
        self.polls.get(&poll_id)
    }

    pub fn poll_exists(&self, poll_id: PollId) -> bool {
        self.polls.contains_key(&poll_id)
    }

    pub fn polls(&self) -> impl Iterator<Item = &Poll> {
        self.polls.values()
    }

    pub fn commit_period_active(&self, poll_id: PollId, now: Timestamp) -> Result<bool, VotingError> {
        Ok(self.get(poll_id)?.commit_period_active(now))
    }

    pub fn reveal_period_active(&self, poll_id: PollId, now: Timestamp) -> Result<bool, VotingError> {
        Ok(self.get(poll_id)?.reveal_period_active(now))
    }

    pub fn poll_ended(&self, poll_id: PollId, now: Timestamp) -> Result<bool, VotingError> {
        Ok(self.get(poll_id)?.has_ended(now))
    }

    pub fn commitment(&self, voter: &Account, poll_id: PollId) -> Option<&Commitment> {
        self.polls.get(&poll_id)?.commitments.get(voter)
    }

    pub fn did_commit(&self, voter: &Account, poll_id: PollId) -> bool {
        self.commitment(voter, poll_id).is_some()
    }

    pub fn did_reveal(&self, voter: &Account, poll_id: PollId) -> bool {
        self.revealed_option(voter, poll_id).is_some()
    }

    pub fn revealed_option(&self, voter: &Account, poll_id: PollId) -> Option<VoteOption> {
        self.polls.get(&poll_id)?.revealed.get(voter).copied()
    }

    /// Tokens `voter` still has locked across all polls.
    pub fn locked_tokens(&self, voter: &Account) -> u128 {
        self.polls
            .values()
            .filter(|p| !p.withdrawn.contains(voter))
            .filter_map(|p| p.commitments.get(voter))
            .map(|c| c.locked_tokens)
            .sum()
    }

    /// Every token the vote escrow must still hold.
    pub fn locked_total(&self) -> u128 {
        self.polls.values().map(Poll::locked_total).sum()
    }

    /// Serialize every poll for persistence.
    pub fn snapshot(&self) -> VotingSnapshot {
        VotingSnapshot {
            escrow: self.escrow.clone(),
            next_poll_id: self.next_poll_id,
            polls: self.polls.values().cloned().collect(),
        }
    }

    /// Restore from a persisted snapshot.
    pub fn restore(snapshot: VotingSnapshot) -> Self {
        let polls: BTreeMap<PollId, Poll> =
            snapshot.polls.into_iter().map(|p| (p.id, p)).collect();
        let next_poll_id = polls
            .keys()
            .next_back()
            .map_or(1, |last| last + 1)
            .max(snapshot.next_poll_id);
        Self {
            escrow: snapshot.escrow,
            polls,
            next_poll_id,
        }
    }

    fn get(&self, poll_id: PollId) -> Result<&Poll, VotingError> {
        self.polls
            .get(&poll_id)
            .ok_or(VotingError::PollNotFound(poll_id))
    }

    fn get_mut(&mut self, poll_id: PollId) -> Result<&mut Poll, VotingError> {
        self.polls
            .get_mut(&poll_id)
            .ok_or(VotingError::PollNotFound(poll_id))
    }

    fn ended(&self, poll_id: PollId, now: Timestamp) -> Result<&Poll, VotingError> {
        let poll = self.get(poll_id)?;
        if !poll.has_ended(now) {
            return Err(VotingError::NotReady {
                poll_id,
                reveal_end: poll.reveal_end_date.as_secs(),
            });
        }
        Ok(poll)
    }
}

/// Serializable snapshot of every poll.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingSnapshot {
    pub escrow: Account,
    pub next_poll_id: PollId,
    pub polls: Vec<Poll>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcr_token::StandardToken;

    const START: u64 = 1_000;

    struct Fixture {
        engine: VotingEngine,
        token: StandardToken,
        poll_id: PollId,
    }

    fn voter(name: &str) -> Account {
        Account::new(name)
    }

    fn fixture() -> Fixture {
        let mut engine = VotingEngine::new(Account::escrow("voting"));
        let mut token = StandardToken::new("Test", "TST", 18);
        for name in ["alice", "bob", "carol"] {
            let a = voter(name);
            token.mint(&a, 1_000).unwrap();
            token.approve(&a, engine.escrow_account(), u128::MAX).unwrap();
        }
        let schedule = PollSchedule::new(Timestamp::new(START), 10, 10).unwrap();
        let poll_id = engine.start_poll(schedule, 50);
        Fixture {
            engine,
            token,
            poll_id,
        }
    }

    fn at(offset: u64) -> Timestamp {
        Timestamp::new(START + offset)
    }

    fn commit(f: &mut Fixture, name: &str, option: VoteOption, salt: u128, tokens: u128) {
        let secret = vote_secret_hash(option.as_u8(), salt);
        f.engine
            .commit_vote(&mut f.token, &voter(name), f.poll_id, secret, tokens, at(0))
            .unwrap();
    }

    // ── Commit ──────────────────────────────────────────────────────────

    #[test]
    fn poll_ids_start_at_one() {
        let f = fixture();
        assert_eq!(f.poll_id, 1);
        assert_eq!(f.engine.next_poll_id(), 2);
    }

    #[test]
    fn commit_locks_tokens_in_escrow() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 7, 400);
        assert_eq!(f.token.balance_of(&voter("alice")), 600);
        assert_eq!(f.token.balance_of(f.engine.escrow_account()), 400);
        assert_eq!(f.engine.locked_tokens(&voter("alice")), 400);
        assert!(f.engine.did_commit(&voter("alice"), f.poll_id));
    }

    #[test]
    fn recommit_adjusts_escrow_by_delta() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 7, 400);
        commit(&mut f, "alice", VoteOption::Against, 8, 650);
        assert_eq!(f.token.balance_of(&voter("alice")), 350);
        commit(&mut f, "alice", VoteOption::Against, 9, 100);
        assert_eq!(f.token.balance_of(&voter("alice")), 900);
        assert_eq!(f.engine.locked_total(), 100);
        assert_eq!(
            f.engine.commitment(&voter("alice"), f.poll_id).unwrap().secret_hash,
            vote_secret_hash(0, 9)
        );
    }

    #[test]
    fn commit_after_deadline_rejected() {
        let mut f = fixture();
        let err = f
            .engine
            .commit_vote(&mut f.token, &voter("alice"), f.poll_id, vote_secret_hash(1, 1), 10, at(10))
            .unwrap_err();
        assert_eq!(err, VotingError::CommitPhaseClosed(f.poll_id));
        assert_eq!(f.token.balance_of(&voter("alice")), 1_000);
    }

    #[test]
    fn commit_zero_tokens_rejected() {
        let mut f = fixture();
        let err = f
            .engine
            .commit_vote(&mut f.token, &voter("alice"), f.poll_id, vote_secret_hash(1, 1), 0, at(0))
            .unwrap_err();
        assert_eq!(err, VotingError::ZeroTokens);
    }

    #[test]
    fn commit_beyond_balance_leaves_no_commitment() {
        let mut f = fixture();
        let err = f
            .engine
            .commit_vote(&mut f.token, &voter("alice"), f.poll_id, vote_secret_hash(1, 1), 5_000, at(0))
            .unwrap_err();
        assert!(matches!(err, VotingError::TransferFailed(_)));
        assert!(!f.engine.did_commit(&voter("alice"), f.poll_id));
    }

    #[test]
    fn commit_unknown_poll_rejected() {
        let mut f = fixture();
        let err = f
            .engine
            .commit_vote(&mut f.token, &voter("alice"), 99, vote_secret_hash(1, 1), 1, at(0))
            .unwrap_err();
        assert_eq!(err, VotingError::PollNotFound(99));
    }

    // ── Reveal ──────────────────────────────────────────────────────────

    #[test]
    fn reveal_adds_weight_to_tally() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 7, 400);
        commit(&mut f, "bob", VoteOption::Against, 8, 300);
        f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::For, 7, at(10)).unwrap();
        f.engine.reveal_vote(&voter("bob"), f.poll_id, VoteOption::Against, 8, at(19)).unwrap();
        let poll = f.engine.poll(f.poll_id).unwrap();
        assert_eq!(poll.votes_for, 400);
        assert_eq!(poll.votes_against, 300);
        assert_eq!(f.engine.revealed_option(&voter("bob"), f.poll_id), Some(VoteOption::Against));
    }

    #[test]
    fn reveal_outside_window_rejected() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 7, 400);
        let early = f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::For, 7, at(9));
        assert_eq!(early, Err(VotingError::RevealPhaseClosed(f.poll_id)));
        let late = f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::For, 7, at(20));
        assert_eq!(late, Err(VotingError::RevealPhaseClosed(f.poll_id)));
        assert_eq!(f.engine.poll(f.poll_id).unwrap().votes_for, 0);
    }

    #[test]
    fn reveal_mismatch_rejected() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 7, 400);
        let wrong_salt = f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::For, 8, at(10));
        assert!(matches!(wrong_salt, Err(VotingError::RevealMismatch(_))));
        let wrong_option = f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::Against, 7, at(10));
        assert!(matches!(wrong_option, Err(VotingError::RevealMismatch(_))));
        let poll = f.engine.poll(f.poll_id).unwrap();
        assert_eq!(poll.votes_for + poll.votes_against, 0);
        assert!(!f.engine.did_reveal(&voter("alice"), f.poll_id));
    }

    #[test]
    fn double_reveal_rejected() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 7, 400);
        f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::For, 7, at(10)).unwrap();
        let again = f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::For, 7, at(11));
        assert!(matches!(again, Err(VotingError::DoubleReveal(_))));
        assert_eq!(f.engine.poll(f.poll_id).unwrap().votes_for, 400);
    }

    #[test]
    fn reveal_without_commitment_rejected() {
        let mut f = fixture();
        let err = f.engine.reveal_vote(&voter("carol"), f.poll_id, VoteOption::For, 1, at(10));
        assert!(matches!(err, Err(VotingError::NoCommitment { .. })));
    }

    // ── Tally ───────────────────────────────────────────────────────────

    #[test]
    fn is_passed_requires_ended_poll() {
        let f = fixture();
        assert!(matches!(
            f.engine.is_passed(f.poll_id, at(19)),
            Err(VotingError::NotReady { .. })
        ));
        assert_eq!(f.engine.is_passed(f.poll_id, at(20)), Ok(false));
    }

    #[test]
    fn passing_tokens_only_for_winning_revealers() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 1, 600);
        commit(&mut f, "bob", VoteOption::Against, 2, 300);
        commit(&mut f, "carol", VoteOption::For, 3, 500);
        f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::For, 1, at(10)).unwrap();
        f.engine.reveal_vote(&voter("bob"), f.poll_id, VoteOption::Against, 2, at(10)).unwrap();
        // carol never reveals

        assert_eq!(f.engine.is_passed(f.poll_id, at(20)), Ok(true));
        assert_eq!(f.engine.total_tokens(f.poll_id, at(20)), Ok(600));
        assert_eq!(f.engine.passing_tokens(&voter("alice"), f.poll_id, at(20)), Ok(600));
        assert_eq!(f.engine.passing_tokens(&voter("bob"), f.poll_id, at(20)), Ok(0));
        assert_eq!(f.engine.passing_tokens(&voter("carol"), f.poll_id, at(20)), Ok(0));
    }

    // ── Withdrawal ──────────────────────────────────────────────────────

    #[test]
    fn withdraw_releases_tokens_once() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 1, 600);
        commit(&mut f, "bob", VoteOption::Against, 2, 300);
        f.engine.reveal_vote(&voter("alice"), f.poll_id, VoteOption::For, 1, at(10)).unwrap();

        let early = f.engine.withdraw_tokens(&mut f.token, &voter("alice"), f.poll_id, at(19));
        assert!(matches!(early, Err(VotingError::NotReady { .. })));

        // Unrevealed voters get their tokens back too.
        assert_eq!(f.engine.withdraw_tokens(&mut f.token, &voter("bob"), f.poll_id, at(20)), Ok(300));
        assert_eq!(f.engine.withdraw_tokens(&mut f.token, &voter("alice"), f.poll_id, at(20)), Ok(600));
        assert_eq!(f.token.balance_of(&voter("alice")), 1_000);
        assert_eq!(f.token.balance_of(&voter("bob")), 1_000);
        assert_eq!(f.token.balance_of(f.engine.escrow_account()), 0);
        assert_eq!(f.engine.locked_total(), 0);

        let again = f.engine.withdraw_tokens(&mut f.token, &voter("alice"), f.poll_id, at(21));
        assert!(matches!(again, Err(VotingError::AlreadyWithdrawn(_))));
    }

    #[test]
    fn snapshot_restore_preserves_polls() {
        let mut f = fixture();
        commit(&mut f, "alice", VoteOption::For, 1, 600);
        let restored = VotingEngine::restore(f.engine.snapshot());
        assert_eq!(restored.next_poll_id(), 2);
        assert_eq!(restored.locked_tokens(&voter("alice")), 600);
        assert_eq!(restored.escrow_account(), f.engine.escrow_account());
    }
}
