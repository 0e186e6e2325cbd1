//! The registry state machine: application, challenge, resolution, rewards.

use std::collections::{BTreeMap, HashMap};

use tcr_params::{ParameterStore, RegistryParams};
use tcr_token::TokenLedger;
use tcr_types::{Account, Clock, ListingHash, PollId, SecretHash, SubjectHash, Timestamp};
use tcr_voting::{PollSchedule, VoteOption, VotingEngine, VotingError};

use crate::challenge::Challenge;
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::listing::{Listing, ListingStatus, SubjectListing};
use crate::rewards::{challenge_reward_pool, voter_share, winner_reward};
use crate::snapshot::RegistrySnapshot;
use crate::subjects::SubjectBook;

/// Label of the ledger account holding application deposits and challenge stakes.
pub const REGISTRY_ESCROW: &str = "registry";
/// Label of the ledger account holding locked vote tokens.
pub const VOTING_ESCROW: &str = "voting";

type PairingKey = (ListingHash, SubjectHash);

/// A token-curated registry over listing/subject pairings.
///
/// Every mutating call validates all of its preconditions first, makes at
/// most one ledger call, and writes its own state only after that call
/// succeeds. A failed call leaves the registry and the ledger untouched.
pub struct Registry<L, P, C> {
    token: L,
    params: P,
    clock: C,
    escrow: Account,
    voting: VotingEngine,
    subjects: SubjectBook,
    listings: HashMap<ListingHash, Listing>,
    pairings: HashMap<PairingKey, SubjectListing>,
    challenges: BTreeMap<PollId, Challenge>,
    pending_events: Vec<RegistryEvent>,
}

impl<L: TokenLedger, P: ParameterStore, C: Clock> Registry<L, P, C> {
    pub fn new(token: L, params: P, clock: C) -> Self {
        Self {
            token,
            params,
            clock,
            escrow: Account::escrow(REGISTRY_ESCROW),
            voting: VotingEngine::new(Account::escrow(VOTING_ESCROW)),
            subjects: SubjectBook::new(),
            listings: HashMap::new(),
            pairings: HashMap::new(),
            challenges: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }

    // ── Subjects ────────────────────────────────────────────────────────

    /// Register a subject category under the hash of its name.
    pub fn new_subject(&mut self, name: &str) -> Result<SubjectHash, RegistryError> {
        let hash = self.subjects.register(name)?;
        let name = self.subjects.name(&hash).unwrap_or_default().to_string();
        tracing::info!(subject = ?hash, %name, "subject added");
        self.pending_events
            .push(RegistryEvent::SubjectAdded { subject: hash, name });
        Ok(hash)
    }

    /// Registered subjects, in registration order.
    pub fn subjects(&self) -> &[SubjectHash] {
        self.subjects.hashes()
    }

    pub fn subject_name(&self, subject: &SubjectHash) -> Option<&str> {
        self.subjects.name(subject)
    }

    // ── Applications ────────────────────────────────────────────────────

    /// Apply for `listing` under `subject`, staking `amount` into escrow.
    ///
    /// A listing has one owner across its live pairings: once it is filed
    /// under any subject, other accounts get `NotOwner` until every pairing
    /// has been removed. A removed pairing is replaced by the new application.
    pub fn apply(
        &mut self,
        applicant: &Account,
        listing: ListingHash,
        subject: SubjectHash,
        amount: u128,
        data: &str,
    ) -> Result<(), RegistryError> {
        let params = self.load_params()?;
        let now = self.clock.now();

        if !self.subjects.contains(&subject) {
            return Err(RegistryError::UnknownSubject(subject));
        }
        if self
            .pairings
            .get(&(listing, subject))
            .is_some_and(|p| !p.removed)
        {
            return Err(RegistryError::AlreadyApplied { listing, subject });
        }
        if let Some(existing) = self.listings.get(&listing) {
            if !existing.removed && existing.owner != *applicant {
                return Err(RegistryError::NotOwner {
                    caller: applicant.to_string(),
                    listing,
                });
            }
        }
        if amount < params.min_deposit {
            return Err(RegistryError::InsufficientStake {
                needed: params.min_deposit,
                provided: amount,
            });
        }
        let application_expiry = now
            .checked_add_secs(params.apply_stage_length)
            .ok_or(RegistryError::Overflow)?;

        self.token
            .transfer_from(&self.escrow, applicant, &self.escrow, amount)
            .inspect_err(|e| tracing::warn!(%applicant, listing = ?listing, error = %e, "application deposit failed"))?;

        self.pairings.insert(
            (listing, subject),
            SubjectListing {
                listing_hash: listing,
                subject_hash: subject,
                owner: applicant.clone(),
                application_expiry,
                whitelisted: false,
                unstaked_deposit: amount,
                challenge_id: 0,
                resolved_challenge_id: 0,
                removed: false,
            },
        );
        self.refresh_listing(listing, Some(subject));

        tracing::info!(
            %applicant,
            listing = ?listing,
            subject = ?subject,
            deposit = amount,
            application_end = %application_expiry,
            "application submitted"
        );
        self.pending_events.push(RegistryEvent::Application {
            listing,
            subject,
            applicant: applicant.clone(),
            deposit: amount,
            application_end: application_expiry.as_secs(),
            data: data.to_string(),
        });
        Ok(())
    }

    /// Top up a pairing's unstaked deposit.
    pub fn deposit(
        &mut self,
        owner: &Account,
        listing: ListingHash,
        subject: SubjectHash,
        amount: u128,
    ) -> Result<(), RegistryError> {
        let pairing = self.owned_pairing(owner, listing, subject)?;
        if amount == 0 {
            return Err(RegistryError::InsufficientStake {
                needed: 1,
                provided: 0,
            });
        }
        let new_total = pairing
            .unstaked_deposit
            .checked_add(amount)
            .ok_or(RegistryError::Overflow)?;

        self.token
            .transfer_from(&self.escrow, owner, &self.escrow, amount)
            .inspect_err(|e| tracing::warn!(%owner, listing = ?listing, error = %e, "deposit failed"))?;

        if let Some(pairing) = self.pairings.get_mut(&(listing, subject)) {
            pairing.unstaked_deposit = new_total;
        }
        self.refresh_listing(listing, None);
        tracing::info!(%owner, listing = ?listing, subject = ?subject, added = amount, new_total, "deposit added");
        self.pending_events.push(RegistryEvent::Deposit {
            listing,
            subject,
            added: amount,
            new_total,
        });
        Ok(())
    }

    /// Withdraw part of a pairing's unstaked deposit. The remainder may not
    /// drop below the minimum deposit.
    pub fn withdraw(
        &mut self,
        owner: &Account,
        listing: ListingHash,
        subject: SubjectHash,
        amount: u128,
    ) -> Result<(), RegistryError> {
        let params = self.load_params()?;
        let pairing = self.owned_pairing(owner, listing, subject)?;
        let new_total = pairing
            .unstaked_deposit
            .checked_sub(amount)
            .filter(|left| *left >= params.min_deposit)
            .ok_or(RegistryError::InsufficientStake {
                needed: amount.saturating_add(params.min_deposit),
                provided: pairing.unstaked_deposit,
            })?;

        self.token
            .transfer(&self.escrow, owner, amount)
            .inspect_err(|e| tracing::warn!(%owner, listing = ?listing, error = %e, "withdrawal failed"))?;

        if let Some(pairing) = self.pairings.get_mut(&(listing, subject)) {
            pairing.unstaked_deposit = new_total;
        }
        self.refresh_listing(listing, None);
        tracing::info!(%owner, listing = ?listing, subject = ?subject, withdrawn = amount, new_total, "deposit withdrawn");
        self.pending_events.push(RegistryEvent::Withdrawal {
            listing,
            subject,
            withdrawn: amount,
            new_total,
        });
        Ok(())
    }

    /// Remove a whitelisted, unchallenged pairing and return its deposit to the owner.
    pub fn exit(
        &mut self,
        owner: &Account,
        listing: ListingHash,
        subject: SubjectHash,
    ) -> Result<(), RegistryError> {
        let pairing = self.owned_pairing(owner, listing, subject)?;
        if !pairing.whitelisted {
            return Err(RegistryError::NotWhitelisted { listing, subject });
        }
        if pairing.is_challenged() {
            return Err(RegistryError::AlreadyChallenged {
                listing,
                subject,
                poll_id: pairing.challenge_id,
            });
        }
        let refunded = pairing.unstaked_deposit;

        self.token
            .transfer(&self.escrow, owner, refunded)
            .inspect_err(|e| tracing::warn!(%owner, listing = ?listing, error = %e, "exit refund failed"))?;

        self.delist_pairing(listing, subject);
        tracing::info!(%owner, listing = ?listing, subject = ?subject, refunded, "listing exited");
        self.pending_events.push(RegistryEvent::ListingWithdrawn {
            listing,
            subject,
            refunded,
        });
        Ok(())
    }

    // ── Challenges ──────────────────────────────────────────────────────

    /// Challenge a pending or whitelisted pairing, staking the minimum
    /// deposit. Returns the id of the poll that decides it.
    ///
    /// A pairing whose deposit no longer covers the minimum is delisted on the
    /// spot: the owner is refunded, no stake is taken and `Ok(0)` is returned.
    pub fn challenge(
        &mut self,
        challenger: &Account,
        listing: ListingHash,
        subject: SubjectHash,
        data: &str,
    ) -> Result<PollId, RegistryError> {
        let params = self.load_params()?;
        let now = self.clock.now();
        let pairing = self.pairing(listing, subject)?;
        if pairing.is_challenged() {
            return Err(RegistryError::AlreadyChallenged {
                listing,
                subject,
                poll_id: pairing.challenge_id,
            });
        }

        if pairing.unstaked_deposit < params.min_deposit {
            let owner = pairing.owner.clone();
            let refunded = pairing.unstaked_deposit;
            self.token
                .transfer(&self.escrow, &owner, refunded)
                .inspect_err(|e| tracing::warn!(%owner, listing = ?listing, error = %e, "touch-and-remove refund failed"))?;
            self.delist_pairing(listing, subject);
            tracing::info!(listing = ?listing, subject = ?subject, refunded, "under-funded listing removed");
            self.pending_events.push(RegistryEvent::TouchAndRemoved {
                listing,
                subject,
                refunded,
            });
            return Ok(0);
        }

        let stake = params.min_deposit;
        let schedule = PollSchedule::new(now, params.commit_stage_length, params.reveal_stage_length)?;
        let reward_pool =
            challenge_reward_pool(stake, params.dispensation_pct).ok_or(RegistryError::Overflow)?;

        self.token
            .transfer_from(&self.escrow, challenger, &self.escrow, stake)
            .inspect_err(|e| tracing::warn!(%challenger, listing = ?listing, error = %e, "challenge stake failed"))?;

        let poll_id = self.voting.start_poll(schedule, params.vote_quorum);
        if let Some(pairing) = self.pairings.get_mut(&(listing, subject)) {
            pairing.unstaked_deposit -= stake;
            pairing.challenge_id = poll_id;
        }
        self.challenges.insert(
            poll_id,
            Challenge::new(poll_id, challenger.clone(), listing, subject, stake, reward_pool),
        );
        self.refresh_listing(listing, None);

        tracing::info!(
            %challenger,
            listing = ?listing,
            subject = ?subject,
            poll_id,
            stake,
            reward_pool,
            "challenge opened"
        );
        self.pending_events.push(RegistryEvent::Challenge {
            listing,
            subject,
            challenger: challenger.clone(),
            challenge_id: poll_id,
            commit_end: schedule.commit_end_date.as_secs(),
            reveal_end: schedule.reveal_end_date.as_secs(),
            data: data.to_string(),
        });
        Ok(poll_id)
    }

    /// Advance a pairing: whitelist an unchallenged application whose apply
    /// stage is over, or resolve a challenge whose poll has ended.
    ///
    /// `None` targets the subject of the listing's most recent application.
    /// A removed pairing is final and fails with `AlreadyResolved`.
    pub fn update_status(
        &mut self,
        listing: ListingHash,
        subject: Option<SubjectHash>,
    ) -> Result<(), RegistryError> {
        let subject = match subject {
            Some(subject) => subject,
            None => {
                self.listings
                    .get(&listing)
                    .ok_or(RegistryError::UnknownListing(listing))?
                    .primary_subject
            }
        };
        let now = self.clock.now();
        let pairing = self
            .pairings
            .get(&(listing, subject))
            .ok_or(RegistryError::ListingNotFound { listing, subject })?;

        if pairing.removed {
            return Err(RegistryError::AlreadyResolved { listing, subject });
        }
        if pairing.is_challenged() {
            let challenge_id = pairing.challenge_id;
            return self.resolve_challenge(listing, subject, challenge_id, now);
        }
        if pairing.whitelisted {
            return Err(RegistryError::AlreadyResolved { listing, subject });
        }
        if !pairing.application_expiry.has_passed(now) {
            return Err(RegistryError::NotReady {
                listing,
                subject,
                reason: "apply stage has not ended",
            });
        }

        if let Some(pairing) = self.pairings.get_mut(&(listing, subject)) {
            pairing.whitelisted = true;
        }
        self.refresh_listing(listing, None);
        tracing::info!(listing = ?listing, subject = ?subject, "application whitelisted");
        self.pending_events
            .push(RegistryEvent::ApplicationWhitelisted { listing, subject });
        Ok(())
    }

    fn resolve_challenge(
        &mut self,
        listing: ListingHash,
        subject: SubjectHash,
        challenge_id: PollId,
        now: Timestamp,
    ) -> Result<(), RegistryError> {
        let challenge = self
            .challenges
            .get(&challenge_id)
            .ok_or(RegistryError::ChallengeNotFound(challenge_id))?;
        if challenge.resolved {
            return Err(RegistryError::AlreadyResolved { listing, subject });
        }
        let poll = self
            .voting
            .poll(challenge_id)
            .ok_or(VotingError::PollNotFound(challenge_id))?;
        if !poll.has_ended(now) {
            return Err(RegistryError::NotReady {
                listing,
                subject,
                reason: "reveal stage has not ended",
            });
        }

        let passed = self.voting.is_passed(challenge_id, now)?;
        let winning_tokens = self.voting.total_tokens(challenge_id, now)?;
        let reward = winner_reward(challenge.stake, challenge.reward_pool, winning_tokens)
            .ok_or(RegistryError::Overflow)?;
        // Nobody can claim a pool without winning-side tokens.
        let reward_pool = if winning_tokens == 0 { 0 } else { challenge.reward_pool };
        let challenger = challenge.challenger.clone();

        if passed {
            let pairing = self.pairing(listing, subject)?;
            let new_deposit = pairing
                .unstaked_deposit
                .checked_add(reward)
                .ok_or(RegistryError::Overflow)?;

            if let Some(pairing) = self.pairings.get_mut(&(listing, subject)) {
                pairing.unstaked_deposit = new_deposit;
                pairing.whitelisted = true;
                pairing.challenge_id = 0;
                pairing.resolved_challenge_id = challenge_id;
            }
            self.settle_challenge(challenge_id, reward_pool, winning_tokens);
            self.refresh_listing(listing, None);

            tracing::info!(
                listing = ?listing,
                subject = ?subject,
                poll_id = challenge_id,
                applicant_reward = reward,
                reward_pool,
                "challenge failed, listing kept"
            );
            self.pending_events.push(RegistryEvent::ChallengeFailed {
                listing,
                subject,
                challenge_id,
                reward_pool,
                winning_tokens,
            });
        } else {
            let pairing = self.pairing(listing, subject)?;
            let owner = pairing.owner.clone();
            let refunded = pairing.unstaked_deposit;
            let payouts = [(challenger.clone(), reward), (owner, refunded)];

            self.token
                .transfer_batch(&self.escrow, &payouts)
                .inspect_err(|e| tracing::warn!(poll_id = challenge_id, error = %e, "challenge payout failed"))?;

            if let Some(pairing) = self.pairings.get_mut(&(listing, subject)) {
                pairing.resolved_challenge_id = challenge_id;
            }
            self.delist_pairing(listing, subject);
            self.settle_challenge(challenge_id, reward_pool, winning_tokens);

            tracing::info!(
                %challenger,
                listing = ?listing,
                subject = ?subject,
                poll_id = challenge_id,
                challenger_reward = reward,
                refunded,
                reward_pool,
                "challenge succeeded, listing removed"
            );
            self.pending_events.push(RegistryEvent::ChallengeSucceeded {
                listing,
                subject,
                challenge_id,
                reward_pool,
                winning_tokens,
            });
            self.pending_events.push(RegistryEvent::ListingRemoved {
                listing,
                subject,
                refunded,
            });
        }
        Ok(())
    }

    fn settle_challenge(&mut self, challenge_id: PollId, reward_pool: u128, winning_tokens: u128) {
        if let Some(challenge) = self.challenges.get_mut(&challenge_id) {
            challenge.resolved = true;
            challenge.reward_pool = reward_pool;
            challenge.winning_tokens = winning_tokens;
        }
    }

    // ── Voter rewards ───────────────────────────────────────────────────

    /// Pay `voter` their share of a resolved challenge's reward pool.
    pub fn claim_reward(&mut self, voter: &Account, challenge_id: PollId) -> Result<u128, RegistryError> {
        let now = self.clock.now();
        let challenge = self.resolved_challenge(challenge_id)?;
        if challenge.has_claimed(voter) {
            return Err(RegistryError::AlreadyClaimed {
                voter: voter.to_string(),
                challenge_id,
            });
        }
        let voter_tokens = self.voting.passing_tokens(voter, challenge_id, now)?;
        if voter_tokens == 0 {
            return Err(RegistryError::NoReward {
                voter: voter.to_string(),
                challenge_id,
            });
        }
        let reward = voter_share(voter_tokens, challenge.reward_pool, challenge.winning_tokens)
            .ok_or(RegistryError::Overflow)?;

        self.token
            .transfer(&self.escrow, voter, reward)
            .inspect_err(|e| tracing::warn!(%voter, poll_id = challenge_id, error = %e, "reward payout failed"))?;

        if let Some(challenge) = self.challenges.get_mut(&challenge_id) {
            challenge.reward_pool -= reward;
            challenge.winning_tokens -= voter_tokens;
            challenge.claims.insert(voter.clone());
        }
        tracing::info!(%voter, poll_id = challenge_id, reward, "voter reward claimed");
        self.pending_events.push(RegistryEvent::RewardClaimed {
            challenge_id,
            voter: voter.clone(),
            reward,
        });
        Ok(reward)
    }

    /// What [`claim_reward`](Self::claim_reward) would pay right now; 0 for
    /// voters on the losing side or who already claimed.
    pub fn voter_reward(&self, voter: &Account, challenge_id: PollId) -> Result<u128, RegistryError> {
        let challenge = self.resolved_challenge(challenge_id)?;
        if challenge.has_claimed(voter) {
            return Ok(0);
        }
        let voter_tokens = self
            .voting
            .passing_tokens(voter, challenge_id, self.clock.now())?;
        if voter_tokens == 0 {
            return Ok(0);
        }
        voter_share(voter_tokens, challenge.reward_pool, challenge.winning_tokens)
            .ok_or(RegistryError::Overflow)
    }

    /// What the winning party of a challenge receives once its poll has ended.
    pub fn determine_reward(&self, challenge_id: PollId) -> Result<u128, RegistryError> {
        let challenge = self
            .challenges
            .get(&challenge_id)
            .ok_or(RegistryError::ChallengeNotFound(challenge_id))?;
        let now = self.clock.now();
        let poll = self
            .voting
            .poll(challenge_id)
            .ok_or(VotingError::PollNotFound(challenge_id))?;
        if !poll.has_ended(now) {
            return Err(VotingError::NotReady {
                poll_id: challenge_id,
                reveal_end: poll.reveal_end_date.as_secs(),
            }
            .into());
        }
        let winning_tokens = self.voting.total_tokens(challenge_id, now)?;
        winner_reward(challenge.stake, challenge.reward_pool, winning_tokens).ok_or(RegistryError::Overflow)
    }

    fn resolved_challenge(&self, challenge_id: PollId) -> Result<&Challenge, RegistryError> {
        let challenge = self
            .challenges
            .get(&challenge_id)
            .ok_or(RegistryError::ChallengeNotFound(challenge_id))?;
        if !challenge.resolved {
            return Err(RegistryError::NotResolved(challenge_id));
        }
        Ok(challenge)
    }

    // ── Voting ──────────────────────────────────────────────────────────

    /// Commit a hidden vote on a challenge's poll, locking `tokens`.
    pub fn commit_vote(
        &mut self,
        voter: &Account,
        poll_id: PollId,
        secret_hash: SecretHash,
        tokens: u128,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();
        self.voting
            .commit_vote(&mut self.token, voter, poll_id, secret_hash, tokens, now)?;
        Ok(())
    }

    pub fn reveal_vote(
        &mut self,
        voter: &Account,
        poll_id: PollId,
        option: VoteOption,
        salt: u128,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();
        self.voting.reveal_vote(voter, poll_id, option, salt, now)?;
        Ok(())
    }

    /// Release a voter's locked tokens after the poll ends.
    pub fn withdraw_vote_tokens(&mut self, voter: &Account, poll_id: PollId) -> Result<u128, RegistryError> {
        let now = self.clock.now();
        Ok(self
            .voting
            .withdraw_tokens(&mut self.token, voter, poll_id, now)?)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn listing(&self, listing: &ListingHash) -> Option<&Listing> {
        self.listings.get(listing)
    }

    pub fn listing_subject(&self, listing: &ListingHash, subject: &SubjectHash) -> Option<&SubjectListing> {
        self.pairings.get(&(*listing, *subject))
    }

    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    pub fn is_whitelisted(&self, listing: &ListingHash) -> bool {
        self.listings.get(listing).is_some_and(|l| l.whitelisted)
    }

    pub fn is_subject_whitelisted(&self, listing: &ListingHash, subject: &SubjectHash) -> bool {
        self.listing_subject(listing, subject)
            .is_some_and(|p| p.whitelisted)
    }

    pub fn status(&self, listing: &ListingHash, subject: &SubjectHash) -> Option<ListingStatus> {
        self.listing_subject(listing, subject)
            .map(|p| p.status(self.clock.now()))
    }

    /// Whether `update_status` would whitelist an unchallenged application now.
    pub fn can_be_whitelisted(&self, listing: &ListingHash, subject: &SubjectHash) -> bool {
        let now = self.clock.now();
        self.listing_subject(listing, subject).is_some_and(|p| {
            !p.removed && !p.whitelisted && !p.is_challenged() && p.application_expiry.has_passed(now)
        })
    }

    /// Whether `update_status` would resolve an active challenge now.
    pub fn challenge_can_be_resolved(&self, listing: &ListingHash, subject: &SubjectHash) -> bool {
        let now = self.clock.now();
        self.listing_subject(listing, subject)
            .filter(|p| p.is_challenged())
            .and_then(|p| self.challenges.get(&p.challenge_id))
            .is_some_and(|c| !c.resolved && self.voting.poll_ended(c.id, now).unwrap_or(false))
    }

    pub fn challenge_record(&self, challenge_id: PollId) -> Option<&Challenge> {
        self.challenges.get(&challenge_id)
    }

    pub fn challenges(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.values()
    }

    /// Tokens the registry escrow must hold: every pairing's unstaked deposit,
    /// both stakes of every open challenge, and every unclaimed reward pool.
    pub fn escrow_liabilities(&self) -> u128 {
        let deposits = self
            .pairings
            .values()
            .fold(0u128, |acc, p| acc.saturating_add(p.unstaked_deposit));
        self.challenges
            .values()
            .fold(deposits, |acc, c| acc.saturating_add(c.escrowed()))
    }

    pub fn escrow_account(&self) -> &Account {
        &self.escrow
    }

    pub fn voting(&self) -> &VotingEngine {
        &self.voting
    }

    pub fn token(&self) -> &L {
        &self.token
    }

    /// Mutable ledger access for funding accounts and granting allowances.
    pub fn token_mut(&mut self) -> &mut L {
        &mut self.token
    }

    pub fn parameters(&self) -> &P {
        &self.params
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Drain pending events.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Persistence ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut listings: Vec<Listing> = self.listings.values().cloned().collect();
        listings.sort_by_key(|l| l.listing_hash);
        let mut pairings: Vec<SubjectListing> = self.pairings.values().cloned().collect();
        pairings.sort_by_key(|p| (p.listing_hash, p.subject_hash));
        RegistrySnapshot {
            escrow: self.escrow.clone(),
            subjects: self.subjects.entries(),
            listings,
            pairings,
            challenges: self.challenges.values().cloned().collect(),
            voting: self.voting.snapshot(),
        }
    }

    /// Rebuild a registry from a snapshot over the given collaborators.
    pub fn restore(snapshot: RegistrySnapshot, token: L, params: P, clock: C) -> Self {
        Self {
            token,
            params,
            clock,
            escrow: snapshot.escrow,
            voting: VotingEngine::restore(snapshot.voting),
            subjects: SubjectBook::from_entries(snapshot.subjects),
            listings: snapshot
                .listings
                .into_iter()
                .map(|l| (l.listing_hash, l))
                .collect(),
            pairings: snapshot
                .pairings
                .into_iter()
                .map(|p| ((p.listing_hash, p.subject_hash), p))
                .collect(),
            challenges: snapshot
                .challenges
                .into_iter()
                .map(|c| (c.id, c))
                .collect(),
            pending_events: Vec::new(),
        }
    }

    /// Hand back the collaborators, e.g. to restore a snapshot over the same ledger.
    pub fn into_parts(self) -> (L, P, C) {
        (self.token, self.params, self.clock)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn load_params(&self) -> Result<RegistryParams, RegistryError> {
        Ok(RegistryParams::load(&self.params)?)
    }

    /// A live pairing; removed records count as not found.
    fn pairing(&self, listing: ListingHash, subject: SubjectHash) -> Result<&SubjectListing, RegistryError> {
        self.pairings
            .get(&(listing, subject))
            .filter(|p| !p.removed)
            .ok_or(RegistryError::ListingNotFound { listing, subject })
    }

    fn owned_pairing(
        &self,
        caller: &Account,
        listing: ListingHash,
        subject: SubjectHash,
    ) -> Result<&SubjectListing, RegistryError> {
        let pairing = self.pairing(listing, subject)?;
        if pairing.owner != *caller {
            return Err(RegistryError::NotOwner {
                caller: caller.to_string(),
                listing,
            });
        }
        Ok(pairing)
    }

    fn delist_pairing(&mut self, listing: ListingHash, subject: SubjectHash) {
        if let Some(pairing) = self.pairings.get_mut(&(listing, subject)) {
            pairing.delist();
        }
        self.refresh_listing(listing, None);
    }

    /// Recompute the aggregate for `listing`. `applied` moves that subject to
    /// the end of the application order.
    fn refresh_listing(&mut self, listing: ListingHash, applied: Option<SubjectHash>) {
        let mut order = self
            .listings
            .get(&listing)
            .map(|l| l.subjects.clone())
            .unwrap_or_default();
        if let Some(subject) = applied {
            order.retain(|s| *s != subject);
            order.push(subject);
        }
        let pairings: Vec<&SubjectListing> = order
            .iter()
            .filter_map(|s| self.pairings.get(&(listing, *s)))
            .collect();
        match Listing::from_pairings(listing, &pairings) {
            Some(aggregate) => {
                self.listings.insert(listing, aggregate);
            }
            None => {
                self.listings.remove(&listing);
            }
        }
    }
}
