#![allow(dead_code)]

use std::rc::Rc;

use tcr_crypto::{listing_hash, vote_secret_hash};
use tcr_nullables::{NullClock, NullLedger, NullParams};
use tcr_registry::Registry;
use tcr_token::TokenLedger;
use tcr_types::{tokens, Account, Clock, ListingHash, PollId, SubjectHash};
use tcr_voting::VoteOption;

pub type TestRegistry = Registry<NullLedger, Rc<NullParams>, Rc<NullClock>>;

pub const START: u64 = 1_000_000;
pub const STARTING_BALANCE: u128 = tokens(1_000);

pub fn min_deposit() -> u128 {
    tokens(10)
}

pub struct Harness {
    pub registry: TestRegistry,
    pub clock: Rc<NullClock>,
    pub params: Rc<NullParams>,
    pub algebra: SubjectHash,
}

pub fn account(name: &str) -> Account {
    Account::new(name)
}

pub fn applicant() -> Account {
    account("applicant")
}

pub fn challenger() -> Account {
    account("challenger")
}

pub fn voter(n: usize) -> Account {
    account(&format!("voter{n}"))
}

/// A registry with the reference parameters, the "Algebra" subject, and
/// funded accounts that have approved both escrows.
pub fn harness() -> Harness {
    let clock = Rc::new(NullClock::new(START));
    let params = Rc::new(NullParams::new());
    let mut registry = Registry::new(NullLedger::new(), Rc::clone(&params), Rc::clone(&clock));
    let algebra = registry.new_subject("Algebra").unwrap();
    registry.drain_events();

    let escrows = [
        registry.escrow_account().clone(),
        registry.voting().escrow_account().clone(),
    ];
    let mut holders = vec![applicant(), challenger(), account("other")];
    holders.extend((1..=5).map(voter));
    for holder in &holders {
        registry.token_mut().mint(holder, STARTING_BALANCE).unwrap();
        for escrow in &escrows {
            registry.token_mut().approve(holder, escrow, u128::MAX).unwrap();
        }
    }

    Harness {
        registry,
        clock,
        params,
        algebra,
    }
}

impl Harness {
    pub fn balance(&self, who: &Account) -> u128 {
        self.registry.token().balance_of(who)
    }

    pub fn apply(&mut self, name: &str) -> ListingHash {
        let listing = listing_hash(name);
        self.registry
            .apply(&applicant(), listing, self.algebra, min_deposit(), "")
            .unwrap();
        listing
    }

    pub fn challenge(&mut self, listing: ListingHash) -> PollId {
        self.registry
            .challenge(&challenger(), listing, self.algebra, "")
            .unwrap()
    }

    pub fn commit(&mut self, who: &Account, poll_id: PollId, option: VoteOption, salt: u128, amount: u128) {
        self.registry
            .commit_vote(who, poll_id, vote_secret_hash(option.as_u8(), salt), amount)
            .unwrap();
    }

    pub fn reveal(&mut self, who: &Account, poll_id: PollId, option: VoteOption, salt: u128) {
        self.registry.reveal_vote(who, poll_id, option, salt).unwrap();
    }

    /// Move past the end of the apply stage.
    pub fn pass_apply_stage(&self) {
        self.clock.advance(10 + 1);
    }

    /// Move from the commit phase into the reveal phase.
    pub fn pass_commit_stage(&self) {
        self.clock.advance(10 + 1);
    }

    /// Move past the end of the reveal phase.
    pub fn pass_reveal_stage(&self) {
        self.clock.advance(10 + 1);
    }

    /// Registry escrow holds exactly its liabilities; voting escrow holds
    /// exactly the un-withdrawn vote tokens.
    pub fn assert_conserved(&self) {
        let registry = &self.registry;
        assert_eq!(
            registry.token().balance_of(registry.escrow_account()),
            registry.escrow_liabilities(),
            "registry escrow out of balance"
        );
        assert_eq!(
            registry.token().balance_of(registry.voting().escrow_account()),
            registry.voting().locked_total(),
            "voting escrow out of balance"
        );
    }

    pub fn now_secs(&self) -> u64 {
        self.clock.now().as_secs()
    }
}
