//! Scripted scenarios: a TOML list of registry actions replayed against an
//! in-memory ledger and a manually advanced clock.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;
use tcr_crypto::{listing_hash, subject_hash, vote_secret_hash};
use tcr_nullables::NullClock;
use tcr_params::config::serde_amount;
use tcr_params::StaticParameterStore;
use tcr_registry::{Registry, RegistryError, RegistryEvent, RegistrySnapshot};
use tcr_token::{StandardToken, TokenLedger};
use tcr_types::{Account, Clock, PollId};
use tcr_utils::SystemClock;
use tcr_voting::VoteOption;

use crate::config::TcrConfig;

pub type SimRegistry = Registry<StandardToken, StaticParameterStore, Rc<NullClock>>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

/// Vote option as written in scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    For,
    Against,
}

impl From<Choice> for VoteOption {
    fn from(choice: Choice) -> Self {
        match choice {
            Choice::For => VoteOption::For,
            Choice::Against => VoteOption::Against,
        }
    }
}

/// One scripted action. Listings and subjects are given by name and hashed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    NewSubject {
        name: String,
    },
    Apply {
        account: String,
        listing: String,
        subject: String,
        #[serde(with = "serde_amount")]
        amount: u128,
        #[serde(default)]
        data: String,
    },
    Challenge {
        account: String,
        listing: String,
        subject: String,
        #[serde(default)]
        data: String,
    },
    Commit {
        account: String,
        poll: PollId,
        option: Choice,
        salt: u64,
        #[serde(with = "serde_amount")]
        amount: u128,
    },
    Reveal {
        account: String,
        poll: PollId,
        option: Choice,
        salt: u64,
    },
    Advance {
        secs: u64,
    },
    Update {
        listing: String,
        #[serde(default)]
        subject: Option<String>,
    },
    Claim {
        account: String,
        poll: PollId,
    },
    WithdrawVotes {
        account: String,
        poll: PollId,
    },
    Deposit {
        account: String,
        listing: String,
        subject: String,
        #[serde(with = "serde_amount")]
        amount: u128,
    },
    Withdraw {
        account: String,
        listing: String,
        subject: String,
        #[serde(with = "serde_amount")]
        amount: u128,
    },
    Exit {
        account: String,
        listing: String,
        subject: String,
    },
    ExpectWhitelisted {
        listing: String,
        subject: String,
        value: bool,
    },
    ExpectBalance {
        account: String,
        #[serde(with = "serde_amount")]
        amount: u128,
    },
}

impl Script {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("invalid script")
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("in {}", path.display()))
    }
}

/// A step the registry refused.
#[derive(Clone, Debug, Serialize)]
pub struct Rejection {
    pub step: usize,
    pub error: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PairingReport {
    pub listing: String,
    pub subject: String,
    pub owner: String,
    pub whitelisted: bool,
    pub unstaked_deposit: String,
    pub challenge_id: PollId,
    pub removed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub steps: usize,
    pub final_time: u64,
    pub rejected: Vec<Rejection>,
    pub events: Vec<RegistryEvent>,
    pub pairings: Vec<PairingReport>,
    pub balances: Vec<(String, String)>,
}

pub struct ScriptRunner {
    registry: SimRegistry,
    clock: Rc<NullClock>,
    strict: bool,
}

impl ScriptRunner {
    /// Build a registry from `config`: parameters, subjects and funded
    /// genesis accounts that have approved both escrows.
    pub fn from_config(config: &TcrConfig, strict: bool) -> anyhow::Result<Self> {
        let params = config.params.to_store()?;
        let start = config
            .start_time
            .unwrap_or_else(|| SystemClock.now().as_secs());
        let clock = Rc::new(NullClock::new(start));
        let token = StandardToken::new(config.token_name.clone(), config.token_symbol.clone(), 18);
        let mut registry = Registry::new(token, params, Rc::clone(&clock));

        for name in &config.subjects {
            registry
                .new_subject(name)
                .with_context(|| format!("subject {name:?}"))?;
        }
        let escrows = [
            registry.escrow_account().clone(),
            registry.voting().escrow_account().clone(),
        ];
        for genesis in &config.accounts {
            let account = Account::new(genesis.name.as_str());
            registry.token_mut().mint(&account, genesis.balance)?;
            for escrow in &escrows {
                registry.token_mut().approve(&account, escrow, u128::MAX)?;
            }
        }
        // Subject registration is setup, not part of the replayed scenario.
        let setup_events = registry.drain_events();
        tracing::info!(
            subjects = config.subjects.len(),
            accounts = config.accounts.len(),
            setup_events = setup_events.len(),
            start,
            "simulated registry ready"
        );
        Ok(Self {
            registry,
            clock,
            strict,
        })
    }

    pub fn registry(&self) -> &SimRegistry {
        &self.registry
    }

    /// Replay every step. Registry rejections are recorded and skipped, or
    /// abort the run in strict mode. Failed expectations always abort.
    pub fn run(&mut self, script: &Script) -> anyhow::Result<RunReport> {
        let mut rejected = Vec::new();
        let mut events = Vec::new();
        for (index, step) in script.steps.iter().enumerate() {
            let step_no = index + 1;
            match self.apply_step(step) {
                Ok(()) => tracing::debug!(step = step_no, ?step, "step applied"),
                Err(StepError::Registry(e)) if !self.strict => {
                    tracing::warn!(step = step_no, error = %e, "step rejected");
                    rejected.push(Rejection {
                        step: step_no,
                        error: e.to_string(),
                    });
                }
                Err(StepError::Registry(e)) => {
                    return Err(e).with_context(|| format!("step {step_no} rejected"));
                }
                Err(StepError::Expectation(message)) => {
                    bail!("step {step_no}: expectation failed: {message}");
                }
            }
            events.extend(self.registry.drain_events());
        }
        Ok(self.report(script.steps.len(), rejected, events))
    }

    fn apply_step(&mut self, step: &Step) -> Result<(), StepError> {
        let registry = &mut self.registry;
        match step {
            Step::NewSubject { name } => {
                registry.new_subject(name)?;
            }
            Step::Apply {
                account,
                listing,
                subject,
                amount,
                data,
            } => registry.apply(
                &Account::new(account.as_str()),
                listing_hash(listing),
                subject_hash(subject),
                *amount,
                data,
            )?,
            Step::Challenge {
                account,
                listing,
                subject,
                data,
            } => {
                let poll_id = registry.challenge(
                    &Account::new(account.as_str()),
                    listing_hash(listing),
                    subject_hash(subject),
                    data,
                )?;
                tracing::info!(%listing, %subject, poll_id, "challenge step");
            }
            Step::Commit {
                account,
                poll,
                option,
                salt,
                amount,
            } => {
                let option = VoteOption::from(*option);
                registry.commit_vote(
                    &Account::new(account.as_str()),
                    *poll,
                    vote_secret_hash(option.as_u8(), u128::from(*salt)),
                    *amount,
                )?;
            }
            Step::Reveal {
                account,
                poll,
                option,
                salt,
            } => registry.reveal_vote(
                &Account::new(account.as_str()),
                *poll,
                (*option).into(),
                u128::from(*salt),
            )?,
            Step::Advance { secs } => self.clock.advance(*secs),
            Step::Update { listing, subject } => registry.update_status(
                listing_hash(listing),
                subject.as_deref().map(subject_hash),
            )?,
            Step::Claim { account, poll } => {
                registry.claim_reward(&Account::new(account.as_str()), *poll)?;
            }
            Step::WithdrawVotes { account, poll } => {
                registry.withdraw_vote_tokens(&Account::new(account.as_str()), *poll)?;
            }
            Step::Deposit {
                account,
                listing,
                subject,
                amount,
            } => registry.deposit(
                &Account::new(account.as_str()),
                listing_hash(listing),
                subject_hash(subject),
                *amount,
            )?,
            Step::Withdraw {
                account,
                listing,
                subject,
                amount,
            } => registry.withdraw(
                &Account::new(account.as_str()),
                listing_hash(listing),
                subject_hash(subject),
                *amount,
            )?,
            Step::Exit {
                account,
                listing,
                subject,
            } => registry.exit(
                &Account::new(account.as_str()),
                listing_hash(listing),
                subject_hash(subject),
            )?,
            Step::ExpectWhitelisted {
                listing,
                subject,
                value,
            } => {
                let actual = registry.is_subject_whitelisted(&listing_hash(listing), &subject_hash(subject));
                if actual != *value {
                    return Err(StepError::Expectation(format!(
                        "{listing} under {subject}: whitelisted = {actual}, expected {value}"
                    )));
                }
            }
            Step::ExpectBalance { account, amount } => {
                let actual = registry.token().balance_of(&Account::new(account.as_str()));
                if actual != *amount {
                    return Err(StepError::Expectation(format!(
                        "balance of {account} = {actual}, expected {amount}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    fn report(&self, steps: usize, rejected: Vec<Rejection>, events: Vec<RegistryEvent>) -> RunReport {
        let registry = &self.registry;
        let mut pairings: Vec<PairingReport> = registry
            .listings()
            .flat_map(|listing| {
                listing.subjects.iter().filter_map(move |subject| {
                    registry
                        .listing_subject(&listing.listing_hash, subject)
                        .map(|p| PairingReport {
                            listing: p.listing_hash.to_string(),
                            subject: registry
                                .subject_name(subject)
                                .map(str::to_string)
                                .unwrap_or_else(|| subject.to_string()),
                            owner: p.owner.to_string(),
                            whitelisted: p.whitelisted,
                            unstaked_deposit: p.unstaked_deposit.to_string(),
                            challenge_id: p.challenge_id,
                            removed: p.removed,
                        })
                })
            })
            .collect();
        pairings.sort_by(|a, b| (&a.listing, &a.subject).cmp(&(&b.listing, &b.subject)));

        let mut balances: Vec<(String, String)> = registry
            .token()
            .holders()
            .map(|(account, balance)| (account.to_string(), balance.to_string()))
            .collect();
        balances.sort();

        RunReport {
            steps,
            final_time: self.clock.now().as_secs(),
            rejected,
            events,
            pairings,
            balances,
        }
    }
}

enum StepError {
    Registry(RegistryError),
    Expectation(String),
}

impl From<RegistryError> for StepError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcr_types::tokens;

    fn config() -> TcrConfig {
        TcrConfig {
            start_time: Some(1_000),
            ..TcrConfig::default()
        }
    }

    const UNCHALLENGED: &str = r#"
        [[step]]
        action = "apply"
        account = "alice"
        listing = "whitelist.io"
        subject = "Algebra"
        amount = "10_000_000_000_000_000_000"

        [[step]]
        action = "advance"
        secs = 11

        [[step]]
        action = "update"
        listing = "whitelist.io"

        [[step]]
        action = "expect_whitelisted"
        listing = "whitelist.io"
        subject = "Algebra"
        value = true
    "#;

    #[test]
    fn unchallenged_application_whitelists() {
        let script = Script::from_toml_str(UNCHALLENGED).unwrap();
        let mut runner = ScriptRunner::from_config(&config(), true).unwrap();
        let report = runner.run(&script).unwrap();
        assert_eq!(report.steps, 4);
        assert!(report.rejected.is_empty());
        assert_eq!(report.final_time, 1_011);
        assert_eq!(report.pairings.len(), 1);
        assert!(report.pairings[0].whitelisted);
        assert_eq!(report.pairings[0].subject, "Algebra");
        assert!(matches!(report.events[0], RegistryEvent::Application { .. }));
        assert!(!report
            .events
            .iter()
            .any(|e| matches!(e, RegistryEvent::SubjectAdded { .. })));
    }

    #[test]
    fn voted_challenge_pays_voter() {
        let script = Script::from_toml_str(
            r#"
            [[step]]
            action = "apply"
            account = "alice"
            listing = "contested.io"
            subject = "Algebra"
            amount = "10_000_000_000_000_000_000"

            [[step]]
            action = "challenge"
            account = "bob"
            listing = "contested.io"
            subject = "Algebra"

            [[step]]
            action = "commit"
            account = "carol"
            poll = 1
            option = "against"
            salt = 42
            amount = "30_000_000_000_000_000_000"

            [[step]]
            action = "advance"
            secs = 11

            [[step]]
            action = "reveal"
            account = "carol"
            poll = 1
            option = "against"
            salt = 42

            [[step]]
            action = "advance"
            secs = 11

            [[step]]
            action = "update"
            listing = "contested.io"

            [[step]]
            action = "claim"
            account = "carol"
            poll = 1

            [[step]]
            action = "withdraw_votes"
            account = "carol"
            poll = 1

            [[step]]
            action = "expect_balance"
            account = "carol"
            amount = "1_005_000_000_000_000_000_000"

            [[step]]
            action = "expect_balance"
            account = "bob"
            amount = "1_005_000_000_000_000_000_000"
            "#,
        )
        .unwrap();
        let mut runner = ScriptRunner::from_config(&config(), true).unwrap();
        let report = runner.run(&script).unwrap();
        assert_eq!(report.pairings.len(), 1);
        assert!(report.pairings[0].removed);
        assert!(!report.pairings[0].whitelisted);
        assert_eq!(
            runner.registry().token().balance_of(&Account::new("alice")),
            tokens(990)
        );
    }

    #[test]
    fn lenient_run_records_rejections() {
        let script = Script::from_toml_str(
            r#"
            [[step]]
            action = "update"
            listing = "ghost.io"

            [[step]]
            action = "new_subject"
            name = "Geometry"
            "#,
        )
        .unwrap();
        let mut runner = ScriptRunner::from_config(&config(), false).unwrap();
        let report = runner.run(&script).unwrap();
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].step, 1);
        assert_eq!(runner.registry().subjects().len(), 2);
    }

    #[test]
    fn strict_run_stops_at_rejection() {
        let script = Script::from_toml_str(
            r#"
            [[step]]
            action = "update"
            listing = "ghost.io"
            "#,
        )
        .unwrap();
        let mut runner = ScriptRunner::from_config(&config(), true).unwrap();
        assert!(runner.run(&script).is_err());
    }

    #[test]
    fn failed_expectation_aborts() {
        let script = Script::from_toml_str(
            r#"
            [[step]]
            action = "expect_balance"
            account = "alice"
            amount = 1
            "#,
        )
        .unwrap();
        let mut runner = ScriptRunner::from_config(&config(), false).unwrap();
        let err = runner.run(&script).unwrap_err();
        assert!(err.to_string().contains("expectation failed"));
    }

    #[test]
    fn unknown_action_is_a_parse_error() {
        assert!(Script::from_toml_str("[[step]]\naction = \"bribe\"").is_err());
    }

    #[test]
    fn snapshot_after_run_encodes() {
        let script = Script::from_toml_str(UNCHALLENGED).unwrap();
        let mut runner = ScriptRunner::from_config(&config(), true).unwrap();
        runner.run(&script).unwrap();
        let snapshot = runner.snapshot();
        assert_eq!(snapshot.pairings.len(), 1);
        assert!(serde_json::to_string(&snapshot).is_ok());
        assert!(!snapshot.to_bytes().unwrap().is_empty());
    }
}
