//! tcr: replay scripted scenarios against an in-memory token-curated registry.

mod config;
mod script;

use anyhow::Context;
use clap::Parser;
use config::TcrConfig;
use script::{Script, ScriptRunner};
use std::path::PathBuf;
use tcr_params::{ParamKey, ParameterStore};
use tcr_utils::{format_duration, LogFormat};

#[derive(Parser)]
#[command(name = "tcr", about = "Token-curated registry simulator")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "TCR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TCR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TCR_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario script and print a JSON report.
    Run {
        /// Path to the TOML script.
        #[arg(long)]
        script: PathBuf,

        /// Write the final registry snapshot (JSON) to this path.
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Abort at the first rejected step.
        #[arg(long)]
        strict: bool,
    },
    /// Print the effective registry parameters.
    Params,
    /// Print the listing/subject hash of a name.
    Hash {
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TcrConfig::from_toml_file(path)?,
        None => TcrConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    tcr_utils::init_logging(config.log_format, &config.log_level)
        .context("failed to initialise logging")?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Run {
            script,
            snapshot,
            strict,
        } => {
            let script = Script::from_toml_file(&script)?;
            let mut runner = ScriptRunner::from_config(&config, strict)?;
            let report = runner.run(&script)?;
            tracing::info!(
                steps = report.steps,
                rejected = report.rejected.len(),
                events = report.events.len(),
                "script finished"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);

            if let Some(path) = snapshot {
                let json = serde_json::to_string_pretty(&runner.snapshot())?;
                std::fs::write(&path, json)
                    .with_context(|| format!("failed to write snapshot {}", path.display()))?;
                tracing::info!("Snapshot written to {}", path.display());
            }
        }
        Command::Params => {
            let store = config.params.to_store()?;
            for key in ParamKey::ALL {
                let value = store.get(key)?;
                match key {
                    ParamKey::ApplyStageLength
                    | ParamKey::CommitStageLength
                    | ParamKey::RevealStageLength
                    | ParamKey::PApplyStageLength
                    | ParamKey::PCommitStageLength
                    | ParamKey::PRevealStageLength => {
                        let secs = u64::try_from(value).unwrap_or(u64::MAX);
                        println!("{:<20} {} ({})", key.name(), value, format_duration(secs));
                    }
                    _ => println!("{:<20} {}", key.name(), value),
                }
            }
        }
        Command::Hash { name } => {
            let hash = tcr_crypto::listing_hash(&name);
            println!("{}", hex::encode(hash.as_bytes()));
        }
    }

    Ok(())
}
