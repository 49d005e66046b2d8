//! splittable: inspect a genesis ledger or replay operation scripts against it.
//!
//! Output is JSON on stdout; logs go to stderr and honor `RUST_LOG`.

#![allow(missing_docs, rustdoc::missing_crate_level_docs)]

mod script;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::WrapErr;
use serde::Serialize;
use splittable_token::{GenesisConfig, SharedToken, TokenContract};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::script::{replay, replay_abi, Script, Summary};

/// Splittable token ledger tool.
#[derive(Parser, Debug)]
#[command(name = "splittable", version, about = "Inspect and replay splittable token ledgers")]
struct Cli {
    /// Genesis config (TOML, or JSON with a .json extension).
    /// Falls back to the path in SPLITTABLE_GENESIS.
    #[arg(long, global = true)]
    genesis: Option<PathBuf>,

    /// Print compact instead of pretty JSON
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the genesis ledger summary
    Inspect,
    /// Apply a script of operations and print every step plus the final ledger
    Replay {
        /// Operation script (TOML, or JSON with a .json extension)
        #[arg(long)]
        script: PathBuf,

        /// Stop at the first reverted operation
        #[arg(long, default_value_t = false)]
        fail_fast: bool,

        /// Send every operation as ABI calldata to the token contract at the
        /// genesis `contractAddress` and print return data and EVM logs
        #[arg(long, default_value_t = false)]
        abi: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn print_json(value: &impl Serialize, compact: bool) -> eyre::Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{out}");
    Ok(())
}

fn main() -> eyre::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.genesis {
        Some(path) => GenesisConfig::from_path(path)
            .wrap_err_with(|| format!("failed to load genesis {}", path.display()))?,
        None => GenesisConfig::from_env().wrap_err("no --genesis given")?,
    };
    let mut token = config.build()?;
    info!(
        name = token.name(),
        holders = token.holders().count(),
        "ledger initialized"
    );

    match cli.command {
        Command::Inspect => print_json(&Summary::of(&token), cli.compact),
        Command::Replay {
            script,
            fail_fast,
            abi: true,
        } => {
            let address = config
                .contract_address
                .ok_or_else(|| eyre::eyre!("--abi needs contractAddress in the genesis config"))?;
            let script = Script::from_path(&script)?;
            let contract = TokenContract::new(address, SharedToken::new(token));
            let report = replay_abi(&contract, &script, fail_fast);
            let reverted = report.steps.iter().filter(|s| s.error.is_some()).count();
            info!(
                %address,
                steps = report.steps.len(),
                reverted,
                "contract replay finished"
            );
            print_json(&report, cli.compact)
        }
        Command::Replay {
            script, fail_fast, ..
        } => {
            let script = Script::from_path(&script)?;
            let report = replay(&mut token, &script, fail_fast);
            let reverted = report.steps.iter().filter(|s| s.error.is_some()).count();
            info!(
                steps = report.steps.len(),
                reverted,
                exponent = report.summary.exponent,
                "replay finished"
            );
            print_json(&report, cli.compact)
        }
    }
}
