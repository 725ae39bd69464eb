//! accrue-cli: Command-line simulator for the Accrue yield ledger.
//!
//! `rates` prints the active rate and cumulative yield `C(t)` for a config.
//! `simulate` replays a JSON scenario of timed operations against an
//! in-memory ledger and prints the resulting events, totals and stakes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use accrue_core::traits::Clock;
use accrue_core::types::{AccountId, Amount, RateEntry, Timestamp};
use accrue_ledger::{
    AccountStake, ClaimReceipt, CompoundReceipt, Gate, LedgerConfig, LedgerEvent, ManualClock,
    MemoryVault, StaticAuthority, SystemClock, YieldLedger,
};

/// Accrue yield ledger simulator.
#[derive(Parser)]
#[command(name = "accrue-cli")]
#[command(version, about = "Perpetual simple-interest ledger simulator")]
struct Cli {
    /// Log level filter, overridden by RUST_LOG.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format (text or json).
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the active rate and C(t) at one or more instants.
    Rates(RatesArgs),
    /// Replay a scenario file against an in-memory ledger.
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct RatesArgs {
    /// Ledger config (JSON). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Unix timestamps to evaluate (default: now).
    #[arg(long)]
    at: Vec<Timestamp>,
}

#[derive(Args)]
struct SimulateArgs {
    /// Ledger config (JSON). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario file (JSON).
    #[arg(short, long)]
    scenario: PathBuf,
}

/// A scenario: who administers the ledger, when the clock starts, and the
/// steps to replay in order.
#[derive(Deserialize, Debug)]
struct Scenario {
    #[serde(default = "default_admin")]
    admin: AccountId,
    #[serde(default)]
    start_time: Timestamp,
    steps: Vec<Step>,
}

fn default_admin() -> AccountId {
    AccountId([0xAD; 20])
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
enum Step {
    SetTime { at: Timestamp },
    Advance { secs: u64 },
    Fund { account: AccountId, amount: Amount },
    SeedPool { amount: Amount },
    Deposit { account: AccountId, amount: Amount },
    Compound {
        account: AccountId,
        #[serde(default)]
        extra: Amount,
    },
    Claim { account: AccountId },
    AddYieldChange { rate_per_year: u128, start_time: Timestamp },
    RemoveYieldChange { start_time: Timestamp },
    Pause { gate: Gate },
    Unpause { gate: Gate },
    ChangeUserAddress { from: AccountId, to: AccountId },
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Ok,
    Deposited(AccountStake),
    Compounded(CompoundReceipt),
    Claimed(ClaimReceipt),
    RateAdded(RateEntry),
    RateRemoved(Option<RateEntry>),
    Migrated(bool),
    Failed(String),
}

#[derive(Serialize)]
struct StepReport {
    index: usize,
    at: Timestamp,
    outcome: Outcome,
}

#[derive(Serialize)]
struct SimulationReport {
    steps: Vec<StepReport>,
    events: Vec<LedgerEvent>,
    at: Timestamp,
    total_funds_needed: Amount,
    net_owed: Amount,
    pool_balance: Amount,
    stakes: Vec<StakeReport>,
}

#[derive(Serialize)]
struct StakeReport {
    account: AccountId,
    principal: Amount,
    t0: Timestamp,
    withdrawable: Amount,
}

#[derive(Serialize)]
struct RateReport {
    at: Timestamp,
    start_time: Timestamp,
    rate_per_second: u128,
    cumulative: u128,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Rates(args) => rates(args),
        Commands::Simulate(args) => simulate(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    let config = match path {
        Some(path) => LedgerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    config
        .with_env_overrides()
        .context("invalid ACCRUE_* environment override")
}

/// Print the active rate and `C(t)` at each requested instant.
fn rates(args: RatesArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let clock = Arc::new(ManualClock::new(0));
    let ledger = YieldLedger::new(
        &config,
        Arc::new(MemoryVault::new()),
        Arc::new(StaticAuthority::default()),
        clock.clone(),
    )
    .context("config schedule rejected")?;

    let instants = if args.at.is_empty() {
        vec![SystemClock.now()]
    } else {
        args.at
    };

    let mut reports = Vec::with_capacity(instants.len());
    for at in instants {
        clock.set(at);
        let active = ledger.current_yield_rate();
        reports.push(RateReport {
            at,
            start_time: active.start_time,
            rate_per_second: active.rate_per_second,
            cumulative: ledger
                .cumulative_yield(at)
                .with_context(|| format!("C({at}) out of range"))?,
        });
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

/// Replay a scenario and print the final report.
fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let raw = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("failed to read scenario {}", args.scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse scenario {}", args.scenario.display()))?;

    let report = run_scenario(&config, &scenario)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_scenario(config: &LedgerConfig, scenario: &Scenario) -> Result<SimulationReport> {
    let vault = Arc::new(MemoryVault::new());
    let clock = Arc::new(ManualClock::new(scenario.start_time));
    let ledger = YieldLedger::new(
        config,
        vault.clone(),
        Arc::new(StaticAuthority::new([scenario.admin])),
        clock.clone(),
    )
    .context("config schedule rejected")?;
    info!(steps = scenario.steps.len(), start_time = scenario.start_time, "replaying scenario");

    let admin = scenario.admin;
    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let result = match step.clone() {
            Step::SetTime { at } => {
                clock.set(at);
                Ok(Outcome::Ok)
            }
            Step::Advance { secs } => {
                clock.advance(secs);
                Ok(Outcome::Ok)
            }
            Step::Fund { account, amount } => {
                vault.fund(account, amount);
                Ok(Outcome::Ok)
            }
            Step::SeedPool { amount } => {
                vault.seed_pool(amount);
                Ok(Outcome::Ok)
            }
            Step::Deposit { account, amount } => {
                ledger.deposit(account, amount).map(Outcome::Deposited)
            }
            Step::Compound { account, extra } => ledger
                .compound_and_deposit(account, extra)
                .map(Outcome::Compounded),
            Step::Claim { account } => ledger.claim(account).map(Outcome::Claimed),
            Step::AddYieldChange { rate_per_year, start_time } => ledger
                .add_yield_change(&admin, rate_per_year, start_time)
                .map(Outcome::RateAdded),
            Step::RemoveYieldChange { start_time } => ledger
                .remove_yield_change(&admin, start_time)
                .map(Outcome::RateRemoved),
            Step::Pause { gate } => ledger.set_gate(&admin, gate, false).map(|_| Outcome::Ok),
            Step::Unpause { gate } => ledger.set_gate(&admin, gate, true).map(|_| Outcome::Ok),
            Step::ChangeUserAddress { from, to } => ledger
                .change_user_address(&admin, from, to)
                .map(Outcome::Migrated),
        };
        let outcome = result.unwrap_or_else(|e| {
            debug!(index, error = %e, "scenario step failed");
            Outcome::Failed(e.to_string())
        });
        steps.push(StepReport {
            index,
            at: clock.now(),
            outcome,
        });
    }

    let mut stakes = Vec::new();
    for (account, stake) in ledger.live_stakes() {
        stakes.push(StakeReport {
            account,
            principal: stake.principal,
            t0: stake.t0,
            withdrawable: ledger.withdrawable_balance(&account)?,
        });
    }

    Ok(SimulationReport {
        steps,
        events: ledger.drain_events(),
        at: clock.now(),
        total_funds_needed: ledger.total_funds_needed()?,
        net_owed: ledger.net_owed()?,
        pool_balance: vault.pool_balance(),
        stakes,
    })
}

/// Initialize the tracing subscriber on stderr, keeping stdout for reports.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENARIO: &str = r#"{
        "start_time": 1000,
        "steps": [
            {"fund": {"account": "0x0101010101010101010101010101010101010101", "amount": 500000000000000000000}},
            {"seed_pool": {"amount": 100000000000000000000}},
            {"deposit": {"account": "0x0101010101010101010101010101010101010101", "amount": 500000000000000000000}},
            {"advance": {"secs": 31536000}},
            {"claim": {"account": "0x0101010101010101010101010101010101010101"}},
            {"claim": {"account": "0x0101010101010101010101010101010101010101"}}
        ]
    }"#;

    #[test]
    fn parses_large_amounts() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        assert_eq!(scenario.admin, default_admin());
        assert_eq!(scenario.steps.len(), 6);
        assert!(matches!(
            scenario.steps[0],
            Step::Fund { amount: 500_000_000_000_000_000_000, .. }
        ));
    }

    #[test]
    fn replays_one_year_claim() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let report = run_scenario(&LedgerConfig::default(), &scenario).unwrap();

        match &report.steps[4].outcome {
            Outcome::Claimed(receipt) => assert_eq!(receipt.payout, 574_999_999_991_096_000_000),
            _ => panic!("expected a claim"),
        }
        assert!(matches!(report.steps[5].outcome, Outcome::Failed(_)));
        assert_eq!(report.events.len(), 2);
        assert!(report.stakes.is_empty());
        assert_eq!(report.total_funds_needed, 0);
        assert_eq!(report.at, 1_000 + 31_536_000);
    }

    #[test]
    fn report_serializes_large_values() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let report = run_scenario(&LedgerConfig::default(), &scenario).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("574999999991096000000"));
        assert!(json.contains("\"event\":\"claimed\""));
    }

    #[test]
    fn config_file_feeds_simulation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"deposits_open": false}}"#).unwrap();
        let config = LedgerConfig::from_file(file.path()).unwrap();
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let report = run_scenario(&config, &scenario).unwrap();
        assert!(matches!(report.steps[2].outcome, Outcome::Failed(_)));
        assert!(report.events.is_empty());
    }
}
