use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use committee_core::committee::{Committee, GenesisState, GovernanceEvent, VotingScheme};
use committee_core::config::{ConfigError, EngineConfig};
use committee_core::errors::GovernanceError;
use committee_core::storage::{AnyBackend, StorageError};
use committee_core::utils::{current_time, format_block_time, format_duration};
use committee_core::{BlockContext, InMemoryLedger, Keeper};
use env_logger::Builder;
use log::{error, info, LevelFilter};
use prettytable::{row, Table};
use thiserror::Error;

#[derive(Parser)]
#[clap(author, version, about)]
/// Inspect and simulate committee governance state
struct Cli {
    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,

    /// Engine configuration file (TOML)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Log level for output, overrides the configuration
    #[clap(short, long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a genesis file and summarize its committees
    Validate {
        /// Genesis JSON file
        genesis: PathBuf,
    },

    /// Import a genesis file and run tally passes over a range of blocks
    #[clap(alias = "sim")]
    Simulate {
        /// Genesis JSON file
        genesis: PathBuf,

        /// Time of the first block, in Unix seconds (defaults to now)
        #[clap(short, long)]
        start: Option<u64>,

        /// Number of blocks to run
        #[clap(short, long, default_value = "1")]
        blocks: u64,

        /// Seconds between blocks
        #[clap(short = 't', long, default_value = "6")]
        block_time: u64,

        /// Write the exported genesis here after the last block
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Governance(#[from] GovernanceError),

    #[error("{0}")]
    Storage(#[from] StorageError),
}

fn main() {
    let cli = Cli::parse();

    let config = match EngineConfig::load(cli.config.as_deref()).and_then(EngineConfig::validated) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Configuration error:".red().bold(), e);
            process::exit(2);
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(config.log_level.as_str());
    Builder::new()
        .filter_level(parse_log_level(level))
        .format_timestamp_millis()
        .init();

    let result = match &cli.command {
        Commands::Validate { genesis } => validate_genesis(genesis),
        Commands::Simulate {
            genesis,
            start,
            blocks,
            block_time,
            out,
        } => simulate(&config, genesis, start.unwrap_or_else(current_time), *blocks, *block_time, out.as_deref()),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

/// Unknown names fall back to `info`
fn parse_log_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}

fn validate_genesis(path: &Path) -> Result<(), CliError> {
    let genesis = GenesisState::load(path)?;
    genesis.validate()?;

    println!("{}", "Genesis is valid".green().bold());
    println!("Next proposal id: {}", genesis.next_proposal_id);
    println!("Open proposals:   {}", genesis.proposals.len());
    println!("Votes:            {}", genesis.votes.len());
    println!("Digest:           {}", genesis.digest()?);
    println!();
    print_committees(&genesis.committees);
    Ok(())
}

fn print_committees(committees: &[Committee]) {
    let mut table = Table::new();
    table.add_row(row!["ID", "Voting", "Members", "Threshold", "Window", "Tally", "Permissions"]);
    for committee in committees {
        let voting = match &committee.voting {
            VotingScheme::Member => "member".to_string(),
            VotingScheme::Token { tally_denom, quorum } => format!("token {} (quorum {})", tally_denom, quorum),
        };
        let permissions = committee
            .permissions
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(row![
            committee.id,
            voting,
            committee.members.len(),
            committee.vote_threshold,
            format_duration(committee.max_proposal_duration),
            committee.tally_option,
            permissions
        ]);
    }
    table.printstd();
}

fn simulate(
    config: &EngineConfig,
    genesis_path: &Path,
    start: u64,
    blocks: u64,
    block_time: u64,
    out: Option<&Path>,
) -> Result<(), CliError> {
    let genesis = GenesisState::load(genesis_path)?;
    let backend = AnyBackend::open(&config.backend_choice()?)?;
    let mut keeper = Keeper::new(backend, InMemoryLedger::new()).with_limits(config.governance.clone());
    keeper.init_genesis(&genesis)?;
    keeper.take_events();

    println!(
        "{} {} blocks from {} every {}",
        "Simulating".green().bold(),
        blocks,
        format_block_time(start),
        format_duration(block_time)
    );

    let mut block = BlockContext::new(1, start);
    let mut emitted = 0usize;
    for i in 0..blocks {
        if i > 0 {
            block = block.next(block_time);
        }
        for event in keeper.run_tally_pass(&block)? {
            emitted += 1;
            print_event(&block, &event);
        }
        if let Some(plan) = keeper.app_state_mut().upgrades.mark_applied(block.height) {
            println!(
                "[{} @ {}] {}",
                block.height,
                format_block_time(block.time),
                format!("upgrade {} applied", plan.name).cyan()
            );
        }
    }
    info!("Simulation finished at height {}, {} events emitted", block.height, emitted);

    let exported = keeper.export_genesis()?;
    println!();
    println!("Proposals still open: {}", exported.proposals.len());
    println!("Final digest:         {}", exported.digest()?);

    if let Some(path) = out {
        exported.save(path)?;
        println!("Exported genesis written to: {}", path.display());
    }
    Ok(())
}

fn print_event(block: &BlockContext, event: &GovernanceEvent) {
    let line = event.to_string();
    let line = match event {
        GovernanceEvent::ProposalPassed { .. } => line.green(),
        GovernanceEvent::ProposalFailed { .. } => line.red(),
        GovernanceEvent::ProposalExpired { .. } | GovernanceEvent::ProposalVoided { .. } => line.yellow(),
        _ => line.normal(),
    };
    println!("[{} @ {}] {}", block.height, format_block_time(block.time), line);
}
