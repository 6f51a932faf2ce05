use std::path::PathBuf;

use clap::{Parser, Subcommand};

use self::simulate::SimulateArg;

mod player_metrics;
mod simulate;
mod summarize;
mod tick_features;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug output (overrides `RUST_LOG`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Write one basic row per game: duration, peak and final price
    Summarize(#[clap(flatten)] TableArg),
    /// Write one row per game enriched with per-player trading metrics
    PlayerMetrics(#[clap(flatten)] TableArg),
    /// Write one row per price sample with rolling price and order-flow features
    TickFeatures(#[clap(flatten)] TableArg),
    /// Simulate the geometric stopping model and two betting strategies
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Input log and output table of the analysis commands.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TableArg {
    /// Line-delimited JSON game log
    pub input: PathBuf,
    /// CSV table to write
    pub output: PathBuf,
}

pub fn run(args: &CommandArgs) -> anyhow::Result<()> {
    match &args.mode {
        Mode::Summarize(arg) => summarize::run(arg)?,
        Mode::PlayerMetrics(arg) => player_metrics::run(arg)?,
        Mode::TickFeatures(arg) => tick_features::run(arg)?,
        Mode::Simulate(arg) => simulate::run(arg)?,
    }
    Ok(())
}
