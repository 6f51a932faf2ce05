//! Monte-Carlo analysis of the geometric stopping model.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use rand::Rng as _;
use rugs_model::{
    params::{GameModel, GameParameters},
    simulation::{self, DistributionStats, RuinEstimate, SimulationRun, StrategySummary},
};
use rugs_stats::percentiles::Percentiles;
use tracing::info;

const PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];
const MEMORYLESS_TICKS: [u64; 4] = [1, 100, 500, 1000];
const PMF_TICKS: [u64; 4] = [1, 10, 100, 1000];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Maximum game length in seconds
    #[arg(long, default_value_t = 200.0)]
    pub max_seconds: f64,
    /// Tick length in milliseconds
    #[arg(long, default_value_t = 200.0)]
    pub ms_per_tick: f64,
    /// Net payout per unit staked on a winning bet
    #[arg(long, default_value_t = 5.0)]
    pub payout_multiple: f64,
    /// Length of one bet window in seconds
    #[arg(long, default_value_t = 10.0)]
    pub bet_window_seconds: f64,
    /// Per-tick stop probability
    #[arg(long, default_value_t = 0.0005)]
    pub stop_prob: f64,
    /// Starting bankroll of every simulated game
    #[arg(long, default_value_t = 100.0)]
    pub bankroll: f64,
    /// Base stake of both strategies
    #[arg(long, default_value_t = 1.0)]
    pub base_stake: f64,
    /// Number of simulated games
    #[arg(long, default_value_t = 1000)]
    pub games: usize,
    /// Random seed (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write per-game results to this CSV file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl SimulateArg {
    pub(crate) fn model_params(&self) -> GameParameters {
        GameParameters {
            max_seconds: self.max_seconds,
            ms_per_tick: self.ms_per_tick,
            payout_multiple: self.payout_multiple,
            bet_window_seconds: self.bet_window_seconds,
            stop_prob: self.stop_prob,
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let model = arg
        .model_params()
        .validate()
        .context("Invalid game parameters")?;
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, games = arg.games, "starting simulation");

    let mut rng = simulation::seeded_rng(seed);
    let run = SimulationRun::new(&model, &mut rng, arg.games, arg.bankroll, arg.base_stake)
        .context("Invalid strategy parameters")?;

    print_parameters(&model, seed);
    println!();
    print_distribution(&model, &run.stopping_ticks);
    println!();
    print_strategies(&model, &run);
    println!();
    print_memoryless(&model);
    println!();
    print_bankroll_survival(&model);

    if let Some(path) = &arg.output {
        save_simulation_csv(path, &run)?;
        println!("\nPer-game results saved to: {}", path.display());
    }

    Ok(())
}

fn print_parameters(model: &GameModel, seed: u64) {
    let params = model.params();
    println!("Stopping Model Analysis (seed={seed})");
    println!("==========================================\n");
    println!(
        "  Game duration: {} s ({} ticks)",
        params.max_seconds,
        model.max_ticks()
    );
    println!(
        "  Tick interval: {} ms ({} s)",
        params.ms_per_tick,
        model.tick_seconds()
    );
    println!(
        "  Bet window:    {} s ({} ticks)",
        params.bet_window_seconds,
        model.bet_window_ticks()
    );
    println!(
        "  Stop probability: {:.4} per tick ({:.3}%)",
        params.stop_prob,
        params.stop_prob * 100.0
    );
    println!("  Payout: {}-to-1", params.payout_multiple);
    println!();
    println!("Closed-form probabilities:");
    println!(
        "  Win probability per bet: {:.4} ({:.2}%)",
        model.win_prob(),
        model.win_prob() * 100.0
    );
    println!("  Expected value per unit bet: {:.4}", model.ev_per_bet());
    println!(
        "  Expected loss per unit bet: {:.1}%",
        model.ev_per_bet().abs() * 100.0
    );
    println!(
        "  Mean stopping tick (untruncated): {:.1}",
        model.expected_stop_tick()
    );
    for k in PMF_TICKS {
        println!(
            "  P(T = {k:>4}) = {:.6}   P(T > {k:>4}) = {:.4}",
            model.pmf(k),
            model.survival(k)
        );
    }
}

#[expect(clippy::cast_precision_loss)]
fn print_distribution(model: &GameModel, ticks: &[u64]) {
    println!("Simulated stopping ticks ({} games):", ticks.len());
    let Some(stats) = DistributionStats::new(ticks) else {
        println!("  (no games simulated)");
        return;
    };
    println!("  Mean:   {:.1}", stats.mean);
    println!("  Median: {:.1}", stats.median);
    println!("  Mode:   {}", stats.mode);
    println!("  Std:    {:.1}", stats.std_dev);
    println!(
        "  Min/Max: {}/{} (range {})",
        stats.min, stats.max, stats.range
    );
    let truncated = ticks.iter().filter(|&&t| t == model.max_ticks()).count();
    println!(
        "  Truncated at max ticks: {truncated} ({:.1}%)",
        100.0 * truncated as f64 / ticks.len() as f64
    );

    let values = ticks.iter().map(|&t| t as f64).collect::<Vec<_>>();
    let percentiles = Percentiles::new(&values, &PERCENTILES);
    let line = percentiles
        .iter()
        .map(|(p, v)| format!("P{p}={v}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!("  Percentiles: {line}");
}

fn print_strategies(model: &GameModel, run: &SimulationRun) {
    let flat = StrategySummary::new(model, &run.flat);
    let martingale = StrategySummary::new(model, &run.martingale);

    println!("Strategy comparison (bankroll {}):", run.bankroll);
    println!("  {:<28} {:>14} {:>14}", "Metric", "Flat", "Martingale");
    println!("  {}", "-".repeat(58));
    let rows: [(&str, fn(&StrategySummary) -> f64, usize); 6] = [
        ("Mean final bankroll", |s| s.mean_final_bankroll, 2),
        ("Mean profit/loss", |s| s.mean_profit_loss, 2),
        ("Probability of profit", |s| s.profit_probability, 3),
        ("Probability of ruin", |s| s.ruin_probability, 3),
        ("Mean bets per game", |s| s.mean_bets, 1),
        ("Theoretical EV per game", |s| s.theoretical_ev, 2),
    ];
    for (label, value, precision) in rows {
        println!(
            "  {label:<28} {:>14.precision$} {:>14.precision$}",
            value(&flat),
            value(&martingale)
        );
    }
}

fn print_memoryless(model: &GameModel) {
    println!(
        "Memoryless property (stop within the next {} ticks):",
        model.bet_window_ticks()
    );
    for elapsed in MEMORYLESS_TICKS {
        println!(
            "  Running at tick {elapsed:>5}: {:.4}",
            model.conditional_win_prob(elapsed)
        );
    }
    println!("  Waiting for a later entry does not change the odds.");
}

fn print_bankroll_survival(model: &GameModel) {
    println!("Bankroll survival (flat betting, approximate):");
    println!(
        "  {:>8} {:>6} {:>9} {:>10}",
        "Bankroll", "Stake", "Max bets", "Ruin prob"
    );
    for estimate in RuinEstimate::table(model) {
        println!(
            "  {:>8} {:>6} {:>9} {:>10.3}",
            estimate.bankroll, estimate.stake, estimate.max_bets, estimate.ruin_probability
        );
    }
}

fn save_simulation_csv(path: &Path, run: &SimulationRun) -> anyhow::Result<()> {
    let mut csv = String::from(
        "game,stop_tick,flat_final_bankroll,flat_profit_loss,flat_bets,\
         martingale_final_bankroll,martingale_profit_loss,martingale_bets,\
         martingale_consecutive_losses\n",
    );
    for (i, (flat, martingale)) in run.flat.iter().zip(&run.martingale).enumerate() {
        writeln!(
            &mut csv,
            "{},{},{},{},{},{},{},{},{}",
            i + 1,
            flat.stop_tick,
            flat.final_bankroll,
            flat.profit_loss,
            flat.bets,
            martingale.final_bankroll,
            martingale.profit_loss,
            martingale.bets,
            martingale.consecutive_losses
        )
        .with_context(|| format!("Failed to format CSV row for game {}", i + 1))?;
    }
    fs::write(path, csv)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;
    use crate::command::CommandArgs;

    fn parse(args: &[&str]) -> SimulateArg {
        let mut argv = vec!["rugs", "simulate"];
        argv.extend_from_slice(args);
        let CommandArgs { mode, .. } = CommandArgs::try_parse_from(argv).unwrap();
        match mode {
            crate::command::Mode::Simulate(arg) => arg,
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn test_writes_one_csv_row_per_game() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sim.csv");
        let output_str = output.to_str().unwrap();
        let arg = parse(&["--games", "25", "--seed", "4", "--output", output_str]);
        run(&arg).unwrap();

        let csv = fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 26);
        assert!(lines[0].starts_with("game,stop_tick,"));
        assert!(lines[1].starts_with("1,"));
        assert_eq!(lines[1].split(',').count(), 9);
    }

    #[test]
    fn test_same_seed_same_csv() {
        let dir = tempfile::tempdir().unwrap();
        let run_to = |name: &str| {
            let path = dir.path().join(name);
            let output = path.to_str().unwrap();
            let arg = parse(&["--games", "50", "--seed", "17", "--output", output]);
            run(&arg).unwrap();
            fs::read_to_string(path).unwrap()
        };
        assert_eq!(run_to("a.csv"), run_to("b.csv"));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(run(&parse(&["--stop-prob", "0", "--games", "1"])).is_err());
        assert!(run(&parse(&["--base-stake", "0", "--games", "1"])).is_err());
    }
}
