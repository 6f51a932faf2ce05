//! Monte-Carlo simulation of the stopping process and its summary statistics.

use rand::{Rng, SeedableRng as _};
use rand_distr::{Distribution as _, Geometric};
use rand_pcg::Pcg64;
use rugs_stats::descriptive::{DescriptiveStats, mode};

use crate::{
    ParameterError,
    params::GameModel,
    strategy::{BetOutcome, Strategy},
};

/// Deterministic generator for reproducible simulation runs.
#[must_use]
pub fn seeded_rng(seed: u64) -> Pcg64 {
    Pcg64::seed_from_u64(seed)
}

/// Draws `games` stopping ticks, clamped to [`GameModel::max_ticks`].
///
/// Ticks are 1-based: a game that stops on its first tick has stopping tick 1.
pub fn simulate_stopping_ticks<R>(model: &GameModel, rng: &mut R, games: usize) -> Vec<u64>
where
    R: Rng + ?Sized,
{
    // p is validated to (0, 1], which Geometric always accepts.
    let Ok(geometric) = Geometric::new(model.stop_prob()) else {
        return vec![model.max_ticks(); games];
    };
    (0..games)
        .map(|_| {
            let failures = geometric.sample(rng);
            failures.saturating_add(1).min(model.max_ticks())
        })
        .collect()
}

/// Simulated stopping ticks and both strategies replayed over them.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub bankroll: f64,
    pub stopping_ticks: Vec<u64>,
    pub flat: Vec<BetOutcome>,
    pub martingale: Vec<BetOutcome>,
}

impl SimulationRun {
    pub fn new<R>(
        model: &GameModel,
        rng: &mut R,
        games: usize,
        bankroll: f64,
        base_stake: f64,
    ) -> Result<Self, ParameterError>
    where
        R: Rng + ?Sized,
    {
        if !(bankroll.is_finite() && bankroll >= 0.0) {
            return Err(ParameterError::Bankroll { value: bankroll });
        }
        let flat = Strategy::flat(base_stake)?;
        let martingale = Strategy::martingale(base_stake)?;
        let stopping_ticks = simulate_stopping_ticks(model, rng, games);
        let replay = |strategy: Strategy| {
            stopping_ticks
                .iter()
                .map(|&tick| strategy.play(model, bankroll, tick))
                .collect::<Vec<_>>()
        };
        Ok(Self {
            bankroll,
            flat: replay(flat),
            martingale: replay(martingale),
            stopping_ticks,
        })
    }
}

/// Shape of the simulated stopping-tick distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionStats {
    pub mean: f64,
    pub median: f64,
    pub mode: u64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
    pub range: u64,
}

impl DistributionStats {
    /// `None` for an empty sample.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(ticks: &[u64]) -> Option<Self> {
        let stats = DescriptiveStats::new(ticks.iter().map(|&t| t as f64))?;
        let min = *ticks.iter().min()?;
        let max = *ticks.iter().max()?;
        Some(Self {
            mean: stats.mean,
            median: stats.median,
            mode: mode(ticks)?,
            std_dev: stats.std_dev,
            min,
            max,
            range: max - min,
        })
    }
}

/// Aggregate results of one strategy over a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySummary {
    pub mean_final_bankroll: f64,
    pub mean_profit_loss: f64,
    /// Share of games that ended with a profit.
    pub profit_probability: f64,
    /// Share of games that wiped out the bankroll.
    pub ruin_probability: f64,
    pub mean_bets: f64,
    /// Expected net result per game at a unit stake: `mean_bets * ev_per_bet`.
    pub theoretical_ev: f64,
}

impl StrategySummary {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(model: &GameModel, outcomes: &[BetOutcome]) -> Self {
        let n = outcomes.len().max(1) as f64;
        let share = |pred: fn(&BetOutcome) -> bool| {
            outcomes.iter().filter(|o| pred(o)).count() as f64 / n
        };
        let mean_bets = outcomes.iter().map(|o| o.bets as f64).sum::<f64>() / n;
        Self {
            mean_final_bankroll: outcomes.iter().map(|o| o.final_bankroll).sum::<f64>() / n,
            mean_profit_loss: outcomes.iter().map(|o| o.profit_loss).sum::<f64>() / n,
            profit_probability: share(|o| o.profit_loss > 0.0),
            ruin_probability: share(BetOutcome::is_ruined),
            mean_bets,
            theoretical_ev: mean_bets * model.ev_per_bet(),
        }
    }
}

/// Starting bankrolls of the survival table.
pub const SURVIVAL_BANKROLLS: [u32; 4] = [50, 100, 200, 500];
/// Stakes of the survival table.
pub const SURVIVAL_STAKES: [u32; 3] = [1, 2, 5];
/// Stand-in when the approximation below goes negative.
pub const RUIN_CAP: f64 = 0.99;

/// One cell of the bankroll survival table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuinEstimate {
    pub bankroll: u32,
    pub stake: u32,
    /// Whole bets the bankroll covers.
    pub max_bets: u32,
    pub ruin_probability: f64,
}

impl RuinEstimate {
    /// Rough ruin probability `1 - (q / (1 - q))^max_bets` for flat betting.
    ///
    /// Not a calibrated estimate: negative values, which occur once `q > 0.5`, are
    /// reported as [`RUIN_CAP`].
    #[must_use]
    pub fn new(model: &GameModel, bankroll: u32, stake: u32) -> Self {
        let max_bets = bankroll / stake.max(1);
        let q = model.win_prob();
        let odds = q / (1.0 - q);
        let exponent = i32::try_from(max_bets).unwrap_or(i32::MAX);
        let ruin = 1.0 - odds.powi(exponent);
        Self {
            bankroll,
            stake,
            max_bets,
            ruin_probability: if ruin < 0.0 { RUIN_CAP } else { ruin },
        }
    }

    /// Every bankroll/stake combination of the survival table.
    #[must_use]
    pub fn table(model: &GameModel) -> Vec<Self> {
        SURVIVAL_BANKROLLS
            .iter()
            .flat_map(|&bankroll| {
                SURVIVAL_STAKES
                    .iter()
                    .map(move |&stake| Self::new(model, bankroll, stake))
            })
            .collect()
    }
}
