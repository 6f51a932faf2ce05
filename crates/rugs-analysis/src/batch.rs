//! Batch runner with per-game failure isolation.

use rugs_record::GameRecord;
use tracing::{debug, info, warn};

use crate::{
    AnalysisError, metrics::GameMetricsRecord, summary::GameSummaryRecord,
    tick::TickFeatureRecord,
};

/// Rows produced from a batch of games.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    /// Rows of every successful game, in input order.
    pub rows: Vec<T>,
    /// Games whose rows made it into `rows`.
    pub analyzed_games: usize,
    /// Games that failed and were left out.
    pub skipped_games: usize,
}

/// Runs `analyze` over every game, skipping those that fail.
///
/// A failing game is logged with its identifier and contributes no rows; the rest of
/// the batch is unaffected.
pub fn analyze_games<T, I, F>(games: &[GameRecord], mut analyze: F) -> BatchOutcome<T>
where
    F: FnMut(&GameRecord) -> Result<I, AnalysisError>,
    I: IntoIterator<Item = T>,
{
    let mut outcome = BatchOutcome {
        rows: vec![],
        analyzed_games: 0,
        skipped_games: 0,
    };
    for (i, game) in games.iter().enumerate() {
        debug!(game = game.label(), "processing game {}/{}", i + 1, games.len());
        match analyze(game) {
            Ok(rows) => {
                outcome.rows.extend(rows);
                outcome.analyzed_games += 1;
            }
            Err(err) => {
                warn!(game = game.label(), error = %err, "skipping game");
                outcome.skipped_games += 1;
            }
        }
    }
    info!(
        analyzed = outcome.analyzed_games,
        skipped = outcome.skipped_games,
        rows = outcome.rows.len(),
        "batch complete"
    );
    outcome
}

/// One summary row per game.
#[must_use]
pub fn summarize(games: &[GameRecord]) -> BatchOutcome<GameSummaryRecord> {
    analyze_games(games, |game| GameSummaryRecord::from_game(game).map(Some))
}

/// One player-metrics row per game.
#[must_use]
pub fn player_metrics(games: &[GameRecord]) -> BatchOutcome<GameMetricsRecord> {
    analyze_games(games, |game| GameMetricsRecord::from_game(game).map(Some))
}

/// One feature row per price sample of every game.
#[must_use]
pub fn tick_features(games: &[GameRecord]) -> BatchOutcome<TickFeatureRecord> {
    analyze_games(games, TickFeatureRecord::from_game)
}
