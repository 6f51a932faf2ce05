use std::{
    fs::{self, File},
    io::BufReader,
    path::Path,
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use rugs_analysis::{
    batch::BatchOutcome,
    table::{self, TableRow},
};
use rugs_record::{
    GameRecord,
    log::{self, GameLog},
};
use tracing::info;

/// Reads every game of a line-delimited log, skipping unparsable lines.
pub fn read_game_log_file<P>(path: P) -> anyhow::Result<GameLog>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open game log: {}", path.display()))?;
    let log = log::read_game_log(BufReader::new(file))
        .with_context(|| format!("Failed to read game log: {}", path.display()))?;
    info!(
        path = %path.display(),
        games = log.games.len(),
        skipped_lines = log.skipped_lines,
        "loaded game log"
    );
    Ok(log)
}

/// Writes a whole table to `path` as CSV.
pub fn write_table_file<R, P>(path: P, rows: &[R]) -> anyhow::Result<()>
where
    R: TableRow,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let csv = table::render_table(rows);
    fs::write(path, csv)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "table written");
    Ok(())
}

/// Prints the counts shared by every analysis report.
pub fn print_batch_counts<T>(log: &GameLog, outcome: &BatchOutcome<T>) {
    println!(
        "  Games: {} read, {} analyzed, {} skipped",
        log.games.len(),
        outcome.analyzed_games,
        outcome.skipped_games
    );
    if log.skipped_lines > 0 {
        println!("  Unparsable log lines skipped: {}", log.skipped_lines);
    }
}

/// Earliest and latest recording start among games with a valid RFC 3339 timestamp.
pub fn recording_span(games: &[GameRecord]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut starts = games.iter().filter_map(|game| {
        DateTime::parse_from_rfc3339(&game.recording_start)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    });
    let first = starts.next()?;
    Some(starts.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
}
