//! Basic per-game summary table.

use rugs_analysis::{batch, summary::SummaryReport};
use rugs_stats::descriptive::DescriptiveStats;

use crate::{command::TableArg, util};

pub(crate) fn run(arg: &TableArg) -> anyhow::Result<()> {
    let log = util::read_game_log_file(&arg.input)?;
    let outcome = batch::summarize(&log.games);
    util::write_table_file(&arg.output, &outcome.rows)?;

    let report = SummaryReport::from_rows(&outcome.rows);

    println!("Game Summary Report");
    println!("===================\n");
    util::print_batch_counts(&log, &outcome);
    println!("  Total games summarized: {}", report.total_games);
    if let Some((first, last)) = util::recording_span(&log.games) {
        println!("  Recorded: {first} .. {last}");
    }
    println!("  Table written to: {}", arg.output.display());
    println!();

    println!("Duration (ticks):");
    print_stats(report.duration.as_ref(), 1, "");
    println!();

    println!("Peak multiplier:");
    print_stats(report.peak_multiplier.as_ref(), 2, "x");
    println!();

    println!("Instarugs (< 11 ticks):");
    println!("  Count: {}", report.instarug_count);
    println!("  Rate:  {:.1}%", report.instarug_rate_percent());

    Ok(())
}

fn print_stats(stats: Option<&DescriptiveStats>, precision: usize, unit: &str) {
    let (mean, median, min, max) =
        stats.map_or((0.0, 0.0, 0.0, 0.0), |s| (s.mean, s.median, s.min, s.max));
    println!("  Mean:   {mean:.precision$}{unit}");
    println!("  Median: {median:.precision$}{unit}");
    println!("  Range:  {min:.precision$}{unit} - {max:.precision$}{unit}");
}
