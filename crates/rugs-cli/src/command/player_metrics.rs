//! Player-integrated game metrics table.

use rugs_analysis::{
    batch,
    metrics::{GameMetricsRecord, MetricsReport},
    table::TableRow as _,
};

use crate::{command::TableArg, util};

pub(crate) fn run(arg: &TableArg) -> anyhow::Result<()> {
    let log = util::read_game_log_file(&arg.input)?;
    let outcome = batch::player_metrics(&log.games);
    util::write_table_file(&arg.output, &outcome.rows)?;

    let report = MetricsReport::from_rows(&outcome.rows);

    println!("Player Metrics Report");
    println!("=====================\n");
    util::print_batch_counts(&log, &outcome);
    println!("  Records: {}", report.records);
    println!("  Fields:  {}", GameMetricsRecord::COLUMNS.len());
    println!("  Table written to: {}", arg.output.display());
    println!();

    println!("Batch overview:");
    println!("  Instarugs:              {}", report.instarugs);
    println!("  Players (sum of games): {}", report.players);
    println!("  Average composite risk: {:.3}", report.average_composite_risk);
    println!();

    println!("Trading patterns:");
    let total = report.patterns.total();
    for (pattern, count) in report.patterns.iter() {
        #[expect(clippy::cast_precision_loss)]
        let share = 100.0 * count as f64 / total.max(1) as f64;
        println!("  {:<16} {count:>8} ({share:5.1}%)", pattern.count_column());
    }
    if let Some(pattern) = report.dominant_pattern() {
        println!("  Most common: {pattern}");
    }

    Ok(())
}
