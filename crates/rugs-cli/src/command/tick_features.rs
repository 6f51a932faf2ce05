//! Tick-by-tick feature table.

use rugs_analysis::{
    batch,
    table::TableRow as _,
    tick::{TickFeatureRecord, TickReport},
};

use crate::{command::TableArg, util};

pub(crate) fn run(arg: &TableArg) -> anyhow::Result<()> {
    let log = util::read_game_log_file(&arg.input)?;
    let outcome = batch::tick_features(&log.games);
    util::write_table_file(&arg.output, &outcome.rows)?;

    let report = TickReport::from_rows(&outcome.rows);

    println!("Tick Feature Report");
    println!("===================\n");
    util::print_batch_counts(&log, &outcome);
    println!("  Tick records: {}", report.total_rows);
    println!("  Games with ticks: {}", report.games);
    println!("  Average ticks per game: {:.1}", report.avg_ticks_per_game);
    println!("  Fields per tick: {}", TickFeatureRecord::COLUMNS.len());
    println!("  Table written to: {}", arg.output.display());
    println!();

    println!("Tick-level insights:");
    println!("  Average volatility:      {:.6}", report.avg_volatility);
    println!("  Average trades per tick: {:.2}", report.avg_trades_per_tick);
    println!("  Near-rug volatility:     {:.6}", report.near_rug_volatility);
    println!(
        "  Volatility spike before rug: {:.2}x",
        report.volatility_spike()
    );

    Ok(())
}
