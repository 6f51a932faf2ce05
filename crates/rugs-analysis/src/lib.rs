//! Per-game and per-tick analysis of recorded rug games.
//!
//! Data flows one way:
//!
//! ```text
//! GameRecord ─┬─> PlayerBook ─> TradingPattern ─> GameMetricsRecord
//!             ├─> TickFeatureRecord (one per price sample)
//!             └─> GameSummaryRecord
//! ```
//!
//! Every row builder takes one [`GameRecord`](rugs_record::GameRecord) and either
//! produces its rows or fails with an [`AnalysisError`]. [`batch::analyze_games`] runs a
//! builder over a whole log, skipping the games that fail, and [`table`] renders the
//! result as CSV.
//!
//! - [`player`]: per-player trade reconstruction
//! - [`pattern`]: first-match trading pattern classification
//! - [`metrics`]: one enriched row per game
//! - [`tick`]: one feature row per price sample
//! - [`summary`]: basic duration/peak row per game

pub mod batch;
pub mod metrics;
pub mod pattern;
pub mod player;
pub mod summary;
pub mod table;
pub mod tick;

/// A game that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    /// A derived value overflowed or was computed from non-finite input.
    #[display("derived value `{field}` is not finite")]
    NonFinite { field: &'static str },
    /// The difference of two recorded ticks does not fit in an `i64`.
    #[display("tick difference `{field}` overflows ({later} - {earlier})")]
    TickOverflow {
        field: &'static str,
        later: i64,
        earlier: i64,
    },
}

/// Passes `value` through, rejecting NaN and infinities.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::NonFinite { field })
    }
}

/// `later - earlier`, rejecting differences that overflow.
pub(crate) fn tick_difference(
    field: &'static str,
    later: i64,
    earlier: i64,
) -> Result<i64, AnalysisError> {
    later
        .checked_sub(earlier)
        .ok_or(AnalysisError::TickOverflow {
            field,
            later,
            earlier,
        })
}
