//! Recorded game logs for the price-rises-until-it-rugs betting game.
//!
//! A recorder writes one JSON object per game per line. This crate turns those lines
//! into immutable [`GameRecord`]s for the analysis passes.
//!
//! # Leniency
//!
//! Two kinds of damage are handled differently:
//!
//! - **Line level**: a line that is not a JSON object is rejected with a
//!   [`ParseError`]. [`log::read_game_log`] logs it, counts it and moves on.
//! - **Field level**: a missing or mistyped field inside an otherwise valid object
//!   falls back to a neutral value (`0`, an empty list, `"unknown"`), see
//!   [`coerce::field_or`].
//!
//! # Examples
//!
//! ```
//! use rugs_record::log::read_game_log;
//!
//! let input = "{\"gameId\": \"g1\", \"analysis\": {\"finalTick\": 42}}\nnot json\n";
//! let log = read_game_log(input.as_bytes()).unwrap();
//! assert_eq!(log.games.len(), 1);
//! assert_eq!(log.games[0].analysis.final_tick, 42);
//! assert_eq!(log.skipped_lines, 1);
//! ```

pub use self::{
    event::{Event, TradeRecord, TradeSide},
    game::{AnalysisSummary, GameRecord, PricePoint, TradingActivity},
};

pub mod coerce;
pub mod event;
pub mod game;
pub mod log;

/// A log line that could not be turned into a game record.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParseError {
    #[display("malformed JSON: {_0}")]
    Json(serde_json::Error),
    #[display("expected a JSON object, found {kind}")]
    NotAnObject { kind: &'static str },
    #[display("line is not valid UTF-8: {_0}")]
    NotUtf8(std::str::Utf8Error),
}
