//! Geometric stopping-process model of the rug game.
//!
//! The game stops on every tick with a fixed probability `p`, so the stopping tick
//! follows a geometric distribution truncated at the maximum game length. A bet covers
//! a window of `w` ticks and wins if the game stops inside it.
//!
//! - [`params`]: validated game parameters and closed-form probabilities
//! - [`strategy`]: flat and Martingale-like bet replays over one stopping tick
//! - [`simulation`]: Monte-Carlo runs and their summary statistics
//!
//! # Examples
//!
//! ```
//! use rugs_model::params::GameParameters;
//!
//! let model = GameParameters::default().validate().unwrap();
//! assert_eq!(model.bet_window_ticks(), 50);
//! assert!(model.ev_per_bet() < 0.0);
//! ```

pub mod params;
pub mod simulation;
pub mod strategy;

/// Game or strategy parameters outside their valid range.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParameterError {
    #[display("stop probability must be in (0, 1], got {value}")]
    StopProbability { value: f64 },
    #[display("tick length must be positive, got {value} ms")]
    TickLength { value: f64 },
    #[display("maximum duration must cover at least one tick, got {value} s")]
    MaxDuration { value: f64 },
    #[display("bet window must cover at least one tick, got {value} s")]
    BetWindow { value: f64 },
    #[display("payout multiple must be non-negative, got {value}")]
    Payout { value: f64 },
    #[display("stake must be positive, got {value}")]
    Stake { value: f64 },
    #[display("bankroll must be non-negative, got {value}")]
    Bankroll { value: f64 },
}
