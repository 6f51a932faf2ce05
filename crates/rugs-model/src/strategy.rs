//! Betting strategies replayed against a known stopping tick.
//!
//! Bets are placed back to back: the `n`-th bet covers ticks `(t, t + w]` with
//! `t = n * w`. Play continues while the game is running and the bankroll covers the
//! next stake.

use crate::{ParameterError, params::GameModel};

/// Result of one game under one strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetOutcome {
    pub stop_tick: u64,
    pub final_bankroll: f64,
    pub profit_loss: f64,
    pub bets: u64,
    /// Losing streak in progress when play ended.
    pub consecutive_losses: u32,
}

impl BetOutcome {
    /// Whether the bankroll was wiped out.
    #[must_use]
    pub fn is_ruined(&self) -> bool {
        self.final_bankroll <= 0.0
    }
}

/// How the next stake is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Same stake on every bet.
    Flat { stake: f64 },
    /// Base stake until the fifth straight loss, then escalate.
    ///
    /// Stakes are whole multiples of the base stake. After losses 5, 6 and 7 the
    /// multiple becomes 2, 3 and 4; after every further loss it grows by 50%,
    /// truncated to an integer. Any win resets to the base stake.
    Martingale { base_stake: f64 },
}

impl Strategy {
    /// Straight losses played at the base stake before escalating.
    pub const BASE_LOSSES: u32 = 4;
    /// Stake multiples after losses 5, 6 and 7.
    pub const ESCALATION: [f64; 3] = [2.0, 3.0, 4.0];
    /// Growth factor of the multiple after loss 8 onwards.
    pub const COMPOUNDING: f64 = 1.5;
    /// Balance differences below this fraction of the base stake are rounding noise.
    pub const TOLERANCE: f64 = 1e-9;

    pub fn flat(stake: f64) -> Result<Self, ParameterError> {
        validate_stake(stake)?;
        Ok(Self::Flat { stake })
    }

    pub fn martingale(base_stake: f64) -> Result<Self, ParameterError> {
        validate_stake(base_stake)?;
        Ok(Self::Martingale { base_stake })
    }

    fn base_stake(&self) -> f64 {
        match *self {
            Self::Flat { stake } => stake,
            Self::Martingale { base_stake } => base_stake,
        }
    }

    /// Stake multiple after a loss that extended the streak to `losses`.
    fn multiple_after_loss(&self, current: f64, losses: u32) -> f64 {
        match *self {
            Self::Flat { .. } => 1.0,
            Self::Martingale { .. } => match losses {
                0..=Self::BASE_LOSSES => 1.0,
                5..=7 => Self::ESCALATION[(losses - 5) as usize],
                _ => (current * Self::COMPOUNDING).trunc(),
            },
        }
    }

    /// Replays one game that stops at `stop_tick`.
    #[must_use]
    pub fn play(&self, model: &GameModel, bankroll: f64, stop_tick: u64) -> BetOutcome {
        let window = model.bet_window_ticks();
        let payout = model.payout_multiple();
        let base_stake = self.base_stake();
        let tolerance = base_stake * Self::TOLERANCE;
        let mut balance = bankroll;
        let mut multiple = 1.0;
        let mut bets = 0;
        let mut losses = 0;
        let mut tick = 0;

        while tick < stop_tick && balance + tolerance >= base_stake * multiple {
            let stake = base_stake * multiple;
            bets += 1;
            if stop_tick <= tick + window {
                balance += stake * payout;
                multiple = 1.0;
                losses = 0;
            } else {
                balance -= stake;
                losses += 1;
                multiple = self.multiple_after_loss(multiple, losses);
            }
            if balance.abs() < tolerance {
                balance = 0.0;
            }
            tick += window;
        }

        BetOutcome {
            stop_tick,
            final_bankroll: balance,
            profit_loss: balance - bankroll,
            bets,
            consecutive_losses: losses,
        }
    }
}

fn validate_stake(stake: f64) -> Result<(), ParameterError> {
    if stake.is_finite() && stake > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::Stake { value: stake })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GameParameters;

    fn model(bet_window_seconds: f64) -> GameModel {
        GameParameters {
            ms_per_tick: 1000.0,
            bet_window_seconds,
            ..GameParameters::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_flat_wins_in_third_window() {
        let m = model(50.0);
        let outcome = Strategy::flat(1.0).unwrap().play(&m, 100.0, 120);
        assert_eq!(outcome.bets, 3);
        assert_eq!(outcome.final_bankroll, 103.0);
        assert_eq!(outcome.profit_loss, 3.0);
        assert_eq!(outcome.consecutive_losses, 0);
    }

    #[test]
    fn test_stop_on_window_boundary_wins_that_window() {
        let m = model(50.0);
        let outcome = Strategy::flat(1.0).unwrap().play(&m, 100.0, 50);
        assert_eq!(outcome.bets, 1);
        assert_eq!(outcome.final_bankroll, 105.0);
    }

    #[test]
    fn test_martingale_escalation() {
        let m = model(1.0);
        // Nine losses at 1,1,1,1,1,2,3,4,6 then a win at stake 9.
        let outcome = Strategy::martingale(1.0).unwrap().play(&m, 100.0, 10);
        assert_eq!(outcome.bets, 10);
        assert_eq!(outcome.final_bankroll, 100.0 - 20.0 + 45.0);
        assert_eq!(outcome.consecutive_losses, 0);
    }

    #[test]
    fn test_martingale_multiples_follow_schedule() {
        for base_stake in [1.0, 0.1, 2.5] {
            let s = Strategy::martingale(base_stake).unwrap();
            let mut multiple = 1.0;
            let mut multiples = vec![];
            for losses in 1..=10 {
                multiple = s.multiple_after_loss(multiple, losses);
                multiples.push(multiple);
            }
            assert_eq!(
                multiples,
                vec![1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0, 6.0, 9.0, 13.0]
            );
        }
    }

    #[test]
    fn test_fractional_base_stake_escalates() {
        let m = model(1.0);
        // Nine losses at 1,1,1,1,1,2,3,4,6 halves, then a win at 9 halves.
        let outcome = Strategy::martingale(0.5).unwrap().play(&m, 100.0, 10);
        assert_eq!(outcome.bets, 10);
        assert_eq!(outcome.final_bankroll, 100.0 - 10.0 + 22.5);
    }

    #[test]
    fn test_fractional_base_stake_can_be_ruined() {
        let m = model(1.0);
        // Losses of 0.1 x5, 0.2, 0.3 use up exactly 1.0; rounding noise is discarded.
        let outcome = Strategy::martingale(0.1).unwrap().play(&m, 1.0, 1_000);
        assert_eq!(outcome.bets, 7);
        assert_eq!(outcome.final_bankroll, 0.0);
        assert_eq!(outcome.consecutive_losses, 7);
        assert!(outcome.is_ruined());

        let outcome = Strategy::flat(0.1).unwrap().play(&m, 1.0, 1_000);
        assert_eq!(outcome.bets, 10);
        assert!(outcome.is_ruined());
    }

    #[test]
    fn test_stops_when_bankroll_cannot_cover_stake() {
        let m = model(1.0);
        let outcome = Strategy::martingale(1.0).unwrap().play(&m, 5.0, 1_000);
        // Five losses of 1 leave 0, below the next stake of 2.
        assert_eq!(outcome.bets, 5);
        assert_eq!(outcome.final_bankroll, 0.0);
        assert_eq!(outcome.consecutive_losses, 5);
        assert!(outcome.is_ruined());
    }

    #[test]
    fn test_flat_bankroll_never_negative() {
        let m = model(1.0);
        let outcome = Strategy::flat(3.0).unwrap().play(&m, 10.0, 1_000);
        assert_eq!(outcome.bets, 3);
        assert_eq!(outcome.final_bankroll, 1.0);
        assert!(!outcome.is_ruined());
    }

    #[test]
    fn test_rejects_bad_stake() {
        assert!(Strategy::flat(0.0).is_err());
        assert!(Strategy::martingale(f64::NAN).is_err());
    }
}
