//! Game parameters and closed-form probabilities.

use crate::ParameterError;

/// Raw game parameters, as configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameParameters {
    pub max_seconds: f64,
    pub ms_per_tick: f64,
    /// Net payout per unit staked on a win (`5` means 5-to-1).
    pub payout_multiple: f64,
    pub bet_window_seconds: f64,
    /// Per-tick stop probability.
    pub stop_prob: f64,
}

impl Default for GameParameters {
    fn default() -> Self {
        Self {
            max_seconds: 200.0,
            ms_per_tick: 200.0,
            payout_multiple: 5.0,
            bet_window_seconds: 10.0,
            stop_prob: 0.0005,
        }
    }
}

impl GameParameters {
    /// Checks every parameter and derives the tick counts.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn validate(self) -> Result<GameModel, ParameterError> {
        if !(self.stop_prob > 0.0 && self.stop_prob <= 1.0) {
            return Err(ParameterError::StopProbability {
                value: self.stop_prob,
            });
        }
        if !(self.ms_per_tick.is_finite() && self.ms_per_tick > 0.0) {
            return Err(ParameterError::TickLength {
                value: self.ms_per_tick,
            });
        }
        if !(self.payout_multiple.is_finite() && self.payout_multiple >= 0.0) {
            return Err(ParameterError::Payout {
                value: self.payout_multiple,
            });
        }
        let tick_seconds = self.ms_per_tick / 1000.0;
        let max_ticks = (self.max_seconds / tick_seconds).round();
        if !(max_ticks.is_finite() && max_ticks >= 1.0) {
            return Err(ParameterError::MaxDuration {
                value: self.max_seconds,
            });
        }
        let bet_window_ticks = (self.bet_window_seconds / tick_seconds).round();
        if !(bet_window_ticks.is_finite() && bet_window_ticks >= 1.0) {
            return Err(ParameterError::BetWindow {
                value: self.bet_window_seconds,
            });
        }
        Ok(GameModel {
            params: self,
            max_ticks: max_ticks as u64,
            bet_window_ticks: bet_window_ticks as u64,
        })
    }
}

/// Validated parameters with their derived tick counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameModel {
    params: GameParameters,
    max_ticks: u64,
    bet_window_ticks: u64,
}

impl GameModel {
    #[must_use]
    pub fn params(&self) -> &GameParameters {
        &self.params
    }

    #[must_use]
    pub fn stop_prob(&self) -> f64 {
        self.params.stop_prob
    }

    #[must_use]
    pub fn payout_multiple(&self) -> f64 {
        self.params.payout_multiple
    }

    #[must_use]
    pub fn tick_seconds(&self) -> f64 {
        self.params.ms_per_tick / 1000.0
    }

    /// Truncation point of the stopping distribution.
    #[must_use]
    pub fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Ticks covered by one bet, `w`.
    #[must_use]
    pub fn bet_window_ticks(&self) -> u64 {
        self.bet_window_ticks
    }

    /// Probability that a bet wins: `1 - (1 - p)^w`.
    #[must_use]
    pub fn win_prob(&self) -> f64 {
        1.0 - self.survival(self.bet_window_ticks)
    }

    /// Expected net result of a unit bet: `q * (payout + 1) - 1`.
    #[must_use]
    pub fn ev_per_bet(&self) -> f64 {
        self.win_prob() * (self.params.payout_multiple + 1.0) - 1.0
    }

    /// `P(T = k) = (1 - p)^(k - 1) * p` for the untruncated distribution; 0 for `k = 0`.
    #[must_use]
    pub fn pmf(&self, k: u64) -> f64 {
        if k == 0 {
            return 0.0;
        }
        self.survival(k - 1) * self.params.stop_prob
    }

    /// `P(T > k) = (1 - p)^k` for the untruncated distribution.
    #[must_use]
    pub fn survival(&self, k: u64) -> f64 {
        (1.0 - self.params.stop_prob).powf(exponent(k))
    }

    /// Probability of stopping within the next bet window, given the game is still
    /// running after `elapsed` ticks.
    ///
    /// Equals [`Self::win_prob`] for every `elapsed`.
    #[must_use]
    pub fn conditional_win_prob(&self, elapsed: u64) -> f64 {
        let alive = self.survival(elapsed);
        let still_alive = self.survival(elapsed.saturating_add(self.bet_window_ticks));
        (alive - still_alive) / alive
    }

    /// Mean of the untruncated distribution, `1 / p`.
    #[must_use]
    pub fn expected_stop_tick(&self) -> f64 {
        1.0 / self.params.stop_prob
    }
}

#[expect(clippy::cast_precision_loss)]
fn exponent(k: u64) -> f64 {
    k as f64
}
