//! Trading pattern classification.
//!
//! Each player gets exactly one [`TradingPattern`]. The rules in [`RULES`] are tried
//! in order and the first match wins; the last rule always matches.

use std::fmt;

use crate::player::PlayerAggregate;

/// Behavioral archetype of a player within one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TradingPattern {
    /// Many tiny trades.
    Scalper,
    /// Few large trades.
    Whale,
    /// Never sold.
    Hodler,
    /// Balanced buys and sells over several round trips.
    Flipper,
    /// Entered in the first 30% of the game.
    EarlyBird,
    /// Entered in the last 30% of the game.
    LateJoiner,
    Regular,
}

impl TradingPattern {
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::Scalper,
        Self::Whale,
        Self::Hodler,
        Self::Flipper,
        Self::EarlyBird,
        Self::LateJoiner,
        Self::Regular,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scalper => "scalper",
            Self::Whale => "whale",
            Self::Hodler => "hodler",
            Self::Flipper => "flipper",
            Self::EarlyBird => "early_bird",
            Self::LateJoiner => "late_joiner",
            Self::Regular => "regular",
        }
    }

    /// Column name of this pattern's per-game count.
    #[must_use]
    pub fn count_column(self) -> &'static str {
        match self {
            Self::Scalper => "scalpers",
            Self::Whale => "whales",
            Self::Hodler => "hodlers",
            Self::Flipper => "flippers",
            Self::EarlyBird => "early_birds",
            Self::LateJoiner => "late_joiners",
            Self::Regular => "regular_traders",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TradingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fraction of the game before which an entry counts as early.
pub const EARLY_ENTRY_FRACTION: f64 = 0.3;
/// Fraction of the game after which an entry counts as late.
pub const LATE_ENTRY_FRACTION: f64 = 0.7;

/// One step of the classification chain.
#[derive(Clone, Copy)]
pub struct PatternRule {
    pub pattern: TradingPattern,
    /// Receives the player and the game duration in ticks.
    pub matches: fn(&PlayerAggregate, i64) -> bool,
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Classification rules in evaluation order.
pub const RULES: [PatternRule; TradingPattern::LEN] = [
    PatternRule {
        pattern: TradingPattern::Scalper,
        matches: |p, _| p.trades >= 5 && p.total_volume < 0.1,
    },
    PatternRule {
        pattern: TradingPattern::Whale,
        matches: |p, _| p.trades <= 2 && p.total_volume > 1.0,
    },
    PatternRule {
        pattern: TradingPattern::Hodler,
        matches: |p, _| p.sell_count == 0,
    },
    PatternRule {
        pattern: TradingPattern::Flipper,
        matches: |p, _| p.trades >= 4 && p.buy_count == p.sell_count,
    },
    PatternRule {
        pattern: TradingPattern::EarlyBird,
        matches: is_early_entry,
    },
    PatternRule {
        pattern: TradingPattern::LateJoiner,
        matches: is_late_entry,
    },
    PatternRule {
        pattern: TradingPattern::Regular,
        matches: |_, _| true,
    },
];

/// Whether the player's first trade came before 30% of the game.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn is_early_entry(player: &PlayerAggregate, game_duration: i64) -> bool {
    (player.entry_tick_or_zero() as f64) < game_duration as f64 * EARLY_ENTRY_FRACTION
}

/// Whether the player's first trade came after 70% of the game.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn is_late_entry(player: &PlayerAggregate, game_duration: i64) -> bool {
    (player.entry_tick_or_zero() as f64) > game_duration as f64 * LATE_ENTRY_FRACTION
}

/// Assigns the first matching pattern.
#[must_use]
pub fn classify(player: &PlayerAggregate, game_duration: i64) -> TradingPattern {
    RULES
        .iter()
        .find(|rule| (rule.matches)(player, game_duration))
        .map_or(TradingPattern::Regular, |rule| rule.pattern)
}

/// Number of players per pattern in one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatternCounts([usize; TradingPattern::LEN]);

impl PatternCounts {
    pub fn add(&mut self, pattern: TradingPattern) {
        self.0[pattern.index()] += 1;
    }

    #[must_use]
    pub fn get(&self, pattern: TradingPattern) -> usize {
        self.0[pattern.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Pattern/count pairs in [`TradingPattern::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (TradingPattern, usize)> + '_ {
        TradingPattern::ALL.iter().map(|&p| (p, self.get(p)))
    }
}

impl FromIterator<TradingPattern> for PatternCounts {
    fn from_iter<T: IntoIterator<Item = TradingPattern>>(iter: T) -> Self {
        let mut counts = Self::default();
        for pattern in iter {
            counts.add(pattern);
        }
        counts
    }
}

impl std::ops::AddAssign for PatternCounts {
    fn add_assign(&mut self, rhs: Self) {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0) {
            *lhs += rhs;
        }
    }
}
