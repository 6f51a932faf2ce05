//! Tick-by-tick feature extraction.
//!
//! One [`TickFeatureRecord`] is produced per price-progression entry, in source order.
//! Tick numbers in the progression may repeat or skip, so every window below is taken
//! over *positions* in the progression, never over tick numbers. Only the trade lookup
//! matches on the tick number itself.

use std::collections::{HashMap, HashSet};

use rugs_record::{GameRecord, TradeRecord, TradeSide};
use rugs_stats::{
    descriptive::{mean, sample_std_dev},
    round::{PRICE_DIGITS, RATIO_DIGITS, SHORT_RATIO_DIGITS, round_to},
};

use crate::{
    AnalysisError, ensure_finite,
    tick_difference,
    summary::is_instarug,
    table::{Cell, TableRow},
};

/// Number of prices in the rolling volatility window.
pub const VOLATILITY_WINDOW: usize = 10;
/// Positions looked back by `price_change_5tick`.
pub const LONG_CHANGE_LAG: usize = 5;
/// Ticks before the rug that count as near it.
pub const NEAR_RUG_TICKS: i64 = 5;
/// Ticks before the rug that count as very near it.
pub const VERY_NEAR_RUG_TICKS: i64 = 2;

const PRICE_FLOOR: f64 = 0.001;

/// Features of one price sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TickFeatureRecord {
    pub game_id: String,
    pub tick: i64,
    pub price: f64,
    pub timestamp: String,

    pub tick_position_ratio: f64,
    pub ticks_to_rug: i64,
    pub is_near_rug: bool,
    pub is_very_near_rug: bool,

    pub current_peak_so_far: f64,
    pub peak_ratio: f64,
    pub price_change_1tick: f64,
    pub price_change_5tick: f64,
    pub price_velocity: f64,

    pub volatility: RollingVolatility,

    pub activity: TickActivity,

    pub tick_interval: f64,
    pub interval_deviation: f64,

    pub final_tick: i64,
    pub peak_multiplier: f64,
    pub is_instarug: bool,
}

/// Statistics of the absolute price changes inside the rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RollingVolatility {
    /// Sample standard deviation; 0 with fewer than two changes.
    pub volatility: f64,
    pub avg_change: f64,
    pub max_change: f64,
}

impl RollingVolatility {
    /// Computes the statistics of the consecutive absolute differences of `prices`.
    #[must_use]
    pub fn from_window(prices: &[f64]) -> Self {
        let changes = prices
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .collect::<Vec<_>>();
        Self {
            volatility: sample_std_dev(&changes).unwrap_or(0.0),
            avg_change: mean(&changes).unwrap_or(0.0),
            max_change: changes.iter().copied().reduce(f64::max).unwrap_or(0.0),
        }
    }
}

/// Trades whose tick index equals one sample's tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickActivity {
    pub buy_orders: usize,
    pub sell_orders: usize,
    /// Quantity of every trade at the tick, including those without a direction.
    pub volume: f64,
    pub players_active: usize,
}

impl TickActivity {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn buy_sell_ratio(&self) -> f64 {
        self.buy_orders as f64 / self.sell_orders.max(1) as f64
    }

    #[expect(clippy::cast_possible_wrap)]
    #[must_use]
    pub fn net_order_flow(&self) -> i64 {
        self.buy_orders as i64 - self.sell_orders as i64
    }
}

/// Trade activity of one game, indexed by exact tick.
///
/// Trades without a tick index are never matched.
#[derive(Debug, Default)]
struct ActivityIndex<'a> {
    ticks: HashMap<i64, (TickActivity, HashSet<&'a str>)>,
}

impl<'a> ActivityIndex<'a> {
    fn new<I>(trades: I) -> Self
    where
        I: IntoIterator<Item = &'a TradeRecord>,
    {
        let mut index = Self::default();
        for trade in trades {
            let Some(tick) = trade.tick_index else {
                continue;
            };
            let (activity, players) = index.ticks.entry(tick).or_default();
            match trade.side {
                TradeSide::Buy => activity.buy_orders += 1,
                TradeSide::Sell => activity.sell_orders += 1,
                TradeSide::Unknown => {}
            }
            activity.volume += trade.qty;
            players.insert(trade.player_id.as_str());
            activity.players_active = players.len();
        }
        index
    }

    fn at(&self, tick: i64) -> TickActivity {
        self.ticks
            .get(&tick)
            .map(|(activity, _)| *activity)
            .unwrap_or_default()
    }
}

fn relative_change(price: f64, base: f64) -> f64 {
    (price - base) / base.max(PRICE_FLOOR)
}

impl TickFeatureRecord {
    /// Extracts one record per price sample of `game`.
    #[expect(clippy::cast_precision_loss)]
    pub fn from_game(game: &GameRecord) -> Result<Vec<Self>, AnalysisError> {
        let summary = &game.analysis;
        let final_tick = summary.final_tick;
        let peak_multiplier = ensure_finite("peak_multiplier", summary.peak_multiplier)?;
        let activity = ActivityIndex::new(game.trades());

        let prices = summary
            .price_progression
            .iter()
            .map(|p| ensure_finite("price", p.price))
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(prices.len());
        let mut peak = f64::NEG_INFINITY;
        let mut interval_sum = 0.0;
        let mut intervals_seen = 0_usize;

        for (i, point) in summary.price_progression.iter().enumerate() {
            let price = prices[i];
            peak = peak.max(price);

            let ticks_to_rug = tick_difference("ticks_to_rug", final_tick, point.tick)?;
            let price_change_1tick = match i {
                0 => 0.0,
                _ => relative_change(price, prices[i - 1]),
            };
            let price_change_5tick = if i >= LONG_CHANGE_LAG {
                relative_change(price, prices[i - LONG_CHANGE_LAG])
            } else {
                0.0
            };
            let price_velocity = if i >= 2 {
                (prices[i] - prices[i - 1]) - (prices[i - 1] - prices[i - 2])
            } else {
                0.0
            };
            let window_start = (i + 1).saturating_sub(VOLATILITY_WINDOW);
            let volatility = RollingVolatility::from_window(&prices[window_start..=i]);

            let tick_interval = match summary.tick_intervals.get(i) {
                Some(&interval) => {
                    interval_sum += interval;
                    intervals_seen += 1;
                    ensure_finite("tick_interval", interval)?
                }
                None => 0.0,
            };
            let avg_interval = if intervals_seen == 0 {
                0.0
            } else {
                interval_sum / intervals_seen as f64
            };
            let interval_deviation = (tick_interval - avg_interval) / avg_interval.max(1.0);

            let tick_activity = activity.at(point.tick);

            records.push(Self {
                game_id: game.game_id.clone(),
                tick: point.tick,
                price: round_to(price, PRICE_DIGITS),
                timestamp: point.timestamp.clone(),

                tick_position_ratio: round_to(
                    point.tick as f64 / final_tick.max(1) as f64,
                    RATIO_DIGITS,
                ),
                ticks_to_rug,
                is_near_rug: ticks_to_rug <= NEAR_RUG_TICKS,
                is_very_near_rug: ticks_to_rug <= VERY_NEAR_RUG_TICKS,

                current_peak_so_far: round_to(peak, PRICE_DIGITS),
                peak_ratio: round_to(price / peak.max(PRICE_FLOOR), RATIO_DIGITS),
                price_change_1tick: round_to(
                    ensure_finite("price_change_1tick", price_change_1tick)?,
                    RATIO_DIGITS,
                ),
                price_change_5tick: round_to(
                    ensure_finite("price_change_5tick", price_change_5tick)?,
                    RATIO_DIGITS,
                ),
                price_velocity: round_to(
                    ensure_finite("price_velocity", price_velocity)?,
                    PRICE_DIGITS,
                ),

                volatility: RollingVolatility {
                    volatility: round_to(
                        ensure_finite("rolling_volatility", volatility.volatility)?,
                        PRICE_DIGITS,
                    ),
                    avg_change: round_to(volatility.avg_change, PRICE_DIGITS),
                    max_change: round_to(volatility.max_change, PRICE_DIGITS),
                },

                activity: TickActivity {
                    volume: round_to(
                        ensure_finite("volume_at_tick", tick_activity.volume)?,
                        RATIO_DIGITS,
                    ),
                    ..tick_activity
                },

                tick_interval,
                interval_deviation: round_to(
                    ensure_finite("interval_deviation", interval_deviation)?,
                    RATIO_DIGITS,
                ),

                final_tick,
                peak_multiplier: round_to(peak_multiplier, PRICE_DIGITS),
                is_instarug: is_instarug(final_tick),
            });
        }
        Ok(records)
    }
}

impl TableRow for TickFeatureRecord {
    const COLUMNS: &'static [&'static str] = &[
        "gameId",
        "tick",
        "price",
        "timestamp",
        "tick_position_ratio",
        "ticks_to_rug",
        "is_near_rug",
        "is_very_near_rug",
        "current_peak_so_far",
        "peak_ratio",
        "price_change_1tick",
        "price_change_5tick",
        "price_velocity",
        "rolling_volatility",
        "rolling_avg_change",
        "rolling_max_change",
        "buy_orders_at_tick",
        "sell_orders_at_tick",
        "volume_at_tick",
        "players_active_at_tick",
        "buy_sell_ratio_at_tick",
        "net_order_flow",
        "tick_interval",
        "interval_deviation",
        "final_tick",
        "peak_multiplier",
        "is_instarug",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            self.game_id.as_str().into(),
            self.tick.into(),
            self.price.into(),
            self.timestamp.as_str().into(),
            self.tick_position_ratio.into(),
            self.ticks_to_rug.into(),
            self.is_near_rug.into(),
            self.is_very_near_rug.into(),
            self.current_peak_so_far.into(),
            self.peak_ratio.into(),
            self.price_change_1tick.into(),
            self.price_change_5tick.into(),
            self.price_velocity.into(),
            self.volatility.volatility.into(),
            self.volatility.avg_change.into(),
            self.volatility.max_change.into(),
            self.activity.buy_orders.into(),
            self.activity.sell_orders.into(),
            self.activity.volume.into(),
            self.activity.players_active.into(),
            round_to(self.activity.buy_sell_ratio(), SHORT_RATIO_DIGITS).into(),
            self.activity.net_order_flow().into(),
            self.tick_interval.into(),
            self.interval_deviation.into(),
            self.final_tick.into(),
            self.peak_multiplier.into(),
            self.is_instarug.into(),
        ]
    }
}

/// Batch-level statistics of the tick-feature table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    pub total_rows: usize,
    pub games: usize,
    pub avg_ticks_per_game: f64,
    /// Mean of the non-zero rolling volatilities.
    pub avg_volatility: f64,
    pub avg_trades_per_tick: f64,
    /// Mean of the non-zero rolling volatilities of near-rug rows.
    pub near_rug_volatility: f64,
}

impl TickReport {
    /// Lower bound of the denominator of [`Self::volatility_spike`].
    pub const SPIKE_FLOOR: f64 = 1e-6;

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_rows(rows: &[TickFeatureRecord]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let games = rows
            .iter()
            .map(|r| r.game_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let non_zero_volatility = |near_rug_only: bool| {
            rows.iter()
                .filter(|r| !near_rug_only || r.is_near_rug)
                .map(|r| r.volatility.volatility)
                .filter(|&v| v > 0.0)
                .collect::<Vec<_>>()
        };
        let trades = rows
            .iter()
            .map(|r| r.activity.buy_orders + r.activity.sell_orders)
            .sum::<usize>();

        Self {
            total_rows: rows.len(),
            games,
            avg_ticks_per_game: rows.len() as f64 / games as f64,
            avg_volatility: mean(&non_zero_volatility(false)).unwrap_or(0.0),
            avg_trades_per_tick: trades as f64 / rows.len() as f64,
            near_rug_volatility: mean(&non_zero_volatility(true)).unwrap_or(0.0),
        }
    }

    /// Near-rug volatility relative to the overall volatility.
    #[must_use]
    pub fn volatility_spike(&self) -> f64 {
        self.near_rug_volatility / self.avg_volatility.max(Self::SPIKE_FLOOR)
    }
}
