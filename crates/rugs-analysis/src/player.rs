//! Per-player trade reconstruction.
//!
//! A game's event list is folded, in log order, into one [`PlayerAggregate`] per player
//! id. Aggregates are created on first sight through [`PlayerBook::get_or_insert_default`].
//!
//! # Encounter order
//!
//! `entry_tick` is the tick of the first trade *encountered* for a player and
//! `exit_tick` the tick of the last one encountered. When the log is not sorted by
//! tick these are not the earliest and latest ticks, and `trading_duration` can be
//! negative. Timing-based patterns inherit the same behavior.

use std::collections::HashMap;

use rugs_record::{TradeRecord, TradeSide, event::UNKNOWN};
use rugs_stats::descriptive::mean_or_zero;

use crate::{AnalysisError, tick_difference};

/// Running trade totals of one player within one game.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAggregate {
    pub player_id: String,
    /// Username from the most recent trade.
    pub username: String,
    /// Level from the most recent trade.
    pub level: i64,
    pub trades: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub total_volume: f64,
    pub total_cost: f64,
    pub total_proceeds: f64,
    pub entry_tick: Option<i64>,
    pub exit_tick: Option<i64>,
    pub buy_prices: Vec<f64>,
    pub sell_prices: Vec<f64>,
}

impl PlayerAggregate {
    /// Zero-initialized aggregate for a player not seen before.
    #[must_use]
    pub fn new(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            username: UNKNOWN.to_owned(),
            level: 0,
            trades: 0,
            buy_count: 0,
            sell_count: 0,
            total_volume: 0.0,
            total_cost: 0.0,
            total_proceeds: 0.0,
            entry_tick: None,
            exit_tick: None,
            buy_prices: vec![],
            sell_prices: vec![],
        }
    }

    /// Folds one trade into the aggregate.
    ///
    /// Identity fields are overwritten by every trade; `entry_tick` is only set once.
    /// A trade without a direction counts toward `trades` and the volume but is neither
    /// a buy nor a sell.
    pub fn record(&mut self, trade: &TradeRecord) {
        let tick = trade.tick_index.unwrap_or(0);
        self.trades += 1;
        self.total_volume += trade.qty;
        self.username.clone_from(&trade.username);
        self.level = trade.level;
        self.entry_tick.get_or_insert(tick);
        self.exit_tick = Some(tick);

        match trade.side {
            TradeSide::Buy => {
                self.buy_count += 1;
                self.total_cost += trade.cost;
                self.buy_prices.push(trade.price);
            }
            TradeSide::Sell => {
                self.sell_count += 1;
                self.total_proceeds += trade.proceeds;
                self.sell_prices.push(trade.price);
            }
            TradeSide::Unknown => {}
        }
    }

    /// `buy_count / max(sell_count, 1)`; biased upward for buy-only players.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn buy_sell_ratio(&self) -> f64 {
        self.buy_count as f64 / self.sell_count.max(1) as f64
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn avg_trade_size(&self) -> f64 {
        self.total_volume / self.trades.max(1) as f64
    }

    #[must_use]
    pub fn profit_loss(&self) -> f64 {
        self.total_proceeds - self.total_cost
    }

    #[must_use]
    pub fn avg_buy_price(&self) -> f64 {
        mean_or_zero(&self.buy_prices)
    }

    #[must_use]
    pub fn avg_sell_price(&self) -> f64 {
        mean_or_zero(&self.sell_prices)
    }

    /// Entry tick, treating "never traded" as tick 0.
    #[must_use]
    pub fn entry_tick_or_zero(&self) -> i64 {
        self.entry_tick.unwrap_or(0)
    }

    /// `exit_tick - entry_tick` in encounter order. Zero for a single trade.
    pub fn trading_duration(&self) -> Result<i64, AnalysisError> {
        tick_difference(
            "trading_duration",
            self.exit_tick.unwrap_or(0),
            self.entry_tick.unwrap_or(0),
        )
    }
}

/// Player aggregates of one game, keyed by player id, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct PlayerBook {
    players: Vec<PlayerAggregate>,
    index: HashMap<String, usize>,
}

impl PlayerBook {
    /// Reconstructs every player's aggregate from a game's trades, in log order.
    ///
    /// `buy_count + sell_count == trades` holds for players whose trades all carry a
    /// direction.
    pub fn from_trades<'a, I>(trades: I) -> Self
    where
        I: IntoIterator<Item = &'a TradeRecord>,
    {
        let mut book = Self::default();
        for trade in trades {
            book.get_or_insert_default(&trade.player_id).record(trade);
        }
        book
    }

    /// Returns the aggregate for `player_id`, creating a zeroed one if needed.
    pub fn get_or_insert_default(&mut self, player_id: &str) -> &mut PlayerAggregate {
        let idx = match self.index.get(player_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.players.len();
                self.players.push(PlayerAggregate::new(player_id));
                self.index.insert(player_id.to_owned(), idx);
                idx
            }
        };
        &mut self.players[idx]
    }

    #[must_use]
    pub fn get(&self, player_id: &str) -> Option<&PlayerAggregate> {
        self.index.get(player_id).map(|&idx| &self.players[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerAggregate> + '_ {
        self.players.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(player: &str, side: TradeSide, price: f64, qty: f64, tick: i64) -> TradeRecord {
        let amount = price * qty;
        TradeRecord {
            player_id: player.to_owned(),
            username: format!("{player}-name"),
            level: 5,
            side,
            price,
            qty,
            cost: if side == TradeSide::Buy { amount } else { 0.0 },
            proceeds: if side == TradeSide::Sell { amount } else { 0.0 },
            tick_index: Some(tick),
        }
    }

    #[test]
    fn test_get_or_insert_default_creates_zeroed_aggregate() {
        let mut book = PlayerBook::default();
        let agg = book.get_or_insert_default("p1");
        assert_eq!(*agg, PlayerAggregate::new("p1"));
        assert_eq!(agg.username, "unknown");
        book.get_or_insert_default("p1").trades += 1;
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("p1").unwrap().trades, 1);
        assert!(book.get("p2").is_none());
    }

    #[test]
    fn test_fold_accumulates_per_player() {
        let trades = [
            trade("a", TradeSide::Buy, 1.0, 0.5, 3),
            trade("b", TradeSide::Buy, 1.2, 1.0, 4),
            trade("a", TradeSide::Buy, 2.0, 0.5, 8),
            trade("a", TradeSide::Sell, 3.0, 1.0, 12),
        ];
        let book = PlayerBook::from_trades(&trades);
        let ids: Vec<_> = book.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let a = book.get("a").unwrap();
        assert_eq!(a.trades, 3);
        assert_eq!(a.buy_count, 2);
        assert_eq!(a.sell_count, 1);
        assert_eq!(a.total_volume, 2.0);
        assert_eq!(a.total_cost, 1.5);
        assert_eq!(a.total_proceeds, 3.0);
        assert_eq!(a.profit_loss(), 1.5);
        assert_eq!(a.avg_buy_price(), 1.5);
        assert_eq!(a.avg_sell_price(), 3.0);
        assert_eq!(a.buy_sell_ratio(), 2.0);
        assert_eq!(a.entry_tick, Some(3));
        assert_eq!(a.exit_tick, Some(12));
        assert_eq!(a.trading_duration(), Ok(9));
    }

    #[test]
    fn test_counts_add_up_and_ratio_guards_zero_sells() {
        let trades = [
            trade("a", TradeSide::Buy, 1.0, 1.0, 1),
            trade("a", TradeSide::Buy, 1.0, 1.0, 2),
            trade("a", TradeSide::Buy, 1.0, 1.0, 3),
        ];
        let book = PlayerBook::from_trades(&trades);
        for p in book.iter() {
            assert_eq!(p.buy_count + p.sell_count, p.trades);
        }
        let a = book.get("a").unwrap();
        assert_eq!(a.buy_sell_ratio(), 3.0);
        assert_eq!(a.avg_sell_price(), 0.0);
        assert_eq!(a.avg_trade_size(), 1.0);
    }

    #[test]
    fn test_identity_fields_last_write_wins() {
        let mut first = trade("a", TradeSide::Buy, 1.0, 1.0, 1);
        first.username = "old".to_owned();
        first.level = 3;
        let mut second = trade("a", TradeSide::Sell, 1.0, 1.0, 2);
        second.username = "new".to_owned();
        second.level = 31;
        let book = PlayerBook::from_trades(&[first, second]);
        let a = book.get("a").unwrap();
        assert_eq!(a.username, "new");
        assert_eq!(a.level, 31);
    }

    #[test]
    fn test_single_trade_has_zero_duration() {
        let book = PlayerBook::from_trades(&[trade("a", TradeSide::Buy, 1.0, 1.0, 17)]);
        let a = book.get("a").unwrap();
        assert_eq!(a.entry_tick, a.exit_tick);
        assert_eq!(a.trading_duration(), Ok(0));
    }

    #[test]
    fn test_entry_and_exit_follow_encounter_order_not_tick_order() {
        // Known limitation: out-of-order logs yield a negative duration and a late entry.
        let trades = [
            trade("a", TradeSide::Buy, 1.0, 1.0, 90),
            trade("a", TradeSide::Sell, 1.0, 1.0, 10),
        ];
        let book = PlayerBook::from_trades(&trades);
        let a = book.get("a").unwrap();
        assert_eq!(a.entry_tick, Some(90));
        assert_eq!(a.exit_tick, Some(10));
        assert_eq!(a.trading_duration(), Ok(-80));
    }

    #[test]
    fn test_missing_tick_counts_as_tick_zero() {
        let mut t = trade("a", TradeSide::Buy, 1.0, 1.0, 0);
        t.tick_index = None;
        let book = PlayerBook::from_trades(&[t]);
        assert_eq!(book.get("a").unwrap().entry_tick, Some(0));
    }

    #[test]
    fn test_trade_without_direction_counts_but_is_neither_side() {
        let mut untyped = trade("a", TradeSide::Buy, 1.0, 0.5, 4);
        untyped.side = TradeSide::Unknown;
        untyped.cost = 0.0;
        let trades = [
            untyped,
            trade("b", TradeSide::Buy, 1.0, 0.5, 5),
            trade("a", TradeSide::Sell, 2.0, 1.0, 9),
        ];
        let book = PlayerBook::from_trades(&trades);
        assert_eq!(book.len(), 2);

        let a = book.get("a").unwrap();
        assert_eq!(a.trades, 2);
        assert_eq!(a.total_volume, 1.5);
        assert_eq!(a.buy_count, 0);
        assert_eq!(a.sell_count, 1);
        assert_eq!(a.buy_count + a.sell_count + 1, a.trades);
        assert_eq!(a.username, "a-name");
        assert_eq!(a.entry_tick, Some(4));
        assert_eq!(a.exit_tick, Some(9));
        assert!(a.buy_prices.is_empty());
        assert_eq!(a.total_cost, 0.0);
    }

    #[test]
    fn test_extreme_ticks_overflow_duration() {
        let trades = [
            trade("a", TradeSide::Buy, 1.0, 1.0, i64::MIN),
            trade("a", TradeSide::Sell, 1.0, 1.0, i64::MAX),
        ];
        let book = PlayerBook::from_trades(&trades);
        assert!(matches!(
            book.get("a").unwrap().trading_duration(),
            Err(AnalysisError::TickOverflow { field: "trading_duration", .. })
        ));
    }
}
