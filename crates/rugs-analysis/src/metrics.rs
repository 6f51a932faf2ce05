//! Game-level metrics enriched with per-player statistics.
//!
//! [`GameMetricsRecord::from_game`] reconstructs the players of one game, classifies
//! them, and folds everything into a single flat row together with the recorder's own
//! counters and a composite risk score.

use rugs_record::GameRecord;
use rugs_stats::{
    descriptive::mean_or_zero,
    round::{PRICE_DIGITS, SHORT_RATIO_DIGITS, round_to},
};

use crate::{
    AnalysisError, ensure_finite,
    pattern::{self, PatternCounts, TradingPattern},
    player::PlayerBook,
    summary::is_instarug,
    table::{Cell, TableRow},
};

/// Floor applied to denominators that may legitimately be zero.
const DENOMINATOR_FLOOR: f64 = 0.001;
/// Players above this level count as high level.
pub const HIGH_LEVEL_THRESHOLD: i64 = 30;
/// Games lasting this many ticks or longer carry no duration risk.
pub const DURATION_RISK_HORIZON: f64 = 500.0;
/// Games with this many trades or more carry full activity risk.
pub const ACTIVITY_RISK_SATURATION: f64 = 100.0;

/// Sub-scores in `[0, 1]` and their weighted combination.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskScores {
    pub duration: f64,
    pub concentration: f64,
    pub activity: f64,
    pub composite: f64,
}

impl RiskScores {
    pub const DURATION_WEIGHT: f64 = 0.4;
    pub const CONCENTRATION_WEIGHT: f64 = 0.3;
    pub const ACTIVITY_WEIGHT: f64 = 0.3;

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(duration_ticks: i64, top_player_volume_ratio: f64, total_trades: i64) -> Self {
        let duration = (1.0 - duration_ticks as f64 / DURATION_RISK_HORIZON).clamp(0.0, 1.0);
        let concentration = top_player_volume_ratio.clamp(0.0, 1.0);
        let activity = (total_trades as f64 / ACTIVITY_RISK_SATURATION).clamp(0.0, 1.0);
        let composite = Self::DURATION_WEIGHT * duration
            + Self::CONCENTRATION_WEIGHT * concentration
            + Self::ACTIVITY_WEIGHT * activity;
        Self {
            duration,
            concentration,
            activity,
            composite,
        }
    }
}

/// One row of the player-metrics table.
///
/// Ratios and sums are rounded to their output precision on construction; everything
/// they are derived from is computed at full precision.
#[derive(Debug, Clone, PartialEq)]
pub struct GameMetricsRecord {
    pub game_id: String,
    pub timestamp: String,

    pub duration_ticks: i64,
    pub peak_multiplier: f64,
    pub final_price: f64,
    pub is_instarug: bool,

    pub total_trades: i64,
    pub unique_players: i64,
    pub buy_orders: i64,
    pub sell_orders: i64,
    pub buy_sell_ratio: f64,

    pub players_actually_trading: usize,
    pub avg_trades_per_player: f64,
    pub avg_volume_per_player: f64,
    pub top_player_volume_ratio: f64,

    pub profitable_players: usize,
    pub profitable_player_ratio: f64,
    pub total_profits: f64,
    pub total_losses: f64,
    pub profit_loss_ratio: f64,

    pub early_entry_players: usize,
    pub late_entry_players: usize,
    pub early_entry_ratio: f64,

    pub avg_player_level: f64,
    pub high_level_players: usize,
    pub high_level_ratio: f64,

    pub patterns: PatternCounts,
    pub risk: RiskScores,
}

/// Player-derived aggregates of one game, before rounding.
#[derive(Debug, Clone, Default)]
struct PlayerTotals {
    players: usize,
    avg_trades: f64,
    avg_volume: f64,
    top_volume_ratio: f64,
    profitable: usize,
    profits: f64,
    losses: f64,
    early_entries: usize,
    late_entries: usize,
    avg_level: f64,
    high_level: usize,
    patterns: PatternCounts,
}

impl PlayerTotals {
    #[expect(clippy::cast_precision_loss)]
    fn new(book: &PlayerBook, duration_ticks: i64) -> Self {
        if book.is_empty() {
            return Self::default();
        }
        let trades = book.iter().map(|p| p.trades as f64).collect::<Vec<_>>();
        let volumes = book.iter().map(|p| p.total_volume).collect::<Vec<_>>();
        let levels = book
            .iter()
            .filter(|p| p.level > 0)
            .map(|p| p.level as f64)
            .collect::<Vec<_>>();
        let total_volume = volumes.iter().sum::<f64>();
        let top_volume = volumes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            players: book.len(),
            avg_trades: mean_or_zero(&trades),
            avg_volume: mean_or_zero(&volumes),
            top_volume_ratio: top_volume / total_volume.max(DENOMINATOR_FLOOR),
            profitable: book.iter().filter(|p| p.profit_loss() > 0.0).count(),
            profits: book.iter().map(|p| p.profit_loss().max(0.0)).sum(),
            losses: book.iter().map(|p| p.profit_loss().min(0.0)).sum::<f64>().abs(),
            early_entries: book
                .iter()
                .filter(|p| pattern::is_early_entry(p, duration_ticks))
                .count(),
            late_entries: book
                .iter()
                .filter(|p| pattern::is_late_entry(p, duration_ticks))
                .count(),
            avg_level: mean_or_zero(&levels),
            high_level: book
                .iter()
                .filter(|p| p.level > HIGH_LEVEL_THRESHOLD)
                .count(),
            patterns: book
                .iter()
                .map(|p| pattern::classify(p, duration_ticks))
                .collect(),
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn per_player(count: usize, players: usize) -> f64 {
    count as f64 / players.max(1) as f64
}

impl GameMetricsRecord {
    #[expect(clippy::cast_precision_loss)]
    pub fn from_game(game: &GameRecord) -> Result<Self, AnalysisError> {
        let summary = &game.analysis;
        let duration_ticks = summary.final_tick;
        let activity = summary.trading_activity;

        let book = PlayerBook::from_trades(game.trades());
        let totals = PlayerTotals::new(&book, duration_ticks);
        let risk = RiskScores::new(duration_ticks, totals.top_volume_ratio, summary.total_trades);

        let short = |field: &'static str, value: f64| {
            ensure_finite(field, value).map(|v| round_to(v, SHORT_RATIO_DIGITS))
        };

        Ok(Self {
            game_id: game.game_id.clone(),
            timestamp: game.recording_start.clone(),

            duration_ticks,
            peak_multiplier: short("peak_multiplier", summary.peak_multiplier)?,
            final_price: round_to(ensure_finite("final_price", game.final_price())?, PRICE_DIGITS),
            is_instarug: is_instarug(duration_ticks),

            total_trades: summary.total_trades,
            unique_players: summary.unique_players,
            buy_orders: activity.buy_orders,
            sell_orders: activity.sell_orders,
            buy_sell_ratio: round_to(
                activity.buy_orders as f64 / activity.sell_orders.max(1) as f64,
                SHORT_RATIO_DIGITS,
            ),

            players_actually_trading: totals.players,
            avg_trades_per_player: round_to(totals.avg_trades, 2),
            avg_volume_per_player: short("avg_volume_per_player", totals.avg_volume)?,
            top_player_volume_ratio: short("top_player_volume_ratio", totals.top_volume_ratio)?,

            profitable_players: totals.profitable,
            profitable_player_ratio: round_to(
                per_player(totals.profitable, totals.players),
                SHORT_RATIO_DIGITS,
            ),
            total_profits: short("total_profits", totals.profits)?,
            total_losses: short("total_losses", totals.losses)?,
            profit_loss_ratio: short(
                "profit_loss_ratio",
                totals.profits / totals.losses.max(DENOMINATOR_FLOOR),
            )?,

            early_entry_players: totals.early_entries,
            late_entry_players: totals.late_entries,
            early_entry_ratio: round_to(
                per_player(totals.early_entries, totals.players),
                SHORT_RATIO_DIGITS,
            ),

            avg_player_level: round_to(totals.avg_level, 1),
            high_level_players: totals.high_level,
            high_level_ratio: round_to(
                per_player(totals.high_level, totals.players),
                SHORT_RATIO_DIGITS,
            ),

            patterns: totals.patterns,
            risk: RiskScores {
                duration: round_to(risk.duration, SHORT_RATIO_DIGITS),
                concentration: round_to(risk.concentration, SHORT_RATIO_DIGITS),
                activity: round_to(risk.activity, SHORT_RATIO_DIGITS),
                composite: short("composite_risk_score", risk.composite)?,
            },
        })
    }
}

impl TableRow for GameMetricsRecord {
    const COLUMNS: &'static [&'static str] = &[
        "gameId",
        "timestamp",
        "duration_ticks",
        "peak_multiplier",
        "final_price",
        "is_instarug",
        "total_trades",
        "unique_players",
        "buy_orders",
        "sell_orders",
        "buy_sell_ratio",
        "players_actually_trading",
        "avg_trades_per_player",
        "avg_volume_per_player",
        "top_player_volume_ratio",
        "profitable_players",
        "profitable_player_ratio",
        "total_profits",
        "total_losses",
        "profit_loss_ratio",
        "early_entry_players",
        "late_entry_players",
        "early_entry_ratio",
        "avg_player_level",
        "high_level_players",
        "high_level_ratio",
        "scalpers",
        "whales",
        "hodlers",
        "flippers",
        "early_birds",
        "late_joiners",
        "regular_traders",
        "duration_risk",
        "concentration_risk",
        "activity_risk",
        "composite_risk_score",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        let mut cells: Vec<Cell<'_>> = vec![
            self.game_id.as_str().into(),
            self.timestamp.as_str().into(),
            self.duration_ticks.into(),
            self.peak_multiplier.into(),
            self.final_price.into(),
            self.is_instarug.into(),
            self.total_trades.into(),
            self.unique_players.into(),
            self.buy_orders.into(),
            self.sell_orders.into(),
            self.buy_sell_ratio.into(),
            self.players_actually_trading.into(),
            self.avg_trades_per_player.into(),
            self.avg_volume_per_player.into(),
            self.top_player_volume_ratio.into(),
            self.profitable_players.into(),
            self.profitable_player_ratio.into(),
            self.total_profits.into(),
            self.total_losses.into(),
            self.profit_loss_ratio.into(),
            self.early_entry_players.into(),
            self.late_entry_players.into(),
            self.early_entry_ratio.into(),
            self.avg_player_level.into(),
            self.high_level_players.into(),
            self.high_level_ratio.into(),
        ];
        cells.extend(self.patterns.iter().map(|(_, count)| Cell::from(count)));
        cells.extend([
            self.risk.duration.into(),
            self.risk.concentration.into(),
            self.risk.activity.into(),
            self.risk.composite.into(),
        ]);
        cells
    }
}

/// Batch-level statistics of the player-metrics table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsReport {
    pub records: usize,
    pub average_composite_risk: f64,
    pub instarugs: usize,
    pub players: usize,
    pub patterns: PatternCounts,
}

impl MetricsReport {
    #[must_use]
    pub fn from_rows(rows: &[GameMetricsRecord]) -> Self {
        let risks = rows.iter().map(|r| r.risk.composite).collect::<Vec<_>>();
        let mut patterns = PatternCounts::default();
        for row in rows {
            patterns += row.patterns;
        }
        Self {
            records: rows.len(),
            average_composite_risk: mean_or_zero(&risks),
            instarugs: rows.iter().filter(|r| r.is_instarug).count(),
            players: rows.iter().map(|r| r.players_actually_trading).sum(),
            patterns,
        }
    }

    /// The most common pattern across the batch, if any player traded.
    #[must_use]
    pub fn dominant_pattern(&self) -> Option<TradingPattern> {
        self.patterns
            .iter()
            .filter(|&(_, count)| count > 0)
            .max_by_key(|&(_, count)| count)
            .map(|(pattern, _)| pattern)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: &serde_json::Value) -> GameRecord {
        GameRecord::parse_line(&value.to_string()).unwrap()
    }

    fn trade(player: &str, side: &str, qty: f64, amount: f64, tick: i64, level: i64) -> serde_json::Value {
        let mut data = json!({
            "playerId": player,
            "username": player,
            "level": level,
            "type": side,
            "price": 1.0,
            "qty": qty,
            "tickIndex": tick,
        });
        let amount_key = if side == "buy" { "cost" } else { "proceeds" };
        data[amount_key] = json!(amount);
        json!({ "eventType": "newTrade", "data": data })
    }

    #[test]
    fn test_columns_match_cells() {
        let row = GameMetricsRecord::from_game(&GameRecord::default()).unwrap();
        assert_eq!(row.cells().len(), GameMetricsRecord::COLUMNS.len());
        assert_eq!(GameMetricsRecord::COLUMNS.len(), 37);
    }

    #[test]
    fn test_single_entry_instarug() {
        let game = parse(&json!({
            "gameId": "g",
            "analysis": {
                "finalTick": 5,
                "priceProgression": [{ "tick": 5, "price": 1.5 }]
            }
        }));
        let row = GameMetricsRecord::from_game(&game).unwrap();
        assert!(row.is_instarug);
        assert_eq!(row.final_price, 1.5);
    }

    #[test]
    fn test_instarug_matches_duration() {
        for final_tick in [0, 10, 11, 250] {
            let mut game = GameRecord::default();
            game.analysis.final_tick = final_tick;
            let row = GameMetricsRecord::from_game(&game).unwrap();
            assert_eq!(row.is_instarug, final_tick < 11);
        }
    }

    #[test]
    fn test_zero_risk() {
        let risk = RiskScores::new(500, 0.0, 0);
        assert_eq!(risk.composite, 0.0);
        assert_eq!(risk, RiskScores::default());
    }

    #[test]
    fn test_risk_sub_scores_are_clamped() {
        let risk = RiskScores::new(-100, 3.0, 1_000);
        assert_eq!(risk.duration, 1.0);
        assert_eq!(risk.concentration, 1.0);
        assert_eq!(risk.activity, 1.0);
        assert!((risk.composite - 1.0).abs() < 1e-12);

        let risk = RiskScores::new(250, 0.5, 50);
        assert_eq!(risk.duration, 0.5);
        assert!((risk.composite - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_players_uses_zero_defaults() {
        let game = parse(&json!({
            "gameId": "quiet",
            "analysis": { "finalTick": 400, "totalTrades": 0 },
            "events": [{ "eventType": "gameStateUpdate", "data": {} }]
        }));
        let row = GameMetricsRecord::from_game(&game).unwrap();
        assert_eq!(row.players_actually_trading, 0);
        assert_eq!(row.avg_player_level, 0.0);
        assert_eq!(row.top_player_volume_ratio, 0.0);
        assert_eq!(row.profit_loss_ratio, 0.0);
        assert_eq!(row.patterns.total(), 0);
    }

    #[test]
    fn test_player_aggregation() {
        let game = parse(&json!({
            "gameId": "busy",
            "recordingStart": "2025-01-01T00:00:00Z",
            "analysis": {
                "finalTick": 100,
                "peakMultiplier": 2.34567,
                "totalTrades": 50,
                "tradingActivity": { "buyOrders": 4, "sellOrders": 3 }
            },
            "events": [
                trade("a", "buy", 0.3, 1.0, 5, 40),
                trade("a", "sell", 0.3, 2.0, 50, 40),
                trade("b", "buy", 0.4, 1.0, 80, 0),
                trade("b", "sell", 0.4, 0.5, 90, 0),
                trade("c", "buy", 0.5, 0.5, 40, 10),
            ]
        }));
        let row = GameMetricsRecord::from_game(&game).unwrap();
        assert_eq!(row.peak_multiplier, 2.346);
        assert_eq!(row.buy_sell_ratio, 1.333);
        assert_eq!(row.players_actually_trading, 3);
        assert_eq!(row.avg_trades_per_player, 1.67);
        assert_eq!(row.avg_volume_per_player, 0.633);
        // b: 0.8 of 1.9 total volume
        assert_eq!(row.top_player_volume_ratio, 0.421);
        assert_eq!(row.profitable_players, 1);
        assert_eq!(row.profitable_player_ratio, 0.333);
        assert_eq!(row.total_profits, 1.0);
        assert_eq!(row.total_losses, 1.0);
        assert_eq!(row.profit_loss_ratio, 1.0);
        assert_eq!(row.early_entry_players, 1);
        assert_eq!(row.late_entry_players, 1);
        // level 0 is excluded from the average
        assert_eq!(row.avg_player_level, 25.0);
        assert_eq!(row.high_level_players, 1);
        assert_eq!(row.patterns.get(TradingPattern::EarlyBird), 1);
        assert_eq!(row.patterns.get(TradingPattern::LateJoiner), 1);
        assert_eq!(row.patterns.get(TradingPattern::Hodler), 1);
        assert_eq!(row.risk.duration, 0.8);
        assert_eq!(row.risk.activity, 0.5);
    }

    #[test]
    fn test_untyped_trade_still_counts_its_player() {
        let mut untyped = trade("a", "buy", 0.5, 0.0, 3, 1);
        untyped["data"].as_object_mut().unwrap().remove("type");
        let game = parse(&json!({
            "gameId": "untyped",
            "analysis": { "finalTick": 100 },
            "events": [untyped, trade("b", "buy", 0.5, 0.5, 4, 1)]
        }));
        let row = GameMetricsRecord::from_game(&game).unwrap();
        assert_eq!(row.players_actually_trading, 2);
        assert_eq!(row.avg_volume_per_player, 0.5);
        assert_eq!(row.avg_trades_per_player, 1.0);
        assert_eq!(row.top_player_volume_ratio, 0.5);
        assert_eq!(row.patterns.total(), 2);
    }

    #[test]
    fn test_non_finite_input_fails_the_game() {
        let mut game = GameRecord::default();
        game.analysis.peak_multiplier = f64::INFINITY;
        assert_eq!(
            GameMetricsRecord::from_game(&game),
            Err(AnalysisError::NonFinite {
                field: "peak_multiplier"
            })
        );
    }

    #[test]
    fn test_report_totals() {
        let mut game = GameRecord::default();
        game.analysis.final_tick = 5;
        let row = GameMetricsRecord::from_game(&game).unwrap();
        let report = MetricsReport::from_rows(&[row.clone(), row]);
        assert_eq!(report.records, 2);
        assert_eq!(report.instarugs, 2);
        assert_eq!(report.dominant_pattern(), None);
        assert!((report.average_composite_risk - 0.396).abs() < 1e-12);
    }
}
