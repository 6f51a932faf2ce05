//! Recorded game sessions.
//!
//! One line of the game log holds one [`GameRecord`]:
//!
//! ```text
//! GameRecord
//! ├─ gameId, recordingStart
//! ├─ analysis: AnalysisSummary
//! │   ├─ finalTick, peakMultiplier
//! │   ├─ priceProgression: [{ tick, price, timestamp }]
//! │   ├─ tickIntervals: [number]
//! │   └─ totalTrades, uniquePlayers, tradingActivity { buyOrders, sellOrders }
//! └─ events: [{ eventType, data }]
//! ```
//!
//! Records are immutable once parsed.

use serde_json::Value;

use crate::{
    ParseError,
    coerce::{Coerce as _, field_or, list},
    event::{Event, TradeRecord},
};

/// A single recorded game.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameRecord {
    pub game_id: String,
    pub recording_start: String,
    pub analysis: AnalysisSummary,
    pub events: Vec<Event>,
}

/// The recorder's summary of a game.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisSummary {
    /// Tick at which the game stopped; also the game duration in ticks.
    pub final_tick: i64,
    pub peak_multiplier: f64,
    /// Price samples in recording order. Tick numbers may repeat or skip.
    pub price_progression: Vec<PricePoint>,
    pub tick_intervals: Vec<f64>,
    pub total_trades: i64,
    pub unique_players: i64,
    pub trading_activity: TradingActivity,
}

/// Order counters reported by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TradingActivity {
    pub buy_orders: i64,
    pub sell_orders: i64,
}

/// One entry of the price progression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PricePoint {
    pub tick: i64,
    pub price: f64,
    pub timestamp: String,
}

impl GameRecord {
    /// Parses one log line.
    ///
    /// Malformed JSON and non-object lines are rejected; fields inside an object are
    /// read leniently (see [`crate::coerce`]).
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(line).map_err(ParseError::Json)?;
        if !value.is_object() {
            return Err(ParseError::NotAnObject {
                kind: json_kind(&value),
            });
        }
        Ok(Self::from_value(&value))
    }

    /// Builds a record from a JSON object.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let analysis = value.get("analysis").unwrap_or(&Value::Null);
        Self {
            game_id: field_or(value, "gameId", String::new()),
            recording_start: field_or(value, "recordingStart", String::new()),
            analysis: AnalysisSummary::from_value(analysis),
            events: list(value, "events").iter().map(Event::from_value).collect(),
        }
    }

    /// Identifier used in log messages; `"unknown"` when the record has none.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.game_id.is_empty() {
            crate::event::UNKNOWN
        } else {
            &self.game_id
        }
    }

    /// Trade events in log order.
    pub fn trades(&self) -> impl Iterator<Item = &TradeRecord> + '_ {
        self.events.iter().filter_map(Event::as_trade)
    }

    /// Price of the last sample before the stop, used as the game's final price.
    ///
    /// The terminal sample records the post-stop price, so the entry immediately
    /// preceding it is used. A single sample is its own final price; no samples give 0.
    #[must_use]
    pub fn final_price(&self) -> f64 {
        let progression = &self.analysis.price_progression;
        match progression.len() {
            0 => 0.0,
            1 => progression[0].price,
            n => progression[n - 2].price,
        }
    }
}

impl AnalysisSummary {
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let activity = value.get("tradingActivity").unwrap_or(&Value::Null);
        Self {
            final_tick: field_or(value, "finalTick", 0),
            peak_multiplier: field_or(value, "peakMultiplier", 0.0),
            price_progression: list(value, "priceProgression")
                .iter()
                .zip(0..)
                .map(|(point, index)| PricePoint::from_value(point, index))
                .collect(),
            tick_intervals: list(value, "tickIntervals")
                .iter()
                .map(|v| f64::coerce(v).unwrap_or(0.0))
                .collect(),
            total_trades: field_or(value, "totalTrades", 0),
            unique_players: field_or(value, "uniquePlayers", 0),
            trading_activity: TradingActivity {
                buy_orders: field_or(activity, "buyOrders", 0),
                sell_orders: field_or(activity, "sellOrders", 0),
            },
        }
    }
}

impl PricePoint {
    /// Builds a price sample; a missing tick falls back to the sample's position.
    #[must_use]
    pub fn from_value(value: &Value, index: i64) -> Self {
        Self {
            tick: field_or(value, "tick", index),
            price: field_or(value, "price", 0.0),
            timestamp: field_or(value, "timestamp", String::new()),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::event::TradeSide;

    fn sample_line() -> String {
        json!({
            "gameId": "20250101-abc",
            "recordingStart": "2025-01-01T00:00:00.000Z",
            "analysis": {
                "finalTick": 3,
                "peakMultiplier": 1.8,
                "priceProgression": [
                    { "tick": 0, "price": 1.0, "timestamp": 1000 },
                    { "tick": 1, "price": 1.8, "timestamp": 1250 },
                    { "tick": 3, "price": 0.02, "timestamp": 1700 }
                ],
                "tickIntervals": [250, 251.5, "oops"],
                "totalTrades": 2,
                "uniquePlayers": 1,
                "tradingActivity": { "buyOrders": 1, "sellOrders": 1 }
            },
            "events": [
                { "eventType": "newTrade", "data": { "playerId": "p", "type": "buy", "qty": 1, "cost": 1, "price": 1.0, "tickIndex": 0 } },
                { "eventType": "gameStateUpdate", "data": {} },
                { "eventType": "newTrade", "data": { "playerId": "p", "type": "sell", "qty": 1, "proceeds": 1.8, "price": 1.8, "tickIndex": 1 } }
            ]
        })
        .to_string()
    }

    #[test]
    fn test_parse_full_record() {
        let game = GameRecord::parse_line(&sample_line()).unwrap();
        assert_eq!(game.game_id, "20250101-abc");
        assert_eq!(game.analysis.final_tick, 3);
        assert_eq!(game.analysis.price_progression.len(), 3);
        assert_eq!(game.analysis.price_progression[2].timestamp, "1700");
        assert_eq!(game.analysis.tick_intervals, vec![250.0, 251.5, 0.0]);
        assert_eq!(game.analysis.trading_activity.sell_orders, 1);
        assert_eq!(game.events.len(), 3);
        let sides: Vec<_> = game.trades().map(|t| t.side).collect();
        assert_eq!(sides, vec![TradeSide::Buy, TradeSide::Sell]);
    }

    #[test]
    fn test_final_price_uses_entry_before_stop() {
        let game = GameRecord::parse_line(&sample_line()).unwrap();
        assert_eq!(game.final_price(), 1.8);
    }

    #[test]
    fn test_final_price_single_and_empty() {
        let mut game = GameRecord::default();
        assert_eq!(game.final_price(), 0.0);
        game.analysis.price_progression.push(PricePoint {
            tick: 5,
            price: 1.5,
            timestamp: String::new(),
        });
        assert_eq!(game.final_price(), 1.5);
    }

    #[test]
    fn test_missing_tick_uses_position() {
        let summary = AnalysisSummary::from_value(&json!({
            "priceProgression": [{ "price": 1.0 }, { "price": 1.1 }, { "tick": 9, "price": 1.2 }]
        }));
        let ticks: Vec<_> = summary.price_progression.iter().map(|p| p.tick).collect();
        assert_eq!(ticks, vec![0, 1, 9]);
    }

    #[test]
    fn test_missing_sections_default() {
        let game = GameRecord::parse_line(r#"{"gameId": "g"}"#).unwrap();
        assert_eq!(game.analysis, AnalysisSummary::default());
        assert!(game.events.is_empty());
        assert_eq!(game.label(), "g");
        assert_eq!(GameRecord::default().label(), "unknown");
    }

    #[test]
    fn test_rejects_malformed_and_non_object_lines() {
        assert!(matches!(
            GameRecord::parse_line("{\"gameId\": "),
            Err(ParseError::Json(_))
        ));
        assert!(matches!(
            GameRecord::parse_line("[1, 2]"),
            Err(ParseError::NotAnObject { kind: "array" })
        ));
        assert!(matches!(
            GameRecord::parse_line("null"),
            Err(ParseError::NotAnObject { kind: "null" })
        ));
    }
}
