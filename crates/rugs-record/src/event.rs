//! Game events and trade records.

use std::fmt;

use serde_json::Value;

use crate::coerce::{field, field_or};

/// Event type carried by trade events.
pub const NEW_TRADE_EVENT: &str = "newTrade";

/// Placeholder for missing player identity fields.
pub const UNKNOWN: &str = "unknown";

/// One entry of a game's event list.
///
/// Only `newTrade` events carry data this analysis uses; every other event type is
/// kept as a tag so event counts stay faithful to the log.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A `newTrade` event.
    Trade(TradeRecord),
    /// Any other event type.
    Other { event_type: String },
}

impl Event {
    /// Builds an event from its JSON form (`{ "eventType": ..., "data": {...} }`).
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let event_type = field_or(value, "eventType", String::new());
        if event_type == NEW_TRADE_EVENT {
            let data = value.get("data").unwrap_or(&Value::Null);
            Self::Trade(TradeRecord::from_value(data))
        } else {
            Self::Other { event_type }
        }
    }

    /// Returns the trade carried by this event, if it is a trade event.
    #[must_use]
    pub fn as_trade(&self) -> Option<&TradeRecord> {
        match self {
            Self::Trade(trade) => Some(trade),
            Self::Other { .. } => None,
        }
    }
}

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TradeSide {
    Buy,
    Sell,
    /// Missing or unrecognized direction. Counted as a trade but neither a buy nor a sell.
    #[default]
    Unknown,
}

impl TradeSide {
    /// Parses the recorder's `type` label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "buy" => Self::Buy,
            "sell" => Self::Sell,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data of a single `newTrade` event.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub player_id: String,
    pub username: String,
    pub level: i64,
    pub side: TradeSide,
    pub price: f64,
    pub qty: f64,
    /// Amount paid; only meaningful for buys.
    pub cost: f64,
    /// Amount received; only meaningful for sells.
    pub proceeds: f64,
    /// Tick the trade happened at. `None` when the recorder did not write one.
    pub tick_index: Option<i64>,
}

impl Default for TradeRecord {
    fn default() -> Self {
        Self {
            player_id: UNKNOWN.to_owned(),
            username: UNKNOWN.to_owned(),
            level: 0,
            side: TradeSide::Unknown,
            price: 0.0,
            qty: 0.0,
            cost: 0.0,
            proceeds: 0.0,
            tick_index: None,
        }
    }
}

impl TradeRecord {
    /// Builds a trade from the event's `data` object, defaulting every unusable field.
    #[must_use]
    pub fn from_value(data: &Value) -> Self {
        Self {
            player_id: field_or(data, "playerId", UNKNOWN.to_owned()),
            username: field_or(data, "username", UNKNOWN.to_owned()),
            level: field_or(data, "level", 0),
            side: field_or(data, "type", TradeSide::Unknown),
            price: field_or(data, "price", 0.0),
            qty: field_or(data, "qty", 0.0),
            cost: field_or(data, "cost", 0.0),
            proceeds: field_or(data, "proceeds", 0.0),
            tick_index: field(data, "tickIndex"),
        }
    }
}
