//! Lenient field access for recorded game logs.
//!
//! Recorded logs are written by an external recorder and individual fields may be
//! missing, `null`, or carry the wrong JSON type. A bad field never rejects the whole
//! record: it falls back to a neutral default instead. Every typed field read in this
//! crate goes through [`field_or`], so the default path can be tested in one place.

use serde_json::Value;

use crate::event::TradeSide;

/// Conversion from a JSON value that may fail without an error.
pub trait Coerce: Sized {
    /// Returns `None` when `value` does not hold a usable `Self`.
    fn coerce(value: &Value) -> Option<Self>;
}

impl Coerce for f64 {
    fn coerce(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl Coerce for i64 {
    #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn coerce(value: &Value) -> Option<Self> {
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        })
    }
}

impl Coerce for String {
    fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl Coerce for TradeSide {
    fn coerce(value: &Value) -> Option<Self> {
        value.as_str().map(TradeSide::from_label)
    }
}

/// Reads `key` from `object`, falling back to `default` when the key is absent,
/// `null`, of the wrong type, or when `object` is not a JSON object at all.
///
/// ```
/// use rugs_record::coerce::field_or;
/// use serde_json::json;
///
/// let data = json!({ "price": 1.5, "qty": "lots", "tickIndex": 7 });
/// assert_eq!(field_or(&data, "price", 0.0), 1.5);
/// assert_eq!(field_or(&data, "qty", 0.0), 0.0);
/// assert_eq!(field_or(&data, "cost", 0.0), 0.0);
/// assert_eq!(field_or::<i64>(&data, "tickIndex", 0), 7);
/// ```
#[must_use]
pub fn field_or<T>(object: &Value, key: &str, default: T) -> T
where
    T: Coerce,
{
    field(object, key).unwrap_or(default)
}

/// Like [`field_or`], but keeps "absent or unusable" distinguishable from a real value.
#[must_use]
pub fn field<T>(object: &Value, key: &str) -> Option<T>
where
    T: Coerce,
{
    object.get(key).and_then(T::coerce)
}

/// Returns the elements of the array stored at `key`, or an empty slice.
#[must_use]
pub fn list<'a>(object: &'a Value, key: &str) -> &'a [Value] {
    object
        .get(key)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_missing_and_null_use_default() {
        let data = json!({ "level": null });
        assert_eq!(field_or::<i64>(&data, "level", 0), 0);
        assert_eq!(field_or::<i64>(&data, "absent", 3), 3);
        assert_eq!(field::<f64>(&data, "level"), None);
    }

    #[test]
    fn test_wrong_type_uses_default() {
        let data = json!({ "price": "1.5", "playerId": ["x"], "qty": true });
        assert_eq!(field_or(&data, "price", 0.0), 0.0);
        assert_eq!(field_or(&data, "qty", 0.0), 0.0);
        assert_eq!(
            field_or(&data, "playerId", "unknown".to_owned()),
            "unknown"
        );
    }

    #[test]
    fn test_non_object_container_uses_default() {
        let data = json!([1, 2, 3]);
        assert_eq!(field_or(&data, "price", 9.0), 9.0);
        assert!(list(&data, "events").is_empty());
        assert_eq!(field_or(&Value::Null, "price", 2.0), 2.0);
    }

    #[test]
    fn test_integral_float_is_accepted_as_integer() {
        let data = json!({ "tick": 12.0, "half": 12.5 });
        assert_eq!(field_or::<i64>(&data, "tick", 0), 12);
        assert_eq!(field_or::<i64>(&data, "half", -1), -1);
    }

    #[test]
    fn test_integer_is_accepted_as_float() {
        let data = json!({ "price": 2 });
        assert_eq!(field_or(&data, "price", 0.0), 2.0);
    }

    #[test]
    fn test_number_is_accepted_as_text() {
        let data = json!({ "timestamp": 1_700_000_000_123_u64, "gameId": "g-1" });
        assert_eq!(field_or(&data, "timestamp", String::new()), "1700000000123");
        assert_eq!(field_or(&data, "gameId", String::new()), "g-1");
    }

    #[test]
    fn test_list_access() {
        let data = json!({ "tickIntervals": [200, 210], "events": {} });
        assert_eq!(list(&data, "tickIntervals").len(), 2);
        assert!(list(&data, "events").is_empty());
    }
}
