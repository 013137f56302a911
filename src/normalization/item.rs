//! Field resolution for raw catalog items.
//!
//! Sync batches arrive as loosely-typed JSON mappings pushed by spreadsheet
//! automation, so the same logical field shows up under alternate key names
//! (`title` vs `name`, `stock` vs `inventory`) and numeric fields may be
//! numbers or numeric strings. These helpers normalize one raw item into the
//! typed fields the store persists.
//!
//! Coercion is eager: a *missing* numeric field defaults (price 0.0, stock 0),
//! but a present-and-unparsable one is an error that fails the whole batch.

use serde_json::Value;
use thiserror::Error;

/// Display name used when an item carries neither `title` nor `name`.
pub const DEFAULT_NAME: &str = "Sin Nombre";

/// A numeric field was present but could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} value: {value}")]
pub struct CoercionError {
    pub field: &'static str,
    pub value: String,
}

impl CoercionError {
    fn new(field: &'static str, raw: &Value) -> Self {
        Self {
            field,
            value: raw.to_string(),
        }
    }
}

/// Extract the reconciliation key. `None` means the item is skipped:
/// missing key, empty string, or a value that cannot name a SKU.
/// Integral numbers are accepted because spreadsheet sources emit them.
pub fn resolve_sku(item: &Value) -> Option<String> {
    match item.get("sku") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => n.as_i64().map(|v| v.to_string()),
        _ => None,
    }
}

/// First non-empty string among `title`, then `name`; else the default.
pub fn resolve_name(item: &Value) -> String {
    for key in ["title", "name"] {
        if let Some(Value::String(s)) = item.get(key) {
            if !s.is_empty() {
                return s.clone();
            }
        }
    }
    DEFAULT_NAME.to_string()
}

/// Numeric coercion of `price`; absent key defaults to 0.0.
pub fn resolve_price(item: &Value) -> Result<f64, CoercionError> {
    match item.get("price") {
        None => Ok(0.0),
        Some(raw) => coerce_f64(raw).ok_or_else(|| CoercionError::new("price", raw)),
    }
}

/// Integer coercion of the first *present* key among `stock`, `inventory`;
/// absent from both defaults to 0. A present key wins even when its value is
/// unparsable (the fallback chain selects keys, not values).
pub fn resolve_stock(item: &Value) -> Result<i64, CoercionError> {
    for key in ["stock", "inventory"] {
        if let Some(raw) = item.get(key) {
            return coerce_i64(raw).ok_or_else(|| CoercionError::new("stock", raw));
        }
    }
    Ok(0)
}

/// String value of `key` if present, else empty.
pub fn resolve_text(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn coerce_f64(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_i64(raw: &Value) -> Option<i64> {
    match raw {
        // Integral numbers pass through; floats truncate toward zero.
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sku_requires_a_non_empty_string() {
        assert_eq!(resolve_sku(&json!({"sku": "A1"})).as_deref(), Some("A1"));
        assert_eq!(resolve_sku(&json!({"sku": ""})), None);
        assert_eq!(resolve_sku(&json!({"name": "no sku"})), None);
        assert_eq!(resolve_sku(&json!({"sku": null})), None);
    }

    #[test]
    fn numeric_skus_from_spreadsheets_are_stringified() {
        assert_eq!(resolve_sku(&json!({"sku": 10452})).as_deref(), Some("10452"));
        // Fractional ids cannot name a SKU.
        assert_eq!(resolve_sku(&json!({"sku": 1.5})), None);
    }

    #[test]
    fn title_wins_over_name_and_empty_falls_through() {
        assert_eq!(resolve_name(&json!({"title": "Foo", "name": "Bar"})), "Foo");
        assert_eq!(resolve_name(&json!({"title": "", "name": "Bar"})), "Bar");
        assert_eq!(resolve_name(&json!({})), DEFAULT_NAME);
        assert_eq!(resolve_name(&json!({"title": 42})), DEFAULT_NAME);
    }

    #[test]
    fn price_accepts_numbers_and_numeric_strings() {
        assert_eq!(resolve_price(&json!({"price": 24990})).unwrap(), 24990.0);
        assert_eq!(resolve_price(&json!({"price": "  19.99 "})).unwrap(), 19.99);
        assert_eq!(resolve_price(&json!({})).unwrap(), 0.0);
    }

    #[test]
    fn malformed_price_is_an_error_not_a_default() {
        let err = resolve_price(&json!({"price": "not-a-number"})).unwrap_err();
        assert_eq!(err.field, "price");
        assert!(resolve_price(&json!({"price": null})).is_err());
        assert!(resolve_price(&json!({"price": true})).is_err());
    }

    #[test]
    fn stock_falls_back_to_inventory_by_key_presence() {
        assert_eq!(resolve_stock(&json!({"stock": 7})).unwrap(), 7);
        assert_eq!(resolve_stock(&json!({"inventory": 5})).unwrap(), 5);
        assert_eq!(resolve_stock(&json!({"stock": 2, "inventory": 9})).unwrap(), 2);
        assert_eq!(resolve_stock(&json!({})).unwrap(), 0);
        // A present `stock` key wins even when unparsable.
        assert!(resolve_stock(&json!({"stock": null, "inventory": 5})).is_err());
    }

    #[test]
    fn float_stock_truncates_but_decimal_strings_fail() {
        assert_eq!(resolve_stock(&json!({"stock": 5.7})).unwrap(), 5);
        assert_eq!(resolve_stock(&json!({"stock": " 12 "})).unwrap(), 12);
        assert!(resolve_stock(&json!({"stock": "5.7"})).is_err());
    }

    #[test]
    fn optional_text_defaults_to_empty() {
        let item = json!({"description": "Gel limpiador", "image": "https://example.test/gel.jpg"});
        assert_eq!(resolve_text(&item, "description"), "Gel limpiador");
        assert_eq!(resolve_text(&item, "image"), "https://example.test/gel.jpg");
        assert_eq!(resolve_text(&json!({}), "description"), "");
        assert_eq!(resolve_text(&json!({"image": 3}), "image"), "");
    }
}
