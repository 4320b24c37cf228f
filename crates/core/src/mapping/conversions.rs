//! Per-field-class value conversions between the local schema and EXT
//!
//! Write-side converters produce what EXT accepts; read-side converters
//! normalize what EXT emits. Defaults are deliberate: bad dates become empty
//! (write) or null (read), bad numbers become 0, and an unrecognized
//! enumeration token is passed through rather than silently dropped.

use chrono::NaiveDate;
use serde_json::{Number, Value};

/// Local ISO date format
const LOCAL_DATE_FMT: &str = "%Y-%m-%d";
/// EXT date format (MM/DD/YYYY)
const EXT_DATE_FMT: &str = "%m/%d/%Y";

/// ISO date string to EXT `MM/DD/YYYY`; invalid or empty input converts to
/// an empty string.
pub fn date_to_external(value: &Value) -> Value {
    let formatted = value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), LOCAL_DATE_FMT).ok())
        .map(|d| d.format(EXT_DATE_FMT).to_string())
        .unwrap_or_default();
    Value::String(formatted)
}

/// EXT `MM/DD/YYYY` to ISO date string; invalid or empty input reads as null.
pub fn date_from_external(value: &Value) -> Value {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), EXT_DATE_FMT).ok())
        .map(|d| Value::String(d.format(LOCAL_DATE_FMT).to_string()))
        .unwrap_or(Value::Null)
}

/// Local boolean to EXT `"1"`/`"0"`
pub fn bool_to_external(value: &Value) -> Value {
    let flag = match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "1",
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    };
    Value::String(if flag { "1" } else { "0" }.to_string())
}

/// EXT boolean field to local true/false; accepts `"1"` and `"Yes"` as true
pub fn bool_from_external(value: &Value) -> Value {
    let flag = match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "1" || s == "Yes",
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    };
    Value::Bool(flag)
}

/// Currency/numeric parse, defaulting to 0 on failure
pub fn number_from_value(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(n.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(int) = trimmed.parse::<i64>() {
                Value::Number(Number::from(int))
            } else {
                let parsed = trimmed.parse::<f64>().unwrap_or(0.0);
                Number::from_f64(parsed)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::Number(Number::from(0)))
            }
        }
        _ => Value::Number(Number::from(0)),
    }
}

/// EXT checkbox fields are newline-delimited. Split, trim, drop empties,
/// and return the first token matching a known label; when nothing matches,
/// return the raw first token unmodified. Empty input reads as null.
pub fn enumeration_from_external(value: &Value, labels: &[&str]) -> Value {
    let raw = match value.as_str() {
        Some(s) => s,
        None => return Value::Null,
    };

    let tokens: Vec<&str> = raw.split('\n').map(str::trim).filter(|t| !t.is_empty()).collect();
    let Some(first) = tokens.first() else {
        return Value::Null;
    };

    let matched = tokens
        .iter()
        .find(|token| labels.iter().any(|label| label.eq_ignore_ascii_case(token)))
        .unwrap_or(first);
    Value::String((*matched).to_string())
}

/// Write side of an enumeration field: the label is emitted as-is
pub fn enumeration_to_external(value: &Value) -> Value {
    match value.as_str() {
        Some(s) => Value::String(s.to_string()),
        None => Value::String(String::new()),
    }
}

/// Split an EXT name value into (first, last).
///
/// `"Last, First"` splits on the first comma; `"First Last"` splits on
/// whitespace; a single unsplittable token is a first name; empty or absent
/// input yields `("Unknown", "")`.
pub fn split_name(value: Option<&str>) -> (String, String) {
    let raw = value.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return ("Unknown".to_string(), String::new());
    }

    if let Some((last, first)) = raw.split_once(',') {
        return (first.trim().to_string(), last.trim().to_string());
    }

    match raw.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.trim().to_string(), rest.trim().to_string()),
        None => (raw.to_string(), String::new()),
    }
}

/// Compose a display name from first/last parts
pub fn compose_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_date_roundtrip() {
        let ext = date_to_external(&json!("2024-03-05"));
        assert_eq!(ext, json!("03/05/2024"));
        assert_eq!(date_from_external(&ext), json!("2024-03-05"));
    }

    #[test]
    fn test_invalid_date_writes_empty_reads_null() {
        assert_eq!(date_to_external(&json!("not a date")), json!(""));
        assert_eq!(date_to_external(&json!("")), json!(""));
        assert_eq!(date_from_external(&json!("")), Value::Null);
        assert_eq!(date_from_external(&json!("13/45/2024")), Value::Null);
    }

    #[test]
    fn test_bool_roundtrip() {
        assert_eq!(bool_to_external(&json!(true)), json!("1"));
        assert_eq!(bool_to_external(&json!(false)), json!("0"));
        assert_eq!(bool_from_external(&json!("1")), json!(true));
        assert_eq!(bool_from_external(&json!("0")), json!(false));
    }

    #[test]
    fn test_bool_read_accepts_yes() {
        assert_eq!(bool_from_external(&json!("Yes")), json!(true));
        assert_eq!(bool_from_external(&json!("No")), json!(false));
        assert_eq!(bool_from_external(&json!(1)), json!(true));
    }

    #[test]
    fn test_number_parses_strings_and_defaults_to_zero() {
        assert_eq!(number_from_value(&json!("42")), json!(42));
        assert_eq!(number_from_value(&json!("42.5")), json!(42.5));
        assert_eq!(number_from_value(&json!(7)), json!(7));
        assert_eq!(number_from_value(&json!("garbage")), json!(0.0));
        assert_eq!(number_from_value(&Value::Null), json!(0));
    }

    #[test]
    fn test_enumeration_picks_first_known_label() {
        let labels = ["VIP", "Demo"];
        let value = enumeration_from_external(&json!("VIP\r\nDemo"), &labels);
        assert_eq!(value, json!("VIP"));
    }

    #[test]
    fn test_enumeration_unrecognized_token_passes_through() {
        let labels = ["VIP", "Demo"];
        let value = enumeration_from_external(&json!("Unknown\r\nAlsoUnknown"), &labels);
        assert_eq!(value, json!("Unknown"));
    }

    #[test]
    fn test_enumeration_empty_is_null() {
        let labels = ["VIP"];
        assert_eq!(enumeration_from_external(&json!(""), &labels), Value::Null);
        assert_eq!(enumeration_from_external(&json!("\r\n\r\n"), &labels), Value::Null);
        assert_eq!(enumeration_from_external(&Value::Null, &labels), Value::Null);
    }

    #[test]
    fn test_split_name_comma_form() {
        assert_eq!(split_name(Some("Smith, John")), ("John".to_string(), "Smith".to_string()));
    }

    #[test]
    fn test_split_name_space_form() {
        assert_eq!(split_name(Some("John Smith")), ("John".to_string(), "Smith".to_string()));
        assert_eq!(
            split_name(Some("Mary Anne van Dyke")),
            ("Mary".to_string(), "Anne van Dyke".to_string())
        );
    }

    #[test]
    fn test_split_name_single_token() {
        assert_eq!(split_name(Some("Madonna")), ("Madonna".to_string(), String::new()));
    }

    #[test]
    fn test_split_name_empty() {
        assert_eq!(split_name(Some("")), ("Unknown".to_string(), String::new()));
        assert_eq!(split_name(None), ("Unknown".to_string(), String::new()));
    }

    #[test]
    fn test_compose_name() {
        assert_eq!(compose_name("John", "Smith"), "John Smith");
        assert_eq!(compose_name("Madonna", ""), "Madonna");
    }
}
