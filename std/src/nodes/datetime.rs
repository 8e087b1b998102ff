//! Date-time entry.
//!
//! Keys are canonical RFC 3339 timestamps in UTC, so tokens compare and sort
//! as plain strings. The configured format is used both to read naive input
//! (interpreted as UTC) and to render the display key.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::Value;
use tessera_core::{Boxer, NodeType, Raw, StateConfig, Step, Validator, ValueLike};

pub const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone)]
pub struct DateTimeBoxer {
    format: String,
}

impl DateTimeBoxer {
    pub fn new(format: impl Into<String>) -> Self {
        Self { format: format.into() }
    }

    pub fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, &self.format) {
            return Some(naive.and_utc());
        }
        // Date-only formats carry no time fields.
        match NaiveDate::parse_from_str(text, &self.format) {
            Ok(date) => Some(date.and_time(NaiveTime::MIN).and_utc()),
            Err(reason) => {
                tracing::debug!(input = text, format = %self.format, %reason, "Unparseable date-time");
                None
            }
        }
    }
}

impl Default for DateTimeBoxer {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT)
    }
}

impl Boxer for DateTimeBoxer {
    fn box_value(&self, raw: &Raw, _options: &[ValueLike]) -> Option<ValueLike> {
        let instant = match raw {
            Value::String(text) => self.parse(text)?,
            // Unix seconds.
            Value::Number(seconds) => DateTime::from_timestamp(seconds.as_i64()?, 0)?,
            _ => return None,
        };
        Some(
            ValueLike::new(instant.to_rfc3339_opts(SecondsFormat::Secs, true))
                .with_display_key(instant.format(&self.format).to_string()),
        )
    }

    fn unbox_value(&self, value: &ValueLike) -> Raw {
        value.key().clone()
    }
}

pub fn datetime_entry(name: impl Into<String>) -> Step {
    datetime_entry_with_format(name, DEFAULT_FORMAT)
}

pub fn datetime_entry_with_format(name: impl Into<String>, format: impl Into<String>) -> Step {
    Step::new(
        NodeType::DateTimeEntry,
        StateConfig::new(name)
            .boxer(DateTimeBoxer::new(format))
            .validator(Validator::required()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rfc3339_input_is_normalized_to_utc() {
        let boxed = DateTimeBoxer::default()
            .box_value(&json!("2024-03-01T10:30:00+02:00"), &[])
            .unwrap();
        assert_eq!(boxed.key(), &json!("2024-03-01T08:30:00Z"));
        assert_eq!(boxed.display_key(), "2024-03-01 08:30");
    }

    #[test]
    fn naive_input_uses_configured_format() {
        let boxer = DateTimeBoxer::new("%d/%m/%Y");
        let boxed = boxer.box_value(&json!("24/12/2023"), &[]).unwrap();
        assert_eq!(boxed.key(), &json!("2023-12-24T00:00:00Z"));
        assert_eq!(boxed.display_key(), "24/12/2023");

        assert!(DateTimeBoxer::default().box_value(&json!("2023-12-24 18:05"), &[]).is_some());
        assert_eq!(boxer.box_value(&json!("Christmas"), &[]), None);
    }

    #[test]
    fn unix_seconds_are_accepted() {
        let boxed = DateTimeBoxer::default().box_value(&json!(0), &[]).unwrap();
        assert_eq!(boxed.key(), &json!("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn canonical_keys_rebox_to_themselves() {
        let boxer = DateTimeBoxer::default();
        let first = boxer.box_value(&json!("2024-03-01 08:30"), &[]).unwrap();
        let again = boxer.box_value(&boxer.unbox_value(&first), &[]).unwrap();
        assert_eq!(first, again);
    }
}
