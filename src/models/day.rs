use chrono::Local;
use serde::{Deserialize, Serialize};

/// One calendar date's learning status and notes.
///
/// `id` and `updated_at` are `None` only for the synthetic record returned
/// when a date has never been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub id: Option<i64>,
    /// Caller-supplied key, conventionally `YYYY-MM-DD`. Not validated.
    pub date: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub content: String,
    /// Local time of the last write, without timezone.
    pub updated_at: Option<String>,
}

impl DayRecord {
    /// The unpersisted record for a date nobody has started yet.
    pub fn not_started(date: impl Into<String>) -> Self {
        Self {
            id: None,
            date: date.into(),
            completed: false,
            content: String::new(),
            updated_at: None,
        }
    }

    /// Whether this record came from storage rather than [`DayRecord::not_started`].
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Input for creating a day record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDayInput {
    pub date: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub content: String,
}

/// Input for updating a day record. All fields are optional for partial updates;
/// a field that is absent (or `null`) keeps its stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDayInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UpdateDayInput {
    /// Resolve the `(completed, content)` pair to store, layering the present
    /// fields over `existing`, or over the defaults when there is no row yet.
    pub fn merge(self, existing: Option<&DayRecord>) -> (bool, String) {
        match existing {
            Some(day) => (
                self.completed.unwrap_or(day.completed),
                self.content.unwrap_or_else(|| day.content.clone()),
            ),
            None => (
                self.completed.unwrap_or(false),
                self.content.unwrap_or_default(),
            ),
        }
    }
}

/// A row copied from another store by the transfer utility, already normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedDay {
    pub date: String,
    pub completed: bool,
    pub content: String,
    pub updated_at: String,
}

/// Timestamp written on every create or update.
pub fn timestamp_now() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(completed: bool, content: &str) -> DayRecord {
        DayRecord {
            id: Some(1),
            date: "2024-01-01".to_string(),
            completed,
            content: content.to_string(),
            updated_at: Some("2024-01-01T08:00:00.000000".to_string()),
        }
    }

    #[test]
    fn merge_without_existing_uses_defaults() {
        let input = UpdateDayInput::default();
        assert_eq!(input.merge(None), (false, String::new()));
    }

    #[test]
    fn merge_keeps_fields_absent_from_input() {
        let existing = stored(true, "ownership");
        let input = UpdateDayInput {
            completed: None,
            content: Some("borrowing".to_string()),
        };
        assert_eq!(input.merge(Some(&existing)), (true, "borrowing".to_string()));
    }

    #[test]
    fn merge_overwrites_present_fields() {
        let existing = stored(true, "ownership");
        let input = UpdateDayInput {
            completed: Some(false),
            content: Some(String::new()),
        };
        assert_eq!(input.merge(Some(&existing)), (false, String::new()));
    }

    #[test]
    fn null_fields_deserialize_as_absent() {
        let input: UpdateDayInput =
            serde_json::from_str(r#"{"completed": null, "content": "x"}"#).unwrap();
        assert_eq!(input.completed, None);
        assert_eq!(input.content.as_deref(), Some("x"));
    }

    #[test]
    fn create_input_defaults_optional_fields() {
        let input: CreateDayInput = serde_json::from_str(r#"{"date": "2024-02-29"}"#).unwrap();
        assert!(!input.completed);
        assert!(input.content.is_empty());
    }

    #[test]
    fn not_started_serializes_nulls() {
        let json = serde_json::to_value(DayRecord::not_started("2024-03-01")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": null,
                "date": "2024-03-01",
                "completed": false,
                "content": "",
                "updated_at": null,
            })
        );
    }

    #[test]
    fn timestamp_has_no_timezone_suffix() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000000".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.6f").is_ok());
    }
}
