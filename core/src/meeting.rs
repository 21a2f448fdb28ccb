use chrono::{DateTime, NaiveDateTime};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Accepted offset-less layouts; seconds and the `T` separator are optional.
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Offset layouts RFC 3339 does not cover. `%#z` also accepts `Z`.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Why a parsed completion could not be accepted as a `MeetingRecord`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field `{field}` must not be blank")]
    BlankField { field: &'static str },
    #[error("field `{field}` is not an ISO-8601 date-time: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("endTime {end:?} is not after startTime {start:?}")]
    EndNotAfterStart { start: String, end: String },
    #[error("attendees must contain at least one email address")]
    NoAttendees,
    #[error("attendees[{index}] is not an email address: {value}")]
    InvalidAttendee { index: usize, value: String },
}

/// An ISO-8601 date-time as produced upstream.
///
/// Keeps the original text for output and a UTC-normalised instant for
/// ordering. Offset-less values are ordered as if they were UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    instant: NaiveDateTime,
}

impl Timestamp {
    /// Surrounding whitespace is ignored for parsing but kept in the raw text.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        let instant = DateTime::parse_from_rfc3339(text)
            .ok()
            .or_else(|| {
                OFFSET_FORMATS
                    .iter()
                    .find_map(|format| DateTime::parse_from_str(text, format).ok())
            })
            .map(|dt| dt.naive_utc())
            .or_else(|| {
                NAIVE_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            })?;

        Some(Self {
            raw: raw.to_string(),
            instant,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> NaiveDateTime {
        self.instant
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// A meeting extracted from free text. Only constructed through
/// [`MeetingRecord::from_value`], so every instance satisfies the shape rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    pub summary: String,
    #[schema(value_type = String, format = DateTime, example = "2025-04-12T18:00:00")]
    pub start_time: Timestamp,
    #[schema(value_type = String, format = DateTime, example = "2025-04-12T18:30:00")]
    pub end_time: Timestamp,
    pub attendees: Vec<String>,
}

impl MeetingRecord {
    /// Validate arbitrary JSON against the meeting shape.
    ///
    /// Unknown fields are ignored and do not survive into the record.
    pub fn from_value(value: &Value) -> Result<Self, ShapeError> {
        let object = value.as_object().ok_or(ShapeError::NotAnObject {
            found: json_kind(value),
        })?;

        let summary = required_str(object, "summary")?;
        if summary.trim().is_empty() {
            return Err(ShapeError::BlankField { field: "summary" });
        }

        let start_time = required_timestamp(object, "startTime")?;
        let end_time = required_timestamp(object, "endTime")?;
        if end_time.instant <= start_time.instant {
            return Err(ShapeError::EndNotAfterStart {
                start: start_time.raw,
                end: end_time.raw,
            });
        }

        let attendees = required_attendees(object)?;

        Ok(Self {
            summary: summary.to_string(),
            start_time,
            end_time,
            attendees,
        })
    }
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ShapeError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ShapeError::MissingField { field }),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ShapeError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

fn required_timestamp(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Timestamp, ShapeError> {
    let raw = required_str(object, field)?;
    Timestamp::parse(raw).ok_or_else(|| ShapeError::InvalidTimestamp {
        field,
        value: raw.to_string(),
    })
}

fn required_attendees(object: &Map<String, Value>) -> Result<Vec<String>, ShapeError> {
    let items = match object.get("attendees") {
        None | Some(Value::Null) => {
            return Err(ShapeError::MissingField { field: "attendees" });
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ShapeError::WrongType {
                field: "attendees",
                expected: "an array of email strings",
            });
        }
    };

    if items.is_empty() {
        return Err(ShapeError::NoAttendees);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item.as_str() {
            Some(email) if looks_like_email(email) => Ok(email.to_string()),
            _ => Err(ShapeError::InvalidAttendee {
                index,
                value: item.to_string(),
            }),
        })
        .collect()
}

fn looks_like_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    match candidate.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
