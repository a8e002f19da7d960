use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ParseEnumError;

/// The three lifecycle states of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    InProgress,
    Completed,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::Completed => "completed",
        }
    }

    /// Capitalized label used in human output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" | "in-progress" | "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

/// A service request addressed to one department.
///
/// Field order is the persisted and exported column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub title: String,
    pub description: String,
    pub department: String,
    pub status: Status,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload accepted by [`crate::store::DataStore::create_request`].
///
/// Unknown keys are ignored on deserialization, including any `status`:
/// new requests always start out pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub title: String,
    pub description: String,
    pub department: String,
    pub created_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&Status::InProgress).expect("serialize");
        assert_eq!(json, "\"inprogress\"");
        let back: Status = serde_json::from_str("\"completed\"").expect("deserialize");
        assert_eq!(back, Status::Completed);
    }

    #[test]
    fn status_parses_aliases() {
        assert_eq!("in-progress".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!("IN_PROGRESS".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!(" Pending ".parse::<Status>(), Ok(Status::Pending));
    }

    #[test]
    fn status_rejects_unknown_value() {
        let err = "closed".parse::<Status>().expect_err("closed is not a status");
        assert_eq!(err.to_string(), "invalid status: 'closed'");
    }

    #[test]
    fn new_request_ignores_status_key() {
        let json = r#"{
            "title": "Leak",
            "description": "Pipe burst",
            "department": "Water Supply",
            "createdBy": "alice",
            "status": "completed"
        }"#;
        let parsed: NewRequest = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.created_by, "alice");
    }

    #[test]
    fn request_keys_are_camel_case_in_field_order() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let request = Request {
            id: "1".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            department: "Health".to_string(),
            status: Status::Pending,
            created_by: "qwerty".to_string(),
            created_at: ts,
            updated_at: ts,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            [
                "id",
                "title",
                "description",
                "department",
                "status",
                "createdBy",
                "createdAt",
                "updatedAt"
            ]
        );
    }
}
