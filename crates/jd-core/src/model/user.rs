use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account.
///
/// The password is stored and compared as plain text. That matches what
/// existing data sets contain; switching to hashes changes login behavior
/// and needs a migration of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub department: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Payload accepted by [`crate::store::DataStore::create_user`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub department: String,
    pub role: String,
}

/// Session-local profile edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.department.is_none() && self.role.is_none()
    }

    /// Apply the present fields to `user`.
    pub fn apply(&self, user: &mut User) {
        if let Some(full_name) = &self.full_name {
            user.full_name.clone_from(full_name);
        }
        if let Some(department) = &self.department {
            user.department.clone_from(department);
        }
        if let Some(role) = &self.role {
            user.role.clone_from(role);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "1".to_string(),
            username: "qwerty".to_string(),
            password: "password123".to_string(),
            full_name: "Qwerty User".to_string(),
            department: "Administration".to_string(),
            role: "admin".to_string(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        }
    }

    #[test]
    fn user_uses_camel_case_keys() {
        let json = serde_json::to_string(&sample_user()).expect("serialize");
        assert!(json.contains("\"fullName\":\"Qwerty User\""));
        assert!(json.contains("\"createdAt\":"));
    }

    #[test]
    fn profile_update_touches_only_present_fields() {
        let mut user = sample_user();
        let update = ProfileUpdate {
            full_name: Some("Q. User".to_string()),
            ..ProfileUpdate::default()
        };
        update.apply(&mut user);
        assert_eq!(user.full_name, "Q. User");
        assert_eq!(user.department, "Administration");
        assert_eq!(user.role, "admin");
    }

    #[test]
    fn empty_profile_update_is_detected() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            role: Some("clerk".to_string()),
            ..ProfileUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
