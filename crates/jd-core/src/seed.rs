//! Baseline data a store starts from when storage holds nothing yet.

use chrono::{DateTime, Utc};

use crate::model::{Request, Status, User};

pub const SEED_ADMIN_USERNAME: &str = "qwerty";

#[must_use]
pub fn seed_users(now: DateTime<Utc>) -> Vec<User> {
    vec![User {
        id: "1".to_string(),
        username: SEED_ADMIN_USERNAME.to_string(),
        password: "password123".to_string(),
        full_name: "Qwerty User".to_string(),
        department: "Administration".to_string(),
        role: "admin".to_string(),
        created_at: now,
    }]
}

#[must_use]
pub fn seed_requests(now: DateTime<Utc>) -> Vec<Request> {
    [
        (
            "1",
            "Water Supply Request",
            "Urgent water supply needed in Sector 5",
            "Water Supply",
            Status::Pending,
        ),
        (
            "2",
            "Electricity Repair",
            "Street light maintenance in Ward 7",
            "Electricity",
            Status::Completed,
        ),
        (
            "3",
            "Health Camp Request",
            "Vaccination drive at community center",
            "Health",
            Status::InProgress,
        ),
    ]
    .into_iter()
    .map(|(id, title, description, department, status)| Request {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        department: department.to_string(),
        status,
        created_by: SEED_ADMIN_USERNAME.to_string(),
        created_at: now,
        updated_at: now,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::is_known_department;

    #[test]
    fn seed_requests_cover_every_status() {
        let now = Utc::now();
        let requests = seed_requests(now);
        assert_eq!(requests.len(), 3);
        for status in Status::ALL {
            assert_eq!(requests.iter().filter(|r| r.status == status).count(), 1);
        }
        assert!(requests.iter().all(|r| is_known_department(&r.department)));
        assert!(requests.iter().all(|r| r.created_at == r.updated_at));
    }

    #[test]
    fn seed_has_single_admin() {
        let users = seed_users(Utc::now());
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, SEED_ADMIN_USERNAME);
        assert_eq!(users[0].role, "admin");
    }
}
