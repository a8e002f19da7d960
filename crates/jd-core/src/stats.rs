//! Aggregate counts for dashboards.

use serde::{Deserialize, Serialize};

use crate::department::DEPARTMENTS;
use crate::model::{Request, Status};

/// Number of requests filed against one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

/// Request counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl RequestStats {
    #[must_use]
    pub const fn count(&self, status: Status) -> usize {
        match status {
            Status::Pending => self.pending,
            Status::InProgress => self.in_progress,
            Status::Completed => self.completed,
        }
    }
}

/// One entry per enumerated department, in enumeration order. Requests
/// naming any other department are not counted anywhere.
#[must_use]
pub fn department_counts(requests: &[Request]) -> Vec<DepartmentCount> {
    DEPARTMENTS
        .iter()
        .map(|department| DepartmentCount {
            department: (*department).to_string(),
            count: requests
                .iter()
                .filter(|r| r.department == *department)
                .count(),
        })
        .collect()
}

#[must_use]
pub fn status_counts(requests: &[Request]) -> RequestStats {
    let count = |status: Status| requests.iter().filter(|r| r.status == status).count();
    RequestStats {
        total: requests.len(),
        pending: count(Status::Pending),
        in_progress: count(Status::InProgress),
        completed: count(Status::Completed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_requests;
    use chrono::Utc;

    #[test]
    fn seed_counts() {
        let requests = seed_requests(Utc::now());
        let stats = status_counts(&requests);
        assert_eq!(
            stats,
            RequestStats {
                total: 3,
                pending: 1,
                in_progress: 1,
                completed: 1,
            }
        );
        assert_eq!(stats.count(Status::InProgress), 1);
    }

    #[test]
    fn zero_count_departments_are_listed() {
        let counts = department_counts(&[]);
        assert_eq!(counts.len(), DEPARTMENTS.len());
        assert!(counts.iter().all(|c| c.count == 0));
        assert_eq!(counts[0].department, "Water Supply");
    }

    #[test]
    fn unknown_departments_are_excluded() {
        let mut requests = seed_requests(Utc::now());
        requests[0].department = "Parks".to_string();
        let counts = department_counts(&requests);
        let sum: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(sum, 2);
    }

    #[test]
    fn request_stats_serialize_in_progress_camel_case() {
        let json = serde_json::to_value(RequestStats::default()).expect("serialize");
        assert!(json.get("inProgress").is_some());
    }
}
