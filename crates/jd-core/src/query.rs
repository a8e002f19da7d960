//! Request filtering used by listing views.

use serde::{Deserialize, Serialize};

use crate::model::{Request, Status};

/// Conjunction of optional predicates over requests.
///
/// An empty filter matches everything. `search` is a case-insensitive
/// substring test against the title or the description; every other
/// predicate is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub status: Option<Status>,
    pub department: Option<String>,
    pub created_by: Option<String>,
    pub search: Option<String>,
}

impl RequestFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    #[must_use]
    pub fn created_by(mut self, username: impl Into<String>) -> Self {
        self.created_by = Some(username.into());
        self
    }

    #[must_use]
    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.department.is_none()
            && self.created_by.is_none()
            && self.search.is_none()
    }

    #[must_use]
    pub fn matches(&self, request: &Request) -> bool {
        if self.status.is_some_and(|status| request.status != status) {
            return false;
        }
        if self
            .department
            .as_deref()
            .is_some_and(|department| request.department != department)
        {
            return false;
        }
        if self
            .created_by
            .as_deref()
            .is_some_and(|username| request.created_by != username)
        {
            return false;
        }
        match self.search.as_deref() {
            Some(needle) => matches_search(request, needle),
            None => true,
        }
    }

    /// Apply the filter, preserving insertion order.
    pub fn apply<'a>(&self, requests: impl IntoIterator<Item = &'a Request>) -> Vec<&'a Request> {
        requests.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn matches_search(request: &Request, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    request.title.to_lowercase().contains(&needle)
        || request.description.to_lowercase().contains(&needle)
}
