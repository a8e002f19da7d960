//! The data store: sole owner of users and requests for a session.
//!
//! Collections live in memory and are mirrored to a [`KeyValueStore`] on
//! every mutation (write-through). Storage is read once, in
//! [`DataStore::open`]; afterwards the in-memory copy is authoritative.
//! Several writers over the same storage are last-write-wins.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::department::is_known_department;
use crate::error::StoreError;
use crate::export::{ExportError, Workbook};
use crate::model::{NewRequest, NewUser, Request, Status, User};
use crate::query::RequestFilter;
use crate::seed::{seed_requests, seed_users};
use crate::stats::{DepartmentCount, RequestStats, department_counts, status_counts};
use crate::storage::{KeyValueStore, REQUESTS_KEY, USERS_KEY};

/// Users and requests for one session, mirrored to `S` on every mutation
/// and timestamped by `C`.
pub struct DataStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    users: Vec<User>,
    requests: Vec<Request>,
    last_id: i64,
}

impl<S: KeyValueStore> DataStore<S, SystemClock> {
    /// Open over `storage` using the wall clock.
    pub fn with_system_clock(storage: S) -> Self {
        Self::open(storage, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> DataStore<S, C> {
    /// Seed the baseline, then replace each collection with its persisted
    /// copy when one is present and parses.
    ///
    /// Malformed or unreadable persisted data is logged and skipped; the
    /// seed for that collection stays in effect until the next mutation
    /// overwrites storage.
    pub fn open(storage: S, clock: C) -> Self {
        let now = clock.now();
        let mut store = Self {
            storage,
            clock,
            users: seed_users(now),
            requests: seed_requests(now),
            last_id: 0,
        };

        if let Some(users) = store.load_collection::<User>(USERS_KEY) {
            store.users = users;
        }
        if let Some(requests) = store.load_collection::<Request>(REQUESTS_KEY) {
            store.requests = requests;
        }

        store.last_id = store
            .users
            .iter()
            .map(|u| u.id.as_str())
            .chain(store.requests.iter().map(|r| r.id.as_str()))
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        debug!(
            users = store.users.len(),
            requests = store.requests.len(),
            last_id = store.last_id,
            "data store hydrated"
        );
        store
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no persisted collection, keeping seed");
                return None;
            }
            Err(err) => {
                warn!(key, error = %err, "failed to read persisted collection, keeping seed");
                return None;
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => Some(items),
            Err(err) => {
                warn!(key, error = %err, "discarding malformed persisted collection");
                None
            }
        }
    }

    /// Write both collections. When the second write fails the first key is
    /// put back to what it held before, so storage keeps the old state.
    fn persist(&mut self) -> Result<(), StoreError> {
        let users = encode("users", &self.users)?;
        let requests = encode("requests", &self.requests)?;
        let previous_users = self.storage.get(USERS_KEY)?;
        self.storage.set(USERS_KEY, &users)?;
        if let Err(err) = self.storage.set(REQUESTS_KEY, &requests) {
            let restored = match previous_users.as_deref() {
                Some(raw) => self.storage.set(USERS_KEY, raw),
                None => self.storage.remove(USERS_KEY),
            };
            if let Err(restore_err) = restored {
                warn!(error = %restore_err, "failed to restore users after partial write");
            }
            return Err(err.into());
        }
        debug!(
            users = self.users.len(),
            requests = self.requests.len(),
            "persisted collections"
        );
        Ok(())
    }

    fn next_id(&mut self) -> String {
        let candidate = self.clock.now().timestamp_millis();
        self.last_id = candidate.max(self.last_id + 1);
        self.last_id.to_string()
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    // ── users ────────────────────────────────────────────────────────────────

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// First user whose username matches exactly (case-sensitive).
    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateUsername`] when the username is taken,
    /// [`StoreError::MissingField`] for a blank username or password, and
    /// [`StoreError::Storage`] when the write-through fails (the user is
    /// not added in that case).
    pub fn create_user(&mut self, new_user: NewUser) -> Result<User, StoreError> {
        if new_user.username.trim().is_empty() {
            return Err(StoreError::MissingField("username"));
        }
        if new_user.password.is_empty() {
            return Err(StoreError::MissingField("password"));
        }
        if self.user_by_username(&new_user.username).is_some() {
            return Err(StoreError::DuplicateUsername(new_user.username));
        }

        let user = User {
            id: self.next_id(),
            username: new_user.username,
            password: new_user.password,
            full_name: new_user.full_name,
            department: new_user.department,
            role: new_user.role,
            created_at: self.clock.now(),
        };

        self.users.push(user.clone());
        if let Err(err) = self.persist() {
            self.users.pop();
            return Err(err);
        }

        info!(id = %user.id, username = %user.username, "created user");
        Ok(user)
    }

    // ── requests ─────────────────────────────────────────────────────────────

    /// All requests in insertion order.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn request(&self, id: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn requests_by_user(&self, username: &str) -> Vec<&Request> {
        RequestFilter::new().created_by(username).apply(&self.requests)
    }

    pub fn requests_by_department(&self, department: &str) -> Vec<&Request> {
        RequestFilter::new()
            .department(department)
            .apply(&self.requests)
    }

    pub fn filter_requests(&self, filter: &RequestFilter) -> Vec<&Request> {
        filter.apply(&self.requests)
    }

    /// File a new request. It always starts out pending with
    /// `created_at == updated_at`.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingField`] for a blank title, description or
    /// creator, [`StoreError::UnknownDepartment`] for a department outside
    /// [`crate::department::DEPARTMENTS`], and [`StoreError::Storage`] when
    /// the write-through fails (the request is not added in that case).
    pub fn create_request(&mut self, new_request: NewRequest) -> Result<Request, StoreError> {
        if new_request.title.trim().is_empty() {
            return Err(StoreError::MissingField("title"));
        }
        if new_request.description.trim().is_empty() {
            return Err(StoreError::MissingField("description"));
        }
        if new_request.created_by.trim().is_empty() {
            return Err(StoreError::MissingField("createdBy"));
        }
        if !is_known_department(&new_request.department) {
            return Err(StoreError::UnknownDepartment(new_request.department));
        }

        let now = self.clock.now();
        let request = Request {
            id: self.next_id(),
            title: new_request.title,
            description: new_request.description,
            department: new_request.department,
            status: Status::Pending,
            created_by: new_request.created_by,
            created_at: now,
            updated_at: now,
        };

        self.requests.push(request.clone());
        if let Err(err) = self.persist() {
            self.requests.pop();
            return Err(err);
        }

        info!(
            id = %request.id,
            department = %request.department,
            created_by = %request.created_by,
            "created request"
        );
        Ok(request)
    }

    /// Set the status of request `id` and stamp `updated_at`.
    ///
    /// Returns `Ok(None)` without touching anything when no request has
    /// that id.
    ///
    /// # Errors
    ///
    /// [`StoreError::Storage`] when the write-through fails; the previous
    /// status and timestamp are restored.
    pub fn update_request_status(
        &mut self,
        id: &str,
        status: Status,
    ) -> Result<Option<Request>, StoreError> {
        let Some(index) = self.requests.iter().position(|r| r.id == id) else {
            debug!(id, "status update for unknown request");
            return Ok(None);
        };

        let now = self.clock.now();
        let previous = (self.requests[index].status, self.requests[index].updated_at);
        {
            let request = &mut self.requests[index];
            request.status = status;
            // A clock stepping backwards must not move updated_at backwards.
            request.updated_at = now.max(request.updated_at);
        }

        if let Err(err) = self.persist() {
            let request = &mut self.requests[index];
            (request.status, request.updated_at) = previous;
            return Err(err);
        }

        info!(id, from = %previous.0, to = %status, "updated request status");
        Ok(Some(self.requests[index].clone()))
    }

    /// Remove request `id` if present, then persist either way.
    ///
    /// # Errors
    ///
    /// [`StoreError::Storage`] when the write-through fails; the request is
    /// put back at its original position.
    pub fn delete_request(&mut self, id: &str) -> Result<(), StoreError> {
        let removed = self
            .requests
            .iter()
            .position(|r| r.id == id)
            .map(|index| (index, self.requests.remove(index)));

        if let Err(err) = self.persist() {
            if let Some((index, request)) = removed {
                self.requests.insert(index, request);
            }
            return Err(err);
        }

        if removed.is_some() {
            info!(id, "deleted request");
        } else {
            debug!(id, "delete for unknown request");
        }
        Ok(())
    }

    // ── aggregates ───────────────────────────────────────────────────────────

    pub fn department_stats(&self) -> Vec<DepartmentCount> {
        department_counts(&self.requests)
    }

    pub fn request_stats(&self) -> RequestStats {
        status_counts(&self.requests)
    }

    // ── export ───────────────────────────────────────────────────────────────

    /// Build the two-sheet workbook (`Users`, `Requests`). Read-only.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if a record cannot be flattened.
    pub fn workbook(&self) -> Result<Workbook, ExportError> {
        let mut workbook = Workbook::new();
        workbook.add_records("Users", &self.users)?;
        workbook.add_records("Requests", &self.requests)?;
        Ok(workbook)
    }

    /// Render the workbook as `.xlsx` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if flattening or encoding fails.
    pub fn export_workbook(&self) -> Result<Vec<u8>, ExportError> {
        self.workbook()?.to_xlsx()
    }

    /// Write the workbook to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if flattening, encoding or writing fails.
    pub fn export_to(&self, path: &Path) -> Result<(), ExportError> {
        let bytes = self.export_workbook()?;
        std::fs::write(path, bytes).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            users = self.users.len(),
            requests = self.requests.len(),
            "exported workbook"
        );
        Ok(())
    }
}

fn encode<T: Serialize>(collection: &'static str, items: &[T]) -> Result<String, StoreError> {
    serde_json::to_string(items).map_err(|source| StoreError::Serialize { collection, source })
}
