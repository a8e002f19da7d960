//! Durable string-valued key-value storage.
//!
//! The store mirrors its collections here on every mutation and reads them
//! back once at startup. Two backends ship with the crate: [`MemoryStorage`]
//! for tests and embedding, [`FileStorage`] for the CLI.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;

/// Key holding the JSON array of users.
pub const USERS_KEY: &str = "jd_users";
/// Key holding the JSON array of requests.
pub const REQUESTS_KEY: &str = "jd_requests";
/// Key holding the logged-in user. Owned by [`crate::session::Session`].
pub const CURRENT_USER_KEY: &str = "current_user";

/// Minimal key-value contract shared by all backends.
pub trait KeyValueStore {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
