//! Login state layered on top of the data store.
//!
//! The logged-in user is kept under [`CURRENT_USER_KEY`] in the same storage
//! the store mirrors its collections to. Profile edits change only this
//! session copy; the `jd_users` collection keeps the registered values.

use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::{ErrorCode, StorageError, StoreError};
use crate::model::{NewUser, ProfileUpdate, User};
use crate::storage::{CURRENT_USER_KEY, KeyValueStore};
use crate::store::DataStore;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AuthError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::NotLoggedIn => ErrorCode::NotLoggedIn,
            Self::Store(err) => err.code(),
            Self::Storage(err) => err.code(),
            Self::Serialize(_) => ErrorCode::InternalUnexpected,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: Option<User>,
}

impl Session {
    /// Pick up the user saved by an earlier login, if any.
    ///
    /// An unreadable or malformed entry is logged and cleared; the session
    /// then starts logged out.
    pub fn restore<S: KeyValueStore, C: Clock>(store: &mut DataStore<S, C>) -> Self {
        let raw = match store.storage().get(CURRENT_USER_KEY) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "failed to read saved session");
                None
            }
        };

        let Some(raw) = raw else {
            return Self::default();
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Self {
                current: Some(user),
            },
            Err(err) => {
                warn!(error = %err, "failed to parse saved user, clearing session");
                if let Err(err) = store.storage_mut().remove(CURRENT_USER_KEY) {
                    warn!(error = %err, "failed to clear malformed session");
                }
                Self::default()
            }
        }
    }

    #[must_use]
    pub const fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// The logged-in user, or [`AuthError::NotLoggedIn`].
    ///
    /// # Errors
    ///
    /// Fails when nobody is logged in.
    pub fn require_user(&self) -> Result<&User, AuthError> {
        match &self.current {
            Some(user) => Ok(user),
            None => Err(AuthError::NotLoggedIn),
        }
    }

    /// Log in with an exact, plain-text password comparison.
    ///
    /// Unknown usernames and wrong passwords fail the same way.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] on mismatch, storage errors when
    /// the session cannot be saved.
    pub fn login<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut DataStore<S, C>,
        username: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        let user = match store.user_by_username(username) {
            Some(user) if user.password == password => user.clone(),
            _ => {
                info!(username, "login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        save(store, &user)?;
        info!(username, "logged in");
        Ok(self.current.insert(user))
    }

    /// Create an account. Does not log the new user in.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`], including a duplicate username.
    pub fn register<S: KeyValueStore, C: Clock>(
        store: &mut DataStore<S, C>,
        new_user: NewUser,
    ) -> Result<User, AuthError> {
        Ok(store.create_user(new_user)?)
    }

    /// Forget the logged-in user.
    ///
    /// # Errors
    ///
    /// Storage errors when the saved entry cannot be removed.
    pub fn logout<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut DataStore<S, C>,
    ) -> Result<Option<User>, AuthError> {
        store.storage_mut().remove(CURRENT_USER_KEY)?;
        let previous = self.current.take();
        if let Some(user) = &previous {
            info!(username = %user.username, "logged out");
        }
        Ok(previous)
    }

    /// Edit the session copy of the logged-in user.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotLoggedIn`] without a session, storage errors when
    /// the edited copy cannot be saved.
    pub fn update_profile<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut DataStore<S, C>,
        update: &ProfileUpdate,
    ) -> Result<&User, AuthError> {
        let mut user = self.require_user()?.clone();
        update.apply(&mut user);
        save(store, &user)?;
        info!(username = %user.username, "updated profile");
        Ok(self.current.insert(user))
    }
}

fn save<S: KeyValueStore, C: Clock>(
    store: &mut DataStore<S, C>,
    user: &User,
) -> Result<(), AuthError> {
    let raw = serde_json::to_string(user)?;
    store.storage_mut().set(CURRENT_USER_KEY, &raw)?;
    Ok(())
}
