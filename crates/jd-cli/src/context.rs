//! Per-invocation state shared by the data commands.

use std::path::Path;

use jd_core::config::{DataConfig, load_data_config};
use jd_core::{DataStore, FileStorage, Session, User};
use tracing::debug;

use crate::output::{CliError, OutputMode, fail};

pub struct Context {
    pub config: DataConfig,
    pub store: DataStore<FileStorage>,
    pub session: Session,
    pub output: OutputMode,
}

impl Context {
    /// Load `<data_dir>/config.toml`, hydrate the store and restore any
    /// saved login.
    ///
    /// # Errors
    ///
    /// Fails (after rendering the error) when the data config cannot be
    /// parsed.
    pub fn open(data_dir: &Path, output: OutputMode) -> anyhow::Result<Self> {
        let config = load_data_config(data_dir).map_err(|err| fail(output, &err))?;
        let storage = FileStorage::new(data_dir).with_lock_timeout(config.storage.lock_timeout());
        let mut store = DataStore::with_system_clock(storage);
        let session = Session::restore(&mut store);
        debug!(
            data_dir = %data_dir.display(),
            logged_in = session.is_authenticated(),
            "opened data set"
        );

        Ok(Self {
            config,
            store,
            session,
            output,
        })
    }

    /// Clone of the logged-in user, or a rendered `NotLoggedIn` error.
    pub fn require_user(&self) -> anyhow::Result<User> {
        self.session
            .require_user()
            .cloned()
            .map_err(|err| fail(self.output, &err))
    }

    /// Render `err` for the user and convert it into the exit error.
    pub fn fail(&self, err: impl Into<CliError>) -> anyhow::Error {
        fail(self.output, err)
    }
}
