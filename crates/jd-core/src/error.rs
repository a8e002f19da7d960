use std::fmt;

/// Machine-readable error codes for scripts and front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    RequestNotFound,
    UserNotFound,
    DuplicateUsername,
    InvalidCredentials,
    InvalidEnumValue,
    UnknownDepartment,
    MissingField,
    NotLoggedIn,
    StorageWriteFailed,
    LockContention,
    ExportFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::RequestNotFound => "E2001",
            Self::UserNotFound => "E2002",
            Self::DuplicateUsername => "E2003",
            Self::InvalidCredentials => "E2004",
            Self::InvalidEnumValue => "E2005",
            Self::UnknownDepartment => "E2006",
            Self::MissingField => "E2007",
            Self::NotLoggedIn => "E2008",
            Self::StorageWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::ExportFailed => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::RequestNotFound => "Request not found",
            Self::UserNotFound => "User not found",
            Self::DuplicateUsername => "Username already exists",
            Self::InvalidCredentials => "Invalid username or password",
            Self::InvalidEnumValue => "Invalid status value",
            Self::UnknownDepartment => "Unknown department",
            Self::MissingField => "Required field is empty",
            Self::NotLoggedIn => "Not logged in",
            Self::StorageWriteFailed => "Storage write failed",
            Self::LockContention => "Lock contention",
            Self::ExportFailed => "Export failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in config.toml and retry."),
            Self::RequestNotFound => Some("Run `jd list` to see existing request ids."),
            Self::UserNotFound => None,
            Self::DuplicateUsername => Some("Pick a different username."),
            Self::InvalidCredentials => Some("Check the username and password and retry."),
            Self::InvalidEnumValue => Some("Use one of: pending, inprogress, completed."),
            Self::UnknownDepartment => Some("Run `jd departments` to list valid departments."),
            Self::MissingField => Some("Provide a non-empty value for every required field."),
            Self::NotLoggedIn => Some("Run `jd login <username>` first."),
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `jd` process releases its lock."),
            Self::ExportFailed => Some("Check that the output path is writable."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures of the durable key-value layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage i/o failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lock(#[from] crate::lock::LockError),
}

impl StorageError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::StorageWriteFailed,
            Self::Lock(err) => err.code(),
        }
    }
}

/// Errors returned by [`crate::store::DataStore`] mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("field '{0}' must not be empty")]
    MissingField(&'static str),

    #[error("'{0}' is not a known department")]
    UnknownDepartment(String),

    #[error("failed to serialize {collection}: {source}")]
    Serialize {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateUsername(_) => ErrorCode::DuplicateUsername,
            Self::MissingField(_) => ErrorCode::MissingField,
            Self::UnknownDepartment(_) => ErrorCode::UnknownDepartment,
            Self::Serialize { .. } => ErrorCode::InternalUnexpected,
            Self::Storage(err) => err.code(),
        }
    }

    /// Remediation text for front ends.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.code().hint().unwrap_or("").to_string()
    }
}
