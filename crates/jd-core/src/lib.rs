//! jd-core library.
//!
//! Users and service requests held in memory by a [`store::DataStore`],
//! mirrored write-through to a [`storage::KeyValueStore`], with derived
//! statistics and a two-sheet workbook export.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per module, each mapping to a stable
//!   [`error::ErrorCode`]. Lookups that miss return `None`, not errors.
//! - **Logging**: `tracing` macros (`info!` for mutations, `debug!` for
//!   storage traffic, `warn!` for discarded data).

pub mod clock;
pub mod config;
pub mod department;
pub mod error;
pub mod export;
pub mod lock;
pub mod model;
pub mod query;
pub mod seed;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use department::DEPARTMENTS;
pub use error::{ErrorCode, StorageError, StoreError};
pub use model::{NewRequest, NewUser, ProfileUpdate, Request, Status, User};
pub use query::RequestFilter;
pub use session::{AuthError, Session};
pub use stats::{DepartmentCount, RequestStats};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use store::DataStore;
