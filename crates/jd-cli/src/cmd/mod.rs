pub mod auth;
pub mod completions;
pub mod create;
pub mod delete;
pub mod departments;
pub mod export;
pub mod list;
pub mod show;
pub mod stats;
pub mod status;
pub mod users;

use jd_core::Status;

use crate::context::Context;

/// Parse a status argument, rendering `InvalidEnumValue` on failure.
fn parse_status(raw: &str, ctx: &Context) -> anyhow::Result<Status> {
    raw.parse::<Status>().map_err(|err| ctx.fail(&err))
}
