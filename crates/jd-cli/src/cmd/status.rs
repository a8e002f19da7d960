//! `jd status` — move a request to another status.

use clap::Args;

use crate::cmd::parse_status;
use crate::cmd::show::not_found;
use crate::context::Context;
use crate::output::render_item;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Request ID to update.
    pub id: String,

    /// New status: pending, inprogress or completed.
    pub status: String,
}

/// Execute `jd status <id> <status>`.
///
/// Any status may follow any other, including the current one.
///
/// # Errors
///
/// Fails when nobody is logged in, the status is invalid, no request has
/// that id, or storage cannot be written.
pub fn run_status(args: &StatusArgs, ctx: &mut Context) -> anyhow::Result<()> {
    ctx.require_user()?;
    let status = parse_status(&args.status, ctx)?;

    let updated = ctx
        .store
        .update_request_status(&args.id, status)
        .map_err(|err| ctx.fail(&err))?;
    let Some(request) = updated else {
        return Err(ctx.fail(not_found(&args.id)));
    };
    render_item(&request, ctx.output)?;
    Ok(())
}
