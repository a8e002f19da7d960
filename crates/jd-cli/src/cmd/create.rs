//! `jd create` — file a new request as the logged-in user.

use clap::Args;
use jd_core::NewRequest;

use crate::context::Context;
use crate::output::render_item;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Short summary of the request.
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: String,

    /// Department that should handle it (see `jd departments`).
    #[arg(long)]
    pub department: String,
}

/// Execute `jd create`. New requests always start out pending.
///
/// # Errors
///
/// Fails when nobody is logged in, a field is blank, the department is
/// unknown, or storage cannot be written.
pub fn run_create(args: &CreateArgs, ctx: &mut Context) -> anyhow::Result<()> {
    let user = ctx.require_user()?;
    let new_request = NewRequest {
        title: args.title.trim().to_string(),
        description: args.description.trim().to_string(),
        department: args.department.clone(),
        created_by: user.username,
    };

    let request = ctx
        .store
        .create_request(new_request)
        .map_err(|err| ctx.fail(&err))?;
    render_item(&request, ctx.output)?;
    Ok(())
}
