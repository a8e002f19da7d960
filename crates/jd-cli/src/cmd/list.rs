//! `jd list` — list requests, optionally filtered.

use clap::Args;
use jd_core::{Request, RequestFilter};

use crate::cmd::parse_status;
use crate::context::Context;
use crate::output::render_list;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only requests filed by the logged-in user.
    #[arg(long, conflicts_with = "user")]
    pub mine: bool,

    /// Only requests filed by this username.
    #[arg(long)]
    pub user: Option<String>,

    /// Only requests addressed to this department.
    #[arg(long)]
    pub department: Option<String>,

    /// Only requests in this status (pending, inprogress, completed).
    #[arg(long)]
    pub status: Option<String>,

    /// Case-insensitive substring match on title or description.
    #[arg(long)]
    pub search: Option<String>,
}

fn build_filter(args: &ListArgs, ctx: &Context) -> anyhow::Result<RequestFilter> {
    let mut filter = RequestFilter::new();
    if args.mine {
        filter = filter.created_by(ctx.require_user()?.username);
    } else if let Some(user) = &args.user {
        filter = filter.created_by(user.clone());
    }
    if let Some(department) = &args.department {
        filter = filter.department(department.clone());
    }
    if let Some(status) = &args.status {
        filter = filter.status(parse_status(status, ctx)?);
    }
    if let Some(search) = &args.search {
        filter = filter.search(search.clone());
    }
    Ok(filter)
}

/// Execute `jd list`. Requests come out in insertion order.
///
/// # Errors
///
/// Fails on an invalid status, `--mine` without a login, or an output
/// error.
pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let filter = build_filter(args, ctx)?;
    let requests: Vec<Request> = ctx
        .store
        .filter_requests(&filter)
        .into_iter()
        .cloned()
        .collect();
    tracing::debug!(count = requests.len(), "listed requests");
    render_list(&requests, ctx.output)?;
    Ok(())
}
