//! `jd delete` — remove a request permanently.

use std::io::{IsTerminal, Write};

use clap::Args;
use serde::Serialize;

use crate::cmd::show::not_found;
use crate::context::Context;
use crate::output::render;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Request ID to delete.
    pub id: String,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    id: String,
    ok: bool,
}

fn confirm_delete(id: &str, title: &str) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("Delete request {id} '{title}'? [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Execute `jd delete <id>`.
///
/// Prompts on an interactive terminal unless `--force` is given.
///
/// # Errors
///
/// Fails when nobody is logged in, no request has that id, or storage
/// cannot be written.
pub fn run_delete(args: &DeleteArgs, ctx: &mut Context) -> anyhow::Result<()> {
    ctx.require_user()?;
    let Some(title) = ctx.store.request(&args.id).map(|r| r.title.clone()) else {
        return Err(ctx.fail(not_found(&args.id)));
    };

    if !args.force && !confirm_delete(&args.id, &title)? {
        anyhow::bail!("delete cancelled");
    }

    ctx.store
        .delete_request(&args.id)
        .map_err(|err| ctx.fail(&err))?;

    let payload = DeleteOutput {
        id: args.id.clone(),
        ok: true,
    };
    render(ctx.output, &payload, |p, w| {
        writeln!(w, "✓ deleted request {}", p.id)
    })
}
