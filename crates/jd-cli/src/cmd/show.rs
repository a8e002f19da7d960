//! `jd show` — display one request.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use clap::Args;
use jd_core::{ErrorCode, Request};

use crate::context::Context;
use crate::output::{
    CliError, Renderable, pretty_kv, pretty_rule, pretty_section, render_item, write_json,
};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Request ID to display.
    pub id: String,
}

pub fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Error for an id that matches no request.
pub fn not_found(id: &str) -> CliError {
    CliError::coded(
        format!("request '{id}' not found"),
        ErrorCode::RequestNotFound,
    )
}

impl Renderable for Request {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("#{} {}", self.id, self.title))?;
        pretty_kv(w, "Status", self.status.label())?;
        pretty_kv(w, "Department", &self.department)?;
        pretty_kv(w, "Created by", &self.created_by)?;
        pretty_kv(w, "Created", local_time(self.created_at))?;
        pretty_kv(w, "Updated", local_time(self.updated_at))?;
        writeln!(w)?;
        for line in self.description.lines() {
            writeln!(w, "  {line}")?;
        }
        pretty_rule(w)?;
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            self.id,
            self.status,
            self.department,
            self.created_by,
            self.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "STATUS", "DEPARTMENT", "CREATED_BY", "TITLE"]
    }
}

/// Execute `jd show <id>`.
///
/// # Errors
///
/// Fails when no request has that id.
pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let Some(request) = ctx.store.request(&args.id) else {
        return Err(ctx.fail(not_found(&args.id)));
    };
    render_item(request, ctx.output)?;
    Ok(())
}
