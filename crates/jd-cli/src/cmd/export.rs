//! `jd export` — write users and requests to an `.xlsx` workbook.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::context::Context;
use crate::output::render;

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Output file, or a directory to place the default file name in.
    /// Defaults to the configured file name in the current directory.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    path: String,
    users: usize,
    requests: usize,
}

fn target_path(requested: Option<&Path>, file_name: &str) -> PathBuf {
    match requested {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

/// Execute `jd export`. Read-only with respect to the data set.
///
/// # Errors
///
/// Fails when the workbook cannot be encoded or written.
pub fn run_export(args: &ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let path = target_path(args.output.as_deref(), &ctx.config.export.file_name);
    ctx.store
        .export_to(&path)
        .map_err(|err| ctx.fail(&err))?;

    let payload = ExportOutput {
        path: path.display().to_string(),
        users: ctx.store.users().len(),
        requests: ctx.store.requests().len(),
    };
    render(ctx.output, &payload, |p, w| {
        writeln!(
            w,
            "✓ exported {} users and {} requests to {}",
            p.users, p.requests, p.path
        )
    })
}
