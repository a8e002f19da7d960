//! `jd stats` — dashboard counts.

use std::io::{self, Write};

use clap::Args;
use jd_core::{DepartmentCount, RequestStats, Status};
use serde::Serialize;

use crate::context::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

/// Report payload for `jd stats`.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub requests: RequestStats,
    pub departments: Vec<DepartmentCount>,
}

/// Execute `jd stats`.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run_stats(_args: &StatsArgs, ctx: &Context) -> anyhow::Result<()> {
    let report = StatsReport {
        requests: ctx.store.request_stats(),
        departments: ctx.store.department_stats(),
    };
    render_mode(ctx.output, &report, render_stats_text, render_stats_human)
}

fn render_stats_text(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "total\t{}", report.requests.total)?;
    for status in Status::ALL {
        writeln!(w, "{status}\t{}", report.requests.count(status))?;
    }
    for entry in &report.departments {
        writeln!(w, "{}\t{}", entry.department, entry.count)?;
    }
    Ok(())
}

fn render_stats_human(report: &StatsReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Requests")?;
    pretty_kv(w, "Total", report.requests.total.to_string())?;
    for status in Status::ALL {
        pretty_kv(w, status.label(), report.requests.count(status).to_string())?;
    }
    writeln!(w)?;

    pretty_section(w, "By department")?;
    for entry in &report.departments {
        writeln!(w, "{:<16} {:>5}", entry.department, entry.count)?;
    }
    Ok(())
}
