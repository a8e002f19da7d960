//! `jd departments` — the fixed department list.


use clap::Args;
use jd_core::DEPARTMENTS;

use crate::output::{OutputMode, render};

#[derive(Args, Debug, Default)]
pub struct DepartmentsArgs {}

/// Execute `jd departments`. Needs no data set.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run_departments(_args: &DepartmentsArgs, output: OutputMode) -> anyhow::Result<()> {
    render(output, &DEPARTMENTS, |departments, w| {
        for department in departments {
            writeln!(w, "{department}")?;
        }
        Ok(())
    })
}
