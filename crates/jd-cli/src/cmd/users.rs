//! `jd users` — list registered accounts.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use clap::Args;
use jd_core::User;
use serde::Serialize;

use crate::cmd::show::local_time;
use crate::context::Context;
use crate::output::{Renderable, pretty_kv, render_list, write_json};

#[derive(Args, Debug, Default)]
pub struct UsersArgs {}

/// A user as shown by the CLI. Never carries the password.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub department: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            department: user.department.clone(),
            role: user.role.clone(),
            created_at: user.created_at,
        }
    }
}

impl Renderable for UserView {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{} ({})", self.full_name, self.username)?;
        pretty_kv(w, "Department", &self.department)?;
        pretty_kv(w, "Role", &self.role)?;
        pretty_kv(w, "Joined", local_time(self.created_at))?;
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        write_json(w, self)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            self.id, self.username, self.full_name, self.department, self.role
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "USERNAME", "FULL_NAME", "DEPARTMENT", "ROLE"]
    }
}

/// Execute `jd users`.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run_users(_args: &UsersArgs, ctx: &Context) -> anyhow::Result<()> {
    let users: Vec<UserView> = ctx.store.users().iter().map(UserView::from).collect();
    render_list(&users, ctx.output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_drops_password() {
        let user = User {
            id: "1".to_string(),
            username: "qwerty".to_string(),
            password: "password123".to_string(),
            full_name: "Qwerty User".to_string(),
            department: "Administration".to_string(),
            role: "admin".to_string(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        };
        let mut buf = Vec::new();
        UserView::from(&user).render_json(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(!text.contains("password"));
        assert!(text.contains("\"fullName\":\"Qwerty User\""));
    }
}
