//! Account commands: `jd register`, `jd login`, `jd logout`, `jd whoami`,
//! `jd profile`.

use clap::Args;
use jd_core::{NewUser, ProfileUpdate, Session};
use serde::Serialize;

use crate::cmd::users::UserView;
use crate::context::Context;
use crate::output::{CliError, render_item, render_success};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,

    /// Stored as given; pick something you do not use elsewhere.
    #[arg(long, env = "JD_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long)]
    pub full_name: String,

    #[arg(long)]
    pub department: String,

    #[arg(long, default_value = "staff")]
    pub role: String,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    pub username: String,

    #[arg(long, env = "JD_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug, Default)]
pub struct LogoutArgs {}

#[derive(Args, Debug, Default)]
pub struct WhoamiArgs {}

#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub role: Option<String>,
}

impl ProfileArgs {
    fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            full_name: self.full_name.clone(),
            department: self.department.clone(),
            role: self.role.clone(),
        }
    }
}

/// Execute `jd register`. The new account is not logged in.
///
/// # Errors
///
/// Fails on a blank or duplicate username or when storage cannot be
/// written.
pub fn run_register(args: &RegisterArgs, ctx: &mut Context) -> anyhow::Result<()> {
    let new_user = NewUser {
        username: args.username.trim().to_string(),
        password: args.password.clone(),
        full_name: args.full_name.clone(),
        department: args.department.clone(),
        role: args.role.clone(),
    };
    let user = Session::register(&mut ctx.store, new_user).map_err(|err| ctx.fail(&err))?;
    render_item(&UserView::from(&user), ctx.output)?;
    Ok(())
}

/// Execute `jd login <username>`.
///
/// # Errors
///
/// Fails on bad credentials or when the session cannot be saved.
pub fn run_login(args: &LoginArgs, ctx: &mut Context) -> anyhow::Result<()> {
    let output = ctx.output;
    let user = ctx
        .session
        .login(&mut ctx.store, args.username.trim(), &args.password)
        .map(UserView::from);
    let user = user.map_err(|err| ctx.fail(&err))?;
    render_item(&user, output)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct LogoutOutput {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

/// Execute `jd logout`. Logging out with no session is not an error.
///
/// # Errors
///
/// Fails when the saved session cannot be removed.
pub fn run_logout(_args: &LogoutArgs, ctx: &mut Context) -> anyhow::Result<()> {
    let previous = ctx.session.logout(&mut ctx.store);
    let previous = previous.map_err(|err| ctx.fail(&err))?;
    let message = previous.as_ref().map_or_else(
        || "not logged in".to_string(),
        |user| format!("logged out {}", user.username),
    );
    if ctx.output.is_json() {
        let payload = LogoutOutput {
            ok: true,
            username: previous.map(|user| user.username),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    render_success(ctx.output, &message)
}

/// Execute `jd whoami`.
///
/// # Errors
///
/// Fails when nobody is logged in.
pub fn run_whoami(_args: &WhoamiArgs, ctx: &Context) -> anyhow::Result<()> {
    let user = ctx.require_user()?;
    render_item(&UserView::from(&user), ctx.output)?;
    Ok(())
}

/// Execute `jd profile`: edit the logged-in user's session copy.
///
/// # Errors
///
/// Fails when nobody is logged in, no field was given, or the session
/// cannot be saved.
pub fn run_profile(args: &ProfileArgs, ctx: &mut Context) -> anyhow::Result<()> {
    let update = args.to_update();
    if update.is_empty() {
        return Err(ctx.fail(CliError::new(
            "nothing to update; pass --full-name, --department or --role",
        )));
    }

    let output = ctx.output;
    let user = ctx
        .session
        .update_profile(&mut ctx.store, &update)
        .map(UserView::from);
    let user = user.map_err(|err| ctx.fail(&err))?;
    render_item(&user, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_profile_args_make_empty_update() {
        assert!(ProfileArgs::default().to_update().is_empty());
    }

    #[test]
    fn profile_args_map_field_by_field() {
        let args = ProfileArgs {
            role: Some("lead".to_string()),
            ..ProfileArgs::default()
        };
        let update = args.to_update();
        assert_eq!(update.role.as_deref(), Some("lead"));
        assert!(update.full_name.is_none());
        assert!(!update.is_empty());
    }
}
