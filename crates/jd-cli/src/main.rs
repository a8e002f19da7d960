#![forbid(unsafe_code)]

mod cmd;
mod context;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use context::Context;
use jd_core::config::{UserConfig, load_user_config, resolve_data_dir};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "jd: interdepartmental service request tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text or json.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Data directory (overrides JD_DATA_DIR and the user config).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Account",
        about = "Register a new account",
        long_about = "Register a new account. The new account is not logged in.",
        after_help = "EXAMPLES:\n    # Register a staff account\n    jd register --username alice --password s3cret \\\n        --full-name \"Alice Smith\" --department Health\n\n    # Emit machine-readable output\n    jd register --username bob --password pw --full-name Bob --department Finance --json"
    )]
    Register(cmd::auth::RegisterArgs),

    #[command(
        next_help_heading = "Account",
        about = "Log in",
        after_help = "EXAMPLES:\n    # Log in as the built-in admin\n    jd login qwerty --password password123\n\n    # Take the password from the environment\n    JD_PASSWORD=password123 jd login qwerty"
    )]
    Login(cmd::auth::LoginArgs),

    #[command(next_help_heading = "Account", about = "Log out")]
    Logout(cmd::auth::LogoutArgs),

    #[command(next_help_heading = "Account", about = "Show the logged-in user")]
    Whoami(cmd::auth::WhoamiArgs),

    #[command(
        next_help_heading = "Account",
        about = "Edit your profile",
        long_about = "Edit the logged-in user's profile. Changes apply to the current session only.",
        after_help = "EXAMPLES:\n    # Change department\n    jd profile --department Finance"
    )]
    Profile(cmd::auth::ProfileArgs),

    #[command(next_help_heading = "Account", about = "List registered users")]
    Users(cmd::users::UsersArgs),

    #[command(
        next_help_heading = "Requests",
        about = "File a new request",
        long_about = "File a new request as the logged-in user. New requests start out pending.",
        after_help = "EXAMPLES:\n    # File a request\n    jd create --title \"Pothole\" --description \"Deep pothole on Elm St\" \\\n        --department \"Public Works\"\n\n    # Emit machine-readable output\n    jd create --title T --description D --department Health --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Requests",
        about = "List requests",
        long_about = "List requests in filing order with optional filters.",
        after_help = "EXAMPLES:\n    # Everything\n    jd list\n\n    # My pending requests\n    jd list --mine --status pending\n\n    # Search one department\n    jd list --department Health --search vaccine"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Requests",
        about = "Show one request",
        after_help = "EXAMPLES:\n    # Show a request\n    jd show 1\n\n    # Emit machine-readable output\n    jd show 1 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Requests",
        about = "Change a request's status",
        after_help = "EXAMPLES:\n    # Start work\n    jd status 1 inprogress\n\n    # Close it\n    jd status 1 completed"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Requests",
        about = "Delete a request",
        after_help = "EXAMPLES:\n    # Delete without prompting\n    jd delete 3 --force"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Reporting",
        about = "Show request counts",
        long_about = "Show request counts by status and by department."
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(next_help_heading = "Reporting", about = "List departments")]
    Departments(cmd::departments::DepartmentsArgs),

    #[command(
        next_help_heading = "Reporting",
        about = "Export users and requests to a spreadsheet",
        after_help = "EXAMPLES:\n    # Write JD_Modern_Solutions_Data.xlsx in the current directory\n    jd export\n\n    # Write to a chosen file\n    jd export --output /tmp/snapshot.xlsx"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    jd completions bash\n\n    # Generate zsh completions\n    jd completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Commands {
    /// Commands that never touch the data set.
    const fn needs_data(&self) -> bool {
        !matches!(self, Self::Departments(_) | Self::Completions(_))
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("JD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "jd_core=debug,jd_cli=debug,warn"
        } else if quiet {
            "error"
        } else {
            "warn"
        })
    });

    let format = env::var("JD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_user_config_or_default() -> UserConfig {
    match load_user_config() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable user config");
            UserConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let user_config = load_user_config_or_default();
    let output = resolve_output_mode(cli.format, cli.json, user_config.output.as_deref());

    let mut ctx = if cli.command.needs_data() {
        let data_dir = resolve_data_dir(cli.data_dir.as_deref(), &user_config);
        debug!(data_dir = %data_dir.display(), ?output, "resolved data directory");
        Some(Context::open(&data_dir, output)?)
    } else {
        None
    };

    match (cli.command, ctx.as_mut()) {
        (Commands::Departments(args), _) => cmd::departments::run_departments(&args, output),
        (Commands::Completions(args), _) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
        (Commands::Register(args), Some(ctx)) => cmd::auth::run_register(&args, ctx),
        (Commands::Login(args), Some(ctx)) => cmd::auth::run_login(&args, ctx),
        (Commands::Logout(args), Some(ctx)) => cmd::auth::run_logout(&args, ctx),
        (Commands::Whoami(args), Some(ctx)) => cmd::auth::run_whoami(&args, ctx),
        (Commands::Profile(args), Some(ctx)) => cmd::auth::run_profile(&args, ctx),
        (Commands::Users(args), Some(ctx)) => cmd::users::run_users(&args, ctx),
        (Commands::Create(args), Some(ctx)) => cmd::create::run_create(&args, ctx),
        (Commands::List(args), Some(ctx)) => cmd::list::run_list(&args, ctx),
        (Commands::Show(args), Some(ctx)) => cmd::show::run_show(&args, ctx),
        (Commands::Status(args), Some(ctx)) => cmd::status::run_status(&args, ctx),
        (Commands::Delete(args), Some(ctx)) => cmd::delete::run_delete(&args, ctx),
        (Commands::Stats(args), Some(ctx)) => cmd::stats::run_stats(&args, ctx),
        (Commands::Export(args), Some(ctx)) => cmd::export::run_export(&args, ctx),
        (command, None) => anyhow::bail!("no data set opened for {command:?}"),
    }
}
