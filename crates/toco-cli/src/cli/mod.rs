//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use toco_core::config;
use toco_core::tasks::TaskFilter;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "toco")]
#[command(version)]
#[command(about = "Todo list in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the server base URL for this invocation
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account and sign in (password read from stdin)
    Register {
        email: String,

        /// Display name shown instead of the email
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign in (password read from stdin)
    Login { email: String },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in profile
    Whoami,

    /// List tasks, newest first (the default command)
    List {
        /// Only tasks not yet completed
        #[arg(long, conflicts_with = "completed")]
        active: bool,

        /// Only completed tasks
        #[arg(long)]
        completed: bool,
    },
    /// Add a task
    Add {
        title: String,

        /// Longer free-form text for the task
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show one task in full
    Show {
        /// Task id, or a unique prefix of one
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Mark a task completed
    Done {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Mark a completed task active again
    Reopen {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Flip a task between active and completed
    Toggle {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Edit a task's title or description
    Edit {
        #[arg(value_name = "ID")]
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a task
    Rm {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show the server, its health, and the session state
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the server base URL in the config file
    SetUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

/// Logs go to a file so they never interleave with command output.
fn init_logging() -> Result<()> {
    let logs_dir = config::paths::logs_dir();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("create logs dir {}", logs_dir.display()))?;

    let filter =
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));
    let appender = tracing_appender::rolling::never(&logs_dir, "toco.log");
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(appender)
        .with_ansi(false)
        .init();

    Ok(())
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;

    let resolve_base = |flag: Option<&str>| -> Result<String> {
        let url = match flag {
            Some(raw) => config::validate_base_url(raw)?,
            None => config::resolve_base_url(&config)?,
        };
        tracing::debug!(%url, "using server base URL");
        Ok(url)
    };

    let Cli { base_url, command } = cli;
    let base_url = base_url.as_deref();

    // default to listing tasks
    let Some(command) = command else {
        let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
        return commands::tasks::list(&mut ctx, TaskFilter::All).await;
    };

    match command {
        Commands::Register { email, name } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::auth::register(&mut ctx, &email, name.as_deref()).await
        }
        Commands::Login { email } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::auth::login(&mut ctx, &email).await
        }
        Commands::Logout => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::auth::logout(&mut ctx).await
        }
        Commands::Whoami => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::auth::whoami(&mut ctx).await
        }

        Commands::List { active, completed } => {
            let filter = if active {
                TaskFilter::Active
            } else if completed {
                TaskFilter::Completed
            } else {
                TaskFilter::All
            };
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::tasks::list(&mut ctx, filter).await
        }
        Commands::Add { title, description } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::tasks::add(&mut ctx, &title, description.as_deref()).await
        }
        Commands::Show { id } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::tasks::show(&mut ctx, &id).await
        }
        Commands::Done { id } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::tasks::set_completed(&mut ctx, &id, true).await
        }
        Commands::Reopen { id } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::tasks::set_completed(&mut ctx, &id, false).await
        }
        Commands::Toggle { id } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::tasks::toggle(&mut ctx, &id).await
        }
        Commands::Edit {
            id,
            title,
            description,
        } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::tasks::edit(&mut ctx, &id, title.as_deref(), description.as_deref()).await
        }
        Commands::Rm { id } => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::tasks::rm(&mut ctx, &id).await
        }

        Commands::Status => {
            let mut ctx = commands::Ctx::new(&resolve_base(base_url)?, &config)?;
            commands::status::run(&mut ctx).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetUrl { url } => commands::config::set_url(&url),
        },
    }
}
