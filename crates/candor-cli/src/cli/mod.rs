//! CLI entry and dispatch.

use anyhow::{Context, Result};
use candor_core::api::ThreadRef;
use candor_core::config;
use candor_core::logging;
use candor_core::thread::SortMode;
use candor_core::vote::VoteDirection;
use clap::Parser;
use tracing::debug;

mod commands;

#[derive(Parser)]
#[command(name = "candor")]
#[command(version)]
#[command(about = "Anonymous feedback discussions in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Feedback server base URL (overrides CANDOR_API_BASE_URL and config)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the interactive feed for a thread
    Feed {
        /// `feedback:<id>`, `question:<id>` or a bare feedback id
        #[arg(value_name = "THREAD")]
        thread: ThreadRef,
    },

    /// Inspect threads
    Thread {
        #[command(subcommand)]
        command: ThreadCommands,
    },

    /// Post a comment or reply
    Comment {
        #[arg(value_name = "THREAD")]
        thread: ThreadRef,
        /// Comment text
        #[arg(value_name = "CONTENT")]
        content: String,
        /// Reply to this comment id
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
    },

    /// Vote on a feedback item or question (voting twice removes the vote)
    Vote {
        #[arg(value_name = "THREAD")]
        thread: ThreadRef,
        /// up or down
        #[arg(value_name = "DIRECTION")]
        direction: VoteDirection,
    },

    /// Manage the anonymous session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ThreadCommands {
    /// Print the ranked comment tree
    Show {
        #[arg(value_name = "THREAD")]
        thread: ThreadRef,
        /// best, newest or oldest (default: config)
        #[arg(long)]
        sort: Option<SortMode>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Subcommand)]
enum SessionCommands {
    /// Print the current session id
    Show,
    /// Replace the session id with a new one
    Reset,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;
    config.api.base_url = match cli.api_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
        _ => config.api.effective_base_url(),
    };

    // The feed owns the terminal and logs to a file; everything else to stderr.
    let _log_guard = if matches!(cli.command, Commands::Feed { .. }) {
        logging::init_file(&config.log, &config::paths::logs_dir())?
    } else {
        logging::init_stderr(&config.log)?;
        None
    };
    debug!(base_url = %config.api.base_url, "config loaded");

    match cli.command {
        Commands::Feed { thread } => commands::feed::run(&config, thread).await,

        Commands::Thread { command } => match command {
            ThreadCommands::Show { thread, sort, json } => {
                commands::thread::show(&config, &thread, sort, json).await
            }
        },

        Commands::Comment {
            thread,
            content,
            parent,
        } => commands::comment::post(&config, &thread, &content, parent).await,

        Commands::Vote { thread, direction } => {
            commands::vote::cast(&config, &thread, direction).await
        }

        Commands::Session { command } => match command {
            SessionCommands::Show => commands::session::show(),
            SessionCommands::Reset => commands::session::reset(),
        },

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}
