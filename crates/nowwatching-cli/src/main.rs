use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, watch};
use nowwatching_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "nowwatching")]
#[command(about = "nowwatching - Follow what your Trakt account is playing right now")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Also write logs to the rolling log file
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll Trakt and print what is playing
    #[command(long_about = "Poll the Trakt watching endpoint, enrich the playing item with extended info and artwork, and print every new state. Polls quickly while something plays and slowly while idle. Stop with Ctrl-C.")]
    Watch {
        /// Refresh once, print the result and exit
        #[arg(long, action = ArgAction::SetTrue)]
        once: bool,
    },
    /// Configure credentials and settings
    #[command(long_about = "Manage configuration and credentials for nowwatching. Use subcommands to view or modify settings for Trakt, TMDB and polling.")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear stored data
    Clear {
        /// Clear stored Trakt tokens
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure Trakt (OAuth flow)
    #[command(long_about = "Configure Trakt API credentials and perform OAuth authentication. You'll need to create a Trakt API application at https://trakt.tv/oauth/applications first.")]
    Trakt {
        /// Trakt Client ID (if not provided, will prompt)
        #[arg(long)]
        client_id: Option<String>,

        /// Trakt Client Secret (if not provided, will prompt)
        #[arg(long)]
        client_secret: Option<String>,

        /// Trakt username used for the player name (looked up when omitted)
        #[arg(long)]
        username: Option<String>,
    },

    /// Configure TMDB artwork
    Tmdb {
        /// TMDB API key; empty disables artwork (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Configure polling intervals
    Polling {
        /// Seconds between polls while something is playing
        #[arg(long)]
        fast: Option<u64>,

        /// Seconds between polls while nothing is playing
        #[arg(long)]
        slow: Option<u64>,

        /// HTTP request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli.log_file.then(|| PathManager::default().log_file());
    logging::init_logging(cli.verbose, cli.quiet, log_file).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Watch { once } => watch::run_watch(once, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear { credentials } => clear::run_clear(credentials, &output).await,
    }
}
