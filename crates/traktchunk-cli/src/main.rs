use chunk_config::{PathManager, ServiceConfig, WindowPolicy};
use clap::{ArgAction, Parser, Subcommand};
use commands::{config, serve, token, window};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;
mod server;

#[derive(Parser)]
#[command(name = "traktchunk")]
#[command(about = "Serve a Trakt list one time-rotated chunk at a time")]
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

    /// Path to the TOML service configuration
    #[arg(long, global = true, env = "TRAKTCHUNK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    #[command(long_about = "Run the HTTP service answering GET /list/{list_id}?start=..&step=..&chunk=..&type=.. with the chunk of the Trakt list that is current today.")]
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Show which window a request would select (no network access)
    Window {
        /// Anchor date (YYYY-MM-DD or ISO-8601 datetime)
        #[arg(long)]
        start: String,

        /// Interval between chunk changes, in days
        #[arg(long)]
        step: i64,

        /// Items per chunk
        #[arg(long)]
        chunk: usize,

        /// Number of items in the list
        #[arg(long)]
        total: usize,

        /// Evaluate at this instant instead of now (RFC 3339)
        #[arg(long, value_name = "TIME")]
        at: Option<String>,

        /// Window policy (overrides window.policy)
        #[arg(long)]
        policy: Option<WindowPolicy>,
    },
    /// Inspect or refresh the stored Trakt token
    Token {
        #[command(subcommand)]
        cmd: TokenCommands,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Show whether the stored access token is valid (no network access)
    Status,
    /// Make sure a valid access token is stored, refreshing it if needed
    Ensure,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Show full values of masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let config_file = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let service_config = ServiceConfig::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let log_file = match cli.command {
        Commands::Serve { .. } => service_config.logging.file.clone(),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Serve { bind } => serve::run_serve(service_config, paths, bind, &output).await,
        Commands::Window { start, step, chunk, total, at, policy } => {
            let policy = policy.unwrap_or(service_config.window.policy);
            window::run_window(&start, step, chunk, total, at.as_deref(), policy, &output)
        }
        Commands::Token { cmd } => token::run_token(cmd, &service_config, &paths, &output).await,
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show { full } => config::show_config(&service_config, &config_file, &paths, full, &output),
            ConfigCommands::Init { force } => config::init_config(&config_file, force, &output),
        },
    }
}
