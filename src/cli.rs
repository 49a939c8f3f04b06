//! CLI definitions and entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;
use sentinel_engine::config::Settings;
use sentinel_engine::output::OutputMode;

/// sentinel-engine - Message classification with self-learning rules
#[derive(Parser, Debug)]
#[command(
    name = "sentinel-engine",
    version,
    about = "Message classification with self-learning rules",
    long_about = "Serve a binary text classifier over HTTP and learn new\n\
                  verification rules from flagged attempts.\n\n\
                  Settings come from defaults, then the config file, then\n\
                  environment variables, then command-line flags."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the /predict endpoint
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,

        /// Bind port
        #[arg(short, long)]
        port: Option<u16>,

        /// Request worker threads
        #[arg(short, long)]
        workers: Option<usize>,

        /// Directory holding the model artifacts
        #[arg(short, long)]
        model_dir: Option<PathBuf>,
    },

    /// Learn rules from flagged attempts
    Learn {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Seconds between cycles
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Classify a message locally
    Classify {
        /// Message text
        text: String,

        /// Directory holding the model artifacts
        #[arg(short, long)]
        model_dir: Option<PathBuf>,
    },

    /// Export verification attempts as JSON lines
    ExportAttempts,

    /// Show version
    Version,
}

/// Run the CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Variables already in the environment win over .env entries
    let dotenv = dotenvy::dotenv();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match dotenv {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {},
        Err(e) => log::warn!("Ignoring unreadable .env file: {e}"),
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let Some(command) = cli.command else {
        if output_mode == OutputMode::Json {
            println!(
                "{}",
                serde_json::json!({
                    "version": sentinel_engine::VERSION,
                    "hint": "Use --help for usage"
                })
            );
        } else {
            println!("sentinel-engine v{}", sentinel_engine::VERSION);
            println!("\nRun 'sentinel-engine --help' for usage");
            println!("Run 'sentinel-engine serve' to start the endpoint");
        }
        return Ok(());
    };

    if matches!(command, Command::Version) {
        if output_mode == OutputMode::Json {
            println!(
                "{}",
                serde_json::json!({
                    "version": sentinel_engine::VERSION
                })
            );
        } else {
            println!("sentinel-engine v{}", sentinel_engine::VERSION);
        }
        return Ok(());
    }

    let mut settings = Settings::load(cli.config.as_deref())?;

    match command {
        Command::Serve {
            host,
            port,
            workers,
            model_dir,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(workers) = workers {
                settings.server.workers = workers;
            }
            if let Some(dir) = model_dir {
                settings.server.model_dir = dir;
            }
            commands::serve(&settings.server)
        },
        Command::Learn {
            once,
            interval_secs,
        } => {
            if let Some(secs) = interval_secs {
                settings.learner.interval_secs = secs;
            }
            commands::learn(&settings, once, output_mode)
        },
        Command::Classify { text, model_dir } => {
            let dir = model_dir.unwrap_or(settings.server.model_dir);
            commands::classify(&dir, &text, output_mode)
        },
        Command::ExportAttempts => commands::export_attempts(&settings.store),
        Command::Version => Ok(()),
    }
}
