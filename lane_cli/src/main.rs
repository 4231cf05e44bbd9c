//! # StrikePath CLI
//!
//! Terminal front end for the StrikePath alignment engine: keep a roster of
//! bowlers, work out stance positions, and pass profiles around as share
//! links.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lane_core::errors::CalcError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{CalcRequest, ProfileArgs, RosterFile};

#[derive(Parser)]
#[command(name = "strikepath")]
#[command(about = "Bowling lane math: where to stand for a given target and breakpoint")]
struct Cli {
    /// Roster file (default from config, then ./roster.strk)
    #[arg(short, long, global = true)]
    roster: Option<PathBuf>,

    /// Config file (default ./strikepath.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, global = true)]
    log_level: Option<String>,

    /// Log file path (default from config, then the null device)
    #[arg(short = 'F', long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all bowlers (* marks the selected one)
    List,
    /// Add a bowler
    Add {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Edit a bowler's constants
    Edit {
        /// Bowler name, id or id prefix
        bowler: String,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Delete a bowler
    Delete {
        /// Bowler name, id or id prefix
        bowler: String,
    },
    /// Select the bowler used by `calc`
    Select {
        /// Bowler name, id or id prefix
        bowler: String,
    },
    /// Calculate the stance position
    Calc {
        /// Bowler name, id or id prefix (default: selected bowler)
        bowler: Option<String>,

        /// Arrow target board (1-39)
        #[arg(short, long, allow_negative_numbers = true)]
        target: Option<i32>,

        /// Breakpoint board (1-39)
        #[arg(short, long, allow_negative_numbers = true)]
        breakpoint: Option<i32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a share link for a bowler
    Share {
        /// Bowler name, id or id prefix
        bowler: String,

        /// Base URL of the share link
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Import a bowler from a share link or token
    Import {
        /// Share link or bare token
        link: String,
    },
    /// Display current configuration
    Config,
}

fn init_logging(log_level: &str, log_file: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_file, e);
            return;
        }
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// CLI arguments take precedence over the config file
fn resolve_config(cli: &Cli, mut cfg: config::Config) -> config::Config {
    if let Some(level) = &cli.log_level {
        cfg.log_level = level.clone();
    }
    if let Some(file) = &cli.log_file {
        cfg.log_file = file.clone();
    }
    if let Some(roster) = &cli.roster {
        cfg.roster_path = roster.clone();
    }
    cfg
}

fn handle_config_command(cfg: &config::Config) {
    println!("Current Configuration:");
    println!("=====================");
    println!("log_level: {}", cfg.log_level);
    println!("log_file: {}", cfg.log_file);
    println!("roster_path: {}", cfg.roster_path.display());
    println!("share_base_url: {}", cfg.share_base_url);
    println!("user_id: {}", cfg.user_id());
}

fn execute_command(cfg: &config::Config, command: Commands) -> anyhow::Result<()> {
    let path = cfg.roster_path.as_path();
    let user_id = cfg.user_id();

    match command {
        Commands::Config => {
            handle_config_command(cfg);
            Ok(())
        }
        Commands::List => commands::list(&RosterFile::open(path)?),
        Commands::Share { bowler, base_url } => {
            let base_url = base_url.as_deref().unwrap_or(&cfg.share_base_url);
            commands::share_link(&RosterFile::open(path)?, &bowler, base_url)
        }
        Commands::Add { profile } => {
            commands::add(&mut RosterFile::open_for_write(path, &user_id)?, profile)
        }
        Commands::Edit { bowler, profile } => {
            commands::edit(&mut RosterFile::open_for_write(path, &user_id)?, &bowler, profile)
        }
        Commands::Delete { bowler } => {
            commands::delete(&mut RosterFile::open_for_write(path, &user_id)?, &bowler)
        }
        Commands::Select { bowler } => {
            commands::select(&mut RosterFile::open_for_write(path, &user_id)?, &bowler)
        }
        Commands::Calc {
            bowler,
            target,
            breakpoint,
            json,
        } => {
            // Showing the stored selection needs no write lock
            let mut file = if bowler.is_none() && target.is_none() && breakpoint.is_none() {
                RosterFile::open(path)?
            } else {
                RosterFile::open_for_write(path, &user_id)?
            };
            let request = CalcRequest {
                bowler: bowler.as_deref(),
                target,
                breakpoint,
                json,
            };
            commands::calc(&mut file, request)
        }
        Commands::Import { link } => {
            commands::import(&mut RosterFile::open_for_write(path, &user_id)?, &link)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let cfg = match config::read(cli.config.as_deref()) {
        Ok(cfg) => resolve_config(&cli, cfg),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    if cfg.log_file != config::DEFAULT_LOG_FILE {
        init_logging(&cfg.log_level, &cfg.log_file);
    }

    if let Err(e) = execute_command(&cfg, cli.command) {
        eprintln!("Error: {:#}", e);
        tracing::error!("Command failed: {:#}", e);
        if let Some(calc_error) = e.downcast_ref::<CalcError>() {
            if let Ok(json) = serde_json::to_string_pretty(calc_error) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
        }
        std::process::exit(1);
    }
}
