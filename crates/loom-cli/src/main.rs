//! Loom CLI: run, inspect and validate anchored fabric simulations.

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod anchors;
mod commands;

#[derive(Parser)]
#[command(name = "loom")]
#[command(version, about = "Loom: real-time anchored fabric simulator")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulator with synthetic anchors for a fixed duration.
    Run {
        /// Path to simulator config (TOML). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Wall-clock run time in seconds.
        #[arg(short, long, default_value_t = 5.0)]
        duration: f64,

        /// Write rendered frames as JSON lines to this file.
        #[arg(short, long)]
        output: Option<String>,

        /// Anchor pose publication rate (Hz).
        #[arg(long, default_value_t = 30.0)]
        pose_rate: f64,

        /// Proportional gain of the anchor controller ((m/s) / m).
        #[arg(long, default_value_t = 1.0)]
        gain: f32,

        /// Per-axis anchor speed limit (m/s).
        #[arg(long, default_value_t = 0.2)]
        vel_limit: f32,
    },

    /// Generate a fabric mesh and print its statistics.
    Mesh {
        /// Path to simulator config (TOML) supplying the fabric section.
        #[arg(short, long)]
        config: Option<String>,

        /// Dump the mesh as JSON to this file.
        #[arg(long)]
        json: Option<String>,
    },

    /// Validate a simulator config file.
    Validate {
        /// Path to simulator config (TOML).
        path: String,
    },

    /// Print the default configuration as TOML.
    DefaultConfig,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_names(true)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Run {
            config,
            duration,
            output,
            pose_rate,
            gain,
            vel_limit,
        } => commands::run(&commands::RunOptions {
            config: config.as_deref(),
            duration,
            output: output.as_deref(),
            pose_rate,
            gain,
            vel_limit,
        }),
        Commands::Mesh { config, json } => commands::mesh(config.as_deref(), json.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
        Commands::DefaultConfig => commands::default_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
