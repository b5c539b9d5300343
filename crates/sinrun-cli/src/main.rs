//! CLI that runs a saved model once and compares its output with sin(x).

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sinrun_core::error::EXIT_FAILURE;
use sinrun_core::HarnessError;

use commands::{config, ops, run};

/// Load a model bundle, run one forward pass, and compare it with sin(x)
#[derive(Parser)]
#[command(name = "sinrun")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the model once and print the results (default)
    Run(run::RunArgs),

    /// List every operation in the model graph
    Ops(ops::OpsArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG, when set, takes precedence over -v
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", e);
    }

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        None => run::run(run::RunArgs::default(), config_path),
        Some(Commands::Run(args)) => run::run(args, config_path),
        Some(Commands::Ops(args)) => ops::run(args, config_path),
        Some(Commands::Config(args)) => config::run(args, config_path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{} {}", style("❌").red(), err);
            let code = err
                .downcast_ref::<HarnessError>()
                .map(HarnessError::exit_code)
                .unwrap_or(EXIT_FAILURE);
            ExitCode::from(code as u8)
        }
    }
}
