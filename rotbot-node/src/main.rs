//! # RotBot Node
//!
//! Host runner for the RotBot environmental classifier.
//!
//! ## Usage
//!
//! ```bash
//! # Run the acquisition loop against scripted sensors, reporting to the
//! # endpoint in the config file
//! rotbot-node run --config node.json
//!
//! # Ten cycles, then print a summary
//! rotbot-node run --config node.json --cycles 10
//!
//! # Validate a config and show the rule table
//! rotbot-node check-config --config node.json
//!
//! # Receive reports and show the status board
//! rotbot-node serve --port 5000
//! ```

mod config;
mod serve;
mod sim;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rotbot_connectors::HttpReporter;
use rotbot_core::time::SystemClock;
use rotbot_core::{AcquisitionLoop, Dimension, StateClassifier, SystemState};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use config::{NodeConfig, NodeError};
use sim::{LogIndicator, ScriptedSensors};

/// RotBot environmental classifier node
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the acquisition loop
    Run {
        /// JSON config file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many cycles instead of running forever
        #[arg(short = 'n', long)]
        cycles: Option<u64>,
    },

    /// Validate a config file and print the classification tables
    CheckConfig {
        /// JSON config file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Serve the status board
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::new(level.as_str())
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match args.command {
        Command::Run { config, cycles } => run(config, cycles),
        Command::CheckConfig { config } => check_config(config),
        Command::Serve { port, bind } => serve_board(SocketAddr::new(bind, port)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: Option<PathBuf>, cycles: Option<u64>) -> Result<(), NodeError> {
    let config = NodeConfig::load_or_default(path.as_deref())?;
    let classifier = config.classifier()?;

    info!("RotBot Node v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Reporting to {}:{}{} every {}ms",
        config.reporter.host,
        config.reporter.port,
        config.reporter.path,
        config.loop_config.cycle_delay_ms
    );

    let reporter = HttpReporter::new(config.reporter.clone())?;
    let mut node = AcquisitionLoop::new(
        ScriptedSensors::new(config.script.clone()),
        LogIndicator::new(),
        reporter,
        SystemClock::new(),
        classifier,
        config.loop_config,
    );

    let Some(cycles) = cycles else {
        node.run();
    };

    node.run_cycles(cycles);

    let stats = node.sink().stats();
    info!(
        "{} cycles, final state {}, {} reports delivered, {} failed",
        node.cycles(),
        node.current_state(),
        stats.messages_sent,
        stats.messages_failed
    );
    if let Some(last) = &stats.last_error {
        info!("Last telemetry error: {}", last);
    }
    Ok(())
}

fn check_config(path: Option<PathBuf>) -> Result<(), NodeError> {
    let config = NodeConfig::load_or_default(path.as_deref())?;
    let classifier = config.classifier()?;
    print_summary(&config, &classifier);
    Ok(())
}

fn print_summary(config: &NodeConfig, classifier: &StateClassifier) {
    println!("Boundaries:");
    for dimension in Dimension::ALL {
        let boundaries = classifier.quantizer().boundaries(dimension);
        println!("  {:<12} {:?} {}", dimension.name(), boundaries.bounds(), dimension.unit());
    }

    println!("Rules (checked in this order):");
    for state in SystemState::ALL {
        println!("  {:<7} {} triples", state.name(), classifier.rules().rules_for(state).len());
    }
    println!("Default state: {}", classifier.default_state());

    let overlaps: Vec<_> = classifier.rules().overlaps().collect();
    if overlaps.is_empty() {
        println!("No overlapping rules");
    } else {
        println!("Overlapping rules:");
        for (triple, winner, loser) in overlaps {
            println!("  {} listed for {} and {}, resolves {}", triple, winner, loser, winner);
        }
    }

    println!(
        "Reporter: {}:{}{} (inactivity timeout {}ms)",
        config.reporter.host,
        config.reporter.port,
        config.reporter.path,
        config.reporter.inactivity_timeout_ms
    );
    println!("Script: {} readings", config.script.len());
}

fn serve_board(addr: SocketAddr) -> Result<(), NodeError> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve::serve(addr))
}
