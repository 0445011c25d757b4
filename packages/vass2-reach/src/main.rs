use std::{fs::File, sync::Mutex, time::Duration};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use vass2_reach_lib::{
    automaton::vass::initialized::InitializedVASS2,
    config::{LoggerConfig, VASS2ReachConfig},
    logger::log_file_path,
    solver::{
        SerializableSolverResult, SerializableSolverStatus,
        vass2_reach::{LPSWitness, VASS2ReachSolver, VASS2ReachSolverStatistics},
    },
};

#[derive(Parser, Debug)]
#[command(name = "2-VASS Reachability Tool")]
#[command(version = "0.1")]
#[command(about = "Semi-decide reachability in 2-dimensional VASS with linear path schemes", long_about = None)]
struct Args {
    /// Automaton in JSON format.
    file: String,

    #[arg(short, long)]
    config: Option<String>,

    /// Longest simple path to consider, defaults to the number of states.
    #[arg(long)]
    max_path_length: Option<usize>,

    /// Most loops per scheme, defaults to states times transitions.
    #[arg(long)]
    max_cycles: Option<usize>,

    /// Give up after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Check the schemes in parallel.
    #[arg(long)]
    parallel: bool,

    /// Print the automaton in graphviz format instead of solving.
    #[arg(long)]
    dot: bool,
}

type Report = SerializableSolverResult<LPSWitness, VASS2ReachSolverStatistics>;

fn init_tracing(config: &LoggerConfig) -> anyhow::Result<()> {
    if !*config.get_enabled() {
        return Ok(());
    }

    let level = config.get_log_level().to_tracing_level();

    match log_file_path(config) {
        Some(path) => {
            std::fs::create_dir_all("./logs").context("failed to create log directory")?;
            let file = File::create(&path).with_context(|| format!("failed to create {}", path))?;

            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = VASS2ReachConfig::from_optional_file(args.config)?;
    if args.max_path_length.is_some() {
        config.set_max_path_length(args.max_path_length);
    }
    if args.max_cycles.is_some() {
        config.set_max_cycles(args.max_cycles);
    }
    if let Some(seconds) = args.timeout {
        config.set_timeout(Some(Duration::from_secs(seconds)));
    }
    if args.parallel {
        config.set_parallel(true);
    }

    let ivass = InitializedVASS2::from_file(&args.file)?;

    if args.dot {
        println!(
            "{}",
            ivass
                .vass
                .to_graphviz(Some(ivass.initial_state), Some(ivass.final_state))
        );
        return Ok(());
    }

    init_tracing(config.get_logger())?;
    tracing::debug!("{}", ivass.vass.to_fancy_string());

    let result = VASS2ReachSolver::new(&ivass, config).solve();
    let report = Report::from(result);

    println!("{}", serde_json::to_string_pretty(&report)?);

    let verdict = match report.status {
        SerializableSolverStatus::True => "reachable".bright_green(),
        SerializableSolverStatus::False => "not reachable within bounds".bright_red(),
        SerializableSolverStatus::Unknown => "unknown".yellow(),
    };
    eprintln!("{} {}", "Result:".dimmed(), verdict);

    Ok(())
}
