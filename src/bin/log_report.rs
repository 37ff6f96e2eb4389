//! Single-log analysis CLI for BRPL simulations.
//!
//! Prints delivery, delay and overhead figures for one Cooja log, or
//! compares a baseline log against an attack log.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};

use brpl_metrics::analysis::{self, LogReport, ScenarioMetrics};

#[derive(Parser)]
#[command(name = "brpl-log-report")]
#[command(about = "Delivery, delay and overhead analysis of Cooja logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Report metrics of a single log
    Report {
        /// Cooja log file, e.g. logs/COOJA.testlog
        log_file: PathBuf,

        /// Also write the report as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Compare a normal run against an attack run
    Compare {
        /// Log of the baseline scenario
        normal_log: PathBuf,

        /// Log of the attack scenario
        attack_log: PathBuf,

        /// Directory receiving the comparison table
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Commands::Report { log_file, json } => {
            log::info!("Parsing log file: {}", log_file.display());
            let metrics = analysis::parse_log_file(&log_file)?;
            let report = LogReport::new(&log_file, &metrics);

            println!("{}", analysis::generate_text_report(&report));

            if let Some(json_path) = json {
                analysis::generate_json_report(&report, &json_path)?;
            }
        }
        Commands::Compare {
            normal_log,
            attack_log,
            output_dir,
        } => {
            let normal = ScenarioMetrics::from(&analysis::parse_log_file(&normal_log)?);
            let attack = ScenarioMetrics::from(&analysis::parse_log_file(&attack_log)?);

            println!("\n=== Scenario Summary ===");
            println!("{}", normal.summary_line("Normal"));
            println!("{}", attack.summary_line("Attack"));

            fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory: {}", output_dir.display())
            })?;
            let path = analysis::write_comparison(&output_dir, &normal, &attack)?;
            println!("Summary saved to: {}", path.display());
        }
    }

    Ok(())
}
