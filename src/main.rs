use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use brpl_metrics::analysis::{self, report};
use brpl_metrics::layout::{self, RunLayout};

/// Summarize every run of a BRPL simulation batch into one CSV table
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Results directory holding one sub-directory per simulation run
    results_dir: PathBuf,

    /// Summary file name, written inside the results directory
    #[arg(long, default_value = report::DEFAULT_SUMMARY_NAME)]
    out: String,

    /// Invalid-runs file name, written only when some run is invalid
    #[arg(long, default_value = report::DEFAULT_INVALID_NAME)]
    invalid_out: String,

    /// YAML file overriding where artifacts live inside a run directory
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    info!("Results directory: {:?}", args.results_dir);

    let run_layout = match &args.layout {
        Some(path) => layout::load_layout(path)?,
        None => RunLayout::default(),
    };

    let tables = analysis::collect_runs(&args.results_dir, &run_layout)?;
    let summary_path =
        analysis::write_summary_tables(&tables, &args.results_dir, &args.out, &args.invalid_out)?;

    println!("{}", summary_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["brpl-summary", "results/exp1"]);

        assert_eq!(args.results_dir, PathBuf::from("results/exp1"));
        assert_eq!(args.out, "summary_from_trust_engine.csv");
        assert_eq!(args.invalid_out, "invalid_runs.csv");
        assert!(args.layout.is_none());
    }

    #[test]
    fn test_custom_output_name() {
        let args = Args::parse_from([
            "brpl-summary",
            "results/exp1",
            "--out",
            "table.csv",
            "--layout",
            "layout.yaml",
        ]);

        assert_eq!(args.out, "table.csv");
        assert_eq!(args.layout, Some(PathBuf::from("layout.yaml")));
    }

    #[test]
    fn test_results_dir_required() {
        assert!(Args::try_parse_from(["brpl-summary"]).is_err());
    }
}
