//! Where each artifact lives inside a run directory.
//!
//! The defaults match the Cooja batch scripts. A YAML file can override any
//! subset of paths:
//!
//! ```yaml
//! log: logs/COOJA.testlog
//! exposure: trust/exposure.csv
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Relative paths of the per-run artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunLayout {
    /// Simulator log (required)
    pub log: PathBuf,
    /// Trust-engine exposure metrics (optional)
    pub exposure: PathBuf,
    /// Per-node parent switch rates (optional)
    pub parent_switch: PathBuf,
    /// General stats, fallback for the switch rate and source of sink metrics (optional)
    pub stats: PathBuf,
}

impl Default for RunLayout {
    fn default() -> Self {
        Self {
            log: PathBuf::from("logs/COOJA.testlog"),
            exposure: PathBuf::from("exposure.csv"),
            parent_switch: PathBuf::from("parent_switch.csv"),
            stats: PathBuf::from("stats.csv"),
        }
    }
}

impl RunLayout {
    /// Every path must stay inside the run directory
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let entries = [
            ("log", &self.log),
            ("exposure", &self.exposure),
            ("parent_switch", &self.parent_switch),
            ("stats", &self.stats),
        ];
        for (name, path) in entries {
            if path.as_os_str().is_empty() {
                return Err(AnalysisError::Layout(format!("{} path is empty", name)));
            }
            if path.is_absolute() {
                return Err(AnalysisError::Layout(format!(
                    "{} path must be relative to the run directory: {}",
                    name,
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn log_path(&self, run_dir: &Path) -> PathBuf {
        run_dir.join(&self.log)
    }

    pub fn exposure_path(&self, run_dir: &Path) -> PathBuf {
        run_dir.join(&self.exposure)
    }

    pub fn parent_switch_path(&self, run_dir: &Path) -> PathBuf {
        run_dir.join(&self.parent_switch)
    }

    pub fn stats_path(&self, run_dir: &Path) -> PathBuf {
        run_dir.join(&self.stats)
    }
}

/// Load a run layout from a YAML file
pub fn load_layout(layout_path: &Path) -> Result<RunLayout> {
    info!("Loading run layout from: {:?}", layout_path);

    let file = File::open(layout_path)
        .with_context(|| format!("Failed to open layout file: {}", layout_path.display()))?;

    let layout: RunLayout = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse layout file: {}", layout_path.display()))?;

    layout.validate()?;

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_layout() {
        let layout = RunLayout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(
            layout.log_path(Path::new("/r/run1")),
            PathBuf::from("/r/run1/logs/COOJA.testlog")
        );
        assert_eq!(
            layout.stats_path(Path::new("run1")),
            PathBuf::from("run1/stats.csv")
        );
    }

    #[test]
    fn test_partial_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "exposure: trust/exposure.csv").unwrap();

        let layout = load_layout(file.path()).unwrap();
        assert_eq!(layout.exposure, PathBuf::from("trust/exposure.csv"));
        assert_eq!(layout.log, PathBuf::from("logs/COOJA.testlog"));
    }

    #[test]
    fn test_absolute_path_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log: /var/log/cooja.log").unwrap();

        let err = load_layout(file.path()).unwrap_err();
        assert!(err.to_string().contains("relative"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "logfile: x.log").unwrap();

        assert!(load_layout(file.path()).is_err());
    }
}
