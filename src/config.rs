// src/config.rs

use crate::cli::{Args, LowConfidence};
use crate::error::{Error, Result};
use crate::process::Step;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Optional overrides read from a TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub prepare: Option<Vec<Step>>,
    pub timeout_secs: Option<u64>,
    pub low_confidence: Option<LowConfidence>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(steps) = &config.prepare {
            if steps.iter().any(|s| s.program.is_empty()) {
                return Err(Error::Config("prepare step with empty program".to_string()));
            }
        }
        Ok(config)
    }
}

/// Everything a run needs, after merging flags, file and defaults
#[derive(Debug, Clone)]
pub struct Config {
    pub repo: PathBuf,
    pub diffkemp: PathBuf,
    pub work_dir: PathBuf,
    pub prepare: Vec<Step>,
    pub timeout: Option<Duration>,
    pub low_confidence: LowConfidence,
}

impl Config {
    /// Flags win over the file, the file wins over built-in defaults.
    pub fn resolve(args: &Args, file: FileConfig) -> Config {
        let timeout_secs = args.timeout.or(file.timeout_secs).unwrap_or(0);
        Config {
            repo: args.repo.clone(),
            diffkemp: args.diffkemp.clone(),
            work_dir: args.work_dir.clone(),
            prepare: file.prepare.unwrap_or_else(default_prepare_steps),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            low_confidence: args.low_confidence.or(file.low_confidence).unwrap_or_default(),
        }
    }
}

/// Steps that make a kernel tree analyzable: full config without BTF, then
/// generated headers.
pub fn default_prepare_steps() -> Vec<Step> {
    vec![
        Step::new("make", ["allmodconfig"]),
        Step::new("scripts/config", ["--disable", "CONFIG_DEBUG_INFO_BTF"]),
        Step::new("make", ["prepare"]),
        Step::new("make", ["modules_prepare"]),
    ]
}
