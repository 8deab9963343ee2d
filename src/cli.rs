// src/cli.rs

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Check semantic equality of several commits using DiffKemp", long_about = None)]
pub struct Args {
    /// Path to the repository to analyze
    pub repo: PathBuf,

    /// Path to the DiffKemp executable
    #[arg(long, default_value = "diffkemp")]
    pub diffkemp: PathBuf,

    /// Directory under which snapshot/ and result/ are created
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    /// What to do with commits whose hunks are not all attributed to a function
    #[arg(long, value_enum)]
    pub low_confidence: Option<LowConfidence>,

    /// Per-invocation timeout for external tools, in seconds (0 disables it)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// TOML file overriding the project preparation steps
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Hide the progress spinner
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(clap::ValueEnum, Deserialize, Clone, Debug, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LowConfidence {
    /// Build and compare anyway, flagging the row as not confident
    #[default]
    Analyze,
    /// Skip building and report the commit as UNK
    Skip,
}
