//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Validate pipeline configuration files
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Configuration files (YAML or JSON); validated concurrently
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Render a configuration file
#[derive(Debug, Args, Clone)]
pub struct RenderCommand {
    /// Path to the configuration file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Target format (see `pipedef targets`); defaults to the settings file
    #[arg(short, long)]
    pub target: Option<String>,

    /// Render only the named pipeline
    #[arg(short, long)]
    pub pipeline: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Render even if validation reports errors
    #[arg(long)]
    pub skip_validation: bool,
}

/// List pipelines in a configuration file
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Path to the configuration file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
