//! Command-line interface

pub mod commands;
pub mod output;
pub mod settings;

use clap::{Parser, Subcommand};
use commands::{ListCommand, RenderCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Load, validate and render CI pipeline definitions
#[derive(Debug, Parser, Clone)]
#[command(name = "pipedef")]
#[command(author = "pipedef Contributors")]
#[command(version)]
#[command(about = "Load, validate and render CI pipeline definitions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the settings file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Validate one or more pipeline configuration files
    Validate(ValidateCommand),

    /// Render a configuration file to a target format
    Render(RenderCommand),

    /// List the pipelines defined in a configuration file
    List(ListCommand),

    /// List the available render targets
    Targets,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
