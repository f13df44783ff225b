//! Core domain models for pipeline definitions
//!
//! This module defines the immutable data structures a configuration file
//! is loaded into: projects, pipelines, steps, triggers, features, VCS
//! bindings and artifact rules.

pub mod artifact;
pub mod config;
pub mod error;
pub mod feature;
pub mod pipeline;
pub mod project;
pub mod step;
pub mod trigger;
pub mod vcs;

pub use artifact::*;
pub use config::{load_pipeline, load_project, load_project_file, SourceFormat};
pub use error::ConfigError;
pub use feature::*;
pub use pipeline::*;
pub use project::*;
pub use step::*;
pub use trigger::*;
pub use vcs::*;
