//! pipedef - vendor-neutral CI pipeline definitions
//!
//! Load pipeline definitions from YAML or JSON, validate them, and render
//! them to a CI server's native configuration format.

pub mod cli;
pub mod core;
pub mod render;
pub mod validation;

// Re-export commonly used types
pub use crate::core::{load_pipeline, load_project, load_project_file, ConfigError, SourceFormat};
pub use crate::core::{PipelineDefinition, Project, ProjectContext, Step, StepKind, Trigger};
pub use crate::render::{render_pipeline, render_project, RenderError, RendererRegistry, UnsupportedTargetError};
pub use crate::validation::{validate_pipeline, validate_project, ValidationError, ValidationReport};
