//! Rendering definitions into target configuration formats
//!
//! A [`Renderer`] turns the in-memory model into text for one target. The
//! [`RendererRegistry`] maps target identifiers (as given on the command
//! line) to renderers. Rendering is pure: no filesystem or network access.

pub mod structured;
pub mod teamcity;

use crate::core::{PipelineDefinition, Project};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub use structured::{JsonRenderer, YamlRenderer};
pub use teamcity::KotlinDslRenderer;

/// Requested target format has no registered renderer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported render target '{target}' (available: {})", available.join(", "))]
pub struct UnsupportedTargetError {
    pub target: String,
    pub available: Vec<&'static str>,
}

/// Error types for rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    UnsupportedTarget(#[from] UnsupportedTargetError),

    #[error("failed to serialize {target} output: {message}")]
    Serialization { target: &'static str, message: String },

    /// The definition uses something the target cannot express
    #[error("cannot render {target}: {message}")]
    Unrepresentable { target: &'static str, message: String },
}

/// Renders definitions into one target format
pub trait Renderer: Send + Sync {
    /// Target identifier, e.g. `yaml` or `teamcity-kotlin`
    fn target(&self) -> &'static str;

    /// File extension for rendered output
    fn file_extension(&self) -> &'static str;

    /// Render a single pipeline
    fn render_pipeline(&self, pipeline: &PipelineDefinition) -> Result<String, RenderError>;

    /// Render a whole project
    fn render_project(&self, project: &Project) -> Result<String, RenderError>;
}

/// Lookup of renderers by target identifier
#[derive(Default, Clone)]
pub struct RendererRegistry {
    renderers: HashMap<&'static str, Arc<dyn Renderer>>,
}

impl RendererRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Registry with every built-in renderer
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(YamlRenderer);
        registry.register(JsonRenderer);
        registry.register(KotlinDslRenderer);
        registry
    }

    /// Register a renderer, replacing any with the same target
    pub fn register(&mut self, renderer: impl Renderer + 'static) {
        self.renderers.insert(renderer.target(), Arc::new(renderer));
    }

    /// Get the renderer for a target
    pub fn get(&self, target: &str) -> Result<Arc<dyn Renderer>, UnsupportedTargetError> {
        self.renderers
            .get(target)
            .cloned()
            .ok_or_else(|| UnsupportedTargetError {
                target: target.to_string(),
                available: self.targets(),
            })
    }

    /// All registered targets, sorted
    pub fn targets(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.renderers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn render_pipeline(&self, target: &str, pipeline: &PipelineDefinition) -> Result<String, RenderError> {
        let renderer = self.get(target)?;
        debug!(pipeline = %pipeline.name, render_target = target, "rendering pipeline");
        renderer.render_pipeline(pipeline)
    }

    pub fn render_project(&self, target: &str, project: &Project) -> Result<String, RenderError> {
        let renderer = self.get(target)?;
        debug!(pipelines = project.pipelines.len(), render_target = target, "rendering project");
        renderer.render_project(project)
    }
}

/// Render a pipeline with the built-in renderers
pub fn render_pipeline(pipeline: &PipelineDefinition, target: &str) -> Result<String, RenderError> {
    RendererRegistry::with_defaults().render_pipeline(target, pipeline)
}

/// Render a project with the built-in renderers
pub fn render_project(project: &Project, target: &str) -> Result<String, RenderError> {
    RendererRegistry::with_defaults().render_project(target, project)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> PipelineDefinition {
        PipelineDefinition {
            name: "Build".to_string(),
            description: None,
            vcs: None,
            steps: vec![],
            triggers: vec![],
            features: vec![],
            artifact_rules: vec![],
        }
    }

    #[test]
    fn test_default_targets() {
        let registry = RendererRegistry::with_defaults();
        assert_eq!(registry.targets(), vec!["json", "teamcity-kotlin", "yaml"]);
    }

    #[test]
    fn test_unknown_target_is_unsupported() {
        let err = render_pipeline(&pipeline(), "jenkinsfile").unwrap_err();
        match err {
            RenderError::UnsupportedTarget(e) => {
                assert_eq!(e.target, "jenkinsfile");
                assert!(e.available.contains(&"yaml"));
                assert!(e.to_string().contains("jenkinsfile"));
            }
            other => panic!("Expected UnsupportedTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_registry_lists_nothing() {
        let registry = RendererRegistry::new();
        let err = registry.get("yaml").err().unwrap();
        assert!(err.available.is_empty());
    }
}
