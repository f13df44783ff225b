//! YAML and JSON renderers
//!
//! Both write the same document shape the loader reads, so their output can
//! be loaded back into an equal definition.

use crate::core::config::{PipelineDocument, ProjectDocument};
use crate::core::{PipelineDefinition, Project};
use crate::render::{RenderError, Renderer};

/// Renders the loader's YAML document format
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlRenderer;

impl Renderer for YamlRenderer {
    fn target(&self) -> &'static str {
        "yaml"
    }

    fn file_extension(&self) -> &'static str {
        "yaml"
    }

    fn render_pipeline(&self, pipeline: &PipelineDefinition) -> Result<String, RenderError> {
        to_yaml(&PipelineDocument::from(pipeline))
    }

    fn render_project(&self, project: &Project) -> Result<String, RenderError> {
        to_yaml(&ProjectDocument::from(project))
    }
}

/// Renders the loader's JSON document format
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn target(&self) -> &'static str {
        "json"
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn render_pipeline(&self, pipeline: &PipelineDefinition) -> Result<String, RenderError> {
        to_json(&PipelineDocument::from(pipeline))
    }

    fn render_project(&self, project: &Project) -> Result<String, RenderError> {
        to_json(&ProjectDocument::from(project))
    }
}

fn to_yaml<T: serde::Serialize>(document: &T) -> Result<String, RenderError> {
    serde_yaml::to_string(document).map_err(|e| RenderError::Serialization {
        target: "yaml",
        message: e.to_string(),
    })
}

fn to_json<T: serde::Serialize>(document: &T) -> Result<String, RenderError> {
    serde_json::to_string_pretty(document)
        .map(|mut json| {
            json.push('\n');
            json
        })
        .map_err(|e| RenderError::Serialization {
            target: "json",
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{load_pipeline, SourceFormat};

    const PIPELINE: &str = r#"
name: "Run Tests"
vcs:
  root: "$settings"
steps:
  - id: "unity"
    name: "Run Edit Mode Tests"
    type: custom-tool
    params:
      runEditorTests: true
      testPlatform: editmode
triggers:
  - type: vcs
    branch_filter:
      - "+:main"
  - type: manual
"#;

    #[test]
    fn test_yaml_round_trip() {
        let pipeline = load_pipeline(PIPELINE, SourceFormat::Yaml).unwrap();
        let rendered = YamlRenderer.render_pipeline(&pipeline).unwrap();
        let reloaded = load_pipeline(&rendered, SourceFormat::Yaml).unwrap();
        assert_eq!(reloaded, pipeline);
    }

    #[test]
    fn test_json_round_trip() {
        let pipeline = load_pipeline(PIPELINE, SourceFormat::Yaml).unwrap();
        let rendered = JsonRenderer.render_pipeline(&pipeline).unwrap();
        let reloaded = load_pipeline(&rendered, SourceFormat::Json).unwrap();
        assert_eq!(reloaded, pipeline);
    }

    #[test]
    fn test_yaml_output_spells_out_defaults() {
        let pipeline = load_pipeline(PIPELINE, SourceFormat::Yaml).unwrap();
        let rendered = YamlRenderer.render_pipeline(&pipeline).unwrap();
        assert!(rendered.contains("checkout_mode: agent-side"));
        assert!(rendered.contains("type: custom-tool"));
    }
}
