//! Test utility functions for pipedef scenarios

use pipedef::core::{load_pipeline, load_project, PipelineDefinition, Project, ProjectContext, SourceFormat};
use pipedef::validation::{validate_pipeline, ValidationReport};

/// Context with `settings` declared as the settings root
pub fn settings_context() -> ProjectContext {
    let project = project_from_yaml(
        r#"
settings_root: settings
vcs_roots:
  - id: settings
    type: git
    url: "https://git.example.com/game.git"
"#,
    );
    project.context
}

/// Load a project, panicking with the loader error on failure
pub fn project_from_yaml(yaml: &str) -> Project {
    load_project(yaml, SourceFormat::Yaml).unwrap_or_else(|e| panic!("project should load: {}", e))
}

/// Load a single pipeline, panicking with the loader error on failure
pub fn pipeline_from_yaml(yaml: &str) -> PipelineDefinition {
    load_pipeline(yaml, SourceFormat::Yaml).unwrap_or_else(|e| panic!("pipeline should load: {}", e))
}

/// Load and validate a single pipeline against [`settings_context`]
pub fn validate_yaml(yaml: &str) -> ValidationReport {
    validate_pipeline(&pipeline_from_yaml(yaml), &settings_context())
}

/// Assert the report holds exactly the given field paths, in order
pub fn assert_fields(report: &ValidationReport, expected: &[&str]) {
    let fields: Vec<&str> = report.iter().map(|e| e.field()).collect();
    assert_eq!(fields, expected, "unexpected errors: {}", report);
}
