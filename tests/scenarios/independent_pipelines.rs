//! Test: pipelines of a project are validated independently

use crate::helpers::*;
use pipedef::validation::{validate_project, ValidationError};

const TWO_PIPELINES: &str = r#"
settings_root: settings
vcs_roots:
  - id: settings
    type: perforce
    url: "ssl:helix:1666"
pipelines:
  - name: "Build"
    vcs:
      root: "$settings"
    steps:
      - id: "unity"
        type: custom-tool
        params:
          buildTarget: "StandaloneWindows64"
  - name: "Run Tests"
    steps:
      - id: "unity"
        type: custom-tool
"#;

#[test]
fn test_one_broken_pipeline_does_not_taint_another() {
    let project = project_from_yaml(TWO_PIPELINES);
    let report = validate_project(&project);

    assert_eq!(report.for_pipeline("Build").count(), 0);
    let errors: Vec<_> = report.for_pipeline("Run Tests").collect();
    assert_eq!(
        errors,
        vec![&ValidationError::MissingVcsRoot {
            pipeline: "Run Tests".to_string()
        }]
    );
}

/// Reusing a step id across pipelines is not a duplicate
#[test]
fn test_step_ids_are_scoped_to_their_pipeline() {
    let project = project_from_yaml(TWO_PIPELINES);
    let report = validate_project(&project);

    assert!(!report
        .iter()
        .any(|e| matches!(e, ValidationError::DuplicateStepId { .. })));
}

#[test]
fn test_duplicate_pipeline_names() {
    let project = project_from_yaml(
        r#"
settings_root: settings
vcs_roots:
  - id: settings
    type: perforce
    url: "ssl:helix:1666"
pipelines:
  - name: "Build"
    vcs:
      root: settings
  - name: "Build"
    vcs:
      root: settings
"#,
    );

    let report = validate_project(&project);
    assert_eq!(
        report.errors(),
        &[ValidationError::DuplicatePipelineName {
            pipeline: "Build".to_string()
        }]
    );
}
