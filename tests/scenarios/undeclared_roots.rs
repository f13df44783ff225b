//! Test: references to VCS roots the project does not declare

use crate::helpers::*;
use pipedef::core::ProjectContext;
use pipedef::validation::{validate_pipeline, validate_project, ValidationError};

#[test]
fn test_undeclared_binding_names_field() {
    let report = validate_yaml(
        r#"
name: "Build"
vcs:
  root: "tools"
"#,
    );

    assert_eq!(report.len(), 1);
    match &report.errors()[0] {
        ValidationError::UndeclaredVcsRoot { field, root, .. } => {
            assert_eq!(field, "vcs.root");
            assert_eq!(root, "tools");
        }
        other => panic!("Expected undeclared root, got {:?}", other),
    }
}

#[test]
fn test_undeclared_publisher_root_names_feature() {
    let report = validate_yaml(
        r#"
name: "Run Tests"
vcs:
  root: "$settings"
features:
  - type: perfmon
  - type: commit-status-publisher
    vcs_root: "shared"
    publisher:
      type: swarm
      server_url: "http://helix-swarm:8085/"
      username: reviewer
      token: "credentialsJSON:abc"
"#,
    );

    assert_fields(&report, &["features[1].vcs_root"]);
}

/// `$settings` only resolves when the context names a settings root
#[test]
fn test_settings_token_without_settings_root() {
    let pipeline = pipeline_from_yaml(
        r#"
name: "Build"
vcs:
  root: "$settings"
"#,
    );

    let report = validate_pipeline(&pipeline, &ProjectContext::default());
    assert_fields(&report, &["vcs.root"]);
    assert!(matches!(&report.errors()[0], ValidationError::UndeclaredVcsRoot { .. }));
}

#[test]
fn test_settings_root_must_be_declared() {
    let project = project_from_yaml(
        r#"
settings_root: settings
vcs_roots:
  - id: game
    type: git
    url: "https://git.example.com/game.git"
pipelines:
  - name: "Build"
    vcs:
      root: game
"#,
    );

    let report = validate_project(&project);
    assert_eq!(
        report.errors(),
        &[ValidationError::UndeclaredSettingsRoot {
            root: "settings".to_string()
        }]
    );
    assert_eq!(report.errors()[0].pipeline(), None);
}
