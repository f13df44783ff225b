//! Test: a pipeline with no VCS binding

use crate::helpers::*;
use pipedef::validation::ValidationError;

/// A custom-tool step with only a build target is fine; the missing
/// binding is the only problem
#[test]
fn test_missing_vcs_root_is_the_only_error() {
    let report = validate_yaml(
        r#"
name: "Build"
steps:
  - id: "unity"
    type: custom-tool
    params:
      buildTarget: "StandaloneWindows64"
"#,
    );

    assert!(!report.is_valid());
    assert_eq!(report.len(), 1);
    assert_eq!(
        report.errors()[0],
        ValidationError::MissingVcsRoot {
            pipeline: "Build".to_string()
        }
    );
    assert_fields(&report, &["vcs.root"]);
}

/// Binding the settings root makes the same pipeline valid
#[test]
fn test_settings_root_binding_is_valid() {
    let report = validate_yaml(
        r#"
name: "Build"
vcs:
  root: "$settings"
steps:
  - id: "unity"
    type: custom-tool
    params:
      buildTarget: "StandaloneWindows64"
"#,
    );

    assert!(report.is_valid(), "unexpected errors: {}", report);
}

/// A shell step without a script is reported alongside the missing binding
#[test]
fn test_errors_are_collected_not_short_circuited() {
    let report = validate_yaml(
        r#"
name: "Package"
steps:
  - id: "zip"
    type: shell
"#,
    );

    assert_fields(&report, &["vcs.root", "steps[0].params.script"]);
}
