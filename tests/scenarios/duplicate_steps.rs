//! Test: duplicate step identifiers

use crate::helpers::*;
use pipedef::validation::ValidationError;

#[test]
fn test_duplicate_step_id_reported_once() {
    let report = validate_yaml(
        r#"
name: "Build"
vcs:
  root: "$settings"
steps:
  - id: "compile"
    type: shell
    params:
      script: "make"
  - id: "compile"
    type: shell
    params:
      script: "make install"
"#,
    );

    assert_eq!(report.len(), 1, "unexpected errors: {}", report);
    match &report.errors()[0] {
        ValidationError::DuplicateStepId { step_id, field, .. } => {
            assert_eq!(step_id, "compile");
            assert_eq!(field, "steps[1].id");
        }
        other => panic!("Expected duplicate step id, got {:?}", other),
    }
}

/// Later repeats collapse into the error for the second occurrence
#[test]
fn test_triplicate_step_id() {
    let report = validate_yaml(
        r#"
name: "Build"
vcs:
  root: "$settings"
steps:
  - id: "unity"
    type: custom-tool
  - id: "unity"
    type: custom-tool
  - id: "unity"
    type: custom-tool
"#,
    );

    assert_fields(&report, &["steps[1].id"]);
    assert!(matches!(
        &report.errors()[0],
        ValidationError::DuplicateStepId { step_id, .. } if step_id == "unity"
    ));
}
