//! Test: rendering through the registry

use crate::helpers::*;
use pipedef::core::{load_pipeline, load_project, SourceFormat};
use pipedef::render::{render_pipeline, render_project, RenderError, RendererRegistry};

const PROJECT: &str = r#"
version: "2024.03"
settings_root: settings
vcs_roots:
  - id: settings
    type: git
    url: "https://git.example.com/game.git"
    branch: "refs/heads/main"
pipelines:
  - name: "Nightly"
    description: "Full build every night"
    vcs:
      root: "$settings"
    artifact_rules:
      - "Builds/** => build.zip"
      - source: "Logs"
        exclude: true
    steps:
      - id: "build"
        type: shell
        params:
          script: "make all"
    triggers:
      - type: schedule
        cron: "0 0 2 * * ?"
      - type: manual
"#;

#[test]
fn test_unsupported_target_lists_available() {
    let pipeline = pipeline_from_yaml("name: \"Build\"\n");

    let err = render_pipeline(&pipeline, "github-actions").unwrap_err();
    match &err {
        RenderError::UnsupportedTarget(unsupported) => {
            assert_eq!(unsupported.target, "github-actions");
            assert_eq!(unsupported.available, vec!["json", "teamcity-kotlin", "yaml"]);
        }
        other => panic!("Expected unsupported target, got {:?}", other),
    }
    assert!(err.to_string().contains("github-actions"));
}

#[test]
fn test_yaml_and_json_round_trip() {
    let project = project_from_yaml(PROJECT);

    let yaml = render_project(&project, "yaml").unwrap();
    assert_eq!(load_project(&yaml, SourceFormat::Yaml).unwrap(), project);

    let json = render_project(&project, "json").unwrap();
    assert_eq!(load_project(&json, SourceFormat::Json).unwrap(), project);

    let pipeline = &project.pipelines[0];
    let yaml = render_pipeline(pipeline, "yaml").unwrap();
    assert_eq!(&load_pipeline(&yaml, SourceFormat::Yaml).unwrap(), pipeline);
}

#[test]
fn test_kotlin_schedule_with_seconds() {
    let project = project_from_yaml(PROJECT);
    let kts = render_project(&project, "teamcity-kotlin").unwrap();

    assert!(kts.contains("description = \"Full build every night\"\n"));
    assert!(kts.contains("seconds = \"0\"\n"));
    assert!(kts.contains("dayOfWeek = \"?\"\n"));
    assert!(kts.contains("-:Logs\n"));
    assert!(!kts.contains("GitVcsRoot"), "settings root is provided by the DSL context");
}

#[test]
fn test_registry_file_extensions() {
    let registry = RendererRegistry::with_defaults();
    let extensions: Vec<_> = registry
        .targets()
        .into_iter()
        .map(|t| registry.get(t).unwrap().file_extension())
        .collect();
    assert_eq!(extensions, vec!["json", "kts", "yaml"]);
}
