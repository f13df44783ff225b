//! Smoke test - loads the bundled demo project end to end
//!
//! This test catches regressions that would break core functionality.
//! Run with: cargo test smoke_test

use pipedef::core::{load_project, load_project_file, CheckoutMode, Feature, SourceFormat, StepKind};
use pipedef::render::RendererRegistry;
use pipedef::validation::validate_project;

const DEMO: &str = include_str!("../demos/unity-project.yaml");

#[test]
fn smoke_test_demo_project_is_valid() {
    let project = load_project(DEMO, SourceFormat::Yaml).expect("Demo should load");

    let report = validate_project(&project);
    assert!(report.is_valid(), "Demo should validate: {}", report);

    let build = project.pipeline("Build").expect("Build pipeline");
    assert_eq!(build.vcs.as_ref().map(|b| b.checkout_mode), Some(CheckoutMode::ServerSide));
    assert_eq!(build.artifact_rules.len(), 3);
    assert_eq!(build.steps[0].kind, StepKind::CustomTool);
    assert_eq!(build.steps[0].params.len(), 7);
    assert_eq!(build.steps[0].param("silentCrashes"), Some("true"));

    let tests = project.pipeline("Run Tests").expect("Run Tests pipeline");
    assert_eq!(tests.steps[0].params.len(), 5);
    assert!(matches!(tests.features[0], Feature::CommitStatusPublisher(_)));
}

#[test]
fn smoke_test_demo_file_loads_from_disk() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/unity-project.yaml");
    let project = load_project_file(path).expect("Demo file should load");
    assert_eq!(project.pipelines.len(), 2);
}

#[test]
fn smoke_test_render_every_target() {
    let project = load_project(DEMO, SourceFormat::Yaml).unwrap();
    let registry = RendererRegistry::with_defaults();

    for target in registry.targets() {
        let rendered = registry
            .render_project(target, &project)
            .unwrap_or_else(|e| panic!("{} render failed: {}", target, e));
        assert!(!rendered.is_empty(), "{} output is empty", target);
    }
}

#[test]
fn smoke_test_demo_kotlin_output() {
    let project = load_project(DEMO, SourceFormat::Yaml).unwrap();
    let kts = RendererRegistry::with_defaults()
        .render_project("teamcity-kotlin", &project)
        .unwrap();

    assert!(kts.contains("import jetbrains.buildServer.configs.kotlin.buildFeatures.commitStatusPublisher\n"));
    assert!(kts.contains("import jetbrains.buildServer.configs.kotlin.buildFeatures.perfmon\n"));
    assert!(kts.contains("import jetbrains.buildServer.configs.kotlin.triggers.vcs\n"));
    assert!(kts.contains("version = \"2024.03\"\n"));
    assert!(kts.contains("project {\n\n    buildType(Build)\n    buildType(RunTests)\n}\n"));
    assert!(kts.contains("object Build : BuildType({\n    name = \"Build\"\n"));
    assert!(kts.contains("        -:%system.teamcity.projectName%/Builds/StandaloneWindows64/%system.teamcity.projectName%_BurstDebugInformation_DoNotShip/** => %system.teamcity.projectName%.zip\n"));
    assert!(kts.contains("        checkoutMode = CheckoutMode.ON_SERVER\n"));
    assert!(kts.contains("            param(\"buildTarget\", \"StandaloneWindows64\")\n"));
    assert!(kts.contains("    triggers {\n        vcs {\n        }\n    }\n"));
    assert!(kts.contains("    features {\n        perfmon {\n        }\n    }\n"));
    assert!(kts.contains("            name = \"Run Edit Mode Tests\"\n"));
    assert!(kts.contains("            vcsRootExtId = \"${DslContext.settingsRoot.id}\"\n"));
    assert!(kts.contains("                serverUrl = \"http://helix-swarm:8085/\"\n"));
    assert!(!kts.contains("PerforceVcsRoot"));
}
