//! Test: every definition the validator accepts survives a yaml/json round trip

use crate::helpers::*;
use pipedef::core::{
    load_pipeline, ArtifactRule, CheckoutMode, PipelineDefinition, SourceFormat, Step, StepKind, Trigger,
    VcsBinding, VcsRootRef,
};
use pipedef::render::render_pipeline;
use pipedef::validation::validate_pipeline;
use std::collections::BTreeMap;

fn step(id: &str, kind: StepKind, tool: Option<&str>, params: &[(&str, &str)]) -> Step {
    Step {
        id: id.to_string(),
        name: None,
        kind,
        tool: tool.map(str::to_string),
        params: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn definition(name: &str, steps: Vec<Step>, artifact_rules: Vec<ArtifactRule>) -> PipelineDefinition {
    PipelineDefinition {
        name: name.to_string(),
        description: None,
        vcs: Some(VcsBinding {
            root: VcsRootRef::Settings,
            checkout_mode: CheckoutMode::ServerSide,
        }),
        steps,
        triggers: vec![
            Trigger::VcsChange {
                branch_filter: vec!["+:main".to_string()],
            },
            Trigger::Manual,
        ],
        features: vec![],
        artifact_rules,
    }
}

fn candidates() -> Vec<PipelineDefinition> {
    vec![
        definition(
            "Build",
            vec![step(
                "unity",
                StepKind::CustomTool,
                None,
                &[("editorVersion", "2022.30"), ("noGraphics", "true"), ("projectPath", "")],
            )],
            vec![
                ArtifactRule::parse("-:Builds/** => out.zip").unwrap(),
                ArtifactRule {
                    source: "a => b".to_string(),
                    destination: Some(String::new()),
                    exclude: false,
                },
            ],
        ),
        definition(
            "Package",
            vec![step("zip", StepKind::Shell, None, &[("script", "echo $X\nzip -r out.zip .")])],
            vec![],
        ),
        definition("", vec![], vec![]),
        definition(
            "Tooling",
            vec![step("compile", StepKind::Shell, Some("msbuild"), &[("script", "make")])],
            vec![],
        ),
        definition(
            "Params",
            vec![step("unity", StepKind::CustomTool, None, &[(" ", "x")])],
            vec![],
        ),
    ]
}

#[test]
fn test_accepted_definitions_round_trip() {
    let ctx = settings_context();
    let mut accepted = 0;

    for pipeline in candidates() {
        if !validate_pipeline(&pipeline, &ctx).is_valid() {
            continue;
        }
        accepted += 1;

        let yaml = render_pipeline(&pipeline, "yaml").unwrap();
        let reloaded = load_pipeline(&yaml, SourceFormat::Yaml)
            .unwrap_or_else(|e| panic!("'{}' yaml did not reload: {}\n{}", pipeline.name, e, yaml));
        assert_eq!(reloaded, pipeline);

        let json = render_pipeline(&pipeline, "json").unwrap();
        let reloaded = load_pipeline(&json, SourceFormat::Json)
            .unwrap_or_else(|e| panic!("'{}' json did not reload: {}\n{}", pipeline.name, e, json));
        assert_eq!(reloaded, pipeline);
    }

    assert_eq!(accepted, 2);
}

#[test]
fn test_definitions_the_loader_would_reject_are_invalid() {
    let ctx = settings_context();
    let rejected: Vec<Vec<String>> = candidates()
        .iter()
        .skip(2)
        .map(|p| validate_pipeline(p, &ctx).iter().map(|e| e.field().to_string()).collect())
        .collect();

    assert_eq!(
        rejected,
        vec![
            vec!["name".to_string()],
            vec!["steps[0].tool".to_string()],
            vec!["steps[0].params".to_string()],
        ]
    );
}
