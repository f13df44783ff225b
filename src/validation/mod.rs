//! Semantic validation of loaded pipeline definitions
//!
//! Loading only checks that a document is well formed. The checks here look
//! at how the pieces refer to each other: VCS references, step parameter
//! sets, duplicate identifiers and the like. Problems are collected rather
//! than returned on the first hit so a user sees all of them at once.

use crate::core::{
    cron_fields, Feature, PipelineDefinition, Project, ProjectContext, Publisher, StepKind, Trigger,
    VcsRootRef,
};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

static STEP_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("step id pattern is valid"));

/// A semantic inconsistency in a definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pipeline name '{pipeline}' is blank (`name`)")]
    BlankPipelineName { pipeline: String },

    #[error("pipeline '{pipeline}': no VCS root is bound (`vcs.root`)")]
    MissingVcsRoot { pipeline: String },

    #[error("pipeline '{pipeline}': `{field}` references undeclared VCS root '{root}'")]
    UndeclaredVcsRoot {
        pipeline: String,
        field: String,
        root: String,
    },

    #[error("pipeline '{pipeline}': duplicate step id '{step_id}' (`{field}`)")]
    DuplicateStepId {
        pipeline: String,
        step_id: String,
        field: String,
    },

    #[error("pipeline '{pipeline}': step id '{step_id}' is not a valid identifier (`{field}`)")]
    InvalidStepId {
        pipeline: String,
        step_id: String,
        field: String,
    },

    #[error("pipeline '{pipeline}': shell step '{step_id}' names a tool runner (`{field}`)")]
    ToolOnShellStep {
        pipeline: String,
        step_id: String,
        field: String,
    },

    #[error("pipeline '{pipeline}': step '{step_id}' has a blank parameter name (`{field}`)")]
    BlankParameterName {
        pipeline: String,
        step_id: String,
        field: String,
    },

    #[error("pipeline '{pipeline}': {kind} step '{step_id}' is missing required parameter '{param}'")]
    MissingParameter {
        pipeline: String,
        step_id: String,
        kind: StepKind,
        param: String,
        field: String,
    },

    #[error("pipeline '{pipeline}': artifact rule has an empty source pattern (`{field}`)")]
    EmptyArtifactSource { pipeline: String, field: String },

    #[error("pipeline '{pipeline}': '{cron}' is not a cron expression (`{field}`)")]
    InvalidSchedule {
        pipeline: String,
        cron: String,
        field: String,
    },

    #[error("pipeline '{pipeline}': publisher server URL '{url}' must use http or https (`{field}`)")]
    InvalidPublisherUrl {
        pipeline: String,
        url: String,
        field: String,
    },

    #[error("duplicate pipeline name '{pipeline}'")]
    DuplicatePipelineName { pipeline: String },

    #[error("settings root '{root}' is not a declared VCS root (`settings_root`)")]
    UndeclaredSettingsRoot { root: String },
}

impl ValidationError {
    /// Field path the error refers to, relative to its pipeline
    pub fn field(&self) -> &str {
        match self {
            ValidationError::BlankPipelineName { .. } => "name",
            ValidationError::MissingVcsRoot { .. } => "vcs.root",
            ValidationError::UndeclaredVcsRoot { field, .. }
            | ValidationError::DuplicateStepId { field, .. }
            | ValidationError::InvalidStepId { field, .. }
            | ValidationError::ToolOnShellStep { field, .. }
            | ValidationError::BlankParameterName { field, .. }
            | ValidationError::MissingParameter { field, .. }
            | ValidationError::EmptyArtifactSource { field, .. }
            | ValidationError::InvalidSchedule { field, .. }
            | ValidationError::InvalidPublisherUrl { field, .. } => field,
            ValidationError::DuplicatePipelineName { .. } => "name",
            ValidationError::UndeclaredSettingsRoot { .. } => "settings_root",
        }
    }

    /// Pipeline the error belongs to, if it is not project-wide
    pub fn pipeline(&self) -> Option<&str> {
        match self {
            ValidationError::BlankPipelineName { pipeline }
            | ValidationError::MissingVcsRoot { pipeline }
            | ValidationError::UndeclaredVcsRoot { pipeline, .. }
            | ValidationError::DuplicateStepId { pipeline, .. }
            | ValidationError::InvalidStepId { pipeline, .. }
            | ValidationError::ToolOnShellStep { pipeline, .. }
            | ValidationError::BlankParameterName { pipeline, .. }
            | ValidationError::MissingParameter { pipeline, .. }
            | ValidationError::EmptyArtifactSource { pipeline, .. }
            | ValidationError::InvalidSchedule { pipeline, .. }
            | ValidationError::InvalidPublisherUrl { pipeline, .. }
            | ValidationError::DuplicatePipelineName { pipeline } => Some(pipeline),
            ValidationError::UndeclaredSettingsRoot { .. } => None,
        }
    }
}

/// Set of validation errors; empty means valid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; an identical error is only kept once
    pub fn push(&mut self, error: ValidationError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    pub fn extend(&mut self, other: ValidationReport) {
        for error in other.errors {
            self.push(error);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Errors belonging to one pipeline
    pub fn for_pipeline<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.pipeline() == Some(name))
    }

    /// `Ok(())` when valid, otherwise the report itself
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("no validation errors");
        }
        writeln!(f, "{} validation error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

impl IntoIterator for ValidationReport {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Validate one pipeline against the context it will run in
pub fn validate_pipeline(pipeline: &PipelineDefinition, ctx: &ProjectContext) -> ValidationReport {
    let mut report = ValidationReport::new();
    let name = &pipeline.name;

    if name.trim().is_empty() {
        report.push(ValidationError::BlankPipelineName {
            pipeline: name.clone(),
        });
    }

    check_vcs_references(pipeline, ctx, &mut report);
    check_steps(pipeline, &mut report);

    for (index, rule) in pipeline.artifact_rules.iter().enumerate() {
        if rule.source.trim().is_empty() {
            report.push(ValidationError::EmptyArtifactSource {
                pipeline: name.clone(),
                field: format!("artifact_rules[{}].source", index),
            });
        }
    }

    for (index, trigger) in pipeline.triggers.iter().enumerate() {
        if let Trigger::Schedule { cron } = trigger {
            if cron_fields(cron).is_none() {
                report.push(ValidationError::InvalidSchedule {
                    pipeline: name.clone(),
                    cron: cron.clone(),
                    field: format!("triggers[{}].cron", index),
                });
            }
        }
    }

    for (index, feature) in pipeline.features.iter().enumerate() {
        if let Feature::CommitStatusPublisher(csp) = feature {
            let Publisher::Swarm(swarm) = &csp.publisher;
            if !swarm.has_http_url() {
                report.push(ValidationError::InvalidPublisherUrl {
                    pipeline: name.clone(),
                    url: swarm.server_url.clone(),
                    field: format!("features[{}].publisher.server_url", index),
                });
            }
        }
    }

    if report.is_valid() {
        debug!(pipeline = %name, "pipeline is valid");
    } else {
        warn!(pipeline = %name, errors = report.len(), "pipeline failed validation");
    }

    report
}

/// Validate every pipeline of a project plus the project-wide rules
pub fn validate_project(project: &Project) -> ValidationReport {
    let mut report = ValidationReport::new();
    let ctx = &project.context;

    if let Some(root) = &ctx.settings_root {
        if ctx.vcs_root(root).is_none() {
            report.push(ValidationError::UndeclaredSettingsRoot { root: root.clone() });
        }
    }

    let mut names = HashSet::new();
    for pipeline in &project.pipelines {
        if !names.insert(pipeline.name.as_str()) {
            report.push(ValidationError::DuplicatePipelineName {
                pipeline: pipeline.name.clone(),
            });
        }
        report.extend(validate_pipeline(pipeline, ctx));
    }

    report
}

fn check_vcs_references(pipeline: &PipelineDefinition, ctx: &ProjectContext, report: &mut ValidationReport) {
    if pipeline.vcs.is_none() {
        report.push(ValidationError::MissingVcsRoot {
            pipeline: pipeline.name.clone(),
        });
    }

    for (field, reference) in pipeline.vcs_references() {
        if ctx.resolve(reference).is_none() {
            let root = match reference {
                VcsRootRef::Settings => ctx
                    .settings_root
                    .clone()
                    .unwrap_or_else(|| reference.to_string()),
                VcsRootRef::Named(id) => id.clone(),
            };
            report.push(ValidationError::UndeclaredVcsRoot {
                pipeline: pipeline.name.clone(),
                field,
                root,
            });
        }
    }
}

fn check_steps(pipeline: &PipelineDefinition, report: &mut ValidationReport) {
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (index, step) in pipeline.steps.iter().enumerate() {
        let field = format!("steps[{}].id", index);

        // Only the second occurrence is reported; later ones collapse into it
        let occurrences = seen.entry(step.id.as_str()).or_insert(0);
        *occurrences += 1;
        if *occurrences == 2 {
            report.push(ValidationError::DuplicateStepId {
                pipeline: pipeline.name.clone(),
                step_id: step.id.clone(),
                field: field.clone(),
            });
        }

        if !STEP_ID.is_match(&step.id) {
            report.push(ValidationError::InvalidStepId {
                pipeline: pipeline.name.clone(),
                step_id: step.id.clone(),
                field,
            });
        }

        if step.kind == StepKind::Shell && step.tool.is_some() {
            report.push(ValidationError::ToolOnShellStep {
                pipeline: pipeline.name.clone(),
                step_id: step.id.clone(),
                field: format!("steps[{}].tool", index),
            });
        }

        if step.params.keys().any(|k| k.trim().is_empty()) {
            report.push(ValidationError::BlankParameterName {
                pipeline: pipeline.name.clone(),
                step_id: step.id.clone(),
                field: format!("steps[{}].params", index),
            });
        }

        for param in step.missing_params() {
            report.push(ValidationError::MissingParameter {
                pipeline: pipeline.name.clone(),
                step_id: step.id.clone(),
                kind: step.kind,
                param: param.to_string(),
                field: format!("steps[{}].params.{}", index, param),
            });
        }
    }
}
