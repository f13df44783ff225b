//! Pipeline configuration documents and the loader
//!
//! Configuration text is first deserialized into plain documents (all
//! required fields optional at this level) and then converted into the
//! domain model. The conversion tracks the field path so errors can name
//! the exact field that was missing or malformed.

use crate::core::{
    artifact::ArtifactRule,
    error::ConfigError,
    feature::{CommitStatusPublisher, Feature, Publisher, SwarmPublisher},
    pipeline::PipelineDefinition,
    project::{Project, ProjectContext},
    step::{Step, StepKind},
    trigger::Trigger,
    vcs::{CheckoutMode, VcsBinding, VcsKind, VcsRoot, VcsRootRef},
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Text format a configuration source is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        extension.parse().map_err(|_| {
            ConfigError::UnsupportedFormat(format!(
                "cannot infer format of {} (expected .yaml, .yml or .json)",
                path.display()
            ))
        })
    }
}

impl FromStr for SourceFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yaml" | "yml" => Ok(SourceFormat::Yaml),
            "json" => Ok(SourceFormat::Json),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Yaml => f.write_str("YAML"),
            SourceFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Load a project (context plus pipelines) from configuration text
pub fn load_project(text: &str, format: SourceFormat) -> Result<Project, ConfigError> {
    let document: ProjectDocument = parse_document(text, format)?;
    let project = document.into_project()?;
    debug!(
        pipelines = project.pipelines.len(),
        vcs_roots = project.context.vcs_roots.len(),
        "loaded project"
    );
    Ok(project)
}

/// Load a single pipeline definition from configuration text
pub fn load_pipeline(text: &str, format: SourceFormat) -> Result<PipelineDefinition, ConfigError> {
    let document: PipelineDocument = parse_document(text, format)?;
    let pipeline = document.into_pipeline(&FieldPath::root())?;
    debug!(pipeline = %pipeline.name, steps = pipeline.steps.len(), "loaded pipeline");
    Ok(pipeline)
}

/// Load a project from a file, picking the format from its extension
pub fn load_project_file<P: AsRef<Path>>(path: P) -> Result<Project, ConfigError> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), %format, "reading project configuration");
    load_project(&content, format)
}

fn parse_document<T: DeserializeOwned>(text: &str, format: SourceFormat) -> Result<T, ConfigError> {
    match format {
        SourceFormat::Yaml => serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            format,
            message: e.to_string(),
        }),
        SourceFormat::Json => serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            format,
            message: e.to_string(),
        }),
    }
}

/// Top-level project document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDocument {
    /// Settings DSL version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Id of the VCS root holding the settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_root: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vcs_roots: Vec<VcsRootDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipelines: Vec<PipelineDocument>,
}

/// VCS root as declared in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VcsRootDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// `git` or `perforce`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Pipeline as defined in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs: Option<VcsBindingDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifact_rules: Vec<ArtifactRuleDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<TriggerDocument>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<FeatureDocument>,
}

/// VCS binding of a pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VcsBindingDocument {
    /// Root id, or `$settings` for the settings root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// `server-side` or `agent-side` (default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_mode: Option<String>,
}

/// Step as defined in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `shell` or `custom-tool`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Runner name for custom-tool steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
}

/// Parameter value as written in configuration
///
/// Strings, booleans and integers are kept as their text. Anything else is
/// captured so the conversion can reject it with a field path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    /// Fractional or out-of-range number; its original spelling is lost
    Number(f64),
    #[serde(skip_serializing)]
    Other(IgnoredAny),
}

/// Trigger as defined in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerDocument {
    /// `vcs`, `schedule` or `manual`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch_filter: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
}

/// Build feature as defined in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureDocument {
    /// `perfmon` or `commit-status-publisher`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcs_root: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<PublisherDocument>,
}

/// Commit status publisher target
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublisherDocument {
    /// Only `swarm` for now
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default)]
    pub comment_on_events: bool,
}

/// Artifact rule, either compact (`-:src => dest`) or spelled out
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactRuleDocument {
    Compact(String),
    Detailed(ArtifactRuleFields),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactRuleFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    #[serde(default)]
    pub exclude: bool,

    /// Keys other than the above; collected so the error can name them
    #[serde(flatten, skip_serializing)]
    pub unknown: BTreeMap<String, IgnoredAny>,
}

/// Dotted path to a field in a document, e.g. `pipelines[0].steps[1].type`
#[derive(Debug, Clone)]
struct FieldPath(String);

impl FieldPath {
    fn root() -> Self {
        FieldPath(String::new())
    }

    fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            FieldPath(name.to_string())
        } else {
            FieldPath(format!("{}.{}", self.0, name))
        }
    }

    fn index(&self, index: usize) -> Self {
        FieldPath(format!("{}[{}]", self.0, index))
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField {
            field: self.0.clone(),
        }
    }

    fn invalid(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            field: self.0.clone(),
            message: message.into(),
        }
    }

    fn unknown(&self, kind: &'static str, value: &str, expected: &[&str]) -> ConfigError {
        ConfigError::UnknownKind {
            field: self.0.clone(),
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }

    fn require<T>(&self, value: Option<T>) -> Result<T, ConfigError> {
        value.ok_or_else(|| self.missing())
    }

    fn parse_kind<T: FromStr>(
        &self,
        value: Option<String>,
        kind: &'static str,
        expected: &[&str],
    ) -> Result<T, ConfigError> {
        let value = self.require(value)?;
        value.parse().map_err(|_| self.unknown(kind, &value, expected))
    }
}

impl ProjectDocument {
    /// Convert into the domain model
    pub fn into_project(self) -> Result<Project, ConfigError> {
        let root = FieldPath::root();

        let vcs_roots = self
            .vcs_roots
            .into_iter()
            .enumerate()
            .map(|(i, doc)| doc.into_vcs_root(&root.field("vcs_roots").index(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let pipelines = self
            .pipelines
            .into_iter()
            .enumerate()
            .map(|(i, doc)| doc.into_pipeline(&root.field("pipelines").index(i)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Project {
            context: ProjectContext {
                version: self.version,
                settings_root: self.settings_root,
                vcs_roots,
            },
            pipelines,
        })
    }
}

impl VcsRootDocument {
    fn into_vcs_root(self, path: &FieldPath) -> Result<VcsRoot, ConfigError> {
        Ok(VcsRoot {
            id: path.field("id").require(self.id)?,
            kind: path
                .field("type")
                .parse_kind(self.kind, "VCS type", VcsKind::NAMES)?,
            url: path.field("url").require(self.url)?,
            branch: self.branch,
        })
    }
}

impl PipelineDocument {
    /// Convert into the domain model; `path` prefixes field names in errors
    fn into_pipeline(self, path: &FieldPath) -> Result<PipelineDefinition, ConfigError> {
        let name = path.field("name").require(self.name)?;
        if name.trim().is_empty() {
            return Err(path.field("name").invalid("pipeline name must not be empty"));
        }

        let vcs = self
            .vcs
            .map(|doc| doc.into_binding(&path.field("vcs")))
            .transpose()?;

        let steps = self
            .steps
            .into_iter()
            .enumerate()
            .map(|(i, doc)| doc.into_step(&path.field("steps").index(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let triggers = self
            .triggers
            .into_iter()
            .enumerate()
            .map(|(i, doc)| doc.into_trigger(&path.field("triggers").index(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let features = self
            .features
            .into_iter()
            .enumerate()
            .map(|(i, doc)| doc.into_feature(&path.field("features").index(i)))
            .collect::<Result<Vec<_>, _>>()?;

        let artifact_rules = self
            .artifact_rules
            .into_iter()
            .enumerate()
            .map(|(i, doc)| doc.into_rule(&path.field("artifact_rules").index(i)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PipelineDefinition {
            name,
            description: self.description,
            vcs,
            steps,
            triggers,
            features,
            artifact_rules,
        })
    }
}

impl VcsBindingDocument {
    fn into_binding(self, path: &FieldPath) -> Result<VcsBinding, ConfigError> {
        let root = path.field("root").require(self.root)?;
        let checkout_mode = match self.checkout_mode {
            Some(mode) => path.field("checkout_mode").parse_kind(
                Some(mode),
                "checkout mode",
                CheckoutMode::NAMES,
            )?,
            None => CheckoutMode::default(),
        };

        Ok(VcsBinding {
            root: VcsRootRef::parse(&root),
            checkout_mode,
        })
    }
}

impl StepDocument {
    fn into_step(self, path: &FieldPath) -> Result<Step, ConfigError> {
        let id = path.field("id").require(self.id)?;
        let kind: StepKind = path
            .field("type")
            .parse_kind(self.kind, "step type", StepKind::NAMES)?;

        if kind == StepKind::Shell && self.tool.is_some() {
            return Err(path
                .field("tool")
                .invalid("only custom-tool steps name a tool runner"));
        }

        if self.params.keys().any(|k| k.trim().is_empty()) {
            return Err(path.field("params").invalid("parameter names must not be empty"));
        }

        let params = self
            .params
            .into_iter()
            .map(|(name, value)| {
                let text = param_text(value, &path.field("params").field(&name))?;
                Ok((name, text))
            })
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        Ok(Step {
            id,
            name: self.name,
            kind,
            tool: self.tool,
            params,
        })
    }
}

fn param_text(value: ParamValue, path: &FieldPath) -> Result<String, ConfigError> {
    match value {
        ParamValue::Text(text) => Ok(text),
        ParamValue::Flag(flag) => Ok(flag.to_string()),
        ParamValue::Integer(number) => Ok(number.to_string()),
        ParamValue::Number(number) => Err(path.invalid(format!(
            "number {} cannot be kept exactly; quote it as a string",
            number
        ))),
        ParamValue::Other(_) => Err(path.invalid("expected a string, boolean or integer")),
    }
}

impl TriggerDocument {
    fn into_trigger(self, path: &FieldPath) -> Result<Trigger, ConfigError> {
        let kind = path.field("type").require(self.kind)?;
        if !Trigger::NAMES.contains(&kind.as_str()) {
            return Err(path.field("type").unknown("trigger type", &kind, Trigger::NAMES));
        }

        if kind != "schedule" && self.cron.is_some() {
            return Err(path.field("cron").invalid("only schedule triggers take a cron expression"));
        }
        if kind != "vcs" && !self.branch_filter.is_empty() {
            return Err(path.field("branch_filter").invalid("only vcs triggers take a branch filter"));
        }

        match kind.as_str() {
            "vcs" => Ok(Trigger::VcsChange {
                branch_filter: self.branch_filter,
            }),
            "schedule" => Ok(Trigger::Schedule {
                cron: path.field("cron").require(self.cron)?,
            }),
            "manual" => Ok(Trigger::Manual),
            other => Err(path.field("type").unknown("trigger type", other, Trigger::NAMES)),
        }
    }
}

impl FeatureDocument {
    fn into_feature(self, path: &FieldPath) -> Result<Feature, ConfigError> {
        let kind = path.field("type").require(self.kind)?;

        match kind.as_str() {
            "perfmon" => Ok(Feature::Perfmon),
            "commit-status-publisher" => {
                let vcs_root = path.field("vcs_root").require(self.vcs_root)?;
                let publisher = path
                    .field("publisher")
                    .require(self.publisher)?
                    .into_publisher(&path.field("publisher"))?;

                Ok(Feature::CommitStatusPublisher(CommitStatusPublisher {
                    vcs_root: VcsRootRef::parse(&vcs_root),
                    publisher,
                }))
            }
            other => Err(path.field("type").unknown("feature type", other, Feature::NAMES)),
        }
    }
}

impl PublisherDocument {
    fn into_publisher(self, path: &FieldPath) -> Result<Publisher, ConfigError> {
        let kind = path.field("type").require(self.kind)?;

        match kind.as_str() {
            "swarm" => Ok(Publisher::Swarm(SwarmPublisher {
                server_url: path.field("server_url").require(self.server_url)?,
                username: path.field("username").require(self.username)?,
                token: path.field("token").require(self.token)?,
                comment_on_events: self.comment_on_events,
            })),
            other => Err(path.field("type").unknown("publisher type", other, Publisher::NAMES)),
        }
    }
}

impl ArtifactRuleDocument {
    fn into_rule(self, path: &FieldPath) -> Result<ArtifactRule, ConfigError> {
        match self {
            ArtifactRuleDocument::Compact(rule) => ArtifactRule::parse(&rule).map_err(|e| path.invalid(e)),
            ArtifactRuleDocument::Detailed(fields) => {
                if let Some(key) = fields.unknown.keys().next() {
                    return Err(path
                        .field(key)
                        .invalid("unknown artifact rule field (expected source, destination or exclude)"));
                }
                Ok(ArtifactRule {
                source: path.field("source").require(fields.source)?,
                    destination: fields.destination,
                    exclude: fields.exclude,
                })
            }
        }
    }
}

impl From<&Project> for ProjectDocument {
    fn from(project: &Project) -> Self {
        ProjectDocument {
            version: project.context.version.clone(),
            settings_root: project.context.settings_root.clone(),
            vcs_roots: project.context.vcs_roots.iter().map(VcsRootDocument::from).collect(),
            pipelines: project.pipelines.iter().map(PipelineDocument::from).collect(),
        }
    }
}

impl From<&VcsRoot> for VcsRootDocument {
    fn from(root: &VcsRoot) -> Self {
        VcsRootDocument {
            id: Some(root.id.clone()),
            kind: Some(root.kind.as_str().to_string()),
            url: Some(root.url.clone()),
            branch: root.branch.clone(),
        }
    }
}

impl From<&PipelineDefinition> for PipelineDocument {
    fn from(pipeline: &PipelineDefinition) -> Self {
        PipelineDocument {
            name: Some(pipeline.name.clone()),
            description: pipeline.description.clone(),
            vcs: pipeline.vcs.as_ref().map(|binding| VcsBindingDocument {
                root: Some(binding.root.to_string()),
                checkout_mode: Some(binding.checkout_mode.as_str().to_string()),
            }),
            artifact_rules: pipeline.artifact_rules.iter().map(ArtifactRuleDocument::from).collect(),
            steps: pipeline.steps.iter().map(StepDocument::from).collect(),
            triggers: pipeline.triggers.iter().map(TriggerDocument::from).collect(),
            features: pipeline.features.iter().map(FeatureDocument::from).collect(),
        }
    }
}

impl From<&Step> for StepDocument {
    fn from(step: &Step) -> Self {
        StepDocument {
            id: Some(step.id.clone()),
            name: step.name.clone(),
            kind: Some(step.kind.as_str().to_string()),
            tool: step.tool.clone(),
            params: step
                .params
                .iter()
                .map(|(k, v)| (k.clone(), ParamValue::Text(v.clone())))
                .collect(),
        }
    }
}

impl From<&Trigger> for TriggerDocument {
    fn from(trigger: &Trigger) -> Self {
        let mut document = TriggerDocument {
            kind: Some(trigger.kind().to_string()),
            ..Default::default()
        };
        match trigger {
            Trigger::VcsChange { branch_filter } => document.branch_filter = branch_filter.clone(),
            Trigger::Schedule { cron } => document.cron = Some(cron.clone()),
            Trigger::Manual => {}
        }
        document
    }
}

impl From<&Feature> for FeatureDocument {
    fn from(feature: &Feature) -> Self {
        match feature {
            Feature::Perfmon => FeatureDocument {
                kind: Some(feature.kind().to_string()),
                ..Default::default()
            },
            Feature::CommitStatusPublisher(csp) => FeatureDocument {
                kind: Some(feature.kind().to_string()),
                vcs_root: Some(csp.vcs_root.to_string()),
                publisher: Some(match &csp.publisher {
                    Publisher::Swarm(swarm) => PublisherDocument {
                        kind: Some(csp.publisher.kind().to_string()),
                        server_url: Some(swarm.server_url.clone()),
                        username: Some(swarm.username.clone()),
                        token: Some(swarm.token.clone()),
                        comment_on_events: swarm.comment_on_events,
                    },
                }),
            },
        }
    }
}

impl From<&ArtifactRule> for ArtifactRuleDocument {
    fn from(rule: &ArtifactRule) -> Self {
        // The compact form is only used when it reads back to the same rule
        let compact = rule.to_string();
        match ArtifactRule::parse(&compact) {
            Ok(parsed) if parsed == *rule => ArtifactRuleDocument::Compact(compact),
            _ => ArtifactRuleDocument::Detailed(ArtifactRuleFields {
                source: Some(rule.source.clone()),
                destination: rule.destination.clone(),
                exclude: rule.exclude,
                unknown: BTreeMap::new(),
            }),
        }
    }
}
