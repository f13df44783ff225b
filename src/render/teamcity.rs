//! TeamCity Kotlin DSL renderer
//!
//! Produces a `settings.kts` script: one `BuildType` object per pipeline,
//! one VCS root object per declared root other than the settings root, and
//! a `project { }` block registering them.

use crate::core::{
    cron_fields, ArtifactRule, CheckoutMode, Feature, PipelineDefinition, Project, ProjectContext, Publisher,
    Step, StepKind, Trigger, VcsKind, VcsRoot, VcsRootRef,
};
use crate::render::{RenderError, Renderer};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

const TARGET: &str = "teamcity-kotlin";

/// DSL version written when the project does not name one
pub const DEFAULT_DSL_VERSION: &str = "2024.03";

/// DSL names a generated object must not shadow
const RESERVED_IDENTIFIERS: &[&str] = &[
    "AbsoluteId",
    "BuildFeatures",
    "BuildSteps",
    "BuildType",
    "CheckoutMode",
    "DslContext",
    "GitVcsRoot",
    "PerforceVcsRoot",
    "Project",
    "RelativeId",
    "Template",
    "Triggers",
    "VcsRoot",
];

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+").expect("word pattern is valid"));

/// Renders TeamCity Kotlin DSL settings
#[derive(Debug, Clone, Copy, Default)]
pub struct KotlinDslRenderer;

impl Renderer for KotlinDslRenderer {
    fn target(&self) -> &'static str {
        TARGET
    }

    fn file_extension(&self) -> &'static str {
        "kts"
    }

    fn render_pipeline(&self, pipeline: &PipelineDefinition) -> Result<String, RenderError> {
        let mut w = KotlinWriter::default();
        write_imports(&mut w, std::slice::from_ref(pipeline), &[]);
        w.blank();
        write_build_type(&mut w, pipeline, None)?;
        Ok(w.finish())
    }

    fn render_project(&self, project: &Project) -> Result<String, RenderError> {
        let ctx = &project.context;
        let roots: Vec<&VcsRoot> = ctx
            .vcs_roots
            .iter()
            .filter(|r| !ctx.is_settings_root(&r.id))
            .collect();

        check_identifiers(project, &roots)?;

        let mut w = KotlinWriter::default();
        write_imports(&mut w, &project.pipelines, &roots);
        w.blank();
        w.line(&format!(
            "version = {}",
            quote(ctx.version.as_deref().unwrap_or(DEFAULT_DSL_VERSION))
        ));
        w.blank();

        w.open("project");
        if !roots.is_empty() {
            w.blank();
            for root in &roots {
                w.line(&format!("vcsRoot({})", kotlin_identifier(&root.id)));
            }
        }
        if !project.pipelines.is_empty() {
            w.blank();
            for pipeline in &project.pipelines {
                w.line(&format!("buildType({})", kotlin_identifier(&pipeline.name)));
            }
        }
        w.close();

        for pipeline in &project.pipelines {
            w.blank();
            write_build_type(&mut w, pipeline, Some(ctx))?;
        }

        for root in &roots {
            w.blank();
            write_vcs_root(&mut w, root);
        }

        Ok(w.finish())
    }
}

/// PascalCase Kotlin object name for a pipeline name or root id
///
/// Names that would shadow a DSL type get a trailing `_`.
pub fn kotlin_identifier(name: &str) -> String {
    let mut ident: String = WORD
        .find_iter(name)
        .map(|word| {
            let mut chars = word.as_str().chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if ident.is_empty() {
        ident.push_str("Unnamed");
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if RESERVED_IDENTIFIERS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

fn check_identifiers(project: &Project, roots: &[&VcsRoot]) -> Result<(), RenderError> {
    let mut owners: HashMap<String, String> = HashMap::new();
    let pipelines = project
        .pipelines
        .iter()
        .map(|p| (format!("pipeline '{}'", p.name), kotlin_identifier(&p.name)));
    let roots = roots
        .iter()
        .map(|r| (format!("VCS root '{}'", r.id), kotlin_identifier(&r.id)));

    for (owner, ident) in pipelines.chain(roots) {
        if let Some(previous) = owners.insert(ident.clone(), owner.clone()) {
            return Err(RenderError::Unrepresentable {
                target: TARGET,
                message: format!("{} and {} both map to Kotlin object '{}'", previous, owner, ident),
            });
        }
    }
    Ok(())
}

fn write_imports(w: &mut KotlinWriter, pipelines: &[PipelineDefinition], roots: &[&VcsRoot]) {
    let mut imports = BTreeSet::new();
    imports.insert("jetbrains.buildServer.configs.kotlin.*");

    for pipeline in pipelines {
        if pipeline.steps.iter().any(|s| s.kind == StepKind::Shell) {
            imports.insert("jetbrains.buildServer.configs.kotlin.buildSteps.script");
        }
        for trigger in &pipeline.triggers {
            match trigger {
                Trigger::VcsChange { .. } => {
                    imports.insert("jetbrains.buildServer.configs.kotlin.triggers.vcs");
                }
                Trigger::Schedule { .. } => {
                    imports.insert("jetbrains.buildServer.configs.kotlin.triggers.schedule");
                }
                Trigger::Manual => {}
            }
        }
        for feature in &pipeline.features {
            match feature {
                Feature::Perfmon => {
                    imports.insert("jetbrains.buildServer.configs.kotlin.buildFeatures.perfmon");
                }
                Feature::CommitStatusPublisher(_) => {
                    imports.insert("jetbrains.buildServer.configs.kotlin.buildFeatures.commitStatusPublisher");
                }
            }
        }
    }

    for root in roots {
        imports.insert(match root.kind {
            VcsKind::Git => "jetbrains.buildServer.configs.kotlin.vcs.GitVcsRoot",
            VcsKind::Perforce => "jetbrains.buildServer.configs.kotlin.vcs.PerforceVcsRoot",
        });
    }

    for import in imports {
        w.line(&format!("import {}", import));
    }
}

/// Kotlin expression for a root; `ctx` is known when rendering a whole project
fn root_expression(reference: &VcsRootRef, ctx: Option<&ProjectContext>) -> String {
    match reference {
        VcsRootRef::Settings => "DslContext.settingsRoot".to_string(),
        VcsRootRef::Named(id) if ctx.is_some_and(|c| c.is_settings_root(id)) => {
            "DslContext.settingsRoot".to_string()
        }
        VcsRootRef::Named(id) => kotlin_identifier(id),
    }
}

fn write_build_type(
    w: &mut KotlinWriter,
    pipeline: &PipelineDefinition,
    ctx: Option<&ProjectContext>,
) -> Result<(), RenderError> {
    w.open(&format!("object {} : BuildType(", kotlin_identifier(&pipeline.name)));
    w.line(&format!("name = {}", quote(&pipeline.name)));
    if let Some(description) = &pipeline.description {
        w.line(&format!("description = {}", quote(description)));
    }

    if !pipeline.artifact_rules.is_empty() {
        w.blank();
        let lines: Vec<String> = pipeline.artifact_rules.iter().map(ArtifactRule::to_string).collect();
        w.raw_block("artifactRules", &lines);
    }

    if let Some(binding) = &pipeline.vcs {
        w.blank();
        w.open("vcs");
        w.line(&format!("root({})", root_expression(&binding.root, ctx)));
        w.blank();
        w.line(match binding.checkout_mode {
            CheckoutMode::ServerSide => "checkoutMode = CheckoutMode.ON_SERVER",
            CheckoutMode::AgentSide => "checkoutMode = CheckoutMode.ON_AGENT",
        });
        w.close();
    }

    if !pipeline.steps.is_empty() {
        w.blank();
        w.open("steps");
        for step in &pipeline.steps {
            write_step(w, step);
        }
        w.close();
    }

    let triggers: Vec<&Trigger> = pipeline
        .triggers
        .iter()
        .filter(|t| !matches!(t, Trigger::Manual))
        .collect();
    if !triggers.is_empty() {
        w.blank();
        w.open("triggers");
        for trigger in triggers {
            write_trigger(w, trigger)?;
        }
        w.close();
    }

    if !pipeline.features.is_empty() {
        w.blank();
        w.open("features");
        for feature in &pipeline.features {
            write_feature(w, feature, ctx);
        }
        w.close();
    }

    w.close_with("})");
    Ok(())
}

fn write_step(w: &mut KotlinWriter, step: &Step) {
    match step.kind {
        StepKind::CustomTool => {
            w.open("step");
            if let Some(name) = &step.name {
                w.line(&format!("name = {}", quote(name)));
            }
            w.line(&format!("id = {}", quote(&step.id)));
            w.line(&format!("type = {}", quote(step.runner())));
            for (key, value) in &step.params {
                w.line(&format!("param({}, {})", quote(key), quote(value)));
            }
            w.close();
        }
        StepKind::Shell => {
            w.open("script");
            if let Some(name) = &step.name {
                w.line(&format!("name = {}", quote(name)));
            }
            w.line(&format!("id = {}", quote(&step.id)));
            let script: Vec<String> = step
                .param("script")
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect();
            w.raw_block("scriptContent", &script);
            for (key, value) in step.params.iter().filter(|(k, _)| k.as_str() != "script") {
                w.line(&format!("param({}, {})", quote(key), quote(value)));
            }
            w.close();
        }
    }
}

fn write_trigger(w: &mut KotlinWriter, trigger: &Trigger) -> Result<(), RenderError> {
    match trigger {
        Trigger::VcsChange { branch_filter } => {
            w.open("vcs");
            if !branch_filter.is_empty() {
                w.raw_block("branchFilter", branch_filter);
            }
            w.close();
        }
        Trigger::Schedule { cron } => {
            let fields = quartz_fields(cron)?;
            let names = ["seconds", "minutes", "hours", "dayOfMonth", "month", "dayOfWeek", "year"];

            w.open("schedule");
            w.open("schedulingPolicy = cron");
            for (name, value) in names.iter().zip(&fields) {
                w.line(&format!("{} = {}", name, quote(value)));
            }
            w.close();
            w.close();
        }
        Trigger::Manual => {}
    }
    Ok(())
}

/// Cron fields in TeamCity's Quartz order (seconds first)
///
/// Five-field Unix expressions gain a zero seconds field, their day-of-week
/// numbers (Sunday is 0 or 7) become day names, and the unrestricted day
/// field becomes `?`. Six and seven field expressions are already Quartz.
fn quartz_fields(cron: &str) -> Result<Vec<String>, RenderError> {
    let unrepresentable = |message: String| RenderError::Unrepresentable {
        target: TARGET,
        message,
    };
    let fields = cron_fields(cron).ok_or_else(|| unrepresentable(format!("'{}' is not a cron expression", cron)))?;
    if fields.len() != 5 {
        return Ok(fields.into_iter().map(str::to_string).collect());
    }

    let mut day_of_month = fields[2].to_string();
    let mut day_of_week = unix_day_names(fields[4])
        .ok_or_else(|| unrepresentable(format!("'{}' has an invalid day of week '{}'", cron, fields[4])))?;

    if day_of_week == "*" {
        day_of_week = "?".to_string();
    } else if day_of_month == "*" {
        day_of_month = "?".to_string();
    } else {
        return Err(unrepresentable(format!(
            "'{}' restricts both day of month and day of week",
            cron
        )));
    }

    Ok(vec![
        "0".to_string(),
        fields[0].to_string(),
        fields[1].to_string(),
        day_of_month,
        fields[3].to_string(),
        day_of_week,
    ])
}

/// Replace Unix day-of-week numbers with names, leaving step values alone
fn unix_day_names(field: &str) -> Option<String> {
    const DAYS: [&str; 8] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

    let items = field.split(',').map(|item| {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (item, None),
        };
        let range = range
            .split('-')
            .map(|day| match day.parse::<usize>() {
                Ok(n) => DAYS.get(n).map(|name| name.to_string()),
                Err(_) => Some(day.to_ascii_uppercase()),
            })
            .collect::<Option<Vec<_>>>()?
            .join("-");
        Some(match step {
            Some(step) => format!("{}/{}", range, step),
            None => range,
        })
    });

    Some(items.collect::<Option<Vec<_>>>()?.join(","))
}

fn write_feature(w: &mut KotlinWriter, feature: &Feature, ctx: Option<&ProjectContext>) {
    match feature {
        Feature::Perfmon => {
            w.open("perfmon");
            w.close();
        }
        Feature::CommitStatusPublisher(csp) => {
            w.open("commitStatusPublisher");
            // String template, resolved by the DSL to the root's external id
            w.line(&format!(
                "vcsRootExtId = \"${{{}.id}}\"",
                root_expression(&csp.vcs_root, ctx)
            ));
            match &csp.publisher {
                Publisher::Swarm(swarm) => {
                    w.open("publisher = swarm");
                    w.line(&format!("serverUrl = {}", quote(&swarm.server_url)));
                    w.line(&format!("username = {}", quote(&swarm.username)));
                    w.line(&format!("token = {}", quote(&swarm.token)));
                    w.line(&format!("commentOnEvents = {}", swarm.comment_on_events));
                    w.close();
                }
            }
            w.close();
        }
    }
}

fn write_vcs_root(w: &mut KotlinWriter, root: &VcsRoot) {
    let ident = kotlin_identifier(&root.id);
    match root.kind {
        VcsKind::Git => {
            w.open(&format!("object {} : GitVcsRoot(", ident));
            w.line(&format!("name = {}", quote(&root.id)));
            w.line(&format!("url = {}", quote(&root.url)));
            if let Some(branch) = &root.branch {
                w.line(&format!("branch = {}", quote(branch)));
            }
        }
        VcsKind::Perforce => {
            w.open(&format!("object {} : PerforceVcsRoot(", ident));
            w.line(&format!("name = {}", quote(&root.id)));
            w.line(&format!("port = {}", quote(&root.url)));
            if let Some(stream) = &root.branch {
                w.open("mode = stream");
                w.line(&format!("streamName = {}", quote(stream)));
                w.close();
            }
        }
    }
    w.close_with("})");
}

/// Kotlin string literal with `\`, `"` and `$` escaped
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Indentation-aware line writer
#[derive(Debug, Default)]
struct KotlinWriter {
    out: String,
    depth: usize,
}

impl KotlinWriter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Start a block; a header ending in `(` opens a lambda argument
    fn open(&mut self, header: &str) {
        if header.ends_with('(') {
            self.line(&format!("{}{{", header));
        } else {
            self.line(&format!("{} {{", header));
        }
        self.depth += 1;
    }

    fn close(&mut self) {
        self.close_with("}");
    }

    fn close_with(&mut self, tail: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(tail);
    }

    /// `name = """ ... """.trimIndent()` with raw-string escapes
    fn raw_block(&mut self, name: &str, lines: &[String]) {
        self.line(&format!("{} = \"\"\"", name));
        self.depth += 1;
        for line in lines {
            let escaped = line.replace('$', "${'$'}").replace("\"\"\"", "\"\"${'\"'}");
            if escaped.is_empty() {
                self.blank();
            } else {
                self.line(&escaped);
            }
        }
        self.depth -= 1;
        self.line("\"\"\".trimIndent()");
    }

    fn finish(self) -> String {
        self.out
    }
}
