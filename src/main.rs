use anyhow::{Context, Result};
use pipedef::cli::commands::{ListCommand, RenderCommand, ValidateCommand};
use pipedef::cli::output::*;
use pipedef::cli::settings::Settings;
use pipedef::cli::{Cli, Command};
use pipedef::core::load_project_file;
use pipedef::render::RendererRegistry;
use pipedef::validation::{validate_pipeline, validate_project};
use serde_json::json;
use tokio::task::JoinSet;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG overrides the verbosity flag
    let default_level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let settings = Settings::load(cli.config.as_deref())?;

    // Execute command
    match &cli.command {
        Command::Validate(cmd) => validate_files(cmd).await?,
        Command::Render(cmd) => render_file(cmd, &settings)?,
        Command::List(cmd) => list_pipelines(cmd)?,
        Command::Targets => list_targets(&settings),
    }

    Ok(())
}

/// Validate every file as an independent blocking task
async fn validate_files(cmd: &ValidateCommand) -> Result<()> {
    let total = cmd.files.len();
    if !cmd.json {
        println!("{} Validating {} file(s)...", INFO, total);
    }

    let progress = (total > 1 && !cmd.json).then(|| create_progress_bar(total));

    let mut tasks = JoinSet::new();
    for (index, path) in cmd.files.iter().cloned().enumerate() {
        tasks.spawn_blocking(move || {
            let outcome = load_project_file(&path).map(|project| validate_project(&project));
            (index, path, outcome)
        });
    }

    let mut outcomes = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.context("Validation task failed")?;
        debug!(file = %outcome.1.display(), "validation finished");
        if let Some(progress) = &progress {
            progress.inc(1);
        }
        outcomes.push(outcome);
    }
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    outcomes.sort_by_key(|(index, _, _)| *index);

    let failed = outcomes
        .iter()
        .filter(|(_, _, outcome)| !matches!(outcome, Ok(report) if report.is_valid()))
        .count();

    if cmd.json {
        let files: Vec<_> = outcomes
            .iter()
            .map(|(_, path, outcome)| report_to_json(path, outcome))
            .collect();
        let data = json!({ "files": files, "failed": failed });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        for (_, path, outcome) in &outcomes {
            match outcome {
                Ok(report) => println!("{}", format_report(path, report)),
                Err(e) => println!("{}", format_config_error(path, e)),
            }
        }
    }

    if failed > 0 {
        if !cmd.json {
            println!(
                "\n{} {} of {} file(s) failed validation",
                CROSS,
                style(failed).red(),
                total
            );
        }
        std::process::exit(1);
    }

    if !cmd.json {
        println!("\n{} All {} file(s) are valid", CHECK, style(total).green());
    }
    Ok(())
}

fn render_file(cmd: &RenderCommand, settings: &Settings) -> Result<()> {
    let project = load_project_file(&cmd.file)
        .with_context(|| format!("Failed to load {}", cmd.file.display()))?;

    let registry = RendererRegistry::with_defaults();
    let target = cmd.target.as_deref().unwrap_or(&settings.default_target);
    let renderer = registry.get(target)?;

    let (report, rendered) = match &cmd.pipeline {
        Some(name) => {
            let pipeline = project
                .pipeline(name)
                .with_context(|| format!("No pipeline named '{}' in {}", name, cmd.file.display()))?;
            (
                validate_pipeline(pipeline, &project.context),
                renderer.render_pipeline(pipeline),
            )
        }
        None => (validate_project(&project), renderer.render_project(&project)),
    };

    if !cmd.skip_validation && !report.is_valid() {
        eprintln!("{}", format_report(&cmd.file, &report));
        error!(render_target = %target, "refusing to render an invalid definition (use --skip-validation to force)");
        std::process::exit(1);
    }

    let rendered = rendered.with_context(|| format!("Failed to render {} output", target))?;

    match &cmd.output {
        Some(output) => {
            let path = settings.resolve_output(output);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Wrote {} ({})",
                CHECK,
                style(path.display()).bold(),
                style(target).cyan()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn list_pipelines(cmd: &ListCommand) -> Result<()> {
    let project = load_project_file(&cmd.file)
        .with_context(|| format!("Failed to load {}", cmd.file.display()))?;

    if cmd.json {
        let pipelines: Vec<_> = project
            .pipelines
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "steps": p.steps.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
                    "triggers": p.triggers.iter().map(|t| t.kind()).collect::<Vec<_>>(),
                    "features": p.features.iter().map(|f| f.kind()).collect::<Vec<_>>(),
                    "vcs_root": p.vcs.as_ref().map(|b| b.root.to_string()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json!({ "pipelines": pipelines }))?);
        return Ok(());
    }

    if project.pipelines.is_empty() {
        println!("{} No pipelines defined in {}", INFO, cmd.file.display());
        return Ok(());
    }

    println!("{} Pipelines in {}:", INFO, style(cmd.file.display()).bold());
    for pipeline in &project.pipelines {
        println!("  {}", format_pipeline_summary(pipeline));
    }

    Ok(())
}

fn list_targets(settings: &Settings) {
    println!("{} Render targets:", INFO);
    for target in RendererRegistry::with_defaults().targets() {
        if target == settings.default_target {
            println!("  {} {}", style(target).bold(), style("(default)").dim());
        } else {
            println!("  {}", target);
        }
    }
}
