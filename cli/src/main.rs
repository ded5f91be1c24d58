//! CLI entrypoint for chorus
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chorus_application::{AnalyticsSink, NoAnalytics, OutputSanitizer, PassthroughSanitizer};
use chorus_application::{Orchestrator, ScorecardStore};
use chorus_domain::{OrchestrateRequest, OutputFormat, Severity};
use chorus_infrastructure::{
    ConfigLoader, FileConfig, InMemoryScorecardStore, JsonlAnalyticsSink, RegexSanitizer,
    build_registry,
};
use chorus_presentation::{Cli, ConsoleFormatter, OutputFormatter, ProgressReporter};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    info!("Starting chorus");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = load_config(&cli)?;
    colored::control::set_override(config.output.color);

    // === Dependency Injection ===
    let store = Arc::new(InMemoryScorecardStore::with_capacity(
        config.scorecard.max_interactions,
    ));
    let snapshot_path = config
        .scorecard
        .snapshot_path
        .clone()
        .or_else(ConfigLoader::default_snapshot_path);
    if let Some(path) = &snapshot_path
        && let Err(e) = store.load_snapshot(path)
    {
        warn!("Ignoring scorecard snapshot {}: {}", path.display(), e);
    }

    if cli.show_scorecards {
        print!("{}", ConsoleFormatter::format_scorecards(&store.get_scorecards()));
        return Ok(());
    }

    let request = read_request(&cli)?;
    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();

    let registry = Arc::new(build_registry(&config));
    let orchestrator = Orchestrator::new(
        config.orchestrator_config(),
        registry,
        Arc::clone(&store) as Arc<dyn ScorecardStore>,
    )
    .with_analytics(analytics_sink(&config))
    .with_sanitizer(sanitizer(&config)?);

    let result = if cli.quiet {
        orchestrator.execute(&request).await?
    } else {
        let progress = ProgressReporter::new();
        orchestrator
            .execute_with_progress(&request, &progress)
            .await?
    };

    if let Some(path) = &snapshot_path
        && let Err(e) = store.save_snapshot(path)
    {
        warn!("Could not save scorecard snapshot {}: {}", path.display(), e);
    }

    print!("{}", ConsoleFormatter.render(&result, format));

    Ok(())
}

/// Install the stderr subscriber and, with `--log-dir`, a daily rotated file layer
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "chorus.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    for issue in config.validate() {
        match issue.severity {
            Severity::Error => error!("config: {}", issue.message),
            Severity::Warning => warn!("config: {}", issue.message),
        }
    }
    Ok(config)
}

/// Build the request from `--request` (file or stdin) and the flags on top
fn read_request(cli: &Cli) -> Result<OrchestrateRequest> {
    let body = match cli.request.as_deref() {
        Some("-") => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read request from stdin")?;
            Some(raw)
        }
        Some(path) => Some(
            std::fs::read_to_string(PathBuf::from(path))
                .with_context(|| format!("Failed to read request file {}", path))?,
        ),
        None => None,
    };

    let mut request = match body {
        Some(raw) => serde_json::from_str::<OrchestrateRequest>(&raw)
            .context("Request body is not a valid request object")?,
        None => match &cli.query {
            Some(query) => OrchestrateRequest::new(query.clone(), Default::default()),
            None => bail!("A query is required (positional argument or --request)."),
        },
    };

    if let Some(query) = &cli.query {
        request.query = query.clone();
    }
    request.options = cli.apply_options(request.options);
    Ok(request)
}

fn analytics_sink(config: &FileConfig) -> Arc<dyn AnalyticsSink> {
    match config
        .analytics
        .jsonl_path
        .as_deref()
        .and_then(JsonlAnalyticsSink::open)
    {
        Some(sink) => {
            info!("Analytics: {}", sink.path().display());
            Arc::new(sink)
        }
        None => Arc::new(NoAnalytics),
    }
}

fn sanitizer(config: &FileConfig) -> Result<Arc<dyn OutputSanitizer>> {
    if !config.sanitizer.enabled {
        return Ok(Arc::new(PassthroughSanitizer));
    }
    let sanitizer = RegexSanitizer::new(config.sanitizer.redact_pii)
        .context("Failed to build output sanitizer")?;
    Ok(Arc::new(sanitizer))
}
