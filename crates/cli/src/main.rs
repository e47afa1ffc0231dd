mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use atrust_core::config::load_dotenv;
use atrust_core::{EngineConfig, Modality};
use atrust_detect::{Capabilities, ScanInput};
use atrust_engine::{DetectionEngine, ScanRequest};
use atrust_rules::validation::validate_rule_set;
use atrust_rules::{load_rule_set, CompiledRuleSet};

use crate::cli::{CliArgs, Command, RulesCommand, ScanArgs};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = CliArgs::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env();
    config.validate().context("invalid configuration")?;
    config.log_summary();

    match args.command {
        Command::Scan(scan) => run_scan(&config, scan).await,
        Command::Capabilities => run_capabilities(&config),
        Command::Rules {
            command: RulesCommand::Check { path },
        } => run_rules_check(&path),
    }
}

async fn run_scan(config: &EngineConfig, args: ScanArgs) -> Result<()> {
    let mut request = ScanRequest::new();
    for (modality, path) in [
        (Modality::Video, args.video),
        (Modality::Image, args.image),
        (Modality::Audio, args.audio),
        (Modality::Text, args.text_file),
    ] {
        if let Some(path) = path {
            request = request.with_file(modality, path);
        }
    }
    if let Some(text) = args.text {
        request = request.with(Modality::Text, ScanInput::Text(text));
    }
    if request.is_empty() {
        bail!("nothing to scan: pass at least one of --video, --image, --audio, --text, --text-file");
    }

    let engine = DetectionEngine::from_config(config).context("failed to build detection engine")?;
    let outcome = engine.scan_all(request).await.context("scan failed")?;
    info!(
        scan_id = %outcome.scan_id,
        trust_score = outcome.report.trust_score,
        risk = %outcome.report.risk_type,
        "scan finished"
    );
    print_json(&outcome, args.pretty)
}

fn run_capabilities(config: &EngineConfig) -> Result<()> {
    let capabilities = Capabilities::from_config(&config.detector);
    print_json(&capabilities.status(), true)
}

#[derive(Serialize)]
struct RulesCheckReport {
    id: String,
    rules: usize,
    enabled: bool,
    warnings: Vec<atrust_rules::validation::ValidationWarning>,
}

fn run_rules_check(path: &std::path::Path) -> Result<()> {
    let set = load_rule_set(path)
        .with_context(|| format!("rule document {} is invalid", path.display()))?;
    let compiled = CompiledRuleSet::compile(&set)
        .with_context(|| format!("rule document {} failed to compile", path.display()))?;
    let report = RulesCheckReport {
        id: compiled.id().to_string(),
        rules: compiled.len(),
        enabled: set.metadata.enabled,
        warnings: validate_rule_set(&set).warnings,
    };
    print_json(&report, true)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output")?;
    println!("{}", out);
    Ok(())
}
