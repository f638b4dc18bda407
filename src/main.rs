use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use approval_index::config::ApprovalConfig;
use approval_index::platforms::{run_platforms, PlatformInput, PlatformOutput};
use approval_index::report::{self, compare_all};
use approval_index::scoring::PlatformSummary;
use approval_index::sentiment::{build_adapter, prepare_text, SentimentRunner};
use approval_index::{build_pipeline, format_float, format_number, format_percent};

#[derive(Parser)]
#[command(name = "approval-index", about = "Cross-platform content approval scoring")]
struct Cli {
    /// Path to a TOML config (defaults to APPROVAL_CONFIG_PATH or config/approval.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score one export per platform and write the approval tables
    Run(RunArgs),
    /// Score a single text with the configured sentiment backend
    ScoreText(ScoreTextArgs),
    /// Write the default configuration
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// `platform=path`, repeatable
    #[arg(long = "input", value_parser = parse_input, required = true)]
    inputs: Vec<PlatformInput>,
    #[arg(long, default_value = "output")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ScoreTextArgs {
    #[arg(long)]
    text: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/approval.toml")]
    path: PathBuf,
    #[arg(long)]
    force: bool,
}

fn parse_input(value: &str) -> Result<PlatformInput, String> {
    let (platform, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected platform=path, got {}", value))?;
    let platform = platform.trim();
    if platform.is_empty() || path.trim().is_empty() {
        return Err(format!("expected platform=path, got {}", value));
    }
    Ok(PlatformInput::new(platform, path.trim()))
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig(args) => init_config(args),
        Command::ScoreText(args) => {
            let config = load_config(cli.config)?;
            score_text(args, &config).await
        }
        Command::Run(args) => {
            let config = load_config(cli.config)?;
            run_batches(args, config).await
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ApprovalConfig, String> {
    let (config, path) = ApprovalConfig::load(path).map_err(|err| err.to_string())?;
    match path {
        Some(path) if path.exists() => info!(path = %path.display(), "config loaded"),
        _ => info!("using default config"),
    }
    Ok(config)
}

fn init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        ));
    }
    ApprovalConfig::default()
        .write(&args.path)
        .map_err(|err| err.to_string())?;
    println!("Config written to {}.", args.path.display());
    Ok(())
}

async fn score_text(args: ScoreTextArgs, config: &ApprovalConfig) -> Result<(), String> {
    let text = read_text(args.text)?;
    let adapter = build_adapter(&config.sentiment).map_err(|err| err.to_string())?;
    let runner = SentimentRunner::new(adapter, &config.sentiment, config.thresholds.clone());
    let score = runner.score_text(&text).await;

    println!("Prepared text: {}", prepare_text(&text));
    println!(
        "Sentiment: {} ({}) via {}",
        format_float(score.value, 3),
        score.label,
        runner.adapter_name()
    );
    if score.fallback {
        println!("Adapter failed, neutral default used.");
    }
    Ok(())
}

async fn run_batches(args: RunArgs, config: ApprovalConfig) -> Result<(), String> {
    let adapter = build_adapter(&config.sentiment).map_err(|err| err.to_string())?;
    let pipeline = Arc::new(build_pipeline(&config, adapter));

    let outputs = run_platforms(&config, pipeline, args.inputs, &args.out)
        .await
        .map_err(|err| err.to_string())?;
    for output in &outputs {
        print_summary(output);
    }

    let summaries: Vec<PlatformSummary> =
        outputs.into_iter().map(|output| output.run.summary).collect();
    let comparisons = compare_all(&summaries);
    if !comparisons.is_empty() {
        let path = report::write_comparisons(&args.out, &comparisons)
            .map_err(|err| err.to_string())?;
        println!("\nPlatform comparison ({}):", path.display());
        for comparison in &comparisons {
            println!(
                "- {} {} vs {} {}: diff {} ({}%) - {}",
                comparison.first,
                format_float(comparison.first_score, 4),
                comparison.second,
                format_float(comparison.second_score, 4),
                format_float(comparison.difference, 4),
                format_float(comparison.difference_pct, 2),
                comparison.conclusion()
            );
        }
    }

    Ok(())
}

fn print_summary(output: &PlatformOutput) {
    let run = &output.run;
    let summary = &run.summary;
    println!(
        "{}: approval {} across {} items (interaction mass {}, dropped {})",
        summary.platform,
        format_float(summary.platform_score, 4),
        summary.item_count,
        format_number(summary.total_interaction_mass as f64),
        run.dropped_records
    );
    if summary.item_count > 0 {
        let total = summary.item_count as f64;
        println!(
            "  sentiment: positive {} | neutral {} | negative {} | fallback {}",
            format_percent(summary.sentiment.positive as f64 / total),
            format_percent(summary.sentiment.neutral as f64 / total),
            format_percent(summary.sentiment.negative as f64 / total),
            summary.sentiment.fallback
        );
    }
    println!(
        "  wrote {} and {}",
        output.items_path.display(),
        output.summary_path.display()
    );
}

fn read_text(arg: Option<String>) -> Result<String, String> {
    if let Some(text) = arg {
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| format!("failed reading stdin: {}", err))?;
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Err("missing text: pass --text or pipe stdin".to_string());
    }
    Ok(trimmed.to_string())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
