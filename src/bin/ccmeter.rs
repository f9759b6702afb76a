use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;

use ccmeter::error::MeterError;
use ccmeter::formatting::format_status_line;
use ccmeter::types::Plan;
use ccmeter::utils::{get_claude_paths, load_all_events};
use ccmeter::{CollectingSink, LogSink, Result, compute_with_trace};

/// Report quota usage for the active 5-hour Claude session window
#[derive(Debug, Parser)]
#[command(name = "ccmeter", version, about)]
struct Args {
    /// Quota preset to measure against
    #[arg(long, value_enum, env = "CCMETER_PLAN", default_value_t = Plan::Pro)]
    plan: Plan,

    /// Token limit for the custom plan
    #[arg(long, env = "CCMETER_CUSTOM_LIMIT_TOKENS")]
    custom_limit_tokens: Option<u64>,

    /// Comma-separated Claude data directories
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    data_dir: Option<String>,

    /// Print metrics as JSON
    #[arg(long)]
    json: bool,

    /// Print window selection decisions to stderr
    #[arg(long)]
    trace: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    // Configure rayon thread pool for optimal performance
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .thread_name(|i| format!("ccmeter-worker-{}", i))
        .build_global()
        .map_err(MeterError::ThreadPoolInit)?;

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if args.custom_limit_tokens.is_some() && args.plan != Plan::Custom {
        log::warn!("--custom-limit-tokens is ignored for plan {}", args.plan);
    }
    let quota = args.plan.quota_with_override(args.custom_limit_tokens)?;

    let claude_paths = get_claude_paths(args.data_dir.as_deref());
    if claude_paths.is_empty() {
        return Err(MeterError::ClaudePathNotFound);
    }

    let loaded = load_all_events(&claude_paths).await?;
    let now = Utc::now();

    let metrics = if args.trace {
        let sink = CollectingSink::new();
        let metrics = compute_with_trace(&loaded.events, &quota, now, &sink);
        for event in sink.into_events() {
            eprintln!("{} {event}", "trace:".dimmed());
        }
        metrics
    } else {
        compute_with_trace(&loaded.events, &quota, now, &LogSink)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    match metrics {
        Some(metrics) => println!("{}", format_status_line(&metrics, args.plan)),
        None => println!("[{}] {}", args.plan, "No active session".dimmed()),
    }

    Ok(())
}
