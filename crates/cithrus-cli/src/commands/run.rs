//! Pipeline run command.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use cithrus_components::ComponentRegistry;
use cithrus_config::PipelineConfig;
use cithrus_core::AsyncPipelineRunner;
use clap::Args;

const POLL: Duration = Duration::from_millis(10);

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline config file (TOML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Stop after this many seconds
    #[arg(short, long, value_name = "SECS")]
    duration_secs: Option<f64>,

    /// Stop after this many ticks
    #[arg(short, long, value_name = "N")]
    ticks: Option<u64>,
}

fn deadline_after(secs: f64) -> anyhow::Result<Instant> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .and_then(|d| Instant::now().checked_add(d))
        .with_context(|| format!("--duration-secs out of range: {secs}"))
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = PipelineConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let registry = ComponentRegistry::new();
    let pipeline = config.build(&registry)?;

    let deadline = args.duration_secs.map(deadline_after).transpose()?;

    println!(
        "Running '{}' [{}]",
        config.name,
        pipeline.component_names().join(" -> ")
    );
    if deadline.is_none() && args.ticks.is_none() {
        println!("Press Ctrl+C to stop...");
    }

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;

    let runner = AsyncPipelineRunner::spawn_with(pipeline, config.runner_config())?;
    loop {
        if interrupted.load(Ordering::SeqCst) {
            tracing::info!("interrupted");
            break;
        }
        if runner.is_finished() {
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        if args.ticks.is_some_and(|n| runner.ticks() >= n) {
            break;
        }
        thread::sleep(POLL);
    }

    let report = runner.stop();
    println!("'{}' {} after {} ticks", config.name, report.outcome, report.ticks);
    if !report.is_clean() {
        anyhow::bail!("pipeline '{}' {}", config.name, report.outcome);
    }
    Ok(())
}
