//! # Peekstack Demo
//!
//! Runs the scripted navigation session and reports the result.

use clap::Parser;
use peekstack_demo::{run_scenario, CliArgs, DemoConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,peekstack_demo=debug,peekstack_core=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    // Use JSON format for machine-readable logs (RUST_LOG_FORMAT=json)
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = DemoConfig::from(args);

    tracing::info!(
        "Container {}x{}, peek {}, hang {}, depth {}",
        config.width,
        config.height,
        config.peek,
        config.hang,
        config.depth
    );
    if let Some(ref path) = config.settings_path {
        tracing::info!("Settings file: {}", path.display());
    }

    let report = run_scenario(&config)?;
    tracing::info!(
        "Scenario finished: {} steps, {} frames, {} frame updates",
        report.steps.len(),
        report.frames,
        report.frame_updates
    );

    if config.print_snapshot {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
