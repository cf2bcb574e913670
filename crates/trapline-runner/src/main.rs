use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use trapline_core::art::ArtContext;
use trapline_platformer::LevelSession;
use trapline_platformer::config::PlatformerConfig;
use trapline_runner::{InputScript, Runner, RunnerConfig};

#[tokio::main]
async fn main() {
    if std::env::var_os("TRAPLINE_LOG_JSON").is_some() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }

    tracing::info!("Trapline runner starting");

    let mut config = RunnerConfig::load();
    config.validate();
    let platformer = PlatformerConfig::load();
    let art = Arc::new(ArtContext::builtin());
    let levels = config.level_source(&platformer.world);

    let script = match &config.script {
        Some(path) => InputScript::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "input script unusable, running idle");
            InputScript::default()
        }),
        None => InputScript::default(),
    };

    let session = LevelSession::new(platformer, art, levels);
    let mut runner =
        Runner::new(session, script, config.max_ticks).stop_after_levels(config.stop_after_levels);

    let summary = if config.realtime {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        };
        runner.run_realtime(config.tick_rate_hz, shutdown).await
    } else {
        runner.run_headless(config.tick_rate_hz)
    };

    if let Some(stats) = summary.last_completion {
        println!("{}", stats.summary());
    }
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to encode run summary"),
    }
}
