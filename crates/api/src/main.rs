use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use clinicops_api::app::{AppServices, build_app};
use clinicops_infra::AppConfig;
use clinicops_infra::runner::{DailyAgentRunner, LogReportSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clinicops_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = Arc::new(AppServices::in_memory(config.agents.clone()));

    let runner = if config.scheduler_enabled {
        let handle = DailyAgentRunner::default()
            .spawn("daily-agents", Arc::clone(services.agents()), Arc::new(LogReportSink))
            .context("failed to start daily agent runner")?;
        Some(handle)
    } else {
        info!("daily agent runner disabled");
        None
    };

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(handle) = runner {
        tokio::task::spawn_blocking(move || handle.shutdown()).await?;
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
