use std::time::Duration;

use anyhow::Context;
use chrono::Utc;

use rolegate_api::{app, config::ApiConfig};
use rolegate_infra::SessionStore;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    rolegate_observability::init(config.log_format);

    let services = app::services::build_services(&config)
        .await
        .context("failed to initialise services")?;

    let sessions = services.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired(Utc::now());
            if purged > 0 {
                tracing::debug!(purged, "expired sessions purged");
            }
        }
    });

    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
