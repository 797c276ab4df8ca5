//! Startup reporting.

use crate::app::AppContext;
use serde::Serialize;
use tracing::info;

/// What the process ended up running with.
#[derive(Debug, Clone, Serialize)]
pub struct StartupSummary {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub store: &'static str,
    pub cache_backend: String,
    pub cache_fallback: String,
}

impl StartupSummary {
    pub async fn collect(app: &AppContext) -> Self {
        let health = app.cache_admin.health().await;
        Self {
            name: app.config.app.name.clone(),
            version: app.config.app.version.clone(),
            environment: app.config.app.environment.clone(),
            store: app.store_kind(),
            cache_backend: health.backend,
            cache_fallback: format!("{:?}", app.config.cache.fallback).to_lowercase(),
        }
    }
}

/// Logs the startup summary.
pub fn print_startup_info(summary: &StartupSummary) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("{} v{} ({})", summary.name, summary.version, summary.environment);
    info!("Store:     {}", summary.store);
    info!(
        "Cache:     {} (fallback: {})",
        summary.cache_backend, summary.cache_fallback
    );
    info!("{}", separator);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Repositories;
    use emporium_config::AppConfig;
    use emporium_service::CacheFacade;

    #[tokio::test]
    async fn test_summary_reflects_components() {
        let _ = tracing_subscriber::fmt::try_init();
        let app = AppContext::with_components(
            AppConfig::default(),
            Repositories::in_memory(),
            CacheFacade::disabled(),
        );

        let summary = StartupSummary::collect(&app).await;
        print_startup_info(&summary);

        assert_eq!(summary.store, "memory");
        assert_eq!(summary.cache_backend, "none");
        assert_eq!(summary.cache_fallback, "memory");
    }
}
