use std::sync::Arc;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::clients::http::{FetchClient, FetchPolicy, HttpTransport, ReqwestTransport};
use crate::clients::jikan::JikanClient;
use crate::config::Config;
use crate::db::{CatalogStore, Store};
use crate::services::CatalogSynchronizer;

/// Everything a request handler or CLI command needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub synchronizer: Arc<CatalogSynchronizer>,

    pub start_time: Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub async fn new(
        config: Config,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(&config.jikan)
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
        Self::with_transport(config, transport, prometheus_handle).await
    }

    /// Builds the state around a caller-supplied transport.
    pub async fn with_transport(
        config: Config,
        transport: impl HttpTransport + 'static,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let fetch = FetchClient::new(transport, FetchPolicy::from_config(&config.jikan));
        let jikan = Arc::new(JikanClient::new(fetch, config.jikan.base_url.clone()));
        let catalog: Arc<dyn CatalogStore> = Arc::new(store.clone());
        let synchronizer = Arc::new(CatalogSynchronizer::new(
            jikan,
            catalog,
            config.jikan.max_pages,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            synchronizer,
            start_time: Instant::now(),
            prometheus_handle,
        })
    }
}
