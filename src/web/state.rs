use std::sync::Arc;
use tokio::sync::RwLock;

use crate::interlink::TleCatalog;

use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Option<Arc<RwLock<TleCatalog>>>,
}

impl AppState {
    /// Builds shared state, loading the TLE catalog when one is configured.
    /// A catalog folder that fails to load is logged and left empty.
    pub fn new(config: Config) -> Self {
        let catalog = config.catalog.as_ref().map(|catalog_config| {
            let mut catalog = TleCatalog::new(catalog_config.tle_folder.clone());
            if let Err(e) = catalog.load_all() {
                log::warn!("Failed to initialize TLE catalog: {}", e);
            } else if catalog.is_empty() {
                log::warn!(
                    "No satellites found in {}",
                    catalog_config.tle_folder.display()
                );
            }
            Arc::new(RwLock::new(catalog))
        });

        Self {
            config: Arc::new(config),
            catalog,
        }
    }
}
