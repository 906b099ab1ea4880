use super::{ComponentState, DojoOrchestrator};
use crate::error::Result;
use std::path::Path;
use tracing::{error, info, warn};

impl DojoOrchestrator {
    /// Register components and load the content catalog
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing dojo review components");

        for component in ["store", "capture", "playback"] {
            self.set_component_state(component, ComponentState::Stopped)
                .await;
        }
        if self.keyboard_enabled {
            self.set_component_state("keyboard", ComponentState::Stopped)
                .await;
        }

        self.set_component_state("store", ComponentState::Starting)
            .await;

        let catalog_path = self.config.storage.catalog_path.clone();
        if tokio::fs::try_exists(&catalog_path).await.unwrap_or(false) {
            match self.store.load_catalog(Path::new(&catalog_path)).await {
                Ok(count) => info!("Loaded {} contents from {}", count, catalog_path),
                Err(e) => {
                    error!("Failed to load catalog {}: {}", catalog_path, e);
                    self.set_component_state("store", ComponentState::Failed)
                        .await;
                    return Err(e);
                }
            }
        } else {
            warn!("Catalog {} not found; starting with no content", catalog_path);
        }

        self.set_component_state("store", ComponentState::Running)
            .await;
        self.log_ready();
        Ok(())
    }
}
