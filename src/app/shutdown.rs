use super::{ComponentState, DojoOrchestrator};
use crate::capture::CameraDevice;
use crate::error::{DojoError, Result};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

impl DojoOrchestrator {
    /// Perform graceful shutdown of all components
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");
        self.cancellation_token.cancel();

        let mut exit_code = 0;
        for component in ["keyboard", "playback", "capture", "store"] {
            if let Err(e) = self.stop_component(component).await {
                error!("Error stopping {}: {}", component, e);
                exit_code = 1;
            }
        }

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }

    /// Stop a specific component
    async fn stop_component(&mut self, component: &str) -> Result<()> {
        if self.get_component_state(component).await.is_none() {
            return Ok(());
        }

        self.set_component_state(component, ComponentState::Stopping)
            .await;

        let outcome = match component {
            "keyboard" => match self.keyboard_handler.as_mut() {
                Some(handler) => timeout(STOP_TIMEOUT, handler.stop()).await,
                None => Ok(Ok(())),
            },
            // An interrupted recording is dropped with the process
            "capture" if self.camera.is_recording() => {
                timeout(STOP_TIMEOUT, async {
                    self.camera.stop_recording().await.map_err(DojoError::from)
                })
                .await
            }
            _ => Ok(Ok(())),
        };

        match outcome {
            Ok(Ok(())) => {
                self.set_component_state(component, ComponentState::Stopped)
                    .await;
                info!("{} component stopped", component);
                Ok(())
            }
            Ok(Err(e)) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                Err(e)
            }
            Err(_) => {
                self.set_component_state(component, ComponentState::Failed)
                    .await;
                Err(DojoError::system(format!("{} component stop timeout", component)))
            }
        }
    }
}
