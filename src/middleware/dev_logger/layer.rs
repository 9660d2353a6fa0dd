use tower::Layer;

use super::service::DevLogger;
use crate::{config::DevLoggerConfig, state::DevLoggerState};

/// Logs what the wrapped middleware did and tracks redirect chains across requests.
#[derive(Debug, Clone)]
pub struct DevLoggerLayer {
    state: DevLoggerState,
}

impl DevLoggerLayer {
    pub fn new(config: DevLoggerConfig) -> Self {
        DevLoggerLayer {
            state: DevLoggerState::new(config),
        }
    }
}

impl Default for DevLoggerLayer {
    fn default() -> Self {
        Self::new(DevLoggerConfig::from_env())
    }
}

impl<S> Layer<S> for DevLoggerLayer {
    type Service = DevLogger<S>;

    fn layer(&self, service: S) -> Self::Service {
        DevLogger::new(service, self.state.clone())
    }
}
