use std::{ops::Deref, sync::Arc};

use crate::{config::DevLoggerConfig, redirect_chain::RedirectChainTracker};

/// Shared by every clone of the dev logger service.
#[derive(Debug, Clone)]
pub struct DevLoggerState {
    inner: Arc<DevLoggerStateInner>,
}

impl DevLoggerState {
    pub fn new(config: DevLoggerConfig) -> Self {
        let tracker = RedirectChainTracker::from_config(&config);

        Self {
            inner: Arc::new(DevLoggerStateInner {
                enabled: config.enabled,
                tracker,
            }),
        }
    }
}

impl Deref for DevLoggerState {
    type Target = DevLoggerStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug)]
pub struct DevLoggerStateInner {
    enabled: bool,
    tracker: RedirectChainTracker,
}

impl DevLoggerStateInner {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn tracker(&self) -> &RedirectChainTracker {
        &self.tracker
    }
}
