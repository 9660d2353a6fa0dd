use serde::Deserialize;

/// Environment variable that decides whether the dev logger is enabled by default.
pub const APP_ENV: &str = "APP_ENV";

/// Name of the cookie that carries the redirect chain between requests.
pub const DEFAULT_COOKIE_NAME: &str = "_mdl-requests";

/// Chains longer than this many URLs trigger a warning.
pub const DEFAULT_WARN_THRESHOLD: usize = 2;

fn default_enabled() -> bool {
    is_development(std::env::var(APP_ENV).ok().as_deref())
}

fn default_warn_threshold() -> usize {
    DEFAULT_WARN_THRESHOLD
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn is_development(app_env: Option<&str>) -> bool {
    app_env == Some("development")
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevLoggerConfig {
    /// Logs and tracks redirects when `true`. Otherwise responses pass through untouched.
    ///
    /// Defaults to `APP_ENV == "development"`. This middleware slows every request down, do
    /// not enable it in production.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// A warning is logged once a redirect chain holds more URLs than this.
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: usize,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl DevLoggerConfig {
    /// Resolves the defaults from the environment. Reads `APP_ENV` once, here.
    pub fn from_env() -> Self {
        DevLoggerConfig {
            enabled: default_enabled(),
            warn_threshold: default_warn_threshold(),
            cookie_name: default_cookie_name(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_warn_threshold(mut self, warn_threshold: usize) -> Self {
        self.warn_threshold = warn_threshold;
        self
    }

    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }
}

impl Default for DevLoggerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
