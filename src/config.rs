use crate::model::ConfigError;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";
pub const DEFAULT_RUN_MODE: &str = "development";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the analysis backend; `/analyze` is appended per request.
    pub backend_url: String,
    pub bind_addr: SocketAddr,
    /// Where the upload client finds the proxy.
    pub proxy_url: String,
    pub run_mode: String,
    /// No timeout when unset.
    pub backend_timeout: Option<Duration>,
}

impl AppConfig {
    /// Builds the config from an arbitrary key lookup, applying defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend_url = trim_url(get("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.into()));
        let proxy_url = trim_url(get("PROXY_URL").unwrap_or_else(|| DEFAULT_PROXY_URL.into()));
        let run_mode = get("NODE_ENV").unwrap_or_else(|| DEFAULT_RUN_MODE.into());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue { key: "BIND_ADDR", value: bind_raw.clone() })?;

        let backend_timeout = match get("BACKEND_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue { key: "BACKEND_TIMEOUT_SECS", value: raw.clone() })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            backend_url,
            bind_addr,
            proxy_url,
            run_mode,
            backend_timeout,
        })
    }
}

/// Loads `.env` if present, then reads the process environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let _ = dotenvy::dotenv();
    AppConfig::from_lookup(|key| std::env::var(key).ok())
}

fn trim_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
