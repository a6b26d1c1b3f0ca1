use crate::error::{ProxyError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::time::Duration;
use uuid::Uuid;

/// Prefix for auto-generated client keys, so operators can spot them in logs.
pub const GENERATED_KEY_PREFIX: &str = "sk-talkai-";

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Client API keys. Empty means none configured; `ensure_api_key`
    /// generates one in that case.
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Streaming mode applied when the body says `stream: false` and the
    /// request carried no `stream` query parameter.
    #[serde(default)]
    pub default_stream: bool,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    /// Whole-call timeout toward the backend, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_true")]
    pub dashboard_enabled: bool,
}

fn default_port() -> u16 {
    9091
}

fn default_model() -> String {
    "claude-opus-4-1-20250805".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Default for ProxyConfig {
    fn default() -> Self {
        ProxyConfig {
            port: default_port(),
            api_keys: Vec::new(),
            default_stream: false,
            default_model: default_model(),
            default_temperature: default_temperature(),
            timeout_secs: default_timeout(),
            debug: false,
            dashboard_enabled: true,
        }
    }
}

impl ProxyConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| default_port().to_string())
            .parse::<u16>()
            .map_err(|e| ProxyError::ConfigError(format!("Invalid PORT value: {}", e)))?;

        let api_keys = parse_key_list(&env::var("API_KEYS").unwrap_or_default());

        let default_stream = env::var("DEFAULT_STREAM")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|e| ProxyError::ConfigError(format!("Invalid DEFAULT_STREAM value: {}", e)))?;

        let default_model = env::var("DEFAULT_MODEL").unwrap_or_else(|_| default_model());

        let default_temperature = env::var("DEFAULT_TEMPERATURE")
            .unwrap_or_else(|_| default_temperature().to_string())
            .parse::<f64>()
            .map_err(|e| {
                ProxyError::ConfigError(format!("Invalid DEFAULT_TEMPERATURE value: {}", e))
            })?;

        let timeout_secs = env::var("TIMEOUT")
            .unwrap_or_else(|_| default_timeout().to_string())
            .parse::<u64>()
            .map_err(|e| ProxyError::ConfigError(format!("Invalid TIMEOUT value: {}", e)))?;

        let debug = env::var("DEBUG_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|e| ProxyError::ConfigError(format!("Invalid DEBUG_MODE value: {}", e)))?;

        let dashboard_enabled = env::var("DASHBOARD_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|e| {
                ProxyError::ConfigError(format!("Invalid DASHBOARD_ENABLED value: {}", e))
            })?;

        Ok(ProxyConfig {
            port,
            api_keys,
            default_stream,
            default_model,
            default_temperature,
            timeout_secs,
            debug,
            dashboard_enabled,
        })
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ProxyError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let mut config: ProxyConfig = toml::from_str(&contents)
            .map_err(|e| ProxyError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        // Allow environment variables to override file config
        if let Ok(keys) = env::var("API_KEYS") {
            config.api_keys = parse_key_list(&keys);
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ProxyError::ConfigError("Port must not be 0".to_string()));
        }

        if self.default_model.is_empty() {
            return Err(ProxyError::ConfigError(
                "Default model is empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ProxyError::ConfigError(format!(
                "Default temperature {} outside [0.0, 2.0]",
                self.default_temperature
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ProxyError::ConfigError(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate a client key when none is configured, so the server never
    /// starts wide open by accident. Returns the generated key for logging.
    pub fn ensure_api_key(&mut self) -> Option<String> {
        if !self.api_keys.is_empty() {
            return None;
        }

        let key = format!("{}{}", GENERATED_KEY_PREFIX, Uuid::new_v4());
        self.api_keys.push(key.clone());
        Some(key)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load the model-id → display-name map from `models.json`. A missing or
/// unreadable file falls back to a single-entry map for the given default
/// model so `/v1/models` never serves an empty list.
pub fn load_model_map(path: &str, default_model: &str) -> BTreeMap<String, String> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<BTreeMap<String, String>>(&data) {
            Ok(map) if !map.is_empty() => {
                tracing::info!(path, models = map.len(), "loaded model map");
                map
            }
            Ok(_) => {
                tracing::warn!(path, "model map is empty, using default model only");
                fallback_model_map(default_model)
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "failed to parse model map");
                fallback_model_map(default_model)
            }
        },
        Err(e) => {
            tracing::warn!(path, error = %e, "failed to read model map");
            fallback_model_map(default_model)
        }
    }
}

fn fallback_model_map(default_model: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert(default_model.to_string(), default_model.to_string());
    map
}
