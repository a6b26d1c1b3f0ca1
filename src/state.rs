use std::collections::{BTreeMap, HashSet};

use crate::client::TalkAiClient;
use crate::config::{self, ProxyConfig};
use crate::error::Result;
use crate::metrics::{LiveRequestLog, StatsRecorder};

/// Default location of the model-id → display-name map.
pub const MODEL_MAP_PATH: &str = "models.json";

/// Everything the handlers share. Built once at startup and handed to the
/// router inside an `Arc`; nothing in here is process-global.
pub struct AppState {
    pub config: ProxyConfig,

    /// Accepted client keys. Empty means authentication is disabled.
    pub api_keys: HashSet<String>,

    /// Model id → display name, sorted by id.
    pub model_map: BTreeMap<String, String>,

    pub client: TalkAiClient,
    pub stats: StatsRecorder,
    pub live_log: LiveRequestLog,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let model_map = config::load_model_map(MODEL_MAP_PATH, &config.default_model);
        Self::with_model_map(config, model_map)
    }

    /// Build state with an explicit model map instead of reading
    /// `models.json` from disk.
    pub fn with_model_map(
        config: ProxyConfig,
        model_map: BTreeMap<String, String>,
    ) -> Result<Self> {
        let api_keys = config.api_keys.iter().cloned().collect();
        let client = TalkAiClient::new(config.timeout())?;

        Ok(AppState {
            config,
            api_keys,
            model_map,
            client,
            stats: StatsRecorder::new(),
            live_log: LiveRequestLog::default(),
        })
    }
}
