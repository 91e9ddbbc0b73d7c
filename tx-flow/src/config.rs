use flow_util::{ChainSourceConfig, LiquidNetwork, TX_FLOW_CONFIG_FILE, TX_FLOW_DB_FILE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

fn default_header_cache_capacity() -> usize {
    1024
}

fn default_db_file() -> String {
    TX_FLOW_DB_FILE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    // Active network, enrichment of confirmed transactions needs it
    #[serde(default)]
    pub network: Option<LiquidNetwork>,

    // Overrides the policy asset of the network, as hex
    #[serde(default)]
    pub native_asset: Option<String>,

    #[serde(default)]
    pub chain: ChainSourceConfig,

    #[serde(default)]
    pub explorer_url: Option<String>,

    // Entries kept in memory in front of the persisted block headers
    #[serde(default = "default_header_cache_capacity")]
    pub header_cache_capacity: usize,

    #[serde(default = "default_db_file")]
    pub db_file: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            network: None,
            native_asset: None,
            chain: ChainSourceConfig::default(),
            explorer_url: None,
            header_cache_capacity: default_header_cache_capacity(),
            db_file: default_db_file(),
        }
    }
}

impl FlowConfig {
    pub fn load(root_dir: &Path) -> Result<Self, String> {
        let path = root_dir.join(TX_FLOW_CONFIG_FILE);
        if !path.exists() {
            let default_config = FlowConfig::default();
            info!(
                "Config file {} does not exist. Using default configuration.",
                path.display()
            );
            info!(
                "Default config: {}",
                toml::to_string_pretty(&default_config).unwrap_or_default()
            );
            return Ok(default_config);
        }

        info!("Loading config from {}", path.display());
        let config_data = std::fs::read_to_string(&path).map_err(|e| {
            let msg = format!("Failed to read config file {}: {}", path.display(), e);
            error!("{}", msg);
            msg
        })?;
        debug!("Config data: {}", config_data);

        Self::parse(&config_data).map_err(|e| {
            let msg = format!("Failed to parse config file {}: {}", path.display(), e);
            error!("{}", msg);
            msg
        })
    }

    pub fn parse(data: &str) -> Result<Self, String> {
        toml::from_str(data).map_err(|e| e.to_string())
    }

    pub fn explorer_url(&self) -> Option<String> {
        if let Some(ref url) = self.explorer_url {
            return Some(url.clone());
        }

        self.network
            .map(|network| network.default_explorer_url().to_string())
    }
}

pub type FlowConfigRef = Arc<FlowConfig>;
