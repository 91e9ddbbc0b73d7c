use crate::chain::{ChainSourceFactoryRef, create_chain_source_factory};
use crate::config::FlowConfig;
use elements::AssetId;
use flow_util::{LiquidNetwork, parse_asset_id};

/// The active network as seen by the flow computer.
#[derive(Clone)]
pub struct NetworkSettings {
    pub network: LiquidNetwork,
    pub native_asset: AssetId,
    pub chain: ChainSourceFactoryRef,
}

impl NetworkSettings {
    pub fn new(network: LiquidNetwork, chain: ChainSourceFactoryRef) -> Self {
        Self {
            network,
            native_asset: network.policy_asset(),
            chain,
        }
    }

    pub fn with_native_asset(mut self, native_asset: AssetId) -> Self {
        self.native_asset = native_asset;
        self
    }

    pub fn native_asset_hex(&self) -> String {
        self.native_asset.to_string()
    }

    /// Returns None when the config names no active network.
    pub fn from_config(config: &FlowConfig) -> Result<Option<Self>, String> {
        let Some(network) = config.network else {
            warn!("No active network configured");
            return Ok(None);
        };

        let chain = create_chain_source_factory(&config.chain, network);
        let mut settings = Self::new(network, chain);
        if let Some(ref asset) = config.native_asset {
            settings = settings.with_native_asset(parse_asset_id(asset)?);
        }

        info!(
            "Active network {}, native asset {}",
            settings.network, settings.native_asset
        );
        Ok(Some(settings))
    }
}

impl std::fmt::Debug for NetworkSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkSettings")
            .field("network", &self.network)
            .field("native_asset", &self.native_asset)
            .finish_non_exhaustive()
    }
}
