use elements::AssetId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Policy assets of the public networks and of a default elementsd regtest chain
const LIQUID_POLICY_ASSET: &str = "6f0279e9ed041c3d710a9f57d0c02928416460c4b722ae3457a11eec381c526d";
const LIQUID_TESTNET_POLICY_ASSET: &str =
    "144c654344aa716d6f3abcc1ca90e5641e4e2a7f633bc09fe3baf64585819a49";
const REGTEST_POLICY_ASSET: &str = "5ac9f65c0efcc4775e0baec4ec03abdde22473cd3cf33c0419ca290e0751b225";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidNetwork {
    Liquid,
    LiquidTestnet,
    Regtest,
}

impl LiquidNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiquidNetwork::Liquid => "liquid",
            LiquidNetwork::LiquidTestnet => "liquidtestnet",
            LiquidNetwork::Regtest => "regtest",
        }
    }

    pub fn policy_asset(&self) -> AssetId {
        let hex = match self {
            LiquidNetwork::Liquid => LIQUID_POLICY_ASSET,
            LiquidNetwork::LiquidTestnet => LIQUID_TESTNET_POLICY_ASSET,
            LiquidNetwork::Regtest => REGTEST_POLICY_ASSET,
        };

        // The constants above are checked by test_policy_assets_parse
        AssetId::from_str(hex).expect("invalid built-in policy asset")
    }

    pub fn default_electrum_url(&self) -> &'static str {
        match self {
            LiquidNetwork::Liquid => "ssl://blockstream.info:995",
            LiquidNetwork::LiquidTestnet => "ssl://blockstream.info:465",
            LiquidNetwork::Regtest => "tcp://127.0.0.1:50001",
        }
    }

    pub fn default_esplora_url(&self) -> &'static str {
        match self {
            LiquidNetwork::Liquid => "https://blockstream.info/liquid/api",
            LiquidNetwork::LiquidTestnet => "https://blockstream.info/liquidtestnet/api",
            LiquidNetwork::Regtest => "http://127.0.0.1:3000",
        }
    }

    pub fn default_explorer_url(&self) -> &'static str {
        match self {
            LiquidNetwork::Liquid => "https://blockstream.info/liquid",
            LiquidNetwork::LiquidTestnet => "https://blockstream.info/liquidtestnet",
            LiquidNetwork::Regtest => "http://127.0.0.1:5001",
        }
    }
}

impl fmt::Display for LiquidNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiquidNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "liquid" | "mainnet" => Ok(LiquidNetwork::Liquid),
            "liquidtestnet" | "testnet" => Ok(LiquidNetwork::LiquidTestnet),
            "regtest" | "elementsregtest" => Ok(LiquidNetwork::Regtest),
            _ => Err(format!("Unknown network: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainSourceKind {
    Electrum,
    Esplora,
}

fn default_chain_source_kind() -> ChainSourceKind {
    ChainSourceKind::Electrum
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSourceConfig {
    #[serde(default = "default_chain_source_kind")]
    pub kind: ChainSourceKind,

    // Falls back to the network's public endpoint when absent
    #[serde(default)]
    pub url: Option<String>,
}

impl ChainSourceConfig {
    pub fn url(&self, network: LiquidNetwork) -> String {
        if let Some(ref url) = self.url {
            return url.clone();
        }

        match self.kind {
            ChainSourceKind::Electrum => network.default_electrum_url().to_string(),
            ChainSourceKind::Esplora => network.default_esplora_url().to_string(),
        }
    }
}

impl Default for ChainSourceConfig {
    fn default() -> Self {
        Self {
            kind: default_chain_source_kind(),
            url: None,
        }
    }
}
