use elements::{AssetId, OutPoint, Txid};
use flow_util::UNCONFIRMED_HEIGHT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A transaction as it was observed on the chain source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransactionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
}

impl RawTransactionRecord {
    pub fn new(hex: &str, height: Option<i64>) -> Self {
        Self {
            height,
            hex: Some(hex.to_string()),
        }
    }

    /// Height of the including block, None while unconfirmed.
    pub fn confirmed_height(&self) -> Option<u32> {
        match self.height {
            Some(h) if h != UNCONFIRMED_HEIGHT && h >= 0 => u32::try_from(h).ok(),
            _ => None,
        }
    }
}

/// Value field of an output, either in plaintext or hidden behind a commitment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DecodedValue {
    Explicit(u64),
    Confidential(Vec<u8>),
}

/// Asset field of an output, either in plaintext or hidden behind a commitment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetIdentifier {
    Explicit(AssetId),
    Confidential(Vec<u8>),
}

/// Amount, asset and blinding factors recovered for one confidential output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnblindingSecret {
    pub value: u64,
    pub asset: String,
    pub asset_blinding_factor: String,
    pub value_blinding_factor: String,
}

/// Signed per-asset balance change, keyed by asset hex.
pub type FlowMap = BTreeMap<String, i64>;

/// Per-asset balance, keyed by asset hex.
pub type BalanceMap = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub height: u32,
    pub hash: String,
    pub prev_block_hash: String,
    pub merkle_root: String,
    pub timestamp: u32,
    pub version: u32,
}

impl From<&elements::BlockHeader> for BlockHeader {
    fn from(header: &elements::BlockHeader) -> Self {
        Self {
            height: header.height,
            hash: header.block_hash().to_string(),
            prev_block_hash: header.prev_blockhash.to_string(),
            merkle_root: header.merkle_root.to_string(),
            timestamp: header.time,
            version: header.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub record: RawTransactionRecord,
    pub transaction_id: String,
    pub flow: FlowMap,
    pub fee_amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_header: Option<BlockHeader>,
}

/// An output of a previous transaction that belongs to the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessOutput {
    pub value: DecodedValue,
    pub asset: AssetIdentifier,
}

impl WitnessOutput {
    pub fn explicit(asset: AssetId, value: u64) -> Self {
        Self {
            value: DecodedValue::Explicit(value),
            asset: AssetIdentifier::Explicit(asset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnblindedOutput {
    pub outpoint: OutPoint,
    pub unblinding_secret: Option<UnblindingSecret>,
}

impl UnblindedOutput {
    pub fn txid(&self) -> &Txid {
        &self.outpoint.txid
    }

    pub fn vout(&self) -> u32 {
        self.outpoint.vout
    }
}
