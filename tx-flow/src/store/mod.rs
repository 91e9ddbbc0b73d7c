mod sqlite;

pub use sqlite::*;

use crate::types::{BlockHeader, RawTransactionRecord, UnblindingSecret, WitnessOutput};
use elements::{OutPoint, Txid};
use flow_util::LiquidNetwork;
use std::sync::Arc;

/// Secrets recovered for confidential outputs, keyed by (txid, vout).
#[async_trait::async_trait]
pub trait UnblindingStore: Send + Sync {
    async fn get_unblinding_secret(
        &self,
        txid: &Txid,
        vout: u32,
    ) -> Result<Option<UnblindingSecret>, String>;
}

/// Previously seen outputs owned by the wallet, looked up when they are spent.
#[async_trait::async_trait]
pub trait WitnessOutputStore: Send + Sync {
    async fn get_witness_output(&self, outpoint: &OutPoint)
    -> Result<Option<WitnessOutput>, String>;
}

#[async_trait::async_trait]
pub trait BlockHeaderStore: Send + Sync {
    async fn get_block_header(
        &self,
        network: LiquidNetwork,
        height: u32,
    ) -> Result<Option<BlockHeader>, String>;

    // Must be idempotent, the same (network, height) always maps to the same header
    async fn put_block_header(
        &self,
        network: LiquidNetwork,
        header: &BlockHeader,
    ) -> Result<(), String>;
}

#[async_trait::async_trait]
pub trait TransactionStore: Send + Sync {
    async fn get_transaction(&self, txid: &Txid) -> Result<Option<RawTransactionRecord>, String>;
    async fn put_transaction(
        &self,
        txid: &Txid,
        record: &RawTransactionRecord,
    ) -> Result<(), String>;
}

pub type UnblindingStoreRef = Arc<dyn UnblindingStore>;
pub type WitnessOutputStoreRef = Arc<dyn WitnessOutputStore>;
pub type BlockHeaderStoreRef = Arc<dyn BlockHeaderStore>;
pub type TransactionStoreRef = Arc<dyn TransactionStore>;
