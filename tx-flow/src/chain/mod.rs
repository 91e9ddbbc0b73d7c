mod electrs;
mod esplora;

pub use electrs::*;
pub use esplora::*;

use crate::types::BlockHeader;
use flow_util::{ChainSourceConfig, ChainSourceKind, LiquidNetwork};
use std::sync::Arc;

/// A live connection to a chain data source.
///
/// The connection is released when the source is dropped.
#[async_trait::async_trait]
pub trait ChainSource: Send + Sync {
    // Returns None if the source has no block at this height yet
    async fn fetch_block_header(&self, height: u32) -> Result<Option<BlockHeader>, String>;
}

pub trait ChainSourceFactory: Send + Sync {
    fn connect(&self) -> Result<Box<dyn ChainSource>, String>;
}

pub type ChainSourceFactoryRef = Arc<dyn ChainSourceFactory>;

pub fn create_chain_source_factory(
    config: &ChainSourceConfig,
    network: LiquidNetwork,
) -> ChainSourceFactoryRef {
    let url = config.url(network);
    info!(
        "Using {:?} chain source at {} for {}",
        config.kind, url, network
    );

    match config.kind {
        ChainSourceKind::Electrum => Arc::new(ElectrsChainSourceFactory::new(&url)),
        ChainSourceKind::Esplora => Arc::new(EsploraChainSourceFactory::new(&url)),
    }
}
