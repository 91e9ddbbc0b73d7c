use super::{ChainSource, ChainSourceFactory};
use crate::types::BlockHeader;
use flow_util::{ElectrsClient, ElectrsClientRef};
use std::sync::Arc;

pub struct ElectrsChainSource {
    client: ElectrsClientRef,
}

#[async_trait::async_trait]
impl ChainSource for ElectrsChainSource {
    async fn fetch_block_header(&self, height: u32) -> Result<Option<BlockHeader>, String> {
        // The electrum client is blocking
        let client = self.client.clone();
        let header = tokio::task::spawn_blocking(move || client.get_block_header(height))
            .await
            .map_err(|e| {
                let msg = format!("Block header fetch task at {} failed: {}", height, e);
                error!("{}", msg);
                msg
            })??;

        Ok(header.as_ref().map(BlockHeader::from))
    }
}

impl Drop for ElectrsChainSource {
    fn drop(&mut self) {
        debug!("Closing Electrs connection to {}", self.client.server_url());
    }
}

pub struct ElectrsChainSourceFactory {
    server_url: String,
}

impl ElectrsChainSourceFactory {
    pub fn new(server_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
        }
    }
}

impl ChainSourceFactory for ElectrsChainSourceFactory {
    fn connect(&self) -> Result<Box<dyn ChainSource>, String> {
        let client = ElectrsClient::new(&self.server_url)?;
        Ok(Box::new(ElectrsChainSource {
            client: Arc::new(client),
        }))
    }
}
