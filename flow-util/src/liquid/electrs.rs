use electrum_client::{Client, ElectrumApi};
use elements::BlockHeader;

pub struct ElectrsClient {
    server_url: String,
    client: Client,
}

impl ElectrsClient {
    pub fn new(server_url: &str) -> Result<Self, String> {
        let client = Client::new(server_url).map_err(|e| {
            let msg = format!("Failed to create Electrs client for {}: {}", server_url, e);
            error!("{}", msg);
            msg
        })?;

        debug!("Connected to Electrs server at {}", server_url);
        Ok(Self {
            server_url: server_url.to_string(),
            client,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    // Height of the best block known to the server
    pub fn get_tip_height(&self) -> Result<u32, String> {
        let tip = self.client.block_headers_subscribe_raw().map_err(|e| {
            let msg = format!("Failed to get chain tip from {}: {}", self.server_url, e);
            error!("{}", msg);
            msg
        })?;

        Ok(tip.height as u32)
    }

    // Returns None if the server has not seen a block at this height yet
    pub fn get_block_header(&self, block_height: u32) -> Result<Option<BlockHeader>, String> {
        let tip = self.get_tip_height()?;
        if block_height > tip {
            info!(
                "Block {} is above the tip {} of {}",
                block_height, tip, self.server_url
            );
            return Ok(None);
        }

        let raw = self
            .client
            .block_header_raw(block_height as usize)
            .map_err(|e| {
                let msg = format!("Failed to get block header at {}: {}", block_height, e);
                error!("{}", msg);
                msg
            })?;

        let header: BlockHeader = elements::encode::deserialize(&raw).map_err(|e| {
            let msg = format!("Failed to decode block header at {}: {}", block_height, e);
            error!("{}", msg);
            msg
        })?;

        Ok(Some(header))
    }
}

pub type ElectrsClientRef = std::sync::Arc<ElectrsClient>;
