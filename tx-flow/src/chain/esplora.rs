use super::{ChainSource, ChainSourceFactory};
use crate::types::BlockHeader;
use reqwest::StatusCode;

pub struct EsploraChainSource {
    base_url: String,
    client: reqwest::Client,
}

impl EsploraChainSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_text(&self, path: &str) -> Result<Option<String>, String> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await.map_err(|e| {
            let msg = format!("Request to {} failed: {}", url, e);
            error!("{}", msg);
            msg
        })?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let msg = format!("Request to {} returned status {}", url, resp.status());
            error!("{}", msg);
            return Err(msg);
        }

        let text = resp.text().await.map_err(|e| {
            let msg = format!("Failed to read response from {}: {}", url, e);
            error!("{}", msg);
            msg
        })?;

        Ok(Some(text.trim().to_string()))
    }
}

#[async_trait::async_trait]
impl ChainSource for EsploraChainSource {
    async fn fetch_block_header(&self, height: u32) -> Result<Option<BlockHeader>, String> {
        let Some(hash) = self.get_text(&format!("/block-height/{}", height)).await? else {
            info!("Block {} not found at {}", height, self.base_url);
            return Ok(None);
        };

        let Some(header_hex) = self.get_text(&format!("/block/{}/header", hash)).await? else {
            warn!("Header of block {} ({}) vanished at {}", height, hash, self.base_url);
            return Ok(None);
        };

        decode_block_header_hex(&header_hex).map(Some)
    }
}

pub fn decode_block_header_hex(header_hex: &str) -> Result<BlockHeader, String> {
    let bytes = hex::decode(header_hex).map_err(|e| {
        let msg = format!("Invalid block header hex: {}", e);
        error!("{}", msg);
        msg
    })?;

    let header: elements::BlockHeader = elements::encode::deserialize(&bytes).map_err(|e| {
        let msg = format!("Failed to decode block header: {}", e);
        error!("{}", msg);
        msg
    })?;

    Ok(BlockHeader::from(&header))
}

pub struct EsploraChainSourceFactory {
    base_url: String,
}

impl EsploraChainSourceFactory {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

impl ChainSourceFactory for EsploraChainSourceFactory {
    fn connect(&self) -> Result<Box<dyn ChainSource>, String> {
        Ok(Box::new(EsploraChainSource::new(&self.base_url)))
    }
}
