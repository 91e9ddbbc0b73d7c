use crate::network::NetworkSettings;
use crate::store::BlockHeaderStoreRef;
use crate::types::BlockHeader;
use flow_util::LiquidNetwork;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

type HeaderKey = (LiquidNetwork, u32);

/// Cache-aside lookup of block headers: memory, then the persistent store,
/// then the chain source.
///
/// Concurrent misses on the same key may fetch twice, both writes store the
/// same header.
pub struct BlockHeaderCache {
    store: BlockHeaderStoreRef,
    memory: Mutex<LruCache<HeaderKey, BlockHeader>>,
}

impl BlockHeaderCache {
    pub fn new(store: BlockHeaderStoreRef, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        info!("BlockHeaderCache memory capacity: {} entries", capacity);

        Self {
            store,
            memory: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get_count(&self) -> usize {
        self.memory.lock().unwrap().len()
    }

    pub fn clear(&self) {
        let mut memory = self.memory.lock().unwrap();
        info!("Clearing BlockHeaderCache, current count: {}", memory.len());
        memory.clear();
    }

    pub async fn get(
        &self,
        settings: &NetworkSettings,
        height: u32,
    ) -> Result<Option<BlockHeader>, String> {
        let key = (settings.network, height);
        let cached = self.memory.lock().unwrap().get(&key).cloned();
        if cached.is_some() {
            return Ok(cached);
        }

        if let Some(header) = self.store.get_block_header(settings.network, height).await? {
            self.memory.lock().unwrap().put(key, header.clone());
            return Ok(Some(header));
        }

        // The connection lives until the end of this scope, error paths included
        let source = settings.chain.connect()?;
        let Some(header) = source.fetch_block_header(height).await? else {
            info!(
                "Block header {} at {} not available from chain source yet",
                settings.network, height
            );
            return Ok(None);
        };

        if header.height != height {
            let msg = format!(
                "Chain source returned block at {} for requested height {}",
                header.height, height
            );
            error!("{}", msg);
            return Err(msg);
        }

        self.store.put_block_header(settings.network, &header).await?;
        self.memory.lock().unwrap().put(key, header.clone());
        debug!(
            "Fetched and stored block header {} at {}: {}",
            settings.network, height, header.hash
        );

        Ok(Some(header))
    }
}

pub type BlockHeaderCacheRef = std::sync::Arc<BlockHeaderCache>;
