use crate::cmd::{Commands, OutputValue, TxSource};
use elements::{OutPoint, Txid};
use flow_util::{
    LiquidNetwork, TX_FLOW_SERVICE_NAME, get_service_dir, parse_asset_id, parse_blinding_factor,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tx_flow::{
    AssetIdentifier, BalanceMap, BlockHeader, BlockHeaderCache, BlockHeaderCacheRef,
    DecodedValue, EnrichedTransaction, FlowConfig, FlowStorage, FlowStorageRef, NetworkSettings,
    RawTransactionRecord, TransactionFlowComputer, TransactionStore, UnblindingSecret,
    WitnessOutput, aggregate_balances, blinded_explorer_url, blinded_output_params,
    decode_transaction,
};

pub struct FlowService {
    config: FlowConfig,
    storage: FlowStorageRef,
    header_cache: BlockHeaderCacheRef,
    computer: TransactionFlowComputer,
}

impl FlowService {
    pub fn new(root: Option<PathBuf>, network: Option<LiquidNetwork>) -> Result<Self, String> {
        let root = root.unwrap_or_else(|| get_service_dir(TX_FLOW_SERVICE_NAME));
        let mut config = FlowConfig::load(&root)?;
        if network.is_some() {
            config.network = network;
        }

        let storage = Arc::new(FlowStorage::open(&root, &config.db_file)?);
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: FlowConfig, storage: FlowStorageRef) -> Result<Self, String> {
        let settings = NetworkSettings::from_config(&config)?;
        let header_cache = Arc::new(BlockHeaderCache::new(
            storage.clone(),
            config.header_cache_capacity,
        ));
        let computer = TransactionFlowComputer::new(
            storage.clone(),
            storage.clone(),
            header_cache.clone(),
            settings,
        );

        Ok(Self {
            config,
            storage,
            header_cache,
            computer,
        })
    }

    pub async fn process_command(&self, command: Commands) -> Result<(), String> {
        match command {
            Commands::Flow { source, height } => {
                let enriched = self.flow(&source, height).await?;
                print_json(&enriched)?;
            }
            Commands::ImportTx { hex, height } => {
                let txid = self.import_tx(&hex, height).await?;
                println!("Imported transaction {}", txid);
            }
            Commands::ImportSecret {
                txid,
                vout,
                value,
                asset,
                abf,
                vbf,
            } => {
                let txid = parse_txid(&txid)?;
                parse_asset_id(&asset)?;
                parse_blinding_factor(&abf)?;
                parse_blinding_factor(&vbf)?;

                let secret = UnblindingSecret {
                    value,
                    asset,
                    asset_blinding_factor: abf,
                    value_blinding_factor: vbf,
                };
                self.storage.put_unblinding_secret(&txid, vout, &secret)?;
                println!("Imported secret for {}:{}", txid, vout);
            }
            Commands::ImportOutput { txid, vout, value } => {
                let outpoint = OutPoint::new(parse_txid(&txid)?, vout);
                self.import_output(&outpoint, &value)?;
                println!("Imported wallet output {}:{}", outpoint.txid, outpoint.vout);
            }
            Commands::Spend { txid, vout } => {
                let outpoint = OutPoint::new(parse_txid(&txid)?, vout);
                if !self.storage.mark_output_spent(&outpoint)? {
                    let msg = format!("Unknown wallet output {}:{}", outpoint.txid, vout);
                    println!("{}", msg);
                    return Err(msg);
                }
                println!("Marked {}:{} spent", outpoint.txid, vout);
            }
            Commands::Balance => {
                let balances = self.balance()?;
                print_json(&balances)?;
            }
            Commands::Header { height } => match self.header(height).await? {
                Some(header) => print_json(&header)?,
                None => println!("No block at height {} yet", height),
            },
            Commands::ExplorerUrl { txid } => {
                let url = self.explorer_url(&txid).await?;
                println!("{}", url);
            }
        }

        Ok(())
    }

    pub async fn flow(
        &self,
        source: &TxSource,
        height: Option<i64>,
    ) -> Result<EnrichedTransaction, String> {
        let mut record = match (&source.hex, &source.txid) {
            (Some(hex), _) => RawTransactionRecord::new(hex, None),
            (None, Some(txid)) => self.load_tx(txid).await?,
            (None, None) => return Err("Either a hex or a txid is required".to_string()),
        };
        if height.is_some() {
            record.height = height;
        }

        self.computer.compute(&record).await.map_err(|e| {
            let msg = format!("Failed to compute transaction flow: {}", e);
            error!("{}", msg);
            msg
        })
    }

    pub async fn import_tx(&self, hex: &str, height: Option<i64>) -> Result<Txid, String> {
        let tx = decode_transaction(hex)?;
        let record = RawTransactionRecord::new(hex, height);
        self.storage.put_transaction(&tx.id, &record).await?;

        info!("Imported transaction {} at height {:?}", tx.id, height);
        Ok(tx.id)
    }

    pub fn import_output(&self, outpoint: &OutPoint, value: &OutputValue) -> Result<(), String> {
        match &value.explicit {
            Some((amount, asset_hex)) => {
                let asset = parse_asset_id(asset_hex)?;
                self.storage
                    .put_wallet_output(outpoint, &WitnessOutput::explicit(asset, *amount))?;

                // Nothing to unblind, zero factors make it count towards the balance
                let secret = UnblindingSecret {
                    value: *amount,
                    asset: asset.to_string(),
                    asset_blinding_factor: "00".repeat(32),
                    value_blinding_factor: "00".repeat(32),
                };
                self.storage
                    .put_unblinding_secret(&outpoint.txid, outpoint.vout, &secret)
            }
            None => self.storage.put_wallet_output(
                outpoint,
                &WitnessOutput {
                    value: DecodedValue::Confidential(Vec::new()),
                    asset: AssetIdentifier::Confidential(Vec::new()),
                },
            ),
        }
    }

    pub fn balance(&self) -> Result<BalanceMap, String> {
        let outputs = self.storage.list_unspent_outputs()?;
        Ok(aggregate_balances(&outputs))
    }

    pub async fn header(&self, height: u32) -> Result<Option<BlockHeader>, String> {
        let Some(settings) = self.computer.network() else {
            let msg = "No active network configured".to_string();
            println!("{}", msg);
            return Err(msg);
        };

        self.header_cache.get(settings, height).await
    }

    pub async fn explorer_url(&self, txid: &str) -> Result<String, String> {
        let Some(base_url) = self.config.explorer_url() else {
            let msg = "No explorer url or active network configured".to_string();
            println!("{}", msg);
            return Err(msg);
        };

        let record = self.load_tx(txid).await?;
        let hex = record
            .hex
            .ok_or_else(|| format!("Transaction {} has no raw data", txid))?;
        let tx = decode_transaction(&hex)?;
        let params = blinded_output_params(&tx, self.storage.as_ref()).await?;

        Ok(blinded_explorer_url(&base_url, &tx.id.to_string(), &params))
    }

    async fn load_tx(&self, txid: &str) -> Result<RawTransactionRecord, String> {
        let txid = parse_txid(txid)?;
        self.storage.get_transaction(&txid).await?.ok_or_else(|| {
            let msg = format!("Transaction {} not found, import it first", txid);
            println!("{}", msg);
            msg
        })
    }
}

fn parse_txid(s: &str) -> Result<Txid, String> {
    Txid::from_str(s).map_err(|e| {
        let msg = format!("Invalid txid {}: {}", s, e);
        println!("{}", msg);
        msg
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let s = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize output: {}", e))?;
    println!("{}", s);
    Ok(())
}
