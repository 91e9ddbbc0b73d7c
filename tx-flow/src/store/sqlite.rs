use super::{BlockHeaderStore, TransactionStore, UnblindingStore, WitnessOutputStore};
use crate::types::{
    AssetIdentifier, BlockHeader, DecodedValue, RawTransactionRecord, UnblindedOutput,
    UnblindingSecret, WitnessOutput,
};
use elements::{OutPoint, Txid};
use flow_util::{LiquidNetwork, parse_asset_id};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

// Raw columns of a wallet output row: value, value commitment, asset, asset commitment
type OutputColumns = (Option<i64>, Option<Vec<u8>>, Option<String>, Option<Vec<u8>>);

pub struct FlowStorage {
    db_path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl FlowStorage {
    pub fn open(data_dir: &Path, db_file: &str) -> Result<Self, String> {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            let msg = format!(
                "Could not create data directory at {}: {}",
                data_dir.display(),
                e
            );
            error!("{}", msg);
            msg
        })?;

        let db_path = data_dir.join(db_file);
        info!("Opening flow storage at {}", db_path.display());
        let conn = Connection::open(&db_path).map_err(|e| {
            let msg = format!(
                "Failed to open flow storage at {}: {}",
                db_path.display(),
                e
            );
            error!("{}", msg);
            msg
        })?;

        let storage = Self {
            db_path: Some(db_path),
            conn: Mutex::new(conn),
        };
        storage.init_db()?;

        Ok(storage)
    }

    pub fn open_in_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory().map_err(|e| {
            let msg = format!("Failed to open in-memory flow storage: {}", e);
            error!("{}", msg);
            msg
        })?;

        let storage = Self {
            db_path: None,
            conn: Mutex::new(conn),
        };
        storage.init_db()?;

        Ok(storage)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init_db(&self) -> Result<(), String> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS transactions (
                txid TEXT NOT NULL PRIMARY KEY,
                height INTEGER,
                hex TEXT
            );

            CREATE TABLE IF NOT EXISTS unblinding_secrets (
                txid TEXT NOT NULL,
                vout INTEGER NOT NULL,
                value INTEGER NOT NULL,
                asset TEXT NOT NULL,
                asset_blinding_factor TEXT NOT NULL,
                value_blinding_factor TEXT NOT NULL,
                PRIMARY KEY (txid, vout)
            );

            -- Exactly one of value/value_commitment and of asset/asset_commitment is set
            CREATE TABLE IF NOT EXISTS wallet_outputs (
                txid TEXT NOT NULL,
                vout INTEGER NOT NULL,
                value INTEGER,
                value_commitment BLOB,
                asset TEXT,
                asset_commitment BLOB,
                spent INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (txid, vout)
            );

            CREATE TABLE IF NOT EXISTS block_headers (
                network TEXT NOT NULL,
                height INTEGER NOT NULL,
                hash TEXT NOT NULL,
                prev_block_hash TEXT NOT NULL,
                merkle_root TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                version INTEGER NOT NULL,
                PRIMARY KEY (network, height)
            );
            ",
        )
        .map_err(|e| {
            let msg = format!("Failed to initialize flow storage: {}", e);
            error!("{}", msg);
            msg
        })
    }

    pub fn put_unblinding_secret(
        &self,
        txid: &Txid,
        vout: u32,
        secret: &UnblindingSecret,
    ) -> Result<(), String> {
        // Secrets never change once recovered, a conflicting write is a bug upstream
        if let Some(existing) = self.load_unblinding_secret(txid, vout)? {
            if existing == *secret {
                return Ok(());
            }

            let msg = format!(
                "Conflicting unblinding secret for {}:{}, stored {:?}, new {:?}",
                txid, vout, existing, secret
            );
            error!("{}", msg);
            return Err(msg);
        }

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO unblinding_secrets
                (txid, vout, value, asset, asset_blinding_factor, value_blinding_factor)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txid.to_string(),
                vout,
                secret.value as i64,
                secret.asset,
                secret.asset_blinding_factor,
                secret.value_blinding_factor
            ],
        )
        .map_err(|e| {
            let msg = format!("Failed to store unblinding secret {}:{}: {}", txid, vout, e);
            error!("{}", msg);
            msg
        })?;

        Ok(())
    }

    fn load_unblinding_secret(
        &self,
        txid: &Txid,
        vout: u32,
    ) -> Result<Option<UnblindingSecret>, String> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT value, asset, asset_blinding_factor, value_blinding_factor
            FROM unblinding_secrets WHERE txid = ?1 AND vout = ?2",
            params![txid.to_string(), vout],
            |row| {
                Ok(UnblindingSecret {
                    value: row.get::<_, i64>(0)? as u64,
                    asset: row.get(1)?,
                    asset_blinding_factor: row.get(2)?,
                    value_blinding_factor: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| {
            let msg = format!("Failed to load unblinding secret {}:{}: {}", txid, vout, e);
            error!("{}", msg);
            msg
        })
    }

    pub fn put_wallet_output(&self, outpoint: &OutPoint, output: &WitnessOutput) -> Result<(), String> {
        let (value, value_commitment) = match &output.value {
            DecodedValue::Explicit(v) => (Some(*v as i64), None),
            DecodedValue::Confidential(c) => (None, Some(c.clone())),
        };
        let (asset, asset_commitment) = match &output.asset {
            AssetIdentifier::Explicit(id) => (Some(id.to_string()), None),
            AssetIdentifier::Confidential(c) => (None, Some(c.clone())),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO wallet_outputs
                (txid, vout, value, value_commitment, asset, asset_commitment, spent)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6,
                COALESCE((SELECT spent FROM wallet_outputs WHERE txid = ?1 AND vout = ?2), 0))",
            params![
                outpoint.txid.to_string(),
                outpoint.vout,
                value,
                value_commitment,
                asset,
                asset_commitment
            ],
        )
        .map_err(|e| {
            let msg = format!("Failed to store wallet output {}: {}", outpoint, e);
            error!("{}", msg);
            msg
        })?;

        Ok(())
    }

    // Returns false if the output is unknown to the wallet
    pub fn mark_output_spent(&self, outpoint: &OutPoint) -> Result<bool, String> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                "UPDATE wallet_outputs SET spent = 1 WHERE txid = ?1 AND vout = ?2",
                params![outpoint.txid.to_string(), outpoint.vout],
            )
            .map_err(|e| {
                let msg = format!("Failed to mark output {} spent: {}", outpoint, e);
                error!("{}", msg);
                msg
            })?;

        Ok(changed > 0)
    }

    /// Unspent wallet outputs together with their secret, when one was recovered.
    pub fn list_unspent_outputs(&self) -> Result<Vec<UnblindedOutput>, String> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT w.txid, w.vout, s.value, s.asset, s.asset_blinding_factor, s.value_blinding_factor
                FROM wallet_outputs w
                LEFT JOIN unblinding_secrets s ON w.txid = s.txid AND w.vout = s.vout
                WHERE w.spent = 0
                ORDER BY w.txid, w.vout",
            )
            .map_err(|e| {
                let msg = format!("Failed to prepare unspent outputs query: {}", e);
                error!("{}", msg);
                msg
            })?;

        let rows = stmt
            .query_map([], |row| {
                let txid: String = row.get(0)?;
                let vout: u32 = row.get(1)?;
                let value: Option<i64> = row.get(2)?;
                let secret = match value {
                    Some(value) => Some(UnblindingSecret {
                        value: value as u64,
                        asset: row.get(3)?,
                        asset_blinding_factor: row.get(4)?,
                        value_blinding_factor: row.get(5)?,
                    }),
                    None => None,
                };
                Ok((txid, vout, secret))
            })
            .map_err(|e| {
                let msg = format!("Failed to query unspent outputs: {}", e);
                error!("{}", msg);
                msg
            })?;

        let mut outputs = Vec::new();
        for row in rows {
            let (txid, vout, unblinding_secret) = row.map_err(|e| {
                let msg = format!("Failed to read unspent output row: {}", e);
                error!("{}", msg);
                msg
            })?;
            let txid = Txid::from_str(&txid).map_err(|e| {
                let msg = format!("Invalid txid {} in storage: {}", txid, e);
                error!("{}", msg);
                msg
            })?;

            outputs.push(UnblindedOutput {
                outpoint: OutPoint::new(txid, vout),
                unblinding_secret,
            });
        }

        Ok(outputs)
    }

    fn load_wallet_output(&self, outpoint: &OutPoint) -> Result<Option<WitnessOutput>, String> {
        let columns: Option<OutputColumns> = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                "SELECT value, value_commitment, asset, asset_commitment
                FROM wallet_outputs WHERE txid = ?1 AND vout = ?2",
                params![outpoint.txid.to_string(), outpoint.vout],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(|e| {
                let msg = format!("Failed to load wallet output {}: {}", outpoint, e);
                error!("{}", msg);
                msg
            })?
        };

        let Some((value, value_commitment, asset, asset_commitment)) = columns else {
            return Ok(None);
        };

        let value = match value {
            Some(v) => DecodedValue::Explicit(v as u64),
            None => DecodedValue::Confidential(value_commitment.unwrap_or_default()),
        };
        let asset = match asset {
            Some(hex) => AssetIdentifier::Explicit(parse_asset_id(&hex)?),
            None => AssetIdentifier::Confidential(asset_commitment.unwrap_or_default()),
        };

        Ok(Some(WitnessOutput { value, asset }))
    }

    fn load_transaction(&self, txid: &Txid) -> Result<Option<RawTransactionRecord>, String> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT height, hex FROM transactions WHERE txid = ?1",
            params![txid.to_string()],
            |row| {
                Ok(RawTransactionRecord {
                    height: row.get(0)?,
                    hex: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(|e| {
            let msg = format!("Failed to load transaction {}: {}", txid, e);
            error!("{}", msg);
            msg
        })
    }

    fn save_transaction(&self, txid: &Txid, record: &RawTransactionRecord) -> Result<(), String> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO transactions (txid, height, hex) VALUES (?1, ?2, ?3)",
            params![txid.to_string(), record.height, record.hex],
        )
        .map_err(|e| {
            let msg = format!("Failed to store transaction {}: {}", txid, e);
            error!("{}", msg);
            msg
        })?;

        Ok(())
    }

    fn load_block_header(
        &self,
        network: LiquidNetwork,
        height: u32,
    ) -> Result<Option<BlockHeader>, String> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT hash, prev_block_hash, merkle_root, timestamp, version
            FROM block_headers WHERE network = ?1 AND height = ?2",
            params![network.as_str(), height],
            |row| {
                Ok(BlockHeader {
                    height,
                    hash: row.get(0)?,
                    prev_block_hash: row.get(1)?,
                    merkle_root: row.get(2)?,
                    timestamp: row.get(3)?,
                    version: row.get(4)?,
                })
            },
        )
        .optional()
        .map_err(|e| {
            let msg = format!(
                "Failed to load block header {} at {}: {}",
                network, height, e
            );
            error!("{}", msg);
            msg
        })
    }

    fn save_block_header(&self, network: LiquidNetwork, header: &BlockHeader) -> Result<(), String> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO block_headers
                (network, height, hash, prev_block_hash, merkle_root, timestamp, version)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                network.as_str(),
                header.height,
                header.hash,
                header.prev_block_hash,
                header.merkle_root,
                header.timestamp,
                header.version
            ],
        )
        .map_err(|e| {
            let msg = format!(
                "Failed to store block header {} at {}: {}",
                network, header.height, e
            );
            error!("{}", msg);
            msg
        })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl UnblindingStore for FlowStorage {
    async fn get_unblinding_secret(
        &self,
        txid: &Txid,
        vout: u32,
    ) -> Result<Option<UnblindingSecret>, String> {
        self.load_unblinding_secret(txid, vout)
    }
}

#[async_trait::async_trait]
impl WitnessOutputStore for FlowStorage {
    async fn get_witness_output(
        &self,
        outpoint: &OutPoint,
    ) -> Result<Option<WitnessOutput>, String> {
        self.load_wallet_output(outpoint)
    }
}

#[async_trait::async_trait]
impl BlockHeaderStore for FlowStorage {
    async fn get_block_header(
        &self,
        network: LiquidNetwork,
        height: u32,
    ) -> Result<Option<BlockHeader>, String> {
        self.load_block_header(network, height)
    }

    async fn put_block_header(
        &self,
        network: LiquidNetwork,
        header: &BlockHeader,
    ) -> Result<(), String> {
        self.save_block_header(network, header)
    }
}

#[async_trait::async_trait]
impl TransactionStore for FlowStorage {
    async fn get_transaction(&self, txid: &Txid) -> Result<Option<RawTransactionRecord>, String> {
        self.load_transaction(txid)
    }

    async fn put_transaction(
        &self,
        txid: &Txid,
        record: &RawTransactionRecord,
    ) -> Result<(), String> {
        self.save_transaction(txid, record)
    }
}

pub type FlowStorageRef = std::sync::Arc<FlowStorage>;
