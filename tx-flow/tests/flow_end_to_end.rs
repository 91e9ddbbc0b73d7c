use elements::{OutPoint, Txid};
use flow_util::{LiquidNetwork, UNCONFIRMED_HEIGHT, parse_asset_id};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tx_flow::{
    BlockHeader, BlockHeaderCache, ChainSource, ChainSourceFactory, FlowError, FlowMap,
    FlowStorage, NetworkSettings, RawTransactionRecord, TransactionFlowComputer,
    UnblindingSecret, WitnessOutput, decode_transaction,
};

// x coordinate of the secp256k1 generator, a valid commitment payload
const GENERATOR_X: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
const WALLET_SCRIPT: &str = "0014751e76e8199196d454941c45d1b3a323f1433bd6";

// Byte-symmetric ids so internal and display order agree
fn asset_hex(byte: &str) -> String {
    byte.repeat(32)
}

enum RawValue {
    Explicit(u64),
    Confidential,
}

struct RawOutput {
    asset: String,
    value: RawValue,
    script: Vec<u8>,
}

// Serializes an unsigned elements transaction without witnesses
fn encode_tx(inputs: &[(String, u32)], outputs: &[RawOutput]) -> String {
    let mut raw = Vec::new();
    raw.extend_from_slice(&2u32.to_le_bytes());
    raw.push(0x00); // no witness

    raw.push(inputs.len() as u8);
    for (txid, vout) in inputs {
        let mut txid = hex::decode(txid).unwrap();
        txid.reverse();
        raw.extend_from_slice(&txid);
        raw.extend_from_slice(&vout.to_le_bytes());
        raw.push(0x00); // empty script_sig
        raw.extend_from_slice(&0xffff_fffeu32.to_le_bytes());
    }

    raw.push(outputs.len() as u8);
    for output in outputs {
        let mut asset = hex::decode(&output.asset).unwrap();
        asset.reverse();
        raw.push(0x01);
        raw.extend_from_slice(&asset);

        match output.value {
            RawValue::Explicit(value) => {
                raw.push(0x01);
                raw.extend_from_slice(&value.to_be_bytes());
            }
            RawValue::Confidential => {
                raw.push(0x08);
                raw.extend_from_slice(&hex::decode(GENERATOR_X).unwrap());
            }
        }

        raw.push(0x00); // null nonce
        raw.push(output.script.len() as u8);
        raw.extend_from_slice(&output.script);
    }

    raw.extend_from_slice(&0u32.to_le_bytes());
    hex::encode(raw)
}

fn wallet_script() -> Vec<u8> {
    hex::decode(WALLET_SCRIPT).unwrap()
}

fn fee(asset: &str, value: u64) -> RawOutput {
    RawOutput {
        asset: asset.to_string(),
        value: RawValue::Explicit(value),
        script: Vec::new(),
    }
}

struct CountingSource {
    fetches: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ChainSource for CountingSource {
    async fn fetch_block_header(&self, height: u32) -> Result<Option<BlockHeader>, String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Some(BlockHeader {
            height,
            hash: format!("{:064x}", height + 1),
            prev_block_hash: format!("{:064x}", height),
            merkle_root: "11".repeat(32),
            timestamp: 1_700_000_000,
            version: 0x20000000,
        }))
    }
}

struct CountingFactory {
    fetches: Arc<AtomicUsize>,
}

impl ChainSourceFactory for CountingFactory {
    fn connect(&self) -> Result<Box<dyn ChainSource>, String> {
        Ok(Box::new(CountingSource {
            fetches: self.fetches.clone(),
        }))
    }
}

struct Fixture {
    storage: Arc<FlowStorage>,
    computer: TransactionFlowComputer,
    fetches: Arc<AtomicUsize>,
}

fn fixture(native: &str, with_network: bool) -> Fixture {
    let storage = Arc::new(FlowStorage::open_in_memory().unwrap());
    let fetches = Arc::new(AtomicUsize::new(0));
    let factory = Arc::new(CountingFactory {
        fetches: fetches.clone(),
    });
    let settings = NetworkSettings::new(LiquidNetwork::Regtest, factory)
        .with_native_asset(parse_asset_id(native).unwrap());

    let cache = Arc::new(BlockHeaderCache::new(storage.clone(), 32));
    let computer = TransactionFlowComputer::new(
        storage.clone(),
        storage.clone(),
        cache,
        with_network.then_some(settings),
    );

    Fixture {
        storage,
        computer,
        fetches,
    }
}

fn secret(value: u64, asset: &str) -> UnblindingSecret {
    UnblindingSecret {
        value,
        asset: asset.to_string(),
        asset_blinding_factor: "0a".repeat(32),
        value_blinding_factor: "0b".repeat(32),
    }
}

// Fee 500, one confidential output of 100000 "aa", spends a wallet output of 100500 "aa"
fn self_transfer_tx(f: &Fixture) -> String {
    let native = asset_hex("aa");
    let prev_txid = asset_hex("bb");

    let tx_hex = encode_tx(
        &[(prev_txid.clone(), 0)],
        &[
            RawOutput {
                asset: native.clone(),
                value: RawValue::Confidential,
                script: wallet_script(),
            },
            fee(&native, 500),
        ],
    );

    let txid = decode_transaction(&tx_hex).unwrap().id;
    f.storage
        .put_unblinding_secret(&txid, 0, &secret(100_000, &native))
        .unwrap();
    f.storage
        .put_wallet_output(
            &OutPoint::new(Txid::from_str(&prev_txid).unwrap(), 0),
            &WitnessOutput::explicit(parse_asset_id(&native).unwrap(), 100_500),
        )
        .unwrap();

    tx_hex
}

#[tokio::test]
async fn test_confirmed_self_transfer_reports_zero() {
    let f = fixture(&asset_hex("aa"), true);
    let tx_hex = self_transfer_tx(&f);

    let record = RawTransactionRecord::new(&tx_hex, Some(120));
    let enriched = f.computer.compute(&record).await.unwrap();

    assert_eq!(enriched.fee_amount, 500);
    assert_eq!(enriched.flow, FlowMap::from([(asset_hex("aa"), 0)]));
    assert_eq!(enriched.record, record);
    assert_eq!(
        enriched.transaction_id,
        decode_transaction(&tx_hex).unwrap().id.to_string()
    );

    let header = enriched.block_header.unwrap();
    assert_eq!(header.height, 120);
    assert_eq!(f.fetches.load(Ordering::SeqCst), 1);

    // Header is cached now
    let again = f.computer.compute(&record).await.unwrap();
    assert_eq!(again.block_header, Some(header));
    assert_eq!(f.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unconfirmed_skips_enrichment_and_correction() {
    let f = fixture(&asset_hex("aa"), true);
    let tx_hex = self_transfer_tx(&f);

    for height in [None, Some(UNCONFIRMED_HEIGHT)] {
        let record = RawTransactionRecord::new(&tx_hex, height);
        let enriched = f.computer.compute(&record).await.unwrap();

        assert_eq!(enriched.fee_amount, 500);
        assert_eq!(enriched.flow, FlowMap::from([(asset_hex("aa"), -500)]));
        assert!(enriched.block_header.is_none());
    }
    assert_eq!(f.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_confirmed_without_network() {
    let f = fixture(&asset_hex("aa"), false);
    let tx_hex = self_transfer_tx(&f);

    let record = RawTransactionRecord::new(&tx_hex, Some(120));
    assert_eq!(
        f.computer.compute(&record).await.unwrap_err(),
        FlowError::NetworkNotConfigured
    );

    // Unconfirmed transactions never need the network
    let record = RawTransactionRecord::new(&tx_hex, None);
    assert!(f.computer.compute(&record).await.is_ok());
}

#[tokio::test]
async fn test_fee_only_native_dropped_when_other_asset_moves() {
    let native = asset_hex("aa");
    let token = asset_hex("cc");
    let f = fixture(&native, true);

    let prev_txid = asset_hex("dd");
    f.storage
        .put_wallet_output(
            &OutPoint::new(Txid::from_str(&prev_txid).unwrap(), 1),
            &WitnessOutput::explicit(parse_asset_id(&native).unwrap(), 1_000),
        )
        .unwrap();

    let tx_hex = encode_tx(
        &[(prev_txid, 1), (asset_hex("ee"), 0)],
        &[
            RawOutput {
                asset: token.clone(),
                value: RawValue::Explicit(5_000),
                script: wallet_script(),
            },
            RawOutput {
                asset: native.clone(),
                value: RawValue::Explicit(500),
                script: wallet_script(),
            },
            fee(&native, 500),
        ],
    );

    let enriched = f
        .computer
        .compute(&RawTransactionRecord::new(&tx_hex, Some(7)))
        .await
        .unwrap();
    assert_eq!(enriched.fee_amount, 500);
    assert_eq!(enriched.flow, FlowMap::from([(token, 5_000)]));
}

#[tokio::test]
async fn test_burn_and_unresolved_outputs() {
    let native = asset_hex("aa");
    let f = fixture(&native, true);

    // OP_RETURN followed by a small push
    let burn_script = vec![0x6a, 0x02, 0xbe, 0xef];
    let tx_hex = encode_tx(
        &[(asset_hex("bb"), 5)],
        &[
            RawOutput {
                asset: native.clone(),
                value: RawValue::Explicit(250_000),
                script: burn_script,
            },
            RawOutput {
                asset: native.clone(),
                value: RawValue::Confidential,
                script: wallet_script(),
            },
            fee(&native, 42),
        ],
    );

    let enriched = f
        .computer
        .compute(&RawTransactionRecord::new(&tx_hex, Some(3)))
        .await
        .unwrap();

    // Worst case: nothing readable, only the fee
    assert!(enriched.flow.is_empty());
    assert_eq!(enriched.fee_amount, 42);
    assert!(enriched.block_header.is_some());
}

#[tokio::test]
async fn test_enriched_json() {
    let f = fixture(&asset_hex("aa"), true);
    let tx_hex = self_transfer_tx(&f);

    let enriched = f
        .computer
        .compute(&RawTransactionRecord::new(&tx_hex, Some(9)))
        .await
        .unwrap();
    let value = serde_json::to_value(&enriched).unwrap();

    assert_eq!(value["height"], 9);
    assert_eq!(value["hex"], tx_hex);
    assert_eq!(value["feeAmount"], 500);
    assert_eq!(value["flow"][asset_hex("aa")], 0);
    assert_eq!(value["blockHeader"]["height"], 9);
}
