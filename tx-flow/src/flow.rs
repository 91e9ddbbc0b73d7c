use crate::cache::BlockHeaderCacheRef;
use crate::error::{FlowError, FlowResult};
use crate::network::NetworkSettings;
use crate::store::{UnblindingStoreRef, WitnessOutputStoreRef};
use crate::tx::{DecodedTransaction, decode_transaction, is_burn_script};
use crate::types::{AssetIdentifier, DecodedValue, EnrichedTransaction, FlowMap, RawTransactionRecord};
use elements::Txid;

/// Rebuilds what a transaction did to the wallet: a signed amount per asset
/// and the fee that was paid.
pub struct TransactionFlowComputer {
    secrets: UnblindingStoreRef,
    witness_outputs: WitnessOutputStoreRef,
    header_cache: BlockHeaderCacheRef,
    network: Option<NetworkSettings>,
}

impl TransactionFlowComputer {
    pub fn new(
        secrets: UnblindingStoreRef,
        witness_outputs: WitnessOutputStoreRef,
        header_cache: BlockHeaderCacheRef,
        network: Option<NetworkSettings>,
    ) -> Self {
        Self {
            secrets,
            witness_outputs,
            header_cache,
            network,
        }
    }

    pub fn network(&self) -> Option<&NetworkSettings> {
        self.network.as_ref()
    }

    pub async fn compute(&self, record: &RawTransactionRecord) -> FlowResult<EnrichedTransaction> {
        let tx_hex = record
            .hex
            .as_deref()
            .ok_or(FlowError::MissingTransactionData)?;
        let tx = decode_transaction(tx_hex).map_err(FlowError::Decode)?;

        // The fee is only known once both passes are done
        let (mut flow, fee_amount) = self.compute_flow(&tx).await?;

        let mut enriched = EnrichedTransaction {
            record: record.clone(),
            transaction_id: tx.id.to_string(),
            flow: FlowMap::new(),
            fee_amount,
            block_header: None,
        };

        let Some(height) = record.confirmed_height() else {
            enriched.flow = flow;
            return Ok(enriched);
        };

        let settings = self.network.as_ref().ok_or_else(|| {
            error!(
                "Cannot enrich confirmed transaction {} without an active network",
                tx.id
            );
            FlowError::NetworkNotConfigured
        })?;

        enriched.block_header = self.header_cache.get(settings, height).await?;
        apply_self_transfer_correction(&mut flow, &settings.native_asset_hex(), fee_amount);
        enriched.flow = flow;

        Ok(enriched)
    }

    /// Computes several independent records concurrently, results keep the input order.
    pub async fn compute_all(
        &self,
        records: &[RawTransactionRecord],
    ) -> Vec<FlowResult<EnrichedTransaction>> {
        futures::future::join_all(records.iter().map(|record| self.compute(record))).await
    }

    /// Output pass then input pass, returns the flow and the fee amount.
    pub async fn compute_flow(&self, tx: &DecodedTransaction) -> FlowResult<(FlowMap, u64)> {
        let mut flow = FlowMap::new();
        let mut fee_amount = 0;

        for (vout, output) in tx.outputs.iter().enumerate() {
            let vout = vout as u32;
            if output.is_fee() {
                match output.value {
                    DecodedValue::Explicit(value) => fee_amount = value,
                    DecodedValue::Confidential(_) => {
                        warn!("Fee output {}:{} has no explicit value", tx.id, vout)
                    }
                }
                continue;
            }

            if matches!(output.value, DecodedValue::Explicit(_)) && is_burn_script(&output.script) {
                debug!("Skip burn output {}:{}", tx.id, vout);
                continue;
            }

            if let Some((asset, value)) = self
                .resolve_amount(&tx.id, vout, &output.value, &output.asset)
                .await?
            {
                add_to_flow(&mut flow, asset, value as i64);
            }
        }

        for prevout in &tx.inputs {
            let Some(prev) = self.witness_outputs.get_witness_output(prevout).await? else {
                debug!("Input {} of {} is not a wallet output", prevout, tx.id);
                continue;
            };

            if let Some((asset, value)) = self
                .resolve_amount(&prevout.txid, prevout.vout, &prev.value, &prev.asset)
                .await?
            {
                add_to_flow(&mut flow, asset, -(value as i64));
            }
        }

        Ok((flow, fee_amount))
    }

    // Asset hex and amount of an output, None if it cannot be read yet
    async fn resolve_amount(
        &self,
        txid: &Txid,
        vout: u32,
        value: &DecodedValue,
        asset: &AssetIdentifier,
    ) -> FlowResult<Option<(String, u64)>> {
        match (value, asset) {
            (DecodedValue::Explicit(value), AssetIdentifier::Explicit(asset)) => {
                Ok(Some((asset.to_string(), *value)))
            }

            // Anything blinded needs the recovered secret, which carries both parts
            (DecodedValue::Confidential(_), _) | (_, AssetIdentifier::Confidential(_)) => {
                match self.secrets.get_unblinding_secret(txid, vout).await? {
                    Some(secret) => Ok(Some((secret.asset, secret.value))),
                    None => {
                        debug!("No unblinding secret for {}:{}, skipped", txid, vout);
                        Ok(None)
                    }
                }
            }
        }
    }
}

pub type TransactionFlowComputerRef = std::sync::Arc<TransactionFlowComputer>;

fn add_to_flow(flow: &mut FlowMap, asset: String, delta: i64) {
    *flow.entry(asset).or_insert(0) += delta;
}

/// A native asset delta that is exactly the fee is not a transfer.
///
/// When it is the only entry it is reported as zero, otherwise it is dropped.
pub fn apply_self_transfer_correction(flow: &mut FlowMap, native_asset: &str, fee_amount: u64) {
    let Some(native) = flow.get(native_asset).copied() else {
        return;
    };

    if native + fee_amount as i64 != 0 {
        return;
    }

    if flow.len() == 1 {
        flow.insert(native_asset.to_string(), 0);
    } else {
        flow.remove(native_asset);
    }
}
