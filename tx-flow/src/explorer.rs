use crate::store::UnblindingStore;
use crate::tx::DecodedTransaction;
use flow_util::reverse_hex;

/// One `value,asset,vbf,abf` entry per readable output, blinding factors
/// reversed to the explorer's byte order.
pub async fn blinded_output_params(
    tx: &DecodedTransaction,
    secrets: &dyn UnblindingStore,
) -> Result<Vec<String>, String> {
    let mut params = Vec::new();
    for (vout, output) in tx.outputs.iter().enumerate() {
        if output.script.is_empty() {
            continue;
        }

        let Some(secret) = secrets.get_unblinding_secret(&tx.id, vout as u32).await? else {
            continue;
        };

        params.push(format!(
            "{},{},{},{}",
            secret.value,
            secret.asset,
            reverse_hex(&secret.value_blinding_factor)?,
            reverse_hex(&secret.asset_blinding_factor)?
        ));
    }

    Ok(params)
}

pub fn blinded_explorer_url(base_url: &str, txid: &str, params: &[String]) -> String {
    let base_url = base_url.trim_end_matches('/');
    if params.is_empty() {
        return format!("{}/tx/{}", base_url, txid);
    }

    format!("{}/tx/{}#blinded={}", base_url, txid, params.join(","))
}
