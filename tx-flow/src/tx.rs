use crate::types::{AssetIdentifier, DecodedValue, WitnessOutput};
use elements::confidential::{Asset, Value};
use elements::opcodes::all::OP_RETURN;
use elements::script::Instruction;
use elements::{OutPoint, Script, Transaction, TxOut, Txid};

impl From<&Value> for DecodedValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Explicit(amount) => DecodedValue::Explicit(*amount),
            Value::Confidential(_) => {
                DecodedValue::Confidential(elements::encode::serialize(value))
            }
            // A null value has no readable amount, treat it like an unknown commitment
            Value::Null => DecodedValue::Confidential(Vec::new()),
        }
    }
}

impl From<&Asset> for AssetIdentifier {
    fn from(asset: &Asset) -> Self {
        match asset {
            Asset::Explicit(id) => AssetIdentifier::Explicit(*id),
            Asset::Confidential(_) => {
                AssetIdentifier::Confidential(elements::encode::serialize(asset))
            }
            Asset::Null => AssetIdentifier::Confidential(Vec::new()),
        }
    }
}

impl From<&TxOut> for WitnessOutput {
    fn from(output: &TxOut) -> Self {
        Self {
            value: DecodedValue::from(&output.value),
            asset: AssetIdentifier::from(&output.asset),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecodedOutput {
    pub script: Script,
    pub value: DecodedValue,
    pub asset: AssetIdentifier,
}

impl DecodedOutput {
    pub fn is_fee(&self) -> bool {
        self.script.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DecodedTransaction {
    pub id: Txid,
    pub outputs: Vec<DecodedOutput>,
    pub inputs: Vec<OutPoint>,
}

impl From<&Transaction> for DecodedTransaction {
    fn from(tx: &Transaction) -> Self {
        let outputs = tx
            .output
            .iter()
            .map(|out| DecodedOutput {
                script: out.script_pubkey.clone(),
                value: DecodedValue::from(&out.value),
                asset: AssetIdentifier::from(&out.asset),
            })
            .collect();

        let inputs = tx.input.iter().map(|input| input.previous_output).collect();

        Self {
            id: tx.txid(),
            outputs,
            inputs,
        }
    }
}

pub fn parse_transaction(tx_hex: &str) -> Result<Transaction, String> {
    let bytes = hex::decode(tx_hex.trim()).map_err(|e| {
        let msg = format!("Invalid transaction hex: {}", e);
        error!("{}", msg);
        msg
    })?;

    elements::encode::deserialize(&bytes).map_err(|e| {
        let msg = format!("Failed to deserialize transaction: {}", e);
        error!("{}", msg);
        msg
    })
}

pub fn decode_transaction(tx_hex: &str) -> Result<DecodedTransaction, String> {
    let tx = parse_transaction(tx_hex)?;
    Ok(DecodedTransaction::from(&tx))
}

// A script is a provable burn if any decodable instruction is OP_RETURN
pub fn is_burn_script(script: &Script) -> bool {
    for instruction in script.instructions() {
        match instruction {
            Ok(Instruction::Op(op)) if op == OP_RETURN => return true,
            Ok(_) => {}
            Err(_) => break,
        }
    }

    false
}
