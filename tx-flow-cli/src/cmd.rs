use clap::{Args, Parser, Subcommand};
use flow_util::LiquidNetwork;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tx-flow-cli")]
#[command(about = "Per-asset flow of Liquid wallet transactions")]
pub struct Cli {
    /// Directory holding config.toml and the database
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Active network, overrides the config file
    #[arg(short, long, value_name = "NETWORK")]
    pub network: Option<LiquidNetwork>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the flow and fee of a transaction
    Flow {
        #[clap(flatten)]
        source: TxSource,

        /// Confirmation height, -1 for unconfirmed
        #[arg(long, allow_hyphen_values = true, value_name = "HEIGHT")]
        height: Option<i64>,
    },

    /// Store a raw transaction record
    ImportTx {
        #[arg(long, value_name = "HEX")]
        hex: String,

        #[arg(long, allow_hyphen_values = true, value_name = "HEIGHT")]
        height: Option<i64>,
    },

    /// Store the recovered secret of a confidential output
    ImportSecret {
        #[arg(long)]
        txid: String,

        #[arg(long)]
        vout: u32,

        #[arg(long)]
        value: u64,

        #[arg(long, value_name = "ASSET_HEX")]
        asset: String,

        /// Asset blinding factor, hex of the raw 32 bytes
        #[arg(long, value_name = "HEX")]
        abf: String,

        /// Value blinding factor, hex of the raw 32 bytes
        #[arg(long, value_name = "HEX")]
        vbf: String,
    },

    /// Register an output owned by the wallet
    ImportOutput {
        #[arg(long)]
        txid: String,

        #[arg(long)]
        vout: u32,

        #[clap(flatten)]
        value: OutputValue,
    },

    /// Mark a wallet output as spent
    Spend {
        #[arg(long)]
        txid: String,

        #[arg(long)]
        vout: u32,
    },

    /// Balance per asset of the unspent wallet outputs
    Balance,

    /// Block header at a height, fetched once then cached
    Header {
        #[arg(long)]
        height: u32,
    },

    /// Explorer link of a stored transaction with its blinding data
    ExplorerUrl {
        #[arg(long)]
        txid: String,
    },
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TxSource {
    /// Raw transaction hex
    #[arg(long, value_name = "HEX")]
    pub hex: Option<String>,

    /// Id of a previously imported transaction
    #[arg(long, value_name = "TXID")]
    pub txid: Option<String>,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false, id = "output_value")]
pub struct OutputValue {
    /// Explicit amount and asset, given as AMOUNT:ASSET_HEX
    #[arg(long, value_parser = parse_explicit, value_name = "AMOUNT:ASSET")]
    pub explicit: Option<(u64, String)>,

    /// Value and asset are blinded, readable once a secret is imported
    #[arg(long, default_value_t = false)]
    pub confidential: bool,
}

fn parse_explicit(s: &str) -> Result<(u64, String), String> {
    let Some((amount, asset)) = s.split_once(':') else {
        return Err(format!("Invalid explicit output {}, expected AMOUNT:ASSET", s));
    };

    let amount = amount
        .parse::<u64>()
        .map_err(|e| format!("Invalid amount {}: {}", amount, e))?;
    if asset.len() != 64 {
        return Err(format!("Invalid asset {}, expected 64 hex chars", asset));
    }

    Ok((amount, asset.to_string()))
}
