// Service names
pub const TX_FLOW_SERVICE_NAME: &str = "tx-flow";
pub const TX_FLOW_CLI_TOOL_NAME: &str = "tx-flow-cli";

// Directory constants
pub const LIQUID_FLOW_ROOT_DIR: &str = ".liquid-flow";

// Storage file names
pub const TX_FLOW_DB_FILE: &str = "tx_flow.db";
pub const TX_FLOW_CONFIG_FILE: &str = "config.toml";

// Height reported for a transaction that has not been confirmed yet
pub const UNCONFIRMED_HEIGHT: i64 = -1;
