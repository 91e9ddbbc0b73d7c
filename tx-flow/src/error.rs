use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("transaction record carries no raw transaction data")]
    MissingTransactionData,

    #[error("no active network is configured")]
    NetworkNotConfigured,

    #[error("failed to decode transaction: {0}")]
    Decode(String),

    // Storage and transport failures of collaborators, passed through as is
    #[error("{0}")]
    Collaborator(String),
}

impl From<String> for FlowError {
    fn from(msg: String) -> Self {
        FlowError::Collaborator(msg)
    }
}

pub type FlowResult<T> = Result<T, FlowError>;
