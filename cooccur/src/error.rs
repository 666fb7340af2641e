use thiserror::Error;

#[derive(Debug, Error)]
pub enum MiningError {
    #[error("No transactions to mine")]
    EmptyDataset,

    #[error("Invalid {name} = {value}: {reason}")]
    InvalidThreshold {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Transaction matrix has {columns} columns but {labels} item labels were given")]
    MatrixShape { columns: usize, labels: usize },

    #[error("Item label {0:?} appears more than once")]
    DuplicateLabel(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MiningError {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, reason: &'static str) -> Self {
        MiningError::InvalidThreshold {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, MiningError>;
