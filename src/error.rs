/// Error type shared by the storage, host and export layers
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A browser API call was rejected
    #[error("host call failed: {0}")]
    Host(String),

    #[error("failed to decode stored value {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no tabs selected for export")]
    EmptySelection,
}

impl Error {
    pub fn host(context: &str, cause: impl std::fmt::Debug) -> Error {
        Error::Host(format!("{}: {:?}", context, cause))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
