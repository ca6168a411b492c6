use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Random source failed while generating salts: {0}")]
    RandomSource(#[from] rand::rand_core::OsError),

    #[error("Corrupt dump header")]
    CorruptHeader,

    #[error("Invalid salt count in dump")]
    InvalidSaltCount,

    #[error("Truncated salt at index {index}")]
    TruncatedSalt { index: usize },

    #[error("Invalid salt length at index {index}: want {want}, got {got}")]
    InvalidSaltLength {
        index: usize,
        want: usize,
        got: usize,
    },

    #[error("{stage}: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },
}
