/// Top-level analysis error type. Only configuration and index-access
/// failures are terminal (§7); everything else degrades per file or per
/// symbol and is logged rather than propagated as an error.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("syntax inventory error: {0}")]
    Syntax(#[from] SyntaxError),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("path does not exist or is not a directory: {0}")]
    InvalidPath(String),

    #[error("index store path does not exist or is not a directory: {0}")]
    InvalidIndexStorePath(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Fatal failures reading the compiler index (§7: "Index corruption / open
/// failure: fatal; exit 1; clean up any temporary database path").
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    #[error("index store is unreadable or corrupt: {0}")]
    Unreadable(String),

    #[error("io error reading index: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to deserialize index snapshot: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Non-fatal: a single file's parse failure. Carried as a value (not
/// propagated as `Err`) so Stage 1 can log and skip while continuing with
/// the rest of the tree (§4.1 "Failure").
#[derive(thiserror::Error, Debug, Clone)]
#[error("parse error in {path}: {message}")]
pub struct SyntaxError {
    pub path: std::path::PathBuf,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
