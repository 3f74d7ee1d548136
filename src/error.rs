use std::path::PathBuf;

/// Errors raised while gathering inputs: files, symbol definitions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid symbol file: {0}")]
    SymbolFile(String),

    #[error("invalid definition `{0}`, expected NAME=EXPR")]
    Definition(String),
}

pub type Result<T> = std::result::Result<T, Error>;
