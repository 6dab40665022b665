use std::io;
use std::path::PathBuf;

/// Failures that abort a dump run.
///
/// Everything that goes wrong inside a single page is logged and absorbed by
/// the collector; only these reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("dump file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read dump: {0}")]
    Io(#[from] io::Error),

    #[error("failed to load vocabulary {}: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid declension pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
