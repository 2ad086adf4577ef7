use std::path::PathBuf;
use thiserror::Error;

/// Failures the importer distinguishes. Anything else travels as `anyhow::Error`
/// and aborts the run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("no data dirs with json found under {}", .0.display())]
    NoDataDirs(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ImportError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ImportError::SourceNotFound(_) => 2,
            ImportError::NoDataDirs(_) => 3,
            ImportError::Read { .. } | ImportError::Parse { .. } => 1,
        }
    }
}

/// Exit code for an error that reached `main`.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ImportError>()
        .map(ImportError::exit_code)
        .unwrap_or(1)
}
