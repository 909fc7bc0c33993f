use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CutoffError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Could not resolve client {handle} on server {scope}: {reason}")]
    IdentityResolution {
        scope: u64,
        handle: u16,
        reason: String,
    },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl CutoffError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CutoffError>;
