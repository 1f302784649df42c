use std::io;
use std::path::PathBuf;

use crate::host::HostError;

#[derive(Debug, thiserror::Error)]
pub enum LightError {
    #[error("unsupported light category '{0}'")]
    UnsupportedCategory(String),
    #[error("'{node}' is not a light-compatible node (found {found})")]
    InvalidReference { node: String, found: String },
    #[error("malformed light file {}: {source}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed color value '{0}': expected 'r g b' or 'r g b a' with components in [0,1]")]
    MalformedColor(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Host(#[from] HostError),
}

impl LightError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        LightError::Io { context: context.into(), source }
    }

    /// Short label used by status messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LightError::UnsupportedCategory(_) => "unsupported_category",
            LightError::InvalidReference { .. } => "invalid_reference",
            LightError::MalformedRecord { .. } => "malformed_record",
            LightError::MalformedColor(_) => "malformed_color",
            LightError::Io { .. } => "io",
            LightError::Host(_) => "host",
        }
    }
}

pub type Result<T, E = LightError> = std::result::Result<T, E>;
