use std::path::PathBuf;
use thiserror::Error;

pub type RideResult<T> = Result<T, RideError>;

#[derive(Debug, Error)]
pub enum RideError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported format {0:?}, must be one of json, yaml, yml")]
    UnsupportedFormat(String),

    #[error("track needs at least 2 points, found {0}")]
    EmptyTrack(usize),
}

impl RideError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RideError::Io {
            path: path.into(),
            source,
        }
    }
}
