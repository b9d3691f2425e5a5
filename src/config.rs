//! Ride configuration files.
//!
//! Every section and field is optional; anything missing keeps its default.

use crate::error::{RideError, RideResult};
use crate::sim::{CarParams, MeshParams, TrackParams, TrainParams};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RideConfig {
    pub track: TrackParams,
    pub mesh: MeshParams,
    pub train: TrainParams,
    pub car: CarParams,
}

impl RideConfig {
    pub const ACCEPTED_FORMATS: &'static [&'static str] = &["yaml", "yml", "json"];

    /// Reads a config file, picking the format from its extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RideResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or_default();
        if !Self::accepts(extension) {
            return Err(RideError::UnsupportedFormat(extension.to_string()));
        }
        let contents = fs::read_to_string(path).map_err(|e| RideError::io(path, e))?;
        Self::from_str(&contents, extension)
    }

    /// Parses `contents` as `format` (`json`, `yaml` or `yml`).
    pub fn from_str(contents: &str, format: &str) -> RideResult<Self> {
        match normalize_format(format).as_str() {
            "yaml" | "yml" => Ok(serde_yaml::from_str(contents)?),
            "json" => Ok(serde_json::from_str(contents)?),
            _ => Err(RideError::UnsupportedFormat(format.to_string())),
        }
    }

    pub fn to_str(&self, format: &str) -> RideResult<String> {
        match normalize_format(format).as_str() {
            "yaml" | "yml" => Ok(serde_yaml::to_string(self)?),
            "json" => Ok(serde_json::to_string_pretty(self)?),
            _ => Err(RideError::UnsupportedFormat(format.to_string())),
        }
    }

    fn accepts(format: &str) -> bool {
        Self::ACCEPTED_FORMATS.contains(&normalize_format(format).as_str())
    }
}

fn normalize_format(format: &str) -> String {
    format.trim_start_matches('.').to_lowercase()
}
