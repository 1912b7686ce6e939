use serde::{Deserialize, Serialize};

pub const UPDATE_MARKER_FILE_NAME: &str = "updated";

/// Sentinel written by `minishift update` and consumed once on the next run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateMarker {
    #[serde(rename = "PreviousVersion", default)]
    pub previous_version: String,
    #[serde(rename = "InstallAddon", default)]
    pub install_addon: bool,
}

impl UpdateMarker {
    /// Tolerant parse: malformed content yields the zero marker and the parse
    /// error message so the caller can log it.
    pub fn parse_lenient(content: &str) -> (Self, Option<String>) {
        match serde_json::from_str::<Self>(content) {
            Ok(marker) => (marker, None),
            Err(err) => (Self::default(), Some(err.to_string())),
        }
    }
}
