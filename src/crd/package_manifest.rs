//! OLM package manifest

use serde::{Deserialize, Serialize};

use super::ClusterServiceVersion;

/// Package descriptor pointing each channel at its current CSV
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub package_name: String,
    pub channels: Vec<PackageChannel>,
}

/// A channel and the CSV it currently serves
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageChannel {
    pub name: String,
    #[serde(rename = "currentCSV")]
    pub current_csv: String,
}

impl PackageManifest {
    /// Build a single-channel package for one operator release
    pub fn new(operator_name: &str, channel_name: &str, version: &str) -> Self {
        Self {
            package_name: operator_name.to_string(),
            channels: vec![PackageChannel {
                name: channel_name.to_string(),
                current_csv: ClusterServiceVersion::versioned_name(operator_name, version),
            }],
        }
    }
}
