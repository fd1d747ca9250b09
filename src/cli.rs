//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::generator::{BundleRequest, DEFAULT_CSV_TEMPLATE, DEFAULT_MANIFESTS_DIR};

/// Previous version argument meaning "no previous version"
pub const NO_PREVIOUS_VERSION: &str = "__undefined__";

/// Generate an OLM bundle for one operator release
#[derive(Parser, Debug)]
#[command(name = "olm-bundle-generator")]
#[command(version)]
#[command(about = "Generate an OLM bundle from operator manifests", long_about = None)]
pub struct Cli {
    /// Directory the versioned bundle directory is created in
    pub operator_dir: PathBuf,

    /// Operator name; also the name of its Deployment and service account
    pub operator_name: String,

    /// Namespace the operator is installed into
    pub operator_namespace: String,

    /// Version being generated
    pub operator_version: String,

    /// Container image of the operator
    pub operator_image: String,

    /// Catalog channel
    pub channel_name: String,

    /// "true" to support the MultiNamespace install mode
    pub multi_namespace: String,

    /// CSV replaced by this release, or __undefined__
    pub previous_version: String,

    /// Directory holding the operator manifests
    #[arg(long, env = "BUNDLE_MANIFESTS_DIR", default_value = DEFAULT_MANIFESTS_DIR)]
    pub manifests_dir: PathBuf,

    /// ClusterServiceVersion template
    #[arg(long, env = "BUNDLE_CSV_TEMPLATE", default_value = DEFAULT_CSV_TEMPLATE)]
    pub csv_template: PathBuf,

    /// Emit logs as JSON
    #[arg(long, env = "BUNDLE_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    /// Turn the parsed arguments into a generation request
    pub fn into_request(self) -> BundleRequest {
        BundleRequest {
            multi_namespace: parse_multi_namespace(&self.multi_namespace),
            previous_version: parse_previous_version(&self.previous_version),
            operator_dir: self.operator_dir,
            operator_name: self.operator_name,
            operator_namespace: self.operator_namespace,
            operator_version: self.operator_version,
            operator_image: self.operator_image,
            channel_name: self.channel_name,
            manifests_dir: self.manifests_dir,
            csv_template: self.csv_template,
        }
    }
}

/// Only the literal `true` enables MultiNamespace
pub fn parse_multi_namespace(value: &str) -> bool {
    value == "true"
}

/// `None` for the `__undefined__` sentinel
pub fn parse_previous_version(value: &str) -> Option<String> {
    (value != NO_PREVIOUS_VERSION).then(|| value.to_string())
}
