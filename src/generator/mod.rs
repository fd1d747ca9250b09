//! Bundle generation for one operator release

pub mod bundle;

pub use bundle::{generate, generate_at};

use std::path::PathBuf;

use crate::crd::{ClusterServiceVersion, PackageManifest};

/// Default location of the operator manifests
pub const DEFAULT_MANIFESTS_DIR: &str = "manifests";

/// Default location of the CSV template
pub const DEFAULT_CSV_TEMPLATE: &str = "build/templates/csv.yaml.tmpl";

/// Everything needed to generate one bundle
#[derive(Clone, Debug)]
pub struct BundleRequest {
    /// Directory the version directory is created in
    pub operator_dir: PathBuf,
    /// Operator name, also the name of its Deployment and service account
    pub operator_name: String,
    pub operator_namespace: String,
    pub operator_version: String,
    pub operator_image: String,
    pub channel_name: String,
    /// Whether the MultiNamespace install mode is supported
    pub multi_namespace: bool,
    /// CSV this release replaces
    pub previous_version: Option<String>,
    pub manifests_dir: PathBuf,
    pub csv_template: PathBuf,
}

impl BundleRequest {
    /// `<operator_dir>/<operator_version>`
    pub fn version_dir(&self) -> PathBuf {
        self.operator_dir.join(&self.operator_version)
    }

    /// Name of the generated CSV
    pub fn csv_name(&self) -> String {
        ClusterServiceVersion::versioned_name(&self.operator_name, &self.operator_version)
    }

    /// Package descriptor for this release
    pub fn package(&self) -> PackageManifest {
        PackageManifest::new(
            &self.operator_name,
            &self.channel_name,
            &self.operator_version,
        )
    }
}

/// What a generated bundle contains
#[derive(Clone, Debug)]
pub struct BundleReport {
    pub version_dir: PathBuf,
    pub csv_file: PathBuf,
    /// RBAC manifests copied into the bundle
    pub copied_files: Vec<PathBuf>,
    pub cluster_service_version: ClusterServiceVersion,
    pub package: PackageManifest,
}

/// Result of a generation run
#[derive(Clone, Debug)]
pub enum GenerateOutcome {
    /// A new version directory was written
    Generated(Box<BundleReport>),
    /// The version directory already existed and was left untouched
    AlreadyGenerated(PathBuf),
}
