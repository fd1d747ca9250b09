//! Error types for the OLM bundle generator

use std::path::PathBuf;

/// Result type for bundle generation
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for bundle generation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifests directory to scan does not exist
    #[error("Operator asset directory {} does not exist", .0.display())]
    ManifestsDirMissing(PathBuf),

    /// A RoleBinding or ClusterRoleBinding without `roleRef.kind`
    #[error("{kind} '{name}' is missing .roleRef.kind in file {}", .path.display())]
    MissingRoleRefKind {
        kind: String,
        name: String,
        path: PathBuf,
    },

    /// No Deployment named after the operator was found
    #[error(
        "Did not find a Deployment named '{name}' in {}. There is nothing to deploy",
        .dir.display()
    )]
    NoDeployment { name: String, dir: PathBuf },

    /// The operator Deployment cannot receive the operator image
    #[error("Deployment '{name}' is invalid: {reason}")]
    InvalidDeployment { name: String, reason: String },

    /// A file is not valid YAML
    #[error("Failed to parse YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A document does not match the schema of its kind
    #[error("Invalid {kind} '{name}' in {}: {source}", .path.display())]
    InvalidManifest {
        kind: String,
        name: String,
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The CSV template could not be loaded
    #[error("Invalid CSV template {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A bundle document could not be serialized
    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Filesystem error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
