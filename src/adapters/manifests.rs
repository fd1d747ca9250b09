//! Kubernetes manifest discovery and classification
//!
//! Every YAML document under the manifests directory is parsed once and
//! classified by `kind` alone, whatever its `apiVersion`. RBAC kinds are
//! decoded into their `k8s-openapi` types. Deployments only have their
//! metadata decoded; their spec stays in the raw document. Everything else
//! is kept as `Other`.

use std::fs;
use std::path::{Path, PathBuf};

use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::{Error, Result};

/// A classified manifest document
#[derive(Clone, Debug)]
pub enum ManifestDocument {
    ClusterRole(ClusterRole),
    Role(Role),
    RoleBinding(RoleBinding),
    ClusterRoleBinding(ClusterRoleBinding),
    /// Metadata only; the spec is read from [`Manifest::raw`]
    Deployment(ObjectMeta),
    /// Any other kind; holds the kind string, empty when absent
    Other(String),
}

impl ManifestDocument {
    /// The document's `kind`
    pub fn kind(&self) -> &str {
        match self {
            ManifestDocument::ClusterRole(_) => "ClusterRole",
            ManifestDocument::Role(_) => "Role",
            ManifestDocument::RoleBinding(_) => "RoleBinding",
            ManifestDocument::ClusterRoleBinding(_) => "ClusterRoleBinding",
            ManifestDocument::Deployment(_) => "Deployment",
            ManifestDocument::Other(kind) => kind,
        }
    }

    fn metadata(&self) -> Option<&ObjectMeta> {
        match self {
            ManifestDocument::ClusterRole(o) => Some(&o.metadata),
            ManifestDocument::Role(o) => Some(&o.metadata),
            ManifestDocument::RoleBinding(o) => Some(&o.metadata),
            ManifestDocument::ClusterRoleBinding(o) => Some(&o.metadata),
            ManifestDocument::Deployment(metadata) => Some(metadata),
            ManifestDocument::Other(_) => None,
        }
    }

    /// `metadata.name`, empty when unset
    pub fn name(&self) -> &str {
        self.metadata()
            .and_then(|m| m.name.as_deref())
            .unwrap_or_default()
    }

    /// `metadata.namespace`, if the document sets one
    pub fn namespace(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.namespace.as_deref())
    }

    /// Whether this is one of the RBAC kinds copied into the bundle
    pub fn is_rbac(&self) -> bool {
        matches!(
            self,
            ManifestDocument::ClusterRole(_)
                | ManifestDocument::Role(_)
                | ManifestDocument::RoleBinding(_)
                | ManifestDocument::ClusterRoleBinding(_)
        )
    }
}

/// One document of a manifest file, typed and raw
#[derive(Clone, Debug)]
pub struct Manifest {
    pub document: ManifestDocument,
    pub raw: Value,
}

/// A manifest file and the documents it contains
#[derive(Clone, Debug)]
pub struct ManifestFile {
    pub path: PathBuf,
    /// File contents as read from disk
    pub contents: String,
    pub manifests: Vec<Manifest>,
}

impl ManifestFile {
    /// Read and classify a manifest file
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(path, contents)
    }

    /// Classify the documents of a (possibly multi-document) YAML stream
    pub fn parse(path: impl Into<PathBuf>, contents: String) -> Result<Self> {
        let path = path.into();
        let mut manifests = Vec::new();

        for document in serde_yaml::Deserializer::from_str(&contents) {
            let raw = Value::deserialize(document).map_err(|source| Error::Yaml {
                path: path.clone(),
                source,
            })?;

            // Skip empty documents such as a trailing `---`
            if raw.is_null() {
                continue;
            }

            let document = classify(&raw, &path)?;
            debug!(
                "Found {} '{}' in {}",
                document.kind(),
                document.name(),
                path.display()
            );
            manifests.push(Manifest { document, raw });
        }

        Ok(Self {
            path,
            contents,
            manifests,
        })
    }

    /// Whether the file holds exactly one document
    pub fn is_single_document(&self) -> bool {
        self.manifests.len() == 1
    }
}

/// Load every YAML manifest under `dir`, recursively, in path order
pub fn load_dir(dir: &Path) -> Result<Vec<ManifestFile>> {
    if !dir.exists() {
        return Err(Error::ManifestsDirMissing(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::io(dir, e.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_yaml(path) {
            continue;
        }
        files.push(ManifestFile::read(path)?);
    }

    debug!("Loaded {} manifest files from {}", files.len(), dir.display());
    Ok(files)
}

/// Every document across `files`, paired with the file it came from
pub fn documents<'a>(
    files: &'a [ManifestFile],
) -> impl Iterator<Item = (&'a Path, &'a Manifest)> {
    files
        .iter()
        .flat_map(|f| f.manifests.iter().map(move |m| (f.path.as_path(), m)))
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "yaml" | "yml"))
}

/// Classify a raw document by its `kind`
pub fn classify(raw: &Value, path: &Path) -> Result<ManifestDocument> {
    let kind = raw.get("kind").and_then(Value::as_str).unwrap_or_default();

    match kind {
        "ClusterRole" => decode(raw, kind, path).map(ManifestDocument::ClusterRole),
        "Role" => decode(raw, kind, path).map(ManifestDocument::Role),
        "RoleBinding" => {
            require_role_ref_kind(raw, kind, path)?;
            decode(raw, kind, path).map(ManifestDocument::RoleBinding)
        }
        "ClusterRoleBinding" => {
            require_role_ref_kind(raw, kind, path)?;
            decode(raw, kind, path).map(ManifestDocument::ClusterRoleBinding)
        }
        "Deployment" => match raw.get("metadata") {
            None | Some(Value::Null) => Ok(ManifestDocument::Deployment(ObjectMeta::default())),
            Some(metadata) => {
                decode_value(metadata.clone(), raw, kind, path).map(ManifestDocument::Deployment)
            }
        },
        other => Ok(ManifestDocument::Other(other.to_string())),
    }
}

// Bindings must name the kind of role they reference
fn require_role_ref_kind(raw: &Value, kind: &str, path: &Path) -> Result<()> {
    let has_kind = raw
        .get("roleRef")
        .and_then(|r| r.get("kind"))
        .is_some_and(|k| !k.is_null());

    if has_kind {
        Ok(())
    } else {
        Err(Error::MissingRoleRefKind {
            kind: kind.to_string(),
            name: raw_name(raw).to_string(),
            path: path.to_path_buf(),
        })
    }
}

fn decode<T: DeserializeOwned>(raw: &Value, kind: &str, path: &Path) -> Result<T> {
    let mut value = raw.clone();
    // k8s-openapi types only accept their own apiVersion
    if let Value::Mapping(mapping) = &mut value {
        mapping.remove("apiVersion");
    }
    decode_value(value, raw, kind, path)
}

fn decode_value<T: DeserializeOwned>(
    value: Value,
    raw: &Value,
    kind: &str,
    path: &Path,
) -> Result<T> {
    serde_yaml::from_value(value).map_err(|source| Error::InvalidManifest {
        kind: kind.to_string(),
        name: raw_name(raw).to_string(),
        path: path.to_path_buf(),
        source,
    })
}

fn raw_name(raw: &Value) -> &str {
    raw.get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
}
