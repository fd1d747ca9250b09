//! Bundle file naming and version directory output
//!
//! A bundle is written into a hidden staging directory next to the version
//! directory and renamed into place once every file is on disk, so the
//! version directory either holds a complete bundle or does not exist.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::adapters::manifests::ManifestFile;
use crate::crd::ClusterServiceVersion;
use crate::{Error, Result};

/// A file to be written into the version directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleFile {
    pub name: String,
    pub contents: String,
}

/// Bundle file name for a manifest copied into the bundle
///
/// Namespaced objects sort after cluster-scoped ones and before the CSV.
pub fn bundle_file_name(kind: &str, name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(namespace) => format!("10-{}.{}.{}.yaml", namespace, name, kind),
        None => format!("00-{}.{}.yaml", name, kind),
    }
    .to_lowercase()
}

/// Bundle file name of the generated CSV
pub fn csv_file_name(operator_name: &str, version: &str) -> String {
    format!(
        "20-{}.clusterserviceversion.yaml",
        ClusterServiceVersion::versioned_name(operator_name, version)
    )
}

/// Plan the RBAC manifests copied into the bundle
///
/// A document that is alone in its file is copied verbatim. Documents from
/// multi-document files are written individually. When two documents map to
/// the same file name the later one wins.
pub fn plan_rbac_files(files: &[ManifestFile]) -> Result<Vec<BundleFile>> {
    let mut planned: Vec<BundleFile> = Vec::new();

    for file in files {
        for manifest in file.manifests.iter().filter(|m| m.document.is_rbac()) {
            let document = &manifest.document;
            info!(
                "Adding {} to Catalog: {}",
                document.kind(),
                file.path.display()
            );

            let name =
                bundle_file_name(document.kind(), document.name(), document.namespace());
            let contents = if file.is_single_document() {
                file.contents.clone()
            } else {
                serde_yaml::to_string(&manifest.raw).map_err(|source| Error::Serialize {
                    what: format!("{} '{}'", document.kind(), document.name()),
                    source,
                })?
            };

            match planned.iter_mut().find(|f| f.name == name) {
                Some(existing) => {
                    warn!(
                        "{} is produced more than once, keeping {}",
                        name,
                        file.path.display()
                    );
                    existing.contents = contents;
                }
                None => planned.push(BundleFile { name, contents }),
            }
        }
    }

    Ok(planned)
}

/// Serialize the CSV into its bundle file
pub fn csv_file(
    csv: &ClusterServiceVersion,
    operator_name: &str,
    version: &str,
) -> Result<BundleFile> {
    let contents = serde_yaml::to_string(csv).map_err(|source| Error::Serialize {
        what: "ClusterServiceVersion".to_string(),
        source,
    })?;

    Ok(BundleFile {
        name: csv_file_name(operator_name, version),
        contents,
    })
}

/// Hidden sibling directory a version directory is assembled in
pub fn staging_dir(version_dir: &Path) -> PathBuf {
    let version = version_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    version_dir.with_file_name(format!(".{}.staging", version))
}

/// Write `files` into `version_dir`, which must not exist yet
pub fn write_bundle(version_dir: &Path, files: &[BundleFile]) -> Result<Vec<PathBuf>> {
    let staging = staging_dir(version_dir);

    // Leftover from an interrupted run
    if staging.exists() {
        warn!("Removing stale staging directory {}", staging.display());
        fs::remove_dir_all(&staging).map_err(|e| Error::io(&staging, e))?;
    }
    fs::create_dir_all(&staging).map_err(|e| Error::io(&staging, e))?;

    let result = write_files(&staging, files).and_then(|()| {
        fs::rename(&staging, version_dir).map_err(|e| Error::io(version_dir, e))
    });

    if let Err(e) = result {
        if let Err(cleanup) = fs::remove_dir_all(&staging) {
            warn!(
                "Failed to remove staging directory {}: {}",
                staging.display(),
                cleanup
            );
        }
        return Err(e);
    }

    Ok(files.iter().map(|f| version_dir.join(&f.name)).collect())
}

fn write_files(dir: &Path, files: &[BundleFile]) -> Result<()> {
    for file in files {
        let path = dir.join(&file.name);
        fs::write(&path, &file.contents).map_err(|e| Error::io(&path, e))?;
    }
    Ok(())
}
