//! ClusterServiceVersion assembly from the CSV template and operator manifests

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::adapters::manifests::{self, Manifest, ManifestDocument, ManifestFile};
use crate::crd::{
    ClusterServiceVersion, InstallMode, StrategyDeploymentPermissions, StrategyDeploymentSpec,
    CONTAINER_IMAGE_ANNOTATION, CREATED_AT_ANNOTATION, MULTI_NAMESPACE_INSTALL_MODE,
};
use crate::generator::BundleRequest;
use crate::{Error, Result};

/// Format of the `createdAt` annotation
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Load the CSV skeleton
pub fn load_template(path: &Path) -> Result<ClusterServiceVersion> {
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| Error::Template {
        path: path.to_path_buf(),
        source,
    })
}

/// Names of the ClusterRoles bound to `service_account` by a ClusterRoleBinding
pub fn bound_cluster_roles(files: &[ManifestFile], service_account: &str) -> BTreeSet<String> {
    manifests::documents(files)
        .filter_map(|(_, manifest)| match &manifest.document {
            ManifestDocument::ClusterRoleBinding(binding) => Some(binding),
            _ => None,
        })
        .filter(|binding| {
            binding.subjects.iter().flatten().any(|subject| {
                subject.kind == "ServiceAccount" && subject.name == service_account
            })
        })
        .map(|binding| binding.role_ref.name.clone())
        .collect()
}

/// Assemble the CSV for `request` from the template and the scanned manifests
pub fn build_csv(
    template: ClusterServiceVersion,
    request: &BundleRequest,
    files: &[ManifestFile],
    created_at: DateTime<Utc>,
) -> Result<ClusterServiceVersion> {
    let operator_name = request.operator_name.as_str();
    let mut csv = template;

    csv.metadata.namespace = Some(request.operator_namespace.clone());
    csv.set_annotation(CONTAINER_IMAGE_ANNOTATION, request.operator_image.as_str());
    csv.spec.display_name = operator_name.to_string();
    csv.spec.description = format!("SRE operator - {}", operator_name);
    csv.spec.version = request.operator_version.clone();

    // The operator's service account shares its name
    let bound_roles = bound_cluster_roles(files, operator_name);
    debug!("ClusterRoles bound to {}: {:?}", operator_name, bound_roles);

    let strategy = &mut csv.spec.install.spec;
    strategy.cluster_permissions.clear();
    strategy.deployments.clear();

    let mut deployment = None;
    for (path, manifest) in manifests::documents(files) {
        match &manifest.document {
            ManifestDocument::ClusterRole(role)
                if bound_roles.contains(manifest.document.name()) =>
            {
                info!("Adding ClusterRole to CSV: {}", path.display());
                strategy
                    .cluster_permissions
                    .push(StrategyDeploymentPermissions {
                        service_account_name: operator_name.to_string(),
                        rules: role.rules.clone().unwrap_or_default(),
                    });
            }
            ManifestDocument::Deployment(_) if manifest.document.name() == operator_name => {
                info!("Adding Deployment to CSV: {}", path.display());
                deployment = Some(StrategyDeploymentSpec {
                    name: operator_name.to_string(),
                    spec: deployment_spec(manifest, path)?,
                });
            }
            _ => {}
        }
    }

    let mut deployment = deployment.ok_or_else(|| Error::NoDeployment {
        name: operator_name.to_string(),
        dir: request.manifests_dir.clone(),
    })?;
    set_operator_image(&mut deployment, &request.operator_image)?;
    strategy.deployments.push(deployment);

    csv.metadata.name = Some(request.csv_name());
    csv.spec.replaces = request.previous_version.clone();

    if !set_multi_namespace(&mut csv.spec.install_modes, request.multi_namespace) {
        debug!("Template has no {} install mode", MULTI_NAMESPACE_INSTALL_MODE);
    }

    csv.set_annotation(
        CREATED_AT_ANNOTATION,
        created_at.format(CREATED_AT_FORMAT).to_string(),
    );

    Ok(csv)
}

/// The raw `spec` of a Deployment manifest
fn deployment_spec(manifest: &Manifest, path: &Path) -> Result<Value> {
    let name = manifest.document.name();
    let spec = manifest
        .raw
        .get("spec")
        .filter(|spec| !spec.is_null())
        .ok_or_else(|| Error::InvalidDeployment {
            name: name.to_string(),
            reason: format!("no spec in {}", path.display()),
        })?;

    serde_yaml::from_value(spec.clone()).map_err(|source| Error::InvalidManifest {
        kind: "Deployment".to_string(),
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

/// Point the deployment's first container at `image`
pub fn set_operator_image(deployment: &mut StrategyDeploymentSpec, image: &str) -> Result<()> {
    let name = deployment.name.clone();
    let container = deployment
        .spec
        .pointer_mut("/template/spec/containers/0")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::InvalidDeployment {
            name,
            reason: "pod template has no containers".to_string(),
        })?;

    container.insert("image".to_string(), Value::String(image.to_string()));
    Ok(())
}

/// Set `supported` on the MultiNamespace install mode, returning whether one exists
pub fn set_multi_namespace(install_modes: &mut [InstallMode], supported: bool) -> bool {
    for mode in install_modes.iter_mut() {
        debug!("Looking for {}, on = {}", MULTI_NAMESPACE_INSTALL_MODE, mode.type_);
        if mode.type_ == MULTI_NAMESPACE_INSTALL_MODE {
            mode.supported = supported;
            return true;
        }
    }
    false
}
