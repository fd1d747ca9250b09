//! ClusterServiceVersion Custom Resource Definition
//!
//! Only the fields the bundle generator reads or writes are typed. Everything
//! else in the template's `spec` is carried through untouched.

use k8s_openapi::api::rbac::v1::PolicyRule;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Install mode type toggled by the multi-namespace flag
pub const MULTI_NAMESPACE_INSTALL_MODE: &str = "MultiNamespace";

/// Annotation carrying the CSV creation timestamp
pub const CREATED_AT_ANNOTATION: &str = "createdAt";

/// Annotation carrying the operator image
pub const CONTAINER_IMAGE_ANNOTATION: &str = "containerImage";

/// ClusterServiceVersion resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "operators.coreos.com",
    version = "v1alpha1",
    kind = "ClusterServiceVersion",
    plural = "clusterserviceversions",
    singular = "clusterserviceversion",
    shortname = "csv",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersionSpec {
    /// Human readable operator name
    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Operator version, without the `v` prefix
    #[serde(default)]
    pub version: String,

    /// Name of the CSV this one upgrades from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,

    /// Namespace scoping strategies the operator supports
    #[serde(default)]
    pub install_modes: Vec<InstallMode>,

    /// How OLM installs the operator
    #[serde(default)]
    pub install: NamedInstallStrategy,

    /// Template fields the generator does not manage
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A namespace scoping strategy and whether it is supported
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct InstallMode {
    #[serde(rename = "type")]
    pub type_: String,
    pub supported: bool,
}

/// Install strategy wrapper (`spec.install`)
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NamedInstallStrategy {
    #[serde(default = "default_strategy")]
    pub strategy: String,

    #[serde(default)]
    pub spec: StrategyDetailsDeployment,
}

impl Default for NamedInstallStrategy {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            spec: StrategyDetailsDeployment::default(),
        }
    }
}

fn default_strategy() -> String {
    "deployment".to_string()
}

/// Deployment install strategy details (`spec.install.spec`)
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDetailsDeployment {
    /// Cluster-scoped permissions granted to service accounts
    #[serde(default)]
    pub cluster_permissions: Vec<StrategyDeploymentPermissions>,

    /// Namespaced permissions, passed through from the template
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<StrategyDeploymentPermissions>,

    #[serde(default)]
    pub deployments: Vec<StrategyDeploymentSpec>,
}

/// RBAC rules granted to one service account
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDeploymentPermissions {
    pub service_account_name: String,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// A named Deployment spec installed by OLM
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct StrategyDeploymentSpec {
    pub name: String,
    /// The Deployment's `spec`, exactly as written in its manifest
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl ClusterServiceVersion {
    /// `<name>.v<version>`, the identifier OLM uses for a CSV
    pub fn versioned_name(operator_name: &str, version: &str) -> String {
        format!("{}.v{}", operator_name, version)
    }

    /// Set an annotation on the CSV metadata
    pub fn set_annotation(&mut self, key: &str, value: impl Into<String>) {
        self.metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
    }

    /// Look up a metadata annotation
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
    }
}
