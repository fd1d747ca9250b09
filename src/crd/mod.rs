//! OLM resource types produced by the bundle generator

mod cluster_service_version;
mod package_manifest;

pub use cluster_service_version::*;
pub use package_manifest::*;
