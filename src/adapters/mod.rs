//! Adapters between Kubernetes manifests, the CSV template and the bundle on disk

pub mod bundle_writer;
pub mod csv_builder;
pub mod manifests;
