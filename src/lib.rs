//! OLM Bundle Generator
//!
//! Builds an Operator Lifecycle Manager bundle for one operator release from
//! the operator's Kubernetes manifests and a ClusterServiceVersion template.

pub mod adapters;
pub mod cli;
pub mod crd;
pub mod error;
pub mod generator;

pub use error::{Error, Result};
