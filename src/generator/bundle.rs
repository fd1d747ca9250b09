//! Bundle generation driver

use chrono::{DateTime, Utc};
use tracing::info;

use crate::adapters::{bundle_writer, csv_builder, manifests};
use crate::generator::{BundleReport, BundleRequest, GenerateOutcome};
use crate::{Error, Result};

/// Generate the bundle for `request`, stamping the CSV with the current time
pub fn generate(request: &BundleRequest) -> Result<GenerateOutcome> {
    generate_at(request, Utc::now())
}

/// Generate the bundle for `request`, stamping the CSV with `created_at`
///
/// Nothing is written unless every input is valid. An existing version
/// directory is never modified.
pub fn generate_at(
    request: &BundleRequest,
    created_at: DateTime<Utc>,
) -> Result<GenerateOutcome> {
    if !request.manifests_dir.exists() {
        return Err(Error::ManifestsDirMissing(request.manifests_dir.clone()));
    }

    let version_dir = request.version_dir();
    if version_dir.exists() {
        info!("Version already exists, skipping: {}", version_dir.display());
        return Ok(GenerateOutcome::AlreadyGenerated(version_dir));
    }

    info!("Generating CSV for version: {}", request.operator_version);

    let template = csv_builder::load_template(&request.csv_template)?;
    let files = manifests::load_dir(&request.manifests_dir)?;

    let csv = csv_builder::build_csv(template, request, &files, created_at)?;
    let csv_file =
        bundle_writer::csv_file(&csv, &request.operator_name, &request.operator_version)?;
    let csv_path = version_dir.join(&csv_file.name);

    let mut bundle = bundle_writer::plan_rbac_files(&files)?;
    let copied = bundle.len();
    bundle.push(csv_file);

    let mut written = bundle_writer::write_bundle(&version_dir, &bundle)?;
    written.truncate(copied);
    info!("Wrote ClusterServiceVersion: {}", csv_path.display());

    Ok(GenerateOutcome::Generated(Box::new(BundleReport {
        version_dir,
        csv_file: csv_path,
        copied_files: written,
        cluster_service_version: csv,
        package: request.package(),
    })))
}
