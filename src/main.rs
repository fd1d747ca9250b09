//! OLM Bundle Generator
//!
//! Entry point for the generator. Parses the positional arguments, sets up
//! logging and maps the generation result to the process exit code.

use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use olm_bundle_generator::cli::Cli;
use olm_bundle_generator::generator::{self, GenerateOutcome};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return match e.print() {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::from(1),
            };
        }
        Err(_) => {
            println!("{}", Cli::command().render_usage());
            return ExitCode::from(1);
        }
    };

    init_tracing(cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let request = cli.into_request();

    let outcome = generator::generate(&request).with_context(|| {
        format!(
            "Failed to generate bundle for {} version {}",
            request.operator_name, request.operator_version
        )
    })?;

    match outcome {
        GenerateOutcome::AlreadyGenerated(dir) => {
            info!("Bundle {} was generated earlier, nothing to do", dir.display());
        }
        GenerateOutcome::Generated(report) => {
            info!(
                "Generated bundle {} with {} RBAC manifests",
                report.version_dir.display(),
                report.copied_files.len()
            );
            let package = serde_yaml::to_string(&report.package)?;
            debug!("Package manifest:\n{}", package);
        }
    }

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,olm_bundle_generator=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
