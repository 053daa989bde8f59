// ABOUTME: Entry point for the vaultship CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use tracing_subscriber::EnvFilter;
use vaultship::config::{self, Manifest};
use vaultship::deploy::CollisionPolicy;
use vaultship::error::{Error, Result};
use vaultship::fetch::ObjectStore;
use vaultship::output::{Output, OutputMode};
use vaultship::pipeline::{self, Decision, Pipeline, StdOperator};
use vaultship::runtime::DockerRuntime;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let output = Output::new(if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    });

    // One interrupt handler at process scope: message, then exit. Partially
    // applied state is left as-is; re-running the pipeline resumes safely.
    let result = tokio::select! {
        result = run(cli, &output) => result,
        _ = tokio::signal::ctrl_c() => {
            output.error("interrupted, exiting");
            std::process::exit(130);
        }
    };

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            config::init_manifest(&cwd, force)?;
            output.success("wrote vaultship.yml");
            Ok(())
        }
        Commands::Deploy { service } => {
            let manifest = discover_manifest()?;
            fetch_artifacts(&manifest, output).await?;

            let runtime = DockerRuntime::connect_and_ping().await?;
            let mut pipeline = Pipeline::new(
                &manifest,
                &runtime,
                StdOperator,
                output,
                CollisionPolicy::Recreate,
            );

            match service {
                Some(name) => {
                    let spec = manifest.service(&name)?.clone();
                    pipeline.run_service(&spec).await?;
                    output.success(&format!("deployed {name}"));
                }
                None => {
                    let targets = pipeline.run().await?;
                    output.success(&format!("deployed {} service(s)", targets.len()));
                }
            }
            Ok(())
        }
        Commands::Boot => {
            let manifest = discover_manifest()?;
            let runtime = DockerRuntime::connect_and_ping().await?;

            // Unattended: sealed files stay sealed, running containers stay up.
            let mut pipeline = Pipeline::new(
                &manifest,
                &runtime,
                StdOperator,
                output,
                CollisionPolicy::PreserveRunning,
            )
            .with_default_decision(Decision::KeepEncrypted);

            let targets = pipeline.run().await?;
            output.success(&format!("{} service(s) up", targets.len()));
            Ok(())
        }
        Commands::Status => {
            let manifest = discover_manifest()?;
            let runtime = DockerRuntime::connect_and_ping().await?;

            let statuses = pipeline::status(&manifest, &runtime).await?;
            for status in statuses {
                let config = status
                    .config
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let container = status
                    .container
                    .map(|s| format!("{s:?}").to_lowercase())
                    .unwrap_or_else(|| "absent".to_string());
                output.success(&format!(
                    "{:<16} config={:<24} container={}",
                    status.service, config, container
                ));
            }
            Ok(())
        }
        Commands::Fetch => {
            let manifest = discover_manifest()?;
            fetch_artifacts(&manifest, output).await
        }
    }
}

fn discover_manifest() -> Result<Manifest> {
    let cwd = env::current_dir()?;
    Manifest::discover(&cwd)
}

/// Materialize prerequisite files before the pipeline runs. Already-present
/// destinations are skipped.
async fn fetch_artifacts(manifest: &Manifest, output: &Output) -> Result<()> {
    if manifest.artifacts.is_empty() {
        return Ok(());
    }

    let store = manifest.store.as_ref().ok_or_else(|| {
        Error::InvalidManifest("artifacts listed but no store command configured".to_string())
    })?;

    let store = ObjectStore::new(store);
    for artifact in &manifest.artifacts {
        use vaultship::fetch::FetchOutcome;
        match store.fetch(&artifact.uri, &artifact.dest).await? {
            FetchOutcome::AlreadyPresent => {
                output.progress(&format!("  {} already present", artifact.dest.display()));
            }
            FetchOutcome::Fetched => {
                output.progress(&format!("  fetched {}", artifact.dest.display()));
            }
        }
    }
    Ok(())
}
