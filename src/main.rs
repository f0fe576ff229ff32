//! etcd-backup-cr - request etcd backups through the `EtcdBackup` custom resource.
//!
//! Creates an `EtcdBackup` owned by the calling Job, pointing at the PVC
//! that receives the snapshot, and optionally waits for the operator to
//! finish the backup.

use anyhow::{Context, Result};
use clap::Parser;
use kube::CustomResourceExt;
use std::time::Instant;
use tracing::{debug, error, info, info_span};

mod backup;
mod cli;
mod crd;
mod error;
mod k8s;
mod retention;
mod types;

use backup::{BackupOpts, RunSettings};
use cli::{Args, BackupArgs, Command};
use crd::EtcdBackup;
use types::{ExecutionSummary, StepTimings};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(&args.log_format, &args.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!(
        version = cli::VERSION,
        commit = cli::COMMIT,
        build_date = cli::BUILD_DATE,
        "Starting etcd-backup-cr"
    );

    if let Err(e) = run(&args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    match &args.command {
        Command::Backup(backup_args) => run_backup(args.context.as_deref(), backup_args).await,
        Command::Crd => {
            let yaml = serde_yaml::to_string(&EtcdBackup::crd())
                .context("Failed to serialize CustomResourceDefinition")?;
            print!("{}", yaml);
            Ok(())
        }
    }
}

async fn run_backup(context: Option<&str>, args: &BackupArgs) -> Result<()> {
    let opts = BackupOpts::from(args);
    opts.validate()?;

    if args.dry_run {
        info!(job_name = %opts.job_name, "Dry run, printing EtcdBackup without creating it");
        print!("{}", opts.render()?);
        return Ok(());
    }

    let settings = RunSettings::from(args);

    let _span = info_span!(
        "etcd_backup",
        job_name = %opts.job_name,
        pvc_name = %opts.pvc_name,
        namespace = %settings.namespace
    )
    .entered();

    info!(
        job_name = %opts.job_name,
        pvc_name = %opts.pvc_name,
        retention = %opts.retention,
        namespace = %settings.namespace,
        "etcd backup request started"
    );

    let start_time = Instant::now();
    let mut step_timings = StepTimings::default();

    let client = k8s::client::build_client(context).await?;

    match opts.run(&client, &settings, &mut step_timings).await {
        Ok(outcome) => {
            let total_time = start_time.elapsed().as_secs_f64();

            info!(
                job_lookup_seconds = step_timings.job_lookup,
                backup_creation_seconds = step_timings.backup_creation,
                backup_wait_seconds = step_timings.backup_wait,
                total_execution_seconds = total_time,
                "Execution timing summary"
            );

            let summary = ExecutionSummary {
                status: "Success".to_string(),
                message: match outcome.phase {
                    Some(phase) => format!("etcd backup finished with phase {}", phase),
                    None => "EtcdBackup submitted".to_string(),
                },
                total_execution_time_seconds: total_time,
                step_timings,
                etcd_backup: outcome
                    .etcd_backup
                    .metadata
                    .name
                    .clone()
                    .unwrap_or_else(|| opts.job_name.clone()),
                pvc_name: outcome.etcd_backup.spec.pvc_name.clone(),
                job_name: opts.job_name.clone(),
                namespace: settings.namespace.clone(),
                retention_policy: outcome.etcd_backup.spec.retention_policy.clone(),
                phase: outcome.phase,
            };

            info!(
                status = "success",
                etcd_backup = %summary.etcd_backup,
                total_execution_seconds = total_time,
                "Backup request completed successfully"
            );

            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e) => {
            let total_time = start_time.elapsed().as_secs_f64();

            error!(
                job_lookup_seconds = step_timings.job_lookup,
                backup_creation_seconds = step_timings.backup_creation,
                backup_wait_seconds = step_timings.backup_wait,
                total_execution_seconds = total_time,
                "Execution timing summary (error)"
            );

            Err(e)
        }
    }
}

/// Initialize tracing. `RUST_LOG` takes precedence over `--log-level`.
fn init_tracing(log_format: &str, log_level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to initialize log filter: {}", e))?;

    match log_format.to_lowercase().as_str() {
        "json" => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .compact()
                .init();
        }
    }

    Ok(())
}
