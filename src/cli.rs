//! CLI argument parsing.

use clap::{Parser, Subcommand};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = env!("BUILD_COMMIT");
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Default namespace where the backup Job runs.
pub const DEFAULT_NAMESPACE: &str = "openshift-etcd";

/// Request etcd backups by creating EtcdBackup custom resources
#[derive(Parser, Debug, Clone)]
#[command(name = "etcd-backup-cr")]
#[command(about = "Request etcd backups by creating EtcdBackup custom resources")]
#[command(version = const_format::formatcp!(
    "{} (commit: {}, build date: {})",
    VERSION, COMMIT, BUILD_DATE
))]
pub struct Args {
    /// Kubernetes context to use
    #[arg(long, global = true, env = "KUBECONFIG_CONTEXT")]
    pub context: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Log format (pretty, json)
    #[arg(long, global = true, default_value = "pretty", env = "LOG_FORMAT")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Creates the etcdBackup CR to do a backup
    #[command(after_help = r#"Examples:
  etcd-backup-cr backup --pvc etcd-backup-pvc --job-name backup-28391040
  etcd-backup-cr backup --pvc etcd-backup-pvc --job-name backup-28391040 --retention number:5 --wait"#)]
    Backup(BackupArgs),

    /// Print the EtcdBackup CustomResourceDefinition as YAML
    Crd,
}

/// Flags for the `backup` subcommand.
///
/// `--pvc` and `--job-name` default to empty strings and are checked by
/// `BackupOpts::validate`, not by clap.
#[derive(clap::Args, Debug, Clone)]
pub struct BackupArgs {
    /// Name of the PersistentVolumeClaim that receives the backup
    #[arg(long = "pvc", default_value = "")]
    pub pvc: String,

    /// Retention policy: "<n>", "number:<n>" or "size:<gb>"
    #[arg(long, default_value = "")]
    pub retention: String,

    /// Name of the Job that owns the EtcdBackup
    #[arg(long = "job-name", default_value = "")]
    pub job_name: String,

    /// Namespace of the owning Job
    #[arg(long, env = "POD_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Print the EtcdBackup as YAML instead of creating it
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Wait for the backup to finish
    #[arg(long, default_value = "false")]
    pub wait: bool,

    /// Maximum wait time for backup completion in seconds
    #[arg(long, default_value = "600", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Backup status check interval in seconds
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub check_interval: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_backup(extra: &[&str]) -> BackupArgs {
        let mut argv = vec!["etcd-backup-cr", "backup"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Backup(args) => args,
            other => panic!("Expected Backup command, got {:?}", other),
        }
    }

    #[test]
    fn test_backup_flags_default_to_empty() {
        let args = parse_backup(&[]);
        assert_eq!(args.pvc, "");
        assert_eq!(args.retention, "");
        assert_eq!(args.job_name, "");
        assert!(!args.dry_run);
        assert!(!args.wait);
        assert_eq!(args.timeout, 600);
        assert_eq!(args.check_interval, 10);
    }

    #[test]
    fn test_backup_flags_parsed() {
        let args = parse_backup(&[
            "--pvc",
            "etcd-backup-pvc",
            "--retention",
            "number:3",
            "--job-name",
            "backup-1",
            "--namespace",
            "etcd",
            "--wait",
        ]);
        assert_eq!(args.pvc, "etcd-backup-pvc");
        assert_eq!(args.retention, "number:3");
        assert_eq!(args.job_name, "backup-1");
        assert_eq!(args.namespace, "etcd");
        assert!(args.wait);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "etcd-backup-cr",
            "backup",
            "--log-format",
            "json",
            "--context",
            "prod",
        ])
        .unwrap();
        assert_eq!(args.log_format, "json");
        assert_eq!(args.context.as_deref(), Some("prod"));
    }

    #[test]
    fn test_crd_subcommand() {
        let args = Args::try_parse_from(["etcd-backup-cr", "crd"]).unwrap();
        assert!(matches!(args.command, Command::Crd));
    }

    #[test]
    fn test_zero_wait_durations_rejected() {
        for flag in ["--timeout", "--check-interval"] {
            let res = Args::try_parse_from(["etcd-backup-cr", "backup", flag, "0"]);
            assert!(res.is_err(), "{flag} 0 should be rejected");
        }
        let args = parse_backup(&["--timeout", "1", "--check-interval", "1"]);
        assert_eq!(args.timeout, 1);
        assert_eq!(args.check_interval, 1);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Args::try_parse_from(["etcd-backup-cr", "backup", "--bogus"]).is_err());
    }
}
