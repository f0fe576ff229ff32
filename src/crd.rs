//! `EtcdBackup` CRD type definition.

pub mod spec;
pub mod status;

pub use spec::{EtcdBackup, EtcdBackupSpec, RetentionPolicy};
pub use status::BackupPhase;
