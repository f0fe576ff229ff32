//! Kubernetes API access.

pub mod client;
pub mod etcdbackup;
pub mod job;

#[cfg(test)]
pub(crate) mod mock;
