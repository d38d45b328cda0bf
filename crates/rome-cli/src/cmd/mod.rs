pub mod config;
pub mod deploy;
pub mod deployments;
pub mod init;
pub mod plan;
pub mod treasury;
