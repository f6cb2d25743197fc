use std::io;

use nexus_core::moveout::SyncError;
use nexus_core::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] nexus_core::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Dashboard could not be loaded: {0}")]
    DashboardUnavailable(String),
    #[error("Moveout list not found: {0}")]
    ListNotFound(String),
}
