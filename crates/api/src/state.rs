use std::sync::Arc;

use claimflow_core::workflow::WorkflowPolicy;

use crate::config::ServerConfig;
use crate::uploads::UploadStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference-counted and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: claimflow_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Disk store for claim documents and signatures.
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub fn new(pool: claimflow_db::DbPool, config: ServerConfig) -> Self {
        let uploads = Arc::new(UploadStore::new(config.upload_dir.clone()));
        Self {
            pool,
            config: Arc::new(config),
            uploads,
        }
    }

    /// Workflow switches derived from configuration.
    pub fn workflow_policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            approver_stage: self.config.approver_stage,
        }
    }
}
