//! External engine seam
//!
//! Provisioning is done by an infrastructure-as-code engine outside this
//! workspace. An [`Engine`] receives the finished [`Deployment`]; the bundled
//! [`DocumentEngine`] hands it over as a JSON document recorded in the stack
//! state.

use crate::action::{Plan, SubmitResult};
use crate::deployment::Deployment;
use crate::error::Result;
use crate::state::StateManager;
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait Engine: Send + Sync {
    /// Returns the engine name (e.g., "document")
    fn name(&self) -> &str;

    /// Ordered actions the engine would perform
    async fn preview(&self, deployment: &Deployment) -> Result<Plan> {
        Plan::from_graph(&deployment.graph)
    }

    /// Hands the deployment over to the engine
    async fn submit(&self, deployment: &Deployment) -> Result<SubmitResult>;
}

/// Writes the deployment document into the stack state and, optionally,
/// to an extra file the external tool reads
pub struct DocumentEngine {
    state: StateManager,
    out: Option<PathBuf>,
}

impl DocumentEngine {
    pub fn new(state: StateManager) -> Self {
        Self { state, out: None }
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.out = Some(path.into());
        self
    }
}

#[async_trait]
impl Engine for DocumentEngine {
    fn name(&self) -> &str {
        "document"
    }

    async fn submit(&self, deployment: &Deployment) -> Result<SubmitResult> {
        let start = std::time::Instant::now();
        let document = deployment.to_document()?;

        let lock = self.state.acquire_lock(&deployment.stack).await?;
        let mut state = self.state.load(&deployment.stack).await?;
        state.set_document(document.clone());
        let state_path = self.state.save(&state).await?;
        lock.release().await?;

        let document_path = match &self.out {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, serde_json::to_string_pretty(&document)?).await?;
                path.clone()
            }
            None => state_path,
        };

        tracing::info!(
            stack = %deployment.stack,
            resources = deployment.graph.len(),
            path = %document_path.display(),
            "Deployment document written"
        );

        Ok(SubmitResult {
            engine: self.name().to_string(),
            document_path: Some(document_path),
            resources: deployment.graph.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
