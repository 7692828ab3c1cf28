use std::sync::Arc;

use tracing::{error, info};

use super::local::LocalSandbox;
use super::remote::RemoteExecutor;
use crate::core::{LanguageRegistry, RunFailure, RunRequest, RunResult};

/// Routes a run to the local sandbox or the remote executor
#[derive(Clone)]
pub struct RunDispatcher {
    registry: &'static LanguageRegistry,
    local: LocalSandbox,
    remote: Arc<dyn RemoteExecutor>,
}

impl RunDispatcher {
    pub fn new(
        registry: &'static LanguageRegistry,
        local: LocalSandbox,
        remote: Arc<dyn RemoteExecutor>,
    ) -> Self {
        Self {
            registry,
            local,
            remote,
        }
    }

    pub fn registry(&self) -> &'static LanguageRegistry {
        self.registry
    }

    /// Execute one run. Never fails: every failure is part of the output text.
    pub async fn execute(&self, request: &RunRequest) -> RunResult {
        let result = if self.registry.is_local(&request.language) {
            self.run_local(request).await
        } else {
            match self.registry.lookup(&request.language) {
                Some(entry) => self.remote.execute(entry, request).await,
                None => RunFailure::UnsupportedLanguage.into(),
            }
        };

        info!(
            "Run completed: language={}, output_len={}",
            request.language,
            result.output.len()
        );

        result
    }

    async fn run_local(&self, request: &RunRequest) -> RunResult {
        let sandbox = self.local.clone();
        let source_code = request.source_code.clone();
        let stdin = request.stdin.clone();

        // The engine context is not Send; it lives and dies on the blocking thread
        match tokio::task::spawn_blocking(move || sandbox.run(&source_code, &stdin)).await {
            Ok(result) => result,
            Err(e) => {
                error!("Local run task failed: {}", e);
                RunFailure::LocalExecution(e.to_string()).into()
            }
        }
    }
}
