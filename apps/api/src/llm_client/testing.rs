//! Scripted `BackendClient` for unit tests across the crate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BackendClient, BackendError, BackendStatus, GenerateRequest};

type Responder = dyn Fn(&GenerateRequest) -> Result<String, BackendError> + Send + Sync;

/// Fake backend whose probe outcome is fixed and whose `generate` answers come
/// from a closure. Every prompt it receives is recorded.
#[derive(Clone)]
pub struct ScriptedBackend {
    status: BackendStatus,
    responder: Arc<Responder>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn reachable<F>(responder: F) -> Self
    where
        F: Fn(&GenerateRequest) -> Result<String, BackendError> + Send + Sync + 'static,
    {
        Self {
            status: BackendStatus::reachable("llama3.1:test".to_string()),
            responder: Arc::new(responder),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answers `text`.
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::reachable(move |_| Ok(text.clone()))
    }

    /// Probe fails and any generate call is a connection error.
    pub fn unreachable() -> Self {
        Self {
            status: BackendStatus::unreachable(),
            responder: Arc::new(|_| Err(BackendError::Unreachable("connection refused".to_string()))),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Probe succeeds but every generate call fails with `err`.
    pub fn failing(err: BackendError) -> Self {
        Self::reachable(move |_| Err(err.clone()))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl BackendClient for ScriptedBackend {
    async fn probe(&self) -> BackendStatus {
        self.status.clone()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }
        (self.responder)(request)
    }
}
