//! In-process backend that replays scripted outcomes and records requests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agora_conversation::Collaborators;
use agora_core::{
    DefaultValidator, GenerationBackend, GenerationError, GenerationRequest, Persona,
};
use async_trait::async_trait;

#[derive(Default)]
pub struct ScriptedBackend {
    outcomes: Mutex<VecDeque<Result<String, GenerationError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue the outcome of the next call. Unscripted calls answer "reply N".
    pub fn push(&self, outcome: Result<&str, GenerationError>) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(outcome.map(ToString::to_string));
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> GenerationRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("reply {call}")))
    }
}

/// Backend that never answers within a test's lifetime.
pub struct StalledBackend;

#[async_trait]
impl GenerationBackend for StalledBackend {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("too late".to_string())
    }
}

pub fn stalled_collaborators() -> Collaborators {
    Collaborators::new(Arc::new(StalledBackend), Arc::new(DefaultValidator::default()))
}

pub fn collaborators(backend: &Arc<ScriptedBackend>) -> Collaborators {
    Collaborators::new(backend.clone(), Arc::new(DefaultValidator::default()))
}

pub fn persona(id: &str) -> Persona {
    Persona::new(id, id.to_uppercase(), format!("You are {id}."))
}
