//! Recording SwisApi fake for provisioning tests

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

use crate::api::{DryRunClient, Operation, SwisApi};

type Predicate = Box<dyn Fn(&Operation) -> bool + Send + Sync>;
type Responder = Box<dyn Fn(&Operation) -> Option<Value> + Send + Sync>;

/// Records every attempted operation. Responses come from [`DryRunClient`]
/// unless overridden; selected operations can be made to fail.
pub struct RecordingApi {
    inner: DryRunClient,
    attempted: Mutex<Vec<Operation>>,
    fail_when: Option<Predicate>,
    responder: Option<Responder>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self {
            inner: DryRunClient::new("orion"),
            attempted: Mutex::new(Vec::new()),
            fail_when: None,
            responder: None,
        }
    }

    pub fn fail_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Operation) -> bool + Send + Sync + 'static,
    {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: Fn(&Operation) -> Option<Value> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Every operation attempted, including ones that were made to fail
    pub fn operations(&self) -> Vec<Operation> {
        self.attempted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwisApi for RecordingApi {
    async fn execute(&self, operation: &Operation) -> Result<Value> {
        self.attempted.lock().unwrap().push(operation.clone());

        if self.fail_when.as_ref().is_some_and(|f| f(operation)) {
            return Err(anyhow!("injected failure for {}", operation.describe()));
        }
        if let Some(response) = self.responder.as_ref().and_then(|r| r(operation)) {
            return Ok(response);
        }
        self.inner.execute(operation).await
    }
}

/// Operation predicate: create calls for an entity
pub fn is_create(entity: &'static str) -> impl Fn(&Operation) -> bool + Send + Sync + 'static {
    move |op| matches!(op, Operation::Create { entity: e, .. } if e == entity)
}
