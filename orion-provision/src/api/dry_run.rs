//! Offline SwisApi implementation used by `--dry-run`

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::{Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::operations::Operation;
use super::swis::SwisApi;

/// Node ids handed out by the dry run start here so they are easy to spot
const FIRST_DRY_RUN_NODE_ID: u64 = 900_000;

type OperationHook = Box<dyn Fn(&Operation) + Send + Sync>;

/// Reports every operation instead of sending it and answers with
/// plausible synthetic responses
pub struct DryRunClient {
    host: String,
    next_id: AtomicU64,
    operations: Mutex<Vec<Operation>>,
    on_operation: Option<OperationHook>,
}

impl DryRunClient {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            next_id: AtomicU64::new(FIRST_DRY_RUN_NODE_ID),
            operations: Mutex::new(Vec::new()),
            on_operation: None,
        }
    }

    /// Call `hook` with each operation as it is issued
    pub fn on_operation<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Operation) + Send + Sync + 'static,
    {
        self.on_operation = Some(Box::new(hook));
        self
    }

    /// Operations issued so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.operations
            .lock()
            .map(|ops| ops.clone())
            .unwrap_or_default()
    }

    fn respond(&self, operation: &Operation) -> Value {
        match operation {
            Operation::Create { entity, .. } => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let key = if entity == "Orion.Nodes" { "NodeID" } else { "ID" };
                let short = entity.split('.').next().unwrap_or("Orion");
                json!(format!("swis://{}/{}/{}/{}={}", self.host, short, entity, key, id))
            }
            Operation::Query { .. } => json!({
                "results": [{ "NodeID": uuid::Uuid::new_v4().to_string() }]
            }),
            Operation::Invoke { verb, arguments, .. } if verb == "GetNode" => {
                let ncm_id = arguments.first().cloned().unwrap_or(Value::Null);
                json!({
                    "NodeID": ncm_id,
                    "ConnectionProfile": Value::Null,
                    "DeviceTemplate": Value::Null,
                    "NodeGroup": Value::Null,
                })
            }
            Operation::Update { .. } | Operation::Invoke { .. } => Value::Null,
        }
    }
}

#[async_trait]
impl SwisApi for DryRunClient {
    async fn execute(&self, operation: &Operation) -> Result<Value> {
        debug!("[dry-run] {}", operation.describe());
        if let Some(hook) = &self.on_operation {
            hook(operation);
        }
        if let Ok(mut ops) = self.operations.lock() {
            ops.push(operation.clone());
        }
        Ok(self.respond(operation))
    }
}
