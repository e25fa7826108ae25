//! The SwisApi seam between provisioning logic and the transport

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value};

use super::operations::Operation;

/// Request/response access to the SolarWinds Information Service.
///
/// Implementors only provide [`SwisApi::execute`]; the typed helpers build
/// the matching [`Operation`] and shape the response.
#[async_trait]
pub trait SwisApi: Send + Sync {
    /// Execute a single operation and return the decoded JSON response
    async fn execute(&self, operation: &Operation) -> Result<Value>;

    /// Create an object and return its SWIS URI
    async fn create(&self, entity: &str, properties: Map<String, Value>) -> Result<String> {
        let response = self.execute(&Operation::create(entity, properties)).await?;
        match response {
            Value::String(uri) => Ok(uri),
            other => Err(anyhow!(
                "Create {} returned {} instead of a URI",
                entity,
                other
            )),
        }
    }

    /// Set properties on the object at `uri`
    async fn update(&self, uri: &str, properties: Map<String, Value>) -> Result<()> {
        self.execute(&Operation::update(uri, properties)).await?;
        Ok(())
    }

    /// Run a SWQL query and return its `results` rows
    async fn query(&self, query: &str, parameters: Map<String, Value>) -> Result<Vec<Value>> {
        let response = self.execute(&Operation::query(query, parameters)).await?;
        let rows = response
            .get("results")
            .and_then(|r| r.as_array())
            .cloned()
            .with_context(|| format!("Query response has no results array: {}", response))?;
        Ok(rows)
    }

    /// Invoke a verb and return its raw result
    async fn invoke(&self, entity: &str, verb: &str, arguments: Vec<Value>) -> Result<Value> {
        self.execute(&Operation::invoke(entity, verb, arguments)).await
    }
}
