//! Core Operation types for SWIS requests

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Represents a single request that can be executed against the SolarWinds Information Service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a new object
    Create {
        /// Entity type (e.g., "Orion.Nodes", "Orion.Pollers")
        entity: String,
        /// Object properties
        properties: Map<String, Value>,
    },
    /// Update properties on an existing object
    Update {
        /// SWIS URI of the object (e.g., "swis://orion/Orion/Orion.Nodes/NodeID=12/CustomProperties")
        uri: String,
        /// Properties to set
        properties: Map<String, Value>,
    },
    /// Run a SWQL query
    Query {
        /// SWQL text with `@name` placeholders
        query: String,
        /// Values bound to the placeholders
        parameters: Map<String, Value>,
    },
    /// Invoke a verb on an entity type
    Invoke {
        /// Entity type the verb belongs to (e.g., "Cirrus.Nodes")
        entity: String,
        /// Verb name (e.g., "PollNow")
        verb: String,
        /// Positional verb arguments
        arguments: Vec<Value>,
    },
}

impl Operation {
    /// Create a new Create operation
    pub fn create(entity: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self::Create {
            entity: entity.into(),
            properties,
        }
    }

    /// Create a new Update operation
    pub fn update(uri: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self::Update {
            uri: uri.into(),
            properties,
        }
    }

    /// Create a new Query operation
    pub fn query(query: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self::Query {
            query: query.into(),
            parameters,
        }
    }

    /// Create a new Invoke operation
    pub fn invoke(entity: impl Into<String>, verb: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self::Invoke {
            entity: entity.into(),
            verb: verb.into(),
            arguments,
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Query { .. } => "query",
            Self::Invoke { .. } => "invoke",
        }
    }

    /// Request path relative to the service root (`.../v3/Json/`)
    pub fn path(&self) -> String {
        match self {
            Self::Create { entity, .. } => format!("Create/{}", entity),
            Self::Update { uri, .. } => uri.clone(),
            Self::Query { .. } => "Query".to_string(),
            Self::Invoke { entity, verb, .. } => format!("Invoke/{}/{}", entity, verb),
        }
    }

    /// JSON request body
    pub fn body(&self) -> Value {
        match self {
            Self::Create { properties, .. } | Self::Update { properties, .. } => {
                Value::Object(properties.clone())
            }
            Self::Query { query, parameters } => json!({
                "query": query,
                "parameters": parameters,
            }),
            Self::Invoke { arguments, .. } => Value::Array(arguments.clone()),
        }
    }

    /// Short human-readable description for logs and dry runs
    pub fn describe(&self) -> String {
        match self {
            Self::Create { entity, .. } => format!("create {}", entity),
            Self::Update { uri, properties } => {
                let keys: Vec<&str> = properties.keys().map(|k| k.as_str()).collect();
                format!("update {} [{}]", uri, keys.join(", "))
            }
            Self::Query { query, .. } => format!("query `{}`", query),
            Self::Invoke { entity, verb, .. } => format!("invoke {}.{}", entity, verb),
        }
    }
}
