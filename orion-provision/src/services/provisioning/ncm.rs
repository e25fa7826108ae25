//! Network Configuration Manager registration

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};

use super::node_id::NodeId;
use super::request::NcmAssignment;
use crate::api::SwisApi;

pub const NCM_ENTITY: &str = "Cirrus.Nodes";

/// Look up the NCM node (a GUID) that belongs to a core node
const NCM_NODE_QUERY: &str = "SELECT NodeID FROM Cirrus.Nodes WHERE CoreNodeID=@node";

/// Add a core node to NCM and apply the row's NCM settings.
///
/// Returns the NCM node id.
pub async fn register_node(
    api: &dyn SwisApi,
    node_id: NodeId,
    assignment: &NcmAssignment,
) -> Result<String> {
    api.invoke(NCM_ENTITY, "AddNodeToNCM", vec![json!(node_id.get())])
        .await
        .context("AddNodeToNCM failed")?;

    let mut params = Map::new();
    params.insert("node".to_string(), json!(node_id.get()));
    let rows = api
        .query(NCM_NODE_QUERY, params)
        .await
        .context("NCM node lookup failed")?;

    let ncm_id = match rows.first().and_then(|row| row.get("NodeID")) {
        Some(id) if !id.is_null() => id.clone(),
        _ => bail!("NCM has no node for core node {}", node_id),
    };
    log::debug!("Core node {} is NCM node {}", node_id, ncm_id);

    let mut ncm_node = api
        .invoke(NCM_ENTITY, "GetNode", vec![ncm_id.clone()])
        .await
        .context("GetNode failed")?;

    if !ncm_node.is_object() {
        bail!("GetNode returned {} instead of an object", ncm_node);
    }
    if let Some(fields) = ncm_node.as_object_mut() {
        assignment.apply(fields);
    }

    api.invoke(NCM_ENTITY, "UpdateNode", vec![ncm_node])
        .await
        .context("UpdateNode failed")?;

    Ok(match ncm_id {
        Value::String(id) => id,
        other => other.to_string(),
    })
}
