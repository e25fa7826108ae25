// Node provisioning service
//
// Drives the fixed per-row call sequence against SWIS:
// create node -> pollers -> custom properties -> poll -> NCM.
// Every later call is scoped to the node id parsed from the create response,
// so a failed step ends the row.

pub mod batch;
pub mod ncm;
pub mod node_id;
pub mod outcome;
pub mod pollers;
pub mod request;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchEvent, run_batch};
pub use node_id::NodeId;
pub use outcome::{
    BatchReport, ProvisionError, ProvisionStage, ProvisionedNode, RowOutcome, RowStatus,
};
pub use request::NodeRequest;

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use crate::api::SwisApi;
use crate::config::{ColumnConfig, Config, SnmpV3Config};
use crate::excel::NodeRecord;

pub const NODE_ENTITY: &str = "Orion.Nodes";

/// Provisions one node at a time through a SwisApi
pub struct NodeProvisioner<'a> {
    api: &'a dyn SwisApi,
    engine_id: u32,
    snmp: SnmpV3Config,
    columns: ColumnConfig,
}

impl<'a> NodeProvisioner<'a> {
    pub fn new(api: &'a dyn SwisApi, config: &Config) -> Self {
        Self {
            api,
            engine_id: config.node.engine_id,
            snmp: config.snmp.clone(),
            columns: config.columns.clone(),
        }
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    /// Validate a spreadsheet row and provision it
    pub async fn provision(&self, record: &NodeRecord) -> Result<ProvisionedNode, ProvisionError> {
        let request = NodeRequest::from_record(record, &self.columns)
            .map_err(|e| ProvisionError::new(ProvisionStage::Validate, None, e))?;
        self.provision_request(&request).await
    }

    /// Run the full call sequence for a validated request
    pub async fn provision_request(
        &self,
        request: &NodeRequest,
    ) -> Result<ProvisionedNode, ProvisionError> {
        let uri = self
            .create_node(request)
            .await
            .map_err(failed_at(ProvisionStage::CreateNode, None))?;

        let node_id =
            NodeId::from_uri(&uri).map_err(failed_at(ProvisionStage::ParseNodeId, None))?;
        log::info!("Created node {} as {}", request.ip_address, node_id);

        let pollers = self
            .assign_pollers(node_id)
            .await
            .map_err(failed_at(ProvisionStage::AssignPollers, Some(node_id)))?;

        let custom_properties = self
            .set_custom_properties(&uri, request)
            .await
            .map_err(failed_at(ProvisionStage::CustomProperties, Some(node_id)))?;

        self.poll_now(node_id)
            .await
            .map_err(failed_at(ProvisionStage::PollNow, Some(node_id)))?;

        let ncm_node_id = ncm::register_node(self.api, node_id, &request.ncm)
            .await
            .map_err(failed_at(ProvisionStage::RegisterNcm, Some(node_id)))?;
        log::info!("Registered node {} with NCM as {}", node_id, ncm_node_id);

        Ok(ProvisionedNode {
            uri,
            node_id,
            ncm_node_id,
            pollers,
            custom_properties,
        })
    }

    /// Properties for `Create Orion.Nodes`
    pub fn node_properties(&self, request: &NodeRequest) -> Map<String, Value> {
        let snmp = &self.snmp;
        let mut props = Map::new();
        props.insert("IPAddress".to_string(), json!(request.ip_address.to_string()));
        props.insert("EngineID".to_string(), json!(self.engine_id));
        props.insert("ObjectSubType".to_string(), json!("SNMP"));
        props.insert("SNMPVersion".to_string(), json!(3));
        props.insert("Caption".to_string(), json!(request.caption));
        props.insert("SNMPV3Username".to_string(), json!(snmp.username));
        props.insert("SNMPV3AuthKey".to_string(), json!(snmp.auth_key));
        props.insert("SNMPv3AuthKeyIsPwd".to_string(), json!(snmp.auth_key_is_password));
        props.insert("SNMPv3AuthMethod".to_string(), json!(snmp.auth_method.as_str()));
        props.insert("SNMPv3PrivKey".to_string(), json!(snmp.priv_key));
        props.insert("SNMPv3PrivKeyIsPwd".to_string(), json!(snmp.priv_key_is_password));
        props.insert("SNMPv3PrivMethod".to_string(), json!(snmp.priv_method.as_str()));
        props
    }

    async fn create_node(&self, request: &NodeRequest) -> Result<String> {
        log::info!(
            "Row {}: adding node {} ({})",
            request.row,
            request.ip_address,
            request.caption
        );
        self.api
            .create(NODE_ENTITY, self.node_properties(request))
            .await
            .with_context(|| format!("Create {} for {}", NODE_ENTITY, request.ip_address))
    }

    async fn assign_pollers(&self, node_id: NodeId) -> Result<usize> {
        for (poller_type, enabled) in pollers::POLLER_TABLE {
            log::debug!(
                "Adding poller {} (enabled: {}) to node {}",
                poller_type,
                enabled,
                node_id
            );
            self.api
                .create(
                    pollers::POLLER_ENTITY,
                    pollers::poller_properties(node_id, poller_type, enabled),
                )
                .await
                .with_context(|| format!("Poller {}", poller_type))?;
        }
        Ok(pollers::POLLER_TABLE.len())
    }

    async fn set_custom_properties(&self, uri: &str, request: &NodeRequest) -> Result<usize> {
        let target = format!("{}/CustomProperties", uri);
        for (name, value) in &request.custom_properties {
            log::debug!("Setting custom property {} = {}", name, value);
            let mut props = Map::new();
            props.insert(name.clone(), value.clone());
            self.api
                .update(&target, props)
                .await
                .with_context(|| format!("Custom property {}", name))?;
        }
        Ok(request.custom_properties.len())
    }

    async fn poll_now(&self, node_id: NodeId) -> Result<()> {
        log::debug!("Polling node {}", node_id);
        self.api
            .invoke(NODE_ENTITY, "PollNow", vec![json!(node_id.net_object())])
            .await?;
        Ok(())
    }
}

fn failed_at(
    stage: ProvisionStage,
    node_id: Option<NodeId>,
) -> impl FnOnce(anyhow::Error) -> ProvisionError {
    move |error| ProvisionError::new(stage, node_id, error)
}
