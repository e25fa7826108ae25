//! Split a spreadsheet row into node fields and custom properties

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::net::IpAddr;

use crate::config::ColumnConfig;
use crate::excel::NodeRecord;

/// NCM fields copied from the row onto the NCM node object.
/// A `Null` field (blank cell) is left untouched on the NCM node, so a blank
/// NodeGroup never clears an existing group.
#[derive(Debug, Clone, PartialEq)]
pub struct NcmAssignment {
    pub connection_profile: Value,
    pub device_template: Value,
    pub node_group: Value,
}

impl NcmAssignment {
    /// Overwrite the NCM fields on a `Cirrus.Nodes` object. Empty cells
    /// leave the current NCM value in place.
    pub fn apply(&self, ncm_node: &mut Map<String, Value>) {
        let fields = [
            ("ConnectionProfile", &self.connection_profile),
            ("DeviceTemplate", &self.device_template),
            ("NodeGroup", &self.node_group),
        ];
        for (key, value) in fields {
            if !value.is_null() {
                ncm_node.insert(key.to_string(), value.clone());
            }
        }
    }
}

/// Everything needed to provision one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRequest {
    pub row: usize,
    pub ip_address: IpAddr,
    pub caption: String,
    pub ncm: NcmAssignment,
    /// Non-excluded columns in sheet order
    pub custom_properties: Vec<(String, Value)>,
}

impl NodeRequest {
    /// Validate a record and split it by the configured column names
    pub fn from_record(record: &NodeRecord, columns: &ColumnConfig) -> Result<Self> {
        let ip_text = required_text(record, &columns.ip_address)?;
        let ip_address: IpAddr = ip_text
            .trim()
            .parse()
            .with_context(|| format!("'{}' is not a valid IP address", ip_text))?;

        let caption = required_text(record, &columns.caption)?;

        let ncm = NcmAssignment {
            connection_profile: required_column(record, &columns.connection_profile)?,
            device_template: required_column(record, &columns.device_template)?,
            node_group: required_column(record, &columns.node_group)?,
        };

        let custom_properties = record
            .fields()
            .filter(|(name, _)| !columns.is_excluded(name))
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();

        Ok(Self {
            row: record.row,
            ip_address,
            caption: caption.trim().to_string(),
            ncm,
            custom_properties,
        })
    }
}

fn required_column(record: &NodeRecord, column: &str) -> Result<Value> {
    record
        .get(column)
        .cloned()
        .with_context(|| format!("Column '{}' is missing", column))
}

fn required_text(record: &NodeRecord, column: &str) -> Result<String> {
    required_column(record, column)?;
    match record.text(column) {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => bail!("Column '{}' is empty", column),
    }
}
