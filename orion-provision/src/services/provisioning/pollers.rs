//! Fixed poller assignment applied to every new node

use serde_json::{Map, Value, json};

use super::node_id::NodeId;

pub const POLLER_ENTITY: &str = "Orion.Pollers";

/// Poller types and whether each starts enabled
pub const POLLER_TABLE: [(&str, bool); 11] = [
    ("N.Status.ICMP.Native", true),
    ("N.Status.SNMP.Native", false),
    ("N.ResponseTime.ICMP.Native", true),
    ("N.ResponseTime.SNMP.Native", false),
    ("N.Details.SNMP.Generic", true),
    ("N.Uptime.SNMP.Generic", true),
    ("N.Cpu.SNMP.HrProcessorLoad", true),
    ("N.Memory.SNMP.NetSnmpReal", true),
    ("N.AssetInventory.Snmp.Generic", true),
    ("N.Topology_Layer3.SNMP.ipNetToMedia", false),
    ("N.Routing.SNMP.Ipv4CidrRoutingTable", false),
];

/// Properties for one `Orion.Pollers` create call
pub fn poller_properties(node_id: NodeId, poller_type: &str, enabled: bool) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("PollerType".to_string(), json!(poller_type));
    props.insert("NetObject".to_string(), json!(node_id.net_object()));
    props.insert("NetObjectType".to_string(), json!("N"));
    props.insert("NetObjectID".to_string(), json!(node_id.get()));
    props.insert("Enabled".to_string(), json!(enabled));
    props
}
