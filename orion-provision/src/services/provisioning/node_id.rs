//! Node identifier parsing

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Trailing decimal digits of a SWIS URI (`.../Orion.Nodes/NodeID=123`)
static TRAILING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)$").expect("trailing digits pattern is valid"));

/// Numeric Orion node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    #[cfg(test)]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Extract the node id from the URI returned by `Create Orion.Nodes`
    pub fn from_uri(uri: &str) -> Result<Self> {
        let digits = TRAILING_DIGITS
            .captures(uri.trim())
            .and_then(|caps| caps.get(1))
            .with_context(|| format!("No node id at the end of URI '{}'", uri))?;

        let id = digits
            .as_str()
            .parse::<u64>()
            .with_context(|| format!("Node id in URI '{}' is out of range", uri))?;
        Ok(Self(id))
    }

    /// Net object reference used by pollers and PollNow (`N:<id>`)
    pub fn net_object(&self) -> String {
        format!("N:{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
