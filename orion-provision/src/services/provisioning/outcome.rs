//! Per-row results and the batch report

use chrono::{DateTime, Local};
use std::fmt;

use super::node_id::NodeId;

/// Step of the provisioning sequence, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    Validate,
    CreateNode,
    ParseNodeId,
    AssignPollers,
    CustomProperties,
    PollNow,
    RegisterNcm,
}

impl ProvisionStage {
    pub fn label(&self) -> &'static str {
        match self {
            ProvisionStage::Validate => "validate row",
            ProvisionStage::CreateNode => "create node",
            ProvisionStage::ParseNodeId => "parse node id",
            ProvisionStage::AssignPollers => "assign pollers",
            ProvisionStage::CustomProperties => "set custom properties",
            ProvisionStage::PollNow => "poll node",
            ProvisionStage::RegisterNcm => "register with NCM",
        }
    }
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A row that stopped part way through the sequence
#[derive(Debug)]
pub struct ProvisionError {
    pub stage: ProvisionStage,
    /// Set once the node exists in Orion, i.e. it may need manual cleanup
    pub node_id: Option<NodeId>,
    pub error: anyhow::Error,
}

impl ProvisionError {
    pub fn new(stage: ProvisionStage, node_id: Option<NodeId>, error: anyhow::Error) -> Self {
        Self {
            stage,
            node_id,
            error,
        }
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {}: {:#}", self.stage, self.error)?;
        if let Some(node_id) = self.node_id {
            write!(f, " (node {} was created)", node_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProvisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let source: &(dyn std::error::Error + 'static) = &*self.error;
        Some(source)
    }
}

/// Result of a fully provisioned row
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionedNode {
    pub uri: String,
    pub node_id: NodeId,
    pub ncm_node_id: String,
    pub pollers: usize,
    pub custom_properties: usize,
}

#[derive(Debug)]
pub enum RowStatus {
    Provisioned(ProvisionedNode),
    Failed(ProvisionError),
    /// The batch was aborted before reaching this row
    NotAttempted,
}

impl RowStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RowStatus::Provisioned(_) => "provisioned",
            RowStatus::Failed(_) => "failed",
            RowStatus::NotAttempted => "not attempted",
        }
    }
}

#[derive(Debug)]
pub struct RowOutcome {
    pub row: usize,
    pub ip_address: Option<String>,
    pub caption: Option<String>,
    pub status: RowStatus,
}

impl RowOutcome {
    /// Short label for progress output
    pub fn display_name(&self) -> String {
        match (&self.caption, &self.ip_address) {
            (Some(caption), Some(ip)) => format!("{} ({})", caption, ip),
            (Some(caption), None) => caption.clone(),
            (None, Some(ip)) => ip.clone(),
            (None, None) => format!("row {}", self.row),
        }
    }

    pub fn is_provisioned(&self) -> bool {
        matches!(self.status, RowStatus::Provisioned(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RowStatus::Failed(_))
    }
}

/// Outcome of a whole run
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<RowOutcome>,
    /// True when a failure stopped the batch early
    pub aborted: bool,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl BatchReport {
    pub fn provisioned(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_provisioned()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn not_attempted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RowStatus::NotAttempted))
            .count()
    }

    /// Every row was provisioned
    pub fn is_success(&self) -> bool {
        !self.aborted && self.failed() == 0
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
