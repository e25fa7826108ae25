//! Sequential batch execution with a failure policy

use chrono::Local;

use super::NodeProvisioner;
use super::outcome::{BatchReport, RowOutcome, RowStatus};
use crate::config::FailurePolicy;
use crate::excel::NodeRecord;

/// Progress notifications emitted while a batch runs
#[derive(Debug)]
pub enum BatchEvent<'a> {
    RowStarted {
        index: usize,
        total: usize,
        record: &'a NodeRecord,
    },
    RowFinished(&'a RowOutcome),
    Aborted {
        remaining: usize,
    },
}

/// Provision every record in order, one at a time.
///
/// With [`FailurePolicy::Abort`] the first failure stops the batch and the
/// remaining rows are reported as not attempted.
pub async fn run_batch<F>(
    provisioner: &NodeProvisioner<'_>,
    records: &[NodeRecord],
    policy: FailurePolicy,
    mut on_event: F,
) -> BatchReport
where
    F: FnMut(BatchEvent<'_>),
{
    let started_at = Local::now();
    let total = records.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut aborted = false;

    for (index, record) in records.iter().enumerate() {
        if aborted {
            outcomes.push(outcome_for(provisioner, record, RowStatus::NotAttempted));
            continue;
        }

        on_event(BatchEvent::RowStarted {
            index,
            total,
            record,
        });

        let status = match provisioner.provision(record).await {
            Ok(node) => RowStatus::Provisioned(node),
            Err(err) => {
                log::warn!("Row {} failed: {}", record.row, err);
                RowStatus::Failed(err)
            }
        };
        let outcome = outcome_for(provisioner, record, status);
        on_event(BatchEvent::RowFinished(&outcome));

        if outcome.is_failed() && policy == FailurePolicy::Abort {
            aborted = true;
            let remaining = total - index - 1;
            if remaining > 0 {
                on_event(BatchEvent::Aborted { remaining });
            }
        }
        outcomes.push(outcome);
    }

    BatchReport {
        outcomes,
        aborted,
        started_at,
        finished_at: Local::now(),
    }
}

fn outcome_for(
    provisioner: &NodeProvisioner<'_>,
    record: &NodeRecord,
    status: RowStatus,
) -> RowOutcome {
    let columns = provisioner.columns();
    RowOutcome {
        row: record.row,
        ip_address: record.text(&columns.ip_address),
        caption: record.text(&columns.caption),
        status,
    }
}
