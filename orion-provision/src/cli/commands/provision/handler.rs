//! Provision command handler

use anyhow::{Context, Result};
use colored::*;

use super::ProvisionArgs;
use super::credentials::resolve_credentials;
use crate::api::{DryRunClient, Operation, SwisApi, SwisClient};
use crate::config::{ColumnConfig, Config};
use crate::excel::{NodeRecord, read_node_rows, write_report};
use crate::services::provisioning::{
    BatchEvent, BatchReport, NodeProvisioner, RowOutcome, RowStatus, run_batch,
};

/// Handle a provisioning run. Returns whether every row was provisioned.
pub async fn handle_provision_command(args: ProvisionArgs) -> Result<bool> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate(args.dry_run)?;

    let records = read_node_rows(&config.batch.file, &config.batch.sheet)?;
    if records.is_empty() {
        println!(
            "{}",
            format!(
                "No node rows found in {} [{}]",
                config.batch.file.display(),
                config.batch.sheet
            )
            .yellow()
        );
        return Ok(true);
    }

    println!(
        "Read {} node rows from {} [{}]",
        records.len().to_string().bold(),
        config.batch.file.display().to_string().cyan(),
        config.batch.sheet
    );

    let report = if args.dry_run {
        println!("{}", "Dry run: nothing will be sent to the server".yellow().bold());
        let client = DryRunClient::new(config.server.host.clone())
            .on_operation(|op| println!("{}", dry_run_line(op)));
        let report = provision_all(&client, &config, &records).await;
        println!(
            "{}",
            format!("Dry run issued {} SWIS calls", client.operations().len()).dimmed()
        );
        report
    } else {
        let credentials = resolve_credentials(&config)?;
        let client = SwisClient::new(&config.server, credentials, config.retry.resilience())
            .context("Failed to set up the SWIS client")?;
        println!("Using server: {}", client.base_url().bright_green().bold());
        provision_all(&client, &config, &records).await
    };

    println!();
    print_summary(&report);

    if let Some(path) = &args.report {
        write_report(&report, path)?;
        println!(
            "Report saved to: {}",
            path.display().to_string().bright_green()
        );
    }

    Ok(report.is_success())
}

async fn provision_all(api: &dyn SwisApi, config: &Config, records: &[NodeRecord]) -> BatchReport {
    let provisioner = NodeProvisioner::new(api, config);
    let columns = &config.columns;

    run_batch(&provisioner, records, config.batch.on_error, |event| {
        print_event(event, columns)
    })
    .await
}

fn print_event(event: BatchEvent<'_>, columns: &ColumnConfig) {
    match event {
        BatchEvent::RowStarted {
            index,
            total,
            record,
        } => {
            let caption = record.text(&columns.caption).unwrap_or_default();
            let ip = record.text(&columns.ip_address).unwrap_or_default();
            println!(
                "[{}/{}] Adding node {} {}",
                index + 1,
                total,
                caption.bold(),
                format!("({})", ip).dimmed()
            );
        }
        BatchEvent::RowFinished(outcome) => match &outcome.status {
            RowStatus::Provisioned(node) => {
                log::debug!("{} is {}", outcome.display_name(), node.uri);
                println!(
                    "  {} node {}: {} pollers, {} custom properties, polled, NCM node {}",
                    "DONE".green().bold(),
                    node.node_id,
                    node.pollers,
                    node.custom_properties,
                    node.ncm_node_id
                );
            }
            RowStatus::Failed(err) => {
                println!("  {} {}", "FAILED".red().bold(), err);
            }
            RowStatus::NotAttempted => {}
        },
        BatchEvent::Aborted { remaining } => println!(
            "{}",
            format!(
                "Stopping: {} remaining row(s) not attempted (use --on-error skip to continue past failures)",
                remaining
            )
            .yellow()
        ),
    }
}

/// One printed line per call a dry run would have sent
fn dry_run_line(operation: &Operation) -> String {
    format!("    {} {}", "would".yellow(), operation.describe())
}

fn print_summary(report: &BatchReport) {
    let elapsed = report.elapsed();
    println!(
        "{} provisioned, {} failed, {} not attempted in {:.1}s",
        report.provisioned().to_string().green().bold(),
        report.failed().to_string().red().bold(),
        report.not_attempted().to_string().yellow(),
        elapsed.num_milliseconds() as f64 / 1000.0
    );

    let failures: Vec<&RowOutcome> = report.outcomes.iter().filter(|o| o.is_failed()).collect();
    if failures.is_empty() {
        return;
    }

    println!();
    println!("{}", "Failed rows:".red().bold());
    for outcome in failures {
        if let RowStatus::Failed(err) = &outcome.status {
            println!("  row {} {}: {}", outcome.row, outcome.display_name(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn scenario_row() -> NodeRecord {
        NodeRecord::new(
            2,
            vec![
                ("IP_Address".to_string(), json!("10.0.0.5")),
                ("Caption".to_string(), json!("core-sw1")),
                ("ConnectionProfile".to_string(), json!("P1")),
                ("DeviceTemplate".to_string(), json!("T1")),
                ("NodeGroup".to_string(), json!("G1")),
                ("Site".to_string(), json!("HQ")),
            ],
        )
    }

    #[tokio::test]
    async fn test_dry_run_prints_every_call() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let client = DryRunClient::new("orion")
            .on_operation(move |op| sink.lock().unwrap().push(dry_run_line(op)));
        let config = Config::default();

        let report = provision_all(&client, &config, &[scenario_row()]).await;
        assert!(report.is_success());

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 18);
        assert!(lines[0].contains("create Orion.Nodes"));
        assert_eq!(
            lines
                .iter()
                .filter(|line| line.contains("create Orion.Pollers"))
                .count(),
            11
        );
        assert!(lines[12].contains("/CustomProperties [Site]"));
        assert!(lines[13].contains("invoke Orion.Nodes.PollNow"));
        assert!(lines[14].contains("invoke Cirrus.Nodes.AddNodeToNCM"));
        assert!(lines[15].contains("query `SELECT NodeID FROM Cirrus.Nodes"));
        assert!(lines[16].contains("invoke Cirrus.Nodes.GetNode"));
        assert!(lines[17].contains("invoke Cirrus.Nodes.UpdateNode"));
    }
}
