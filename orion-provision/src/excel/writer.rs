//! Write the per-row results of a run

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

use crate::services::provisioning::{BatchReport, RowOutcome, RowStatus};

const COLUMNS: [&str; 8] = [
    "Row",
    "IP_Address",
    "Caption",
    "Status",
    "NodeID",
    "NCMNodeID",
    "Stage",
    "Error",
];

/// One report line as text cells, in COLUMNS order
fn report_cells(outcome: &RowOutcome) -> [String; 8] {
    let (node_id, ncm_node_id, stage, error) = match &outcome.status {
        RowStatus::Provisioned(node) => (
            node.node_id.to_string(),
            node.ncm_node_id.clone(),
            String::new(),
            String::new(),
        ),
        RowStatus::Failed(err) => (
            err.node_id.map(|id| id.to_string()).unwrap_or_default(),
            String::new(),
            err.stage.label().to_string(),
            format!("{:#}", err.error),
        ),
        RowStatus::NotAttempted => Default::default(),
    };

    [
        outcome.row.to_string(),
        outcome.ip_address.clone().unwrap_or_default(),
        outcome.caption.clone().unwrap_or_default(),
        outcome.status.label().to_string(),
        node_id,
        ncm_node_id,
        stage,
        error,
    ]
}

/// Write the report as CSV when the path ends in `.csv`, otherwise as xlsx
pub fn write_report<P: AsRef<Path>>(report: &BatchReport, path: P) -> Result<()> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        write_report_csv(report, path)
    } else {
        write_report_excel(report, path)
    }
}

pub fn write_report_csv(report: &BatchReport, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;

    writer.write_record(COLUMNS)?;
    for outcome in &report.outcomes {
        writer.write_record(report_cells(outcome))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    Ok(())
}

pub fn write_report_excel(report: &BatchReport, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Results")?;

    let bold = Format::new().set_bold();
    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }

    for (idx, outcome) in report.outcomes.iter().enumerate() {
        let row = (idx + 1) as u32;
        let cells = report_cells(outcome);

        worksheet.write_number(row, 0, outcome.row as f64)?;
        for (col, value) in cells.iter().enumerate().skip(1) {
            if !value.is_empty() {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    worksheet.write_string(
        (report.outcomes.len() + 2) as u32,
        0,
        format!(
            "Generated {}",
            report.finished_at.format("%Y-%m-%d %H:%M:%S")
        ),
    )?;

    workbook
        .save(path)
        .with_context(|| format!("Failed to save report: {}", path.display()))?;

    Ok(())
}
