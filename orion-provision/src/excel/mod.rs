//! Spreadsheet input and results output

pub mod reader;
pub mod writer;

pub use reader::{NodeRecord, read_node_rows};
pub use writer::write_report;
