//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_report;
pub mod file_config_adapter;
pub mod svg_report;

use crate::ports::report_port::ReportPort;
use std::path::Path;

/// Picks the report writer from the output extension: `.csv` gets the CSV
/// export, anything else the SVG chart.
pub fn report_for_path(path: &Path) -> Box<dyn ReportPort> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(csv_report::CsvReportAdapter)
    } else {
        Box::new(svg_report::SvgReportAdapter)
    }
}
