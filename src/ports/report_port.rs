//! Report generation port trait.

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::SharpefolioError;
use std::path::Path;

/// Port for writing the cumulative-return comparison of a finished run.
pub trait ReportPort {
    fn write(&self, report: &AnalysisReport, output_path: &Path) -> Result<(), SharpefolioError>;
}
