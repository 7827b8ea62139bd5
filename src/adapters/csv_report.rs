//! CSV export of the cumulative return series: `date,portfolio,benchmark`.

use std::path::Path;

use crate::domain::analysis::AnalysisReport;
use crate::domain::error::SharpefolioError;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &Path) -> Result<(), SharpefolioError> {
        let to_data_err = |e: csv::Error| SharpefolioError::Data {
            reason: format!("failed to write {}: {}", output_path.display(), e),
        };

        let mut wtr = csv::Writer::from_path(output_path).map_err(to_data_err)?;
        let portfolio = &report.evaluation.portfolio;
        let benchmark = &report.evaluation.benchmark;

        wtr.write_record(["date", "portfolio", benchmark.label.as_str()])
            .map_err(to_data_err)?;
        for (p, b) in portfolio.points.iter().zip(benchmark.points.iter()) {
            wtr.write_record([
                p.date.format("%Y-%m-%d").to_string(),
                format!("{:.8}", p.value),
                format!("{:.8}", b.value),
            ])
            .map_err(to_data_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
