//! Domain error types.

/// Top-level error type for sharpefolio.
#[derive(Debug, thiserror::Error)]
pub enum SharpefolioError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },

    #[error("benchmark {asset_id} missing from price data")]
    MissingBenchmark { asset_id: String },

    #[error("optimizer did not converge after {iterations} iterations")]
    SolverNonConvergence { iterations: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {asset_id}")]
    NoData { asset_id: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SharpefolioError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        SharpefolioError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl From<&SharpefolioError> for std::process::ExitCode {
    fn from(err: &SharpefolioError) -> Self {
        let code: u8 = match err {
            SharpefolioError::Io(_) => 1,
            SharpefolioError::ConfigParse { .. }
            | SharpefolioError::ConfigMissing { .. }
            | SharpefolioError::ConfigInvalid { .. } => 2,
            SharpefolioError::Data { .. } | SharpefolioError::NoData { .. } => 3,
            SharpefolioError::InvalidInput { .. }
            | SharpefolioError::DegenerateInput { .. }
            | SharpefolioError::MissingBenchmark { .. } => 4,
            SharpefolioError::SolverNonConvergence { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
