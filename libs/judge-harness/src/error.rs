use thiserror::Error;

/// Failures of the judging infrastructure itself
///
/// Any of these aborts the whole run and no report is produced. Failures of
/// the candidate function are never represented here; they end up in the
/// `error` field of that case's outcome.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("malformed test suite: {0}")]
    MalformedSuite(String),

    #[error("function '{0}' is not registered in this execution unit")]
    UnknownFunction(String),

    #[error("required environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

impl HarnessError {
    /// Short stable tag for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            HarnessError::MalformedSuite(_) => "malformed_suite",
            HarnessError::UnknownFunction(_) => "unknown_function",
            HarnessError::MissingEnv(_) => "missing_env",
            HarnessError::Report(_) => "report_write",
        }
    }
}
