// Execution unit entry point: environment in, one report out.
//
// The report is the only thing written to the designated channel (a file
// when JUDGE_REPORT_PATH is set, stdout otherwise) and it is written once,
// after the last case.

use crate::engine::Engine;
use crate::error::HarnessError;
use crate::loader;
use crate::registry::Registry;
use judge_common::env;
use judge_common::types::Report;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// What an execution unit needs to know about the run
#[derive(Debug, Clone)]
pub struct UnitConfig {
    pub encoded_suite: String,
    pub function_name: String,
    pub report_path: Option<PathBuf>,
}

impl UnitConfig {
    /// Read the run parameters from the process environment
    pub fn from_env() -> Result<Self, HarnessError> {
        let encoded_suite =
            std::env::var(env::TEST_CASES).map_err(|_| HarnessError::MissingEnv(env::TEST_CASES))?;
        let function_name = std::env::var(env::FUNCTION_NAME)
            .map_err(|_| HarnessError::MissingEnv(env::FUNCTION_NAME))?;
        let report_path = std::env::var_os(env::REPORT_PATH)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            encoded_suite,
            function_name,
            report_path,
        })
    }
}

/// Load the suite, resolve the function, run every case and emit the report
///
/// Harness errors abort before any case runs, so a failed run never
/// produces a partial report.
pub fn run_unit(registry: &Registry, config: &UnitConfig) -> Result<Report, HarnessError> {
    let (cases, function_name) = loader::load(&config.encoded_suite, &config.function_name)?;
    let function = registry.resolve(&function_name)?;

    info!(
        function = %function_name,
        cases = cases.len(),
        params = ?function.params(),
        "Starting run"
    );

    let report = Engine::new(function).run(&cases);
    write_report(&report, config.report_path.as_deref())?;
    Ok(report)
}

fn write_report(report: &Report, path: Option<&Path>) -> Result<(), HarnessError> {
    let payload = serde_json::to_string(report).map_err(io::Error::from)?;

    match path {
        Some(path) => fs::write(path, payload)?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", payload)?;
            handle.flush()?;
        }
    }
    Ok(())
}
