/// Unit Executor - Time-Bounded Orchestration
///
/// **Responsibility:**
/// Run one execution unit as a child process under a wall-clock limit and
/// turn whatever happened into a `RunResponse`.
///
/// **Architecture:**
/// 1. Encode the suite with the shared transport encoding
/// 2. Spawn the unit with the suite, function name and a fresh report path
/// 3. Wait under `tokio::time::timeout`; the child is killed if the limit hits
/// 4. Read the report file and map the run onto a response
///
/// The unit's own stdout is never parsed as the report. Candidate code that
/// bypasses the capture context and prints directly cannot corrupt it.

use crate::config::RunnerConfig;
use anyhow::{Context, Result};
use judge_common::encoding::encode_suite;
use judge_common::env;
use judge_common::types::{Report, RunResponse, TestCase};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How a unit run ended, before interpretation
#[derive(Debug)]
pub enum UnitOutcome {
    Finished {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        report: Option<String>,
    },
    TimedOut,
    NotFound(PathBuf),
    SpawnFailed(String),
}

/// Report file cleanup guard - removes the file on every exit path
struct ReportFile {
    path: PathBuf,
}

impl ReportFile {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("judge_report_{}.json", uuid::Uuid::new_v4()));
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ReportFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove report file"),
        }
    }
}

/// Execute a suite against `function_name` in a fresh execution unit
pub async fn execute(cases: &[TestCase], function_name: &str, config: &RunnerConfig) -> Result<RunResponse> {
    let encoded = encode_suite(cases).context("Failed to encode test suite")?;
    let report_file = ReportFile::new();

    info!(
        function = function_name,
        cases = cases.len(),
        unit = %config.unit_binary.display(),
        timeout_ms = config.timeout_ms,
        "Starting execution unit"
    );

    let start = std::time::Instant::now();
    let outcome = run_unit(config, &encoded, function_name, report_file.path()).await;
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Execution unit finished");

    Ok(interpret(outcome, config.timeout_ms))
}

async fn run_unit(config: &RunnerConfig, encoded: &str, function_name: &str, report_path: &Path) -> UnitOutcome {
    let mut command = Command::new(&config.unit_binary);
    command
        .env(env::TEST_CASES, encoded)
        .env(env::FUNCTION_NAME, function_name)
        .env(env::REPORT_PATH, report_path)
        .env(env::LOG_FORMAT, "json")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return UnitOutcome::NotFound(config.unit_binary.clone());
        }
        Err(e) => return UnitOutcome::SpawnFailed(format!("Failed to start execution unit: {}", e)),
    };

    // Dropping the wait future on timeout drops the child, which kills it
    match tokio::time::timeout(config.timeout(), child.wait_with_output()).await {
        Err(_) => {
            warn!(timeout_ms = config.timeout_ms, "Execution unit timed out; killed");
            UnitOutcome::TimedOut
        }
        Ok(Err(e)) => UnitOutcome::SpawnFailed(format!("Failed to wait for execution unit: {}", e)),
        Ok(Ok(output)) => {
            let report = tokio::fs::read_to_string(report_path).await.ok();
            UnitOutcome::Finished {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                report,
            }
        }
    }
}

/// Map a unit outcome onto the response the caller sees
///
/// Only a parseable report yields results; every other ending is a run
/// failure with an explanatory `error` and no results. A harness failure
/// inside the unit is reported with a `Harness error:` prefix so callers can
/// tell it apart from a crashed or killed unit.
pub fn interpret(outcome: UnitOutcome, timeout_ms: u64) -> RunResponse {
    match outcome {
        UnitOutcome::TimedOut => RunResponse::failed(format!(
            "Time Limit Exceeded ({}s). Check for infinite loops.",
            format_seconds(timeout_ms)
        )),
        UnitOutcome::NotFound(path) => RunResponse::failed(format!(
            "Execution unit not found at {}. Build it with `cargo build --release -p judge-unit`.",
            path.display()
        )),
        UnitOutcome::SpawnFailed(message) => RunResponse::failed(message),
        UnitOutcome::Finished {
            exit_code,
            stdout,
            stderr,
            report,
        } => {
            if exit_code == Some(i32::from(env::HARNESS_ERROR_EXIT)) {
                let detail = harness_error_detail(&stderr)
                    .or_else(|| non_empty(&stderr))
                    .unwrap_or_else(|| "execution unit produced no report".to_string());
                warn!(detail = %detail, "Harness error in execution unit");
                return RunResponse::failed(format!("Harness error: {}", detail));
            }

            if let Some(text) = report {
                match serde_json::from_str::<Report>(&text) {
                    Ok(report) => return RunResponse::from_report(report, non_empty(&stderr)),
                    Err(e) => warn!(error = %e, "Unparseable report from execution unit"),
                }
            }

            warn!(exit_code = ?exit_code, "Execution unit produced no report");
            let error = non_empty(&stderr)
                .or_else(|| non_empty(&stdout))
                .unwrap_or_else(|| "Unknown execution error".to_string());
            RunResponse::failed(error)
        }
    }
}

/// Pull the harness error out of the unit's JSON log lines, latest first
fn harness_error_detail(stderr: &str) -> Option<String> {
    stderr.lines().rev().find_map(|line| {
        let entry: Value = serde_json::from_str(line).ok()?;
        let fields = entry.get("fields")?;
        if !fields.get("harness_error")?.as_bool()? {
            return None;
        }
        let error = fields.get("error")?.as_str()?;
        Some(match fields.get("kind").and_then(Value::as_str) {
            Some(kind) => format!("{} ({})", error, kind),
            None => error.to_string(),
        })
    })
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn format_seconds(ms: u64) -> String {
    if ms % 1000 == 0 {
        (ms / 1000).to_string()
    } else {
        format!("{:.1}", ms as f64 / 1000.0)
    }
}
