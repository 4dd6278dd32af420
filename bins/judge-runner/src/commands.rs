// CLI commands for running suites against an execution unit
use crate::config::RunnerConfig;
use crate::executor;
use anyhow::{bail, Context, Result};
use judge_common::types::{RunResponse, TestCase};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Problem definition as stored by the practice app
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFile {
    pub function_name: Option<String>,
    pub example_cases: Vec<TestCase>,
    #[serde(default)]
    pub hidden_cases: Vec<TestCase>,
}

/// A suite file is either a bare case array or a full problem definition
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SuiteFile {
    Cases(Vec<TestCase>),
    Problem(ProblemFile),
}

impl SuiteFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse suite file {}", path.display()))
    }

    /// Cases to run and the function they target
    ///
    /// An explicit function name wins over the one in a problem file.
    pub fn resolve(self, function: Option<&str>, include_hidden: bool) -> Result<(Vec<TestCase>, String)> {
        match self {
            SuiteFile::Cases(cases) => {
                let Some(function) = function else {
                    bail!("--function is required when the suite file is a bare case array");
                };
                Ok((cases, function.to_string()))
            }
            SuiteFile::Problem(problem) => {
                let function = match (function, problem.function_name) {
                    (Some(explicit), _) => explicit.to_string(),
                    (None, Some(declared)) => declared,
                    (None, None) => bail!("Problem file has no functionName; pass --function"),
                };
                let mut cases = problem.example_cases;
                if include_hidden {
                    cases.extend(problem.hidden_cases);
                }
                Ok((cases, function))
            }
        }
    }
}

/// Run a suite file and print the response; returns whether the run completed
pub async fn run_suite(
    suite_path: &Path,
    function: Option<&str>,
    include_hidden: bool,
    pretty: bool,
    config: &RunnerConfig,
) -> Result<bool> {
    let (cases, function) = SuiteFile::load(suite_path)?.resolve(function, include_hidden)?;

    let response = executor::execute(&cases, &function, config).await?;

    if response.error.is_none() {
        let passed = response.results.iter().filter(|r| r.passed).count();
        info!(function = %function, passed, total = response.results.len(), "Run completed");
    }

    print_response(&response, pretty)?;
    Ok(response.error.is_none())
}

fn print_response(response: &RunResponse, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string(response)
    }
    .context("Failed to serialize run response")?;

    println!("{}", json);
    Ok(())
}

/// Print the functions the execution unit registers
pub async fn list_functions(config: &RunnerConfig) -> Result<()> {
    let child = Command::new(&config.unit_binary)
        .arg("--list")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start execution unit {}", config.unit_binary.display()))?;

    let output = tokio::time::timeout(config.timeout(), child.wait_with_output())
        .await
        .context("Execution unit did not list its functions in time")?
        .context("Failed to wait for execution unit")?;

    if !output.status.success() {
        bail!(
            "Execution unit exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let names: Vec<String> = serde_json::from_slice(&output.stdout)
        .context("Execution unit returned an invalid function list")?;
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
