use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One (input, expected) pair used to validate a candidate function
///
/// `input` maps parameter names to argument values; the harness expands it
/// as named arguments when invoking the function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Map<String, Value>,
    pub expected: Value,
}

impl TestCase {
    pub fn new(input: Map<String, Value>, expected: Value) -> Self {
        Self { input, expected }
    }
}

/// Per-case verdict
///
/// Either the invocation completed (`actual` and `runtime_ms` present, no
/// `error`) or it failed (`error` present, no `actual` or `runtime_ms`).
/// The harness builds outcomes only through `completed` and `errored`, which
/// keep that split; the fields stay public for readers of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub index: usize,
    pub passed: bool,
    pub input: Map<String, Value>,
    pub expected: Value,
    pub actual: Option<Value>,
    pub stdout: String,
    pub runtime_ms: Option<f64>,
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// Outcome for an invocation that returned normally
    pub fn completed(
        index: usize,
        case: &TestCase,
        actual: Value,
        passed: bool,
        stdout: String,
        runtime_ms: f64,
    ) -> Self {
        Self {
            index,
            passed,
            input: case.input.clone(),
            expected: case.expected.clone(),
            actual: Some(actual),
            stdout,
            runtime_ms: Some(runtime_ms),
            error: None,
        }
    }

    /// Outcome for an invocation that failed; never passes
    pub fn errored(index: usize, case: &TestCase, stdout: String, error: String) -> Self {
        Self {
            index,
            passed: false,
            input: case.input.clone(),
            expected: case.expected.clone(),
            actual: None,
            stdout,
            runtime_ms: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate of one run, index-aligned with the input suite
///
/// Built once from the full outcome sequence; there is no API to mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    results: Vec<ExecutionOutcome>,
}

impl Report {
    pub fn new(results: Vec<ExecutionOutcome>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[ExecutionOutcome] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ExecutionOutcome> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// What the runner hands back to its caller
///
/// `error` is set when the run itself did not complete (timeout, harness
/// failure, missing unit); `results` is then empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub results: Vec<ExecutionOutcome>,
    pub error: Option<String>,
    pub stderr: Option<String>,
}

impl RunResponse {
    pub fn from_report(report: Report, stderr: Option<String>) -> Self {
        Self {
            results: report.into_results(),
            error: None,
            stderr,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            error: Some(error.into()),
            stderr: None,
        }
    }
}
