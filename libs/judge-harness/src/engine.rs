/// Execution Engine - Per-Case Invocation
///
/// **Core Responsibility:**
/// Invoke the function under test once per case and capture what happened:
/// the returned value or a failure trace, the case's captured output, and
/// how long the call took.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to invoke (binding, capture, timing, containment)
/// - Engine does NOT decide correctness; the evaluator compares results
/// - No error raised by a candidate ever propagates past this module
///
/// **Per-case protocol:**
/// 1. Fresh `Capture` buffer and a `CaseScope` guard
/// 2. Bind the case input to the declared parameters
/// 3. Monotonic timer around the call, stopped on normal return only
/// 4. Panics are caught; returned errors and panics become a trace string
/// 5. Guard dropped before captured output is read and the next case starts
///
/// Cases run strictly one after another in input order. Runs for different
/// suites may happen concurrently on different threads; they share nothing
/// but the panic hook, which only diverts panics on a thread inside a scope.

use crate::capture::{Capture, CaseScope};
use crate::evaluator;
use crate::registry::{ArgumentError, RegisteredFunction};
use judge_common::types::{Report, TestCase};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Result of one invocation before comparison
///
/// `Ok` carries the returned value and the call duration; `Err` carries the
/// rendered failure trace.
pub type Invocation = Result<(Value, Duration), String>;

/// Raw record of one case, produced by the engine and consumed by the evaluator
#[derive(Debug, Clone)]
pub struct CaseExecution {
    pub index: usize,
    pub stdout: String,
    pub invocation: Invocation,
}

/// Runs a resolved function against a suite
pub struct Engine<'r> {
    function: &'r RegisteredFunction,
}

impl<'r> Engine<'r> {
    pub fn new(function: &'r RegisteredFunction) -> Self {
        Self { function }
    }

    /// Execute every case in order and aggregate one report
    #[instrument(skip_all, fields(function = %self.function.name(), cases = cases.len()))]
    pub fn run(&self, cases: &[TestCase]) -> Report {
        let outcomes = cases
            .iter()
            .enumerate()
            .map(|(index, case)| {
                let execution = self.execute_case(index, case);
                let outcome = evaluator::evaluate_case(case, execution);

                debug!(
                    index = outcome.index,
                    passed = outcome.passed,
                    runtime_ms = outcome.runtime_ms,
                    errored = outcome.is_error(),
                    stdout_bytes = outcome.stdout.len(),
                    "Case finished"
                );
                outcome
            })
            .collect();

        let report = evaluator::aggregate(outcomes);
        info!(
            passed = report.passed_count(),
            total = report.len(),
            "Run complete"
        );
        report
    }

    /// Execute a single case; never panics on behalf of the candidate
    pub fn execute_case(&self, index: usize, case: &TestCase) -> CaseExecution {
        let mut capture = Capture::new();
        let invocation = self.invoke(case, &mut capture);

        CaseExecution {
            index,
            stdout: capture.into_stdout(),
            invocation,
        }
    }

    fn invoke(&self, case: &TestCase, capture: &mut Capture) -> Invocation {
        let args = self
            .function
            .bind(&case.input)
            .map_err(|e| render_argument_error(&e))?;

        let scope = CaseScope::enter();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let start = Instant::now();
            let returned = self.function.call(&args, capture)?;
            Ok::<_, anyhow::Error>((returned, start.elapsed()))
        }));

        let invocation = match result {
            Ok(Ok(returned)) => Ok(returned),
            Ok(Err(err)) => Err(render_error(&err)),
            Err(payload) => Err(scope.take_panic(payload.as_ref()).render()),
        };
        drop(scope);

        invocation
    }
}

/// Convenience wrapper: `Engine::new(function).run(cases)`
pub fn run(function: &RegisteredFunction, cases: &[TestCase]) -> Report {
    Engine::new(function).run(cases)
}

/// Milliseconds rounded to two decimal places
pub fn runtime_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}

fn render_argument_error(err: &ArgumentError) -> String {
    format!("ArgumentError: {}", err)
}

fn render_error(err: &anyhow::Error) -> String {
    if let Some(arg_err) = err.downcast_ref::<ArgumentError>() {
        return render_argument_error(arg_err);
    }
    // {:?} on anyhow renders the cause chain and, when captured, the backtrace
    format!("Error: {:?}", err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_rounding() {
        assert_eq!(runtime_ms(Duration::from_micros(1234)), 1.23);
        assert_eq!(runtime_ms(Duration::from_micros(1236)), 1.24);
        assert_eq!(runtime_ms(Duration::from_nanos(4_000)), 0.0);
        assert_eq!(runtime_ms(Duration::from_millis(250)), 250.0);
    }

    #[test]
    fn test_render_error_includes_cause_chain() {
        let err = anyhow::anyhow!("inner failure").context("outer step");
        let rendered = render_error(&err);
        assert!(rendered.starts_with("Error: outer step"));
        assert!(rendered.contains("inner failure"));
    }
}
