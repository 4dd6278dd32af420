/// Test Evaluator - Comparison and Aggregation
///
/// **Core Responsibility:**
/// Turn raw case executions into verdicts and fold them into one report.
///
/// **Critical Properties:**
/// - Knows nothing about capture, timing or panic containment
/// - Pure function: (case, execution) → outcome
/// - A case passes only if the invocation returned and the returned value
///   structurally equals `expected` (see `equality`)
/// - A mismatch, including a type mismatch, is a failed case, never an error

use crate::engine::{runtime_ms, CaseExecution};
use crate::equality::values_equal;
use judge_common::types::{ExecutionOutcome, Report, TestCase};

/// Evaluate one case execution against its expected value
pub fn evaluate_case(case: &TestCase, execution: CaseExecution) -> ExecutionOutcome {
    let CaseExecution {
        index,
        stdout,
        invocation,
    } = execution;

    match invocation {
        Ok((actual, elapsed)) => {
            let passed = values_equal(&actual, &case.expected);
            ExecutionOutcome::completed(index, case, actual, passed, stdout, runtime_ms(elapsed))
        }
        Err(trace) => ExecutionOutcome::errored(index, case, stdout, trace),
    }
}

/// Build the final report from outcomes already in index order
pub fn aggregate(outcomes: Vec<ExecutionOutcome>) -> Report {
    debug_assert!(outcomes.iter().enumerate().all(|(i, o)| o.index == i));
    Report::new(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn make_case(expected: Value) -> TestCase {
        TestCase::new(json!({"x": 1}).as_object().cloned().unwrap(), expected)
    }

    fn returned(index: usize, actual: Value) -> CaseExecution {
        CaseExecution {
            index,
            stdout: String::new(),
            invocation: Ok((actual, Duration::from_micros(1500))),
        }
    }

    #[test]
    fn test_evaluate_match() {
        let outcome = evaluate_case(&make_case(json!([1, 2, 3])), returned(0, json!([1, 2, 3])));
        assert!(outcome.passed);
        assert_eq!(outcome.actual, Some(json!([1, 2, 3])));
        assert_eq!(outcome.runtime_ms, Some(1.5));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_evaluate_mismatch_keeps_actual() {
        let outcome = evaluate_case(&make_case(json!({"a": 1})), returned(0, json!({"a": 1, "b": 2})));
        assert!(!outcome.passed);
        assert_eq!(outcome.actual, Some(json!({"a": 1, "b": 2})));
        assert!(outcome.runtime_ms.is_some());
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_evaluate_type_mismatch_is_not_an_error() {
        let outcome = evaluate_case(&make_case(json!("err")), returned(1, json!(1)));
        assert!(!outcome.passed);
        assert_eq!(outcome.actual, Some(json!(1)));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_evaluate_failure() {
        let execution = CaseExecution {
            index: 2,
            stdout: "before crash\n".to_string(),
            invocation: Err("Panic: boom".to_string()),
        };
        let outcome = evaluate_case(&make_case(json!(null)), execution);

        assert_eq!(outcome.index, 2);
        assert!(!outcome.passed);
        assert!(outcome.actual.is_none());
        assert!(outcome.runtime_ms.is_none());
        assert_eq!(outcome.stdout, "before crash\n");
        assert_eq!(outcome.error.as_deref(), Some("Panic: boom"));
    }

    #[test]
    fn test_returned_null_matches_expected_null() {
        let outcome = evaluate_case(&make_case(Value::Null), returned(0, Value::Null));
        assert!(outcome.passed);
        assert_eq!(outcome.actual, Some(Value::Null));
    }
}
