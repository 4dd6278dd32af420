/// End-to-end tests for the execution and comparison engine
///
/// These tests drive the full per-case protocol through real registered
/// functions:
/// 1. Index alignment regardless of failures
/// 2. Failure isolation between cases
/// 3. Captured output truncation and non-leak between cases
/// 4. Equality semantics through the engine
/// 5. Failure traces for panics, returned errors and argument errors

#[cfg(test)]
mod engine_e2e_tests {
    use crate::capture::{STDOUT_LIMIT_BYTES, TRUNCATION_MARKER};
    use crate::engine::Engine;
    use crate::registry::Registry;
    use judge_common::types::TestCase;
    use serde_json::{json, Value};
    use std::io::Write;

    fn make_case(input: Value, expected: Value) -> TestCase {
        TestCase::new(input.as_object().cloned().unwrap(), expected)
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register("square", &["x"], |args, _out| {
                let x: i64 = args.get("x")?;
                Ok(x * x)
            })
            .register("identity", &["value"], |args, _out| {
                Ok(args.get::<Value>("value")?)
            })
            .register("chatty", &["n", "fail"], |args, out| {
                let n: usize = args.get("n")?;
                let fail: bool = args.get("fail")?;
                out.print("x".repeat(n));
                if fail {
                    anyhow::bail!("gave up after printing {} bytes", n);
                }
                Ok(n)
            })
            .register("crash_on_odd", &["x"], |args, out| {
                let x: i64 = args.get("x")?;
                writeln!(out, "checking {}", x)?;
                if x % 2 != 0 {
                    let empty: Vec<i64> = Vec::new();
                    return Ok(empty[x as usize]);
                }
                Ok(x / 2)
            });
        registry
    }

    #[test]
    fn test_end_to_end_square_scenario() {
        let registry = registry();
        let square = registry.resolve("square").unwrap();
        let cases = vec![
            make_case(json!({"x": 2}), json!(4)),
            make_case(json!({"x": -1}), json!("err")),
        ];

        let report = Engine::new(square).run(&cases);
        let results = report.results();

        assert_eq!(results.len(), 2);
        assert!(results[0].passed);
        assert_eq!(results[0].actual, Some(json!(4)));

        assert!(!results[1].passed);
        assert_eq!(results[1].actual, Some(json!(1)));
        assert_eq!(results[1].expected, json!("err"));
        assert!(results[1].error.is_none());
        assert!(results[1].runtime_ms.is_some());
    }

    #[test]
    fn test_index_alignment_with_failures() {
        let registry = registry();
        let crash = registry.resolve("crash_on_odd").unwrap();
        let cases: Vec<TestCase> = (0..7)
            .map(|x| make_case(json!({"x": x}), json!(x / 2)))
            .collect();

        let report = Engine::new(crash).run(&cases);

        assert_eq!(report.len(), 7);
        for (i, outcome) in report.results().iter().enumerate() {
            assert_eq!(outcome.index, i);
            assert_eq!(outcome.input["x"], json!(i));
            assert_eq!(outcome.is_error(), i % 2 == 1);
        }
        assert_eq!(report.passed_count(), 4);
    }

    #[test]
    fn test_failure_does_not_affect_next_case() {
        let registry = registry();
        let crash = registry.resolve("crash_on_odd").unwrap();
        let cases = vec![
            make_case(json!({"x": 1}), json!(0)),
            make_case(json!({"x": 4}), json!(2)),
        ];

        let report = Engine::new(crash).run(&cases);
        let (a, b) = (&report.results()[0], &report.results()[1]);

        assert!(!a.passed);
        assert!(a.actual.is_none());
        assert!(a.runtime_ms.is_none());
        let trace = a.error.as_deref().unwrap();
        assert!(trace.starts_with("Panic: index out of bounds"), "trace: {}", trace);
        assert!(trace.contains("\n  at "));
        assert!(trace.contains("stack backtrace:"));
        assert_eq!(a.stdout, "checking 1\n");

        assert!(b.passed);
        assert_eq!(b.actual, Some(json!(2)));
        assert!(b.runtime_ms.is_some());
        assert!(b.error.is_none());
        assert_eq!(b.stdout, "checking 4\n");
    }

    #[test]
    fn test_stdout_truncated_on_success() {
        let registry = registry();
        let chatty = registry.resolve("chatty").unwrap();
        let cases = vec![make_case(json!({"n": 20000, "fail": false}), json!(20000))];

        let report = Engine::new(chatty).run(&cases);
        let outcome = &report.results()[0];

        assert!(outcome.passed);
        assert_eq!(outcome.stdout.len(), STDOUT_LIMIT_BYTES + TRUNCATION_MARKER.len());
        assert!(outcome.stdout.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_stdout_truncated_on_failure_with_same_marker() {
        let registry = registry();
        let chatty = registry.resolve("chatty").unwrap();
        let cases = vec![make_case(json!({"n": 20000, "fail": true}), json!(0))];

        let report = Engine::new(chatty).run(&cases);
        let outcome = &report.results()[0];

        assert!(outcome.is_error());
        assert_eq!(outcome.stdout.len(), STDOUT_LIMIT_BYTES + TRUNCATION_MARKER.len());
        assert!(outcome.stdout.ends_with(TRUNCATION_MARKER));
        let trace = outcome.error.as_deref().unwrap();
        assert!(trace.starts_with("Error: gave up after printing 20000 bytes"));
    }

    #[test]
    fn test_capture_does_not_leak_between_cases() {
        let registry = registry();
        let chatty = registry.resolve("chatty").unwrap();
        let cases = vec![
            make_case(json!({"n": 5, "fail": false}), json!(5)),
            make_case(json!({"n": 0, "fail": false}), json!(0)),
            make_case(json!({"n": 3, "fail": true}), json!(3)),
            make_case(json!({"n": 0, "fail": true}), json!(0)),
        ];

        let report = Engine::new(chatty).run(&cases);
        let stdouts: Vec<&str> = report.results().iter().map(|o| o.stdout.as_str()).collect();
        assert_eq!(stdouts, ["xxxxx", "", "xxx", ""]);
    }

    #[test]
    fn test_identity_passes_and_single_field_mutation_fails() {
        let registry = registry();
        let identity = registry.resolve("identity").unwrap();
        let value = json!({"name": "ada", "scores": [1, 2, 3], "meta": {"active": true}});
        let mut mutated = value.clone();
        mutated["meta"]["active"] = json!(false);

        let cases = vec![
            make_case(json!({"value": value.clone()}), value),
            make_case(json!({"value": mutated}), json!({"name": "ada", "scores": [1, 2, 3], "meta": {"active": true}})),
        ];

        let report = Engine::new(identity).run(&cases);
        assert!(report.results()[0].passed);
        assert!(!report.results()[1].passed);
        assert!(report.results()[1].error.is_none());
    }

    #[test]
    fn test_equality_semantics_through_engine() {
        let registry = registry();
        let identity = registry.resolve("identity").unwrap();
        let cases = vec![
            make_case(json!({"value": [1, 2, 3]}), json!([1, 2, 3])),
            make_case(json!({"value": {"a": 1, "b": 2}}), json!({"a": 1})),
            make_case(json!({"value": [1, 2]}), json!([2, 1])),
            make_case(json!({"value": true}), json!(1)),
        ];

        let report = Engine::new(identity).run(&cases);
        let passed: Vec<bool> = report.results().iter().map(|o| o.passed).collect();
        assert_eq!(passed, [true, false, false, false]);
    }

    #[test]
    fn test_argument_errors_are_case_level() {
        let registry = registry();
        let square = registry.resolve("square").unwrap();
        let cases = vec![
            make_case(json!({"y": 2}), json!(4)),
            make_case(json!({}), json!(0)),
            make_case(json!({"x": "two"}), json!(4)),
            make_case(json!({"x": 3}), json!(9)),
        ];

        let report = Engine::new(square).run(&cases);
        let results = report.results();

        assert_eq!(
            results[0].error.as_deref(),
            Some("ArgumentError: square() got an unexpected keyword argument 'y'")
        );
        assert_eq!(
            results[1].error.as_deref(),
            Some("ArgumentError: square() missing required argument 'x'")
        );
        assert!(results[2]
            .error
            .as_deref()
            .unwrap()
            .starts_with("ArgumentError: square() argument 'x' has the wrong type"));
        assert!(results[3].passed);
    }

    #[test]
    fn test_unserializable_return_is_case_error() {
        let mut registry = Registry::new();
        registry.register("bad_map", &[], |_args, _out| {
            let mut map = std::collections::HashMap::new();
            map.insert(vec![1u8], 1);
            Ok(map)
        });
        let bad = registry.resolve("bad_map").unwrap();

        let report = Engine::new(bad).run(&[make_case(json!({}), json!({}))]);
        let trace = report.results()[0].error.as_deref().unwrap();
        assert!(trace.starts_with("Error: return value is not representable"));
    }

    #[test]
    fn test_non_finite_return_never_matches_null() {
        let mut registry = Registry::new();
        registry
            .register("nan", &[], |_args, _out| Ok(f64::NAN))
            .register("inf", &[], |_args, _out| Ok(f64::INFINITY));

        for name in ["nan", "inf"] {
            let function = registry.resolve(name).unwrap();
            let report = Engine::new(function).run(&[make_case(json!({}), Value::Null)]);
            let outcome = &report.results()[0];

            assert!(!outcome.passed, "{} passed against null", name);
            assert!(outcome.actual.is_none());
            assert!(outcome
                .error
                .as_deref()
                .unwrap()
                .starts_with("Error: return value contains a non-finite float"));
        }
    }

    #[test]
    fn test_empty_suite_yields_empty_report() {
        let registry = registry();
        let square = registry.resolve("square").unwrap();
        let report = Engine::new(square).run(&[]);
        assert!(report.is_empty());
        assert_eq!(serde_json::to_string(&report).unwrap(), r#"{"results":[]}"#);
    }

    #[test]
    fn test_concurrent_runs_are_isolated() {
        let registry = registry();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let registry = &registry;
                    s.spawn(move || {
                        let crash = registry.resolve("crash_on_odd").unwrap();
                        let cases: Vec<TestCase> = (0..10)
                            .map(|x| make_case(json!({"x": x + t}), json!((x + t) / 2)))
                            .collect();
                        Engine::new(crash).run(&cases)
                    })
                })
                .collect();

            for (t, handle) in handles.into_iter().enumerate() {
                let report = handle.join().unwrap();
                for outcome in report.results() {
                    let x = outcome.index + t;
                    assert_eq!(outcome.stdout, format!("checking {}\n", x));
                    assert_eq!(outcome.is_error(), x % 2 == 1);
                }
            }
        });
    }
}
