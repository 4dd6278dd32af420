mod solutions;

use judge_common::env;
use judge_common::types::Report;
use judge_harness::unit::{run_unit, UnitConfig};
use judge_harness::{HarnessError, Registry};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    // Returned errors carry a backtrace in their trace unless the operator
    // opted out explicitly. Set before anything else spawns threads.
    if std::env::var_os("RUST_LIB_BACKTRACE").is_none() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1");
    }

    init_tracing();

    let mut registry = Registry::new();
    solutions::register_all(&mut registry);

    if std::env::args().any(|arg| arg == "--list") {
        return list_functions(&registry);
    }

    let config = match UnitConfig::from_env() {
        Ok(config) => config,
        Err(e) => return harness_failure(&e),
    };

    finish(run_unit(&registry, &config), &config.function_name)
}

// Logs go to stderr: stdout may be the report channel. stderr is usually a
// pipe read by the runner, so no colour codes.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    if std::env::var(env::LOG_FORMAT).is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Exit status for a finished run: 0 with a report, 2 on a harness error,
/// 1 when the report itself could not be written
fn finish(result: Result<Report, HarnessError>, function_name: &str) -> ExitCode {
    match result {
        Ok(report) => {
            info!(
                function = %function_name,
                passed = report.passed_count(),
                total = report.len(),
                "Report written"
            );
            ExitCode::SUCCESS
        }
        Err(e @ HarnessError::Report(_)) => {
            error!(error = %e, "Failed to emit report");
            ExitCode::FAILURE
        }
        Err(e) => harness_failure(&e),
    }
}

// The runner reads the `harness_error`, `kind` and `error` fields back from
// the JSON log line.
fn harness_failure(e: &HarnessError) -> ExitCode {
    error!(
        harness_error = true,
        kind = e.kind(),
        error = %e,
        "Harness error; no report produced"
    );
    ExitCode::from(env::HARNESS_ERROR_EXIT)
}

fn function_list(registry: &Registry) -> serde_json::Result<String> {
    serde_json::to_string(&registry.names())
}

fn list_functions(registry: &Registry) -> ExitCode {
    match function_list(registry) {
        Ok(names) => {
            println!("{}", names);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize function list");
            ExitCode::FAILURE
        }
    }
}
