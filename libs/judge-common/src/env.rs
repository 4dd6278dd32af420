// Environment contract between the runner and an execution unit.
// Both sides read these names from here so they never drift.

/// Base64-encoded JSON array of test cases
pub const TEST_CASES: &str = "JUDGE_TEST_CASES";

/// Name of the registered function under test
pub const FUNCTION_NAME: &str = "JUDGE_FUNCTION_NAME";

/// Optional file the unit writes its report to (stdout when unset)
pub const REPORT_PATH: &str = "JUDGE_REPORT_PATH";

/// Runner override for the execution unit binary
pub const UNIT_BIN: &str = "JUDGE_UNIT_BIN";

/// Unit log format switch; the runner always asks for `json`
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Unit exit status when the harness itself failed and no report exists
pub const HARNESS_ERROR_EXIT: u8 = 2;
