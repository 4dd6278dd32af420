/// Test Case Loader
///
/// **Core Responsibility:**
/// Turn the transport-encoded suite into an ordered list of typed cases.
///
/// **Decoding steps:**
/// 1. base64 → bytes
/// 2. bytes → JSON value
/// 3. JSON value must be an array of objects, each with an `input` object
///    and an `expected` field (any value, `null` included)
///
/// Any failure is a `MalformedSuite` harness error: a broken suite means
/// the harness was built wrong, not that the candidate is wrong.

use crate::error::HarnessError;
use judge_common::encoding::decode_transport;
use judge_common::types::TestCase;
use serde_json::Value;

/// Decode a suite and pair it with the function name it targets
pub fn load(raw_encoded_suite: &str, function_name: &str) -> Result<(Vec<TestCase>, String), HarnessError> {
    let bytes = decode_transport(raw_encoded_suite)
        .map_err(|e| HarnessError::MalformedSuite(format!("invalid base64: {}", e)))?;

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| HarnessError::MalformedSuite(format!("invalid JSON: {}", e)))?;

    let cases = parse_cases(value)?;

    let function_name = function_name.trim();
    if function_name.is_empty() {
        return Err(HarnessError::MalformedSuite("function name is empty".to_string()));
    }

    Ok((cases, function_name.to_string()))
}

fn parse_cases(value: Value) -> Result<Vec<TestCase>, HarnessError> {
    let Value::Array(elements) = value else {
        return Err(HarnessError::MalformedSuite(format!(
            "expected an array of test cases, got {}",
            type_name(&value)
        )));
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| parse_case(index, element))
        .collect()
}

fn parse_case(index: usize, element: Value) -> Result<TestCase, HarnessError> {
    let Value::Object(mut fields) = element else {
        return Err(HarnessError::MalformedSuite(format!(
            "case {} is {}, expected an object",
            index,
            type_name(&element)
        )));
    };

    let input = match fields.remove("input") {
        Some(Value::Object(input)) => input,
        Some(other) => {
            return Err(HarnessError::MalformedSuite(format!(
                "case {}: 'input' is {}, expected an object",
                index,
                type_name(&other)
            )))
        }
        None => {
            return Err(HarnessError::MalformedSuite(format!(
                "case {}: missing 'input'",
                index
            )))
        }
    };

    let expected = fields
        .remove("expected")
        .ok_or_else(|| HarnessError::MalformedSuite(format!("case {}: missing 'expected'", index)))?;

    Ok(TestCase::new(input, expected))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
