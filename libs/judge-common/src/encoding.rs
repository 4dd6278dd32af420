/// Transport encoding for test suites
///
/// Suites travel as base64 over JSON. Payloads can carry literals such as
/// `true`, `null` or quote characters that would otherwise have to survive
/// being spliced into environment variables or generated harness code;
/// base64 leaves nothing for the transport to reinterpret.

use crate::types::TestCase;
use base64::{engine::general_purpose, Engine as _};

/// Encode a suite for transport to an execution unit
pub fn encode_suite(cases: &[TestCase]) -> serde_json::Result<String> {
    let json = serde_json::to_vec(cases)?;
    Ok(general_purpose::STANDARD.encode(json))
}

/// Reverse the base64 layer only; JSON decoding is the loader's job
pub fn decode_transport(raw: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(raw.trim())
}
