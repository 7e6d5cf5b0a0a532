//! Response validation

use serde_json::Value;
use sp_protocol::RpcResponse;
use tracing::{debug, warn};

use crate::host::rpc::REQUEST_ID;

use super::Outcome;

/// Classify raw response bytes against `expected`.
///
/// The comparison is exact: case, whitespace and encoding differences are
/// mismatches.
pub fn validate_response(raw: &[u8], expected: &str) -> Outcome {
    if raw.is_empty() {
        return Outcome::DecodeError {
            reason: "empty response: connection closed before any data".to_string(),
            raw: String::new(),
        };
    }

    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => {
            return Outcome::DecodeError {
                reason: format!("response is not valid UTF-8: {}", e),
                raw: String::from_utf8_lossy(raw).into_owned(),
            }
        }
    };

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return Outcome::DecodeError {
                reason: format!("invalid JSON response: {}", e),
                raw: text.to_string(),
            }
        }
    };

    let Some(response) = RpcResponse::from_value(&value) else {
        return Outcome::ProtocolError {
            detail: "response is not a JSON object".to_string(),
            error: None,
        };
    };

    if !response.is_jsonrpc_2() {
        warn!(jsonrpc = ?response.jsonrpc, "response does not declare JSON-RPC 2.0");
    }
    if response.id != Some(Value::from(REQUEST_ID)) {
        warn!(id = ?response.id, expected = REQUEST_ID, "response id does not match request");
    }

    match response.result_value() {
        None => Outcome::ProtocolError {
            detail: match &response.error {
                Some(_) => "server returned an error instead of a result".to_string(),
                None => "no result field in response".to_string(),
            },
            error: response.error.clone(),
        },
        Some(Value::String(actual)) => {
            if actual == expected {
                debug!("result matches expected address");
                Outcome::Success {
                    address: actual.clone(),
                }
            } else {
                Outcome::Mismatch {
                    expected: expected.to_string(),
                    actual: actual.clone(),
                }
            }
        }
        // Present but not a string, `null` included.
        Some(other) => Outcome::Mismatch {
            expected: expected.to_string(),
            actual: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::TestVector;
    use serde_json::json;

    const EXPECTED: &str = TestVector::BIP352.expected_address;

    fn line(value: Value) -> Vec<u8> {
        let mut bytes = serde_json::to_vec(&value).unwrap();
        bytes.push(b'\n');
        bytes
    }

    #[test]
    fn test_exact_result_is_success() {
        let raw = line(json!({"jsonrpc": "2.0", "id": 1, "result": EXPECTED}));
        assert_eq!(
            validate_response(&raw, EXPECTED),
            Outcome::Success {
                address: EXPECTED.to_string()
            }
        );
    }

    #[test]
    fn test_success_does_not_depend_on_trailing_newline() {
        let raw = serde_json::to_vec(&json!({"result": EXPECTED})).unwrap();
        assert!(validate_response(&raw, EXPECTED).is_success());
    }

    #[test]
    fn test_different_address_is_mismatch() {
        let other = "sp1qqweplq6ylpfrzuq6hfznzmv28djsraupudz0s0dclyt8erh70pgwxqkz2ydatksrdzf770umsntsmcjp4kcz7jqu03jeszh0gdmpjzmrw5ezuyxd";
        let raw = line(json!({"jsonrpc": "2.0", "id": 1, "result": other}));
        assert_eq!(
            validate_response(&raw, EXPECTED),
            Outcome::Mismatch {
                expected: EXPECTED.to_string(),
                actual: other.to_string()
            }
        );
    }

    #[test]
    fn test_comparison_is_case_and_whitespace_sensitive() {
        let upper = line(json!({"result": EXPECTED.to_uppercase()}));
        assert_eq!(
            validate_response(&upper, EXPECTED).kind(),
            crate::summary::OutcomeKind::Mismatch
        );

        let padded = line(json!({"result": format!("{} ", EXPECTED)}));
        assert!(matches!(
            validate_response(&padded, EXPECTED),
            Outcome::Mismatch { .. }
        ));
    }

    #[test]
    fn test_error_without_result_is_protocol_error() {
        let error = json!({"code": -32601, "message": "unknown method"});
        let raw = line(json!({"jsonrpc": "2.0", "id": 1, "error": error}));
        match validate_response(&raw, EXPECTED) {
            Outcome::ProtocolError { detail, error: Some(e) } => {
                assert!(detail.contains("error"));
                assert_eq!(e, error);
            }
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_string_error_is_kept_verbatim() {
        let raw = line(json!({"id": 1, "error": "scan key rejected"}));
        match validate_response(&raw, EXPECTED) {
            Outcome::ProtocolError { error: Some(e), .. } => {
                assert_eq!(e, Value::from("scan key rejected"));
            }
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_null_result_is_mismatch() {
        let raw = line(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
        assert_eq!(
            validate_response(&raw, EXPECTED),
            Outcome::Mismatch {
                expected: EXPECTED.to_string(),
                actual: "null".to_string()
            }
        );
    }

    #[test]
    fn test_missing_result_is_protocol_error() {
        let raw = line(json!({"jsonrpc": "2.0", "id": 1}));
        assert_eq!(
            validate_response(&raw, EXPECTED),
            Outcome::ProtocolError {
                detail: "no result field in response".to_string(),
                error: None
            }
        );
    }

    #[test]
    fn test_non_object_json_is_protocol_error() {
        let cases: [&[u8]; 4] = [b"[1,2,3]\n", b"\"sp1abc\"\n", b"null\n", b"42\n"];
        for raw in cases {
            assert!(
                matches!(validate_response(raw, EXPECTED), Outcome::ProtocolError { .. }),
                "{:?}",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[test]
    fn test_non_string_result_is_mismatch() {
        let raw = line(json!({"result": {"address": EXPECTED}}));
        match validate_response(&raw, EXPECTED) {
            Outcome::Mismatch { actual, .. } => assert!(actual.starts_with("{\"address\"")),
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_json_is_decode_error() {
        let raw = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":\"sp1qqgste7";
        match validate_response(raw, EXPECTED) {
            Outcome::DecodeError { reason, raw: echoed } => {
                assert!(reason.contains("invalid JSON"));
                assert_eq!(echoed.as_bytes(), &raw[..]);
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_utf8_is_decode_error() {
        let raw = [b'{', 0xff, 0xfe, b'}', b'\n'];
        match validate_response(&raw, EXPECTED) {
            Outcome::DecodeError { reason, raw } => {
                assert!(reason.contains("UTF-8"));
                assert!(raw.contains('\u{fffd}'));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_response_is_decode_error() {
        assert!(matches!(
            validate_response(b"", EXPECTED),
            Outcome::DecodeError { .. }
        ));
    }

    #[test]
    fn test_envelope_irregularities_do_not_change_outcome() {
        let raw = line(json!({"jsonrpc": "1.0", "id": 99, "result": EXPECTED}));
        assert!(validate_response(&raw, EXPECTED).is_success());
    }
}
