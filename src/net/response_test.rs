use super::*;
use serde_json::json;

// =============================================================================
// ApiFailure::from_error_body
// =============================================================================

#[test]
fn error_field_fills_both_message_and_error() {
    let f = ApiFailure::from_error_body(401, &json!({ "error": "invalid credentials" }), REQUEST_FAILED);
    assert_eq!(f.status_code, 401);
    assert_eq!(f.message, "invalid credentials");
    assert_eq!(f.error, "invalid credentials");
}

#[test]
fn message_and_error_kept_separately_when_both_present() {
    let f = ApiFailure::from_error_body(400, &json!({ "error": "E_BAD", "message": "Bad input" }), REQUEST_FAILED);
    assert_eq!(f.message, "Bad input");
    assert_eq!(f.error, "E_BAD");
}

#[test]
fn body_without_fields_uses_fallback() {
    let f = ApiFailure::from_error_body(500, &json!({ "detail": "boom" }), REQUEST_FAILED);
    assert_eq!(f.message, REQUEST_FAILED);
    assert_eq!(f.error, REQUEST_FAILED);
}

#[test]
fn non_string_fields_are_ignored() {
    let f = ApiFailure::from_error_body(422, &json!({ "error": 17, "message": null }), "Failed to add member");
    assert_eq!(f.message, "Failed to add member");
}

// =============================================================================
// user_message / default_message
// =============================================================================

#[test]
fn own_message_overrides_status_default() {
    let f = ApiFailure::new(401, "invalid credentials", "invalid credentials");
    assert_eq!(f.user_message(), "invalid credentials");
}

#[test]
fn empty_message_falls_back_to_status_default() {
    assert_eq!(ApiFailure::new(401, "", "x").user_message(), "Session expired. Please log in again.");
    assert_eq!(ApiFailure::new(403, " ", "x").user_message(), default_message(403));
    assert_eq!(ApiFailure::new(0, "", "x").user_message(), "Network error. Please check your connection.");
    assert_eq!(ApiFailure::new(418, "", "x").user_message(), "An unexpected error occurred.");
}

#[test]
fn generic_fallback_yields_status_default() {
    let bodiless = ApiFailure::from_error_body(401, &Value::Null, REQUEST_FAILED);
    assert_eq!(bodiless.message, REQUEST_FAILED);
    assert!(!bodiless.has_own_message);
    assert_eq!(bodiless.user_message(), "Session expired. Please log in again.");

    let offline = ApiFailure::network(UNABLE_TO_CONNECT, "connection refused");
    assert_eq!(offline.message, UNABLE_TO_CONNECT);
    assert_eq!(offline.user_message(), "Network error. Please check your connection.");
}

#[test]
fn body_text_counts_as_own_message() {
    let f = ApiFailure::from_error_body(500, &json!({ "error": "db down" }), REQUEST_FAILED);
    assert!(f.has_own_message);
    assert_eq!(f.user_message(), "db down");
}

#[test]
fn session_invalid_only_for_401_and_403() {
    assert!(ApiFailure::new(401, "", "").is_session_invalid());
    assert!(ApiFailure::new(403, "", "").is_session_invalid());
    assert!(!ApiFailure::new(404, "", "").is_session_invalid());
    assert!(!ApiFailure::network(UNABLE_TO_CONNECT, "refused").is_session_invalid());
}

// =============================================================================
// ApiResponse
// =============================================================================

#[test]
fn decode_success_into_typed_payload() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Token {
        token: String,
    }
    let resp = ApiResponse::Success { data: json!({ "token": "t1" }), status_code: 200 };
    assert_eq!(
        resp.decode::<Token>(),
        ApiResponse::Success { data: Token { token: "t1".to_owned() }, status_code: 200 }
    );
}

#[test]
fn decode_shape_mismatch_is_network_class() {
    #[derive(serde::Deserialize, Debug)]
    struct Token {
        #[allow(dead_code)]
        token: String,
    }
    let resp = ApiResponse::Success { data: json!({ "nope": 1 }), status_code: 200 };
    let failure = resp.decode::<Token>().failure().cloned().unwrap();
    assert!(failure.is_network());
    assert_eq!(failure.message, UNEXPECTED_RESPONSE);
}

#[test]
fn decode_passes_failures_through() {
    let resp: ApiResponse<Value> = ApiFailure::new(404, "gone", "gone").into();
    assert_eq!(resp.decode::<String>().status_code(), 404);
}

#[test]
fn into_result_splits_variants() {
    let ok: ApiResponse<u8> = ApiResponse::Success { data: 3, status_code: 201 };
    assert_eq!(ok.into_result(), Ok(3));
    let err: ApiResponse<u8> = ApiFailure::network(UNABLE_TO_CONNECT, "refused").into();
    assert_eq!(err.into_result().unwrap_err().status_code, 0);
}

#[test]
fn serializes_success_shape() {
    let resp = ApiResponse::Success { data: json!({ "token": "t1" }), status_code: 200 };
    assert_eq!(
        serde_json::to_value(&resp).unwrap(),
        json!({ "success": true, "data": { "token": "t1" }, "statusCode": 200 })
    );
}

#[test]
fn serializes_failure_shape() {
    let resp: ApiResponse<Value> = ApiFailure::new(401, "invalid credentials", "invalid credentials").into();
    assert_eq!(
        serde_json::to_value(&resp).unwrap(),
        json!({ "success": false, "message": "invalid credentials", "error": "invalid credentials", "statusCode": 401 })
    );
}
