use campustrack::api::map_error;
use campustrack::error::AppError;

#[test]
fn unauthorized_and_not_found_map_by_status() {
    assert!(matches!(map_error(401, ""), AppError::Unauthorized));
    assert!(matches!(map_error(404, ""), AppError::NotFound));
}

#[test]
fn duplicate_tracking_detail_maps_to_the_conflict_kind() {
    let body = r#"{"detail": "You are already tracking this institution"}"#;
    match map_error(400, body) {
        AppError::AlreadyTracked(message) => {
            assert!(message.contains("already tracking"));
        }
        other => panic!("expected AlreadyTracked, got {:?}", other),
    }
}

#[test]
fn structured_detail_becomes_per_field_errors() {
    let body = r#"{"detail": [
        {"loc": ["body", "email"], "msg": "value is not a valid email address"},
        {"loc": ["body", "password"], "msg": "ensure this value has at least 8 characters"}
    ]}"#;
    match map_error(422, body) {
        AppError::Validation {
            message,
            field_errors,
        } => {
            assert_eq!(field_errors.len(), 2);
            assert_eq!(field_errors[0].field, "email");
            assert_eq!(field_errors[1].field, "password");
            assert!(message.contains("email"));
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[test]
fn plain_string_detail_becomes_the_banner_message() {
    let body = r#"{"detail": "Incorrect email or password"}"#;
    match map_error(400, body) {
        AppError::Validation { message, .. } => {
            assert_eq!(message, "Incorrect email or password");
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[test]
fn unreadable_bodies_still_map_to_the_taxonomy() {
    match map_error(400, "<html>nope</html>") {
        AppError::Validation { field_errors, .. } => assert!(field_errors.is_empty()),
        other => panic!("expected Validation, got {:?}", other),
    }
    match map_error(503, "") {
        AppError::Backend { status, .. } => assert_eq!(status, 503),
        other => panic!("expected Backend, got {:?}", other),
    }
}
