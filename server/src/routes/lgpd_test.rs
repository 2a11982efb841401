use super::*;

#[test]
fn lgpd_error_to_status_maps_not_found() {
    assert_eq!(lgpd_error_to_status(&LgpdError::NotFound(3)), StatusCode::NOT_FOUND);
}

#[test]
fn lgpd_error_to_status_maps_oversized_details() {
    assert_eq!(lgpd_error_to_status(&LgpdError::DetailsTooLong), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn lgpd_error_to_status_maps_internal_failures() {
    assert_eq!(lgpd_error_to_status(&LgpdError::UnknownKind("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(lgpd_error_to_status(&LgpdError::Db(sqlx::Error::PoolTimedOut)), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn only_pastors_review() {
    assert_eq!(REVIEWER_ROLES, &[Role::Pastor]);
}
