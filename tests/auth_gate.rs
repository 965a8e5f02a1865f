use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use uuid::Uuid;

use storefront_api::error::AppError;
use storefront_api::middleware::auth::{AuthUser, ensure_admin};

#[test]
fn unauthenticated_redirects_to_login() {
    let response = AppError::Unauthenticated.into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/login"
    );
}

#[test]
fn forbidden_redirects_to_home() {
    let response = AppError::Forbidden.into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
}

#[test]
fn domain_errors_keep_their_message() {
    let response = AppError::BadRequest("Your cart is empty.".into()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn ensure_admin_rejects_other_usernames() {
    let shopper = AuthUser {
        user_id: Uuid::new_v4(),
        username: "shopper".into(),
    };
    assert!(matches!(ensure_admin(&shopper), Err(AppError::Forbidden)));

    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        username: "admin".into(),
    };
    assert!(ensure_admin(&admin).is_ok());
}
