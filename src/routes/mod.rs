use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;

// Build the application router without binding state; it is provided at the top level.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(auth::router())
        .merge(cart::router())
        .merge(orders::router())
        .nest("/admin", admin::router())
}
