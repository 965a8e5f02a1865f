use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use crate::{
    dto::products::ProductList,
    error::AppResult,
    response::ApiResponse,
    routes::params::{Pagination, SearchQuery},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/search", get(search))
}

#[utoipa::path(
    get,
    path = "/",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List all products", body = ApiResponse<ProductList>)
    ),
    tag = "Catalog"
)]
pub async fn home(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = catalog_service::list_products(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/search",
    params(
        ("q" = Option<String>, Query, description = "Name substring, case-insensitive"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Matching products", body = ApiResponse<ProductList>),
        (status = 303, description = "Missing query, back to the catalog")
    ),
    tag = "Catalog"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Response> {
    let q = match search.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return Ok(Redirect::to("/").into_response()),
    };

    let resp = catalog_service::search_products(&state, &q, pagination).await?;
    Ok(Json(resp).into_response())
}
