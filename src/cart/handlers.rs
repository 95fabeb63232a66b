//! REST API handlers for shopping cart operations
//!
//! Every route answers with the same envelopes as the GraphQL endpoint; the
//! HTTP status follows the error class.

use super::{helpers::money_value, models::*, state::SharedState};
use crate::error::CartError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tracing::warn;

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/cart/:user_id", get(get_cart).delete(clear_cart))
        .route("/api/cart/:user_id/items", post(add_item))
        .route(
            "/api/cart/:user_id/items/:item_id",
            get(get_cart_item).put(update_item).delete(remove_item),
        )
        .route("/api/cart/:user_id/total", get(get_cart_total))
        .route("/api/cart/:user_id/selected", get(get_selected_items))
        .route("/api/cart/:user_id/selected/total", get(get_selected_total))
        .route(
            "/api/cart/:user_id/selection",
            put(select_items).delete(clear_selection),
        )
        .route("/api/cart/:user_id/selection/all", post(select_all))
        .route("/api/cart/:user_id/checkout", post(checkout))
}

fn cart_envelope(message: &str, result: Result<Cart, CartError>) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => err.status_code(),
    };
    (status, Json(CartResponse::from_result(message, result))).into_response()
}

/// 400 envelope for a body that does not deserialize into the route's input.
fn invalid_request(rejection: JsonRejection) -> Response {
    warn!("REST request rejected: {}", rejection.body_text());
    let body = CartResponse {
        success: false,
        message: "Invalid request".to_string(),
        data: None,
        error: Some(rejection.body_text()),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn query_failure(err: CartError) -> Response {
    log_system_failure(&err);
    (
        err.status_code(),
        Json(json!({ "error": err.public_detail() })),
    )
        .into_response()
}

/// Endpoint: GET /health
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "Server is running" }))
}

/// Endpoint: GET /api/cart/:user_id
async fn get_cart(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Response {
    cart_envelope(
        "Cart retrieved successfully",
        state.carts.get_cart(&user_id).await,
    )
}

/// Endpoint: GET /api/cart/:user_id/items/:item_id
/// Answers `null` for an unknown item.
async fn get_cart_item(
    State(state): State<SharedState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> Response {
    match state.carts.get_cart_item(&user_id, &item_id).await {
        Ok(item) => Json(item).into_response(),
        Err(err) => query_failure(err),
    }
}

/// Endpoint: GET /api/cart/:user_id/selected
async fn get_selected_items(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.carts.get_selected_items(&user_id).await {
        Ok(items) => Json(items).into_response(),
        Err(err) => query_failure(err),
    }
}

/// Endpoint: GET /api/cart/:user_id/total
async fn get_cart_total(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.carts.get_cart_total(&user_id).await {
        Ok(total) => Json(json!({ "total": money_value(total) })).into_response(),
        Err(err) => query_failure(err),
    }
}

/// Endpoint: GET /api/cart/:user_id/selected/total
async fn get_selected_total(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.carts.get_selected_total(&user_id).await {
        Ok(total) => Json(json!({ "total": money_value(total) })).into_response(),
        Err(err) => query_failure(err),
    }
}

/// Endpoint: POST /api/cart/:user_id/items
async fn add_item(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    body: Result<Json<AddItemInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_request(rejection),
    };
    cart_envelope(
        "Item added to cart successfully",
        state.carts.add_item_to_cart(&user_id, input).await,
    )
}

/// Endpoint: PUT /api/cart/:user_id/items/:item_id
async fn update_item(
    State(state): State<SharedState>,
    Path((user_id, item_id)): Path<(String, String)>,
    body: Result<Json<QuantityInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_request(rejection),
    };
    let input = UpdateItemInput {
        item_id,
        quantity: input.quantity,
    };
    cart_envelope(
        "Item updated successfully",
        state.carts.update_cart_item(&user_id, input).await,
    )
}

/// Endpoint: DELETE /api/cart/:user_id/items/:item_id
async fn remove_item(
    State(state): State<SharedState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> Response {
    cart_envelope(
        "Item removed from cart successfully",
        state.carts.remove_from_cart(&user_id, &item_id).await,
    )
}

/// Endpoint: DELETE /api/cart/:user_id
async fn clear_cart(State(state): State<SharedState>, Path(user_id): Path<String>) -> Response {
    cart_envelope(
        "Cart cleared successfully",
        state.carts.clear_cart(&user_id).await,
    )
}

/// Endpoint: PUT /api/cart/:user_id/selection
async fn select_items(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    body: Result<Json<SelectItemsInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_request(rejection),
    };
    cart_envelope(
        "Items selected successfully",
        state.carts.select_items(&user_id, input).await,
    )
}

/// Endpoint: POST /api/cart/:user_id/selection/all
async fn select_all(State(state): State<SharedState>, Path(user_id): Path<String>) -> Response {
    cart_envelope(
        "All items selected",
        state.carts.select_all_items(&user_id).await,
    )
}

/// Endpoint: DELETE /api/cart/:user_id/selection
async fn clear_selection(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Response {
    cart_envelope(
        "Selection cleared",
        state.carts.clear_selected_items(&user_id).await,
    )
}

/// Endpoint: POST /api/cart/:user_id/checkout
async fn checkout(State(state): State<SharedState>, Path(user_id): Path<String>) -> Response {
    let result = state.carts.checkout(&user_id).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => err.status_code(),
    };
    (status, Json(CheckoutResponse::from_result(result))).into_response()
}
