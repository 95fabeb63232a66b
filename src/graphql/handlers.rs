//! GraphQL route handlers
//!
//! Requests are dispatched on `operationName`; each operation maps onto one
//! cart manager call. `execute_operation` is public so tests can drive the
//! contract without HTTP.

use super::{helpers::*, models::*};
use crate::cart::{helpers::money_value, models::*, state::*};
use crate::error::CartError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Creates routes for the GraphQL endpoint
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/graphql", post(handle_graphql).get(handle_schema))
        .route("/graphql/", post(handle_graphql).get(handle_schema)) // Trailing slash safety
}

/// Endpoint: GET /graphql
/// Serves the schema document.
async fn handle_schema() -> impl IntoResponse {
    ([("content-type", "application/graphql")], SCHEMA_SDL)
}

/// Endpoint: POST /graphql
async fn handle_graphql(
    State(state): State<SharedState>,
    body: Result<Json<GraphQlRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match body {
        Ok(Json(r)) => r,
        Err(e) => {
            warn!("GraphQL request rejected: {}", e.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(gql_error("Malformed GraphQL request")),
            )
                .into_response();
        }
    };

    let operation = req.operation_name.as_str();
    let variables = req.variables.unwrap_or(Value::Null);
    debug!(operation, "GraphQL call");

    let response_body = match execute_operation(&state, operation, variables).await {
        Ok(value) => gql_data(operation, value),
        Err(msg) => gql_error(msg),
    };

    Json(response_body).into_response()
}

// =============================================================================
// Operation Dispatch
// =============================================================================

/// Runs one contract operation. `Err` carries a GraphQL error message.
pub async fn execute_operation(
    state: &AppState,
    operation: &str,
    variables: Value,
) -> Result<Value, String> {
    let carts = &state.carts;
    match operation {
        GET_CART => {
            let vars: UserVars = parse_vars(variables)?;
            envelope_value(CartResponse::from_result(
                "Cart retrieved successfully",
                carts.get_cart(&vars.user_id).await,
            ))
        }
        GET_CART_ITEM => {
            let vars: ItemVars = parse_vars(variables)?;
            let item = carts
                .get_cart_item(&vars.user_id, &vars.item_id)
                .await
                .map_err(query_error)?;
            to_value(&item)
        }
        GET_SELECTED_ITEMS => {
            let vars: UserVars = parse_vars(variables)?;
            let items = carts
                .get_selected_items(&vars.user_id)
                .await
                .map_err(query_error)?;
            to_value(&items)
        }
        GET_CART_TOTAL => {
            let vars: UserVars = parse_vars(variables)?;
            let total = carts
                .get_cart_total(&vars.user_id)
                .await
                .map_err(query_error)?;
            Ok(money_value(total))
        }
        GET_SELECTED_TOTAL => {
            let vars: UserVars = parse_vars(variables)?;
            let total = carts
                .get_selected_total(&vars.user_id)
                .await
                .map_err(query_error)?;
            Ok(money_value(total))
        }
        ADD_ITEM_TO_CART => {
            let vars: AddItemVars = parse_vars(variables)?;
            envelope_value(CartResponse::from_result(
                "Item added to cart successfully",
                carts.add_item_to_cart(&vars.user_id, vars.input).await,
            ))
        }
        UPDATE_CART_ITEM => {
            let vars: UpdateItemVars = parse_vars(variables)?;
            envelope_value(CartResponse::from_result(
                "Item updated successfully",
                carts.update_cart_item(&vars.user_id, vars.input).await,
            ))
        }
        REMOVE_FROM_CART => {
            let vars: ItemVars = parse_vars(variables)?;
            envelope_value(CartResponse::from_result(
                "Item removed from cart successfully",
                carts.remove_from_cart(&vars.user_id, &vars.item_id).await,
            ))
        }
        CLEAR_CART => {
            let vars: UserVars = parse_vars(variables)?;
            envelope_value(CartResponse::from_result(
                "Cart cleared successfully",
                carts.clear_cart(&vars.user_id).await,
            ))
        }
        SELECT_ITEMS => {
            let vars: SelectItemsVars = parse_vars(variables)?;
            envelope_value(CartResponse::from_result(
                "Items selected successfully",
                carts.select_items(&vars.user_id, vars.input).await,
            ))
        }
        SELECT_ALL_ITEMS => {
            let vars: UserVars = parse_vars(variables)?;
            envelope_value(CartResponse::from_result(
                "All items selected",
                carts.select_all_items(&vars.user_id).await,
            ))
        }
        CLEAR_SELECTED_ITEMS => {
            let vars: UserVars = parse_vars(variables)?;
            envelope_value(CartResponse::from_result(
                "Selection cleared",
                carts.clear_selected_items(&vars.user_id).await,
            ))
        }
        CHECKOUT => {
            let vars: UserVars = parse_vars(variables)?;
            envelope_value(CheckoutResponse::from_result(
                carts.checkout(&vars.user_id).await,
            ))
        }
        _ => Err(format!("Unknown operation: {}", operation)),
    }
}

fn parse_vars<T: DeserializeOwned>(variables: Value) -> Result<T, String> {
    serde_json::from_value(variables).map_err(|e| format!("Invalid variables: {}", e))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn envelope_value<T: serde::Serialize>(envelope: T) -> Result<Value, String> {
    to_value(&envelope)
}

/// Queries have no envelope, so failures surface as GraphQL errors.
fn query_error(err: CartError) -> String {
    log_system_failure(&err);
    err.public_detail()
}
