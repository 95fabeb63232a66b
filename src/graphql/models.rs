//! GraphQL Contract Models and Constants
//!
//! Operation names and variable shapes are the wire contract the storefront
//! already speaks; they must not drift.

use serde::Deserialize;
use serde_json::Value;

use crate::cart::models::{AddItemInput, SelectItemsInput, UpdateItemInput};

// =============================================================================
// Operation Names
// =============================================================================

pub const GET_CART: &str = "getCart";
pub const GET_CART_ITEM: &str = "getCartItem";
pub const GET_SELECTED_ITEMS: &str = "getSelectedItems";
pub const GET_CART_TOTAL: &str = "getCartTotal";
pub const GET_SELECTED_TOTAL: &str = "getSelectedTotal";
pub const ADD_ITEM_TO_CART: &str = "addItemToCart";
pub const UPDATE_CART_ITEM: &str = "updateCartItem";
pub const REMOVE_FROM_CART: &str = "removeFromCart";
pub const CLEAR_CART: &str = "clearCart";
pub const SELECT_ITEMS: &str = "selectItems";
pub const SELECT_ALL_ITEMS: &str = "selectAllItems";
pub const CLEAR_SELECTED_ITEMS: &str = "clearSelectedItems";
pub const CHECKOUT: &str = "checkout";

/// Schema served on `GET /graphql`
pub const SCHEMA_SDL: &str = r#"type CartItem {
  id: ID!
  productId: ID!
  quantity: Int!
  price: Float!
}

type Cart {
  id: ID!
  userId: ID!
  items: [CartItem!]!
  total: Float!
  selectedItems: [ID!]!
  createdAt: String!
  updatedAt: String!
}

type CartResponse {
  success: Boolean!
  message: String!
  data: Cart
  error: String
}

type CheckoutResponse {
  success: Boolean!
  message: String!
  orderId: ID
  total: Float
  items: [CartItem!]
  error: String
}

input AddItemInput {
  productId: ID!
  quantity: Int!
}

input UpdateItemInput {
  itemId: ID!
  quantity: Int!
}

input SelectItemsInput {
  itemIds: [ID!]!
}

type Query {
  getCart(userId: ID!): CartResponse!
  getCartItem(userId: ID!, itemId: ID!): CartItem
  getSelectedItems(userId: ID!): [CartItem!]!
  getCartTotal(userId: ID!): Float!
  getSelectedTotal(userId: ID!): Float!
}

type Mutation {
  addItemToCart(userId: ID!, input: AddItemInput!): CartResponse!
  updateCartItem(userId: ID!, input: UpdateItemInput!): CartResponse!
  removeFromCart(userId: ID!, itemId: ID!): CartResponse!
  clearCart(userId: ID!): CartResponse!
  selectItems(userId: ID!, input: SelectItemsInput!): CartResponse!
  selectAllItems(userId: ID!): CartResponse!
  clearSelectedItems(userId: ID!): CartResponse!
  checkout(userId: ID!): CheckoutResponse!
}
"#;

// =============================================================================
// Request Models
// =============================================================================

/// Standard GraphQL-over-HTTP request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    /// Document text; dispatch is by operation name, so it is ignored
    #[allow(dead_code)]
    pub query: Option<String>,

    /// Operation to run
    pub operation_name: String,

    /// Operation arguments
    pub variables: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVars {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemVars {
    pub user_id: String,
    pub item_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemVars {
    pub user_id: String,
    pub input: AddItemInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemVars {
    pub user_id: String,
    pub input: UpdateItemInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectItemsVars {
    pub user_id: String,
    pub input: SelectItemsInput,
}
