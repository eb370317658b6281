//! The catalog of engine requests.
//!
//! # Design
//! Each operation of the engine's REST protocol is one `Request` variant that
//! knows its HTTP method, its path below the database prefix, and which
//! parameters travel in the query string versus the JSON body. Nothing here
//! validates the parameters; the engine is the authority on ids, timestamps
//! and expressions.

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::options::{
    DetailViewOptions, InteractionOptions, ItemRecommendationOptions, ListOptions, RecommendationOptions,
    SetValuesOptions,
};
use crate::types::{PropertyType, Timestamp, Values};

/// Request parameters keyed by their wire name.
pub type Params = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    AddItem { item_id: String },
    DeleteItem { item_id: String },
    ListItems { options: ListOptions },
    AddItemProperty { name: String, property_type: PropertyType },
    DeleteItemProperty { name: String },
    GetItemPropertyInfo { name: String },
    ListItemProperties,
    SetItemValues { item_id: String, values: Values, options: SetValuesOptions },
    GetItemValues { item_id: String },

    AddUser { user_id: String },
    DeleteUser { user_id: String },
    MergeUsers { target_user_id: String, source_user_id: String, cascade_create: Option<bool> },
    ListUsers { options: ListOptions },
    AddUserProperty { name: String, property_type: PropertyType },
    DeleteUserProperty { name: String },
    GetUserPropertyInfo { name: String },
    ListUserProperties,
    SetUserValues { user_id: String, values: Values, options: SetValuesOptions },
    GetUserValues { user_id: String },

    AddDetailView { user_id: String, item_id: String, options: DetailViewOptions },
    DeleteDetailView { user_id: String, item_id: String, timestamp: Option<Timestamp> },
    ListItemDetailViews { item_id: String },
    ListUserDetailViews { user_id: String },

    AddPurchase { user_id: String, item_id: String, options: InteractionOptions },
    DeletePurchase { user_id: String, item_id: String, timestamp: Option<Timestamp> },
    ListItemPurchases { item_id: String },
    ListUserPurchases { user_id: String },

    AddRating { user_id: String, item_id: String, rating: f64, options: InteractionOptions },
    DeleteRating { user_id: String, item_id: String, timestamp: Option<Timestamp> },

    AddCartAddition { user_id: String, item_id: String, options: InteractionOptions },
    DeleteCartAddition { user_id: String, item_id: String, timestamp: Option<Timestamp> },

    AddBookmark { user_id: String, item_id: String, options: InteractionOptions },
    DeleteBookmark { user_id: String, item_id: String, timestamp: Option<Timestamp> },

    UserBasedRecommendation { user_id: String, count: u64, options: RecommendationOptions },
    ItemBasedRecommendation { item_id: String, count: u64, options: ItemRecommendationOptions },

    /// Many requests executed by the engine in order, answered with one
    /// outcome each. Batches do not nest.
    Batch { requests: Vec<Request> },
}

impl Request {
    /// Operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::AddItem { .. } => "add_item",
            Request::DeleteItem { .. } => "delete_item",
            Request::ListItems { .. } => "list_items",
            Request::AddItemProperty { .. } => "add_item_property",
            Request::DeleteItemProperty { .. } => "delete_item_property",
            Request::GetItemPropertyInfo { .. } => "get_item_property_info",
            Request::ListItemProperties => "list_item_properties",
            Request::SetItemValues { .. } => "set_item_values",
            Request::GetItemValues { .. } => "get_item_values",
            Request::AddUser { .. } => "add_user",
            Request::DeleteUser { .. } => "delete_user",
            Request::MergeUsers { .. } => "merge_users",
            Request::ListUsers { .. } => "list_users",
            Request::AddUserProperty { .. } => "add_user_property",
            Request::DeleteUserProperty { .. } => "delete_user_property",
            Request::GetUserPropertyInfo { .. } => "get_user_property_info",
            Request::ListUserProperties => "list_user_properties",
            Request::SetUserValues { .. } => "set_user_values",
            Request::GetUserValues { .. } => "get_user_values",
            Request::AddDetailView { .. } => "add_detail_view",
            Request::DeleteDetailView { .. } => "delete_detail_view",
            Request::ListItemDetailViews { .. } => "list_item_detail_views",
            Request::ListUserDetailViews { .. } => "list_user_detail_views",
            Request::AddPurchase { .. } => "add_purchase",
            Request::DeletePurchase { .. } => "delete_purchase",
            Request::ListItemPurchases { .. } => "list_item_purchases",
            Request::ListUserPurchases { .. } => "list_user_purchases",
            Request::AddRating { .. } => "add_rating",
            Request::DeleteRating { .. } => "delete_rating",
            Request::AddCartAddition { .. } => "add_cart_addition",
            Request::DeleteCartAddition { .. } => "delete_cart_addition",
            Request::AddBookmark { .. } => "add_bookmark",
            Request::DeleteBookmark { .. } => "delete_bookmark",
            Request::UserBasedRecommendation { .. } => "recommend_items_to_user",
            Request::ItemBasedRecommendation { .. } => "recommend_items_to_item",
            Request::Batch { .. } => "batch",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            Request::AddItem { .. }
            | Request::AddItemProperty { .. }
            | Request::AddUser { .. }
            | Request::AddUserProperty { .. }
            | Request::MergeUsers { .. } => HttpMethod::Put,

            Request::DeleteItem { .. }
            | Request::DeleteItemProperty { .. }
            | Request::DeleteUser { .. }
            | Request::DeleteUserProperty { .. }
            | Request::DeleteDetailView { .. }
            | Request::DeletePurchase { .. }
            | Request::DeleteRating { .. }
            | Request::DeleteCartAddition { .. }
            | Request::DeleteBookmark { .. } => HttpMethod::Delete,

            Request::SetItemValues { .. }
            | Request::SetUserValues { .. }
            | Request::AddDetailView { .. }
            | Request::AddPurchase { .. }
            | Request::AddRating { .. }
            | Request::AddCartAddition { .. }
            | Request::AddBookmark { .. }
            | Request::Batch { .. } => HttpMethod::Post,

            Request::ListItems { .. }
            | Request::GetItemPropertyInfo { .. }
            | Request::ListItemProperties
            | Request::GetItemValues { .. }
            | Request::ListUsers { .. }
            | Request::GetUserPropertyInfo { .. }
            | Request::ListUserProperties
            | Request::GetUserValues { .. }
            | Request::ListItemDetailViews { .. }
            | Request::ListUserDetailViews { .. }
            | Request::ListItemPurchases { .. }
            | Request::ListUserPurchases { .. }
            | Request::UserBasedRecommendation { .. }
            | Request::ItemBasedRecommendation { .. } => HttpMethod::Get,
        }
    }

    /// Path below the `/{databaseId}` prefix, with ids percent-encoded.
    pub fn path(&self) -> String {
        match self {
            Request::AddItem { item_id }
            | Request::DeleteItem { item_id }
            | Request::SetItemValues { item_id, .. }
            | Request::GetItemValues { item_id } => format!("/items/{}", encode(item_id)),
            Request::ListItems { .. } => "/items/list/".to_string(),
            Request::AddItemProperty { name, .. }
            | Request::DeleteItemProperty { name }
            | Request::GetItemPropertyInfo { name } => format!("/items/properties/{}", encode(name)),
            Request::ListItemProperties => "/items/properties/list/".to_string(),

            Request::AddUser { user_id }
            | Request::DeleteUser { user_id }
            | Request::SetUserValues { user_id, .. }
            | Request::GetUserValues { user_id } => format!("/users/{}", encode(user_id)),
            Request::MergeUsers {
                target_user_id,
                source_user_id,
                ..
            } => format!("/users/{}/merge/{}", encode(target_user_id), encode(source_user_id)),
            Request::ListUsers { .. } => "/users/list/".to_string(),
            Request::AddUserProperty { name, .. }
            | Request::DeleteUserProperty { name }
            | Request::GetUserPropertyInfo { name } => format!("/users/properties/{}", encode(name)),
            Request::ListUserProperties => "/users/properties/list/".to_string(),

            Request::AddDetailView { .. } | Request::DeleteDetailView { .. } => "/detailviews/".to_string(),
            Request::ListItemDetailViews { item_id } => format!("/items/{}/detailviews/", encode(item_id)),
            Request::ListUserDetailViews { user_id } => format!("/users/{}/detailviews/", encode(user_id)),

            Request::AddPurchase { .. } | Request::DeletePurchase { .. } => "/purchases/".to_string(),
            Request::ListItemPurchases { item_id } => format!("/items/{}/purchases/", encode(item_id)),
            Request::ListUserPurchases { user_id } => format!("/users/{}/purchases/", encode(user_id)),

            Request::AddRating { .. } | Request::DeleteRating { .. } => "/ratings/".to_string(),
            Request::AddCartAddition { .. } | Request::DeleteCartAddition { .. } => "/cartadditions/".to_string(),
            Request::AddBookmark { .. } | Request::DeleteBookmark { .. } => "/bookmarks/".to_string(),

            Request::UserBasedRecommendation { user_id, .. } => format!("/users/{}/recomms/", encode(user_id)),
            Request::ItemBasedRecommendation { item_id, .. } => format!("/items/{}/recomms/", encode(item_id)),

            Request::Batch { .. } => "/batch/".to_string(),
        }
    }

    /// Parameters sent in the query string.
    pub fn query_params(&self) -> Result<Params, ApiError> {
        match self {
            Request::ListItems { options } | Request::ListUsers { options } => to_params(options),
            Request::AddItemProperty { property_type, .. } | Request::AddUserProperty { property_type, .. } => {
                let mut params = Params::new();
                params.insert("type".to_string(), json!(property_type.as_str()));
                Ok(params)
            }
            Request::MergeUsers { cascade_create, .. } => {
                let mut params = Params::new();
                if let Some(cascade) = cascade_create {
                    params.insert("cascadeCreate".to_string(), json!(cascade));
                }
                Ok(params)
            }
            Request::DeleteDetailView {
                user_id,
                item_id,
                timestamp,
            }
            | Request::DeletePurchase {
                user_id,
                item_id,
                timestamp,
            }
            | Request::DeleteRating {
                user_id,
                item_id,
                timestamp,
            }
            | Request::DeleteCartAddition {
                user_id,
                item_id,
                timestamp,
            }
            | Request::DeleteBookmark {
                user_id,
                item_id,
                timestamp,
            } => {
                let mut params = pair(user_id, item_id);
                if let Some(ts) = timestamp {
                    params.insert("timestamp".to_string(), to_json(ts)?);
                }
                Ok(params)
            }
            Request::UserBasedRecommendation { count, options, .. } => {
                let mut params = to_params(options)?;
                params.insert("count".to_string(), json!(count));
                Ok(params)
            }
            Request::ItemBasedRecommendation { count, options, .. } => {
                let mut params = to_params(options)?;
                params.insert("count".to_string(), json!(count));
                Ok(params)
            }
            _ => Ok(Params::new()),
        }
    }

    /// Parameters sent as the JSON body, for requests that carry one.
    pub fn body_params(&self) -> Result<Option<Params>, ApiError> {
        let body = match self {
            Request::SetItemValues { values, options, .. } | Request::SetUserValues { values, options, .. } => {
                let mut params = values.clone();
                if let Some(cascade) = options.cascade_create {
                    params.insert("!cascadeCreate".to_string(), json!(cascade));
                }
                params
            }
            Request::AddDetailView {
                user_id,
                item_id,
                options,
            } => {
                let mut params = pair(user_id, item_id);
                params.extend(to_params(options)?);
                params
            }
            Request::AddPurchase {
                user_id,
                item_id,
                options,
            }
            | Request::AddCartAddition {
                user_id,
                item_id,
                options,
            }
            | Request::AddBookmark {
                user_id,
                item_id,
                options,
            } => {
                let mut params = pair(user_id, item_id);
                params.extend(to_params(options)?);
                params
            }
            Request::AddRating {
                user_id,
                item_id,
                rating,
                options,
            } => {
                let mut params = pair(user_id, item_id);
                params.insert("rating".to_string(), json!(rating));
                params.extend(to_params(options)?);
                params
            }
            Request::Batch { requests } => {
                let entries = requests
                    .iter()
                    .map(Request::batch_entry)
                    .collect::<Result<Vec<_>, _>>()?;
                let mut params = Params::new();
                params.insert("requests".to_string(), Value::Array(entries));
                params
            }
            _ => return Ok(None),
        };
        Ok(Some(body))
    }

    /// This request as one entry of a batch body.
    pub fn batch_entry(&self) -> Result<Value, ApiError> {
        if let Request::Batch { .. } = self {
            return Err(ApiError::SerializationError("batches cannot be nested".to_string()));
        }
        let mut params = self.query_params()?;
        if let Some(body) = self.body_params()? {
            params.extend(body);
        }
        Ok(json!({
            "method": self.method().as_str(),
            "path": self.path(),
            "params": params,
        }))
    }
}

/// Render parameters as a query string, sorted by name.
///
/// Strings go out verbatim, arrays comma-joined, other values as JSON text.
/// Nulls are dropped.
pub fn encode_query(params: &Params) -> String {
    params
        .iter()
        .filter_map(|(key, value)| render(value).map(|v| format!("{}={}", encode(key), encode(&v))))
        .collect::<Vec<_>>()
        .join("&")
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(items.iter().filter_map(render).collect::<Vec<_>>().join(",")),
        other => Some(other.to_string()),
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

fn pair(user_id: &str, item_id: &str) -> Params {
    let mut params = Params::new();
    params.insert("userId".to_string(), json!(user_id));
    params.insert("itemId".to_string(), json!(item_id));
    params
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn to_params<T: Serialize>(value: &T) -> Result<Params, ApiError> {
    match to_json(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::SerializationError(format!("expected an object, got {other}"))),
    }
}
