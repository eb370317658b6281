//! `Recommendations` backed by the hosted engine.
//!
//! # Design
//! Each operation builds one `Request`, lets `RecommClient` sign it, hands the
//! result to the `Transport` and parses the answer. Failures are logged at
//! `warn` and returned to the caller unchanged.

use serde::de::DeserializeOwned;

use recomm_core::{
    ApiError, BatchOutcome, DetailView, DetailViewOptions, HttpResponse, InteractionOptions,
    ItemRecommendationOptions, Listing, ListOptions, PropertyInfo, PropertyType, Purchase, PurchaseRecord,
    RecommClient, RecommendationOptions, Request, SetValuesOptions, Timestamp, Values,
};

use crate::config::EngineSettings;
use crate::recommendations::Recommendations;
use crate::transport::{Transport, UreqTransport};

pub struct RecombeeAdapter<T = UreqTransport> {
    client: RecommClient,
    transport: T,
}

impl RecombeeAdapter<UreqTransport> {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        let client = RecommClient::new(&settings.base_url, &settings.database_id, &settings.token);
        Self::new(client, UreqTransport::new(settings.timeout()))
    }
}

impl<T: Transport> RecombeeAdapter<T> {
    pub fn new(client: RecommClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &RecommClient {
        &self.client
    }

    fn send(&self, request: &Request) -> Result<HttpResponse, ApiError> {
        let http = self.client.build(request)?;
        tracing::debug!(
            operation = request.name(),
            method = request.method().as_str(),
            database = self.client.database_id(),
            path = %request.path(),
            "dispatching engine request"
        );
        self.transport.execute(http)
    }

    fn ack(&self, request: Request) -> Result<(), ApiError> {
        let result = self.send(&request).and_then(|response| self.client.parse_ack(response));
        report(&request, result)
    }

    fn fetch<R: DeserializeOwned>(&self, request: Request) -> Result<R, ApiError> {
        let result = self.send(&request).and_then(|response| self.client.parse_json(response));
        report(&request, result)
    }

    fn batch(&self, requests: Vec<Request>) -> Result<Vec<BatchOutcome>, ApiError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }
        let request = Request::Batch { requests };
        let result = self.send(&request).and_then(|response| self.client.parse_batch(response));
        let outcomes = report(&request, result)?;
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        if failed > 0 {
            tracing::warn!(failed, total = outcomes.len(), "batch sub-requests rejected by engine");
        }
        Ok(outcomes)
    }
}

fn report<R>(request: &Request, result: Result<R, ApiError>) -> Result<R, ApiError> {
    if let Err(err) = &result {
        tracing::warn!(
            operation = request.name(),
            status = ?err.status(),
            error = %err,
            "engine request failed"
        );
    }
    result
}

impl<T: Transport> Recommendations for RecombeeAdapter<T> {
    fn add_item(&self, item_id: &str) -> Result<(), ApiError> {
        self.ack(Request::AddItem {
            item_id: item_id.to_string(),
        })
    }

    fn delete_item(&self, item_id: &str) -> Result<(), ApiError> {
        self.ack(Request::DeleteItem {
            item_id: item_id.to_string(),
        })
    }

    fn list_items(&self, options: &ListOptions) -> Result<Listing, ApiError> {
        self.fetch(Request::ListItems {
            options: options.clone(),
        })
    }

    fn add_item_property(&self, name: &str, property_type: PropertyType) -> Result<(), ApiError> {
        self.ack(Request::AddItemProperty {
            name: name.to_string(),
            property_type,
        })
    }

    fn delete_item_property(&self, name: &str) -> Result<(), ApiError> {
        self.ack(Request::DeleteItemProperty { name: name.to_string() })
    }

    fn get_item_property_info(&self, name: &str) -> Result<PropertyInfo, ApiError> {
        self.fetch(Request::GetItemPropertyInfo { name: name.to_string() })
    }

    fn list_item_properties(&self) -> Result<Vec<PropertyInfo>, ApiError> {
        self.fetch(Request::ListItemProperties)
    }

    fn set_item_values(&self, item_id: &str, values: &Values, cascade_create: bool) -> Result<(), ApiError> {
        self.ack(Request::SetItemValues {
            item_id: item_id.to_string(),
            values: values.clone(),
            options: SetValuesOptions::cascading(cascade_create),
        })
    }

    fn get_item_values(&self, item_id: &str) -> Result<Values, ApiError> {
        self.fetch(Request::GetItemValues {
            item_id: item_id.to_string(),
        })
    }

    fn add_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.ack(Request::AddUser {
            user_id: user_id.to_string(),
        })
    }

    fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.ack(Request::DeleteUser {
            user_id: user_id.to_string(),
        })
    }

    fn merge_users(&self, target_user_id: &str, source_user_id: &str, cascade_create: bool) -> Result<(), ApiError> {
        self.ack(Request::MergeUsers {
            target_user_id: target_user_id.to_string(),
            source_user_id: source_user_id.to_string(),
            cascade_create: Some(cascade_create),
        })
    }

    fn list_users(&self, options: &ListOptions) -> Result<Listing, ApiError> {
        self.fetch(Request::ListUsers {
            options: options.clone(),
        })
    }

    fn add_user_property(&self, name: &str, property_type: PropertyType) -> Result<(), ApiError> {
        self.ack(Request::AddUserProperty {
            name: name.to_string(),
            property_type,
        })
    }

    fn delete_user_property(&self, name: &str) -> Result<(), ApiError> {
        self.ack(Request::DeleteUserProperty { name: name.to_string() })
    }

    fn get_user_property_info(&self, name: &str) -> Result<PropertyInfo, ApiError> {
        self.fetch(Request::GetUserPropertyInfo { name: name.to_string() })
    }

    fn list_user_properties(&self) -> Result<Vec<PropertyInfo>, ApiError> {
        self.fetch(Request::ListUserProperties)
    }

    fn set_user_values(&self, user_id: &str, values: &Values, options: &SetValuesOptions) -> Result<(), ApiError> {
        self.ack(Request::SetUserValues {
            user_id: user_id.to_string(),
            values: values.clone(),
            options: options.clone(),
        })
    }

    fn get_user_values(&self, user_id: &str) -> Result<Values, ApiError> {
        self.fetch(Request::GetUserValues {
            user_id: user_id.to_string(),
        })
    }

    fn add_detail_view(&self, user_id: &str, item_id: &str, options: &DetailViewOptions) -> Result<(), ApiError> {
        self.ack(Request::AddDetailView {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            options: options.clone(),
        })
    }

    fn delete_detail_view(
        &self,
        user_id: &str,
        item_id: &str,
        timestamp: Option<Timestamp>,
    ) -> Result<(), ApiError> {
        self.ack(Request::DeleteDetailView {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            timestamp,
        })
    }

    fn list_item_detail_views(&self, item_id: &str) -> Result<Vec<DetailView>, ApiError> {
        self.fetch(Request::ListItemDetailViews {
            item_id: item_id.to_string(),
        })
    }

    fn list_user_detail_views(&self, user_id: &str) -> Result<Vec<DetailView>, ApiError> {
        self.fetch(Request::ListUserDetailViews {
            user_id: user_id.to_string(),
        })
    }

    fn add_purchase(&self, user_id: &str, item_id: &str, options: &InteractionOptions) -> Result<(), ApiError> {
        self.ack(Request::AddPurchase {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            options: options.cascading_by_default(),
        })
    }

    fn delete_purchase(&self, user_id: &str, item_id: &str, timestamp: Option<Timestamp>) -> Result<(), ApiError> {
        self.ack(Request::DeletePurchase {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            timestamp,
        })
    }

    fn list_item_purchases(&self, item_id: &str) -> Result<Vec<Purchase>, ApiError> {
        self.fetch(Request::ListItemPurchases {
            item_id: item_id.to_string(),
        })
    }

    fn list_user_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, ApiError> {
        self.fetch(Request::ListUserPurchases {
            user_id: user_id.to_string(),
        })
    }

    fn add_rating(
        &self,
        user_id: &str,
        item_id: &str,
        rating: f64,
        options: &InteractionOptions,
    ) -> Result<(), ApiError> {
        self.ack(Request::AddRating {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            rating,
            options: options.clone(),
        })
    }

    fn delete_rating(&self, user_id: &str, item_id: &str, timestamp: Option<Timestamp>) -> Result<(), ApiError> {
        self.ack(Request::DeleteRating {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            timestamp,
        })
    }

    fn add_cart_addition(&self, user_id: &str, item_id: &str, options: &InteractionOptions) -> Result<(), ApiError> {
        self.ack(Request::AddCartAddition {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            options: options.cascading_by_default(),
        })
    }

    fn delete_cart_addition(
        &self,
        user_id: &str,
        item_id: &str,
        timestamp: Option<Timestamp>,
    ) -> Result<(), ApiError> {
        self.ack(Request::DeleteCartAddition {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            timestamp,
        })
    }

    fn add_bookmark(&self, user_id: &str, item_id: &str, options: &InteractionOptions) -> Result<(), ApiError> {
        self.ack(Request::AddBookmark {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            options: options.cascading_by_default(),
        })
    }

    fn delete_bookmark(&self, user_id: &str, item_id: &str, timestamp: Option<Timestamp>) -> Result<(), ApiError> {
        self.ack(Request::DeleteBookmark {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            timestamp,
        })
    }

    fn recommend_items_to_user(
        &self,
        user_id: &str,
        count: u64,
        options: &RecommendationOptions,
    ) -> Result<Listing, ApiError> {
        self.fetch(Request::UserBasedRecommendation {
            user_id: user_id.to_string(),
            count,
            options: options.clone(),
        })
    }

    fn recommend_items_to_item(
        &self,
        item_id: &str,
        count: u64,
        options: &ItemRecommendationOptions,
    ) -> Result<Listing, ApiError> {
        self.fetch(Request::ItemBasedRecommendation {
            item_id: item_id.to_string(),
            count,
            options: options.clone(),
        })
    }

    fn add_purchases(&self, records: &[PurchaseRecord]) -> Result<Vec<BatchOutcome>, ApiError> {
        let requests = records
            .iter()
            .map(|record| Request::AddPurchase {
                user_id: record.user_id.clone(),
                item_id: record.item_id.clone(),
                options: InteractionOptions {
                    timestamp: record.timestamp.clone(),
                    cascade_create: Some(true),
                    recomm_id: None,
                },
            })
            .collect();
        self.batch(requests)
    }

    fn delete_purchases(&self, records: &[PurchaseRecord]) -> Result<Vec<BatchOutcome>, ApiError> {
        let requests = records
            .iter()
            .map(|record| Request::DeletePurchase {
                user_id: record.user_id.clone(),
                item_id: record.item_id.clone(),
                timestamp: record.timestamp.clone(),
            })
            .collect();
        self.batch(requests)
    }
}
