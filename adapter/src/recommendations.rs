use recomm_core::{
    ApiError, BatchOutcome, DetailView, DetailViewOptions, InteractionOptions, ItemRecommendationOptions, Listing,
    ListOptions, PropertyInfo, PropertyType, Purchase, PurchaseRecord, RecommendationOptions, SetValuesOptions,
    Timestamp, Values,
};

/// Catalog, interaction and recommendation calls against a recommendation
/// engine.
///
/// Every call is one request to the engine (the batch calls included) and
/// returns the engine's verdict: writes yield `Ok(())`, reads the decoded
/// answer, failures the matching `ApiError`. Nothing is validated locally;
/// ids, timestamps and filter expressions go out as given.
pub trait Recommendations {
    // -- items --

    fn add_item(&self, item_id: &str) -> Result<(), ApiError>;

    /// Deletes the item and every interaction that references it.
    fn delete_item(&self, item_id: &str) -> Result<(), ApiError>;

    fn list_items(&self, options: &ListOptions) -> Result<Listing, ApiError>;

    fn add_item_property(&self, name: &str, property_type: PropertyType) -> Result<(), ApiError>;

    fn delete_item_property(&self, name: &str) -> Result<(), ApiError>;

    fn get_item_property_info(&self, name: &str) -> Result<PropertyInfo, ApiError>;

    fn list_item_properties(&self) -> Result<Vec<PropertyInfo>, ApiError>;

    /// Sets property values, creating the item first when `cascade_create`
    /// is set and it does not exist.
    fn set_item_values(&self, item_id: &str, values: &Values, cascade_create: bool) -> Result<(), ApiError>;

    fn get_item_values(&self, item_id: &str) -> Result<Values, ApiError>;

    // -- users --

    fn add_user(&self, user_id: &str) -> Result<(), ApiError>;

    fn delete_user(&self, user_id: &str) -> Result<(), ApiError>;

    /// Moves all interactions of `source_user_id` to `target_user_id` and
    /// deletes the source user.
    fn merge_users(&self, target_user_id: &str, source_user_id: &str, cascade_create: bool) -> Result<(), ApiError>;

    fn list_users(&self, options: &ListOptions) -> Result<Listing, ApiError>;

    fn add_user_property(&self, name: &str, property_type: PropertyType) -> Result<(), ApiError>;

    fn delete_user_property(&self, name: &str) -> Result<(), ApiError>;

    fn get_user_property_info(&self, name: &str) -> Result<PropertyInfo, ApiError>;

    fn list_user_properties(&self) -> Result<Vec<PropertyInfo>, ApiError>;

    fn set_user_values(&self, user_id: &str, values: &Values, options: &SetValuesOptions) -> Result<(), ApiError>;

    fn get_user_values(&self, user_id: &str) -> Result<Values, ApiError>;

    // -- detail views --

    fn add_detail_view(&self, user_id: &str, item_id: &str, options: &DetailViewOptions) -> Result<(), ApiError>;

    /// Without a timestamp, deletes every detail view of the pair.
    fn delete_detail_view(&self, user_id: &str, item_id: &str, timestamp: Option<Timestamp>)
        -> Result<(), ApiError>;

    fn list_item_detail_views(&self, item_id: &str) -> Result<Vec<DetailView>, ApiError>;

    fn list_user_detail_views(&self, user_id: &str) -> Result<Vec<DetailView>, ApiError>;

    // -- purchases --

    /// Creates a missing user or item unless `options.cascade_create` says
    /// otherwise. Cart additions and bookmarks behave the same.
    fn add_purchase(&self, user_id: &str, item_id: &str, options: &InteractionOptions) -> Result<(), ApiError>;

    fn delete_purchase(&self, user_id: &str, item_id: &str, timestamp: Option<Timestamp>) -> Result<(), ApiError>;

    fn list_item_purchases(&self, item_id: &str) -> Result<Vec<Purchase>, ApiError>;

    fn list_user_purchases(&self, user_id: &str) -> Result<Vec<Purchase>, ApiError>;

    // -- ratings, cart additions, bookmarks --

    /// `rating` lies in [-1.0, 1.0]; the engine rejects anything else.
    fn add_rating(&self, user_id: &str, item_id: &str, rating: f64, options: &InteractionOptions)
        -> Result<(), ApiError>;

    fn delete_rating(&self, user_id: &str, item_id: &str, timestamp: Option<Timestamp>) -> Result<(), ApiError>;

    fn add_cart_addition(&self, user_id: &str, item_id: &str, options: &InteractionOptions) -> Result<(), ApiError>;

    fn delete_cart_addition(&self, user_id: &str, item_id: &str, timestamp: Option<Timestamp>)
        -> Result<(), ApiError>;

    fn add_bookmark(&self, user_id: &str, item_id: &str, options: &InteractionOptions) -> Result<(), ApiError>;

    fn delete_bookmark(&self, user_id: &str, item_id: &str, timestamp: Option<Timestamp>) -> Result<(), ApiError>;

    // -- recommendations --

    fn recommend_items_to_user(
        &self,
        user_id: &str,
        count: u64,
        options: &RecommendationOptions,
    ) -> Result<Listing, ApiError>;

    fn recommend_items_to_item(
        &self,
        item_id: &str,
        count: u64,
        options: &ItemRecommendationOptions,
    ) -> Result<Listing, ApiError>;

    // -- batch --

    /// Submits one purchase per record, creating missing users and items.
    ///
    /// A rejected record does not fail the call; check each outcome.
    fn add_purchases(&self, records: &[PurchaseRecord]) -> Result<Vec<BatchOutcome>, ApiError>;

    /// Deletes one purchase per record; a record without timestamp deletes
    /// all purchases of its pair.
    fn delete_purchases(&self, records: &[PurchaseRecord]) -> Result<Vec<BatchOutcome>, ApiError>;
}
