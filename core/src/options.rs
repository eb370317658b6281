//! Optional parameters of the engine operations.
//!
//! Every field is optional and omitted from the wire when unset, so the engine
//! applies its own default. Field names serialize to the engine's camelCase
//! parameter names.

use serde::Serialize;

use crate::types::Timestamp;

/// Paging and projection for the item and user listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    /// Boolean-returning ReQL expression selecting the entities to list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Number of entities to skip, ordered by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_properties: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_properties: Option<Vec<String>>,
}

/// Options of the set-values operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetValuesOptions {
    /// Create the entity when it does not exist yet.
    pub cascade_create: Option<bool>,
}

impl SetValuesOptions {
    pub fn cascading(cascade_create: bool) -> Self {
        Self {
            cascade_create: Some(cascade_create),
        }
    }
}

/// Options of `add_detail_view`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailViewOptions {
    /// Defaults to the current time on the engine side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Seconds the user spent on the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade_create: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recomm_id: Option<String>,
}

/// Options shared by purchases, ratings, cart additions and bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    /// Create the user or item when it does not exist yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade_create: Option<bool>,
    /// Id of the recommendation response that led to the interaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recomm_id: Option<String>,
}

impl InteractionOptions {
    /// An interaction at `timestamp` that creates missing users and items.
    pub fn at(timestamp: impl Into<Timestamp>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            cascade_create: Some(true),
            recomm_id: None,
        }
    }

    /// A copy that creates missing users and items unless `cascade_create`
    /// was set explicitly.
    pub fn cascading_by_default(&self) -> Self {
        Self {
            cascade_create: Some(self.cascade_create.unwrap_or(true)),
            ..self.clone()
        }
    }
}

/// Options of the user-based recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationOptions {
    /// Boolean-returning ReQL expression, e.g.
    /// `not 'deleted' and "Electronics" in 'categories'`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Number-returning ReQL expression boosting matching items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade_create: Option<bool>,
    /// Application of the recommendations, e.g. `homepage` or `cart`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_properties: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included_properties: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diversity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_relevance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_time: Option<f64>,
}

/// Options of the item-based recommendation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecommendationOptions {
    /// User who will see the recommendations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
    /// Bias towards `target_user_id`: 0.0 ignores the user, 1.0 is fully
    /// user-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_impact: Option<f64>,
    #[serde(flatten)]
    pub common: RecommendationOptions,
}
