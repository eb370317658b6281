//! In-memory database of the mock engine.
//!
//! Holds items, users, their property schemas and the interaction log, and
//! enforces the rules the hosted engine reports through status codes: 400 for
//! malformed ids, timestamps, ratings and properties, 404 for missing
//! entities, 409 for duplicates.

use std::collections::{BTreeMap, HashMap, HashSet};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

pub type Values = Map<String, Value>;

/// Query parameters as received.
pub type Params = HashMap<String, String>;

const PROPERTY_TYPES: [&str; 6] = ["int", "double", "string", "boolean", "timestamp", "set"];
const MAX_ID_LEN: usize = 256;
const MAX_PROPERTY_NAME_LEN: usize = 63;
const DEFAULT_LIST_COUNT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
}

impl EngineError {
    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::BadRequest(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            EngineError::BadRequest(m) | EngineError::NotFound(m) | EngineError::Conflict(m) => m,
        };
        (status, Json(json!({"statusCode": status.as_u16(), "message": message}))).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Item,
    User,
}

impl Entity {
    pub fn collection(&self) -> &'static str {
        match self {
            Entity::Item => "items",
            Entity::User => "users",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Entity::Item => "Item",
            Entity::User => "User",
        }
    }

    fn id_field(&self) -> &'static str {
        match self {
            Entity::Item => "itemId",
            Entity::User => "userId",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    DetailView,
    Purchase,
    Rating,
    CartAddition,
    Bookmark,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::DetailView,
        Kind::Purchase,
        Kind::Rating,
        Kind::CartAddition,
        Kind::Bookmark,
    ];

    pub fn collection(&self) -> &'static str {
        match self {
            Kind::DetailView => "detailviews",
            Kind::Purchase => "purchases",
            Kind::Rating => "ratings",
            Kind::CartAddition => "cartadditions",
            Kind::Bookmark => "bookmarks",
        }
    }

    /// Optional body fields stored with the interaction and echoed by listings.
    fn extra_fields(&self) -> &'static [&'static str] {
        match self {
            Kind::DetailView => &["duration", "recommId"],
            Kind::Purchase => &["amount", "price", "profit", "recommId"],
            Kind::CartAddition => &["amount", "price", "recommId"],
            Kind::Rating | Kind::Bookmark => &["recommId"],
        }
    }
}

#[derive(Debug, Clone)]
struct Interaction {
    kind: Kind,
    user_id: String,
    item_id: String,
    timestamp: f64,
    rating: Option<f64>,
    extra: Values,
}

impl Interaction {
    fn entity_id(&self, entity: Entity) -> &str {
        match entity {
            Entity::Item => &self.item_id,
            Entity::User => &self.user_id,
        }
    }

    fn same_pair(&self, kind: Kind, user_id: &str, item_id: &str) -> bool {
        self.kind == kind && self.user_id == user_id && self.item_id == item_id
    }

    fn to_json(&self) -> Value {
        let mut out = Values::new();
        out.insert("userId".to_string(), json!(self.user_id));
        out.insert("itemId".to_string(), json!(self.item_id));
        out.insert("timestamp".to_string(), json!(self.timestamp));
        if let Some(rating) = self.rating {
            out.insert("rating".to_string(), json!(rating));
        }
        out.extend(self.extra.clone());
        Value::Object(out)
    }
}

#[derive(Debug, Default)]
struct Table {
    records: BTreeMap<String, Values>,
    properties: BTreeMap<String, String>,
}

impl Table {
    fn insert_blank(&mut self, id: &str) {
        let record = self.properties.keys().map(|k| (k.clone(), Value::Null)).collect();
        self.records.insert(id.to_string(), record);
    }
}

/// Which properties a listing returns alongside the ids.
struct Projection {
    return_properties: bool,
    included: Option<Vec<String>>,
}

impl Projection {
    fn from_query(query: &Params) -> Result<Self, EngineError> {
        Ok(Self {
            return_properties: parse_bool(query, "returnProperties")?.unwrap_or(false),
            included: query
                .get("includedProperties")
                .map(|raw| raw.split(',').map(|p| p.trim().to_string()).collect()),
        })
    }

    fn render<'a>(&self, entity: Entity, table: &Table, ids: impl Iterator<Item = &'a String>) -> Value {
        if !self.return_properties {
            return Value::Array(ids.map(|id| json!(id)).collect());
        }
        let records = ids
            .map(|id| {
                let mut out = Values::new();
                out.insert(entity.id_field().to_string(), json!(id));
                if let Some(values) = table.records.get(id) {
                    for (name, value) in values {
                        let wanted = self.included.as_ref().map_or(true, |inc| inc.contains(name));
                        if wanted {
                            out.insert(name.clone(), value.clone());
                        }
                    }
                }
                Value::Object(out)
            })
            .collect();
        Value::Array(records)
    }
}

/// One database of the mock engine.
#[derive(Debug, Default)]
pub struct Database {
    items: Table,
    users: Table,
    interactions: Vec<Interaction>,
}

impl Database {
    fn table(&self, entity: Entity) -> &Table {
        match entity {
            Entity::Item => &self.items,
            Entity::User => &self.users,
        }
    }

    fn table_mut(&mut self, entity: Entity) -> &mut Table {
        match entity {
            Entity::Item => &mut self.items,
            Entity::User => &mut self.users,
        }
    }

    fn exists(&self, entity: Entity, id: &str) -> bool {
        self.table(entity).records.contains_key(id)
    }

    /// Fail with 404 unless the entity exists or `cascade` creates it.
    fn ensure(&mut self, entity: Entity, id: &str, cascade: bool) -> Result<(), EngineError> {
        if self.exists(entity, id) {
            return Ok(());
        }
        if !cascade {
            return Err(not_found(entity, id));
        }
        self.table_mut(entity).insert_blank(id);
        Ok(())
    }

    // -- entities -----------------------------------------------------------

    pub fn add_entity(&mut self, entity: Entity, id: &str) -> Result<(), EngineError> {
        validate_id(entity, id)?;
        if self.exists(entity, id) {
            return Err(EngineError::Conflict(format!("{} {id} already exists", entity.label())));
        }
        self.table_mut(entity).insert_blank(id);
        Ok(())
    }

    /// Remove the entity and, in cascade, every interaction referencing it.
    pub fn delete_entity(&mut self, entity: Entity, id: &str) -> Result<(), EngineError> {
        validate_id(entity, id)?;
        if self.table_mut(entity).records.remove(id).is_none() {
            return Err(not_found(entity, id));
        }
        self.interactions.retain(|i| i.entity_id(entity) != id);
        Ok(())
    }

    pub fn get_values(&self, entity: Entity, id: &str) -> Result<Values, EngineError> {
        validate_id(entity, id)?;
        self.table(entity)
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(entity, id))
    }

    pub fn set_values(&mut self, entity: Entity, id: &str, mut values: Values) -> Result<(), EngineError> {
        validate_id(entity, id)?;
        let cascade = values
            .remove("!cascadeCreate")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let table = self.table(entity);
        for (name, value) in &values {
            let Some(property_type) = table.properties.get(name) else {
                return Err(EngineError::BadRequest(format!("property {name} does not exist")));
            };
            if !value_matches(property_type, value) {
                return Err(EngineError::BadRequest(format!(
                    "value of {name} is not a valid {property_type}"
                )));
            }
        }
        self.ensure(entity, id, cascade)?;
        if let Some(record) = self.table_mut(entity).records.get_mut(id) {
            record.extend(values);
        }
        Ok(())
    }

    pub fn list(&self, entity: Entity, query: &Params) -> Result<Value, EngineError> {
        let count = parse_usize(query, "count")?.unwrap_or(DEFAULT_LIST_COUNT);
        let offset = parse_usize(query, "offset")?.unwrap_or(0);
        let projection = Projection::from_query(query)?;
        let table = self.table(entity);
        Ok(projection.render(entity, table, table.records.keys().skip(offset).take(count)))
    }

    /// Move the source user's interactions to the target user.
    pub fn merge_users(&mut self, target: &str, source: &str, query: &Params) -> Result<(), EngineError> {
        validate_id(Entity::User, target)?;
        validate_id(Entity::User, source)?;
        let cascade = parse_bool(query, "cascadeCreate")?.unwrap_or(false);
        let keep_source = parse_bool(query, "keepSourceUser")?.unwrap_or(false);
        self.ensure(Entity::User, target, cascade)?;
        self.ensure(Entity::User, source, cascade)?;
        for interaction in self.interactions.iter_mut().filter(|i| i.user_id == source) {
            interaction.user_id = target.to_string();
        }
        if !keep_source && target != source {
            self.users.records.remove(source);
        }
        Ok(())
    }

    // -- properties ---------------------------------------------------------

    pub fn add_property(&mut self, entity: Entity, name: &str, query: &Params) -> Result<(), EngineError> {
        validate_property_name(entity, name)?;
        let property_type = query
            .get("type")
            .ok_or_else(|| EngineError::BadRequest("parameter type is required".to_string()))?;
        if !PROPERTY_TYPES.contains(&property_type.as_str()) {
            return Err(EngineError::BadRequest(format!("unknown property type {property_type}")));
        }
        let table = self.table_mut(entity);
        if table.properties.contains_key(name) {
            return Err(EngineError::Conflict(format!("property {name} already exists")));
        }
        table.properties.insert(name.to_string(), property_type.clone());
        for record in table.records.values_mut() {
            record.insert(name.to_string(), Value::Null);
        }
        Ok(())
    }

    pub fn delete_property(&mut self, entity: Entity, name: &str) -> Result<(), EngineError> {
        validate_property_name(entity, name)?;
        let table = self.table_mut(entity);
        if table.properties.remove(name).is_none() {
            return Err(property_not_found(name));
        }
        for record in table.records.values_mut() {
            record.remove(name);
        }
        Ok(())
    }

    pub fn property_info(&self, entity: Entity, name: &str) -> Result<Value, EngineError> {
        validate_property_name(entity, name)?;
        self.table(entity)
            .properties
            .get(name)
            .map(|t| json!({"name": name, "type": t}))
            .ok_or_else(|| property_not_found(name))
    }

    pub fn list_properties(&self, entity: Entity) -> Value {
        let props = self
            .table(entity)
            .properties
            .iter()
            .map(|(name, t)| json!({"name": name, "type": t}))
            .collect();
        Value::Array(props)
    }

    // -- interactions -------------------------------------------------------

    pub fn add_interaction(&mut self, kind: Kind, body: &Values) -> Result<(), EngineError> {
        let user_id = required_str(body, "userId")?;
        let item_id = required_str(body, "itemId")?;
        validate_id(Entity::User, user_id)?;
        validate_id(Entity::Item, item_id)?;
        let timestamp = match body.get("timestamp") {
            None | Some(Value::Null) => now(),
            Some(value) => parse_timestamp(value)?,
        };
        let rating = if kind == Kind::Rating {
            let rating = body
                .get("rating")
                .and_then(Value::as_f64)
                .ok_or_else(|| EngineError::BadRequest("rating is required".to_string()))?;
            if !(-1.0..=1.0).contains(&rating) {
                return Err(EngineError::BadRequest(format!("rating {rating} is outside [-1.0, 1.0]")));
            }
            Some(rating)
        } else {
            None
        };
        let cascade = body.get("cascadeCreate").and_then(Value::as_bool).unwrap_or(false);

        self.ensure(Entity::Item, item_id, cascade)?;
        self.ensure(Entity::User, user_id, cascade)?;

        let duplicate = self
            .interactions
            .iter()
            .any(|i| i.same_pair(kind, user_id, item_id) && i.timestamp == timestamp);
        if duplicate {
            return Err(EngineError::Conflict(format!(
                "{} of {item_id} by {user_id} at {timestamp} already exists",
                kind.collection()
            )));
        }

        let extra = kind
            .extra_fields()
            .iter()
            .filter_map(|field| body.get(*field).map(|v| (field.to_string(), v.clone())))
            .collect();
        self.interactions.push(Interaction {
            kind,
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            timestamp,
            rating,
            extra,
        });
        Ok(())
    }

    /// Delete the interaction at `timestamp`, or all of the pair's
    /// interactions of this kind when no timestamp is given.
    pub fn delete_interactions(&mut self, kind: Kind, query: &Params) -> Result<(), EngineError> {
        let user_id = query
            .get("userId")
            .ok_or_else(|| EngineError::BadRequest("parameter userId is required".to_string()))?;
        let item_id = query
            .get("itemId")
            .ok_or_else(|| EngineError::BadRequest("parameter itemId is required".to_string()))?;
        validate_id(Entity::User, user_id)?;
        validate_id(Entity::Item, item_id)?;
        if !self.exists(Entity::Item, item_id) {
            return Err(not_found(Entity::Item, item_id));
        }
        if !self.exists(Entity::User, user_id) {
            return Err(not_found(Entity::User, user_id));
        }

        match query.get("timestamp") {
            Some(raw) => {
                let timestamp = parse_timestamp_str(raw)?;
                let before = self.interactions.len();
                self.interactions
                    .retain(|i| !(i.same_pair(kind, user_id, item_id) && i.timestamp == timestamp));
                if self.interactions.len() == before {
                    return Err(EngineError::NotFound(format!(
                        "no {} of {item_id} by {user_id} at {timestamp}",
                        kind.collection()
                    )));
                }
            }
            None => self.interactions.retain(|i| !i.same_pair(kind, user_id, item_id)),
        }
        Ok(())
    }

    pub fn list_interactions(&self, kind: Kind, entity: Entity, id: &str) -> Result<Value, EngineError> {
        validate_id(entity, id)?;
        if !self.exists(entity, id) {
            return Err(not_found(entity, id));
        }
        let mut matching: Vec<&Interaction> = self
            .interactions
            .iter()
            .filter(|i| i.kind == kind && i.entity_id(entity) == id)
            .collect();
        matching.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Ok(Value::Array(matching.into_iter().map(Interaction::to_json).collect()))
    }

    // -- recommendations ----------------------------------------------------

    /// Most popular items the user has not interacted with yet.
    pub fn recommend_to_user(&mut self, user_id: &str, query: &Params) -> Result<Value, EngineError> {
        validate_id(Entity::User, user_id)?;
        let count = required_count(query)?;
        let cascade = parse_bool(query, "cascadeCreate")?.unwrap_or(false);
        let projection = Projection::from_query(query)?;
        self.ensure(Entity::User, user_id, cascade)?;

        let seen = self.items_of(user_id);
        let popularity = self.popularity();
        let mut candidates: Vec<&String> = self
            .items
            .records
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .collect();
        candidates.sort_by(|a, b| {
            let pa = popularity.get(a.as_str()).copied().unwrap_or(0);
            let pb = popularity.get(b.as_str()).copied().unwrap_or(0);
            pb.cmp(&pa).then_with(|| a.cmp(b))
        });
        Ok(projection.render(Entity::Item, &self.items, candidates.into_iter().take(count)))
    }

    /// Items most often co-interacted with `item_id`, excluding what the
    /// target user has already seen.
    pub fn recommend_to_item(&mut self, item_id: &str, query: &Params) -> Result<Value, EngineError> {
        validate_id(Entity::Item, item_id)?;
        let count = required_count(query)?;
        let cascade = parse_bool(query, "cascadeCreate")?.unwrap_or(false);
        let projection = Projection::from_query(query)?;
        self.ensure(Entity::Item, item_id, cascade)?;
        let target = query.get("targetUserId");
        if let Some(target) = target {
            validate_id(Entity::User, target)?;
            self.ensure(Entity::User, target, cascade)?;
        }

        let seen = target.map(|t| self.items_of(t)).unwrap_or_default();
        let viewers: HashSet<&str> = self
            .interactions
            .iter()
            .filter(|i| i.item_id == item_id)
            .map(|i| i.user_id.as_str())
            .collect();
        let mut related: HashMap<&str, usize> = HashMap::new();
        for i in self
            .interactions
            .iter()
            .filter(|i| i.item_id != item_id && viewers.contains(i.user_id.as_str()))
        {
            *related.entry(i.item_id.as_str()).or_default() += 1;
        }
        let popularity = self.popularity();
        let mut candidates: Vec<&String> = self
            .items
            .records
            .keys()
            .filter(|id| id.as_str() != item_id && !seen.contains(id.as_str()))
            .collect();
        let score = |id: &str| {
            (
                related.get(id).copied().unwrap_or(0),
                popularity.get(id).copied().unwrap_or(0),
            )
        };
        candidates.sort_by(|a, b| score(b.as_str()).cmp(&score(a.as_str())).then_with(|| a.cmp(b)));
        Ok(projection.render(Entity::Item, &self.items, candidates.into_iter().take(count)))
    }

    fn items_of(&self, user_id: &str) -> HashSet<&str> {
        self.interactions
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| i.item_id.as_str())
            .collect()
    }

    fn popularity(&self) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for i in &self.interactions {
            *counts.entry(i.item_id.as_str()).or_default() += 1;
        }
        counts
    }
}

fn not_found(entity: Entity, id: &str) -> EngineError {
    EngineError::NotFound(format!("{} {id} not found", entity.label()))
}

fn property_not_found(name: &str) -> EngineError {
    EngineError::NotFound(format!("property {name} not found"))
}

/// Ids may consist of digits, Latin letters, underscores, colons and minus
/// signs.
fn validate_id(entity: Entity, id: &str) -> Result<(), EngineError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-'));
    if valid {
        Ok(())
    } else {
        Err(EngineError::BadRequest(format!("{} id {id} is not valid", entity.label())))
    }
}

fn validate_property_name(entity: Entity, name: &str) -> Result<(), EngineError> {
    let lower = name.to_ascii_lowercase();
    let reserved = lower == "id" || lower == entity.id_field().to_ascii_lowercase();
    let valid = !name.is_empty()
        && name.len() <= MAX_PROPERTY_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if reserved || !valid {
        return Err(EngineError::BadRequest(format!("property name {name} is not allowed")));
    }
    Ok(())
}

fn value_matches(property_type: &str, value: &Value) -> bool {
    if value.is_null() {
        return true;
    }
    match property_type {
        "int" => value.is_i64() || value.is_u64(),
        "double" => value.is_number(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "timestamp" => parse_timestamp(value).is_ok(),
        "set" => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        _ => false,
    }
}

fn now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

fn parse_timestamp(value: &Value) -> Result<f64, EngineError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|t| *t >= 0.0)
            .ok_or_else(|| EngineError::BadRequest(format!("timestamp {n} is not valid"))),
        Value::String(s) => parse_timestamp_str(s),
        other => Err(EngineError::BadRequest(format!("timestamp {other} is not valid"))),
    }
}

/// Epoch seconds or an RFC 3339 / ISO-8601 date-time.
fn parse_timestamp_str(raw: &str) -> Result<f64, EngineError> {
    let invalid = || EngineError::BadRequest(format!("timestamp {raw} is not valid"));
    if let Ok(seconds) = raw.parse::<f64>() {
        return if seconds >= 0.0 { Ok(seconds) } else { Err(invalid()) };
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis() as f64 / 1000.0)
        .map_err(|_| invalid())
}

fn required_str<'a>(body: &'a Values, field: &str) -> Result<&'a str, EngineError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::BadRequest(format!("parameter {field} is required")))
}

fn required_count(query: &Params) -> Result<usize, EngineError> {
    match parse_usize(query, "count")? {
        Some(count) if count > 0 => Ok(count),
        _ => Err(EngineError::BadRequest("parameter count must be a positive integer".to_string())),
    }
}

fn parse_usize(query: &Params, key: &str) -> Result<Option<usize>, EngineError> {
    query
        .get(key)
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| EngineError::BadRequest(format!("parameter {key} is not a valid count")))
        })
        .transpose()
}

fn parse_bool(query: &Params, key: &str) -> Result<Option<bool>, EngineError> {
    match query.get(key).map(String::as_str) {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(EngineError::BadRequest(format!("parameter {key}={other} is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: Value) -> Values {
        value.as_object().cloned().unwrap()
    }

    fn query(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn seeded() -> Database {
        let mut db = Database::default();
        db.add_entity(Entity::Item, "entity_id").unwrap();
        db.add_entity(Entity::User, "entity_id").unwrap();
        db
    }

    #[test]
    fn id_rules() {
        assert!(validate_id(Entity::Item, "item-865:a_b").is_ok());
        assert!(validate_id(Entity::Item, "...not_valid...").is_err());
        assert!(validate_id(Entity::Item, "").is_err());
    }

    #[test]
    fn adding_twice_conflicts() {
        let mut db = Database::default();
        db.add_entity(Entity::Item, "valid_id2").unwrap();
        assert!(matches!(
            db.add_entity(Entity::Item, "valid_id2"),
            Err(EngineError::Conflict(_))
        ));
    }

    #[test]
    fn iso_and_epoch_timestamps() {
        assert_eq!(parse_timestamp(&json!(5)).unwrap(), 5.0);
        assert_eq!(parse_timestamp_str("2013-10-29T09:38:41.341Z").unwrap(), 1_383_039_521.341);
        assert!(parse_timestamp(&json!(-15)).is_err());
        assert!(parse_timestamp_str("yesterday").is_err());
    }

    #[test]
    fn cascade_creates_missing_entities() {
        let mut db = Database::default();
        db.add_interaction(
            Kind::DetailView,
            &body(json!({"userId": "u_id", "itemId": "i_id", "cascadeCreate": true})),
        )
        .unwrap();
        assert!(db.exists(Entity::User, "u_id"));
        assert!(db.exists(Entity::Item, "i_id"));
    }

    #[test]
    fn duplicate_interaction_conflicts() {
        let mut db = seeded();
        let view = body(json!({"userId": "entity_id", "itemId": "entity_id", "timestamp": 5}));
        db.add_interaction(Kind::Bookmark, &view).unwrap();
        assert!(matches!(
            db.add_interaction(Kind::Bookmark, &view),
            Err(EngineError::Conflict(_))
        ));
        db.add_interaction(Kind::Purchase, &view).unwrap();
    }

    #[test]
    fn rating_must_be_in_range() {
        let mut db = seeded();
        let err = db
            .add_interaction(
                Kind::Rating,
                &body(json!({"userId": "entity_id", "itemId": "entity_id", "rating": -2})),
            )
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn deleting_item_removes_its_interactions() {
        let mut db = seeded();
        db.add_interaction(
            Kind::Purchase,
            &body(json!({"userId": "entity_id", "itemId": "entity_id", "timestamp": 1})),
        )
        .unwrap();
        db.delete_entity(Entity::Item, "entity_id").unwrap();
        assert!(db.interactions.is_empty());
    }

    #[test]
    fn delete_without_timestamp_removes_all_of_pair() {
        let mut db = seeded();
        for ts in [1, 2, 3] {
            db.add_interaction(
                Kind::CartAddition,
                &body(json!({"userId": "entity_id", "itemId": "entity_id", "timestamp": ts})),
            )
            .unwrap();
        }
        db.delete_interactions(
            Kind::CartAddition,
            &query(&[("userId", "entity_id"), ("itemId", "entity_id"), ("timestamp", "2")]),
        )
        .unwrap();
        assert_eq!(db.interactions.len(), 2);
        db.delete_interactions(Kind::CartAddition, &query(&[("userId", "entity_id"), ("itemId", "entity_id")]))
            .unwrap();
        assert!(db.interactions.is_empty());
    }

    #[test]
    fn set_values_requires_declared_property() {
        let mut db = seeded();
        let err = db
            .set_values(Entity::Item, "entity_id", body(json!({"price": 3.5})))
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        db.add_property(Entity::Item, "price", &query(&[("type", "double")]))
            .unwrap();
        db.set_values(Entity::Item, "entity_id", body(json!({"price": 3.5})))
            .unwrap();
        assert_eq!(db.get_values(Entity::Item, "entity_id").unwrap()["price"], json!(3.5));
    }

    #[test]
    fn reserved_property_names() {
        let mut db = Database::default();
        let q = query(&[("type", "int")]);
        assert!(db.add_property(Entity::Item, "ItemId", &q).is_err());
        assert!(db.add_property(Entity::User, "id", &q).is_err());
        assert!(db.add_property(Entity::User, "itemid", &q).is_ok());
    }

    #[test]
    fn user_recommendations_skip_seen_items() {
        let mut db = Database::default();
        for (user, item) in [("a", "x"), ("b", "x"), ("b", "y"), ("c", "z")] {
            db.add_interaction(
                Kind::Purchase,
                &body(json!({"userId": user, "itemId": item, "timestamp": 1, "cascadeCreate": true})),
            )
            .unwrap();
        }
        let recs = db.recommend_to_user("a", &query(&[("count", "5")])).unwrap();
        assert_eq!(recs, json!(["y", "z"]));
    }

    #[test]
    fn item_recommendations_prefer_co_interacted() {
        let mut db = Database::default();
        for (user, item) in [("a", "x"), ("a", "y"), ("b", "z"), ("c", "z")] {
            db.add_interaction(
                Kind::DetailView,
                &body(json!({"userId": user, "itemId": item, "timestamp": 1, "cascadeCreate": true})),
            )
            .unwrap();
        }
        let recs = db.recommend_to_item("x", &query(&[("count", "2")])).unwrap();
        assert_eq!(recs, json!(["y", "z"]));
    }

    #[test]
    fn list_with_properties() {
        let mut db = seeded();
        db.add_property(Entity::Item, "title", &query(&[("type", "string")]))
            .unwrap();
        let listed = db
            .list(Entity::Item, &query(&[("returnProperties", "true")]))
            .unwrap();
        assert_eq!(listed, json!([{"itemId": "entity_id", "title": null}]));
    }
}
