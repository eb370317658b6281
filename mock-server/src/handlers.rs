//! Axum handlers. Each one locks the engine, runs one `Database` operation
//! and answers with `"ok"`, the JSON result, or the engine error.

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::store::{Database, EngineError, Entity, Kind, Params};
use crate::Engine;

pub type Reply = Result<(StatusCode, Json<Value>), EngineError>;

fn ok() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!("ok")))
}

fn created() -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, Json(json!("ok")))
}

async fn write<T>(
    engine: &Engine,
    db: String,
    op: impl FnOnce(&mut Database) -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    let mut dbs = engine.write().await;
    op(dbs.entry(db).or_default())
}

async fn read<T>(
    engine: &Engine,
    db: &str,
    op: impl FnOnce(&Database) -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    let dbs = engine.read().await;
    match dbs.get(db) {
        Some(database) => op(database),
        None => op(&Database::default()),
    }
}

fn object(body: Value) -> Result<serde_json::Map<String, Value>, EngineError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(EngineError::BadRequest("request body must be a JSON object".to_string())),
    }
}

pub async fn add_entity(engine: Engine, db: String, entity: Entity, id: String) -> Reply {
    write(&engine, db, |d| d.add_entity(entity, &id)).await?;
    Ok(created())
}

pub async fn delete_entity(engine: Engine, db: String, entity: Entity, id: String) -> Reply {
    write(&engine, db, |d| d.delete_entity(entity, &id)).await?;
    Ok(ok())
}

pub async fn get_values(engine: Engine, db: String, entity: Entity, id: String) -> Reply {
    let values = read(&engine, &db, |d| d.get_values(entity, &id)).await?;
    Ok((StatusCode::OK, Json(Value::Object(values))))
}

pub async fn set_values(engine: Engine, db: String, entity: Entity, id: String, body: Value) -> Reply {
    let values = object(body)?;
    write(&engine, db, |d| d.set_values(entity, &id, values)).await?;
    Ok(ok())
}

pub async fn list_entities(engine: Engine, db: String, entity: Entity, query: Params) -> Reply {
    let listed = read(&engine, &db, |d| d.list(entity, &query)).await?;
    Ok((StatusCode::OK, Json(listed)))
}

pub async fn merge_users(engine: Engine, db: String, target: String, source: String, query: Params) -> Reply {
    write(&engine, db, |d| d.merge_users(&target, &source, &query)).await?;
    Ok(ok())
}

pub async fn add_property(engine: Engine, db: String, entity: Entity, name: String, query: Params) -> Reply {
    write(&engine, db, |d| d.add_property(entity, &name, &query)).await?;
    Ok(created())
}

pub async fn delete_property(engine: Engine, db: String, entity: Entity, name: String) -> Reply {
    write(&engine, db, |d| d.delete_property(entity, &name)).await?;
    Ok(ok())
}

pub async fn property_info(engine: Engine, db: String, entity: Entity, name: String) -> Reply {
    let info = read(&engine, &db, |d| d.property_info(entity, &name)).await?;
    Ok((StatusCode::OK, Json(info)))
}

pub async fn list_properties(engine: Engine, db: String, entity: Entity) -> Reply {
    let props = read(&engine, &db, |d| Ok(d.list_properties(entity))).await?;
    Ok((StatusCode::OK, Json(props)))
}

pub async fn add_interaction(engine: Engine, db: String, kind: Kind, body: Value) -> Reply {
    let body = object(body)?;
    write(&engine, db, |d| d.add_interaction(kind, &body)).await?;
    Ok(ok())
}

pub async fn delete_interactions(engine: Engine, db: String, kind: Kind, query: Params) -> Reply {
    write(&engine, db, |d| d.delete_interactions(kind, &query)).await?;
    Ok(ok())
}

pub async fn list_interactions(engine: Engine, db: String, kind: Kind, entity: Entity, id: String) -> Reply {
    let listed = read(&engine, &db, |d| d.list_interactions(kind, entity, &id)).await?;
    Ok((StatusCode::OK, Json(listed)))
}

/// Recommendations take the write lock: `cascadeCreate` may add the user or
/// item.
pub async fn recommend(engine: Engine, db: String, entity: Entity, id: String, query: Params) -> Reply {
    let recommended = write(&engine, db, |d| match entity {
        Entity::User => d.recommend_to_user(&id, &query),
        Entity::Item => d.recommend_to_item(&id, &query),
    })
    .await?;
    Ok((StatusCode::OK, Json(recommended)))
}
