//! In-memory stand-in for the hosted recommendation engine.
//!
//! Serves the engine's REST surface under `/{db}/...`, one independent
//! database per path prefix, with the engine's status-code semantics.
//! Request signatures (`hmac_timestamp` / `hmac_sign`) are accepted and not
//! verified. ReQL filters and boosters are accepted and ignored.

pub mod batch;
mod handlers;
pub mod store;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};

pub use store::{Database, EngineError, Entity, Kind, Params};

/// All databases, keyed by the `{db}` path segment.
pub type Engine = Arc<RwLock<HashMap<String, Database>>>;

pub fn app() -> Router {
    let engine: Engine = Arc::default();
    let api = api_routes().with_state(engine);
    Router::new()
        .route("/{db}/batch/", post(batch::execute))
        .with_state(api.clone())
        .merge(api)
        .layer(middleware::from_fn(log_request))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve a fresh engine on an ephemeral local port from a background thread
/// and return its base URL.
pub fn spawn() -> std::io::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    std::thread::spawn(move || {
        let served = runtime.block_on(async move { run(TcpListener::from_std(listener)?).await });
        if let Err(err) = served {
            tracing::error!(%addr, error = %err, "mock engine stopped");
        }
    });

    Ok(format!("http://{addr}"))
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::debug!(%method, %path, status = response.status().as_u16(), "handled");
    response
}

fn api_routes() -> Router<Engine> {
    let mut router = Router::new()
        .merge(entity_routes(Entity::Item))
        .merge(entity_routes(Entity::User))
        .route(
            "/{db}/users/{id}/merge/{source}",
            put(
                |State(engine): State<Engine>,
                 Path((db, target, source)): Path<(String, String, String)>,
                 Query(query): Query<Params>| handlers::merge_users(engine, db, target, source, query),
            ),
        );

    for kind in Kind::ALL {
        router = router.route(
            &format!("/{{db}}/{}/", kind.collection()),
            post(
                move |State(engine): State<Engine>, Path(db): Path<String>, Json(body): Json<Value>| {
                    handlers::add_interaction(engine, db, kind, body)
                },
            )
            .delete(
                move |State(engine): State<Engine>, Path(db): Path<String>, Query(query): Query<Params>| {
                    handlers::delete_interactions(engine, db, kind, query)
                },
            ),
        );
    }
    router
}

/// Routes shared by items and users: the entity itself, its listing, its
/// property schema, its interaction listings and its recommendations.
fn entity_routes(entity: Entity) -> Router<Engine> {
    let base = format!("/{{db}}/{}", entity.collection());
    let mut router = Router::new()
        .route(
            &format!("{base}/list/"),
            get(
                move |State(engine): State<Engine>, Path(db): Path<String>, Query(query): Query<Params>| {
                    handlers::list_entities(engine, db, entity, query)
                },
            ),
        )
        .route(
            &format!("{base}/properties/list/"),
            get(move |State(engine): State<Engine>, Path(db): Path<String>| {
                handlers::list_properties(engine, db, entity)
            }),
        )
        .route(
            &format!("{base}/properties/{{name}}"),
            put(
                move |State(engine): State<Engine>,
                      Path((db, name)): Path<(String, String)>,
                      Query(query): Query<Params>| handlers::add_property(engine, db, entity, name, query),
            )
            .delete(move |State(engine): State<Engine>, Path((db, name)): Path<(String, String)>| {
                handlers::delete_property(engine, db, entity, name)
            })
            .get(move |State(engine): State<Engine>, Path((db, name)): Path<(String, String)>| {
                handlers::property_info(engine, db, entity, name)
            }),
        )
        .route(
            &format!("{base}/{{id}}"),
            put(move |State(engine): State<Engine>, Path((db, id)): Path<(String, String)>| {
                handlers::add_entity(engine, db, entity, id)
            })
            .delete(move |State(engine): State<Engine>, Path((db, id)): Path<(String, String)>| {
                handlers::delete_entity(engine, db, entity, id)
            })
            .get(move |State(engine): State<Engine>, Path((db, id)): Path<(String, String)>| {
                handlers::get_values(engine, db, entity, id)
            })
            .post(
                move |State(engine): State<Engine>,
                      Path((db, id)): Path<(String, String)>,
                      Json(body): Json<Value>| handlers::set_values(engine, db, entity, id, body),
            ),
        )
        .route(
            &format!("{base}/{{id}}/recomms/"),
            get(
                move |State(engine): State<Engine>,
                      Path((db, id)): Path<(String, String)>,
                      Query(query): Query<Params>| handlers::recommend(engine, db, entity, id, query),
            ),
        );

    for kind in Kind::ALL {
        router = router.route(
            &format!("{base}/{{id}}/{}/", kind.collection()),
            get(move |State(engine): State<Engine>, Path((db, id)): Path<(String, String)>| {
                handlers::list_interactions(engine, db, kind, entity, id)
            }),
        );
    }
    router
}
