//! The adapter with its production transport against a live mock engine.

use recomm_adapter::{config::EngineSettings, RecombeeAdapter, Recommendations};
use recomm_core::{
    ApiError, DetailViewOptions, InteractionOptions, ItemRecommendationOptions, Listing, ListOptions, PropertyType,
    PurchaseRecord, RecommendationOptions, SetValuesOptions, Timestamp, Values,
};
use serde_json::json;

fn adapter() -> RecombeeAdapter {
    RecombeeAdapter::from_settings(&EngineSettings {
        base_url: mock_server::spawn().unwrap(),
        database_id: "shop-db".to_string(),
        token: "secret".to_string(),
        timeout_ms: 2000,
    })
}

fn values(value: serde_json::Value) -> Values {
    value.as_object().cloned().unwrap()
}

#[test]
fn catalog_lifecycle() {
    let engine = adapter();

    engine.add_item_property("title", PropertyType::String).unwrap();
    engine.add_item_property("categories", PropertyType::Set).unwrap();
    let info = engine.get_item_property_info("categories").unwrap();
    assert_eq!(info.property_type, PropertyType::Set);
    assert_eq!(engine.list_item_properties().unwrap().len(), 2);

    engine.add_item("tv").unwrap();
    assert!(matches!(engine.add_item("tv"), Err(ApiError::Conflict { .. })));
    engine
        .set_item_values("radio", &values(json!({"title": "Radio", "categories": ["Audio"]})), true)
        .unwrap();
    assert!(matches!(
        engine.set_item_values("ghost", &values(json!({"title": "Ghost"})), false),
        Err(ApiError::NotFound { .. })
    ));
    assert_eq!(engine.get_item_values("radio").unwrap()["title"], json!("Radio"));

    let listing = engine.list_items(&ListOptions::default()).unwrap();
    assert_eq!(listing.ids(), vec!["radio", "tv"]);
    let limited = engine
        .list_items(&ListOptions {
            count: Some(1),
            offset: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(limited.ids(), vec!["tv"]);

    engine.delete_item_property("title").unwrap();
    assert!(matches!(
        engine.get_item_property_info("title"),
        Err(ApiError::NotFound { .. })
    ));
    engine.delete_item("tv").unwrap();
    assert_eq!(engine.delete_item("tv").unwrap_err().status(), Some(404));
}

#[test]
fn users_and_merge() {
    let engine = adapter();

    engine.add_user_property("age", PropertyType::Int).unwrap();
    assert_eq!(engine.get_user_property_info("age").unwrap().name, "age");
    engine.add_user("account-1").unwrap();
    engine
        .set_user_values("account-1", &values(json!({"age": 31})), &SetValuesOptions::default())
        .unwrap();
    assert_eq!(engine.get_user_values("account-1").unwrap()["age"], json!(31));
    assert!(matches!(
        engine.set_user_values("account-1", &values(json!({"age": "old"})), &SetValuesOptions::default()),
        Err(ApiError::BadRequest { .. })
    ));

    engine
        .add_bookmark("session-1", "tv", &InteractionOptions::at(1_i64))
        .unwrap();
    engine.merge_users("account-1", "session-1", true).unwrap();

    let users = engine
        .list_users(&ListOptions {
            return_properties: Some(true),
            ..Default::default()
        })
        .unwrap();
    match users {
        Listing::Records(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0]["userId"], json!("account-1"));
            assert_eq!(records[0]["age"], json!(31));
        }
        other => panic!("expected records, got {other:?}"),
    }
    assert_eq!(engine.list_user_properties().unwrap().len(), 1);

    engine.delete_user_property("age").unwrap();
    engine.delete_user("account-1").unwrap();
    assert!(matches!(engine.delete_user("account-1"), Err(ApiError::NotFound { .. })));
}

#[test]
fn interactions_round_trip() {
    let engine = adapter();

    engine
        .add_detail_view(
            "u",
            "tv",
            &DetailViewOptions {
                timestamp: Some(Timestamp::from("2013-10-29T09:38:41.341Z")),
                duration: Some(12),
                cascade_create: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    let views = engine.list_item_detail_views("tv").unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].timestamp, 1_383_039_521.341);
    assert_eq!(engine.list_user_detail_views("u").unwrap()[0].duration, Some(12));
    engine
        .delete_detail_view("u", "tv", Some(Timestamp::from("2013-10-29T09:38:41.341Z")))
        .unwrap();
    assert!(engine.list_user_detail_views("u").unwrap().is_empty());

    engine
        .add_purchase(
            "u",
            "tv",
            &InteractionOptions {
                timestamp: Some(Timestamp::from(7_i64)),
                cascade_create: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(matches!(
        engine.add_purchase("u", "tv", &InteractionOptions::at(7_i64)),
        Err(ApiError::Conflict { .. })
    ));
    assert_eq!(engine.list_user_purchases("u").unwrap()[0].item_id, "tv");
    engine.delete_purchase("u", "tv", None).unwrap();
    assert!(engine.list_item_purchases("tv").unwrap().is_empty());

    engine.add_rating("u", "tv", 0.8, &InteractionOptions::at(3_i64)).unwrap();
    assert!(matches!(
        engine.add_rating("u", "tv", 1.5, &InteractionOptions::default()),
        Err(ApiError::BadRequest { .. })
    ));
    engine.delete_rating("u", "tv", Some(Timestamp::from(3_i64))).unwrap();
    assert!(matches!(
        engine.delete_rating("u", "tv", Some(Timestamp::from(3_i64))),
        Err(ApiError::NotFound { .. })
    ));

    engine.add_cart_addition("u", "tv", &InteractionOptions::at(4_i64)).unwrap();
    engine.delete_cart_addition("u", "tv", None).unwrap();
    engine.add_bookmark("u", "tv", &InteractionOptions::at(4_i64)).unwrap();
    engine.delete_bookmark("u", "tv", Some(Timestamp::from(4_i64))).unwrap();

    assert!(matches!(
        engine.add_cart_addition("u", "...not_valid...", &InteractionOptions::default()),
        Err(ApiError::BadRequest { .. })
    ));
}

#[test]
fn default_interactions_create_unknown_ids() {
    let engine = adapter();
    let defaults = InteractionOptions::default();

    engine.add_purchase("new-user", "new-item", &defaults).unwrap();
    engine.add_cart_addition("cart-user", "cart-item", &defaults).unwrap();
    engine.add_bookmark("bookmark-user", "bookmark-item", &defaults).unwrap();
    assert_eq!(engine.list_user_purchases("new-user").unwrap()[0].item_id, "new-item");
    assert_eq!(
        engine.list_users(&ListOptions::default()).unwrap().ids(),
        vec!["bookmark-user", "cart-user", "new-user"]
    );

    let no_cascade = InteractionOptions {
        cascade_create: Some(false),
        ..Default::default()
    };
    assert!(matches!(
        engine.add_purchase("stranger", "new-item", &no_cascade),
        Err(ApiError::NotFound { .. })
    ));
    assert!(matches!(
        engine.add_rating("stranger", "new-item", 0.5, &defaults),
        Err(ApiError::NotFound { .. })
    ));
}

#[test]
fn recommendations_rank_by_behavior() {
    let engine = adapter();
    let purchases = [
        ("alice", "phone"),
        ("alice", "case"),
        ("bob", "phone"),
        ("bob", "case"),
        ("carol", "tv"),
    ];
    let records: Vec<PurchaseRecord> = purchases
        .iter()
        .map(|(user, item)| PurchaseRecord::new(user, item, Some(Timestamp::from(1_i64))))
        .collect();
    let outcomes = engine.add_purchases(&records).unwrap();
    assert!(outcomes.iter().all(|o| o.is_success()));

    engine.add_user("dave").unwrap();
    let for_dave = engine
        .recommend_items_to_user("dave", 2, &RecommendationOptions::default())
        .unwrap();
    assert_eq!(for_dave.ids(), vec!["case", "phone"]);

    let similar = engine
        .recommend_items_to_item(
            "phone",
            1,
            &ItemRecommendationOptions {
                target_user_id: Some("carol".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(similar.ids(), vec!["case"]);

    assert!(matches!(
        engine.recommend_items_to_user("nobody", 2, &RecommendationOptions::default()),
        Err(ApiError::NotFound { .. })
    ));

    let removed = engine.delete_purchases(&records[..2]).unwrap();
    assert!(removed.iter().all(|o| o.is_success()));
    assert!(engine.list_user_purchases("alice").unwrap().is_empty());
}

#[test]
fn batch_reports_rejected_records() {
    let engine = adapter();
    let outcomes = engine
        .add_purchases(&[
            PurchaseRecord::new("u", "i", Some(Timestamp::from(1_i64))),
            PurchaseRecord::new("u", "i", Some(Timestamp::from(1_i64))),
            PurchaseRecord::new("u", "i", Some(Timestamp::from(-1_i64))),
        ])
        .unwrap();
    let codes: Vec<u16> = outcomes.iter().map(|o| o.code).collect();
    assert_eq!(codes, vec![200, 409, 400]);
}

#[test]
fn unreachable_engine_is_a_transport_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let engine = RecombeeAdapter::from_settings(&EngineSettings {
        base_url: format!("http://127.0.0.1:{port}"),
        database_id: "shop-db".to_string(),
        token: "secret".to_string(),
        timeout_ms: 500,
    });
    let err = engine.add_item("tv").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_) | ApiError::Timeout));
    assert_eq!(err.status(), None);
}
