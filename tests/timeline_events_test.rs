mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use common::*;
use incubator_web_server::{
    models::timeline_event::TimelineEventType,
    store::{IncubatorStore, MemoryStore},
};
use serde_json::{Value, json};
use uuid::Uuid;

struct Startup {
    store: MemoryStore,
    id: Uuid,
}

async fn startup_with_founder(token: &str) -> Startup {
    let store = MemoryStore::new();
    let founder = insert_user(&store, token).await;
    let id = Uuid::new_v4();
    store.insert_startup(id, "Acme Labs", &[founder.id]).await;
    for (key, title) in [("team_formed", "Team Formed"), ("new_product_deck", "New Product Deck")] {
        store
            .insert_timeline_event_type(TimelineEventType {
                id: Uuid::new_v4(),
                key: key.to_string(),
                title: title.to_string(),
            })
            .await;
    }
    Startup { store, id }
}

fn timeline_app(store: &MemoryStore) -> Router {
    app(store.clone(), Arc::new(StubGateway::default()), test_config("", ""))
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn event_body() -> Value {
    json!({
        "timeline_event_type": "team_formed",
        "description": "Our founding team came together",
        "event_on": "2016-06-01",
        "links": [
            { "title": "Team photo", "url": "https://example.com/team.jpg", "private": false }
        ]
    })
}

async fn create(startup: &Startup, token: &str, body: Value) -> axum::http::Response<Body> {
    send(
        timeline_app(&startup.store),
        json_request(
            "POST",
            &format!("/startups/{}/timeline_events", startup.id),
            Some(token),
            body,
        ),
    )
    .await
}

#[tokio::test]
async fn test_requests_without_user_are_unauthenticated() {
    let startup = startup_with_founder("founder").await;

    let response = send(
        timeline_app(&startup.store),
        json_request(
            "POST",
            &format!("/startups/{}/timeline_events", startup.id),
            None,
            event_body(),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        timeline_app(&startup.store),
        get_as(&format!("/startups/{}/timeline_events", startup.id), "not-a-token"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "unauthenticated");
}

#[tokio::test]
async fn test_founder_creates_pending_event() {
    let startup = startup_with_founder("founder").await;

    let response = create(&startup, "founder", event_body()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Pending verification");
    assert_eq!(body["event_type"], "Team Formed");
    assert_eq!(body["event_on"], "2016-06-01");
    assert_eq!(body["links"][0]["title"], "Team photo");
    assert!(body["verified_at"].is_null());

    let response = send(
        timeline_app(&startup.store),
        get_as(&format!("/startups/{}/timeline_events", startup.id), "founder"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["id"], body["id"]);
}

#[tokio::test]
async fn test_invalid_event_reports_each_field() {
    let startup = startup_with_founder("founder").await;
    let links: Vec<Value> = (0..4)
        .map(|i| json!({ "title": format!("Link {i}"), "url": "https://example.com" }))
        .collect();

    let response = create(
        &startup,
        "founder",
        json!({
            "timeline_event_type": "team_formed",
            "description": "x".repeat(301),
            "links": links
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "validation_failed");
    let fields = &body["error"]["fields"];
    assert_eq!(
        fields["description"][0],
        "is too long (maximum is 300 characters)"
    );
    assert_eq!(fields["event_on"][0], "can't be blank");
    assert_eq!(fields["links"][0], "cannot have more than 3 links");
}

#[tokio::test]
async fn test_description_of_exactly_300_characters_is_accepted() {
    let startup = startup_with_founder("founder").await;
    let mut body = event_body();
    body["description"] = json!("é".repeat(300));

    let response = create(&startup, "founder", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_link_without_scheme_is_rejected() {
    let startup = startup_with_founder("founder").await;
    let mut body = event_body();
    body["links"] = json!([{ "title": "Deck", "url": "example.com/deck" }]);

    let response = create(&startup, "founder", body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["fields"]["links[0].url"][0], "is not a valid URL");
}

#[tokio::test]
async fn test_non_founder_is_forbidden() {
    let startup = startup_with_founder("founder").await;
    insert_user(&startup.store, "outsider").await;

    let response = create(&startup, "outsider", event_body()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        timeline_app(&startup.store),
        get_as(&format!("/startups/{}/timeline_events", startup.id), "outsider"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_startup_is_not_found() {
    let startup = startup_with_founder("founder").await;

    let response = send(
        timeline_app(&startup.store),
        get_as(
            &format!("/startups/{}/timeline_events", Uuid::new_v4()),
            "founder",
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_editing_verified_event_returns_it_to_review() {
    let startup = startup_with_founder("founder").await;
    let created = body_json(create(&startup, "founder", event_body()).await).await;
    let event_id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    let mut event = startup.store.timeline_event(event_id).await.unwrap().unwrap();
    event.verified_at = Some(Utc::now());
    startup.store.insert_timeline_event(event).await;

    let response = send(
        timeline_app(&startup.store),
        json_request(
            "PATCH",
            &format!("/timeline_events/{}", event_id),
            Some("founder"),
            json!({ "timeline_event_type": "new_product_deck" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Pending verification");
    assert_eq!(body["event_type"], "New Product Deck");
    assert_eq!(body["description"], "Our founding team came together");

    let stored = startup.store.timeline_event(event_id).await.unwrap().unwrap();
    assert!(stored.verified_at.is_none());
}

#[tokio::test]
async fn test_editing_unknown_event_is_not_found() {
    let startup = startup_with_founder("founder").await;

    let response = send(
        timeline_app(&startup.store),
        json_request(
            "PATCH",
            &format!("/timeline_events/{}", Uuid::new_v4()),
            Some("founder"),
            json!({ "description": "Anything" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
