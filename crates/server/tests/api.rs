use chrono::{Days, Utc};
use reqwest::{Client, StatusCode};
use sea_orm::Database;
use serde_json::{Value, json};

use engine::{Engine, NewUser, Role};
use migration::MigratorTrait;

struct TestServer {
    base: String,
    client: Client,
    agent: String,
    guest: String,
    other_guest: String,
    admin: String,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, token: Option<&str>, path: &str) -> (StatusCode, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }
}

async fn token(engine: &Engine, name: &str, role: Role) -> String {
    engine
        .create_user(
            NewUser {
                name: name.to_string(),
                email: format!("{name}@example.com"),
                phone: None,
                role,
            },
            Utc::now(),
        )
        .await
        .unwrap()
        .1
}

async fn start() -> TestServer {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    let agent = token(&engine, "agnes", Role::Agent).await;
    let guest = token(&engine, "gus", Role::User).await;
    let other_guest = token(&engine, "olga", Role::User).await;
    let admin = token(&engine, "ada", Role::Admin).await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, listener).unwrap();

    TestServer {
        base: format!("http://{addr}"),
        client: Client::new(),
        agent,
        guest,
        other_guest,
        admin,
    }
}

/// `YYYY-MM-DD` of today plus `days`.
fn in_days(days: u64) -> String {
    Utc::now()
        .date_naive()
        .checked_add_days(Days::new(days))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

async fn create_property(srv: &TestServer) -> String {
    let (status, body) = srv
        .post(
            &srv.agent,
            "/properties",
            json!({
                "title": "Harbour loft",
                "description": "Two rooms facing the harbour",
                "price": "120.00",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["price"], "120.00");
    body["id"].as_str().unwrap().to_string()
}

async fn create_booking(srv: &TestServer, token: &str, property_id: &str, from: u64, to: u64) -> Value {
    let (status, body) = srv
        .post(
            token,
            "/bookings",
            json!({
                "property_id": property_id,
                "check_in_date": in_days(from),
                "check_out_date": in_days(to),
                "total_price": 480.5,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn health_is_public() {
    let srv = start().await;
    let (status, body) = srv.get(None, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn bookings_require_a_valid_token() {
    let srv = start().await;

    let (status, body) = srv.get(None, "/bookings").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let (status, _) = srv.get(Some("not-a-token"), "/bookings").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn booking_lifecycle_over_http() {
    let srv = start().await;
    let property_id = create_property(&srv).await;

    let first = create_booking(&srv, &srv.guest, &property_id, 30, 34).await;
    assert_eq!(first["status"], "pending");
    assert_eq!(first["total_price"], "480.50");
    assert_eq!(first["check_in_date"], in_days(30));

    // Pending holds do not block each other.
    let second = create_booking(&srv, &srv.other_guest, &property_id, 32, 36).await;

    let first_id = first["id"].as_str().unwrap();
    let second_id = second["id"].as_str().unwrap();

    let (status, body) = srv
        .post(&srv.guest, &format!("/bookings/{first_id}/confirm"), json!({}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    assert_eq!(body["kind"], "forbidden");

    let (status, body) = srv
        .post(&srv.agent, &format!("/bookings/{first_id}/confirm"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "confirmed");

    let (status, body) = srv
        .post(&srv.agent, &format!("/bookings/{second_id}/confirm"), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["kind"], "conflict");

    let (status, body) = srv
        .post(
            &srv.guest,
            "/bookings",
            json!({
                "property_id": property_id,
                "check_in_date": in_days(33),
                "check_out_date": in_days(35),
                "total_price": "100",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = srv
        .post(&srv.guest, &format!("/bookings/{first_id}/cancel"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "cancelled");

    let (status, body) = srv
        .post(&srv.guest, &format!("/bookings/{first_id}/cancel"), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["kind"], "invalid_transition");

    let (status, body) = srv
        .post(&srv.agent, &format!("/bookings/{second_id}/confirm"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn booking_lists_are_caller_scoped() {
    let srv = start().await;
    let property_id = create_property(&srv).await;
    let mine = create_booking(&srv, &srv.guest, &property_id, 10, 12).await;
    create_booking(&srv, &srv.other_guest, &property_id, 10, 12).await;

    let (status, body) = srv.get(Some(&srv.guest), "/bookings").await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], mine["id"]);
    assert_eq!(list[0]["property_title"], "Harbour loft");

    let (_, body) = srv.get(Some(&srv.agent), "/bookings").await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let id = mine["id"].as_str().unwrap();
    let (status, _) = srv.get(Some(&srv.other_guest), &format!("/bookings/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = srv.get(Some(&srv.guest), &format!("/bookings/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["property_title"], "Harbour loft");
}

#[tokio::test]
async fn malformed_booking_requests_are_rejected() {
    let srv = start().await;
    let property_id = create_property(&srv).await;

    let cases = [
        json!({
            "property_id": property_id,
            "check_in_date": "tomorrow",
            "check_out_date": in_days(3),
            "total_price": 10,
        }),
        json!({
            "property_id": property_id,
            "check_in_date": in_days(5),
            "check_out_date": in_days(5),
            "total_price": 10,
        }),
        json!({
            "property_id": property_id,
            "check_in_date": "2000-01-01",
            "check_out_date": in_days(3),
            "total_price": 10,
        }),
        json!({
            "property_id": property_id,
            "check_in_date": in_days(1),
            "check_out_date": in_days(3),
            "total_price": 0,
        }),
        json!({
            "property_id": "not-a-uuid",
            "check_in_date": in_days(1),
            "check_out_date": in_days(3),
            "total_price": 10,
        }),
        json!({ "property_id": property_id }),
    ];
    for body in cases {
        let (status, res) = srv.post(&srv.guest, "/bookings", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} -> {res}");
        assert_eq!(res["kind"], "invalid_argument", "{body} -> {res}");
    }

    let (status, res) = srv
        .post(
            &srv.guest,
            "/bookings",
            json!({
                "property_id": "00000000-0000-4000-8000-000000000000",
                "check_in_date": in_days(1),
                "check_out_date": in_days(3),
                "total_price": 10,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{res}");

    let (status, res) = srv
        .post(
            &srv.agent,
            "/bookings/00000000-0000-4000-8000-000000000000/confirm",
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{res}");
    assert_eq!(res["kind"], "not_found");
}

#[tokio::test]
async fn deactivated_property_rejects_bookings() {
    let srv = start().await;
    let property_id = create_property(&srv).await;

    let (status, _) = srv
        .post(
            &srv.agent,
            &format!("/admin/properties/{property_id}/deactivate"),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url(&format!("/admin/properties/{property_id}/deactivate")))
        .bearer_auth(&srv.admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (status, body) = srv
        .post(
            &srv.guest,
            "/bookings",
            json!({
                "property_id": property_id,
                "check_in_date": in_days(1),
                "check_out_date": in_days(3),
                "total_price": 10,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["kind"], "invalid_state");

    let (_, body) = srv.get(None, "/properties").await;
    assert!(body.as_array().unwrap().is_empty());
    let (_, body) = srv.get(None, "/properties?include_inactive=true").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn property_catalogue_is_public() {
    let srv = start().await;
    let property_id = create_property(&srv).await;

    let (status, body) = srv.get(None, &format!("/properties/{property_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Harbour loft");

    let (status, body) = srv.get(None, "/properties?search=HARBOUR&max_price=150").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = srv.get(None, "/properties?min_price=200").await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = srv.get(None, "/agents").await;
    assert_eq!(status, StatusCode::OK);
    let agents = body.as_array().unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0]["email"], "agnes@example.com");
    assert!(agents[0].get("api_token").is_none());
}

#[tokio::test]
async fn guests_cannot_list_properties() {
    let srv = start().await;
    let (status, body) = srv
        .post(
            &srv.guest,
            "/properties",
            json!({
                "title": "My room",
                "description": "A room I would like to rent out",
                "price": 10,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
}

#[tokio::test]
async fn booked_property_cannot_be_deleted() {
    let srv = start().await;
    let property_id = create_property(&srv).await;
    create_booking(&srv, &srv.guest, &property_id, 3, 4).await;

    let res = srv
        .client
        .delete(srv.url(&format!("/properties/{property_id}")))
        .bearer_auth(&srv.agent)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "invalid_state");
}

#[tokio::test]
async fn overview_is_admin_only() {
    let srv = start().await;

    let (status, _) = srv.get(Some(&srv.agent), "/admin/overview").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv.get(Some(&srv.admin), "/admin/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], 4);
    assert_eq!(body["agents"], 1);
}

#[tokio::test]
async fn admin_listings_are_paginated() {
    let srv = start().await;
    let property_id = create_property(&srv).await;

    let (status, _) = srv.get(Some(&srv.agent), "/admin/users").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv.get(Some(&srv.admin), "/admin/users?page=1&limit=1").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total"], 2);
    assert_eq!(body["pages"], 2);
    assert_eq!(body["limit"], 1);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["role"], "user");

    let (status, body) = srv.get(Some(&srv.admin), "/admin/users").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!((body["page"].as_u64(), body["limit"].as_u64()), (Some(1), Some(10)));

    let (status, body) = srv.get(Some(&srv.admin), "/admin/users?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_argument");

    let (status, body) = srv.get(Some(&srv.admin), "/admin/properties").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total"], 1);
    assert_eq!(body["properties"][0]["id"], property_id);
    assert_eq!(body["properties"][0]["owner"]["email"], "agnes@example.com");
}

#[tokio::test]
async fn owners_cannot_use_admin_deactivation() {
    let srv = start().await;
    let property_id = create_property(&srv).await;

    let res = srv
        .client
        .post(srv.url(&format!("/admin/properties/{property_id}/deactivate")))
        .bearer_auth(&srv.agent)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let (status, body) = srv.get(None, &format!("/properties/{property_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], true);
}
