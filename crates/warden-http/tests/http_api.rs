//! End-to-end tests against a bound listener.

use serde_json::{json, Value};
use std::net::SocketAddr;
use warden_database::AsyncDatabase;
use warden_http::{build_router, AppState};

const ADMIN_TOKEN: &str = "test-secret";

struct TestApp {
    addr: SocketAddr,
    client: reqwest::Client,
    // Holds the database file alive for the duration of the test.
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn spawn() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = AsyncDatabase::open(&dir.path().join("relay.db")).await.unwrap();
        let state = AppState::new(db, ADMIN_TOKEN);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });

        Self {
            addr,
            client: reqwest::Client::new(),
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn post_admin(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("X-Admin-Token", ADMIN_TOKEN)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = TestApp::spawn().await;

    let body = app.get_json("/healthz").await;
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn command_roundtrip_enqueue_poll_ack() {
    let app = TestApp::spawn().await;

    let ban: Value = app
        .post_admin("/command/ban", json!({"player": "alice"}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(ban["ok"], true);
    let ban_id = ban["id"].as_i64().unwrap();

    let kick: Value = app
        .post_admin("/command/kick", json!({"player": "bob"}))
        .await
        .json()
        .await
        .unwrap();
    let kick_id = kick["id"].as_i64().unwrap();
    assert!(kick_id > ban_id);

    // Both commands are live, in enqueue order.
    let polled = app.get_json("/commands/poll?limit=10").await;
    let results = polled["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"].as_i64().unwrap(), ban_id);
    assert_eq!(results[0]["kind"], "ban");
    assert_eq!(results[0]["payload"]["player"], "alice");
    assert_eq!(results[1]["id"].as_i64().unwrap(), kick_id);
    assert_eq!(results[1]["kind"], "kick");

    // A poll retires nothing.
    let again = app.get_json("/commands/poll?limit=10").await;
    assert_eq!(again["results"].as_array().unwrap().len(), 2);

    // Acknowledge the first; only the second remains.
    let acked: Value = app
        .post("/commands/ack", json!({"ids": [ban_id]}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(acked["ok"], true);

    let after = app.get_json("/commands/poll?limit=10").await;
    let results = after["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"].as_i64().unwrap(), kick_id);
}

#[tokio::test]
async fn ack_of_unknown_id_succeeds_without_change() {
    let app = TestApp::spawn().await;

    let response = app.post("/commands/ack", json!({"ids": [999]})).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["removed"], 0);
}

#[tokio::test]
async fn restore_command_carries_amount() {
    let app = TestApp::spawn().await;

    app.post_admin("/command/restore", json!({"player": "alice", "amount": 4}))
        .await;

    let polled = app.get_json("/commands/poll").await;
    let results = polled["results"].as_array().unwrap();
    assert_eq!(results[0]["kind"], "restore");
    assert_eq!(results[0]["payload"]["amount"], 4);
}

#[tokio::test]
async fn admin_routes_reject_bad_token() {
    let app = TestApp::spawn().await;

    // Missing header.
    let response = app.post("/command/ban", json!({"player": "alice"})).await;
    assert_eq!(response.status(), 401);

    // Wrong token.
    let response = app
        .client
        .post(app.url("/command/ban"))
        .header("X-Admin-Token", "wrong")
        .json(&json!({"player": "alice"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);

    // Nothing was enqueued.
    let polled = app.get_json("/commands/poll").await;
    assert!(polled["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn death_resubmission_replaces_record() {
    let app = TestApp::spawn().await;

    app.post("/death", json!({"instance_id": "e1", "victim": "bob", "cause": "fall"}))
        .await;
    app.post("/death", json!({"instance_id": "e1", "victim": "bob", "cause": "fire"}))
        .await;

    let single = app.get_json("/deaths/instance/e1").await;
    assert_eq!(single["ok"], true);
    assert_eq!(single["result"]["cause"], "fire");

    let all = app.get_json("/deaths").await;
    assert_eq!(all["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn death_with_position_roundtrips() {
    let app = TestApp::spawn().await;

    app.post(
        "/death",
        json!({
            "instance_id": "e2",
            "attacker": "alice",
            "victim": "bob",
            "cause": "arrow",
            "position": {"x": 1.5, "y": 64.0, "z": -7.0}
        }),
    )
    .await;

    let single = app.get_json("/deaths/instance/e2").await;
    assert_eq!(single["result"]["attacker"], "alice");
    assert_eq!(single["result"]["position"]["y"], 64.0);
}

#[tokio::test]
async fn death_validation_rejected_before_store() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/death", json!({"instance_id": "e1", "victim": "", "cause": "fall"}))
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);

    let all = app.get_json("/deaths").await;
    assert!(all["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_death_instance_is_404() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/deaths/instance/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn deaths_by_player_filters_both_sides() {
    let app = TestApp::spawn().await;

    app.post(
        "/death",
        json!({"instance_id": "e1", "attacker": "carol", "victim": "x", "cause": "sword"}),
    )
    .await;
    app.post("/death", json!({"instance_id": "e2", "victim": "carol", "cause": "fall"}))
        .await;
    app.post("/death", json!({"instance_id": "e3", "victim": "other", "cause": "fall"}))
        .await;

    let deaths = app.get_json("/deaths/player/carol").await;
    let results = deaths["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    // Newest first.
    assert_eq!(results[0]["instance_id"], "e2");
    assert_eq!(results[1]["instance_id"], "e1");
}

#[tokio::test]
async fn player_state_upsert_overwrites_and_defaults() {
    let app = TestApp::spawn().await;

    // Unknown player reads as the zero-value default.
    let empty = app.get_json("/player/state?player=carol").await;
    assert_eq!(empty["result"]["strikes"], 0);
    assert_eq!(empty["result"]["banned"], false);
    assert_eq!(empty["result"]["vestige"], 0);

    app.post(
        "/player/state",
        json!({"player": "carol", "strikes": 2, "banned": false, "vestige": 0}),
    )
    .await;
    app.post(
        "/player/state",
        json!({"player": "carol", "strikes": 3, "banned": true, "vestige": 5}),
    )
    .await;

    let state = app.get_json("/player/state?player=carol").await;
    assert_eq!(state["result"]["strikes"], 3);
    assert_eq!(state["result"]["banned"], true);
    assert_eq!(state["result"]["vestige"], 5);
}

#[tokio::test]
async fn player_state_accepts_integer_banned() {
    let app = TestApp::spawn().await;

    app.post("/player/state", json!({"player": "dave", "banned": 1}))
        .await;

    let state = app.get_json("/player/state?player=dave").await;
    assert_eq!(state["result"]["banned"], true);
}

#[tokio::test]
async fn mod_actions_are_gated_and_listed() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/mod/action", json!({"action": "ban", "player": "bob"}))
        .await;
    assert_eq!(response.status(), 401);

    app.post_admin(
        "/mod/action",
        json!({"action": "ban", "player": "bob", "reason": "griefing"}),
    )
    .await;

    let response = app
        .client
        .get(app.url("/mod/actions"))
        .header("X-Admin-Token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["action"], "ban");
    assert_eq!(results[0]["reason"], "griefing");
}

#[tokio::test]
async fn poll_respects_default_and_explicit_limit() {
    let app = TestApp::spawn().await;

    for i in 0..30 {
        app.post_admin("/command/strike", json!({"player": format!("p{i}")}))
            .await;
    }

    // Default page size is 25.
    let default_page = app.get_json("/commands/poll").await;
    assert_eq!(default_page["results"].as_array().unwrap().len(), 25);

    let small_page = app.get_json("/commands/poll?limit=5").await;
    let results = small_page["results"].as_array().unwrap();
    assert_eq!(results.len(), 5);
    // The page is the head of the backlog, ascending.
    let ids: Vec<i64> = results.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}
