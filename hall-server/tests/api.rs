//! HTTP surface: routing, identity headers, error envelope

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use hall_server::api::{COMMAND_ID_HEADER, build_app};
use hall_server::auth::{PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER};
use hall_server::realtime::hub::HubMessage;
use hall_server::{Config, GameManager, ServerState};
use http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use shared::error::ErrorCode;
use shared::realtime::CatalogKind;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    state: ServerState,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let manager = GameManager::new(dir.path().join("hall.redb"), chrono_tz::UTC).unwrap();
    let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    config.trust_identity_headers = true;
    let state = ServerState::new(config, Arc::new(manager));
    TestApp {
        app: build_app(&state),
        state,
        _dir: dir,
    }
}

struct Call<'a> {
    method: Method,
    uri: &'a str,
    principal: Option<(&'a str, &'a str)>,
    command_id: Option<&'a str>,
    body: Option<Value>,
}

impl<'a> Call<'a> {
    fn get(uri: &'a str) -> Self {
        Self {
            method: Method::GET,
            uri,
            principal: None,
            command_id: None,
            body: None,
        }
    }

    fn post(uri: &'a str) -> Self {
        Self {
            method: Method::POST,
            ..Self::get(uri)
        }
    }

    fn as_cashier(mut self, id: &'a str) -> Self {
        self.principal = Some((id, "cashier"));
        self
    }

    fn as_admin(mut self) -> Self {
        self.principal = Some(("root", "admin"));
        self
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn command_id(mut self, id: &'a str) -> Self {
        self.command_id = Some(id);
        self
    }
}

async fn send(app: &TestApp, call: Call<'_>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(call.method).uri(call.uri);
    if let Some((id, role)) = call.principal {
        builder = builder
            .header(PRINCIPAL_ID_HEADER, id)
            .header(PRINCIPAL_ROLE_HEADER, role);
    }
    if let Some(command_id) = call.command_id {
        builder = builder.header(COMMAND_ID_HEADER, command_id);
    }
    let request = match call.body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &TestApp, id: &str) -> Value {
    let (status, body) = send(
        app,
        Call::post("/api/cashiers")
            .as_admin()
            .json(json!({ "id": id, "name": "Front desk", "shop_margin_percent": null, "system_fee_percent": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();
    let (status, body) = send(&app, Call::get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Call::get("/health/detailed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["storage"]["status"], "ok");
    assert_eq!(body["live_games"], 0);
}

#[tokio::test]
async fn test_roles_are_enforced() {
    let app = test_app();

    let (status, body) = send(&app, Call::get("/api/games/current")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::NotAuthenticated.code());

    let (status, body) = send(
        &app,
        Call::post("/api/cashiers")
            .as_cashier("desk-1")
            .json(json!({ "id": "desk-2", "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::AdminRequired.code());

    let (status, _) = send(&app, Call::get("/api/games/current").as_admin()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_game_commands_over_http() {
    let app = test_app();
    register(&app, "desk-1").await;

    let (status, body) = send(
        &app,
        Call::post("/api/cartelas").as_cashier("desk-1").json(json!({
            "cartela_id": 1,
            "pattern": [
                [5, 16, 31, 46, 61],
                [1, 20, 32, 47, 62],
                [2, 17, 0, 48, 63],
                [3, 18, 33, 50, 64],
                [4, 19, 34, 49, 65]
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send(&app, Call::post("/api/games/start").as_cashier("desk-1")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["game_id"], "4000");

    let (status, body) = send(
        &app,
        Call::post("/api/bets")
            .as_cashier("desk-1")
            .json(json!({ "cartela_id": 1, "stake": 20.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["outcome"]["data"]["ticket_number"], "0000000000001");

    // 同一张卡片重复下注
    let (status, body) = send(
        &app,
        Call::post("/api/bets")
            .as_cashier("desk-1")
            .json(json!({ "cartela_id": 1, "stake": 20.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::DuplicateCartela.code());
    assert_eq!(body["kind"], "state_conflict");

    let (status, body) = send(
        &app,
        Call::post("/api/games/draw")
            .as_cashier("desk-1")
            .json(json!({ "number": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], ErrorCode::InvalidTransition.code());

    send(&app, Call::post("/api/games/activate").as_cashier("desk-1")).await;
    let (status, body) = send(
        &app,
        Call::post("/api/games/draw")
            .as_cashier("desk-1")
            .json(json!({ "number": 76 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["code"], ErrorCode::InvalidDrawNumber.code());

    let (status, body) = send(&app, Call::get("/api/bets/placed-cartelas").as_cashier("desk-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([1]));

    let (_, body) = send(&app, Call::get("/api/games/current").as_cashier("desk-1")).await;
    assert_eq!(body["status"], "active");
    assert_eq!(body["financials"]["total_stake"], 20.0);
}

#[tokio::test]
async fn test_command_id_header_deduplicates() {
    let app = test_app();
    register(&app, "desk-1").await;

    let call = || {
        Call::post("/api/games/start")
            .as_cashier("desk-1")
            .command_id("start-1")
    };
    let (status, first) = send(&app, call()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(first.get("duplicate").is_none());

    let (status, second) = send(&app, call()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["duplicate"], true);
}

#[tokio::test]
async fn test_display_endpoints_need_token() {
    let app = test_app();
    let cashier = register(&app, "desk-1").await;
    let session = cashier["session_id"].as_str().unwrap().to_string();
    let token = cashier["display_token"].as_str().unwrap().to_string();
    send(&app, Call::post("/api/games/start").as_cashier("desk-1")).await;

    let bad = format!("/api/display/{}/snapshot?token=wrong", session);
    let (status, body) = send(&app, Call::get(&bad)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::SessionKeyInvalid.code());

    let good = format!("/api/display/{}/snapshot?token={}", session, token);
    let (status, body) = send(&app, Call::get(&good)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["game"]["game_id"], "4000");
    assert_eq!(body["cashier_id"], "desk-1");

    let placed = format!("/api/display/{}/placed-cartelas?token={}", session, token);
    let (status, body) = send(&app, Call::get(&placed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_regenerate_retires_display_credentials() {
    let app = test_app();
    let cashier = register(&app, "desk-1").await;
    let old_session = cashier["session_id"].as_str().unwrap().to_string();
    let old_token = cashier["display_token"].as_str().unwrap().to_string();

    let (status, fresh) = send(
        &app,
        Call::post("/api/cashiers/me/regenerate-session").as_cashier("desk-1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(fresh["session_id"], old_session.as_str());

    let uri = format!("/api/display/{}/cartelas?token={}", old_session, old_token);
    let (status, _) = send(&app, Call::get(&uri)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_config_update_is_admin_only() {
    let app = test_app();
    let (status, _) = send(
        &app,
        Call {
            method: Method::PUT,
            ..Call::get("/api/config")
                .as_cashier("desk-1")
                .json(json!({ "min_stake": 15.0 }))
        },
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Call {
            method: Method::PUT,
            ..Call::get("/api/config").as_admin().json(json!({ "min_stake": 15.0 }))
        },
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["min_stake"], 15.0);

    let (_, body) = send(&app, Call::get("/api/config").as_cashier("desk-1")).await;
    assert_eq!(body["min_stake"], 15.0);
}

#[tokio::test]
async fn test_catalog_edits_reach_session_screens() {
    let app = test_app();
    let cashier = register(&app, "desk-1").await;
    let session = cashier["session_id"].as_str().unwrap().to_string();
    let mut rx = app.state.hub.subscribe(&session);

    let (status, body) = send(
        &app,
        Call::post("/api/cartelas").as_cashier("desk-1").json(json!({
            "cartela_id": 7,
            "pattern": [
                [5, 16, 31, 46, 61],
                [1, 20, 32, 47, 62],
                [2, 17, 0, 48, 63],
                [3, 18, 33, 50, 64],
                [4, 19, 34, 49, 65]
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(matches!(
        rx.try_recv(),
        Ok(HubMessage::CatalogChanged(CatalogKind::Cartelas))
    ));

    let (status, _) = send(&app, Call::post("/api/cartelas/7/toggle").as_cashier("desk-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(matches!(
        rx.try_recv(),
        Ok(HubMessage::CatalogChanged(CatalogKind::Cartelas))
    ));

    // 失败的写入不广播
    let (status, _) = send(&app, Call::post("/api/cartelas/99/toggle").as_cashier("desk-1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(rx.try_recv().is_err());
}
