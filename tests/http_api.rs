use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use satchel::config::Config;
use satchel::models::catalog::{ItemDefinition, NewDefinition};
use satchel::models::lobby::{Lobby, LobbyRole};
use satchel::models::types::{AccountId, LobbyId};
use satchel::net::http::{ACTOR_HEADER, router};
use satchel::{MemoryBackend, Registry};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    registry: Arc<Registry>,
    lobby: LobbyId,
    master: AccountId,
    player: AccountId,
}

impl Harness {
    fn new() -> Self {
        let backend = MemoryBackend::new();
        let registry = Arc::new(Registry::memory(&backend, Arc::new(Config::default())));

        let lobby = LobbyId::new();
        let master = AccountId::new();
        let player = AccountId::new();
        backend.lobbies.insert_lobby(Lobby {
            id: lobby,
            name: "Harbor Town".into(),
            admin_id: master,
        });
        backend.lobbies.add_member(lobby, player, LobbyRole::Player);

        Self {
            registry,
            lobby,
            master,
            player,
        }
    }

    async fn define(&self, name: &str, type_name: &str) -> ItemDefinition {
        self.registry
            .services
            .catalog
            .create_definition(NewDefinition {
                name: name.into(),
                type_name: type_name.into(),
                width: 1,
                height: 2,
                weight: 0.25,
                ..NewDefinition::default()
            })
            .await
            .unwrap()
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router(self.registry.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn post(&self, actor: AccountId, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::post(uri)
            .header(ACTOR_HEADER, actor.to_string())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    async fn get(&self, actor: AccountId, uri: &str) -> (StatusCode, Value) {
        let req = Request::get(uri)
            .header(ACTOR_HEADER, actor.to_string())
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    async fn issue(&self, def: &ItemDefinition, amount: &str) -> Value {
        let (status, body) = self
            .post(
                self.master,
                "/api/master/issue_by_id",
                json!({
                    "lobby_id": self.lobby,
                    "template_id": def.id,
                    "target_user_id": self.player,
                    "amount": amount,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }
}

#[tokio::test]
async fn health_needs_no_actor() {
    let h = Harness::new();
    let (status, body) = h.send(Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn missing_actor_is_rejected() {
    let h = Harness::new();
    let (status, body) = h
        .send(Request::get("/api/catalog").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn issued_items_show_up_in_the_lobby_snapshot() {
    let h = Harness::new();
    let def = h.define("Salted fish", "food").await;

    let body = h.issue(&def, "3").await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["instance"]["amount"], 3);
    assert_eq!(body["instance"]["container_id"], "inv_main");

    let uri = format!("/api/lobby/{}/inventory/{}", h.lobby, h.player);
    let (status, snap) = h.get(h.player, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snap["items"].as_array().unwrap().len(), 1);
    assert_eq!(snap["items"][0]["type"], "food");
    assert_eq!(snap["weight"]["current"], 0.75);
    assert_eq!(snap["permissions"]["can_edit"], true);
    assert!(
        snap["containers"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["id"] == "slot_weapon_main")
    );

    // Players cannot hand out items
    let (status, body) = h
        .post(
            h.player,
            "/api/master/issue_by_id",
            json!({
                "lobby_id": h.lobby,
                "template_id": def.id,
                "target_user_id": h.player,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn stale_move_returns_conflict() {
    let h = Harness::new();
    let def = h.define("Rope", "material").await;
    let issued = h.issue(&def, "1").await;
    let item_id = issued["instance"]["id"].clone();

    let request = json!({
        "item_id": item_id,
        "version": 1,
        "container_id": "hands",
        "pos_x": "2",
        "pos_y": 1,
        "rotated": 0,
    });

    let (status, body) = h.post(h.player, "/api/inventory/move", request.clone()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["instance"]["version"], 2);
    assert_eq!(body["instance"]["pos_x"], 2);

    let (status, body) = h.post(h.player, "/api/inventory/move", request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let h = Harness::new();

    let (status, body) = h
        .post(h.player, "/api/inventory/rotate", json!({ "version": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = h.get(h.player, "/api/inventory/not-a-user").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn master_replaces_definition_image() {
    let h = Harness::new();
    let def = h.define("Sea chart", "map").await;

    let uri = format!("/api/master/item_template/{}/image?lobby_id={}", def.id, h.lobby);
    let req = Request::post(&uri)
        .header(ACTOR_HEADER, h.master.to_string())
        .header(header::CONTENT_TYPE, "image/png")
        .body(Body::from(vec![0x89, b'P', b'N', b'G']))
        .unwrap();
    let (status, body) = h.send(req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["definition"]["image_path"], format!("/media/items/{}.png", def.id));

    let req = Request::post(&uri)
        .header(ACTOR_HEADER, h.master.to_string())
        .header(header::CONTENT_TYPE, "application/pdf")
        .body(Body::from("%PDF"))
        .unwrap();
    let (status, _) = h.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
