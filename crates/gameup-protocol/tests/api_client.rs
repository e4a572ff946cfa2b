//! Integration tests for `ApiClient` against a scripted backend.
//!
//! Each test queues the backend's reply, makes one call, then checks both
//! sides: what the client put on the wire and what it made of the answer.

use gameup_protocol::{
    AddEntryRequest, ApiClient, ApiError, CatalogItemId, EntryId, GameStatus, LoginRequest,
    ProtocolError,
};
use gameup_transport::{Method, ScriptedBackend, TransportError};

fn client() -> ApiClient<ScriptedBackend> {
    ApiClient::new(ScriptedBackend::new())
}

fn body_json(body: &Option<Vec<u8>>) -> serde_json::Value {
    serde_json::from_slice(body.as_deref().expect("request should have a body"))
        .expect("body should be JSON")
}

// =========================================================================
// Accounts
// =========================================================================

#[tokio::test]
async fn test_login_posts_identifier_and_decodes_token() {
    let api = client();
    api.backend()
        .reply(200, r#"{"message":"Login successful","token":"jwt-1"}"#);

    let reply = api
        .login(&LoginRequest {
            identifier: "ana@example.com".into(),
            password: "Secret123".into(),
        })
        .await
        .expect("login should succeed");

    assert_eq!(reply.token, "jwt-1");
    let sent = &api.backend().requests()[0];
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.path, "/login");
    assert!(sent.bearer.is_none(), "login is unauthenticated");
    assert_eq!(
        body_json(&sent.body),
        serde_json::json!({ "identifier": "ana@example.com", "password": "Secret123" })
    );
}

#[tokio::test]
async fn test_login_bad_credentials_maps_to_unauthorized_with_message() {
    let api = client();
    api.backend().reply(401, r#"{"error":"Invalid credentials"}"#);

    let err = api
        .login(&LoginRequest {
            identifier: "ana".into(),
            password: "nope".into(),
        })
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_me_sends_bearer_token() {
    let api = client();
    api.backend().reply(200, r#"{"username":"ana"}"#);

    let me = api.me("jwt-1").await.unwrap();

    assert_eq!(me.username, "ana");
    let sent = &api.backend().requests()[0];
    assert_eq!(sent.path, "/api/me");
    assert_eq!(sent.bearer.as_deref(), Some("jwt-1"));
}

#[tokio::test]
async fn test_token_check_message_key_is_surfaced() {
    // The backend's token guard answers with `message`, not `error`.
    let api = client();
    api.backend().reply(401, r#"{"message":"Token is invalid!"}"#);

    let err = api.profile("stale").await.unwrap_err();

    assert_eq!(err.server_message(), Some("Token is invalid!"));
}

// =========================================================================
// Catalog
// =========================================================================

#[tokio::test]
async fn test_search_posts_search_text() {
    let api = client();
    api.backend()
        .reply(200, r#"[{"id":1,"name":"Hades"},{"id":2,"name":"Hades II"}]"#);

    let results = api.search("hades").await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].name, "Hades II");
    let sent = &api.backend().requests()[0];
    assert_eq!(sent.path, "/api/search");
    assert_eq!(body_json(&sent.body), serde_json::json!({ "searchText": "hades" }));
}

#[tokio::test]
async fn test_game_not_found_maps_to_not_found() {
    let api = client();
    api.backend().reply(404, r#"{"error":"Game not found"}"#);

    let err = api.game(CatalogItemId(999)).await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(Some(ref m)) if m == "Game not found"));
    assert_eq!(api.backend().requests()[0].path, "/api/game/999");
}

// =========================================================================
// Library
// =========================================================================

#[tokio::test]
async fn test_add_to_library_conflict_maps_to_conflict() {
    let api = client();
    api.backend()
        .reply(409, r#"{"error":"This game is already in your library"}"#);

    let err = api
        .add_to_library(
            "jwt-1",
            &AddEntryRequest {
                catalog_item_id: CatalogItemId(42),
                status: GameStatus::Playing,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Conflict(_)));
    let sent = &api.backend().requests()[0];
    assert_eq!(
        body_json(&sent.body),
        serde_json::json!({ "igdb_game_id": 42, "status": "Playing" })
    );
}

#[tokio::test]
async fn test_add_to_library_decodes_added_entry() {
    let api = client();
    api.backend().reply(
        201,
        r#"{"message":"Game added successfully","game":{"id":5,"igdb_game_id":42,"status":"Wishlist"}}"#,
    );

    let reply = api
        .add_to_library(
            "jwt-1",
            &AddEntryRequest {
                catalog_item_id: CatalogItemId(42),
                status: GameStatus::Wishlist,
            },
        )
        .await
        .unwrap();

    assert_eq!(reply.game.id, EntryId(5));
    assert_eq!(reply.game.catalog_item_id, CatalogItemId(42));
}

#[tokio::test]
async fn test_update_status_puts_status_and_ignores_reply_shape() {
    let api = client();
    api.backend()
        .reply(200, r#"{"message":"Game status updated successfully","status":"Completed"}"#);

    api.update_status("jwt-1", EntryId(5), GameStatus::Completed)
        .await
        .unwrap();

    let sent = &api.backend().requests()[0];
    assert_eq!(sent.method, Method::Put);
    assert_eq!(sent.path, "/api/library/5");
    assert_eq!(body_json(&sent.body), serde_json::json!({ "status": "Completed" }));
}

#[tokio::test]
async fn test_remove_accepts_empty_204() {
    let api = client();
    api.backend().reply(204, "");

    api.remove_from_library("jwt-1", EntryId(5)).await.unwrap();

    let sent = &api.backend().requests()[0];
    assert_eq!(sent.method, Method::Delete);
    assert_eq!(sent.path, "/api/library/5");
}

#[tokio::test]
async fn test_library_status_path_uses_catalog_id() {
    let api = client();
    api.backend().reply(200, r#"{"inLibrary":false}"#);

    let status = api.library_status("jwt-1", CatalogItemId(77)).await.unwrap();

    assert!(!status.in_library);
    assert_eq!(api.backend().requests()[0].path, "/api/library/status/77");
}

// =========================================================================
// Failure plumbing
// =========================================================================

#[tokio::test]
async fn test_error_without_json_body_has_no_message() {
    let api = client();
    api.backend().reply(502, "<html>Bad Gateway</html>");

    let err = api.library("jwt-1").await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 502, message: None }));
}

#[tokio::test]
async fn test_garbage_success_body_is_protocol_error() {
    let api = client();
    api.backend().reply(200, "not json");

    let err = api.library("jwt-1").await.unwrap_err();

    assert!(matches!(err, ApiError::Protocol(ProtocolError::Decode(_))));
}

#[tokio::test]
async fn test_transport_failure_is_passed_through() {
    let api = client();
    api.backend()
        .fail(TransportError::Connect("refused".into()));

    let err = api.recommendations("jwt-1").await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(TransportError::Connect(_))));
}
