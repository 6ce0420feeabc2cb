//! Integration tests for handshake, presence broadcast and disconnect.

mod helpers;

use serde_json::json;

use parley_core::config::PresenceMode;
use parley_core::types::id::UserId;
use parley_realtime::HandshakeError;

use helpers::TestEngine;

#[tokio::test]
async fn test_handshake_sends_snapshot_and_announces() {
    let app = TestEngine::new();

    let mut alice = app.connect("alice").await;
    let frames = alice.drain();
    let names: Vec<&str> = frames.iter().filter_map(|f| f["event"].as_str()).collect();
    assert_eq!(names, vec!["user_online", "setup_online_users"]);
    assert_eq!(frames[0]["data"]["_id"], "alice");
    assert_eq!(frames[1]["data"], json!([frames[0]["data"].clone()]));

    let mut bob = app.connect("bob").await;

    let seen_by_alice = alice.take("user_online");
    assert_eq!(seen_by_alice.len(), 1);
    assert_eq!(seen_by_alice[0]["username"], "Bob");
    assert!(alice.take("setup_online_users").is_empty());

    let frames = bob.drain();
    assert_eq!(frames.iter().filter(|f| f["event"] == "user_online").count(), 1);
    let snapshot: Vec<&serde_json::Value> = frames
        .iter()
        .filter(|f| f["event"] == "setup_online_users")
        .collect();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0]["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_missing_token_rejected_before_presence() {
    let app = TestEngine::new();

    let err = app.engine.authenticate(r#"{"room":"chat1"}"#).await.unwrap_err();

    assert!(matches!(err, HandshakeError::MissingToken));
    assert!(app.engine.presence().list_online().await.is_empty());
    assert_eq!(app.engine.connections.connection_count(), 0);
    assert_eq!(app.engine.connections.room_count(), 0);
    assert_eq!(app.engine.metrics.snapshot().handshakes_rejected, 1);
}

#[tokio::test]
async fn test_deleted_user_rejected() {
    let app = TestEngine::new();
    let handshake = app.handshake("carol");
    app.directory.remove(&UserId::new("carol"));

    let err = app.engine.authenticate(&handshake).await.unwrap_err();

    assert_eq!(err.to_string(), "User not found");
    assert!(!app.engine.presence().is_online(&UserId::new("carol")).await);
}

#[tokio::test]
async fn test_bad_signature_rejected() {
    let app = TestEngine::new();
    let err = app
        .engine
        .authenticate(r#"{"token":"eyJhbGciOiJIUzI1NiJ9.e30.c2lnbmF0dXJl"}"#)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Authentication failed");
}

#[tokio::test]
async fn test_disconnect_announces_once() {
    let app = TestEngine::new();
    let mut alice = app.connect("alice").await;
    let bob = app.connect("bob").await;
    alice.drain();

    app.engine.disconnect(&bob.handle.id).await;
    app.engine.disconnect(&bob.handle.id).await;

    let offline = alice.take("user_offline");
    assert_eq!(offline.len(), 1);
    assert_eq!(offline[0]["_id"], "bob");
    assert!(!app.engine.presence().is_online(&UserId::new("bob")).await);
    assert_eq!(app.engine.metrics.snapshot().connections_active, 1);
}

#[tokio::test]
async fn test_reconnect_tracks_newest_connection() {
    let app = TestEngine::new();
    let alice_id = UserId::new("alice");

    let first = app.connect("alice").await;
    app.engine.disconnect(&first.handle.id).await;
    let second = app.connect("alice").await;

    let presence = app.engine.presence();
    assert_eq!(
        presence.connection_id(&alice_id).await,
        Some(second.handle.id.to_string())
    );
    assert_eq!(presence.list_online().await, vec![alice_id]);
}

#[tokio::test]
async fn test_store_outage_degrades_to_empty_snapshot() {
    let app = TestEngine::new();
    app.store.set_available(false);

    let mut alice = app.connect("alice").await;

    let snapshot = alice.take("setup_online_users");
    assert_eq!(snapshot, vec![json!([])]);
    assert_eq!(app.engine.connections.connection_count(), 1);

    app.engine.disconnect(&alice.handle.id).await;
    assert_eq!(app.engine.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_multi_mode_keeps_user_online() {
    let app = TestEngine::with_mode(PresenceMode::Multi);
    let mut bob = app.connect("bob").await;
    let laptop = app.connect("alice").await;
    let phone = app.connect("alice").await;
    bob.drain();

    app.engine.disconnect(&laptop.handle.id).await;
    assert!(bob.take("user_offline").is_empty());
    assert!(app.engine.presence().is_online(&UserId::new("alice")).await);

    app.engine.disconnect(&phone.handle.id).await;
    assert_eq!(bob.take("user_offline").len(), 1);
    assert!(!app.engine.presence().is_online(&UserId::new("alice")).await);
}

#[tokio::test]
async fn test_shutdown_disconnects_everyone() {
    let app = TestEngine::new();
    let _alice = app.connect("alice").await;
    let _bob = app.connect("bob").await;
    let mut shutdown = app.engine.shutdown_receiver();

    app.engine.shutdown().await;

    assert!(shutdown.try_recv().is_ok());
    assert_eq!(app.engine.connections.connection_count(), 0);
    assert!(app.engine.presence().list_online().await.is_empty());
}
