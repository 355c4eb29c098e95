//! Multiplexer behavior against an in-process WebSocket server.

mod common;

use common::{start_silent_server, start_stalled_listener, FakeServer, TEST_TIMEOUT};
use serde_json::{json, Value as JsonValue};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use strata_link::{
    BackpressurePolicy, ChangeKind, ChangeNotification, ChannelSink, ConnectionManager,
    ConnectionOptions, ConnectionState, EventHandlers, StrataLinkError, StrataLinkTimeouts,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

fn test_timeouts() -> StrataLinkTimeouts {
    StrataLinkTimeouts::builder()
        .connection_timeout(Duration::from_secs(2))
        .close_timeout(Duration::from_millis(200))
        .build()
}

async fn connected(server: &FakeServer, options: ConnectionOptions) -> ConnectionManager {
    let manager = ConnectionManager::new(options, test_timeouts(), EventHandlers::new());
    manager.connect(&server.url(), Duration::from_secs(2)).await.unwrap();
    manager
}

fn channel_sink() -> (Arc<ChannelSink>, mpsc::Receiver<ChangeNotification<JsonValue>>) {
    let (tx, rx) = mpsc::channel(16);
    (Arc::new(ChannelSink::new(tx)), rx)
}

async fn recv_notification(
    rx: &mut mpsc::Receiver<ChangeNotification<JsonValue>>,
) -> ChangeNotification<JsonValue> {
    timeout(TEST_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("sink closed")
}

#[tokio::test]
async fn test_version_call_resolves_with_server_result() {
    let mut server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;

    let handle = manager.send("version", vec![]).await.unwrap();
    assert_eq!(handle.id(), 1);

    let request = server.next_request().await;
    assert_eq!(request, json!({ "id": 1, "method": "version", "params": [] }));
    server.reply(json!({ "id": 1, "result": "1.0" }));

    assert_eq!(timeout(TEST_TIMEOUT, handle).await.unwrap(), Ok(json!("1.0")));
    assert_eq!(manager.pending_calls(), 0);
}

#[tokio::test]
async fn test_request_round_trips_method_and_params() {
    let mut server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;

    let params = vec![json!("person:ada"), json!({ "name": "Ada", "tags": ["math", 1815] })];
    let _handle = manager.send("create", params.clone()).await.unwrap();

    let request = server.next_request().await;
    assert_eq!(request["method"], "create");
    assert_eq!(request["params"], JsonValue::Array(params));
}

#[tokio::test]
async fn test_out_of_order_responses_reach_their_own_callers() {
    let mut server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;

    let first = manager.send("select", vec![json!("a")]).await.unwrap();
    let second = manager.send("select", vec![json!("b")]).await.unwrap();
    assert_eq!((first.id(), second.id()), (1, 2));

    server.next_request().await;
    server.next_request().await;
    server.reply(json!({ "id": 2, "result": "second" }));
    server.reply(json!({ "id": 1, "result": "first" }));

    let (a, b) = timeout(TEST_TIMEOUT, async { tokio::join!(first, second) })
        .await
        .unwrap();
    assert_eq!(a, Ok(json!("first")));
    assert_eq!(b, Ok(json!("second")));
}

#[tokio::test]
async fn test_rpc_error_fails_only_that_call() {
    let mut server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;

    let failing = manager.send("query", vec![json!("BAD")]).await.unwrap();
    let healthy = manager.send("ping", vec![]).await.unwrap();
    server.next_request().await;
    server.next_request().await;
    server.reply(json!({ "id": 1, "error": { "code": -32000, "message": "parse error" } }));
    server.reply(json!({ "id": 2, "result": null }));

    assert_eq!(
        timeout(TEST_TIMEOUT, failing).await.unwrap(),
        Err(StrataLinkError::Rpc {
            code: Some(-32000),
            message: "parse error".to_string()
        })
    );
    assert_eq!(timeout(TEST_TIMEOUT, healthy).await.unwrap(), Ok(JsonValue::Null));
    assert_eq!(manager.state(), ConnectionState::Open);
}

#[tokio::test]
async fn test_disconnect_fails_every_pending_call_once() {
    let mut server = FakeServer::start().await;
    let disconnects = Arc::new(Mutex::new(0));
    let disconnects_clone = disconnects.clone();
    let manager = ConnectionManager::new(
        ConnectionOptions::default(),
        test_timeouts(),
        EventHandlers::new().on_disconnect(move |_| *disconnects_clone.lock().unwrap() += 1),
    );
    manager.connect(&server.url(), Duration::from_secs(2)).await.unwrap();

    let mut handles = Vec::new();
    for table in ["a", "b", "c"] {
        handles.push(manager.send("select", vec![json!(table)]).await.unwrap());
    }
    for _ in 0..3 {
        server.next_request().await;
    }
    assert_eq!(manager.pending_calls(), 3);

    manager.disconnect().await;
    manager.disconnect().await;

    for handle in handles {
        assert_eq!(
            timeout(TEST_TIMEOUT, handle).await.unwrap(),
            Err(StrataLinkError::ConnectionClosed)
        );
    }
    assert_eq!(manager.pending_calls(), 0);
    assert_eq!(manager.state(), ConnectionState::Closed);
    assert_eq!(*disconnects.lock().unwrap(), 1);
    assert_eq!(
        manager.send("ping", vec![]).await.unwrap_err(),
        StrataLinkError::ConnectionClosed
    );
}

#[tokio::test]
async fn test_full_mode_null_push_is_remove_notification() {
    let server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;
    let (sink, mut rx) = channel_sink();
    manager.subscribe("sub-1", sink, false);

    server.reply(json!({ "result": { "id": "sub-1", "result": null } }));

    let notification = recv_notification(&mut rx).await;
    assert_eq!(notification, ChangeNotification::new(ChangeKind::Remove, None, None));
    let info = manager.subscriptions();
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].frames_routed, 1);
}

#[tokio::test]
async fn test_push_for_unknown_subscription_is_ignored() {
    let mut server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;
    let (sink, mut rx) = channel_sink();
    manager.subscribe("sub-1", sink, false);

    let call = manager.send("ping", vec![]).await.unwrap();
    server.next_request().await;
    server.reply(json!({
        "result": { "id": "sub-404", "action": "CREATE", "result": { "x": 1 } }
    }));
    server.reply(json!({ "id": 1, "result": "pong" }));

    assert_eq!(timeout(TEST_TIMEOUT, call).await.unwrap(), Ok(json!("pong")));
    assert!(rx.try_recv().is_err());
    assert_eq!(manager.state(), ConnectionState::Open);
}

#[tokio::test]
async fn test_garbage_frames_do_not_stop_the_receive_loop() {
    let mut server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;

    let call = manager.send("version", vec![]).await.unwrap();
    server.next_request().await;
    server.send(tokio_tungstenite::tungstenite::Message::Text("not json".to_string().into()));
    server.reply(json!({ "no": "id" }));
    server.reply(json!({ "id": 1, "result": "1.0" }));

    assert_eq!(timeout(TEST_TIMEOUT, call).await.unwrap(), Ok(json!("1.0")));
}

#[tokio::test]
async fn test_patch_push_fans_out_in_array_order() {
    let server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;
    let (sink, mut rx) = channel_sink();
    manager.subscribe("sub-d", sink, true);

    server.reply(json!({
        "result": {
            "id": "sub-d",
            "action": "UPDATE",
            "result": [
                { "op": "add", "path": "/tags/0", "value": "new" },
                { "op": "replace", "path": "/name", "value": "Grace" },
                { "op": "remove", "path": "/age" }
            ]
        }
    }));

    let mut seen = Vec::new();
    for _ in 0..3 {
        let n = recv_notification(&mut rx).await;
        seen.push((n.kind, n.path, n.value));
    }
    assert_eq!(
        seen,
        vec![
            (ChangeKind::Add, Some("/tags/0".to_string()), Some(json!("new"))),
            (ChangeKind::Replace, Some("/name".to_string()), Some(json!("Grace"))),
            (ChangeKind::Remove, Some("/age".to_string()), None),
        ]
    );
}

#[tokio::test]
async fn test_connect_timeout_leaves_manager_closed() {
    let addr = start_stalled_listener().await;
    let manager =
        ConnectionManager::new(ConnectionOptions::default(), test_timeouts(), EventHandlers::new());

    let started = Instant::now();
    let err = manager
        .connect(&format!("ws://{}/rpc", addr), Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(2));
    match err {
        StrataLinkError::Connection { address, cause } => {
            assert!(address.contains(&addr.port().to_string()));
            assert!(cause.contains("timed out"), "unexpected cause: {}", cause);
        },
        other => panic!("expected a connection error, got {:?}", other),
    }
    assert_eq!(manager.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_fail_fast_backpressure_rejects_when_queue_is_full() {
    let server = FakeServer::start().await;
    let options = ConnectionOptions::default().with_outbound_queue_capacity(1);
    let manager = connected(&server, options).await;

    // Single-threaded runtime: the send task cannot drain between these.
    let _first = manager.send("ping", vec![]).await.unwrap();
    let err = manager.send("ping", vec![]).await.unwrap_err();

    assert_eq!(err, StrataLinkError::Backpressure { capacity: 1 });
    assert_eq!(manager.pending_calls(), 1);
}

#[tokio::test]
async fn test_block_backpressure_waits_for_room() {
    let mut server = FakeServer::start().await;
    let options = ConnectionOptions::default()
        .with_outbound_queue_capacity(1)
        .with_backpressure(BackpressurePolicy::Block);
    let manager = connected(&server, options).await;

    for _ in 0..3 {
        manager.send("ping", vec![]).await.unwrap();
    }
    let ids: Vec<_> = [
        server.next_request().await,
        server.next_request().await,
        server.next_request().await,
    ]
    .iter()
    .map(|r| r["id"].as_u64().unwrap())
    .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_transport_loss_drains_with_transport_error() {
    let mut server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;
    let (sink, mut rx) = channel_sink();
    manager.subscribe("sub-1", sink, false);

    let a = manager.send("select", vec![json!("a")]).await.unwrap();
    let b = manager.send("select", vec![json!("b")]).await.unwrap();
    server.next_request().await;
    server.next_request().await;
    server.hang_up();

    for handle in [a, b] {
        let outcome = timeout(TEST_TIMEOUT, handle).await.unwrap();
        assert!(matches!(outcome, Err(StrataLinkError::Transport(_))), "{:?}", outcome);
    }
    assert_eq!(manager.state(), ConnectionState::Closed);
    assert!(manager.subscriptions().is_empty());
    // Subscriptions end silently: the sink is dropped without an error item.
    assert!(timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unanswered_ping_tears_down_with_pong_timeout() {
    let addr = start_silent_server().await;
    let timeouts = StrataLinkTimeouts::builder()
        .keepalive_interval(Duration::from_millis(100))
        .pong_timeout(Duration::from_millis(100))
        .close_timeout(Duration::from_millis(100))
        .build();
    let manager =
        ConnectionManager::new(ConnectionOptions::default(), timeouts, EventHandlers::new());
    manager
        .connect(&format!("ws://{}/rpc", addr), Duration::from_secs(2))
        .await
        .unwrap();

    let handle = manager.send("version", vec![]).await.unwrap();
    assert_eq!(
        timeout(TEST_TIMEOUT, handle).await.unwrap(),
        Err(StrataLinkError::Transport("pong timeout".to_string()))
    );
    assert_eq!(manager.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn test_state_hook_sees_full_lifecycle() {
    let server = FakeServer::start().await;
    let states = Arc::new(Mutex::new(Vec::new()));
    let states_clone = states.clone();
    let manager = ConnectionManager::new(
        ConnectionOptions::default(),
        test_timeouts(),
        EventHandlers::new().on_state_change(move |s| states_clone.lock().unwrap().push(s)),
    );

    manager.connect(&server.url(), Duration::from_secs(2)).await.unwrap();
    assert!(manager.is_connected());
    manager.disconnect().await;

    assert_eq!(
        *states.lock().unwrap(),
        vec![
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Closing,
            ConnectionState::Closed,
        ]
    );
}

#[tokio::test]
async fn test_zero_queue_capacities_are_clamped_on_connect() {
    let mut server = FakeServer::start().await;
    let options: ConnectionOptions =
        serde_json::from_str(r#"{"outbound_queue_capacity":0,"event_channel_capacity":0}"#)
            .unwrap();
    let manager = connected(&server, options).await;

    let handle = manager.send("ping", vec![]).await.unwrap();
    let request = server.next_request().await;
    server.reply(json!({ "id": request["id"], "result": "pong" }));

    assert_eq!(timeout(TEST_TIMEOUT, handle).await.unwrap(), Ok(json!("pong")));
    assert!(manager.is_connected());
}

async fn wait_until_resolved(manager: &ConnectionManager) {
    timeout(TEST_TIMEOUT, async {
        while manager.pending_calls() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("pending entry never resolved");
}

#[tokio::test]
async fn test_cancel_after_resolution_keeps_delivered_live_id() {
    let mut server = FakeServer::start().await;
    let manager = connected(&server, ConnectionOptions::default()).await;
    let (sink, mut rx) = channel_sink();

    let handle = manager
        .send_live("live", vec![json!("person"), json!(false)], sink, false)
        .await
        .unwrap();
    let request = server.next_request().await;
    server.reply(json!({ "id": request["id"], "result": "sub-late" }));
    wait_until_resolved(&manager).await;

    // The deadline fired after the receive task took the entry.
    assert!(!manager.cancel(handle.id()));
    assert_eq!(timeout(TEST_TIMEOUT, handle).await.unwrap(), Ok(json!("sub-late")));
    assert!(manager.has_subscription("sub-late"));

    server.reply(json!({
        "result": { "id": "sub-late", "action": "CREATE", "result": { "name": "Ada" } }
    }));
    let change = recv_notification(&mut rx).await;
    assert_eq!(change.kind, ChangeKind::Create);
}
