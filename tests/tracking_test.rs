//! Behavioral tests for the tracking subscription client
//!
//! Drives the client through a scripted in-memory connector, with paused
//! tokio time for deterministic backoff measurements.

use ordertrack::tracking::{
    codes, Connection, ConnectionState, Connector, LocationData, OrderTracker, OrderUpdateData,
    OutboundFrame, ReconnectPolicy, SubscribeOutcome, TrackerConfig, TrackingObserver,
    TransportEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// One scripted transport connection handed to the test
struct Session {
    url: String,
    outbound: mpsc::Receiver<OutboundFrame>,
    events: mpsc::Sender<TransportEvent>,
}

impl Session {
    async fn open(&mut self) {
        self.events.send(TransportEvent::Opened).await.unwrap();
    }

    async fn frame(&mut self, text: &str) {
        self.events
            .send(TransportEvent::Frame(text.to_string()))
            .await
            .unwrap();
    }

    async fn close(&mut self, clean: bool) {
        self.events
            .send(TransportEvent::Closed { clean })
            .await
            .unwrap();
    }

    /// Receive the next outbound text frame as JSON
    async fn next_sent_json(&mut self) -> serde_json::Value {
        match self.outbound.recv().await {
            Some(OutboundFrame::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected outbound text frame, got {:?}", other),
        }
    }
}

/// Connector that yields a fresh scripted session per connect call
struct ScriptedConnector {
    sessions: mpsc::UnboundedSender<Session>,
}

impl ScriptedConnector {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Session>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { sessions: tx }), rx)
    }
}

impl Connector for ScriptedConnector {
    fn connect(&self, url: &str) -> Connection {
        let (outbound_tx, outbound_rx) = mpsc::channel(32);
        let (events_tx, events_rx) = mpsc::channel(32);
        let _ = self.sessions.send(Session {
            url: url.to_string(),
            outbound: outbound_rx,
            events: events_tx,
        });
        Connection {
            outbound: outbound_tx,
            events: events_rx,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Open,
    Close,
    Error { code: String, message: String },
    Order(OrderUpdateData),
    Location(LocationData),
}

/// Observer that forwards every callback into a channel
struct Recorder(mpsc::UnboundedSender<Event>);

impl Recorder {
    fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

impl TrackingObserver for Recorder {
    fn on_open(&mut self) {
        let _ = self.0.send(Event::Open);
    }
    fn on_close(&mut self) {
        let _ = self.0.send(Event::Close);
    }
    fn on_error(&mut self, code: &str, message: &str) {
        let _ = self.0.send(Event::Error {
            code: code.to_string(),
            message: message.to_string(),
        });
    }
    fn on_order_update(&mut self, data: &OrderUpdateData) {
        let _ = self.0.send(Event::Order(data.clone()));
    }
    fn on_location_update(&mut self, data: &LocationData) {
        let _ = self.0.send(Event::Location(data.clone()));
    }
}

fn test_config() -> TrackerConfig {
    TrackerConfig::new("ws://localhost:7319/api/v1", "test token", "order-1")
}

fn spawn_tracker(
    config: TrackerConfig,
) -> (
    OrderTracker,
    mpsc::UnboundedReceiver<Session>,
    mpsc::UnboundedReceiver<Event>,
) {
    let (connector, sessions) = ScriptedConnector::new();
    let (recorder, events) = Recorder::new();
    let tracker = OrderTracker::with_connector(config, recorder, connector);
    (tracker, sessions, events)
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(30), events.recv())
        .await
        .expect("timed out waiting for observer event")
        .expect("observer channel closed")
}

fn expect_error_code(event: Event, expected: &str) -> String {
    match event {
        Event::Error { code, message } => {
            assert_eq!(code, expected);
            message
        }
        other => panic!("expected {} error, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_connect_uses_token_authenticated_endpoint() {
    let (tracker, mut sessions, _events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let session = sessions.recv().await.unwrap();
    assert_eq!(
        session.url,
        "ws://localhost:7319/api/v1/tracking/ws?token=test+token"
    );
}

#[tokio::test]
async fn test_subscribe_is_on_the_wire_before_on_open() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;

    assert_eq!(next_event(&mut events).await, Event::Open);

    // By the time on_open fires the subscribe frame is already queued
    let sent = session.outbound.try_recv().expect("subscribe frame missing");
    match sent {
        OutboundFrame::Text(text) => {
            let json: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(json["type"], "SUBSCRIBE");
            assert_eq!(json["order_id"], "order-1");
            assert!(json["timestamp"].is_string());
        }
        other => panic!("expected subscribe frame, got {:?}", other),
    }

    let status = tracker.status().await.unwrap();
    assert_eq!(status.state, ConnectionState::Open);
    assert_eq!(status.reconnect_attempts, 0);
}

#[tokio::test]
async fn test_location_frame_dispatches_only_location_callback() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    session
        .frame(r#"{"type":"LOCATION","data":{"latitude":13.68,"longitude":-89.21}}"#)
        .await;

    match next_event(&mut events).await {
        Event::Location(data) => {
            assert_eq!(data.latitude, 13.68);
            assert_eq!(data.longitude, -89.21);
        }
        other => panic!("expected location event, got {:?}", other),
    }

    // No other callback fired
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_order_update_and_server_error_dispatch() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    session
        .frame(
            r#"{"type":"ORDER_UPDATE","data":{"status":"IN_TRANSIT","description":"on the way"}}"#,
        )
        .await;
    session
        .frame(r#"{"type":"ERROR","data":{"code":"ORDER_NOT_FOUND","message":"gone"}}"#)
        .await;

    match next_event(&mut events).await {
        Event::Order(data) => {
            assert_eq!(data.status, "IN_TRANSIT");
            assert_eq!(data.description, "on the way");
        }
        other => panic!("expected order event, got {:?}", other),
    }

    // Server error is informational: surfaced, no state change
    let msg = expect_error_code(next_event(&mut events).await, "ORDER_NOT_FOUND");
    assert_eq!(msg, "gone");
    let status = tracker.status().await.unwrap();
    assert_eq!(status.state, ConnectionState::Open);
}

#[tokio::test]
async fn test_unknown_and_malformed_frames_are_dropped() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    session
        .frame(r#"{"type":"UNKNOWN_X","data":{"latitude":1.0}}"#)
        .await;
    session.frame("this is not json").await;
    // A recognizable frame afterwards proves the loop survived
    session
        .frame(r#"{"type":"LOCATION","data":{"latitude":1.0,"longitude":2.0}}"#)
        .await;

    match next_event(&mut events).await {
        Event::Location(data) => assert_eq!(data.latitude, 1.0),
        other => panic!("dropped frames leaked through: {:?}", other),
    }

    let status = tracker.status().await.unwrap();
    assert_eq!(status.state, ConnectionState::Open);
    assert_eq!(status.reconnect_attempts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_unclean_close_schedules_exponential_backoff() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    // Consecutive failures double the delay: 2s, 4s, 8s
    for expected_secs in [2u64, 4, 8] {
        session.close(false).await;
        assert_eq!(next_event(&mut events).await, Event::Close);
        let msg = expect_error_code(next_event(&mut events).await, codes::RECONNECTING);
        assert!(msg.contains("attempt"), "advisory message: {}", msg);

        let before = tokio::time::Instant::now();
        session = sessions.recv().await.unwrap();
        assert_eq!(
            before.elapsed(),
            Duration::from_secs(expected_secs),
            "backoff delay mismatch"
        );
        // Connection attempt fails straight away; no Opened event
    }
}

#[tokio::test(start_paused = true)]
async fn test_backoff_delay_caps_at_max() {
    let policy = ReconnectPolicy::default().max_attempts(10);
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config().policy(policy));
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();

    let mut delays = Vec::new();
    for _ in 0..6 {
        session.close(false).await;
        assert_eq!(next_event(&mut events).await, Event::Close);
        expect_error_code(next_event(&mut events).await, codes::RECONNECTING);

        let before = tokio::time::Instant::now();
        session = sessions.recv().await.unwrap();
        delays.push(before.elapsed());
    }

    assert_eq!(
        delays,
        vec![
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
            Duration::from_secs(16),
            Duration::from_secs(30), // 32s capped
            Duration::from_secs(30),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_exhaustion_is_terminal_until_explicit_connect() {
    let policy = ReconnectPolicy::default().max_attempts(2);
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config().policy(policy));
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();

    // Two failed attempts get scheduled
    for _ in 0..2 {
        session.close(false).await;
        assert_eq!(next_event(&mut events).await, Event::Close);
        expect_error_code(next_event(&mut events).await, codes::RECONNECTING);
        session = sessions.recv().await.unwrap();
    }

    // The next failure exhausts the policy: exactly one terminal error
    session.close(false).await;
    assert_eq!(next_event(&mut events).await, Event::Close);
    expect_error_code(next_event(&mut events).await, codes::RECONNECT_FAILED);

    tokio::time::advance(Duration::from_secs(300)).await;
    assert!(sessions.try_recv().is_err(), "no automatic attempt expected");
    assert!(events.try_recv().is_err(), "terminal error fired once");

    let status = tracker.status().await.unwrap();
    assert_eq!(status.state, ConnectionState::Disconnected);

    // An explicit connect resumes
    tracker.connect().unwrap();
    assert!(sessions.recv().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_clean_close_never_schedules_reconnect() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    // One prior failure so reconnect_attempts is non-zero on reconnect path
    session.close(false).await;
    assert_eq!(next_event(&mut events).await, Event::Close);
    expect_error_code(next_event(&mut events).await, codes::RECONNECTING);

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);
    assert_eq!(tracker.status().await.unwrap().reconnect_attempts, 0);

    tracker.disconnect().unwrap();
    assert_eq!(next_event(&mut events).await, Event::Close);

    // The transport was asked for a clean close
    loop {
        match session.outbound.recv().await {
            Some(OutboundFrame::Close) => break,
            Some(OutboundFrame::Text(_)) => continue, // the subscribe frame
            None => panic!("close frame never requested"),
        }
    }

    tokio::time::advance(Duration::from_secs(300)).await;
    assert!(sessions.try_recv().is_err(), "clean close must not reconnect");
    assert_eq!(
        tracker.status().await.unwrap().state,
        ConnectionState::Disconnected
    );
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_cancels_pending_reconnect_timer() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    session.close(false).await;
    assert_eq!(next_event(&mut events).await, Event::Close);
    expect_error_code(next_event(&mut events).await, codes::RECONNECTING);

    // Timer is pending; disconnect must cancel it
    tracker.disconnect().unwrap();

    tokio::time::advance(Duration::from_secs(300)).await;
    assert!(sessions.try_recv().is_err(), "cancelled timer must not fire");

    let status = tracker.status().await.unwrap();
    assert_eq!(status.state, ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_subscribe_while_open_sends_new_topic_immediately() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    // Initial subscribe for order-1
    let first = session.next_sent_json().await;
    assert_eq!(first["order_id"], "order-1");

    let outcome = tracker.subscribe("order-2").await.unwrap();
    assert_eq!(outcome, SubscribeOutcome::Sent);

    let second = session.next_sent_json().await;
    assert_eq!(second["type"], "SUBSCRIBE");
    assert_eq!(second["order_id"], "order-2");
}

#[tokio::test]
async fn test_subscribe_while_disconnected_takes_effect_on_next_open() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());

    let outcome = tracker.subscribe("order-9").await.unwrap();
    assert_eq!(outcome, SubscribeOutcome::Deferred);

    tracker.connect().unwrap();
    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    let sent = session.next_sent_json().await;
    assert_eq!(sent["order_id"], "order-9");
}

#[tokio::test]
async fn test_connect_twice_leaves_exactly_one_live_transport() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();
    tracker.connect().unwrap();

    let mut first = sessions.recv().await.unwrap();
    let mut second = sessions.recv().await.unwrap();

    // The superseded transport was asked to close and its events go nowhere
    assert_eq!(first.outbound.recv().await, Some(OutboundFrame::Close));
    assert!(first.events.send(TransportEvent::Opened).await.is_err());

    second.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);
    assert!(events.try_recv().is_err(), "exactly one on_open expected");

    let status = tracker.status().await.unwrap();
    assert_eq!(status.state, ConnectionState::Open);
}

#[tokio::test]
async fn test_transport_failure_surfaces_connection_error_then_close_drives_state() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session
        .events
        .send(TransportEvent::Failed("connection refused".to_string()))
        .await
        .unwrap();

    let msg = expect_error_code(next_event(&mut events).await, codes::CONNECTION_ERROR);
    assert_eq!(msg, "connection refused");

    // Error alone does not change state; the close event does
    assert_eq!(
        tracker.status().await.unwrap().state,
        ConnectionState::Connecting
    );

    session.close(false).await;
    assert_eq!(next_event(&mut events).await, Event::Close);
    expect_error_code(next_event(&mut events).await, codes::RECONNECTING);
}

#[tokio::test]
async fn test_inbound_messages_dispatch_in_arrival_order() {
    let (tracker, mut sessions, mut events) = spawn_tracker(test_config());
    tracker.connect().unwrap();

    let mut session = sessions.recv().await.unwrap();
    session.open().await;
    assert_eq!(next_event(&mut events).await, Event::Open);

    for i in 0..5 {
        session
            .frame(&format!(
                r#"{{"type":"LOCATION","data":{{"latitude":{}.0,"longitude":0.0}}}}"#,
                i
            ))
            .await;
    }

    for i in 0..5 {
        match next_event(&mut events).await {
            Event::Location(data) => assert_eq!(data.latitude, i as f64),
            other => panic!("expected location, got {:?}", other),
        }
    }
}
