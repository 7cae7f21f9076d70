//! Relay integration tests over real TCP sockets

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use swarm_core::{AdminCommand, Detection, Team, Tracker, TrackerConfig, WorldSnapshot};
use swarm_relay::source::ScriptedSource;
use swarm_relay::{server, AppContext, FrameLoop};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

fn corners() -> Vec<Detection> {
    vec![
        Detection::square(0, 0.0, 0.0, 10.0, 0.0),
        Detection::square(0, 1400.0, 800.0, 10.0, 0.0),
    ]
}

fn tracked_snapshot() -> Arc<WorldSnapshot> {
    let mut config = TrackerConfig::default();
    config.tasks.enabled = false;
    let mut tracker = Tracker::new(config);
    let mut frame = corners();
    frame.push(Detection::square(2, 300.0, 400.0, 10.0, 0.0));
    frame.push(Detection::square(3, 1300.0, 400.0, 10.0, 90.0));
    frame.push(Detection::square(1, 700.0, 400.0, 10.0, 0.0));
    tracker.process_frame(&frame, Instant::now());
    tracker.snapshot()
}

async fn start(
    snapshot: Arc<WorldSnapshot>,
) -> (SocketAddr, AppContext, JoinHandle<swarm_relay::Result<()>>) {
    let (ctx, _admin) = AppContext::new(snapshot);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(server::serve(listener, ctx.snapshots.clone(), ctx.cancel.clone()));
    (addr, ctx, handle)
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self { lines: BufReader::new(reader).lines(), writer }
    }

    async fn send(&mut self, line: &str) {
        self.send_bytes(line.as_bytes()).await;
    }

    async fn send_bytes(&mut self, line: &[u8]) {
        self.writer.write_all(line).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn reply(&mut self) -> Value {
        let line = tokio::time::timeout(REPLY_TIMEOUT, self.lines.next_line())
            .await
            .expect("reply timed out")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, line: &str) -> Value {
        self.send(line).await;
        self.reply().await
    }
}

#[tokio::test]
async fn test_check_awake() {
    let (addr, _ctx, _server) = start(tracked_snapshot()).await;
    let mut client = Client::connect(addr).await;
    assert_eq!(client.request(r#"{"check_awake": true}"#).await, json!({"awake": true}));
}

#[tokio::test]
async fn test_awake_before_calibration() {
    let (addr, _ctx, _server) = start(Arc::new(WorldSnapshot::empty(300))).await;
    let mut client = Client::connect(addr).await;
    let reply = client.request(r#"{"check_awake": true, "get_robots": true}"#).await;
    assert_eq!(reply, json!({"awake": true}));
}

#[tokio::test]
async fn test_get_robots_and_ids() {
    let (addr, _ctx, _server) = start(tracked_snapshot()).await;
    let mut client = Client::connect(addr).await;
    let reply = client.request(r#"{"get_robots": true, "get_ids": true}"#).await;

    assert_eq!(reply["ids"], json!([2, 3]));
    assert_eq!(reply["2"]["team"], "RED");
    assert_eq!(reply["3"]["team"], "BLUE");
    assert_eq!(reply["3"]["orientation"], 90.0);
    assert_eq!(reply["2"]["ball"]["bearing"], 0.0);
    assert_eq!(reply["2"]["players"]["3"]["orientation"], 90.0);
    assert_eq!(reply["2"]["remaining_time"], 300);
}

#[tokio::test]
async fn test_malformed_and_flagless_requests_get_no_reply() {
    let (addr, _ctx, _server) = start(tracked_snapshot()).await;
    let mut client = Client::connect(addr).await;

    client.send("{not json").await;
    client.send(r#"{"hello": 1}"#).await;
    client.send("[1, 2, 3]").await;
    // Replies are in request order, so the first reply answers this one
    let reply = client.request(r#"{"get_ids": true}"#).await;
    assert_eq!(reply, json!({"ids": [2, 3]}));
}

#[tokio::test]
async fn test_invalid_utf8_request_keeps_connection_open() {
    let (addr, _ctx, _server) = start(tracked_snapshot()).await;
    let mut client = Client::connect(addr).await;

    client.send_bytes(b"{\"check_awake\": \"\xff\xfe\"}").await;
    let reply = client.request(r#"{"check_awake": true}"#).await;
    assert_eq!(reply, json!({"awake": true}));
}

#[tokio::test]
async fn test_oversized_request_is_dropped() {
    let (addr, _ctx, _server) = start(tracked_snapshot()).await;
    let mut client = Client::connect(addr).await;

    let mut huge = br#"{"get_ids": true, "pad": ""#.to_vec();
    huge.extend(std::iter::repeat(b'a').take(server::MAX_REQUEST_BYTES * 4));
    huge.extend_from_slice(br#""}"#);
    client.send_bytes(&huge).await;

    let reply = client.request(r#"{"check_awake": true}"#).await;
    assert_eq!(reply, json!({"awake": true}));
}

#[tokio::test]
async fn test_concurrent_clients_see_identical_frame() {
    let (addr, _ctx, _server) = start(tracked_snapshot()).await;

    let mut tasks = Vec::new();
    for _ in 0..16 {
        tasks.push(tokio::spawn(async move {
            let mut client = Client::connect(addr).await;
            client.request(r#"{"get_robots": true}"#).await
        }));
    }

    let mut replies = Vec::new();
    for task in tasks {
        replies.push(task.await.unwrap());
    }
    assert!(replies[0].get("2").is_some());
    assert!(replies.iter().all(|r| r == &replies[0]));
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (_addr, ctx, server) = start(tracked_snapshot()).await;
    ctx.shutdown();
    let result = tokio::time::timeout(REPLY_TIMEOUT, server).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_frame_loop_to_client() {
    let mut config = TrackerConfig::default();
    config.tasks.enabled = false;
    let tracker = Tracker::new(config);
    let (ctx, admin) = AppContext::new(tracker.snapshot());

    let frames = vec![corners(), vec![Detection::square(5, 300.0, 400.0, 10.0, 0.0)]];
    let frame_loop = FrameLoop::new(
        tracker,
        Box::new(ScriptedSource::new(frames)),
        admin,
        &ctx,
        Duration::from_millis(1),
    )
    .spawn()
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, ctx.snapshots.clone(), ctx.cancel.clone()));

    let mut client = Client::connect(addr).await;
    let deadline = Instant::now() + REPLY_TIMEOUT;
    loop {
        let reply = client.request(r#"{"get_ids": true}"#).await;
        if reply["ids"] == json!([5]) {
            break;
        }
        assert!(Instant::now() < deadline, "robot never published");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // Admin commands travel through the frame loop and show up in replies
    assert!(ctx.send_admin(AdminCommand::AdjustScore { team: Team::Red, delta: 1 }));
    let deadline = Instant::now() + REPLY_TIMEOUT;
    while ctx.snapshots.load().scores.red != 1 {
        assert!(Instant::now() < deadline, "admin command never applied");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    ctx.shutdown();
    let stats = tokio::task::spawn_blocking(move || frame_loop.join().unwrap()).await.unwrap();
    assert_eq!(stats.frames, 2);
    assert_eq!(stats.admin_commands, 1);
}
