use logpong_node::api::ErrorResponse;
use logpong_node::app::App;
use logpong_node::config::{CounterServiceConfig, NodeConfig, Role};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::util::ServiceExt;
use tempfile::tempdir;

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}

/// Runs a real counter service on an ephemeral port.
async fn spawn_pingpong(dir: &Path) -> SocketAddr {
    let cfg = NodeConfig {
        role: Role::PingPong,
        data_dir: dir.to_path_buf(),
        ..Default::default()
    };
    let app = App::from_config(&cfg).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.router).await.unwrap();
    });
    addr
}

fn writer_config(dir: &Path, peer: SocketAddr, timeout: Duration) -> NodeConfig {
    let config_file = dir.join("information.txt");
    std::fs::write(&config_file, "this text is from file\nsecond line\n").unwrap();

    NodeConfig {
        role: Role::Writer,
        data_dir: dir.to_path_buf(),
        config_file,
        message: Some("hello world".to_string()),
        counter_service: Some(CounterServiceConfig {
            host: peer.ip().to_string(),
            port: peer.port(),
            timeout,
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_status_query_includes_remote_count() {
    let counter_dir = tempdir().unwrap();
    let peer = spawn_pingpong(counter_dir.path()).await;

    // Two pings through the real HTTP path.
    let client = reqwest::Client::new();
    for expected in ["Pong 1", "Pong 2"] {
        let body = client
            .get(format!("http://{}/pingpong", peer))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, expected);
    }

    let writer_dir = tempdir().unwrap();
    let app = App::from_config(&writer_config(writer_dir.path(), peer, Duration::from_secs(2))).unwrap();

    let (status, body) = get(&app.router, "/now/writer").await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "file content: this text is from file");
    assert_eq!(lines[1], "env variable: MESSAGE=hello world");
    assert!(lines[2].ends_with('.'));
    logpong_core::EventRecord::decode(lines[2].trim_end_matches('.')).unwrap();
    assert_eq!(lines[3], "Ping / Pongs : 2");

    app.background.unwrap().abort();
}

#[tokio::test]
async fn test_status_query_fails_when_counter_unreachable() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let peer = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempdir().unwrap();
    let app = App::from_config(&writer_config(dir.path(), peer, Duration::from_secs(2))).unwrap();

    let (status, body) = get(&app.router, "/now/writer").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.contains("Ping / Pongs"));
    let err: ErrorResponse = serde_json::from_str(&body).unwrap();
    assert!(err.error.contains("Remote counter service"));

    app.background.unwrap().abort();
}

#[tokio::test]
async fn test_status_query_times_out_on_stalled_counter() {
    // Accepts connections but never answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let peer = listener.local_addr().unwrap();
    let stall = tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            if let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        }
    });

    let dir = tempdir().unwrap();
    let app = App::from_config(&writer_config(dir.path(), peer, Duration::from_millis(300))).unwrap();

    let started = Instant::now();
    let (status, _) = get(&app.router, "/now/writer").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(started.elapsed() < Duration::from_secs(5));

    stall.abort();
    app.background.unwrap().abort();
}

#[tokio::test]
async fn test_status_query_fails_on_missing_config_file() {
    let counter_dir = tempdir().unwrap();
    let peer = spawn_pingpong(counter_dir.path()).await;

    let dir = tempdir().unwrap();
    let mut cfg = writer_config(dir.path(), peer, Duration::from_secs(2));
    cfg.config_file = dir.path().join("absent.txt");
    let app = App::from_config(&cfg).unwrap();

    let (status, _) = get(&app.router, "/now/writer").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    app.background.unwrap().abort();
}

#[tokio::test]
async fn test_remote_error_status_is_failure() {
    // A reader node has no /get_pings route, so the peer answers 404.
    let dir = tempdir().unwrap();
    let reader_cfg = NodeConfig {
        role: Role::Reader,
        data_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let reader = App::from_config(&reader_cfg).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let peer = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, reader.router).await.unwrap();
    });

    let writer_dir = tempdir().unwrap();
    let app = App::from_config(&writer_config(writer_dir.path(), peer, Duration::from_secs(2))).unwrap();
    let (status, body) = get(&app.router, "/now/writer").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("404"));

    app.background.unwrap().abort();
}

fn reader_config(dir: &Path, peer: SocketAddr) -> NodeConfig {
    NodeConfig {
        role: Role::Reader,
        data_dir: dir.to_path_buf(),
        tail_interval: Duration::from_millis(10),
        counter_service: Some(CounterServiceConfig {
            host: peer.ip().to_string(),
            port: peer.port(),
            timeout: Duration::from_secs(2),
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_reader_status_includes_remote_count() {
    let counter_dir = tempdir().unwrap();
    let peer = spawn_pingpong(counter_dir.path()).await;
    let client = reqwest::Client::new();
    for _ in 0..3 {
        client.get(format!("http://{}/pingpong", peer)).send().await.unwrap();
    }

    let dir = tempdir().unwrap();
    let record = logpong_core::EventRecord::now();
    logpong_core::AppendLog::new(dir.path().join("timestamp.txt")).append(&record).unwrap();

    let app = App::from_config(&reader_config(dir.path(), peer)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) = get(&app.router, "/now/reader").await;
    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = body.lines().collect();
    assert!(lines[0].ends_with('.'));
    assert_eq!(lines[1], "Ping / Pongs : 3");
    assert_eq!(lines[2], "Lines tailed: 1");
    assert_eq!(lines[3], record.encode());

    app.background.unwrap().abort();
}

#[tokio::test]
async fn test_reader_status_fails_when_counter_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let peer = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempdir().unwrap();
    let app = App::from_config(&reader_config(dir.path(), peer)).unwrap();

    let (status, body) = get(&app.router, "/now/reader").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!body.contains("Ping / Pongs"));
    let err: ErrorResponse = serde_json::from_str(&body).unwrap();
    assert!(err.error.contains("Remote counter service"));

    app.background.unwrap().abort();
}
