mod common;

use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Reading {
    value: String,
    band: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Metrics {
    recovery: Reading,
    sleep: Reading,
    strain: Reading,
}

#[derive(Debug, Deserialize)]
struct Clock {
    time: String,
    date: String,
    sunrise: String,
}

#[derive(Debug, Deserialize)]
struct DisplayState {
    clock: Clock,
    metrics: Metrics,
    metrics_updated_at: Option<String>,
    display_name: Option<String>,
    overlay_visible: bool,
}

#[derive(Debug, Deserialize)]
struct QueuedCommand {
    command: String,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let upstream = common::spawn_upstream_thread(common::healthy_upstream());
    let child = std::process::Command::new(env!("CARGO_BIN_EXE_sleep_projector"))
        .env("PORT", port.to_string())
        .env("PROJECTOR_API_BASE_URL", upstream)
        .env("PROJECTOR_TIMEZONE", "UTC")
        .env("PROJECTOR_DISPLAY_NAME", "Ada")
        .env("PROJECTOR_AUTO_DETECT_LOCATION", "true")
        .env("PROJECTOR_REQUEST_TIMEOUT_SECS", "2")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_display(client: &Client, base_url: &str) -> DisplayState {
    client
        .get(format!("{base_url}/api/display"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn open_page(client: &Client, base_url: &str) -> u64 {
    let html = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    html.split("const pageId = ")
        .nth(1)
        .and_then(|rest| rest.split(';').next())
        .and_then(|id| id.parse().ok())
        .expect("page id in page")
}

async fn drain_for(client: &Client, base_url: &str, page: u64, window: Duration) -> Vec<String> {
    let mut seen = Vec::new();
    let deadline = Instant::now() + window;
    while Instant::now() < deadline {
        let commands: Vec<QueuedCommand> = client
            .get(format!("{base_url}/api/player/commands?page={page}"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        seen.extend(commands.into_iter().map(|c| c.command));
        sleep(Duration::from_millis(100)).await;
    }
    seen
}

async fn wait_for_metrics(client: &Client, base_url: &str) -> DisplayState {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let display = get_display(client, base_url).await;
        if display.metrics_updated_at.is_some() {
            return display;
        }
        if Instant::now() > deadline {
            panic!("metrics never refreshed: {display:?}");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

#[tokio::test]
async fn http_display_shows_reconciled_metrics() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let display = wait_for_metrics(&client, &server.base_url).await;

    assert_eq!(display.metrics.recovery.value, "67");
    assert_eq!(display.metrics.recovery.band.as_deref(), Some("high"));
    assert_eq!(display.metrics.sleep.value, "88");
    assert_eq!(display.metrics.sleep.band, None);
    assert_eq!(display.metrics.strain.value, "12.3");
    assert_eq!(display.metrics.strain.band, None);
    assert!(display.clock.time.ends_with(" UTC"), "{}", display.clock.time);
    assert!(!display.clock.date.is_empty());
    assert!(display.clock.sunrise.ends_with("to sunrise"));
    assert_eq!(display.display_name.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn http_gesture_unlocks_exactly_once() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let page = open_page(&client, &server.base_url).await;

    let ready = client
        .post(format!("{}/api/player/ready?page={page}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::ACCEPTED);

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/gesture?page={page}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let playing = client
        .post(format!("{}/api/player/state?page={page}", server.base_url))
        .json(&serde_json::json!({ "state": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(playing.status(), StatusCode::ACCEPTED);

    let seen = drain_for(&client, &server.base_url, page, Duration::from_secs(2)).await;

    let count = |name: &str| seen.iter().filter(|c| c.as_str() == name).count();
    assert_eq!(count("hide_overlay"), 1, "{seen:?}");
    assert_eq!(count("request_fullscreen"), 1, "{seen:?}");
    assert_eq!(count("set_volume"), 1, "{seen:?}");
    // One unlock unmute, plus at most one re-assertion for the playing signal.
    assert!((1..=2).contains(&count("unmute")), "{seen:?}");

    let display = get_display(&client, &server.base_url).await;
    assert!(!display.overlay_visible);
}

#[tokio::test]
async fn http_reloaded_page_gets_its_own_unlock() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for _ in 0..2 {
        let page = open_page(&client, &server.base_url).await;
        assert!(get_display(&client, &server.base_url).await.overlay_visible);

        for path in ["player/ready", "gesture"] {
            let response = client
                .post(format!("{}/api/{path}?page={page}", server.base_url))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }

        let seen = drain_for(&client, &server.base_url, page, Duration::from_secs(1)).await;
        let count = |name: &str| seen.iter().filter(|c| c.as_str() == name).count();
        assert_eq!(count("hide_overlay"), 1, "{seen:?}");
        assert_eq!(count("request_fullscreen"), 1, "{seen:?}");
        assert_eq!(count("unmute"), 1, "{seen:?}");
        assert!(!get_display(&client, &server.base_url).await.overlay_visible);
    }
}

#[tokio::test]
async fn http_player_calls_require_a_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/gesture", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_rejects_unknown_player_state() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/player/state?page=1", server.base_url))
        .json(&serde_json::json!({ "state": "rewinding" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn http_location_updates_coordinates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/location", server.base_url))
        .json(&serde_json::json!({ "latitude": 51.5, "longitude": -0.12 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["updated"], true);
    assert_eq!(body["latitude"], 51.5);

    let response = client
        .post(format!("{}/api/location", server.base_url))
        .json(&serde_json::json!({ "error": "User denied Geolocation" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["updated"], false);
    assert_eq!(body["latitude"], 51.5);

    let response = client
        .post(format!("{}/api/location", server.base_url))
        .json(&serde_json::json!({ "latitude": 123.0, "longitude": 0.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_health_and_refresh() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let health: serde_json::Value = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let before = wait_for_metrics(&client, &server.base_url)
        .await
        .metrics_updated_at;
    let response = client
        .post(format!("{}/api/refresh", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // The regular period is five minutes, so any change here is the manual tick.
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let after = get_display(&client, &server.base_url).await.metrics_updated_at;
        if after != before {
            assert!(after.is_some());
            break;
        }
        assert!(Instant::now() < deadline, "manual refresh never ran");
        sleep(Duration::from_millis(100)).await;
    }

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("soundOverlay"));
    assert!(page.contains(">Ada<"));
}
