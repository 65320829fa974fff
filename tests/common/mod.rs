//! Common test utilities
//!
//! Spins up the real HTTP service in-process, backed by scripted mock
//! page backends, and hands out clients wired to it.

use std::sync::Arc;
use std::time::Duration;

use courier_oxide::backend::{BackendFactory, MockPage, MockPageBackend, PageBackend};
use courier_oxide::client::{CourierClient, FsDebugSink};
use courier_oxide::config::{ClientConfig, Config};
use courier_oxide::pool::WorkerPool;
use courier_oxide::server::{self, AppState};

pub const TEST_API_KEY: &str = "test-key";

/// A service instance bound to an ephemeral port
pub struct TestServer {
    pub base_url: String,
    pub pool: Arc<WorkerPool>,
    server: tokio::task::JoinHandle<()>,
    sweeper: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.abort();
        self.sweeper.abort();
    }
}

impl TestServer {
    /// Client configured for this server
    pub fn client(&self) -> CourierClient {
        CourierClient::new(self.client_config())
    }

    /// Client configuration pointing at this server
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_api_url(self.base_url.clone())
            .with_api_key(TEST_API_KEY)
    }
}

/// Start the service with the given worker limit and backend factory
pub async fn spawn_server(max_workers: usize, factory: BackendFactory) -> TestServer {
    let config = Config {
        api_key: TEST_API_KEY.to_string(),
        max_workers,
        sweep_interval: 1,
        ..Default::default()
    };

    let pool = Arc::new(WorkerPool::from_config(&config, factory));
    let state = AppState::new(pool.clone(), Arc::new(config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("test listener addr");

    let sweeper = tokio::spawn(server::sweep_loop(pool.clone(), Duration::from_secs(1)));
    let server = tokio::spawn(async move {
        axum::serve(listener, server::router(state))
            .await
            .expect("test server");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        pool,
        server,
        sweeper,
    }
}

/// Start the service with permissive mock backends
pub async fn spawn_default_server(max_workers: usize) -> TestServer {
    spawn_server(
        max_workers,
        Arc::new(|options| {
            Ok(Arc::new(MockPageBackend::with_options(options)) as Arc<dyn PageBackend>)
        }),
    )
    .await
}

/// Factory serving the same scripted pages and capture bytes to every
/// session
pub fn scripted_factory(
    pages: Vec<(String, MockPage)>,
    screenshot: Vec<u8>,
    strict: bool,
) -> BackendFactory {
    Arc::new(move |options| {
        let mut backend = MockPageBackend::with_options(options);
        if strict {
            backend = backend.strict();
        }
        backend = backend.with_screenshot(screenshot.clone());
        for (url, page) in &pages {
            backend = backend.with_page(url.clone(), page.clone());
        }
        Ok(Arc::new(backend) as Arc<dyn PageBackend>)
    })
}

/// Sink writing into a throwaway directory under the system tmpdir
pub fn temp_sink() -> (FsDebugSink, std::path::PathBuf) {
    let dir = std::env::temp_dir().join(format!("courier-test-{}", uuid::Uuid::new_v4()));
    let sink = FsDebugSink::new(&dir).expect("create temp sink");
    (sink, dir)
}

/// Get test HTML content
pub fn get_test_html() -> String {
    r#"
<!DOCTYPE html>
<html>
<head>
    <title>Test Page</title>
</head>
<body>
    <h1 id="title">Hello World</h1>
    <button id="click-me">Click Me</button>
    <input id="text-input" type="text" />
    <div id="output"></div>
</body>
</html>
    "#
    .to_string()
}

/// Create a simple test page URL
pub fn get_test_url() -> String {
    "data:text/html;charset=utf-8,".to_string() + &urlencoding::encode(&get_test_html())
}

/// Scripted page matching [`get_test_html`]
pub fn test_page() -> MockPage {
    MockPage::new(get_test_html())
        .with_text("#title", "Hello World")
        .with_text("#click-me", "Click Me")
        .with_text("#text-input", "")
}
