//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use route_registry::config::RegistryConfig;
use route_registry::http::HttpServer;
use route_registry::lifecycle::Shutdown;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// A registry server running on an ephemeral port.
pub struct TestRegistry {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestRegistry {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestRegistry {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a registry storing its routes at `data_path`.
pub async fn start_registry(data_path: &Path) -> TestRegistry {
    let mut config = RegistryConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.storage.path = data_path.to_path_buf();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    TestRegistry {
        addr,
        client,
        shutdown,
    }
}

/// JSON body for a route.
pub fn route_json(name: &str, host: &str) -> Value {
    json!({
        "name": name,
        "host": host,
        "path": "/a",
        "backend": "http://10.0.0.1:9000",
        "enabled": true,
    })
}
