//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use task_api::{ApiConfig, ApiServer, Database, Shutdown};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running server on an ephemeral port, backed by a temp data file.
pub struct TestServer {
    pub addr: SocketAddr,
    pub database: Database,
    pub data_file: PathBuf,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop the server and wait for the final flush.
    pub async fn stop(self) -> TempDir {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
        self._dir
    }
}

/// Start a server with default configuration.
pub async fn start_server() -> TestServer {
    start_server_with(ApiConfig::default()).await
}

pub async fn start_server_with(mut config: ApiConfig) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("db.json");
    config.storage.data_file = data_file.clone();

    let database = Database::open(&data_file).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = ApiServer::new(config, database.clone());
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        database,
        data_file,
        shutdown,
        handle,
        _dir: dir,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
