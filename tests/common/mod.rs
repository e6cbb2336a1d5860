//! Common test utilities shared by the integration tests

#![allow(dead_code)] // Not every helper is used by every test file

use std::net::SocketAddr;
use std::sync::Arc;
use zonekeeper::{
    auth::TokenSigner, config::ZoneConfig, http_server::HttpServer, model::NewRecord,
    zone::ZoneStore,
};

/// Config pointing at a fresh in-memory database
pub fn test_config() -> ZoneConfig {
    ZoneConfig {
        database_url: "sqlite::memory:".to_string(),
        secret_key: "test-secret".to_string(),
        ..ZoneConfig::default()
    }
}

/// Open a store on a fresh in-memory database
pub async fn connect_store() -> ZoneStore {
    ZoneStore::connect(&test_config())
        .await
        .expect("in-memory store connects")
}

/// Build a record creation request
pub fn new_record(name: &str, rtype: &str, content: &str) -> NewRecord {
    NewRecord {
        name: name.to_string(),
        content: content.to_string(),
        rtype: rtype.to_string(),
        ttl: None,
        priority: None,
    }
}

/// A running API server plus a client and token mint for driving it
pub struct TestApi {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    signer: TokenSigner,
}

impl TestApi {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Issue a token for the given namespace with the server's secret
    pub fn token(&self, namespace: &str) -> String {
        self.signer.issue(namespace)
    }
}

/// Spawn the real server on an ephemeral port with a fresh in-memory store
pub async fn spawn_server() -> TestApi {
    spawn_server_with(test_config()).await
}

pub async fn spawn_server_with(config: ZoneConfig) -> TestApi {
    let store = ZoneStore::connect(&config)
        .await
        .expect("in-memory store connects");
    let signer = TokenSigner::new(&config.secret_key);
    let server = HttpServer::new(Arc::new(store), Arc::new(signer), config.clone());
    let app = server.router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port binds");
    let addr = listener.local_addr().expect("listener has an address");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestApi {
        addr,
        client: reqwest::Client::new(),
        signer: TokenSigner::new(&config.secret_key),
    }
}
