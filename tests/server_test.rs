use traefik_config_compiler::{
    compiler::ConfigCompiler,
    server::{RequestHandler, ServerListener, TRAEFIK_CONFIG_PATH},
    settings::{ServerSettings, TraefikSettings},
    store::{FileSnapshotStore, ResourceStore},
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

#[cfg(test)]
mod tests {
    use super::*;

    async fn start_server(snapshot_path: &Path) -> SocketAddr {
        let settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let listener = ServerListener::bind(&settings).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let store: Arc<dyn ResourceStore> = Arc::new(FileSnapshotStore::new(snapshot_path));
        let compiler = Arc::new(ConfigCompiler::new(TraefikSettings::default()).unwrap());
        let handler = Arc::new(RequestHandler::new(compiler, store));

        tokio::spawn(async move {
            let _ = listener.run(handler).await;
        });
        addr
    }

    #[tokio::test]
    async fn test_serves_compiled_config() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot.json");
        std::fs::write(&snapshot_path, json!({
            "sites": [{"siteId": 1, "type": "local", "online": true}],
            "resources": [{"resourceId": 3, "protocol": "http", "fullDomain": "app.example.com"}],
            "targets": [
                {"targetId": 1, "resourceId": 3, "siteId": 1, "ip": "10.0.0.3", "port": 3000, "method": "http"}
            ]
        }).to_string()).unwrap();

        let addr = start_server(&snapshot_path).await;
        let response = reqwest::get(format!("http://{}{}", addr, TRAEFIK_CONFIG_PATH))
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["http"]["routers"]["3-router"]["rule"], "Host(`app.example.com`)");
        assert_eq!(body["http"]["routers"]["3-router"]["entryPoints"], json!(["web"]));
        assert_eq!(
            body["http"]["services"]["3-service"]["loadBalancer"]["servers"],
            json!([{"url": "http://10.0.0.3:3000"}])
        );
    }

    #[tokio::test]
    async fn test_broken_snapshot_returns_500() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("snapshot.json");
        std::fs::write(&snapshot_path, "{ not json").unwrap();

        let addr = start_server(&snapshot_path).await;
        let response = reqwest::get(format!("http://{}{}", addr, TRAEFIK_CONFIG_PATH))
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let dir = tempfile::tempdir().unwrap();
        let addr = start_server(&dir.path().join("snapshot.json")).await;
        let client = reqwest::Client::new();

        let response = client.get(format!("http://{}/health", addr)).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let response = client
            .post(format!("http://{}{}", addr, TRAEFIK_CONFIG_PATH))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    }
}
