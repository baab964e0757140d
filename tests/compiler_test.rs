use traefik_config_compiler::{
    compiler::{CompileError, ConfigCompiler},
    model::{ExitNode, SiteType},
    settings::TraefikSettings,
    store::{FileSnapshotStore, HostnameRow, ResourceStore, RouteQuery, RouteRow, Snapshot, StoreError},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(value: Value) -> Snapshot {
        serde_json::from_value(value).unwrap()
    }

    async fn compile(settings: TraefikSettings, store: &dyn ResourceStore) -> Value {
        let compiler = ConfigCompiler::new(settings).unwrap();
        let config = compiler.compile(store).await.unwrap();
        serde_json::to_value(&config).unwrap()
    }

    // 두 호스트 이름, SSL, /api prefix 경로를 가진 HTTP 리소스
    fn multi_host_snapshot() -> Snapshot {
        snapshot(json!({
            "exitNodes": [{"exitNodeId": 1, "name": "edge-1"}],
            "sites": [
                {"siteId": 10, "type": "wireguard", "exitNodeId": 1, "online": true}
            ],
            "resources": [{
                "resourceId": 1,
                "protocol": "http",
                "ssl": true,
                "hostMode": "multi",
                "path": "/api",
                "pathMatchType": "prefix"
            }],
            "targets": [
                {"targetId": 1, "resourceId": 1, "siteId": 10, "ip": "10.1.0.2", "port": 8080, "method": "http"}
            ],
            "hostnames": [
                {"resourceId": 1, "domainId": "d1", "subdomain": "sub", "fullDomain": "sub.example.com", "baseDomain": "example.com", "primary": true},
                {"resourceId": 1, "domainId": "d1", "subdomain": "alt", "fullDomain": "alt.example.com", "baseDomain": "example.com"}
            ]
        }))
    }

    #[tokio::test]
    async fn test_multi_host_resource_with_path() {
        let doc = compile(TraefikSettings::default(), &multi_host_snapshot()).await;
        let routers = &doc["http"]["routers"];

        let main = &routers["1-api-prefix-router"];
        assert_eq!(
            main["rule"],
            "(Host(`sub.example.com`) || Host(`alt.example.com`)) && PathPrefix(`/api`)"
        );
        assert_eq!(main["priority"], 101);
        assert_eq!(main["entryPoints"], json!(["websecure"]));
        assert_eq!(main["middlewares"], json!(["badger"]));
        assert_eq!(main["tls"], json!({"certResolver": "letsencrypt"}));

        let redirect = &routers["1-api-prefix-router-redirect"];
        assert_eq!(redirect["priority"], 101);
        assert_eq!(redirect["entryPoints"], json!(["web"]));
        assert_eq!(redirect["middlewares"], json!(["redirect-to-https"]));
        assert_eq!(routers.as_object().unwrap().len(), 2);

        assert_eq!(
            doc["http"]["services"]["1-api-prefix-service"]["loadBalancer"]["servers"],
            json!([{"url": "http://10.1.0.2:8080"}])
        );
        assert_eq!(
            doc["http"]["middlewares"]["redirect-to-https"],
            json!({"redirectScheme": {"scheme": "https"}})
        );
        assert_eq!(
            doc["http"]["middlewares"]["badger"]["plugin"]["badger"]["apiBaseUrl"],
            "http://pangolin:3001/api/v1"
        );
        assert!(doc.get("tcp").is_none());
    }

    #[tokio::test]
    async fn test_tcp_resource_on_offline_newt_site() {
        let store = snapshot(json!({
            "exitNodes": [{"exitNodeId": 1, "name": "edge-1"}],
            "sites": [
                {"siteId": 20, "type": "newt", "subnet": "10.0.0.0/24", "exitNodeId": 1, "online": false}
            ],
            "resources": [
                {"resourceId": 2, "protocol": "tcp", "proxyPort": 5000, "enableProxy": true}
            ],
            "targets": [
                {"targetId": 5, "resourceId": 2, "siteId": 20, "ip": "localhost", "port": 22, "internalPort": 2222}
            ]
        }));

        let doc = compile(TraefikSettings::default(), &store).await;
        assert_eq!(doc, json!({
            "tcp": {
                "routers": {
                    "2-router": {"entryPoints": ["tcp-5000"], "service": "2-service", "rule": "HostSNI(`*`)"}
                },
                "services": {
                    "2-service": {"loadBalancer": {"servers": [{"address": "10.0.0.1:2222"}]}}
                }
            }
        }));
    }

    #[tokio::test]
    async fn test_empty_snapshot_compiles_to_empty_document() {
        let doc = compile(TraefikSettings::default(), &Snapshot::default()).await;
        assert_eq!(doc, json!({}));
    }

    #[tokio::test]
    async fn test_compilation_is_deterministic() {
        let store = multi_host_snapshot();
        let compiler = ConfigCompiler::new(TraefikSettings::default()).unwrap();

        let first = compiler.compile(&store).await.unwrap().to_json().unwrap();
        let second = compiler.compile(&store).await.unwrap().to_json().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_sites_on_other_exit_nodes_are_excluded() {
        let store = snapshot(json!({
            "exitNodes": [
                {"exitNodeId": 1, "name": "edge-1"},
                {"exitNodeId": 2, "name": "edge-2"}
            ],
            "sites": [
                {"siteId": 10, "type": "local", "exitNodeId": 1, "online": true},
                {"siteId": 11, "type": "local", "exitNodeId": 2, "online": true},
                {"siteId": 12, "type": "local", "online": true}
            ],
            "resources": [
                {"resourceId": 1, "protocol": "http", "fullDomain": "app.example.com"}
            ],
            "targets": [
                {"targetId": 1, "resourceId": 1, "siteId": 10, "ip": "10.0.0.1", "port": 80, "method": "http"},
                {"targetId": 2, "resourceId": 1, "siteId": 11, "ip": "10.0.0.2", "port": 80, "method": "http"},
                {"targetId": 3, "resourceId": 1, "siteId": 12, "ip": "10.0.0.3", "port": 80, "method": "http"}
            ]
        }));

        let settings = TraefikSettings {
            exit_node_name: Some("edge-2".to_string()),
            ..Default::default()
        };
        let doc = compile(settings, &store).await;
        assert_eq!(
            doc["http"]["services"]["1-service"]["loadBalancer"]["servers"],
            json!([{"url": "http://10.0.0.2:80"}, {"url": "http://10.0.0.3:80"}])
        );

        // 설정된 이름의 노드가 없으면 미지정 사이트만 남습니다.
        let settings = TraefikSettings {
            exit_node_name: Some("unknown".to_string()),
            ..Default::default()
        };
        let doc = compile(settings, &store).await;
        assert_eq!(
            doc["http"]["services"]["1-service"]["loadBalancer"]["servers"],
            json!([{"url": "http://10.0.0.3:80"}])
        );
        assert_eq!(doc["http"]["routers"]["1-router"]["rule"], "Host(`app.example.com`)");
        assert_eq!(doc["http"]["routers"]["1-router"]["priority"], 100);
    }

    #[tokio::test]
    async fn test_site_type_and_raw_resource_filters() {
        let store = snapshot(json!({
            "sites": [
                {"siteId": 1, "type": "local", "online": true},
                {"siteId": 2, "type": "newt", "subnet": "100.89.0.0/30", "online": true}
            ],
            "resources": [
                {"resourceId": 1, "protocol": "http", "fullDomain": "app.example.com"},
                {"resourceId": 2, "protocol": "udp", "proxyPort": 53, "enableProxy": true}
            ],
            "targets": [
                {"targetId": 1, "resourceId": 1, "siteId": 2, "internalPort": 3000, "method": "http"},
                {"targetId": 2, "resourceId": 2, "siteId": 1, "ip": "10.0.0.53", "port": 53}
            ]
        }));

        let settings = TraefikSettings {
            allow_raw_resources: false,
            site_types: vec![SiteType::Newt],
            ..Default::default()
        };
        let doc = compile(settings, &store).await;
        assert!(doc.get("udp").is_none());
        assert_eq!(
            doc["http"]["services"]["1-service"]["loadBalancer"]["servers"],
            json!([{"url": "http://100.89.0.1:3000"}])
        );

        let doc = compile(TraefikSettings::default(), &store).await;
        assert_eq!(
            doc["udp"]["services"]["2-service"]["loadBalancer"]["servers"],
            json!([{"address": "10.0.0.53:53"}])
        );
        assert_eq!(doc["udp"]["routers"]["2-router"]["entryPoints"], json!(["udp-53"]));
    }

    #[tokio::test]
    async fn test_redirect_mode_and_domain_overrides() {
        let store = snapshot(json!({
            "sites": [{"siteId": 1, "type": "local", "online": true}],
            "resources": [{
                "resourceId": 7,
                "protocol": "http",
                "ssl": true,
                "hostMode": "redirect",
                "stickySession": true
            }],
            "targets": [
                {"targetId": 1, "resourceId": 7, "siteId": 1, "ip": "10.0.0.7", "port": 443, "method": "https"}
            ],
            "hostnames": [
                {"resourceId": 7, "domainId": "d1", "subdomain": "www", "fullDomain": "www.example.com", "baseDomain": "example.com", "primary": true},
                {"resourceId": 7, "domainId": "d2", "fullDomain": "example.org", "baseDomain": "example.org"}
            ],
            "domains": [
                {"domainId": "d1", "certResolver": "dns", "preferWildcardCert": true}
            ]
        }));

        let doc = compile(TraefikSettings::default(), &store).await;
        let routers = &doc["http"]["routers"];

        assert_eq!(routers["7-router"]["rule"], "Host(`www.example.com`)");
        assert_eq!(
            routers["7-router"]["tls"],
            json!({"certResolver": "dns", "domains": [{"main": "*.example.com"}]})
        );

        let redirect = &routers["7-redirect-example-org-router"];
        assert_eq!(redirect["rule"], "Host(`example.org`)");
        assert_eq!(redirect["priority"], 90);
        assert_eq!(redirect["tls"], json!({"certResolver": "letsencrypt"}));
        assert_eq!(
            doc["http"]["middlewares"]["7-redirect-example-org"]["redirectRegex"],
            json!({
                "regex": "^https?://example\\.org/(.*)",
                "replacement": "https://www.example.com/${1}",
                "permanent": true
            })
        );
        assert_eq!(
            doc["http"]["services"]["7-service"]["loadBalancer"]["sticky"],
            json!({"cookie": {"name": "p_sticky", "secure": true, "httpOnly": true}})
        );
    }

    #[tokio::test]
    async fn test_file_store_reads_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{}").unwrap();

        let store = FileSnapshotStore::new(&path);
        let compiler = ConfigCompiler::new(TraefikSettings::default()).unwrap();
        assert!(compiler.compile(&store).await.unwrap().is_empty());

        std::fs::write(&path, serde_json::to_string(&multi_host_snapshot()).unwrap()).unwrap();
        let config = compiler.compile(&store).await.unwrap();
        assert!(config.http.unwrap().routers.contains_key("1-api-prefix-router"));
    }

    #[tokio::test]
    async fn test_missing_snapshot_file_fails_compilation() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("missing.json"));
        let compiler = ConfigCompiler::new(TraefikSettings::default()).unwrap();

        let err = compiler.compile(&store).await.unwrap_err();
        assert!(matches!(
            err,
            CompileError::Store { source: StoreError::FileError { .. }, .. }
        ));
    }

    struct SlowStore;

    #[async_trait]
    impl ResourceStore for SlowStore {
        async fn exit_nodes(&self) -> Result<Vec<ExitNode>, StoreError> {
            Ok(Vec::new())
        }

        async fn route_rows(&self, _query: &RouteQuery) -> Result<Vec<RouteRow>, StoreError> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(Vec::new())
        }

        async fn hostnames(&self, _resource_ids: &[i64]) -> Result<Vec<HostnameRow>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let settings = TraefikSettings {
            read_timeout_ms: 20,
            ..Default::default()
        };
        let compiler = ConfigCompiler::new(settings).unwrap();

        let err = compiler.compile(&SlowStore).await.unwrap_err();
        assert!(matches!(err, CompileError::Timeout { operation: "route_rows", .. }));
    }
}
