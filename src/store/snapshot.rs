use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{DomainOverride, ExitNode, Hostname, Resource, Site, Target};
use super::{HostnameRow, ResourceStore, Result, RouteQuery, RouteRow, StoreError};

/// 저장소의 특정 시점 스냅샷
///
/// 메모리에 올린 레코드 위에서 저장소의 조인 의미를 그대로 재현합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub exit_nodes: Vec<ExitNode>,
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub hostnames: Vec<Hostname>,
    #[serde(default)]
    pub domains: Vec<DomainOverride>,
}

impl Snapshot {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| StoreError::FileError {
            path: path_str.clone(),
            error: e,
        })?;

        serde_json::from_str(&content).map_err(|e| StoreError::ParseError {
            path: path_str,
            source: e,
        })
    }

    fn domain(&self, domain_id: Option<&str>) -> Option<DomainOverride> {
        let domain_id = domain_id?;
        self.domains.iter().find(|d| d.domain_id == domain_id).cloned()
    }

    fn select_route_rows(&self, query: &RouteQuery) -> Vec<RouteRow> {
        let sites: HashMap<i64, &Site> = self.sites
            .iter()
            .filter(|site| query.matches_site(site))
            .map(|site| (site.site_id, site))
            .collect();
        let resources: HashMap<i64, &Resource> = self.resources
            .iter()
            .filter(|resource| query.matches_resource(resource))
            .map(|resource| (resource.resource_id, resource))
            .collect();

        self.targets
            .iter()
            .filter(|target| target.enabled)
            .filter_map(|target| {
                let site = sites.get(&target.site_id?)?;
                let resource = resources.get(&target.resource_id)?;
                Some(RouteRow {
                    site: (*site).clone(),
                    target: target.clone(),
                    resource: (*resource).clone(),
                    domain: self.domain(resource.domain_id.as_deref()),
                })
            })
            .collect()
    }

    fn select_hostnames(&self, resource_ids: &[i64]) -> Vec<HostnameRow> {
        let wanted: HashSet<i64> = resource_ids.iter().copied().collect();
        self.hostnames
            .iter()
            .filter(|hostname| wanted.contains(&hostname.resource_id))
            .map(|hostname| HostnameRow {
                hostname: hostname.clone(),
                domain: self.domain(Some(&hostname.domain_id)),
            })
            .collect()
    }
}

#[async_trait]
impl ResourceStore for Snapshot {
    async fn exit_nodes(&self) -> Result<Vec<ExitNode>> {
        Ok(self.exit_nodes.clone())
    }

    async fn route_rows(&self, query: &RouteQuery) -> Result<Vec<RouteRow>> {
        Ok(self.select_route_rows(query))
    }

    async fn hostnames(&self, resource_ids: &[i64]) -> Result<Vec<HostnameRow>> {
        Ok(self.select_hostnames(resource_ids))
    }
}

/// 읽을 때마다 JSON 스냅샷 파일을 새로 불러오는 저장소
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Snapshot> {
        let snapshot = Snapshot::from_file(&self.path).await?;
        debug!(
            path = %self.path.display(),
            resources = snapshot.resources.len(),
            targets = snapshot.targets.len(),
            "스냅샷 로드"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl ResourceStore for FileSnapshotStore {
    async fn exit_nodes(&self) -> Result<Vec<ExitNode>> {
        Ok(self.load().await?.exit_nodes)
    }

    async fn route_rows(&self, query: &RouteQuery) -> Result<Vec<RouteRow>> {
        Ok(self.load().await?.select_route_rows(query))
    }

    async fn hostnames(&self, resource_ids: &[i64]) -> Result<Vec<HostnameRow>> {
        Ok(self.load().await?.select_hostnames(resource_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Protocol, SiteType};

    fn site(site_id: i64, exit_node_id: Option<i64>, site_type: SiteType) -> Site {
        Site { site_id, site_type, subnet: None, exit_node_id, online: true }
    }

    fn resource(resource_id: i64, protocol: Protocol) -> Resource {
        serde_json::from_value(serde_json::json!({
            "resourceId": resource_id,
            "protocol": protocol,
            "fullDomain": "app.example.com",
            "domainId": "d1",
        })).unwrap()
    }

    fn target(target_id: i64, resource_id: i64, site_id: i64) -> Target {
        Target {
            target_id,
            resource_id,
            site_id: Some(site_id),
            ip: Some("10.1.0.2".to_string()),
            port: Some(80),
            internal_port: None,
            method: Some("http".to_string()),
            enabled: true,
            path: None,
            path_match_type: None,
        }
    }

    fn query(exit_node_id: Option<i64>) -> RouteQuery {
        RouteQuery {
            exit_node_id,
            site_types: vec![SiteType::Local, SiteType::Wireguard, SiteType::Newt],
            allow_raw_resources: true,
        }
    }

    #[test]
    fn test_route_rows_filter_by_exit_node() {
        let snapshot = Snapshot {
            sites: vec![
                site(1, Some(7), SiteType::Newt),
                site(2, Some(8), SiteType::Newt),
                site(3, None, SiteType::Local),
            ],
            resources: vec![resource(10, Protocol::Http)],
            targets: vec![target(1, 10, 1), target(2, 10, 2), target(3, 10, 3)],
            domains: vec![DomainOverride {
                domain_id: "d1".to_string(),
                cert_resolver: Some("dns".to_string()),
                prefer_wildcard_cert: Some(true),
            }],
            ..Default::default()
        };

        let rows = snapshot.select_route_rows(&query(Some(7)));
        let ids: Vec<i64> = rows.iter().map(|r| r.target.target_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(rows[0].domain.as_ref().unwrap().cert_resolver.as_deref(), Some("dns"));

        // 노드를 찾지 못하면 노드가 지정되지 않은 사이트만 남습니다.
        let rows = snapshot.select_route_rows(&query(None));
        let ids: Vec<i64> = rows.iter().map(|r| r.target.target_id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_route_rows_protocol_gate_and_enablement() {
        let mut disabled = target(3, 10, 1);
        disabled.enabled = false;
        let snapshot = Snapshot {
            sites: vec![site(1, None, SiteType::Wireguard)],
            resources: vec![resource(10, Protocol::Http), resource(11, Protocol::Tcp)],
            targets: vec![target(1, 10, 1), target(2, 11, 1), disabled],
            ..Default::default()
        };

        let mut q = query(None);
        assert_eq!(snapshot.select_route_rows(&q).len(), 2);

        q.allow_raw_resources = false;
        let rows = snapshot.select_route_rows(&q);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resource.resource_id, 10);

        q.site_types = vec![SiteType::Newt];
        assert!(snapshot.select_route_rows(&q).is_empty());
    }

    #[tokio::test]
    async fn test_file_store_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("missing.json"));
        let result = store.exit_nodes().await;
        assert!(matches!(result, Err(StoreError::FileError { .. })));
    }

    #[tokio::test]
    async fn test_file_store_reads_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, r#"{
            "exitNodes": [{"exitNodeId": 1, "name": "edge-1"}],
            "hostnames": [{
                "resourceId": 4, "domainId": "d1", "subdomain": "app",
                "fullDomain": "app.example.com", "baseDomain": "example.com", "primary": true
            }]
        }"#).unwrap();

        let store = FileSnapshotStore::new(&path);
        assert_eq!(store.exit_nodes().await.unwrap()[0].name, "edge-1");
        let hostnames = store.hostnames(&[4, 5]).await.unwrap();
        assert_eq!(hostnames.len(), 1);
        assert!(hostnames[0].domain.is_none());
    }
}
