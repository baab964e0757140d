//! 리소스 저장소 경계
//!
//! 컴파일러는 이 트레이트를 통해서만 외부 저장소를 읽습니다. 관계형 저장소와
//! CRUD 계층은 이 크레이트 밖에 있으며, 여기서는 조인 결과의 모양만 정의합니다.

mod error;
mod snapshot;

pub use error::StoreError;
pub use snapshot::{FileSnapshotStore, Snapshot};

use async_trait::async_trait;

use crate::model::{DomainOverride, ExitNode, Hostname, Resource, Site, SiteType, Target};

pub type Result<T> = std::result::Result<T, StoreError>;

/// 라우트 행 조회 조건
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    /// `site.exitNodeId = exit_node_id OR site.exitNodeId IS NULL`
    pub exit_node_id: Option<i64>,
    pub site_types: Vec<SiteType>,
    /// false면 http 리소스만 조회
    pub allow_raw_resources: bool,
}

impl RouteQuery {
    /// 사이트가 이 조회 조건의 노드/타입 필터를 통과하는지 확인합니다.
    pub fn matches_site(&self, site: &Site) -> bool {
        let node_visible = match site.exit_node_id {
            None => true,
            Some(id) => self.exit_node_id == Some(id),
        };
        node_visible && self.site_types.contains(&site.site_type)
    }

    pub fn matches_resource(&self, resource: &Resource) -> bool {
        resource.enabled && (resource.protocol.is_http() || self.allow_raw_resources)
    }
}

/// 사이트 → 타겟 → 리소스 조인 결과 한 행
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub site: Site,
    pub target: Target,
    pub resource: Resource,
    /// 리소스 레거시 `domainId`의 도메인 설정 (left join)
    pub domain: Option<DomainOverride>,
}

/// 호스트 이름과 해당 도메인 설정 (left join)
#[derive(Debug, Clone, PartialEq)]
pub struct HostnameRow {
    pub hostname: Hostname,
    pub domain: Option<DomainOverride>,
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// 등록된 엣지 프록시 노드 목록
    async fn exit_nodes(&self) -> Result<Vec<ExitNode>>;

    /// 조건에 맞는 활성 타겟/리소스 조인 행을 한 번에 읽습니다.
    async fn route_rows(&self, query: &RouteQuery) -> Result<Vec<RouteRow>>;

    /// 주어진 리소스들의 호스트 이름을 한 번에 읽습니다.
    async fn hostnames(&self, resource_ids: &[i64]) -> Result<Vec<HostnameRow>>;
}
