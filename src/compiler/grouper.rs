//! 조인 행을 (리소스, 경로, 매칭 방식) 단위의 컴파일 그룹으로 묶습니다.

use std::collections::{BTreeMap, HashMap};

use crate::model::{DomainOverride, Hostname, PathMatchType, Resource, Site, Target};
use crate::store::{HostnameRow, RouteRow};

const MAX_PATH_KEY_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTarget {
    pub target: Target,
    pub site: Site,
}

/// 라우터 하나와 서비스 하나로 컴파일되는 단위
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGroup {
    /// 생성되는 모든 이름의 접두사
    pub key: String,
    pub resource: Resource,
    pub path: Option<String>,
    pub path_match_type: Option<PathMatchType>,
    pub targets: Vec<GroupTarget>,
    pub hostnames: Vec<Hostname>,
    /// domainId → 도메인 설정
    pub domains: HashMap<String, DomainOverride>,
}

impl RouteGroup {
    fn new(key: String, resource: Resource, path: Option<String>, path_match_type: Option<PathMatchType>) -> Self {
        Self {
            key,
            resource,
            path,
            path_match_type,
            targets: Vec::new(),
            hostnames: Vec::new(),
            domains: HashMap::new(),
        }
    }

    pub fn domain(&self, domain_id: Option<&str>) -> Option<&DomainOverride> {
        domain_id.and_then(|id| self.domains.get(id))
    }

    /// 경로와 매칭 방식이 모두 있을 때만 경로 규칙을 붙입니다.
    pub fn path_rule(&self) -> Option<(&str, PathMatchType)> {
        match (self.path.as_deref(), self.path_match_type) {
            (Some(path), Some(kind)) => Some((path, kind)),
            _ => None,
        }
    }
}

/// 50자로 자른 뒤 영숫자만 남깁니다.
pub fn sanitize_path(path: &str) -> String {
    path.chars()
        .take(MAX_PATH_KEY_LEN)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

pub fn group_key(resource_id: i64, path: Option<&str>, path_match_type: Option<PathMatchType>) -> String {
    let mut parts = vec![resource_id.to_string()];
    if let Some(path) = path.map(sanitize_path).filter(|p| !p.is_empty()) {
        parts.push(path);
    }
    if let Some(kind) = path_match_type {
        parts.push(kind.as_str().to_string());
    }
    parts.join("-")
}

/// 타겟에 경로가 지정되어 있으면 타겟의 경로를, 아니면 리소스의 경로를 씁니다.
fn row_path(row: &RouteRow) -> (Option<String>, Option<PathMatchType>) {
    let (path, kind) = match row.target.path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => (Some(path), row.target.path_match_type),
        None => (row.resource.path.as_deref(), row.resource.path_match_type),
    };
    let path = path.filter(|p| !p.is_empty()).map(String::from);
    // 경로 없는 매칭 방식은 의미가 없습니다.
    let kind = path.as_ref().and(kind);
    (path, kind)
}

pub fn group_rows(rows: Vec<RouteRow>) -> BTreeMap<String, RouteGroup> {
    let mut groups: BTreeMap<String, RouteGroup> = BTreeMap::new();

    for row in rows {
        // raw 리소스는 경로 개념이 없습니다.
        let (path, kind) = if row.resource.protocol.is_http() {
            row_path(&row)
        } else {
            (None, None)
        };
        let key = group_key(row.resource.resource_id, path.as_deref(), kind);

        let group = groups
            .entry(key.clone())
            .or_insert_with(|| RouteGroup::new(key, row.resource.clone(), path, kind));

        if let Some(domain) = row.domain {
            group.domains.entry(domain.domain_id.clone()).or_insert(domain);
        }
        group.targets.push(GroupTarget {
            target: row.target,
            site: row.site,
        });
    }

    groups
}

/// 두 번째 배치 조회 결과를 각 그룹에 붙입니다.
pub fn attach_hostnames(groups: &mut BTreeMap<String, RouteGroup>, rows: &[HostnameRow]) {
    for group in groups.values_mut() {
        for row in rows.iter().filter(|r| r.hostname.resource_id == group.resource.resource_id) {
            group.hostnames.push(row.hostname.clone());
            if let Some(domain) = &row.domain {
                group.domains.entry(domain.domain_id.clone()).or_insert_with(|| domain.clone());
            }
        }
    }
}

/// 그룹에 포함된 리소스 ID (중복 제거, 정렬)
pub fn resource_ids(groups: &BTreeMap<String, RouteGroup>) -> Vec<i64> {
    let mut ids: Vec<i64> = groups.values().map(|g| g.resource.resource_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
