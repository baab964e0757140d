//! 레거시 단일 도메인 필드와 정규화된 호스트 이름 목록을 하나의 목록으로 합칩니다.

use crate::model::{Hostname, Resource};

/// 컴파일러 내부에서 쓰는 단일 호스트 이름 표현
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameEntry {
    pub full_domain: String,
    pub base_domain: String,
    pub subdomain: Option<String>,
    pub domain_id: Option<String>,
    pub primary: bool,
}

impl HostnameEntry {
    /// 서브도메인이 있고 베이스 도메인과 다른 경우에만 true
    pub fn has_subdomain(&self) -> bool {
        let has_label = self.subdomain.as_deref().map_or(false, |s| !s.is_empty());
        has_label && self.full_domain != self.base_domain
    }

    fn from_hostname(hostname: &Hostname) -> Self {
        Self {
            full_domain: hostname.full_domain.clone(),
            base_domain: hostname.base_domain.clone(),
            subdomain: hostname.subdomain.clone(),
            domain_id: Some(hostname.domain_id.clone()),
            primary: hostname.primary,
        }
    }

    fn from_legacy(resource: &Resource, full_domain: &str) -> Self {
        let subdomain = resource.subdomain.clone().filter(|s| !s.is_empty());
        let base_domain = subdomain
            .as_deref()
            .and_then(|sub| full_domain.strip_prefix(sub))
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(full_domain)
            .to_string();

        Self {
            full_domain: full_domain.to_string(),
            base_domain,
            subdomain,
            domain_id: resource.domain_id.clone(),
            primary: true,
        }
    }
}

/// 도메인이 하나 이상 확인된 리소스의 호스트 이름 집합
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHostnames {
    entries: Vec<HostnameEntry>,
    primary_index: usize,
}

impl ResolvedHostnames {
    pub fn entries(&self) -> &[HostnameEntry] {
        &self.entries
    }

    pub fn primary(&self) -> &HostnameEntry {
        &self.entries[self.primary_index]
    }

    pub fn primary_domain(&self) -> &str {
        &self.primary().full_domain
    }

    pub fn non_primary(&self) -> impl Iterator<Item = &HostnameEntry> {
        let primary = self.primary_index;
        self.entries
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != primary)
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 정규화 목록을 우선 사용하고, 비어 있으면 레거시 `fullDomain`을 primary로 씁니다.
/// 같은 도메인이 여러 번 나오면 처음 것만 남깁니다.
pub fn normalize(resource: &Resource, hostnames: &[Hostname]) -> Vec<HostnameEntry> {
    let mut entries: Vec<HostnameEntry> = Vec::with_capacity(hostnames.len().max(1));

    for hostname in hostnames.iter().filter(|h| !h.full_domain.trim().is_empty()) {
        if entries.iter().all(|e| e.full_domain != hostname.full_domain) {
            entries.push(HostnameEntry::from_hostname(hostname));
        }
    }

    if entries.is_empty() {
        if let Some(full_domain) = resource.full_domain.as_deref().filter(|d| !d.trim().is_empty()) {
            entries.push(HostnameEntry::from_legacy(resource, full_domain));
        }
    }

    entries
}

/// primary 도메인 = primary 표시 항목, 없으면 첫 항목.
/// 라우팅할 도메인이 하나도 없으면 `None`.
pub fn resolve(resource: &Resource, hostnames: &[Hostname]) -> Option<ResolvedHostnames> {
    let entries = normalize(resource, hostnames);
    if entries.is_empty() {
        return None;
    }

    let primary_index = entries.iter().position(|e| e.primary).unwrap_or(0);
    Some(ResolvedHostnames { entries, primary_index })
}
