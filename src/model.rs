//! 컴파일러가 읽어 들이는 스냅샷 레코드 정의
//!
//! 모든 레코드는 외부 저장소가 소유하며, 컴파일러는 요청마다 한 번 읽기만 합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 리소스 프로토콜
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Tcp,
    Udp,
}

impl Protocol {
    pub fn is_http(&self) -> bool {
        matches!(self, Protocol::Http)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 여러 호스트 이름을 다루는 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMode {
    #[default]
    Multi,
    Redirect,
}

/// 경로 매칭 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMatchType {
    Exact,
    Prefix,
    Regex,
}

impl PathMatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathMatchType::Exact => "exact",
            PathMatchType::Prefix => "prefix",
            PathMatchType::Regex => "regex",
        }
    }

    /// Traefik 규칙 언어의 경로 매처 이름
    pub fn rule_matcher(&self) -> &'static str {
        match self {
            PathMatchType::Exact => "Path",
            PathMatchType::Prefix => "PathPrefix",
            PathMatchType::Regex => "PathRegexp",
        }
    }
}

/// 사이트 연결 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteType {
    Local,
    Wireguard,
    Newt,
}

impl SiteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteType::Local => "local",
            SiteType::Wireguard => "wireguard",
            SiteType::Newt => "newt",
        }
    }
}

impl std::str::FromStr for SiteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(SiteType::Local),
            "wireguard" => Ok(SiteType::Wireguard),
            "newt" => Ok(SiteType::Newt),
            _ => Err(format!("Invalid site type: {}", s)),
        }
    }
}

/// 프록시를 통해 공개되는 서비스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub resource_id: i64,
    #[serde(default)]
    pub name: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub host_mode: HostMode,
    #[serde(default)]
    pub sticky_session: bool,
    pub tls_server_name: Option<String>,
    pub set_host_header: Option<String>,
    /// `[{"name": ..., "value": ...}]` 형식의 직렬화된 헤더 목록
    pub headers: Option<String>,
    pub proxy_port: Option<u16>,
    #[serde(default)]
    pub enable_proxy: bool,
    pub path: Option<String>,
    pub path_match_type: Option<PathMatchType>,
    // 레거시 단일 도메인 필드
    pub full_domain: Option<String>,
    pub subdomain: Option<String>,
    pub domain_id: Option<String>,
}

/// 리소스에 연결된 정규화된 호스트 이름
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hostname {
    pub resource_id: i64,
    pub domain_id: String,
    pub subdomain: Option<String>,
    pub full_domain: String,
    pub base_domain: String,
    #[serde(default)]
    pub primary: bool,
}

/// 리소스의 백엔드 인스턴스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub target_id: i64,
    pub resource_id: i64,
    pub site_id: Option<i64>,
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub internal_port: Option<u16>,
    pub method: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 지정되면 리소스 경로 대신 이 경로로 그룹이 나뉩니다.
    pub path: Option<String>,
    pub path_match_type: Option<PathMatchType>,
}

/// 타겟이 위치한 네트워크 지점
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub site_id: i64,
    #[serde(rename = "type")]
    pub site_type: SiteType,
    pub subnet: Option<String>,
    pub exit_node_id: Option<i64>,
    #[serde(default)]
    pub online: bool,
}

/// 도메인별 인증서 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainOverride {
    pub domain_id: String,
    pub cert_resolver: Option<String>,
    pub prefer_wildcard_cert: Option<bool>,
}

/// 설정 문서를 받아 가는 엣지 프록시 인스턴스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitNode {
    pub exit_node_id: i64,
    pub name: String,
}

fn default_true() -> bool {
    true
}
