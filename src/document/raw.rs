use serde::Serialize;
use std::collections::BTreeMap;

/// `tcp` / `udp` 섹션
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawSection {
    pub routers: BTreeMap<String, RawRouter>,
    pub services: BTreeMap<String, RawService>,
}

/// UDP 라우터는 `rule`이 없습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRouter {
    pub entry_points: Vec<String>,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawService {
    pub load_balancer: RawLoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawLoadBalancer {
    pub servers: Vec<RawServer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky: Option<IpSticky>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawServer {
    pub address: String,
}

/// 소스 IP 기반 세션 고정
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpSticky {
    pub ip_strategy: IpStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpStrategy {
    pub depth: u32,
    pub source_port: bool,
}

impl IpSticky {
    pub fn source_ip() -> Self {
        Self {
            ip_strategy: IpStrategy { depth: 0, source_port: false },
        }
    }
}
