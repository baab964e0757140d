//! 가용성을 고려한 백엔드 주소 선택

use std::net::{IpAddr, SocketAddr};

use ipnet::IpNet;
use tracing::{debug, warn};

use crate::model::SiteType;
use super::grouper::GroupTarget;

/// 주소 형식을 결정하는 서비스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// `{method}://{ip}:{port}`
    Http,
    /// `{ip}:{port}`
    Raw,
}

/// 그룹의 타겟에서 중복 없는 백엔드 주소 목록을 계산합니다.
///
/// 온라인 사이트가 하나라도 있으면 오프라인 사이트의 타겟은 제외하지만,
/// 모두 오프라인이면 유효한 타겟을 전부 유지합니다.
pub fn select_backends(targets: &[GroupTarget], kind: BackendKind) -> Vec<String> {
    let any_site_online = targets.iter().any(|t| t.site.online);
    let mut addresses: Vec<String> = Vec::with_capacity(targets.len());

    for candidate in targets {
        let target = &candidate.target;
        if !target.enabled {
            continue;
        }
        if any_site_online && !candidate.site.online {
            debug!(
                target_id = target.target_id,
                site_id = candidate.site.site_id,
                "오프라인 사이트 타겟 제외"
            );
            continue;
        }

        let Some(address) = backend_address(candidate, kind) else {
            debug!(
                target_id = target.target_id,
                site_type = candidate.site.site_type.as_str(),
                "연결 정보가 부족한 타겟 제외"
            );
            continue;
        };

        if !addresses.contains(&address) {
            addresses.push(address);
        }
    }

    addresses
}

fn backend_address(candidate: &GroupTarget, kind: BackendKind) -> Option<String> {
    let target = &candidate.target;
    let method = match kind {
        BackendKind::Http => Some(target.method.as_deref().filter(|m| !m.is_empty())?),
        BackendKind::Raw => None,
    };

    let host_port = match candidate.site.site_type {
        SiteType::Local | SiteType::Wireguard => {
            let ip = target.ip.as_deref().filter(|ip| !ip.is_empty())?;
            format!("{}:{}", ip, target.port?)
        }
        SiteType::Newt => {
            let port = target.internal_port?;
            let subnet = candidate.site.subnet.as_deref()?;
            SocketAddr::new(first_address(subnet, candidate.site.site_id)?, port).to_string()
        }
    };

    Some(match method {
        Some(method) => format!("{}://{}", method, host_port),
        None => host_port,
    })
}

/// CIDR의 첫 번째 호스트 주소 (`10.0.0.0/24` → `10.0.0.1`)
fn first_address(subnet: &str, site_id: i64) -> Option<IpAddr> {
    let net: IpNet = match subnet.trim().parse() {
        Ok(net) => net,
        Err(e) => {
            warn!(site_id = site_id, subnet = %subnet, error = %e, "사이트 서브넷 파싱 실패");
            return None;
        }
    };
    net.hosts().next()
}
