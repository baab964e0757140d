//! TCP/UDP 리소스 → 전용 엔트리포인트 라우터와 서비스

use tracing::{debug, warn};

use crate::document::{
    DocumentBuilder, IpSticky, RawLoadBalancer, RawRouter, RawServer, RawService,
};
use crate::model::Protocol;
use crate::settings::TraefikSettings;
use super::backend::{select_backends, BackendKind};
use super::grouper::RouteGroup;

/// TCP 라우터는 TLS 없이 모든 연결을 받습니다.
const TCP_CATCH_ALL_RULE: &str = "HostSNI(`*`)";

pub struct RawCompiler<'a> {
    settings: &'a TraefikSettings,
}

impl<'a> RawCompiler<'a> {
    pub fn new(settings: &'a TraefikSettings) -> Self {
        Self { settings }
    }

    /// 그룹을 문서에 추가합니다. 건너뛴 경우 false를 돌려줍니다.
    pub fn compile(&self, group: &RouteGroup, builder: &mut DocumentBuilder) -> bool {
        let resource = &group.resource;
        if resource.protocol.is_http() || !resource.enabled {
            return false;
        }
        if !self.settings.allow_raw_resources {
            debug!(group = %group.key, "raw 리소스 비활성화, 건너뜀");
            return false;
        }
        if !resource.enable_proxy {
            debug!(group = %group.key, "프록시가 꺼진 리소스, 건너뜀");
            return false;
        }
        let Some(proxy_port) = resource.proxy_port else {
            warn!(
                group = %group.key,
                resource_id = resource.resource_id,
                "프록시 포트가 없어 그룹을 건너뜀"
            );
            return false;
        };

        let protocol = resource.protocol;
        let entry_point = format!("{}-{}", protocol.as_str(), proxy_port);
        let router_name = format!("{}-router", group.key);
        let service_name = format!("{}-service", group.key);

        let servers: Vec<RawServer> = select_backends(&group.targets, BackendKind::Raw)
            .into_iter()
            .map(|address| RawServer { address })
            .collect();
        if servers.is_empty() {
            warn!(group = %group.key, "사용 가능한 백엔드가 없음");
        }

        let router = RawRouter {
            entry_points: vec![entry_point.clone()],
            service: service_name.clone(),
            rule: (protocol == Protocol::Tcp).then(|| TCP_CATCH_ALL_RULE.to_string()),
        };
        let service = RawService {
            load_balancer: RawLoadBalancer {
                servers,
                sticky: resource.sticky_session.then(IpSticky::source_ip),
            },
        };

        builder.add_raw_route(protocol, router_name, router, service_name, service);

        debug!(
            group = %group.key,
            protocol = %protocol,
            entry_point = %entry_point,
            "raw 라우터 생성"
        );
        true
    }
}
