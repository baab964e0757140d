//! 엣지 프록시가 소비하는 Traefik 동적 설정 문서
//!
//! 각 프로토콜 섹션과 하위 맵은 실제로 내용이 들어올 때만 생성됩니다.
//! 맵은 모두 `BTreeMap`이므로 같은 스냅샷에서는 항상 같은 문서가 나옵니다.

mod http;
mod raw;

pub use http::{
    CookieSticky, HeadersMiddleware, HttpLoadBalancer, HttpRouter, HttpSection, HttpServer,
    HttpService, Middleware, RedirectRegex, RedirectScheme, RouterTls, ServersTransport,
    StickyCookie, TlsDomain,
};
pub use raw::{IpSticky, IpStrategy, RawLoadBalancer, RawRouter, RawSection, RawServer, RawService};

use serde::Serialize;

use crate::model::Protocol;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DynamicConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp: Option<RawSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<RawSection>,
}

impl DynamicConfig {
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.tcp.is_none() && self.udp.is_none()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// 컴파일러 출력을 모아 `DynamicConfig`를 만드는 빌더
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    config: DynamicConfig,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn http(&mut self) -> &mut HttpSection {
        self.config.http.get_or_insert_with(HttpSection::default)
    }

    fn raw(&mut self, protocol: Protocol) -> Option<&mut RawSection> {
        match protocol {
            Protocol::Tcp => Some(self.config.tcp.get_or_insert_with(RawSection::default)),
            Protocol::Udp => Some(self.config.udp.get_or_insert_with(RawSection::default)),
            Protocol::Http => None,
        }
    }

    pub fn add_http_router(&mut self, name: String, router: HttpRouter) {
        self.http().routers.insert(name, router);
    }

    pub fn add_http_service(&mut self, name: String, service: HttpService) {
        self.http().services.insert(name, service);
    }

    pub fn add_middleware(&mut self, name: String, middleware: Middleware) {
        self.http()
            .middlewares
            .get_or_insert_with(Default::default)
            .insert(name, middleware);
    }

    /// 공유 미들웨어처럼 한 번만 만들어야 하는 항목을 위한 헬퍼
    pub fn ensure_middleware<F>(&mut self, name: &str, make: F)
    where
        F: FnOnce() -> Middleware,
    {
        let middlewares = self.http().middlewares.get_or_insert_with(Default::default);
        if !middlewares.contains_key(name) {
            middlewares.insert(name.to_string(), make());
        }
    }

    pub fn add_servers_transport(&mut self, name: String, transport: ServersTransport) {
        self.http()
            .servers_transports
            .get_or_insert_with(Default::default)
            .insert(name, transport);
    }

    /// tcp/udp 라우터와 서비스를 함께 등록합니다. http 프로토콜은 무시됩니다.
    pub fn add_raw_route(
        &mut self,
        protocol: Protocol,
        router_name: String,
        router: RawRouter,
        service_name: String,
        service: RawService,
    ) {
        if let Some(section) = self.raw(protocol) {
            section.routers.insert(router_name, router);
            section.services.insert(service_name, service);
        }
    }

    pub fn build(self) -> DynamicConfig {
        self.config
    }
}
