use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// `http` 섹션
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSection {
    pub routers: BTreeMap<String, HttpRouter>,
    pub services: BTreeMap<String, HttpService>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middlewares: Option<BTreeMap<String, Middleware>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers_transports: Option<BTreeMap<String, ServersTransport>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRouter {
    pub entry_points: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<String>,
    pub service: String,
    pub rule: String,
    pub priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<RouterTls>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterTls {
    pub cert_resolver: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<TlsDomain>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsDomain {
    pub main: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpService {
    pub load_balancer: HttpLoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpLoadBalancer {
    pub servers: Vec<HttpServer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky: Option<CookieSticky>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers_transport: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpServer {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CookieSticky {
    pub cookie: StickyCookie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyCookie {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServersTransport {
    pub server_name: String,
    pub insecure_skip_verify: bool,
}

/// Traefik 미들웨어. 변형 이름이 그대로 미들웨어 종류 키가 됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Middleware {
    RedirectRegex(RedirectRegex),
    RedirectScheme(RedirectScheme),
    Headers(HeadersMiddleware),
    Plugin(BTreeMap<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedirectRegex {
    pub regex: String,
    pub replacement: String,
    pub permanent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedirectScheme {
    pub scheme: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadersMiddleware {
    pub custom_request_headers: BTreeMap<String, String>,
}
