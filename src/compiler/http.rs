//! HTTP 리소스 → 라우터/서비스/미들웨어/전송 설정

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::document::{
    CookieSticky, DocumentBuilder, HeadersMiddleware, HttpLoadBalancer, HttpRouter, HttpServer,
    HttpService, Middleware, RedirectRegex, RedirectScheme, RouterTls, ServersTransport,
    StickyCookie,
};
use crate::model::HostMode;
use crate::settings::TraefikSettings;
use super::backend::{select_backends, BackendKind};
use super::grouper::RouteGroup;
use super::hostname::{self, HostnameEntry, ResolvedHostnames};
use super::tls::CertPolicy;

pub const REDIRECT_TO_HTTPS_MIDDLEWARE: &str = "redirect-to-https";

const ROUTER_PRIORITY: u32 = 100;
const PATH_ROUTER_PRIORITY: u32 = 101;
const REDIRECT_DOMAIN_PRIORITY: u32 = 90;

/// 그룹 키에서 파생되는 이름들
struct RouteNames<'a> {
    key: &'a str,
}

impl<'a> RouteNames<'a> {
    fn router(&self) -> String {
        format!("{}-router", self.key)
    }

    fn https_redirect_router(&self) -> String {
        format!("{}-router-redirect", self.key)
    }

    fn service(&self) -> String {
        format!("{}-service", self.key)
    }

    fn transport(&self) -> String {
        format!("{}-transport", self.key)
    }

    fn headers_middleware(&self) -> String {
        format!("{}-headers-middleware", self.key)
    }

    fn domain_redirect_middleware(&self, domain: &str) -> String {
        format!("{}-redirect-{}", self.key, sanitize_domain(domain))
    }

    fn domain_redirect_router(&self, domain: &str) -> String {
        format!("{}-redirect-{}-router", self.key, sanitize_domain(domain))
    }
}

/// 도메인을 이름에 쓸 수 있는 형태로 바꿉니다.
///
/// `.`은 `-`가 되고, 영숫자와 `.` 이외의 문자는 `_{코드포인트 hex}_`로 바뀝니다
/// (`a-b.example.com` → `a_2d_b-example-com`). 서로 다른 도메인은 항상 다른 이름이 됩니다.
fn sanitize_domain(domain: &str) -> String {
    let mut sanitized = String::with_capacity(domain.len());
    for c in domain.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => sanitized.push(c),
            '.' => sanitized.push('-'),
            other => sanitized.push_str(&format!("_{:x}_", other as u32)),
        }
    }
    sanitized
}

#[derive(Debug, Deserialize)]
struct HeaderEntry {
    name: String,
    value: String,
}

/// 직렬화된 헤더 목록을 파싱합니다. 실패하면 경고 후 빈 목록으로 취급합니다.
fn parse_headers(resource_id: i64, raw: Option<&str>) -> Vec<HeaderEntry> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Option<Vec<HeaderEntry>>>(raw) {
        Ok(headers) => headers.unwrap_or_default(),
        Err(e) => {
            warn!(resource_id = resource_id, error = %e, "헤더 설정 파싱 실패, 빈 헤더로 처리");
            Vec::new()
        }
    }
}

fn host_rule(entries: &[&HostnameEntry]) -> String {
    let hosts: Vec<String> = entries
        .iter()
        .map(|e| format!("Host(`{}`)", e.full_domain))
        .collect();
    hosts.join(" || ")
}

pub struct HttpCompiler<'a> {
    settings: &'a TraefikSettings,
    auth_plugin: &'a Value,
}

impl<'a> HttpCompiler<'a> {
    /// `auth_plugin`은 인증 플러그인의 설정 값입니다.
    pub fn new(settings: &'a TraefikSettings, auth_plugin: &'a Value) -> Self {
        Self { settings, auth_plugin }
    }

    /// 그룹을 문서에 추가합니다. 건너뛴 경우 false를 돌려줍니다.
    pub fn compile(&self, group: &RouteGroup, builder: &mut DocumentBuilder) -> bool {
        let resource = &group.resource;
        if !resource.protocol.is_http() || !resource.enabled {
            return false;
        }

        let Some(hostnames) = hostname::resolve(resource, &group.hostnames) else {
            warn!(
                group = %group.key,
                resource_id = resource.resource_id,
                "라우팅할 도메인이 없어 그룹을 건너뜀"
            );
            return false;
        };

        let names = RouteNames { key: &group.key };
        let service_name = names.service();

        let routed: Vec<&HostnameEntry> =
            if resource.host_mode == HostMode::Redirect && hostnames.len() > 1 {
                for entry in hostnames.non_primary() {
                    self.add_domain_redirect(group, &names, entry, &hostnames, &service_name, builder);
                }
                vec![hostnames.primary()]
            } else {
                hostnames.entries().iter().collect()
            };

        let mut rule = host_rule(&routed);
        let priority = match group.path_rule() {
            Some((path, kind)) => {
                if routed.len() > 1 {
                    rule = format!("({})", rule);
                }
                rule = format!("{} && {}(`{}`)", rule, kind.rule_matcher(), path);
                PATH_ROUTER_PRIORITY
            }
            None => ROUTER_PRIORITY,
        };

        let middlewares = self.router_middlewares(group, &names, builder);
        let tls = resource.ssl.then(|| self.main_router_tls(group, &hostnames, &routed));

        builder.add_http_router(names.router(), HttpRouter {
            entry_points: vec![self.entry_point(resource.ssl)],
            middlewares,
            service: service_name.clone(),
            rule: rule.clone(),
            priority,
            tls,
        });

        if resource.ssl {
            self.add_https_redirect(names.https_redirect_router(), rule, priority, &service_name, builder);
        }

        let service = self.service(group, &names, builder);
        builder.add_http_service(service_name, service);

        debug!(
            group = %group.key,
            primary_domain = %hostnames.primary_domain(),
            domains = routed.len(),
            priority = priority,
            "HTTP 라우터 생성"
        );
        true
    }

    fn entry_point(&self, ssl: bool) -> String {
        if ssl {
            self.settings.https_entrypoint.clone()
        } else {
            self.settings.http_entrypoint.clone()
        }
    }

    /// 인증 미들웨어 → 전역 추가 미들웨어 → 헤더 미들웨어 순서
    fn router_middlewares(
        &self,
        group: &RouteGroup,
        names: &RouteNames<'_>,
        builder: &mut DocumentBuilder,
    ) -> Vec<String> {
        let auth_name = &self.settings.auth.middleware_name;
        builder.ensure_middleware(auth_name, || {
            let mut plugin = BTreeMap::new();
            plugin.insert(auth_name.clone(), self.auth_plugin.clone());
            Middleware::Plugin(plugin)
        });

        let mut middlewares = vec![auth_name.clone()];
        middlewares.extend(self.settings.additional_middlewares.iter().cloned());

        let resource = &group.resource;
        let mut custom_headers: BTreeMap<String, String> =
            parse_headers(resource.resource_id, resource.headers.as_deref())
                .into_iter()
                .map(|h| (h.name, h.value))
                .collect();
        if let Some(host) = resource.set_host_header.as_deref().filter(|h| !h.is_empty()) {
            custom_headers.insert("Host".to_string(), host.to_string());
        }

        if !custom_headers.is_empty() {
            let name = names.headers_middleware();
            builder.add_middleware(name.clone(), Middleware::Headers(HeadersMiddleware {
                custom_request_headers: custom_headers,
            }));
            middlewares.push(name);
        }

        middlewares
    }

    /// 리소스 `domainId`, 없으면 첫 호스트 이름의 `domainId` 기준 정책
    fn main_router_tls(
        &self,
        group: &RouteGroup,
        hostnames: &ResolvedHostnames,
        routed: &[&HostnameEntry],
    ) -> RouterTls {
        let domain_id = group.resource.domain_id.as_deref()
            .or_else(|| hostnames.entries().first().and_then(|e| e.domain_id.as_deref()));
        CertPolicy::resolve(self.settings, group.domain(domain_id))
            .router_tls(routed.iter().copied())
    }

    fn add_domain_redirect(
        &self,
        group: &RouteGroup,
        names: &RouteNames<'_>,
        entry: &HostnameEntry,
        hostnames: &ResolvedHostnames,
        service_name: &str,
        builder: &mut DocumentBuilder,
    ) {
        let resource = &group.resource;
        let scheme = if resource.ssl { "https" } else { "http" };
        let middleware_name = names.domain_redirect_middleware(&entry.full_domain);

        builder.add_middleware(middleware_name.clone(), Middleware::RedirectRegex(RedirectRegex {
            regex: format!("^https?://{}/(.*)", regex_lite::escape(&entry.full_domain)),
            replacement: format!("{}://{}/${{1}}", scheme, hostnames.primary_domain()),
            permanent: true,
        }));

        let rule = format!("Host(`{}`)", entry.full_domain);
        let tls = resource.ssl.then(|| {
            let domain_id = entry.domain_id.as_deref().or(resource.domain_id.as_deref());
            CertPolicy::resolve(self.settings, group.domain(domain_id)).router_tls([entry])
        });

        builder.add_http_router(names.domain_redirect_router(&entry.full_domain), HttpRouter {
            entry_points: vec![self.entry_point(resource.ssl)],
            middlewares: vec![middleware_name],
            service: service_name.to_string(),
            rule: rule.clone(),
            priority: REDIRECT_DOMAIN_PRIORITY,
            tls,
        });

        if resource.ssl {
            let router_name = format!("{}-redirect", names.domain_redirect_router(&entry.full_domain));
            self.add_https_redirect(router_name, rule, REDIRECT_DOMAIN_PRIORITY, service_name, builder);
        }

        debug!(
            group = %group.key,
            from = %entry.full_domain,
            to = %hostnames.primary_domain(),
            "도메인 리다이렉트 라우터 생성"
        );
    }

    fn add_https_redirect(
        &self,
        router_name: String,
        rule: String,
        priority: u32,
        service_name: &str,
        builder: &mut DocumentBuilder,
    ) {
        builder.ensure_middleware(REDIRECT_TO_HTTPS_MIDDLEWARE, || {
            Middleware::RedirectScheme(RedirectScheme { scheme: "https".to_string() })
        });
        builder.add_http_router(router_name, HttpRouter {
            entry_points: vec![self.settings.http_entrypoint.clone()],
            middlewares: vec![REDIRECT_TO_HTTPS_MIDDLEWARE.to_string()],
            service: service_name.to_string(),
            rule,
            priority,
            tls: None,
        });
    }

    fn service(&self, group: &RouteGroup, names: &RouteNames<'_>, builder: &mut DocumentBuilder) -> HttpService {
        let resource = &group.resource;
        let servers: Vec<HttpServer> = select_backends(&group.targets, BackendKind::Http)
            .into_iter()
            .map(|url| HttpServer { url })
            .collect();

        if servers.is_empty() {
            warn!(group = %group.key, "사용 가능한 백엔드가 없음");
        }

        let sticky = resource.sticky_session.then(|| CookieSticky {
            cookie: StickyCookie {
                name: self.settings.sticky_cookie_name.clone(),
                secure: resource.ssl,
                http_only: true,
            },
        });

        let servers_transport = resource.tls_server_name.as_deref()
            .filter(|name| !name.is_empty())
            .map(|server_name| {
                let transport_name = names.transport();
                builder.add_servers_transport(transport_name.clone(), ServersTransport {
                    server_name: server_name.to_string(),
                    insecure_skip_verify: true,
                });
                transport_name
            });

        HttpService {
            load_balancer: HttpLoadBalancer {
                servers,
                sticky,
                servers_transport,
            },
        }
    }
}

/// 인증 플러그인 설정 값
pub fn auth_plugin_config(settings: &TraefikSettings, api_base_url: &str) -> Value {
    json!({
        "apiBaseUrl": api_base_url,
        "userSessionCookieName": settings.auth.session_cookie_name,
        "accessTokenQueryParam": settings.auth.access_token_param,
        "resourceSessionRequestParam": settings.auth.resource_session_request_param,
    })
}
