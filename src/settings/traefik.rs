use serde::Deserialize;
use std::env;
use std::time::Duration;
use url::Url;

use crate::model::SiteType;
use super::{server::parse_env_var, SettingsError};

/// 동적 설정 컴파일 정책
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TraefikSettings {
    /// 이 문서를 받아 갈 엣지 노드 이름. 없으면 첫 번째 노드를 사용합니다.
    #[serde(default)]
    pub exit_node_name: Option<String>,

    /// tcp/udp 리소스 허용 여부
    #[serde(default = "default_true")]
    pub allow_raw_resources: bool,

    /// 타겟을 노출할 사이트 타입
    #[serde(default = "default_site_types")]
    pub site_types: Vec<SiteType>,

    #[serde(default = "default_http_entrypoint")]
    pub http_entrypoint: String,

    #[serde(default = "default_https_entrypoint")]
    pub https_entrypoint: String,

    /// 도메인 설정이 없을 때 사용할 인증서 리졸버
    #[serde(default = "default_cert_resolver")]
    pub cert_resolver: String,

    #[serde(default)]
    pub prefer_wildcard_cert: bool,

    /// 인증 미들웨어 뒤에 붙는 전역 미들웨어
    #[serde(default)]
    pub additional_middlewares: Vec<String>,

    #[serde(default = "default_sticky_cookie_name")]
    pub sticky_cookie_name: String,

    /// 저장소 읽기 한 번에 허용하는 시간 (밀리초)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default)]
    pub auth: AuthMiddlewareSettings,
}

/// 모든 HTTP 라우터 앞에 붙는 인증 플러그인 미들웨어 설정
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthMiddlewareSettings {
    #[serde(default = "default_auth_middleware_name")]
    pub middleware_name: String,
    #[serde(default = "default_internal_hostname")]
    pub internal_hostname: String,
    #[serde(default = "default_internal_port")]
    pub internal_port: u16,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default = "default_access_token_param")]
    pub access_token_param: String,
    #[serde(default = "default_resource_session_request_param")]
    pub resource_session_request_param: String,
}

impl AuthMiddlewareSettings {
    /// 플러그인이 호출할 내부 API 주소
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        let base = format!("http://{}:{}", self.internal_hostname, self.internal_port);
        Url::parse(&base)
            .and_then(|url| url.join("/api/v1"))
            .map_err(|source| SettingsError::InvalidAuthUrl { base, source })
    }
}

impl Default for AuthMiddlewareSettings {
    fn default() -> Self {
        Self {
            middleware_name: default_auth_middleware_name(),
            internal_hostname: default_internal_hostname(),
            internal_port: default_internal_port(),
            session_cookie_name: default_session_cookie_name(),
            access_token_param: default_access_token_param(),
            resource_session_request_param: default_resource_session_request_param(),
        }
    }
}

impl TraefikSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            exit_node_name: env::var("PROXY_EXIT_NODE_NAME").ok().filter(|v| !v.trim().is_empty()),
            allow_raw_resources: parse_env_var("PROXY_ALLOW_RAW_RESOURCES", default_true)?,
            site_types: match env::var("PROXY_SITE_TYPES") {
                Ok(value) => parse_site_types(&value)?,
                Err(_) => default_site_types(),
            },
            http_entrypoint: parse_env_var("PROXY_HTTP_ENTRYPOINT", default_http_entrypoint)?,
            https_entrypoint: parse_env_var("PROXY_HTTPS_ENTRYPOINT", default_https_entrypoint)?,
            cert_resolver: parse_env_var("PROXY_CERT_RESOLVER", default_cert_resolver)?,
            prefer_wildcard_cert: parse_env_var("PROXY_PREFER_WILDCARD_CERT", || false)?,
            additional_middlewares: env::var("PROXY_ADDITIONAL_MIDDLEWARES")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            sticky_cookie_name: default_sticky_cookie_name(),
            read_timeout_ms: parse_env_var("PROXY_READ_TIMEOUT_MS", default_read_timeout_ms)?,
            auth: AuthMiddlewareSettings::default(),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.site_types.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "site_types는 최소 하나 이상이어야 합니다".to_string()
            ));
        }

        for (name, value) in [
            ("http_entrypoint", &self.http_entrypoint),
            ("https_entrypoint", &self.https_entrypoint),
            ("cert_resolver", &self.cert_resolver),
            ("sticky_cookie_name", &self.sticky_cookie_name),
            ("auth.middleware_name", &self.auth.middleware_name),
        ] {
            if value.trim().is_empty() {
                return Err(SettingsError::InvalidConfig(format!("{}는 비어있을 수 없습니다", name)));
            }
        }

        if self.read_timeout_ms == 0 {
            return Err(SettingsError::InvalidConfig(
                "read_timeout_ms는 0보다 커야 합니다".to_string()
            ));
        }

        self.auth.api_base_url()?;
        Ok(())
    }
}

impl Default for TraefikSettings {
    fn default() -> Self {
        Self {
            exit_node_name: None,
            allow_raw_resources: true,
            site_types: default_site_types(),
            http_entrypoint: default_http_entrypoint(),
            https_entrypoint: default_https_entrypoint(),
            cert_resolver: default_cert_resolver(),
            prefer_wildcard_cert: false,
            additional_middlewares: Vec::new(),
            sticky_cookie_name: default_sticky_cookie_name(),
            read_timeout_ms: default_read_timeout_ms(),
            auth: AuthMiddlewareSettings::default(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_site_types(value: &str) -> Result<Vec<SiteType>, SettingsError> {
    split_list(value)
        .iter()
        .map(|s| s.parse::<SiteType>().map_err(|reason| SettingsError::EnvVarInvalid {
            var_name: "PROXY_SITE_TYPES".to_string(),
            value: value.to_string(),
            reason,
        }))
        .collect()
}

fn default_true() -> bool { true }
fn default_site_types() -> Vec<SiteType> { vec![SiteType::Newt, SiteType::Wireguard, SiteType::Local] }
fn default_http_entrypoint() -> String { "web".to_string() }
fn default_https_entrypoint() -> String { "websecure".to_string() }
fn default_cert_resolver() -> String { "letsencrypt".to_string() }
fn default_sticky_cookie_name() -> String { "p_sticky".to_string() }
fn default_read_timeout_ms() -> u64 { 5000 }
fn default_auth_middleware_name() -> String { "badger".to_string() }
fn default_internal_hostname() -> String { "pangolin".to_string() }
fn default_internal_port() -> u16 { 3001 }
fn default_session_cookie_name() -> String { "p_session_token".to_string() }
fn default_access_token_param() -> String { "p_token".to_string() }
fn default_resource_session_request_param() -> String { "p_session_request".to_string() }
