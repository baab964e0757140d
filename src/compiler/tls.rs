//! 인증서 리졸버와 와일드카드 인증서 정책

use crate::document::{RouterTls, TlsDomain};
use crate::model::DomainOverride;
use crate::settings::TraefikSettings;
use super::hostname::HostnameEntry;

/// 라우터 하나에 적용할 인증서 정책
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPolicy {
    pub resolver: String,
    pub prefer_wildcard: bool,
}

impl CertPolicy {
    /// 도메인 설정 값을 우선 사용하고, 빠진 항목은 전역 기본값으로 채웁니다.
    pub fn resolve(settings: &TraefikSettings, domain: Option<&DomainOverride>) -> Self {
        let resolver = domain
            .and_then(|d| d.cert_resolver.as_deref())
            .filter(|r| !r.is_empty())
            .unwrap_or(&settings.cert_resolver)
            .to_string();
        let prefer_wildcard = domain
            .and_then(|d| d.prefer_wildcard_cert)
            .unwrap_or(settings.prefer_wildcard_cert);

        Self { resolver, prefer_wildcard }
    }

    /// 와일드카드를 선호하면 호스트 이름마다 인증서 도메인을 요청합니다(중복 제거).
    pub fn router_tls<'a, I>(&self, entries: I) -> RouterTls
    where
        I: IntoIterator<Item = &'a HostnameEntry>,
    {
        let mut domains: Vec<TlsDomain> = Vec::new();
        if self.prefer_wildcard {
            for entry in entries {
                let main = certificate_main(entry);
                if domains.iter().all(|d| d.main != main) {
                    domains.push(TlsDomain { main });
                }
            }
        }

        RouterTls {
            cert_resolver: self.resolver.clone(),
            domains,
        }
    }
}

/// 라벨이 2개 이하면 `*.<domain>`, 아니면 첫 라벨을 뗀 `*.<rest>`
pub fn wildcard_base(domain: &str) -> String {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() <= 2 {
        format!("*.{}", domain)
    } else {
        format!("*.{}", labels[1..].join("."))
    }
}

/// 서브도메인이 없는 호스트 이름은 정확한 이름만 요청합니다.
pub fn certificate_main(entry: &HostnameEntry) -> String {
    if entry.has_subdomain() {
        wildcard_base(&entry.full_domain)
    } else {
        entry.full_domain.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(full_domain: &str, base_domain: &str, subdomain: Option<&str>) -> HostnameEntry {
        HostnameEntry {
            full_domain: full_domain.to_string(),
            base_domain: base_domain.to_string(),
            subdomain: subdomain.map(String::from),
            domain_id: None,
            primary: true,
        }
    }

    #[test]
    fn test_wildcard_base() {
        assert_eq!(wildcard_base("sub.example.com"), "*.example.com");
        assert_eq!(wildcard_base("example.com"), "*.example.com");
        assert_eq!(wildcard_base("a.b.example.co.uk"), "*.b.example.co.uk");
    }

    #[test]
    fn test_apex_never_requests_wildcard() {
        assert_eq!(certificate_main(&entry("example.com", "example.com", None)), "example.com");
        // 서브도메인 값이 있어도 베이스 도메인과 같으면 와일드카드를 쓰지 않습니다.
        assert_eq!(certificate_main(&entry("example.com", "example.com", Some("www"))), "example.com");
        assert_eq!(certificate_main(&entry("sub.example.com", "example.com", Some("sub"))), "*.example.com");
    }

    #[test]
    fn test_policy_falls_back_to_global_defaults() {
        let settings = TraefikSettings {
            cert_resolver: "letsencrypt".to_string(),
            prefer_wildcard_cert: true,
            ..Default::default()
        };

        let policy = CertPolicy::resolve(&settings, None);
        assert_eq!(policy, CertPolicy { resolver: "letsencrypt".to_string(), prefer_wildcard: true });

        let domain = DomainOverride {
            domain_id: "d1".to_string(),
            cert_resolver: Some("dns-cloudflare".to_string()),
            prefer_wildcard_cert: None,
        };
        let policy = CertPolicy::resolve(&settings, Some(&domain));
        assert_eq!(policy.resolver, "dns-cloudflare");
        assert!(policy.prefer_wildcard);
    }

    #[test]
    fn test_router_tls_domains_only_with_wildcard_preference() {
        let entries = vec![
            entry("sub.example.com", "example.com", Some("sub")),
            entry("alt.example.com", "example.com", Some("alt")),
            entry("example.com", "example.com", None),
        ];

        let plain = CertPolicy { resolver: "le".to_string(), prefer_wildcard: false };
        assert!(plain.router_tls(&entries).domains.is_empty());

        let wildcard = CertPolicy { resolver: "le".to_string(), prefer_wildcard: true };
        let tls = wildcard.router_tls(&entries);
        let mains: Vec<&str> = tls.domains.iter().map(|d| d.main.as_str()).collect();
        assert_eq!(mains, vec!["*.example.com", "example.com"]);
    }
}
