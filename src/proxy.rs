//! Web proxy routing
//!
//! Grove computes where a worktree would be served; configuring the proxy
//! itself (nginx-proxy, Traefik labels) is left to the templates and tooling.

use serde::Serialize;

use crate::config::{ProjectConfig, WebConfig};

/// Resolved web address of a worktree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRoute {
    pub proxy_type: String,
    pub subdomain: String,
    pub url: String,
}

/// Substitute `{branch}` and `{project_domain}` into the subdomain pattern.
pub fn resolve_subdomain(web: &WebConfig, project: &ProjectConfig, sanitized_branch: &str) -> String {
    web.subdomain_pattern
        .replace("{branch}", sanitized_branch)
        .replace("{project_domain}", &project.domain)
}

pub fn route_for(web: &WebConfig, project: &ProjectConfig, sanitized_branch: &str) -> ProxyRoute {
    let subdomain = resolve_subdomain(web, project, sanitized_branch);
    ProxyRoute {
        proxy_type: web.proxy_type.clone(),
        url: format!("https://{}", subdomain),
        subdomain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let route = route_for(&WebConfig::default(), &ProjectConfig::default(), "feature-x");
        assert_eq!(route.subdomain, "feature-x.app.lvh.me");
        assert_eq!(route.url, "https://feature-x.app.lvh.me");
        assert_eq!(route.proxy_type, "nginx-proxy");
    }

    #[test]
    fn test_custom_pattern() {
        let web = WebConfig {
            subdomain_pattern: "{branch}-preview.{project_domain}".to_string(),
            ..WebConfig::default()
        };
        let project = ProjectConfig {
            name: "shop".to_string(),
            domain: "shop.test".to_string(),
        };
        assert_eq!(resolve_subdomain(&web, &project, "main"), "main-preview.shop.test");
    }

    #[test]
    fn test_pattern_without_placeholders() {
        let web = WebConfig {
            subdomain_pattern: "static.example.com".to_string(),
            ..WebConfig::default()
        };
        assert_eq!(
            resolve_subdomain(&web, &ProjectConfig::default(), "main"),
            "static.example.com"
        );
    }
}
