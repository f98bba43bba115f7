//! App Service resources: plan, web app, certificate lookup, host-name binding

use super::{Resource, ResourceKind, Tags, require_non_empty};
use crate::error::{CloudError, Result};
use crate::output::Output;
use serde::Serialize;
use std::collections::HashSet;

/// Compute tier of an App Service plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sku {
    pub name: String,
    pub tier: String,
}

impl Sku {
    pub fn new(name: impl Into<String>, tier: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let tier = tier.into();
        require_non_empty("Sku", "name", &name)?;
        require_non_empty("Sku", "tier", &tier)?;
        Ok(Self { name, tier })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppServicePlan {
    pub resource_group_name: Output,
    pub location: Output,
    pub kind: String,
    /// Must be true for Linux plans
    pub reserved: bool,
    pub sku: Sku,
    pub tags: Tags,
}

impl AppServicePlan {
    /// Linux plan in the given resource group
    pub fn linux(resource_group_name: Output, location: Output, sku: Sku) -> Self {
        Self {
            resource_group_name,
            location,
            kind: "Linux".to_string(),
            reserved: true,
            sku,
            tags: Tags::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

impl Resource for AppServicePlan {
    const KIND: ResourceKind = ResourceKind::AppServicePlan;

    fn inputs(&self) -> Vec<&Output> {
        vec![&self.resource_group_name, &self.location]
    }
}

/// One entry of the web app's environment
#[derive(Debug, Clone, Serialize)]
pub struct NameValuePair {
    pub name: String,
    pub value: Output,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub linux_fx_version: String,
    pub always_on: bool,
    pub http20_enabled: bool,
    pub min_tls_version: String,
    pub ftps_state: String,
    pub health_check_path: String,
    pub app_settings: Vec<NameValuePair>,
}

impl SiteConfig {
    /// Docker container site with TLS 1.2, HTTP/2 and FTPS disabled
    pub fn container(image: &str) -> Self {
        Self {
            linux_fx_version: format!("DOCKER|{}", image),
            always_on: false,
            http20_enabled: true,
            min_tls_version: "1.2".to_string(),
            ftps_state: "Disabled".to_string(),
            health_check_path: "/health".to_string(),
            app_settings: Vec::new(),
        }
    }

    pub fn with_always_on(mut self, always_on: bool) -> Self {
        self.always_on = always_on;
        self
    }

    /// Appends a setting; order is preserved
    pub fn with_app_setting(mut self, name: impl Into<String>, value: impl Into<Output>) -> Self {
        self.app_settings.push(NameValuePair {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn app_setting(&self, name: &str) -> Option<&Output> {
        self.app_settings
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.value)
    }

    fn validate(&self) -> Result<()> {
        if !self.linux_fx_version.starts_with("DOCKER|") || self.linux_fx_version.len() <= 7 {
            return Err(CloudError::invalid(
                "WebApp",
                format!("invalid container image: {}", self.linux_fx_version),
            ));
        }
        let mut seen = HashSet::new();
        for setting in &self.app_settings {
            require_non_empty("WebApp", "app setting name", &setting.name)?;
            if !seen.insert(setting.name.as_str()) {
                return Err(CloudError::invalid(
                    "WebApp",
                    format!("duplicate app setting: {}", setting.name),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebApp {
    pub resource_group_name: Output,
    pub location: Output,
    pub server_farm_id: Output,
    pub kind: String,
    pub https_only: bool,
    pub site_config: SiteConfig,
    pub tags: Tags,
}

impl WebApp {
    /// Linux container app hosted on `server_farm_id`
    pub fn container(
        resource_group_name: Output,
        location: Output,
        server_farm_id: Output,
        site_config: SiteConfig,
    ) -> Result<Self> {
        site_config.validate()?;
        Ok(Self {
            resource_group_name,
            location,
            server_farm_id,
            kind: "app,linux,container".to_string(),
            https_only: true,
            site_config,
            tags: Tags::new(),
        })
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

impl Resource for WebApp {
    const KIND: ResourceKind = ResourceKind::WebApp;

    fn inputs(&self) -> Vec<&Output> {
        let mut inputs = vec![
            &self.resource_group_name,
            &self.location,
            &self.server_farm_id,
        ];
        inputs.extend(self.site_config.app_settings.iter().map(|s| &s.value));
        inputs
    }
}

/// Lookup of a managed certificate created outside this deployment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateLookup {
    pub resource_group_name: Output,
    pub name: Output,
}

impl CertificateLookup {
    pub fn new(resource_group_name: Output, name: Output) -> Self {
        Self {
            resource_group_name,
            name,
        }
    }
}

impl Resource for CertificateLookup {
    const KIND: ResourceKind = ResourceKind::CertificateLookup;

    fn inputs(&self) -> Vec<&Output> {
        vec![&self.resource_group_name, &self.name]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SslState {
    Disabled,
    SniEnabled,
    IpBasedEnabled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostNameBinding {
    pub resource_group_name: Output,
    /// Name of the web app the host name is attached to
    pub name: Output,
    pub host_name: String,
    pub azure_resource_name: String,
    pub custom_host_name_dns_record_type: String,
    pub ssl_state: SslState,
    pub thumbprint: Output,
}

impl HostNameBinding {
    /// SNI-secured binding of a CNAME-verified custom domain
    pub fn sni(
        resource_group_name: Output,
        web_app_name: Output,
        host_name: impl Into<String>,
        thumbprint: Output,
    ) -> Result<Self> {
        let host_name = host_name.into();
        require_non_empty("HostNameBinding", "host name", &host_name)?;
        Ok(Self {
            resource_group_name,
            name: web_app_name,
            host_name,
            azure_resource_name: "Website".to_string(),
            custom_host_name_dns_record_type: "CName".to_string(),
            ssl_state: SslState::SniEnabled,
            thumbprint,
        })
    }
}

impl Resource for HostNameBinding {
    const KIND: ResourceKind = ResourceKind::HostNameBinding;

    fn inputs(&self) -> Vec<&Output> {
        vec![&self.resource_group_name, &self.name, &self.thumbprint]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig::container("smankenb/personal-blog:latest")
    }

    #[test]
    fn test_site_config_defaults() {
        let site = site();
        assert_eq!(site.linux_fx_version, "DOCKER|smankenb/personal-blog:latest");
        assert_eq!(site.min_tls_version, "1.2");
        assert_eq!(site.ftps_state, "Disabled");
        assert!(site.http20_enabled);
        assert!(!site.always_on);
    }

    #[test]
    fn test_web_app_rejects_empty_setting_name() {
        let site = site().with_app_setting("", "x");
        let result = WebApp::container("rg".into(), "loc".into(), "farm".into(), site);
        assert!(matches!(result, Err(CloudError::InvalidResource { .. })));
    }

    #[test]
    fn test_web_app_rejects_duplicate_setting() {
        let site = site()
            .with_app_setting("GIN_MODE", "release")
            .with_app_setting("GIN_MODE", "debug");
        assert!(WebApp::container("rg".into(), "loc".into(), "farm".into(), site).is_err());
    }

    #[test]
    fn test_web_app_serializes_camel_case() {
        let site = site().with_app_setting("CONTENT_DIR", "/content/posts");
        let app = WebApp::container("rg".into(), "loc".into(), "farm".into(), site).unwrap();
        let json = serde_json::to_value(&app).unwrap();

        assert_eq!(json["httpsOnly"], true);
        assert_eq!(json["kind"], "app,linux,container");
        assert_eq!(json["siteConfig"]["healthCheckPath"], "/health");
        assert_eq!(json["siteConfig"]["appSettings"][0]["name"], "CONTENT_DIR");
        assert_eq!(json["siteConfig"]["appSettings"][0]["value"], "/content/posts");
    }

    #[test]
    fn test_sku_requires_both_parts() {
        assert!(Sku::new("B1", "").is_err());
        assert!(Sku::new("", "Basic").is_err());
        assert_eq!(Sku::new("B1", "Basic").unwrap().tier, "Basic");
    }

    #[test]
    fn test_binding_defaults() {
        let binding =
            HostNameBinding::sni("rg".into(), "app".into(), "blog.example.com", "tp".into())
                .unwrap();
        assert_eq!(binding.ssl_state, SslState::SniEnabled);
        assert_eq!(binding.azure_resource_name, "Website");
        assert_eq!(binding.custom_host_name_dns_record_type, "CName");
        assert!(HostNameBinding::sni("rg".into(), "app".into(), "", "tp".into()).is_err());
    }
}
