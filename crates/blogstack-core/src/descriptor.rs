//! デプロイ記述子
//!
//! ブログのコンテナアプリを公開するためのリソースグラフを組み立てます。
//!
//! 登録順（依存順）:
//! 1. リソースグループ
//! 2. App Service プラン
//! 3. Web アプリ
//! 4. 本番のみ: 所有確認TXT、CNAME、証明書の参照、ホスト名バインド
//!
//! 最後に `resourceGroupName` / `appServiceName` / `appServiceUrl` を出力します。

use crate::error::Result;
use crate::settings::{DeploySettings, DomainSettings};
use blogstack_cloud::resource::{
    AppServicePlan, CertificateLookup, DnsRecord, DnsRecordSet, HostNameBinding, ResourceGroup,
    SiteConfig, WebApp,
};
use blogstack_cloud::{Deployment, Handle, Output, ResourceOptions};
use tracing::{info, instrument};

/// デプロイするコンテナイメージ
pub const CONTAINER_IMAGE: &str = "smankenb/personal-blog:latest";

/// DNSレコードのTTL（秒）
pub const DNS_TTL: u32 = 3600;

/// 管理ツール名（ManagedBy タグ）
pub const MANAGED_BY: &str = "Pulumi";

/// アプリケーション名（Application タグ）
pub const APPLICATION: &str = "PersonalBlog";

/// アプリのコンテンツ配置先
pub const CONTENT_DIR: &str = "/content/posts";

/// 出力名
pub mod outputs {
    pub const RESOURCE_GROUP_NAME: &str = "resourceGroupName";
    pub const APP_SERVICE_NAME: &str = "appServiceName";
    pub const APP_SERVICE_URL: &str = "appServiceUrl";
}

/// 設定からデプロイを組み立てる
#[instrument(skip(settings), fields(stack = %settings.environment))]
pub fn build_deployment(settings: &DeploySettings) -> Result<Deployment> {
    let env = settings.environment.as_str();
    let app = settings.app_name.as_str();
    let mut deployment = Deployment::new(&settings.project, env);

    let resource_group = deployment.graph.register(
        format!("{}-{}-rg", app, env),
        ResourceGroup::new(&settings.location)?
            .with_tag("Environment", env)
            .with_tag("ManagedBy", MANAGED_BY)
            .with_tag("Application", APPLICATION),
        ResourceOptions::new(),
    )?;

    let plan = deployment.graph.register(
        format!("{}-{}-plan", app, env),
        AppServicePlan::linux(
            resource_group.name(),
            resource_group.location(),
            settings.sku.clone(),
        )
        .with_tag("Environment", env),
        ResourceOptions::new(),
    )?;

    let web_app = deployment.graph.register(
        format!("{}-{}-app", app, env),
        WebApp::container(
            resource_group.name(),
            resource_group.location(),
            plan.id(),
            site_config(settings),
        )?
        .with_tag("Environment", env),
        ResourceOptions::new(),
    )?;

    if let Some(domain) = &settings.domain {
        bind_custom_domain(&mut deployment, settings, domain, &resource_group, &web_app)?;
    }

    deployment.export(outputs::RESOURCE_GROUP_NAME, resource_group.name());
    deployment.export(outputs::APP_SERVICE_NAME, web_app.name());
    deployment.export(
        outputs::APP_SERVICE_URL,
        Output::concat([Output::known("https://"), web_app.default_host_name()]),
    );

    info!(
        resources = deployment.graph.len(),
        custom_domain = settings.domain.is_some(),
        "Deployment built"
    );
    Ok(deployment)
}

/// コンテナとアプリ設定
fn site_config(settings: &DeploySettings) -> SiteConfig {
    let service_name = settings.service_name();
    SiteConfig::container(CONTAINER_IMAGE)
        .with_always_on(settings.is_production())
        .with_app_setting("WEBSITES_ENABLE_APP_SERVICE_STORAGE", "false")
        .with_app_setting("GIN_MODE", "release")
        .with_app_setting("CONTENT_DIR", CONTENT_DIR)
        // OpenTelemetry
        .with_app_setting("OTEL_EXPORTER_OTLP_ENDPOINT", settings.otlp_endpoint.as_str())
        .with_app_setting(
            "OTEL_EXPORTER_OTLP_HEADERS",
            Output::secret(settings.otlp_headers_key(), &settings.otlp_headers),
        )
        .with_app_setting("OTEL_SERVICE_NAME", service_name.as_str())
        .with_app_setting(
            "OTEL_RESOURCE_ATTRIBUTES",
            format!(
                "service.name={},deployment.environment={}",
                service_name, settings.environment
            ),
        )
}

/// カスタムドメインの所有確認・CNAME・TLSバインド
fn bind_custom_domain(
    deployment: &mut Deployment,
    settings: &DeploySettings,
    domain: &DomainSettings,
    resource_group: &Handle<ResourceGroup>,
    web_app: &Handle<WebApp>,
) -> Result<()> {
    let app = settings.app_name.as_str();
    let env = settings.environment.as_str();
    let host = &domain.host;

    let verify_txt = deployment.graph.register(
        format!("{}-verify-txt", app),
        DnsRecordSet::new(
            Output::known(&domain.dns_resource_group),
            host.zone(),
            host.txt_record_name(),
            DNS_TTL,
            DnsRecord::txt(web_app.custom_domain_verification_id()),
        )?,
        ResourceOptions::new(),
    )?;

    let cname = deployment.graph.register(
        format!("{}-cname", app),
        DnsRecordSet::new(
            Output::known(&domain.dns_resource_group),
            host.zone(),
            host.cname_record_name(),
            DNS_TTL,
            DnsRecord::cname(web_app.default_host_name()),
        )?,
        ResourceOptions::new(),
    )?;

    // 証明書はポータルで作成済みのマネージド証明書を参照する
    let certificate = deployment.graph.register(
        format!("{}-{}-cert", app, env),
        CertificateLookup::new(
            resource_group.name(),
            Output::concat([
                Output::known(format!("{}-", host.as_str())),
                web_app.name(),
            ]),
        ),
        ResourceOptions::new(),
    )?;

    deployment.graph.register(
        format!("{}-{}-binding", app, env),
        HostNameBinding::sni(
            resource_group.name(),
            web_app.name(),
            host.as_str(),
            certificate.thumbprint(),
        )?,
        ResourceOptions::new()
            .depends_on(&verify_txt)
            .depends_on(&cname),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StackConfig;
    use crate::settings::AZURE_NAMESPACE;
    use blogstack_cloud::{Attributes, ResourceKind, ResourceNode, Urn};

    const PROJECT: &str = "personal-blog";

    fn settings(stack: &str) -> DeploySettings {
        let source = StackConfig::new(PROJECT, stack)
            .with_value(PROJECT, "appName", "blog")
            .with_value(PROJECT, "appHost", "blog.example.com")
            .with_value(PROJECT, "dnsResourceGroup", "dns-rg")
            .with_value(AZURE_NAMESPACE, "location", "westeurope");
        DeploySettings::from_source(&source).unwrap()
    }

    fn node<'a>(deployment: &'a Deployment, kind: ResourceKind, name: &str) -> &'a ResourceNode {
        deployment
            .graph
            .get(&Urn::new(kind, name))
            .unwrap_or_else(|| panic!("missing node {}", name))
    }

    #[test]
    fn test_dev_has_no_domain_resources() {
        for stack in ["dev", "staging", "test"] {
            let deployment = build_deployment(&settings(stack)).unwrap();
            assert_eq!(deployment.graph.len(), 3, "stack: {}", stack);
            assert!(deployment.graph.by_kind(ResourceKind::DnsRecordSet).is_empty());
            assert!(deployment.graph.by_kind(ResourceKind::CertificateLookup).is_empty());
            assert!(deployment.graph.by_kind(ResourceKind::HostNameBinding).is_empty());
        }
    }

    #[test]
    fn test_prod_domain_resources() {
        let deployment = build_deployment(&settings("prod")).unwrap();
        assert_eq!(deployment.graph.len(), 7);

        let records = deployment.graph.by_kind(ResourceKind::DnsRecordSet);
        assert_eq!(records.len(), 2);
        let bindings = deployment.graph.by_kind(ResourceKind::HostNameBinding);
        assert_eq!(bindings.len(), 1);

        let binding = bindings[0];
        for record in &records {
            assert!(binding.explicit_depends_on.contains(&record.urn));
        }
        assert_eq!(binding.name, "blog-prod-binding");
    }

    #[test]
    fn test_logical_names() {
        let deployment = build_deployment(&settings("prod")).unwrap();
        let names: Vec<&str> = deployment
            .graph
            .nodes()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "blog-prod-rg",
                "blog-prod-plan",
                "blog-prod-app",
                "blog-verify-txt",
                "blog-cname",
                "blog-prod-cert",
                "blog-prod-binding",
            ]
        );
    }

    #[test]
    fn test_dns_records() {
        let deployment = build_deployment(&settings("prod")).unwrap();
        let app = Urn::new(ResourceKind::WebApp, "blog-prod-app");

        let txt = node(&deployment, ResourceKind::DnsRecordSet, "blog-verify-txt");
        let txt_spec = txt.inputs.as_dns_record_set().unwrap();
        assert_eq!(txt_spec.zone_name, "example.com");
        assert_eq!(txt_spec.relative_record_set_name, "asuid.blog");
        assert_eq!(txt_spec.record_type, "TXT");
        assert_eq!(txt_spec.ttl, 3600);
        assert_eq!(
            txt_spec.resource_group_name.known_value().as_deref(),
            Some("dns-rg")
        );
        assert!(txt.depends_on.contains(&app));

        let cname = node(&deployment, ResourceKind::DnsRecordSet, "blog-cname");
        let cname_spec = cname.inputs.as_dns_record_set().unwrap();
        assert_eq!(cname_spec.relative_record_set_name, "blog");
        assert_eq!(cname_spec.record_type, "CNAME");
        assert!(cname.depends_on.contains(&app));
    }

    #[test]
    fn test_apex_domain_records() {
        let mut settings = settings("prod");
        if let Some(domain) = settings.domain.as_mut() {
            domain.host = crate::hostname::HostName::parse("example.com").unwrap();
        }
        let deployment = build_deployment(&settings).unwrap();

        let txt = node(&deployment, ResourceKind::DnsRecordSet, "blog-verify-txt");
        let cname = node(&deployment, ResourceKind::DnsRecordSet, "blog-cname");
        assert_eq!(
            txt.inputs.as_dns_record_set().unwrap().relative_record_set_name,
            "asuid"
        );
        assert_eq!(
            cname.inputs.as_dns_record_set().unwrap().relative_record_set_name,
            "@"
        );
    }

    #[test]
    fn test_sku_follows_environment() {
        let dev = build_deployment(&settings("dev")).unwrap();
        let plan = node(&dev, ResourceKind::AppServicePlan, "blog-dev-plan");
        let sku = &plan.inputs.as_app_service_plan().unwrap().sku;
        assert_eq!((sku.name.as_str(), sku.tier.as_str()), ("F1", "Free"));

        let prod = build_deployment(&settings("prod")).unwrap();
        let plan = node(&prod, ResourceKind::AppServicePlan, "blog-prod-plan");
        let sku = &plan.inputs.as_app_service_plan().unwrap().sku;
        assert_eq!((sku.name.as_str(), sku.tier.as_str()), ("B1", "Basic"));
    }

    #[test]
    fn test_app_settings() {
        let deployment = build_deployment(&settings("dev")).unwrap();
        let app = node(&deployment, ResourceKind::WebApp, "blog-dev-app")
            .inputs
            .as_web_app()
            .unwrap();
        let site = &app.site_config;

        let names: Vec<&str> = site.app_settings.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "WEBSITES_ENABLE_APP_SERVICE_STORAGE",
                "GIN_MODE",
                "CONTENT_DIR",
                "OTEL_EXPORTER_OTLP_ENDPOINT",
                "OTEL_EXPORTER_OTLP_HEADERS",
                "OTEL_SERVICE_NAME",
                "OTEL_RESOURCE_ATTRIBUTES",
            ]
        );
        assert!(site.app_settings.iter().all(|s| !s.name.is_empty()));

        let value = |name: &str| site.app_setting(name).and_then(|v| v.known_value());
        assert_eq!(value("OTEL_EXPORTER_OTLP_ENDPOINT").as_deref(), Some(""));
        assert_eq!(value("OTEL_EXPORTER_OTLP_HEADERS").as_deref(), Some(""));
        assert_eq!(value("OTEL_SERVICE_NAME").as_deref(), Some("blog-dev"));
        assert_eq!(
            value("OTEL_RESOURCE_ATTRIBUTES").as_deref(),
            Some("service.name=blog-dev,deployment.environment=dev")
        );
        assert!(
            !site.app_setting("OTEL_EXPORTER_OTLP_HEADERS")
                .unwrap()
                .is_secret()
        );
        assert!(!site.always_on);
        assert_eq!(
            site.linux_fx_version,
            "DOCKER|smankenb/personal-blog:latest"
        );
    }

    #[test]
    fn test_always_on_in_prod() {
        let deployment = build_deployment(&settings("prod")).unwrap();
        let app = node(&deployment, ResourceKind::WebApp, "blog-prod-app")
            .inputs
            .as_web_app()
            .unwrap();
        assert!(app.site_config.always_on);
    }

    #[test]
    fn test_topological_order() {
        let deployment = build_deployment(&settings("prod")).unwrap();
        let order = deployment.graph.topological_order().unwrap();
        let position = |name: &str| order.iter().position(|n| n.name == name).unwrap();

        assert_eq!(order[0].kind, ResourceKind::ResourceGroup);
        assert!(position("blog-prod-plan") < position("blog-prod-app"));
        assert!(position("blog-verify-txt") < position("blog-prod-binding"));
        assert!(position("blog-cname") < position("blog-prod-binding"));
        assert!(position("blog-prod-cert") < position("blog-prod-binding"));
    }

    #[test]
    fn test_app_service_url_output() {
        for stack in ["dev", "prod"] {
            let deployment = build_deployment(&settings(stack)).unwrap();
            let mut attributes = Attributes::new();
            let rg = Urn::new(ResourceKind::ResourceGroup, &format!("blog-{}-rg", stack));
            let app = Urn::new(ResourceKind::WebApp, &format!("blog-{}-app", stack));
            attributes.set(rg, "name", "blog-rg1234");
            attributes.set(app.clone(), "name", "blog-app5678");
            attributes.set(app, "defaultHostName", "blog-app5678.azurewebsites.net");

            let outputs = deployment.resolve_outputs(&attributes).unwrap();
            assert_eq!(outputs["resourceGroupName"], "blog-rg1234");
            assert_eq!(outputs["appServiceName"], "blog-app5678");
            assert_eq!(
                outputs["appServiceUrl"],
                "https://blog-app5678.azurewebsites.net"
            );
        }
    }

    fn dev_source() -> StackConfig {
        StackConfig::new(PROJECT, "dev")
            .with_value(PROJECT, "appName", "blog")
            .with_value(AZURE_NAMESPACE, "location", "westeurope")
    }

    fn headers_setting(document: &serde_json::Value) -> serde_json::Value {
        let app = document["resources"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["type"] == "azure-native:web:WebApp")
            .unwrap();
        let setting = &app["inputs"]["siteConfig"]["appSettings"][4];
        assert_eq!(setting["name"], "OTEL_EXPORTER_OTLP_HEADERS");
        setting["value"].clone()
    }

    #[test]
    fn test_secret_headers_not_in_document() {
        let source = dev_source().with_secret(PROJECT, "otlpHeaders", "Authorization=Basic c2VjcmV0");
        let settings = DeploySettings::from_source(&source).unwrap();
        let deployment = build_deployment(&settings).unwrap();

        let document = deployment.to_document().unwrap();
        assert!(!document.to_string().contains("c2VjcmV0"));
        assert!(!format!("{:?}", deployment).contains("c2VjcmV0"));
        assert_eq!(
            headers_setting(&document),
            serde_json::json!({ "secret": { "config": "personal-blog:otlpHeaders" } })
        );
    }

    #[test]
    fn test_configured_and_absent_headers_differ() {
        let configured = dev_source().with_secret(PROJECT, "otlpHeaders", "Authorization=Basic abc");
        let configured = build_deployment(&DeploySettings::from_source(&configured).unwrap())
            .unwrap()
            .to_document()
            .unwrap();
        let absent = build_deployment(&DeploySettings::from_source(&dev_source()).unwrap())
            .unwrap()
            .to_document()
            .unwrap();

        assert_ne!(headers_setting(&configured), headers_setting(&absent));
        assert_eq!(headers_setting(&absent), serde_json::json!(""));
    }

    #[test]
    fn test_resource_group_tags() {
        let deployment = build_deployment(&settings("dev")).unwrap();
        let document = deployment.to_document().unwrap();
        let tags = &document["resources"][0]["inputs"]["tags"];
        assert_eq!(tags["Environment"], "dev");
        assert_eq!(tags["ManagedBy"], "Pulumi");
        assert_eq!(tags["Application"], "PersonalBlog");
    }
}
