//! デプロイ設定
//!
//! 設定ストアから一度だけ読み込み、以降は参照で受け渡します。
//! 必須値の欠落やホスト名の誤りは、リソースを1つも登録する前にここで検出されます。

use crate::error::{DeployError, Result};
use crate::hostname::HostName;
use crate::sku::{PRODUCTION_STACK, select_sku};
use crate::source::{Config, ConfigSource};
use blogstack_cloud::Secret;
use blogstack_cloud::resource::Sku;
use serde::Serialize;
use tracing::{debug, instrument};

/// Azureプロバイダーの名前空間
pub const AZURE_NAMESPACE: &str = "azure";

/// OTLPヘッダーの設定キー（シークレット）
pub const OTLP_HEADERS_KEY: &str = "otlpHeaders";

/// カスタムドメイン設定（本番のみ）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSettings {
    #[serde(serialize_with = "serialize_host")]
    pub host: HostName,
    pub dns_resource_group: String,
}

/// デプロイ記述子への入力
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploySettings {
    pub project: String,
    /// スタック名（= 環境名）
    pub environment: String,
    pub app_name: String,
    pub location: String,
    pub sku: Sku,
    pub otlp_endpoint: String,
    pub otlp_headers: Secret,
    pub domain: Option<DomainSettings>,
}

impl DeploySettings {
    /// 設定ストアから読み込む
    #[instrument(skip(source), fields(stack = %source.stack()))]
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        let environment = source.stack().to_string();
        let config = Config::new(source);
        let azure = Config::with_namespace(source, AZURE_NAMESPACE);

        let app_name = config.require("appName")?;

        // location は azure 名前空間を優先し、なければプロジェクト名前空間
        let location = match azure.get("location").filter(|v| !v.trim().is_empty()) {
            Some(location) => location,
            None => config.get("location").filter(|v| !v.trim().is_empty()).ok_or_else(|| {
                DeployError::MissingConfig {
                    namespace: AZURE_NAMESPACE.to_string(),
                    key: "location".to_string(),
                }
            })?,
        };

        let sku = match (azure.get("appServiceSku"), azure.get("appServiceSkuTier")) {
            (Some(name), Some(tier)) => Sku::new(name, tier)?,
            (None, None) => select_sku(&environment),
            (Some(_), None) => {
                return Err(DeployError::MissingConfig {
                    namespace: AZURE_NAMESPACE.to_string(),
                    key: "appServiceSkuTier".to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(DeployError::MissingConfig {
                    namespace: AZURE_NAMESPACE.to_string(),
                    key: "appServiceSku".to_string(),
                });
            }
        };

        let domain = if environment == PRODUCTION_STACK {
            let host = HostName::parse(&config.require("appHost")?)?;
            let dns_resource_group = config.require("dnsResourceGroup")?;
            Some(DomainSettings {
                host,
                dns_resource_group,
            })
        } else {
            None
        };

        let settings = Self {
            project: source.project().to_string(),
            app_name,
            location,
            sku,
            otlp_endpoint: config.get_or("otlpEndpoint", ""),
            otlp_headers: config.get_secret(OTLP_HEADERS_KEY).unwrap_or_default(),
            domain,
            environment,
        };

        debug!(
            app = %settings.app_name,
            sku = %settings.sku.name,
            custom_domain = settings.domain.is_some(),
            "Loaded deploy settings"
        );
        Ok(settings)
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION_STACK
    }

    /// シークレットの参照先 `<project>:otlpHeaders`
    pub fn otlp_headers_key(&self) -> String {
        format!("{}:{}", self.project, OTLP_HEADERS_KEY)
    }

    /// `<appName>-<env>`
    pub fn service_name(&self) -> String {
        format!("{}-{}", self.app_name, self.environment)
    }
}

fn serialize_host<S: serde::Serializer>(
    host: &HostName,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(host.as_str())
}
