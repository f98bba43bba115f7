//! Typed resource descriptors
//!
//! One struct per resource kind, each exposing only the inputs the
//! deployment needs and validated when it is constructed. Registering a
//! descriptor in a [`ResourceGraph`](crate::graph::ResourceGraph) yields a
//! typed [`Handle`] whose accessors return the kind's generated attributes as
//! deferred [`Output`]s.

mod dns;
mod group;
mod web;

pub use dns::{CnameRecord, DnsRecord, DnsRecordSet, TxtRecord};
pub use group::ResourceGroup;
pub use web::{
    AppServicePlan, CertificateLookup, HostNameBinding, NameValuePair, SiteConfig, Sku, SslState,
    WebApp,
};

use crate::output::Output;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Resource tags
pub type Tags = BTreeMap<String, String>;

/// Kind of a graph node, rendered as the engine's type token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "azure-native:resources:ResourceGroup")]
    ResourceGroup,
    #[serde(rename = "azure-native:web:AppServicePlan")]
    AppServicePlan,
    #[serde(rename = "azure-native:web:WebApp")]
    WebApp,
    #[serde(rename = "azure-native:dns:RecordSet")]
    DnsRecordSet,
    #[serde(rename = "azure-native:web:getCertificate")]
    CertificateLookup,
    #[serde(rename = "azure-native:web:WebAppHostNameBinding")]
    HostNameBinding,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => "azure-native:resources:ResourceGroup",
            ResourceKind::AppServicePlan => "azure-native:web:AppServicePlan",
            ResourceKind::WebApp => "azure-native:web:WebApp",
            ResourceKind::DnsRecordSet => "azure-native:dns:RecordSet",
            ResourceKind::CertificateLookup => "azure-native:web:getCertificate",
            ResourceKind::HostNameBinding => "azure-native:web:WebAppHostNameBinding",
        }
    }

    /// Lookups read existing provider objects instead of declaring new ones
    pub fn is_lookup(&self) -> bool {
        matches!(self, ResourceKind::CertificateLookup)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graph identifier of a node: `<type token>::<logical name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    pub fn new(kind: ResourceKind, name: &str) -> Self {
        Self(format!("{}::{}", kind, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Implemented by every typed descriptor
pub trait Resource: Into<ResourceSpec> {
    const KIND: ResourceKind;

    /// Outputs consumed as inputs; each reference is a dependency edge
    fn inputs(&self) -> Vec<&Output>;
}

/// Descriptor stored in a graph node
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResourceSpec {
    ResourceGroup(ResourceGroup),
    AppServicePlan(AppServicePlan),
    WebApp(WebApp),
    DnsRecordSet(DnsRecordSet),
    CertificateLookup(CertificateLookup),
    HostNameBinding(HostNameBinding),
}

impl ResourceSpec {
    pub fn as_web_app(&self) -> Option<&WebApp> {
        match self {
            ResourceSpec::WebApp(app) => Some(app),
            _ => None,
        }
    }

    pub fn as_app_service_plan(&self) -> Option<&AppServicePlan> {
        match self {
            ResourceSpec::AppServicePlan(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn as_dns_record_set(&self) -> Option<&DnsRecordSet> {
        match self {
            ResourceSpec::DnsRecordSet(record) => Some(record),
            _ => None,
        }
    }
}

macro_rules! impl_into_spec {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for ResourceSpec {
                fn from(resource: $ty) -> Self {
                    ResourceSpec::$ty(resource)
                }
            }
        )*
    };
}

impl_into_spec!(
    ResourceGroup,
    AppServicePlan,
    WebApp,
    DnsRecordSet,
    CertificateLookup,
    HostNameBinding,
);

/// Typed reference to a registered resource
pub struct Handle<T> {
    urn: Urn,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(urn: Urn) -> Self {
        Self {
            urn,
            _kind: PhantomData,
        }
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    /// A generated attribute of this resource
    pub fn output(&self, attribute: &str) -> Output {
        Output::attribute(self.urn.clone(), attribute)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self::new(self.urn.clone())
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.urn).finish()
    }
}

impl Handle<ResourceGroup> {
    /// Physical name chosen by the engine
    pub fn name(&self) -> Output {
        self.output("name")
    }

    pub fn location(&self) -> Output {
        self.output("location")
    }
}

impl Handle<AppServicePlan> {
    pub fn id(&self) -> Output {
        self.output("id")
    }
}

impl Handle<WebApp> {
    pub fn name(&self) -> Output {
        self.output("name")
    }

    pub fn default_host_name(&self) -> Output {
        self.output("defaultHostName")
    }

    pub fn custom_domain_verification_id(&self) -> Output {
        self.output("customDomainVerificationId")
    }
}

impl Handle<CertificateLookup> {
    pub fn thumbprint(&self) -> Output {
        self.output("thumbprint")
    }
}

pub(crate) fn require_non_empty(resource: &str, field: &str, value: &str) -> crate::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::CloudError::invalid(
            resource,
            format!("{} must not be empty", field),
        ));
    }
    Ok(())
}
