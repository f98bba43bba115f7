//! Resource group

use super::{Resource, ResourceKind, Tags, require_non_empty};
use crate::error::Result;
use crate::output::Output;
use serde::Serialize;

/// Container for every other resource of one environment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    pub location: String,
    pub tags: Tags,
}

impl ResourceGroup {
    pub fn new(location: impl Into<String>) -> Result<Self> {
        let location = location.into();
        require_non_empty("ResourceGroup", "location", &location)?;
        Ok(Self {
            location,
            tags: Tags::new(),
        })
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

impl Resource for ResourceGroup {
    const KIND: ResourceKind = ResourceKind::ResourceGroup;

    fn inputs(&self) -> Vec<&Output> {
        Vec::new()
    }
}
