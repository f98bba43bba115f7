//! A stack's resource graph together with its exported outputs

use crate::error::Result;
use crate::graph::{ResourceGraph, ResourceNode};
use crate::output::{Attributes, Output};
use serde::Serialize;
use std::collections::BTreeMap;

/// Deployment document format version
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    pub project: String,
    pub stack: String,
    pub graph: ResourceGraph,
    pub outputs: BTreeMap<String, Output>,
}

impl Deployment {
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
            graph: ResourceGraph::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Exports a stack output under `name`
    pub fn export(&mut self, name: impl Into<String>, value: Output) {
        self.outputs.insert(name.into(), value);
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    /// Resolves every output against engine-reported attributes
    pub fn resolve_outputs(&self, attributes: &Attributes) -> Result<BTreeMap<String, String>> {
        self.outputs
            .iter()
            .map(|(name, output)| {
                let value = if output.is_secret() {
                    crate::secret::REDACTED.to_string()
                } else {
                    output.resolve(attributes)?
                };
                Ok((name.clone(), value))
            })
            .collect()
    }

    /// Serialized form handed to the engine; secrets are redacted
    pub fn to_document(&self) -> Result<serde_json::Value> {
        let document = Document {
            version: DOCUMENT_VERSION,
            project: &self.project,
            stack: &self.stack,
            resources: self.graph.topological_order()?,
            outputs: &self.outputs,
        };
        Ok(serde_json::to_value(document)?)
    }
}

#[derive(Serialize)]
struct Document<'a> {
    version: u32,
    project: &'a str,
    stack: &'a str,
    resources: Vec<&'a ResourceNode>,
    outputs: &'a BTreeMap<String, Output>,
}
