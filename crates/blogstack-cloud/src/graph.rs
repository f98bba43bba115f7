//! Resource dependency graph
//!
//! Nodes are registered in dependency order. Every attribute reference in a
//! descriptor's inputs is an implicit edge; [`ResourceOptions::depends_on`]
//! adds explicit edges for ordering that no attribute expresses (a host-name
//! binding waiting on its DNS records). Registration rejects references to
//! nodes that are not in the graph yet.

use crate::error::{CloudError, Result};
use crate::resource::{Handle, Resource, ResourceKind, ResourceSpec, Urn};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Per-registration options
#[derive(Debug, Clone, Default)]
pub struct ResourceOptions {
    depends_on: Vec<Urn>,
}

impl ResourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an explicit ordering edge on `handle`
    pub fn depends_on<T>(mut self, handle: &Handle<T>) -> Self {
        self.depends_on.push(handle.urn().clone());
        self
    }
}

/// A registered resource
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    pub urn: Urn,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
    pub inputs: ResourceSpec,
    /// Explicit and implicit dependencies
    pub depends_on: BTreeSet<Urn>,
    /// Dependencies declared through `ResourceOptions`
    pub explicit_depends_on: BTreeSet<Urn>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    #[serde(skip)]
    index: HashMap<Urn, usize>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `resource` under the logical `name`
    pub fn register<T: Resource>(
        &mut self,
        name: impl Into<String>,
        resource: T,
        options: ResourceOptions,
    ) -> Result<Handle<T>> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CloudError::InvalidResource {
                resource: T::KIND.to_string(),
                message: "logical name must not be empty".to_string(),
            });
        }

        let urn = Urn::new(T::KIND, &name);
        if self.index.contains_key(&urn) {
            return Err(CloudError::DuplicateResource(urn.to_string()));
        }

        let implicit: BTreeSet<Urn> = resource
            .inputs()
            .into_iter()
            .flat_map(|output| output.references())
            .map(|reference| reference.urn.clone())
            .collect();
        let explicit: BTreeSet<Urn> = options.depends_on.into_iter().collect();

        let depends_on: BTreeSet<Urn> = implicit.union(&explicit).cloned().collect();
        for dependency in &depends_on {
            if dependency == &urn || !self.index.contains_key(dependency) {
                return Err(CloudError::UnknownDependency {
                    resource: urn.to_string(),
                    dependency: dependency.to_string(),
                });
            }
        }

        tracing::debug!(
            urn = %urn,
            dependencies = depends_on.len(),
            "Registered resource"
        );

        self.index.insert(urn.clone(), self.nodes.len());
        self.nodes.push(ResourceNode {
            urn: urn.clone(),
            kind: T::KIND,
            name,
            inputs: resource.into(),
            depends_on,
            explicit_depends_on: explicit,
        });

        Ok(Handle::new(urn))
    }

    pub fn get(&self, urn: &Urn) -> Option<&ResourceNode> {
        self.index.get(urn).map(|&i| &self.nodes[i])
    }

    /// Nodes in registration order
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn by_kind(&self, kind: ResourceKind) -> Vec<&ResourceNode> {
        self.nodes.iter().filter(|n| n.kind == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dependency order (Kahn's algorithm); ties keep registration order
    pub fn topological_order(&self) -> Result<Vec<&ResourceNode>> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.depends_on.len()).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for (i, node) in self.nodes.iter().enumerate() {
            for dependency in &node.depends_on {
                let &d = self.index.get(dependency).ok_or_else(|| {
                    CloudError::UnknownDependency {
                        resource: node.urn.to_string(),
                        dependency: dependency.to_string(),
                    }
                })?;
                dependents[d].push(i);
            }
        }

        let mut ready: VecDeque<usize> = (0..self.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(i) = ready.pop_front() {
            order.push(&self.nodes[i]);
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push_back(dependent);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck: Vec<String> = self
                .nodes
                .iter()
                .enumerate()
                .filter(|(i, _)| in_degree[*i] > 0)
                .map(|(_, n)| n.urn.to_string())
                .collect();
            return Err(CloudError::CircularDependency(stuck.join(", ")));
        }

        Ok(order)
    }
}
