//! Plan steps handed to the external engine

use crate::error::Result;
use crate::graph::ResourceGraph;
use crate::resource::Urn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One declaration or lookup in dependency order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Engine type token (e.g., "azure-native:web:WebApp")
    pub resource_type: String,

    /// Node identifier
    pub urn: Urn,

    /// Description of the action
    pub description: String,

    /// Nodes that must be realised first
    pub depends_on: Vec<Urn>,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Declare a managed resource
    Declare,
    /// Read an existing provider object
    Lookup,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Declare => write!(f, "declare"),
            ActionType::Lookup => write!(f, "lookup"),
        }
    }
}

/// Result of submitting a deployment to an engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResult {
    /// Engine that received the deployment
    pub engine: String,

    /// Where the deployment document was written, if anywhere
    pub document_path: Option<PathBuf>,

    /// Number of nodes submitted
    pub resources: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

/// Ordered actions for one stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    /// Builds the plan from the graph's topological order
    pub fn from_graph(graph: &ResourceGraph) -> Result<Self> {
        let actions = graph
            .topological_order()?
            .into_iter()
            .enumerate()
            .map(|(i, node)| {
                let action_type = if node.kind.is_lookup() {
                    ActionType::Lookup
                } else {
                    ActionType::Declare
                };
                Action {
                    id: format!("{:02}-{}", i + 1, node.name),
                    action_type,
                    resource_type: node.kind.to_string(),
                    urn: node.urn.clone(),
                    description: format!("{} {}", action_type, node.name),
                    depends_on: node.depends_on.iter().cloned().collect(),
                }
            })
            .collect();
        Ok(Self { actions })
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Position of `urn` in the plan
    pub fn position(&self, urn: &Urn) -> Option<usize> {
        self.actions.iter().position(|a| &a.urn == urn)
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            declare: self.actions_by_type(ActionType::Declare).len(),
            lookup: self.actions_by_type(ActionType::Lookup).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub declare: usize,
    pub lookup: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to declare, {} to look up",
            self.declare, self.lookup
        )
    }
}
