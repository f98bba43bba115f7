//! blogstack cloud model
//!
//! Typed resource descriptors, deferred outputs and the dependency graph
//! that make up a stack's deployment, plus the seam to the external
//! infrastructure-as-code engine that actually provisions it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 blogstack CLI                    │
//! │          (preview / export / outputs)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │ Deployment
//! ┌─────────────────▼───────────────────────────────┐
//! │                blogstack-cloud                   │
//! │  ┌────────────┐ ┌─────────────┐ ┌────────────┐  │
//! │  │ resources  │ │ ResourceGraph│ │  Output   │  │
//! │  └────────────┘ └─────────────┘ └────────────┘  │
//! │  ┌──────────────────────────┐  ┌────────────┐   │
//! │  │  trait Engine { ... }    │  │ State Mgmt │   │
//! │  └──────────────────────────┘  └────────────┘   │
//! └─────────────────┬───────────────────────────────┘
//!                   │ deployment document (JSON)
//!          ┌────────▼────────┐
//!          │ external engine │
//!          └─────────────────┘
//! ```

pub mod action;
pub mod deployment;
pub mod engine;
pub mod error;
pub mod graph;
pub mod output;
pub mod resource;
pub mod secret;
pub mod state;

// Re-exports
pub use action::{Action, ActionType, Plan, PlanSummary, SubmitResult};
pub use deployment::{DOCUMENT_VERSION, Deployment};
pub use engine::{DocumentEngine, Engine};
pub use error::{CloudError, Result};
pub use graph::{ResourceGraph, ResourceNode, ResourceOptions};
pub use output::{AttributeRef, Attributes, Output};
pub use resource::{Handle, ResourceKind, ResourceSpec, Urn};
pub use secret::{REDACTED, Secret};
pub use state::{StackState, StateLock, StateManager};
