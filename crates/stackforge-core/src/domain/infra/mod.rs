//! Infrastructure resource resolution.
//!
//! Requested capabilities map to resource nodes ([`rules`]), whose output
//! references form a dependency graph ([`graph`]) that must be acyclic and
//! is emitted in a deterministic topological order.

pub mod graph;
pub mod resource;
pub mod rules;

pub use graph::{ResourceEdge, ResourceGraph};
pub use resource::{ConfigValue, OutputDef, RESOURCE_REGISTRY, ResourceDef, ResourceKind, ResourceNode};
pub use rules::{GLOBAL_PARAMS, ParamSpec, RESOURCE_PARAMS, param_spec, resolve_graph, resolve_resources};
