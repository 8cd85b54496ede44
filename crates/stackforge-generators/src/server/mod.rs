//! HTTP API generators. Both own the application entry point and are
//! therefore blocking.

mod aspnet;
mod express;

pub use aspnet::AspNetCoreGenerator;
pub use express::ExpressGenerator;

use stackforge_core::domain::{Entity, Operation, OperationKind};

/// Whether `op` needs an authenticated caller.
fn mutates(op: &Operation) -> bool {
    op.method.has_body() || op.kind == OperationKind::Delete
}

/// CRUD operations that can be served from the generated in-memory store.
/// Item-level kinds need an `:id` route parameter; collection-level kinds
/// must not take one.
fn is_servable(op: &Operation) -> bool {
    match op.kind {
        OperationKind::List => op.path_params().is_empty(),
        OperationKind::Create => op.path_params().is_empty() && op.method.has_body(),
        OperationKind::Get | OperationKind::Delete => op.path_params() == ["id"],
        OperationKind::Update => op.path_params() == ["id"] && op.method.has_body(),
        OperationKind::Custom => false,
    }
}

/// Entities that declare injected dependencies.
fn with_dependencies<'a>(entities: &[&'a Entity]) -> Vec<&'a Entity> {
    entities
        .iter()
        .copied()
        .filter(|e| !e.dependencies.is_empty())
        .collect()
}
