//! Concrete generators for StackForge.
//!
//! This crate implements the `Generator` port defined in
//! `stackforge-core::application::ports`. Each generator renders one facet of
//! a stack with plain string builders; none of them touch the filesystem.

pub mod database;
pub mod infra;
pub mod server;
pub mod ui;

mod support;

use std::sync::Arc;

use stackforge_core::application::GeneratorRegistry;

// Re-export commonly used generators
pub use database::RelationalSchemaGenerator;
pub use infra::BicepInfraGenerator;
pub use server::{AspNetCoreGenerator, ExpressGenerator};
pub use ui::ReactGenerator;

/// A registry holding every builtin generator.
pub fn builtin_registry() -> GeneratorRegistry {
    GeneratorRegistry::new()
        .with(Arc::new(AspNetCoreGenerator::new()))
        .with(Arc::new(ExpressGenerator::new()))
        .with(Arc::new(RelationalSchemaGenerator::new()))
        .with(Arc::new(ReactGenerator::new()))
        .with(Arc::new(BicepInfraGenerator::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_registers_all_generators() {
        let registry = builtin_registry();
        assert_eq!(
            registry.ids(),
            vec![
                "aspnetcore-server",
                "express-server",
                "relational-schema",
                "react-ui",
                "bicep-infra"
            ]
        );
    }
}
