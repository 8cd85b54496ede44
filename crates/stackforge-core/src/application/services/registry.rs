//! Generator registry: an explicit value, threaded by reference.

use std::fmt;
use std::sync::Arc;

use crate::application::ports::Generator;
use crate::domain::{Facet, StackDescriptor};

/// Registered generators, in registration order.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: Vec<Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, generator: Arc<dyn Generator>) -> &mut Self {
        self.generators.push(generator);
        self
    }

    /// Builder-style `register`.
    pub fn with(mut self, generator: Arc<dyn Generator>) -> Self {
        self.register(generator);
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.generators.iter().map(|g| g.id()).collect()
    }

    /// Generators supporting `descriptor`, highest priority first.
    ///
    /// The sort is stable: equal priorities keep registration order.
    pub fn select(&self, descriptor: &StackDescriptor) -> Vec<Arc<dyn Generator>> {
        let mut selected: Vec<Arc<dyn Generator>> = self
            .generators
            .iter()
            .filter(|g| descriptor.requests(g.facet()) && g.supports(descriptor))
            .cloned()
            .collect();
        selected.sort_by_key(|g| std::cmp::Reverse(g.priority()));
        selected
    }

    /// Whether any registered generator supports `descriptor` for `facet`.
    pub fn covers(&self, facet: Facet, descriptor: &StackDescriptor) -> bool {
        self.generators
            .iter()
            .any(|g| g.facet() == facet && g.supports(descriptor))
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockGenerator;
    use crate::domain::{DatabaseEngine, ServerFramework};

    fn mock(id: &'static str, facet: Facet, priority: i32, supports: bool) -> Arc<dyn Generator> {
        let mut g = MockGenerator::new();
        g.expect_id().return_const(id);
        g.expect_facet().return_const(facet);
        g.expect_priority().return_const(priority);
        g.expect_supports().return_const(supports);
        Arc::new(g)
    }

    fn stack() -> StackDescriptor {
        StackDescriptor::builder()
            .server(ServerFramework::Express)
            .database(DatabaseEngine::PostgreSql)
            .build()
            .unwrap()
    }

    #[test]
    fn select_orders_by_priority_then_registration() {
        let registry = GeneratorRegistry::new()
            .with(mock("db", Facet::Database, 80, true))
            .with(mock("server-a", Facet::Server, 100, true))
            .with(mock("server-b", Facet::Server, 100, true));

        let ids: Vec<_> = registry.select(&stack()).iter().map(|g| g.id()).collect();
        assert_eq!(ids, vec!["server-a", "server-b", "db"]);
    }

    #[test]
    fn unsupported_and_unrequested_generators_are_skipped() {
        let registry = GeneratorRegistry::new()
            .with(mock("aspnet", Facet::Server, 100, false))
            .with(mock("react", Facet::Ui, 60, true))
            .with(mock("db", Facet::Database, 80, true));

        let ids: Vec<_> = registry.select(&stack()).iter().map(|g| g.id()).collect();
        assert_eq!(ids, vec!["db"]);
        assert!(!registry.covers(Facet::Server, &stack()));
        assert_eq!(registry.len(), 3);
    }
}
