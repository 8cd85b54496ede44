//! Generation Service - the dispatcher.
//!
//! This service coordinates one synthesis run:
//! 1. Validate the descriptor and the requested facet subset
//! 2. Select supporting generators, highest priority first
//! 3. Fail fast on any requested facet no generator covers
//! 4. Invoke generators (on the rayon pool when parallel)
//! 5. Merge outputs in priority order, rejecting path conflicts and
//!    failures of blocking generators

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError, GenerationError,
        ports::{Generator, GeneratorOutput},
        services::{registry::GeneratorRegistry, validator},
    },
    domain::{DomainValidator as validate, Facet, FileArtifact, GenerationContext, StackDescriptor, ValidationSummary},
    error::SynthResult,
};

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub run_id: Uuid,
    /// Artifacts in generator priority order, then generator emission order.
    pub artifacts: Vec<FileArtifact>,
    /// Non-fatal failures from non-blocking generators.
    pub failures: Vec<GenerationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationSummary>,
}

impl GenerationOutcome {
    pub fn artifact(&self, path: &str) -> Option<&FileArtifact> {
        self.artifacts.iter().find(|a| a.path() == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.artifacts.iter().map(FileArtifact::path).collect()
    }

    pub fn total_bytes(&self) -> usize {
        self.artifacts.iter().map(FileArtifact::size).sum()
    }

    /// No generator reported a failure.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Run the heuristic validator over the artifacts and attach the summary.
    pub fn validate(&mut self) -> &ValidationSummary {
        self.validation.insert(validator::validate_artifacts(&self.artifacts))
    }
}

/// Dispatches a run across the registered generators.
#[derive(Debug, Clone)]
pub struct GenerationService {
    registry: Arc<GeneratorRegistry>,
    parallel: bool,
}

impl GenerationService {
    pub fn new(registry: GeneratorRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            parallel: true,
        }
    }

    /// Run generators on the rayon pool (default) or one after another.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Generate every facet the descriptor requests.
    pub fn run(
        &self,
        descriptor: &StackDescriptor,
        ctx: &GenerationContext,
    ) -> SynthResult<GenerationOutcome> {
        self.run_facets(descriptor, ctx, &descriptor.requested_facets())
    }

    /// Generate only `facets`. Generators for other facets are not invoked.
    #[instrument(
        skip_all,
        fields(
            stack = %descriptor,
            project = %ctx.project.name,
            facets = ?facets,
            parallel = self.parallel
        )
    )]
    pub fn run_facets(
        &self,
        descriptor: &StackDescriptor,
        ctx: &GenerationContext,
        facets: &[Facet],
    ) -> SynthResult<GenerationOutcome> {
        validate::validate_descriptor(descriptor)?;

        let mut facets = facets.to_vec();
        facets.sort();
        facets.dedup();
        if let Some(&facet) = facets.iter().find(|f| !descriptor.requests(**f)) {
            return Err(ApplicationError::FacetNotRequested {
                facet,
                stack: descriptor.to_string(),
            }
            .into());
        }

        let selected: Vec<Arc<dyn Generator>> = self
            .registry
            .select(descriptor)
            .into_iter()
            .filter(|g| facets.contains(&g.facet()))
            .collect();

        for &facet in &facets {
            if !selected.iter().any(|g| g.facet() == facet) {
                warn!(%facet, "No generator covers requested facet");
                return Err(ApplicationError::Configuration {
                    facet,
                    stack: descriptor.to_string(),
                }
                .into());
            }
        }

        info!(
            generators = ?selected.iter().map(|g| g.id()).collect::<Vec<_>>(),
            "Dispatching generators"
        );

        let outputs: Vec<GeneratorOutput> = if self.parallel {
            selected.par_iter().map(|g| invoke(g.as_ref(), ctx, descriptor)).collect()
        } else {
            selected.iter().map(|g| invoke(g.as_ref(), ctx, descriptor)).collect()
        };

        let outcome = merge(&selected, outputs)?;
        info!(
            run_id = %outcome.run_id,
            artifacts = outcome.artifacts.len(),
            failures = outcome.failures.len(),
            bytes = outcome.total_bytes(),
            "Generation completed"
        );
        Ok(outcome)
    }
}

fn invoke(
    generator: &dyn Generator,
    ctx: &GenerationContext,
    descriptor: &StackDescriptor,
) -> GeneratorOutput {
    let output = generator.generate(ctx, descriptor);
    debug!(
        generator = generator.id(),
        artifacts = output.artifacts.len(),
        errors = output.errors.len(),
        "Generator finished"
    );
    output
}

/// Merge outputs in selection (priority) order, never completion order.
fn merge(
    selected: &[Arc<dyn Generator>],
    outputs: Vec<GeneratorOutput>,
) -> SynthResult<GenerationOutcome> {
    let mut artifacts = Vec::new();
    let mut failures = Vec::new();
    let mut owners: HashMap<String, &'static str> = HashMap::new();

    for (generator, output) in selected.iter().zip(outputs) {
        if generator.is_blocking() {
            if let Some(error) = output.errors.first() {
                return Err(ApplicationError::BlockingGeneratorFailed {
                    generator: generator.id().to_string(),
                    facet: generator.facet(),
                    reason: format!("{}: {}", error.subject, error.reason),
                }
                .into());
            }
        }
        for error in output.errors {
            warn!(%error, "Generator reported a failure");
            failures.push(error);
        }

        for artifact in output.artifacts {
            if let Some(first) = owners.insert(artifact.path().to_string(), generator.id()) {
                return Err(ApplicationError::PathConflict {
                    path: artifact.path().to_string(),
                    first: first.to_string(),
                    second: generator.id().to_string(),
                }
                .into());
            }
            artifacts.push(artifact);
        }
    }

    Ok(GenerationOutcome {
        run_id: Uuid::new_v4(),
        artifacts,
        failures,
        validation: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockGenerator;
    use crate::domain::{
        ArtifactKind, DatabaseEngine, ProjectInfo, ServerFramework, UiFramework,
    };
    use crate::error::SynthError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn artifact(path: &str, generator: &str) -> FileArtifact {
        FileArtifact::new(path, "content", ArtifactKind::Config, generator).unwrap()
    }

    struct Spec {
        id: &'static str,
        facet: Facet,
        priority: i32,
        blocking: bool,
        paths: Vec<&'static str>,
        errors: usize,
        delay_ms: u64,
    }

    impl Spec {
        fn new(id: &'static str, facet: Facet, priority: i32) -> Self {
            Self {
                id,
                facet,
                priority,
                blocking: false,
                paths: vec![],
                errors: 0,
                delay_ms: 0,
            }
        }
        fn paths(mut self, paths: &[&'static str]) -> Self {
            self.paths = paths.to_vec();
            self
        }
        fn blocking(mut self) -> Self {
            self.blocking = true;
            self
        }
        fn failing(mut self) -> Self {
            self.errors = 1;
            self
        }
        fn delay(mut self, ms: u64) -> Self {
            self.delay_ms = ms;
            self
        }
        fn build(self) -> MockGenerator {
            let mut g = MockGenerator::new();
            g.expect_id().return_const(self.id);
            g.expect_facet().return_const(self.facet);
            g.expect_priority().return_const(self.priority);
            g.expect_supports().return_const(true);
            g.expect_is_blocking().return_const(self.blocking);
            let (id, facet, paths, errors, delay) =
                (self.id, self.facet, self.paths, self.errors, self.delay_ms);
            g.expect_generate().returning(move |_, _| {
                std::thread::sleep(Duration::from_millis(delay));
                GeneratorOutput {
                    artifacts: paths.iter().map(|p| artifact(p, id)).collect(),
                    errors: (0..errors)
                        .map(|_| GenerationError::new(id, facet, "Widget", "malformed"))
                        .collect(),
                }
            });
            g
        }
    }

    fn full_stack() -> StackDescriptor {
        StackDescriptor::builder()
            .ui(UiFramework::React)
            .server(ServerFramework::Express)
            .database(DatabaseEngine::PostgreSql)
            .build()
            .unwrap()
    }

    fn ctx() -> GenerationContext {
        GenerationContext::new(ProjectInfo::new("demo"))
    }

    fn service(specs: Vec<Spec>) -> GenerationService {
        let mut registry = GeneratorRegistry::new();
        for spec in specs {
            registry.register(Arc::new(spec.build()));
        }
        GenerationService::new(registry)
    }

    #[test]
    fn output_follows_priority_not_completion_order() {
        let service = service(vec![
            Spec::new("ui", Facet::Ui, 60).paths(&["web/a.tsx"]),
            Spec::new("server", Facet::Server, 100).paths(&["api/app.ts"]).delay(50),
            Spec::new("db", Facet::Database, 80).paths(&["database/schema.sql"]),
        ]);

        let outcome = service.run(&full_stack(), &ctx()).unwrap();
        assert_eq!(
            outcome.paths(),
            vec!["api/app.ts", "database/schema.sql", "web/a.tsx"]
        );
        assert!(outcome.is_complete());
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let build = || {
            service(vec![
                Spec::new("ui", Facet::Ui, 60).paths(&["web/a.tsx", "web/b.tsx"]),
                Spec::new("server", Facet::Server, 100).paths(&["api/app.ts"]),
                Spec::new("db", Facet::Database, 80).paths(&["database/schema.sql"]),
            ])
        };
        let parallel = build().run(&full_stack(), &ctx()).unwrap();
        let sequential = build().with_parallel(false).run(&full_stack(), &ctx()).unwrap();
        assert_eq!(parallel.artifacts, sequential.artifacts);
        assert_ne!(parallel.run_id, sequential.run_id);
    }

    #[test]
    fn duplicate_path_is_a_fatal_conflict() {
        let service = service(vec![
            Spec::new("ui", Facet::Ui, 60).paths(&["shared/config.json"]),
            Spec::new("server", Facet::Server, 100).paths(&["shared/config.json"]),
            Spec::new("db", Facet::Database, 80),
        ]);

        match service.run(&full_stack(), &ctx()) {
            Err(SynthError::Application(ApplicationError::PathConflict { path, first, second })) => {
                assert_eq!(path, "shared/config.json");
                assert_eq!(first, "server");
                assert_eq!(second, "ui");
            }
            other => panic!("expected a path conflict, got {other:?}"),
        }
    }

    #[test]
    fn same_generator_emitting_a_path_twice_conflicts() {
        let service = service(vec![
            Spec::new("ui", Facet::Ui, 60).paths(&["web/a.tsx", "web/a.tsx"]),
            Spec::new("server", Facet::Server, 100),
            Spec::new("db", Facet::Database, 80),
        ]);
        assert!(matches!(
            service.run(&full_stack(), &ctx()),
            Err(SynthError::Application(ApplicationError::PathConflict { .. }))
        ));
    }

    #[test]
    fn uncovered_facet_is_a_configuration_error() {
        let service = service(vec![
            Spec::new("server", Facet::Server, 100),
            Spec::new("db", Facet::Database, 80),
        ]);
        match service.run(&full_stack(), &ctx()) {
            Err(SynthError::Application(ApplicationError::Configuration { facet, .. })) => {
                assert_eq!(facet, Facet::Ui);
            }
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn blocking_failure_is_fatal() {
        let service = service(vec![
            Spec::new("ui", Facet::Ui, 60),
            Spec::new("server", Facet::Server, 100).blocking().failing(),
            Spec::new("db", Facet::Database, 80),
        ]);
        assert!(matches!(
            service.run(&full_stack(), &ctx()),
            Err(SynthError::Application(ApplicationError::BlockingGeneratorFailed { .. }))
        ));
    }

    #[test]
    fn non_blocking_failure_is_recorded() {
        let service = service(vec![
            Spec::new("ui", Facet::Ui, 60).paths(&["web/a.tsx"]).failing(),
            Spec::new("server", Facet::Server, 100).blocking().paths(&["api/app.ts"]),
            Spec::new("db", Facet::Database, 80),
        ]);
        let outcome = service.run(&full_stack(), &ctx()).unwrap();
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].generator, "ui");
        assert_eq!(outcome.artifacts.len(), 2);
    }

    #[test]
    fn subset_run_does_not_invoke_other_facets() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut ui = MockGenerator::new();
        ui.expect_id().return_const("ui");
        ui.expect_facet().return_const(Facet::Ui);
        ui.expect_priority().return_const(60);
        ui.expect_supports().return_const(true);
        ui.expect_is_blocking().return_const(false);
        let counter = Arc::clone(&calls);
        ui.expect_generate().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            GeneratorOutput::default()
        });

        let registry = GeneratorRegistry::new()
            .with(Arc::new(ui))
            .with(Arc::new(Spec::new("server", Facet::Server, 100).paths(&["api/app.ts"]).build()))
            .with(Arc::new(Spec::new("db", Facet::Database, 80).build()));
        let service = GenerationService::new(registry);

        let outcome = service
            .run_facets(&full_stack(), &ctx(), &[Facet::Server])
            .unwrap();
        assert_eq!(outcome.paths(), vec!["api/app.ts"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subset_must_be_part_of_the_stack() {
        let stack = StackDescriptor::builder()
            .server(ServerFramework::Express)
            .build()
            .unwrap();
        let service = service(vec![Spec::new("server", Facet::Server, 100)]);
        assert!(matches!(
            service.run_facets(&stack, &ctx(), &[Facet::Infrastructure]),
            Err(SynthError::Application(ApplicationError::FacetNotRequested { .. }))
        ));
    }
}
