use stackforge_core::{
    application::ports::{Generator, GeneratorOutput},
    domain::{
        ArtifactKind, DatabaseEngine, Entity, Facet, GenerationContext, ModelFlavor,
        StackDescriptor,
        transform::{ScalarType, SemanticType, column_type},
    },
};
use tracing::{debug, instrument};

use super::{Role, Stored, models, stored_fields};
use crate::support::{CodeWriter, Sink};

const ID: &str = "relational-schema";

/// Emits the initial SQL migration and one persistence model per entity.
pub struct RelationalSchemaGenerator;

impl RelationalSchemaGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RelationalSchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RelationalSchemaGenerator {
    fn id(&self) -> &'static str {
        ID
    }

    fn facet(&self) -> Facet {
        Facet::Database
    }

    fn supports(&self, descriptor: &StackDescriptor) -> bool {
        descriptor.database().is_some()
    }

    fn priority(&self) -> i32 {
        80
    }

    #[instrument(skip_all, fields(generator = ID, entities = ctx.entities.len()))]
    fn generate(&self, ctx: &GenerationContext, descriptor: &StackDescriptor) -> GeneratorOutput {
        let mut sink = Sink::new(ID, Facet::Database);
        let Some(database) = descriptor.database() else {
            sink.fail("database", "no database selection in the stack");
            return sink.finish();
        };
        let engine = database.engine;
        let flavor = descriptor.model_flavor();
        debug!(engine = %engine, models = %flavor, "Rendering schema");

        let entities = sink.valid_entities(ctx);
        let tables: Vec<(&Entity, Vec<Stored<'_>>)> = entities
            .iter()
            .map(|e| (*e, stored_fields(e, ctx)))
            .collect();

        sink.emit(
            "database/migrations/0001_initial_schema.sql",
            ArtifactKind::Schema,
            migration(ctx, engine, &tables),
        );

        match flavor {
            ModelFlavor::TypeOrm => {
                for (entity, stored) in &tables {
                    sink.emit(
                        format!("database/models/{}.model.ts", entity.file_stem()),
                        ArtifactKind::PersistenceModel,
                        models::typeorm_model(entity, stored, ctx),
                    );
                }
                sink.emit(
                    "database/data-source.ts",
                    ArtifactKind::Config,
                    models::typeorm_data_source(&entities, engine),
                );
            }
            ModelFlavor::EfCore => {
                let namespace = format!("{}.Data", ctx.project.pascal_name());
                for (entity, stored) in &tables {
                    sink.emit(
                        format!("database/Models/{}.cs", entity.singular()),
                        ArtifactKind::PersistenceModel,
                        models::ef_core_model(entity, stored, ctx, &namespace),
                    );
                }
                sink.emit(
                    "database/AppDbContext.cs",
                    ArtifactKind::Config,
                    models::ef_core_context(&entities, &namespace),
                );
                sink.emit(
                    format!("database/{namespace}.csproj"),
                    ArtifactKind::Manifest,
                    models::ef_core_project(engine, &namespace),
                );
            }
        }
        sink.finish()
    }
}

fn key_default(ty: &SemanticType, engine: DatabaseEngine) -> Option<&'static str> {
    match (ty, engine) {
        (SemanticType::Scalar(ScalarType::Uuid), DatabaseEngine::PostgreSql) => {
            Some("DEFAULT gen_random_uuid()")
        }
        (SemanticType::Scalar(ScalarType::Uuid), DatabaseEngine::AzureSql) => Some("DEFAULT NEWID()"),
        (SemanticType::Scalar(ScalarType::Uuid), DatabaseEngine::MySql) => Some("DEFAULT (UUID())"),
        (SemanticType::Scalar(ScalarType::Integer), DatabaseEngine::PostgreSql) => {
            Some("GENERATED BY DEFAULT AS IDENTITY")
        }
        (SemanticType::Scalar(ScalarType::Integer), DatabaseEngine::AzureSql) => Some("IDENTITY(1,1)"),
        (SemanticType::Scalar(ScalarType::Integer), DatabaseEngine::MySql) => Some("AUTO_INCREMENT"),
        _ => None,
    }
}

const fn now(engine: DatabaseEngine) -> &'static str {
    match engine {
        DatabaseEngine::AzureSql => "SYSUTCDATETIME()",
        DatabaseEngine::PostgreSql | DatabaseEngine::MySql => "CURRENT_TIMESTAMP",
    }
}

fn column_definition(stored: &Stored<'_>, engine: DatabaseEngine) -> String {
    let mut parts = vec![
        engine.quote_ident(&stored.column),
        column_type(&stored.field.ty, engine).to_string(),
    ];
    if stored.field.is_required() {
        parts.push("NOT NULL".to_string());
    }
    match stored.role {
        Role::Key => parts.extend(key_default(&stored.field.ty, engine).map(str::to_string)),
        Role::Created | Role::Updated => parts.push(format!("DEFAULT {}", now(engine))),
        Role::Plain | Role::Reference { .. } => {}
    }
    parts.join(" ")
}

fn migration(
    ctx: &GenerationContext,
    engine: DatabaseEngine,
    tables: &[(&Entity, Vec<Stored<'_>>)],
) -> String {
    let q = |ident: &str| engine.quote_ident(ident);
    let mut w = CodeWriter::new();
    w.line(format!("-- Initial schema for {}", ctx.project.name))
        .line(format!("-- Engine: {engine}"));

    for (entity, stored) in tables {
        let table = entity.table_name();
        w.blank().open(format!("CREATE TABLE {} (", q(&table)));
        for column in stored {
            w.line(format!("{},", column_definition(column, engine)));
        }
        w.line(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            q(&format!("pk_{table}")),
            q("id")
        ))
        .close(");");
    }

    let references: Vec<(String, &Stored<'_>, &Entity)> = tables
        .iter()
        .flat_map(|(entity, stored)| {
            stored.iter().filter_map(move |s| match s.role {
                Role::Reference { target, .. } => Some((entity.table_name(), s, target)),
                _ => None,
            })
        })
        .collect();

    if !references.is_empty() {
        w.blank();
    }
    for (table, column, target) in &references {
        w.line(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({});",
            q(table),
            q(&format!("fk_{table}_{}", column.column)),
            q(&column.column),
            q(&target.table_name()),
            q("id")
        ));
    }
    for (table, column, _) in &references {
        w.line(format!(
            "CREATE INDEX {} ON {} ({});",
            q(&format!("ix_{table}_{}", column.column)),
            q(table),
            q(&column.column)
        ));
    }
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackforge_core::domain::{Field, ProjectInfo, Relation, ServerFramework};

    fn context() -> GenerationContext {
        GenerationContext::new(ProjectInfo::new("Billing"))
            .with_entity(Entity::new("Customer").with_field(Field::new("name", "string")))
            .with_entity(
                Entity::new("Invoice")
                    .with_field(Field::new("amount", "decimal"))
                    .with_field(Field::new("dueDate", "date"))
                    .with_field(Field::new("notes", "text").optional())
                    .with_relation(Relation::many_to_one("Customer")),
            )
    }

    fn stack(engine: DatabaseEngine, server: ServerFramework) -> StackDescriptor {
        StackDescriptor::builder()
            .server(server)
            .database(engine)
            .build()
            .unwrap()
    }

    fn artifact<'a>(out: &'a GeneratorOutput, path: &str) -> &'a str {
        out.artifacts
            .iter()
            .find(|a| a.path() == path)
            .map(|a| a.content())
            .unwrap_or_else(|| panic!("missing {path}"))
    }

    #[test]
    fn postgres_migration_creates_tables_then_constraints() {
        let out = RelationalSchemaGenerator::new()
            .generate(&context(), &stack(DatabaseEngine::PostgreSql, ServerFramework::Express));
        assert!(out.is_complete(), "{:?}", out.errors);

        let sql = artifact(&out, "database/migrations/0001_initial_schema.sql");
        assert!(sql.contains("CREATE TABLE \"invoices\" ("));
        assert!(sql.contains("  \"id\" UUID NOT NULL DEFAULT gen_random_uuid(),"));
        assert!(sql.contains("  \"amount\" NUMERIC(18,2) NOT NULL,"));
        assert!(sql.contains("  \"notes\" TEXT,"));
        assert!(sql.contains("  \"created_at\" TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,"));
        assert!(sql.contains(
            "ALTER TABLE \"invoices\" ADD CONSTRAINT \"fk_invoices_customer_id\" FOREIGN KEY (\"customer_id\") REFERENCES \"customers\" (\"id\");"
        ));
        let create = sql.find("CREATE TABLE \"customers\"").unwrap();
        let alter = sql.find("ALTER TABLE").unwrap();
        assert!(create < alter);
    }

    #[test]
    fn azure_sql_uses_bracket_quoting_and_engine_defaults() {
        let out = RelationalSchemaGenerator::new()
            .generate(&context(), &stack(DatabaseEngine::AzureSql, ServerFramework::AspNetCore));
        let sql = artifact(&out, "database/migrations/0001_initial_schema.sql");
        assert!(sql.contains("[id] UNIQUEIDENTIFIER NOT NULL DEFAULT NEWID(),"));
        assert!(sql.contains("DEFAULT SYSUTCDATETIME()"));
        assert!(sql.contains("CREATE INDEX [ix_invoices_customer_id] ON [invoices] ([customer_id]);"));
    }

    #[test]
    fn model_flavor_follows_the_server() {
        let ts = RelationalSchemaGenerator::new()
            .generate(&context(), &stack(DatabaseEngine::PostgreSql, ServerFramework::Express));
        assert!(ts.artifacts.iter().any(|a| a.path() == "database/models/invoice.model.ts"));
        assert!(ts.artifacts.iter().any(|a| a.path() == "database/data-source.ts"));

        let cs = RelationalSchemaGenerator::new()
            .generate(&context(), &stack(DatabaseEngine::AzureSql, ServerFramework::AspNetCore));
        assert!(cs.artifacts.iter().any(|a| a.path() == "database/Models/Invoice.cs"));
        assert!(cs.artifacts.iter().any(|a| a.path() == "database/AppDbContext.cs"));
        assert!(cs.artifacts.iter().any(|a| a.path() == "database/Billing.Data.csproj"));
    }

    #[test]
    fn malformed_entity_is_skipped_by_name() {
        let ctx = context().with_entity(
            Entity::new("Payment").with_relation(Relation::many_to_one("Ledger")),
        );
        let out = RelationalSchemaGenerator::new()
            .generate(&ctx, &stack(DatabaseEngine::MySql, ServerFramework::Express));

        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].subject, "Payment");
        let sql = artifact(&out, "database/migrations/0001_initial_schema.sql");
        assert!(sql.contains("CREATE TABLE `invoices` ("));
        assert!(!sql.contains("payments"));
    }
}
