//! TypeORM and EF Core persistence models.

use stackforge_core::domain::{
    DatabaseEngine, Entity, GenerationContext, RelationKind,
    transform::{
        ImportSet, ScalarType, SemanticType, TargetSyntax, csharp_type, target_type,
        to_pascal_case, typeorm_column,
    },
};

use super::{Role, Stored};
use crate::support::{CodeWriter, cs_quoted, csharp_file, inverse_property, quoted, typescript_file};

const TYPEORM_SYMBOLS: &[&str] = &[
    "Column",
    "CreateDateColumn",
    "Entity",
    "JoinColumn",
    "ManyToOne",
    "OneToMany",
    "PrimaryColumn",
    "PrimaryGeneratedColumn",
    "UpdateDateColumn",
];

/// Targets of one-to-many relations declared on `entity`.
fn collections<'c>(entity: &Entity, ctx: &'c GenerationContext) -> Vec<(String, &'c Entity)> {
    entity
        .relations
        .iter()
        .filter(|r| r.kind == RelationKind::OneToMany)
        .filter_map(|r| ctx.entity(&r.target).map(|t| (r.property_name(), t)))
        .collect()
}

pub(super) fn typeorm_model(
    entity: &Entity,
    stored: &[Stored<'_>],
    ctx: &GenerationContext,
) -> String {
    let class = entity.singular();
    let mut imports = ImportSet::new();
    imports.named_all("typeorm", TYPEORM_SYMBOLS.iter().copied());

    let mut w = CodeWriter::new();
    w.line(format!(
        "@Entity({{ name: {} }})",
        quoted(&entity.table_name())
    ))
    .open(format!("export class {class} {{"));

    for (i, column) in stored.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        let ts = target_type(&column.field.ty, TargetSyntax::TypeScript);
        let name = column.field.camel_name();
        let column_name = quoted(&column.column);
        match column.role {
            Role::Key => {
                match column.field.ty {
                    SemanticType::Scalar(ScalarType::Uuid) => {
                        w.line("@PrimaryGeneratedColumn('uuid')")
                    }
                    SemanticType::Scalar(ScalarType::Integer) => w.line("@PrimaryGeneratedColumn()"),
                    _ => w.line(format!(
                        "@PrimaryColumn({{ type: {} }})",
                        quoted(typeorm_column(&column.field.ty))
                    )),
                };
                w.line(format!("{name}!: {ts};"));
            }
            Role::Created | Role::Updated => {
                let decorator = if matches!(column.role, Role::Created) {
                    "CreateDateColumn"
                } else {
                    "UpdateDateColumn"
                };
                w.line(format!("@{decorator}({{ name: {column_name} }})"))
                    .line(format!("{name}!: Date;"));
            }
            Role::Plain | Role::Reference { .. } => {
                let ty = quoted(typeorm_column(&column.field.ty));
                if column.field.is_required() {
                    w.line(format!("@Column({{ type: {ty}, name: {column_name} }})"))
                        .line(format!("{name}!: {ts};"));
                } else {
                    w.line(format!(
                        "@Column({{ type: {ty}, name: {column_name}, nullable: true }})"
                    ))
                    .line(format!("{name}?: {ts} | null;"));
                }
            }
        }

        if let Role::Reference { relation, target } = column.role {
            let target_class = target.singular();
            if target.singular() != class {
                imports.named(format!("./{}.model", target.file_stem()), target_class.clone());
            }
            w.blank()
                .line(format!(
                    "@ManyToOne(() => {target_class}, {{ nullable: {} }})",
                    !relation.is_required()
                ))
                .line(format!("@JoinColumn({{ name: {column_name} }})"))
                .line(format!("{}?: {target_class};", relation.property_name()));
        }
    }

    for (property, target) in collections(entity, ctx) {
        let target_class = target.singular();
        if target_class != class {
            imports.named(format!("./{}.model", target.file_stem()), target_class.clone());
        }
        let item = target.camel();
        w.blank()
            .line(format!(
                "@OneToMany(() => {target_class}, ({item}) => {item}.{})",
                inverse_property(entity, target)
            ))
            .line(format!("{property}?: {target_class}[];"));
    }
    w.close("}");

    typescript_file(&imports, &w.finish())
}

pub(super) fn typeorm_data_source(entities: &[&Entity], engine: DatabaseEngine) -> String {
    let (driver, port) = match engine {
        DatabaseEngine::PostgreSql => ("postgres", 5432),
        DatabaseEngine::AzureSql => ("mssql", 1433),
        DatabaseEngine::MySql => ("mysql", 3306),
    };

    let mut imports = ImportSet::new();
    imports.named("typeorm", "DataSource");
    for entity in entities {
        imports.named(format!("./models/{}.model", entity.file_stem()), entity.singular());
    }
    let classes: Vec<String> = entities.iter().map(|e| e.singular()).collect();

    let mut w = CodeWriter::new();
    w.open("export const AppDataSource = new DataSource({")
        .line(format!("type: {},", quoted(driver)))
        .line("host: process.env.DB_HOST ?? 'localhost',")
        .line(format!("port: Number(process.env.DB_PORT ?? {port}),"))
        .line("username: process.env.DB_USER,")
        .line("password: process.env.DB_PASSWORD,")
        .line("database: process.env.DB_NAME,")
        .line(format!("entities: [{}],", classes.join(", ")))
        .line("synchronize: false,")
        .close("});");

    format!("import 'reflect-metadata';\n{}", typescript_file(&imports, &w.finish()))
}

const EF_USINGS: &[(&str, &[&str])] = &[
    ("System", &["Guid", "DateOnly", "DateTime"]),
    ("System.Collections.Generic", &["List"]),
    ("System.ComponentModel.DataAnnotations", &["Key"]),
    (
        "System.ComponentModel.DataAnnotations.Schema",
        &["Table", "Column", "ForeignKey", "DatabaseGenerated", "DatabaseGeneratedOption"],
    ),
    ("Microsoft.EntityFrameworkCore", &["DbContext", "DbContextOptions", "DbSet"]),
];

fn ef_usings() -> ImportSet {
    let mut imports = ImportSet::new();
    for (namespace, symbols) in EF_USINGS {
        imports.named_all(namespace, symbols.iter().copied());
    }
    imports
}

/// Initializer that keeps a non-nullable reference property warning-free.
fn initializer(column: &Stored<'_>) -> &'static str {
    let value_type = column.field.ty.def().is_some_and(|d| d.csharp_value_type);
    if !column.field.is_required() || value_type {
        ""
    } else if target_type(&column.field.ty, TargetSyntax::CSharp) == "string" {
        " = string.Empty;"
    } else {
        " = default!;"
    }
}

pub(super) fn ef_core_model(
    entity: &Entity,
    stored: &[Stored<'_>],
    ctx: &GenerationContext,
    namespace: &str,
) -> String {
    let mut w = CodeWriter::with_unit("    ");
    w.line(format!("namespace {namespace}.Models;"))
        .blank()
        .line(format!("[Table({})]", cs_quoted(&entity.table_name())))
        .line(format!("public class {}", entity.singular()))
        .open("{");

    for (i, column) in stored.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        let property = column.field.pascal_name();
        let ty = csharp_type(&column.field.ty, column.field.is_required());
        if matches!(column.role, Role::Key) {
            w.line("[Key]");
            if column.field.ty == SemanticType::Scalar(ScalarType::Integer) {
                w.line("[DatabaseGenerated(DatabaseGeneratedOption.Identity)]");
            }
        }
        w.line(format!("[Column({})]", cs_quoted(&column.column)))
            .line(format!(
                "public {ty} {property} {{ get; set; }}{}",
                initializer(column)
            ));

        if let Role::Reference { relation, target } = column.role {
            w.blank()
                .line(format!("[ForeignKey(nameof({property}))]"))
                .line(format!(
                    "public {}? {} {{ get; set; }}",
                    target.singular(),
                    to_pascal_case(&relation.property_name())
                ));
        }
    }

    for (property, target) in collections(entity, ctx) {
        w.blank().line(format!(
            "public List<{}> {} {{ get; set; }} = new();",
            target.singular(),
            to_pascal_case(&property)
        ));
    }
    w.close("}");

    csharp_file(&ef_usings(), &w.finish())
}

pub(super) fn ef_core_context(entities: &[&Entity], namespace: &str) -> String {
    let mut imports = ef_usings();
    for entity in entities {
        imports.named(format!("{namespace}.Models"), entity.singular());
    }

    let mut w = CodeWriter::with_unit("    ");
    w.line(format!("namespace {namespace};"))
        .blank()
        .line("public class AppDbContext : DbContext")
        .open("{")
        .line("public AppDbContext(DbContextOptions<AppDbContext> options)")
        .line("    : base(options)")
        .line("{")
        .line("}");
    for entity in entities {
        let class = entity.singular();
        w.blank().line(format!(
            "public DbSet<{class}> {} => Set<{class}>();",
            entity.plural()
        ));
    }
    w.close("}");

    csharp_file(&imports, &w.finish())
}

pub(super) fn ef_core_project(engine: DatabaseEngine, namespace: &str) -> String {
    let provider = match engine {
        DatabaseEngine::PostgreSql => ("Npgsql.EntityFrameworkCore.PostgreSQL", "8.0.4"),
        DatabaseEngine::AzureSql => ("Microsoft.EntityFrameworkCore.SqlServer", "8.0.8"),
        DatabaseEngine::MySql => ("Pomelo.EntityFrameworkCore.MySql", "8.0.2"),
    };

    let mut w = CodeWriter::new();
    w.line("<Project Sdk=\"Microsoft.NET.Sdk\">")
        .blank()
        .open("  <PropertyGroup>")
        .line("  <TargetFramework>net8.0</TargetFramework>")
        .line("  <Nullable>enable</Nullable>")
        .line("  <ImplicitUsings>disable</ImplicitUsings>")
        .line(format!("  <RootNamespace>{namespace}</RootNamespace>"))
        .close("  </PropertyGroup>")
        .blank()
        .open("  <ItemGroup>");
    for (name, version) in [("Microsoft.EntityFrameworkCore", "8.0.8"), provider] {
        w.line(format!("  <PackageReference Include=\"{name}\" Version=\"{version}\" />"));
    }
    w.close("  </ItemGroup>").blank().line("</Project>");
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::stored_fields;
    use stackforge_core::domain::{Field, ProjectInfo, Relation};

    fn context() -> GenerationContext {
        GenerationContext::new(ProjectInfo::new("Billing"))
            .with_entity(
                Entity::new("Invoice")
                    .with_field(Field::new("amount", "decimal"))
                    .with_field(Field::new("notes", "text").optional())
                    .with_relation(Relation::one_to_many("LineItem")),
            )
            .with_entity(
                Entity::new("LineItem")
                    .with_field(Field::new("quantity", "int"))
                    .with_relation(Relation::many_to_one("Invoice")),
            )
    }

    #[test]
    fn typeorm_model_maps_columns_and_relations() {
        let ctx = context();
        let line = ctx.entity("LineItem").unwrap();
        let model = typeorm_model(line, &stored_fields(line, &ctx), &ctx);

        assert!(model.starts_with(
            "import { Column, CreateDateColumn, Entity, JoinColumn, ManyToOne, PrimaryGeneratedColumn, UpdateDateColumn } from 'typeorm';\nimport { Invoice } from './invoice.model';\n"
        ));
        assert!(model.contains("@Entity({ name: 'line_items' })"));
        assert!(model.contains("  @Column({ type: 'int', name: 'quantity' })\n  quantity!: number;"));
        assert!(model.contains("  @ManyToOne(() => Invoice, { nullable: false })\n  @JoinColumn({ name: 'invoice_id' })\n  invoice?: Invoice;"));
        assert!(model.contains("  @CreateDateColumn({ name: 'created_at' })\n  createdAt!: Date;"));

        let invoice = ctx.entity("Invoice").unwrap();
        let model = typeorm_model(invoice, &stored_fields(invoice, &ctx), &ctx);
        assert!(model.contains("  @Column({ type: 'text', name: 'notes', nullable: true })\n  notes?: string | null;"));
        assert!(model.contains("@OneToMany(() => LineItem, (lineItem) => lineItem.invoice)"));
        assert!(model.contains("lineItems?: LineItem[];"));
    }

    #[test]
    fn ef_core_model_uses_data_annotations() {
        let ctx = context();
        let invoice = ctx.entity("Invoice").unwrap();
        let model = ef_core_model(invoice, &stored_fields(invoice, &ctx), &ctx, "Billing.Data");

        assert!(model.starts_with(
            "using System;\nusing System.Collections.Generic;\nusing System.ComponentModel.DataAnnotations;\nusing System.ComponentModel.DataAnnotations.Schema;\n\nnamespace Billing.Data.Models;"
        ));
        assert!(model.contains("    [Key]\n    [Column(\"id\")]\n    public Guid Id { get; set; }"));
        assert!(model.contains("public decimal Amount { get; set; }\n"));
        assert!(model.contains("public string? Notes { get; set; }\n"));
        assert!(model.contains("public List<LineItem> LineItems { get; set; } = new();"));

        let context = ef_core_context(&[invoice], "Billing.Data");
        assert!(context.contains("using Billing.Data.Models;"));
        assert!(context.contains("public DbSet<Invoice> Invoices => Set<Invoice>();"));
    }

    #[test]
    fn data_source_lists_every_model() {
        let ctx = context();
        let entities: Vec<&Entity> = ctx.entities.iter().collect();
        let source = typeorm_data_source(&entities, DatabaseEngine::MySql);
        assert!(source.starts_with("import 'reflect-metadata';\n"));
        assert!(source.contains("import { LineItem } from './models/line-item.model';"));
        assert!(source.contains("type: 'mysql',"));
        assert!(source.contains("entities: [Invoice, LineItem],"));
    }
}
