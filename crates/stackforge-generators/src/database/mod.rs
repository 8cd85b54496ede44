//! Relational schema and persistence-model generation.

mod models;
mod relational;

pub use relational::RelationalSchemaGenerator;

use stackforge_core::domain::{
    Entity, Field, GenerationContext, Relation, RelationKind,
    transform::to_snake_case,
};

use crate::support::id_type;

/// What a stored column is for.
#[derive(Debug, Clone, Copy)]
enum Role<'a> {
    Key,
    Plain,
    Reference {
        relation: &'a Relation,
        target: &'a Entity,
    },
    Created,
    Updated,
}

/// One persisted property and its column.
#[derive(Debug, Clone)]
struct Stored<'a> {
    field: Field,
    column: String,
    role: Role<'a>,
}

impl<'a> Stored<'a> {
    fn new(field: Field, role: Role<'a>) -> Self {
        Self {
            column: to_snake_case(&field.name),
            field,
            role,
        }
    }
}

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

/// Columns of `entity` in table order: key, declared fields, foreign keys,
/// then the two timestamps. A missing `id` is added as uuid.
fn stored_fields<'a>(entity: &'a Entity, ctx: &'a GenerationContext) -> Vec<Stored<'a>> {
    let key = entity.field("id").cloned().map_or_else(
        || Field::new("id", "uuid"),
        |mut f| {
            f.required = Some(true);
            f
        },
    );
    let mut stored = vec![Stored::new(key, Role::Key)];

    stored.extend(
        entity
            .fields
            .iter()
            .filter(|f| {
                let camel = f.camel_name();
                !f.name.eq_ignore_ascii_case("id") && camel != CREATED_AT && camel != UPDATED_AT
            })
            .map(|f| Stored::new(f.clone(), Role::Plain)),
    );

    for relation in &entity.relations {
        if relation.kind != RelationKind::ManyToOne {
            continue;
        }
        let (Some(fk), Some(target)) = (relation.foreign_key(), ctx.entity(&relation.target)) else {
            continue;
        };
        let mut field = Field::new(fk, id_type(target).name());
        if !relation.is_required() {
            field = field.optional();
        }
        stored.push(Stored::new(field, Role::Reference { relation, target }));
    }

    stored.push(Stored::new(Field::new(CREATED_AT, "datetime"), Role::Created));
    stored.push(Stored::new(Field::new(UPDATED_AT, "datetime"), Role::Updated));
    stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackforge_core::domain::ProjectInfo;

    #[test]
    fn adds_key_foreign_keys_and_timestamps() {
        let ctx = GenerationContext::new(ProjectInfo::new("Shop"))
            .with_entity(Entity::new("Customer").with_field(Field::new("id", "int")))
            .with_entity(
                Entity::new("Order")
                    .with_field(Field::new("total", "decimal"))
                    .with_field(Field::new("createdAt", "datetime"))
                    .with_relation(Relation::many_to_one("Customer")),
            );
        let order = ctx.entity("Order").unwrap();

        let stored = stored_fields(order, &ctx);
        let columns: Vec<&str> = stored.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(
            columns,
            vec!["id", "total", "customer_id", "created_at", "updated_at"]
        );
        assert_eq!(stored[0].field.ty.name(), "uuid");
        assert_eq!(stored[2].field.ty.name(), "integer");
        assert!(matches!(stored[2].role, Role::Reference { .. }));
    }
}
