use std::collections::HashSet;

use crate::domain::{
    entities::{ComponentSpec, Entity, GenerationContext, StackDescriptor},
    error::DomainError,
    transform::{to_camel_case, validate_identifier},
};

/// Centralized domain validation.
///
/// Generators validate one declared unit at a time so a malformed entity
/// fails alone; everything else still renders.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_descriptor(descriptor: &StackDescriptor) -> Result<(), DomainError> {
        descriptor.validate()
    }

    /// Check one entity against the context it is declared in.
    pub fn validate_entity(entity: &Entity, ctx: &GenerationContext) -> Result<(), DomainError> {
        let malformed = |reason: String| DomainError::MalformedEntity {
            entity: entity.name.clone(),
            reason,
        };

        validate_identifier("entity", &entity.name)
            .map_err(|e| malformed(e.to_string()))?;

        let same_name = ctx
            .entities
            .iter()
            .filter(|other| other.singular() == entity.singular())
            .count();
        if same_name > 1 {
            return Err(malformed(format!(
                "{same_name} entities resolve to the name '{}'",
                entity.singular()
            )));
        }

        let mut seen = HashSet::new();
        for field in &entity.fields {
            validate_identifier("field", &field.name).map_err(|e| malformed(e.to_string()))?;
            if !seen.insert(to_camel_case(&field.name)) {
                return Err(malformed(format!("field '{}' is declared twice", field.name)));
            }
        }

        for relation in &entity.relations {
            if ctx.entity(&relation.target).is_none() {
                return Err(DomainError::UnknownRelationTarget {
                    entity: entity.name.clone(),
                    target: relation.target.clone(),
                });
            }
            if !seen.insert(relation.property_name()) {
                return Err(malformed(format!(
                    "relation '{}' collides with another member",
                    relation.property_name()
                )));
            }
            if let Some(fk) = relation.foreign_key() {
                if !seen.insert(fk.clone()) {
                    return Err(malformed(format!(
                        "field '{fk}' collides with the foreign key of relation '{}'",
                        relation.property_name()
                    )));
                }
            }
        }

        let mut ops = HashSet::new();
        for op in &entity.operations {
            validate_identifier("operation", &op.name).map_err(|e| malformed(e.to_string()))?;
            if !ops.insert(to_camel_case(&op.name).to_ascii_lowercase()) {
                return Err(malformed(format!("operation '{}' is declared twice", op.name)));
            }
        }

        for binding in &entity.dependencies {
            validate_identifier("dependency", &binding.name)
                .map_err(|e| malformed(e.to_string()))?;
        }

        Ok(())
    }

    pub fn validate_component(
        component: &ComponentSpec,
        ctx: &GenerationContext,
    ) -> Result<(), DomainError> {
        let malformed = |reason: String| DomainError::MalformedComponent {
            component: component.name.clone(),
            reason,
        };

        validate_identifier("component", &component.name)
            .map_err(|e| malformed(e.to_string()))?;

        let mut seen = HashSet::new();
        for prop in &component.props {
            validate_identifier("prop", &prop.name).map_err(|e| malformed(e.to_string()))?;
            if !seen.insert(to_camel_case(&prop.name)) {
                return Err(malformed(format!("prop '{}' is declared twice", prop.name)));
            }
        }
        for provider in &component.providers {
            validate_identifier("provider", &provider.name)
                .map_err(|e| malformed(e.to_string()))?;
        }

        match &component.entity {
            Some(entity) if ctx.entity(entity).is_none() => {
                Err(malformed(format!("unknown entity '{entity}'")))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Field, OperationDecl, ProjectInfo, Relation};

    fn ctx(entities: Vec<Entity>) -> GenerationContext {
        let mut ctx = GenerationContext::new(ProjectInfo::new("billing"));
        ctx.entities = entities;
        ctx
    }

    #[test]
    fn well_formed_entity_passes() {
        let customer = Entity::new("Customer").with_field(Field::new("name", "string"));
        let invoice = Entity::new("Invoice")
            .with_field(Field::new("amount", "number"))
            .with_relation(Relation::many_to_one("Customer"));
        let ctx = ctx(vec![customer, invoice.clone()]);
        assert!(DomainValidator::validate_entity(&invoice, &ctx).is_ok());
    }

    #[test]
    fn duplicate_fields_are_malformed() {
        let invoice = Entity::new("Invoice")
            .with_field(Field::new("amount", "number"))
            .with_field(Field::new("Amount", "decimal"));
        let ctx = ctx(vec![invoice.clone()]);
        assert!(matches!(
            DomainValidator::validate_entity(&invoice, &ctx),
            Err(DomainError::MalformedEntity { .. })
        ));
    }

    #[test]
    fn field_shadowing_a_foreign_key_is_malformed() {
        let customer = Entity::new("Customer");
        let invoice = Entity::new("Invoice")
            .with_field(Field::new("customer_id", "uuid"))
            .with_relation(Relation::many_to_one("Customer"));
        let ctx = ctx(vec![customer, invoice.clone()]);
        let err = DomainValidator::validate_entity(&invoice, &ctx).unwrap_err();
        assert!(matches!(err, DomainError::MalformedEntity { ref entity, .. } if entity == "Invoice"));
        assert!(err.to_string().contains("customerId"), "{err}");
    }

    #[test]
    fn one_to_many_relations_reserve_no_foreign_key() {
        let line = Entity::new("LineItem").with_relation(Relation::many_to_one("Invoice"));
        let invoice = Entity::new("Invoice")
            .with_field(Field::new("lineItemsId", "string"))
            .with_relation(Relation::one_to_many("LineItem"));
        let ctx = ctx(vec![line, invoice.clone()]);
        assert!(DomainValidator::validate_entity(&invoice, &ctx).is_ok());
    }

    #[test]
    fn operations_differing_only_in_spelling_are_duplicates() {
        let invoice = Entity::new("Invoice")
            .with_operation(OperationDecl::new("sendReminder"))
            .with_operation(OperationDecl::new("send_reminder"));
        let ctx = ctx(vec![invoice.clone()]);
        assert!(matches!(
            DomainValidator::validate_entity(&invoice, &ctx),
            Err(DomainError::MalformedEntity { .. })
        ));
    }

    #[test]
    fn relation_to_undeclared_entity_is_rejected() {
        let invoice = Entity::new("Invoice").with_relation(Relation::many_to_one("Customer"));
        let ctx = ctx(vec![invoice.clone()]);
        assert!(matches!(
            DomainValidator::validate_entity(&invoice, &ctx),
            Err(DomainError::UnknownRelationTarget { .. })
        ));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let bad = Entity::new("1nvoice");
        let ctx = ctx(vec![bad.clone()]);
        assert!(DomainValidator::validate_entity(&bad, &ctx).is_err());

        let empty = Entity::new("");
        assert!(DomainValidator::validate_entity(&empty, &ctx).is_err());
    }

    #[test]
    fn component_must_reference_a_declared_entity() {
        let ctx = ctx(vec![Entity::new("Invoice")]);
        let ok = ComponentSpec::new("InvoiceList").for_entity("Invoice");
        let bad = ComponentSpec::new("OrderList").for_entity("Order");
        assert!(DomainValidator::validate_component(&ok, &ctx).is_ok());
        assert!(matches!(
            DomainValidator::validate_component(&bad, &ctx),
            Err(DomainError::MalformedComponent { .. })
        ));
    }
}
