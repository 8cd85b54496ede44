//! The `GenerationContext`: what one synthesis run generates code *for*.
//!
//! A context is created per request, handed to every generator by shared
//! reference and dropped once the artifacts are returned. Nothing in here
//! knows about target syntaxes; naming helpers only derive the canonical
//! singular/plural forms generators build their identifiers from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{
    error::DomainError,
    operations::{HttpMethod, OperationKind},
    transform::{SemanticType, pluralize, singularize, to_camel_case, to_kebab_case, to_pascal_case, to_snake_case},
    value_objects::{AuthScheme, StateManagement, Styling},
};

// ── Project ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl ProjectInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: default_version(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `PascalCase` project name, used for .NET assembly and namespace names.
    pub fn pascal_name(&self) -> String {
        to_pascal_case(&self.name)
    }

    /// `kebab-case` project name, used for npm package names.
    pub fn package_name(&self) -> String {
        to_kebab_case(&self.name)
    }
}

/// Cross-cutting architectural choices that shape several facets at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureChoices {
    #[serde(default)]
    pub state: StateManagement,
    #[serde(default)]
    pub auth: AuthScheme,
    #[serde(default)]
    pub styling: Styling,
}

// ── Fields & bindings ────────────────────────────────────────────────────────

/// A typed entity field or component prop.
///
/// A missing `required` flag means **required**.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SemanticType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        Self {
            name: name.into(),
            ty: SemanticType::parse(ty),
            required: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    /// Parse the `name:type` / `name:type?` shorthand.
    pub fn parse_shorthand(input: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidFieldShorthand {
            input: input.to_string(),
        };

        let (name, ty) = input.split_once(':').ok_or_else(invalid)?;
        let name = name.trim();
        let ty = ty.trim();
        let (ty, required) = match ty.strip_suffix('?') {
            Some(stripped) => (stripped.trim_end(), Some(false)),
            None => (ty, None),
        };
        if name.is_empty() || ty.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            name: name.to_string(),
            ty: SemanticType::parse(ty),
            required,
        })
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    pub fn camel_name(&self) -> String {
        to_camel_case(&self.name)
    }

    pub fn pascal_name(&self) -> String {
        to_pascal_case(&self.name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_required() { "" } else { "?" };
        write!(f, "{}:{}{}", self.name, self.ty, marker)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRepr {
    Shorthand(String),
    Full {
        name: String,
        #[serde(rename = "type")]
        ty: SemanticType,
        #[serde(default)]
        required: Option<bool>,
    },
}

impl TryFrom<FieldRepr> for Field {
    type Error = DomainError;

    fn try_from(repr: FieldRepr) -> Result<Self, Self::Error> {
        match repr {
            FieldRepr::Shorthand(s) => Field::parse_shorthand(&s),
            FieldRepr::Full { name, ty, required } => Ok(Field { name, ty, required }),
        }
    }
}

/// An injected dependency (entity service) or provider (UI component).
///
/// A missing `required` flag means **optional**.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl Binding {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            required: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

// ── Relations ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    ManyToOne,
    OneToMany,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl Relation {
    pub fn many_to_one(target: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::ManyToOne,
            target: target.into(),
            name: None,
            required: None,
        }
    }

    pub fn one_to_many(target: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::OneToMany,
            ..Self::many_to_one(target)
        }
    }

    /// Navigation property name: `customer` for many-to-one, `lineItems` for
    /// one-to-many, unless named explicitly.
    pub fn property_name(&self) -> String {
        match (&self.name, self.kind) {
            (Some(name), _) => to_camel_case(name),
            (None, RelationKind::ManyToOne) => to_camel_case(&singularize(&self.target)),
            (None, RelationKind::OneToMany) => to_camel_case(&pluralize(&self.target)),
        }
    }

    /// Foreign-key property name for a many-to-one relation (`customerId`).
    pub fn foreign_key(&self) -> Option<String> {
        (self.kind == RelationKind::ManyToOne).then(|| format!("{}Id", self.property_name()))
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }
}

// ── Operations ───────────────────────────────────────────────────────────────

/// An operation as declared on an entity, before merging with the CRUD set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OperationKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OperationDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: None,
            path: None,
            kind: None,
            description: None,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

// ── Entity ───────────────────────────────────────────────────────────────────

/// A declared domain entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
    #[serde(default)]
    pub dependencies: Vec<Binding>,
    /// `Some(false)` disables the default CRUD operation set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crud: Option<bool>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
            operations: Vec::new(),
            dependencies: Vec::new(),
            crud: None,
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_operation(mut self, operation: OperationDecl) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_dependency(mut self, binding: Binding) -> Self {
        self.dependencies.push(binding);
        self
    }

    pub fn without_crud(mut self) -> Self {
        self.crud = Some(false);
        self
    }

    pub fn crud_enabled(&self) -> bool {
        self.crud.unwrap_or(true)
    }

    /// Singular `PascalCase` name (`LineItem`).
    pub fn singular(&self) -> String {
        to_pascal_case(&singularize(&self.name))
    }

    /// Plural `PascalCase` name (`LineItems`).
    pub fn plural(&self) -> String {
        to_pascal_case(&pluralize(&self.name))
    }

    /// Singular `camelCase` name (`lineItem`).
    pub fn camel(&self) -> String {
        to_camel_case(&self.singular())
    }

    /// Singular `kebab-case` stem used in file names (`line-item`).
    pub fn file_stem(&self) -> String {
        to_kebab_case(&self.singular())
    }

    /// Collection route segment (`line-items`).
    pub fn route_segment(&self) -> String {
        to_kebab_case(&self.plural())
    }

    /// Storage table name (`line_items`).
    pub fn table_name(&self) -> String {
        to_snake_case(&self.plural())
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

// ── UI components ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    #[serde(default)]
    pub props: Vec<Field>,
    #[serde(default)]
    pub providers: Vec<Binding>,
    /// Entity whose collection this component lists and edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
            providers: Vec::new(),
            entity: None,
        }
    }

    pub fn for_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_prop(mut self, prop: Field) -> Self {
        self.props.push(prop);
        self
    }

    pub fn with_provider(mut self, provider: Binding) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn pascal_name(&self) -> String {
        to_pascal_case(&self.name)
    }
}

// ── Context ──────────────────────────────────────────────────────────────────

/// Everything a generator needs besides the stack selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub project: ProjectInfo,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
    #[serde(default)]
    pub architecture: ArchitectureChoices,
}

impl GenerationContext {
    pub fn new(project: ProjectInfo) -> Self {
        Self {
            project,
            entities: Vec::new(),
            components: Vec::new(),
            architecture: ArchitectureChoices::default(),
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_component(mut self, component: ComponentSpec) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_architecture(mut self, architecture: ArchitectureChoices) -> Self {
        self.architecture = architecture;
        self
    }

    /// Look up an entity by name, singular or plural, case-insensitively.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        let wanted = to_pascal_case(&singularize(name));
        self.entities.iter().find(|e| e.singular() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transform::ScalarType;

    #[test]
    fn shorthand_parses_type_and_optional_marker() {
        let amount = Field::parse_shorthand("amount:number").unwrap();
        assert_eq!(amount.ty, SemanticType::Scalar(ScalarType::Number));
        assert!(amount.is_required());

        let note = Field::parse_shorthand(" note : string? ").unwrap();
        assert_eq!(note.name, "note");
        assert!(!note.is_required());
    }

    #[test]
    fn shorthand_without_type_is_rejected() {
        assert!(matches!(
            Field::parse_shorthand("amount"),
            Err(DomainError::InvalidFieldShorthand { .. })
        ));
        assert!(Field::parse_shorthand(":number").is_err());
    }

    #[test]
    fn required_defaults_differ_between_fields_and_bindings() {
        assert!(Field::new("total", "decimal").is_required());
        assert!(!Binding::new("logger", "ILogger").is_required());
        assert!(Binding::new("logger", "ILogger").required().is_required());
    }

    #[test]
    fn entity_names_derive_consistently() {
        let entity = Entity::new("LineItems");
        assert_eq!(entity.singular(), "LineItem");
        assert_eq!(entity.plural(), "LineItems");
        assert_eq!(entity.camel(), "lineItem");
        assert_eq!(entity.file_stem(), "line-item");
        assert_eq!(entity.route_segment(), "line-items");
        assert_eq!(entity.table_name(), "line_items");
    }

    #[test]
    fn relation_property_names() {
        assert_eq!(Relation::many_to_one("Customer").property_name(), "customer");
        assert_eq!(
            Relation::many_to_one("Customer").foreign_key().as_deref(),
            Some("customerId")
        );
        assert_eq!(Relation::one_to_many("LineItem").property_name(), "lineItems");
        assert_eq!(Relation::one_to_many("LineItem").foreign_key(), None);
    }

    #[test]
    fn context_deserializes_mixed_field_forms() {
        let ctx: GenerationContext = serde_json::from_str(
            r#"{
                "project": { "name": "billing" },
                "entities": [{
                    "name": "Invoice",
                    "fields": [
                        "amount:number",
                        { "name": "dueDate", "type": "date" },
                        { "name": "notes", "type": "text", "required": false }
                    ]
                }],
                "architecture": { "auth": "jwt" }
            }"#,
        )
        .unwrap();

        let invoice = ctx.entity("invoices").unwrap();
        assert_eq!(invoice.fields.len(), 3);
        assert!(invoice.fields[1].is_required());
        assert!(!invoice.fields[2].is_required());
        assert_eq!(ctx.architecture.auth, AuthScheme::Jwt);
        assert_eq!(ctx.architecture.state, StateManagement::Context);
        assert_eq!(ctx.project.version, "0.1.0");
    }

    #[test]
    fn malformed_shorthand_fails_deserialization() {
        let result: Result<Entity, _> =
            serde_json::from_str(r#"{ "name": "Invoice", "fields": ["amount"] }"#);
        assert!(result.is_err());
    }
}
