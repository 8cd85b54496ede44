//! Endpoint derivation: declared operations merged with the default CRUD set.
//!
//! `resolve_operations` is pure and deterministic. Its result is the single
//! source every server and UI generator iterates, so the Express router, the
//! ASP.NET controller and the React API client always agree on names,
//! methods and paths.
//!
//! # Merge rules
//!
//! - Unless `crud` is `false`, the five defaults come first, in the order
//!   list, get, create, update, delete.
//! - A declared operation whose name equals a default's full name
//!   (`getInvoice`) or short kind name (`get`), case-insensitively, replaces
//!   that default in place.
//! - Every other declared operation is appended in declaration order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{
    entities::{Entity, OperationDecl},
    error::DomainError,
    transform::{to_camel_case, to_kebab_case},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Lowercase form used as an Express router method (`router.get`).
    pub fn express_fn(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// ASP.NET Core attribute name (`HttpGet`).
    pub const fn aspnet_attribute(&self) -> &'static str {
        match self {
            Self::Get => "HttpGet",
            Self::Post => "HttpPost",
            Self::Put => "HttpPut",
            Self::Patch => "HttpPatch",
            Self::Delete => "HttpDelete",
        }
    }

    pub const fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(DomainError::InvalidDescriptor(format!(
                "unknown http method: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    List,
    Get,
    Create,
    Update,
    Delete,
    Custom,
}

impl OperationKind {
    /// The default CRUD set, in emission order.
    pub const CRUD: [OperationKind; 5] = [
        Self::List,
        Self::Get,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Custom => "custom",
        }
    }

    pub const fn default_method(&self) -> HttpMethod {
        match self {
            Self::List | Self::Get => HttpMethod::Get,
            Self::Create | Self::Custom => HttpMethod::Post,
            Self::Update => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
        }
    }

    /// Path relative to the entity's collection route.
    pub const fn default_path(&self) -> &'static str {
        match self {
            Self::List | Self::Create | Self::Custom => "/",
            Self::Get | Self::Update | Self::Delete => "/:id",
        }
    }

    /// Full operation name for `entity`: `listInvoices`, `getInvoice`, ...
    pub fn operation_name(&self, entity: &Entity) -> String {
        match self {
            Self::List => format!("list{}", entity.plural()),
            Self::Custom => to_camel_case(&entity.singular()),
            _ => format!("{}{}", self.short_name(), entity.singular()),
        }
    }

    fn from_short_name(name: &str) -> Option<Self> {
        Self::CRUD
            .into_iter()
            .find(|kind| kind.short_name().eq_ignore_ascii_case(name))
    }
}

/// A fully resolved endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub kind: OperationKind,
    pub method: HttpMethod,
    /// Path relative to the collection route, `:param` placeholders.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Operation {
    fn default_for(kind: OperationKind, entity: &Entity) -> Self {
        Self {
            name: kind.operation_name(entity),
            kind,
            method: kind.default_method(),
            path: kind.default_path().to_string(),
            description: None,
        }
    }

    fn from_decl(decl: &OperationDecl) -> Self {
        let kind = decl
            .kind
            .or_else(|| OperationKind::from_short_name(&decl.name))
            .unwrap_or(OperationKind::Custom);
        let path = match (&decl.path, kind) {
            (Some(path), _) => normalize_path(path),
            (None, OperationKind::Custom) => format!("/{}", to_kebab_case(&decl.name)),
            (None, kind) => kind.default_path().to_string(),
        };
        Self {
            name: to_camel_case(&decl.name),
            kind,
            method: decl.method.unwrap_or_else(|| kind.default_method()),
            path,
            description: decl.description.clone(),
        }
    }

    /// Route parameters in path order (`/:id/lines/:lineId` → `id`, `lineId`).
    pub fn path_params(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix(':'))
            .collect()
    }

    pub fn has_id_param(&self) -> bool {
        self.path_params().contains(&"id")
    }

    /// Path in ASP.NET route-template syntax (`{id}`), without the leading slash.
    pub fn route_template(&self) -> String {
        self.path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(param) => format!("{{{param}}}"),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Path with `${param}` interpolation for TypeScript template literals.
    pub fn template_literal_path(&self) -> String {
        if self.path == "/" {
            return String::new();
        }
        self.path
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(param) => format!("${{{param}}}"),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Merge an entity's declared operations with the default CRUD set.
pub fn resolve_operations(entity: &Entity) -> Vec<Operation> {
    let mut resolved: Vec<Operation> = if entity.crud_enabled() {
        OperationKind::CRUD
            .into_iter()
            .map(|kind| Operation::default_for(kind, entity))
            .collect()
    } else {
        Vec::new()
    };

    for decl in &entity.operations {
        let name = to_camel_case(&decl.name);
        let overridden = OperationKind::CRUD.into_iter().find(|kind| {
            name.eq_ignore_ascii_case(kind.short_name())
                || name.eq_ignore_ascii_case(&kind.operation_name(entity))
        });

        match overridden {
            Some(kind) if entity.crud_enabled() => {
                let mut op = Operation::from_decl(decl);
                op.kind = kind;
                op.name = kind.operation_name(entity);
                if decl.method.is_none() {
                    op.method = kind.default_method();
                }
                if decl.path.is_none() {
                    op.path = kind.default_path().to_string();
                }
                if let Some(slot) = resolved.iter_mut().find(|o| o.kind == kind) {
                    *slot = op;
                }
            }
            Some(kind) => {
                let mut op = Operation::from_decl(decl);
                op.kind = kind;
                op.name = kind.operation_name(entity);
                upsert(&mut resolved, op);
            }
            None => upsert(&mut resolved, Operation::from_decl(decl)),
        }
    }

    resolved
}

fn upsert(resolved: &mut Vec<Operation>, op: Operation) {
    match resolved
        .iter_mut()
        .find(|existing| existing.name.eq_ignore_ascii_case(&op.name))
    {
        Some(existing) => *existing = op,
        None => resolved.push(op),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Field;

    fn invoice() -> Entity {
        Entity::new("Invoice")
            .with_field(Field::new("amount", "number"))
            .with_field(Field::new("dueDate", "date"))
    }

    #[test]
    fn defaults_are_exactly_five_named_from_the_entity() {
        let ops = resolve_operations(&invoice());
        let names: Vec<_> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "listInvoices",
                "getInvoice",
                "createInvoice",
                "updateInvoice",
                "deleteInvoice"
            ]
        );
        assert_eq!(ops[1].path, "/:id");
        assert_eq!(ops[3].method, HttpMethod::Put);
    }

    #[test]
    fn resolution_is_deterministic() {
        let entity = invoice().with_operation(OperationDecl::new("archive"));
        assert_eq!(resolve_operations(&entity), resolve_operations(&entity));
    }

    #[test]
    fn declared_default_replaces_in_place() {
        let entity = invoice().with_operation(
            OperationDecl::new("getInvoice").with_path("/by-number/:id"),
        );
        let ops = resolve_operations(&entity);
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[1].name, "getInvoice");
        assert_eq!(ops[1].path, "/by-number/:id");
        assert_eq!(ops[1].kind, OperationKind::Get);
    }

    #[test]
    fn short_kind_name_matches_case_insensitively() {
        let entity = invoice().with_operation(
            OperationDecl::new("UPDATE").with_method(HttpMethod::Patch),
        );
        let ops = resolve_operations(&entity);
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[3].name, "updateInvoice");
        assert_eq!(ops[3].method, HttpMethod::Patch);
    }

    #[test]
    fn custom_operations_follow_defaults_in_declaration_order() {
        let entity = invoice()
            .with_operation(OperationDecl::new("sendReminder").with_path("/:id/remind"))
            .with_operation(OperationDecl::new("archive"));
        let ops = resolve_operations(&entity);
        assert_eq!(ops.len(), 7);
        assert_eq!(ops[5].name, "sendReminder");
        assert_eq!(ops[5].kind, OperationKind::Custom);
        assert_eq!(ops[5].method, HttpMethod::Post);
        assert!(ops[5].has_id_param());
        assert_eq!(ops[6].path, "/archive");
    }

    #[test]
    fn spelling_variants_of_a_default_override_it_in_place() {
        let entity = invoice().with_operation(
            OperationDecl::new("list_invoices").with_path("/search"),
        );
        let ops = resolve_operations(&entity);
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0].name, "listInvoices");
        assert_eq!(ops[0].kind, OperationKind::List);
        assert_eq!(ops[0].method, HttpMethod::Get);
        assert_eq!(ops[0].path, "/search");
        assert!(ops.iter().all(|o| o.kind != OperationKind::Custom));
    }

    #[test]
    fn crud_false_keeps_only_declared_operations() {
        let entity = invoice()
            .without_crud()
            .with_operation(OperationDecl::new("list"))
            .with_operation(OperationDecl::new("export").with_method(HttpMethod::Get));
        let ops = resolve_operations(&entity);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].name, "listInvoices");
        assert_eq!(ops[0].kind, OperationKind::List);
        assert_eq!(ops[1].name, "export");
    }

    #[test]
    fn route_templates_translate_placeholders() {
        let op = Operation::default_for(OperationKind::Get, &invoice());
        assert_eq!(op.route_template(), "{id}");
        assert_eq!(op.template_literal_path(), "/${id}");

        let list = Operation::default_for(OperationKind::List, &invoice());
        assert_eq!(list.route_template(), "");
        assert_eq!(list.template_literal_path(), "");
    }
}
