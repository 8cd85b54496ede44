//! Semantic type → target type lookup tables.
//!
//! Each semantic type a request may declare is described exactly once by a
//! [`TypeDef`] in [`TYPE_REGISTRY`]. All target-syntax and storage-column
//! mappings derive from that table, so the same semantic type always maps to
//! the same target type within one target domain.
//!
//! Unknown type names never fail: they parse to [`SemanticType::Other`] and
//! map to the target domain's generic type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_objects::DatabaseEngine;

/// Built-in scalar types understood by every generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Text,
    Number,
    Integer,
    Decimal,
    Boolean,
    Uuid,
    Date,
    DateTime,
    Email,
    Url,
    Json,
}

/// A declared field type: a known scalar or an opaque name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SemanticType {
    Scalar(ScalarType),
    Other(String),
}

impl SemanticType {
    /// Parse a type name. Never fails.
    pub fn parse(name: &str) -> Self {
        let key = name.trim().to_ascii_lowercase();
        TYPE_REGISTRY
            .iter()
            .find(|def| def.name == key || def.aliases.contains(&key.as_str()))
            .map(|def| Self::Scalar(def.scalar))
            .unwrap_or_else(|| Self::Other(name.trim().to_string()))
    }

    pub fn def(&self) -> Option<&'static TypeDef> {
        match self {
            Self::Scalar(scalar) => TYPE_REGISTRY.iter().find(|def| def.scalar == *scalar),
            Self::Other(_) => None,
        }
    }

    pub fn is_uuid(&self) -> bool {
        matches!(self, Self::Scalar(ScalarType::Uuid))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(_) => self.def().map_or("any", |d| d.name),
            Self::Other(name) => name,
        }
    }
}

impl From<String> for SemanticType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for SemanticType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<SemanticType> for String {
    fn from(ty: SemanticType) -> Self {
        ty.name().to_string()
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Target syntaxes with a type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSyntax {
    TypeScript,
    CSharp,
    Bicep,
}

impl TargetSyntax {
    /// The generic type an unknown semantic type falls back to.
    pub const fn any_type(&self) -> &'static str {
        match self {
            Self::TypeScript => "any",
            Self::CSharp => "object",
            Self::Bicep => "object",
        }
    }
}

/// Everything the generators need to know about one semantic type.
#[derive(Debug, Clone, Copy)]
pub struct TypeDef {
    pub scalar: ScalarType,
    /// Canonical lowercase name.
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub typescript: &'static str,
    pub csharp: &'static str,
    /// Whether the C# type is a value type (affects nullable emission).
    pub csharp_value_type: bool,
    pub bicep: &'static str,
    pub postgres: &'static str,
    pub azure_sql: &'static str,
    pub mysql: &'static str,
    /// TypeORM `@Column` type.
    pub typeorm: &'static str,
    /// HTML `<input type>` for generated forms.
    pub input: &'static str,
}

/// Single source of truth for semantic type mappings.
pub static TYPE_REGISTRY: &[TypeDef] = &[
    TypeDef {
        scalar: ScalarType::String,
        name: "string",
        aliases: &["str", "varchar"],
        typescript: "string",
        csharp: "string",
        csharp_value_type: false,
        bicep: "string",
        postgres: "VARCHAR(255)",
        azure_sql: "NVARCHAR(255)",
        mysql: "VARCHAR(255)",
        typeorm: "varchar",
        input: "text",
    },
    TypeDef {
        scalar: ScalarType::Text,
        name: "text",
        aliases: &["longtext", "markdown"],
        typescript: "string",
        csharp: "string",
        csharp_value_type: false,
        bicep: "string",
        postgres: "TEXT",
        azure_sql: "NVARCHAR(MAX)",
        mysql: "TEXT",
        typeorm: "text",
        input: "text",
    },
    TypeDef {
        scalar: ScalarType::Number,
        name: "number",
        aliases: &["float", "double", "real"],
        typescript: "number",
        csharp: "double",
        csharp_value_type: true,
        bicep: "int",
        postgres: "DOUBLE PRECISION",
        azure_sql: "FLOAT",
        mysql: "DOUBLE",
        typeorm: "double precision",
        input: "number",
    },
    TypeDef {
        scalar: ScalarType::Integer,
        name: "integer",
        aliases: &["int", "int32", "long", "int64"],
        typescript: "number",
        csharp: "int",
        csharp_value_type: true,
        bicep: "int",
        postgres: "INTEGER",
        azure_sql: "INT",
        mysql: "INT",
        typeorm: "int",
        input: "number",
    },
    TypeDef {
        scalar: ScalarType::Decimal,
        name: "decimal",
        aliases: &["money", "currency", "numeric"],
        typescript: "number",
        csharp: "decimal",
        csharp_value_type: true,
        bicep: "string",
        postgres: "NUMERIC(18,2)",
        azure_sql: "DECIMAL(18,2)",
        mysql: "DECIMAL(18,2)",
        typeorm: "decimal",
        input: "number",
    },
    TypeDef {
        scalar: ScalarType::Boolean,
        name: "boolean",
        aliases: &["bool", "flag"],
        typescript: "boolean",
        csharp: "bool",
        csharp_value_type: true,
        bicep: "bool",
        postgres: "BOOLEAN",
        azure_sql: "BIT",
        mysql: "TINYINT(1)",
        typeorm: "boolean",
        input: "checkbox",
    },
    TypeDef {
        scalar: ScalarType::Uuid,
        name: "uuid",
        aliases: &["guid", "id"],
        typescript: "string",
        csharp: "Guid",
        csharp_value_type: true,
        bicep: "string",
        postgres: "UUID",
        azure_sql: "UNIQUEIDENTIFIER",
        mysql: "CHAR(36)",
        typeorm: "uuid",
        input: "text",
    },
    TypeDef {
        scalar: ScalarType::Date,
        name: "date",
        aliases: &[],
        typescript: "string",
        csharp: "DateOnly",
        csharp_value_type: true,
        bicep: "string",
        postgres: "DATE",
        azure_sql: "DATE",
        mysql: "DATE",
        typeorm: "date",
        input: "date",
    },
    TypeDef {
        scalar: ScalarType::DateTime,
        name: "datetime",
        aliases: &["timestamp", "date-time", "instant"],
        typescript: "string",
        csharp: "DateTime",
        csharp_value_type: true,
        bicep: "string",
        postgres: "TIMESTAMPTZ",
        azure_sql: "DATETIME2",
        mysql: "DATETIME",
        typeorm: "timestamp",
        input: "datetime-local",
    },
    TypeDef {
        scalar: ScalarType::Email,
        name: "email",
        aliases: &[],
        typescript: "string",
        csharp: "string",
        csharp_value_type: false,
        bicep: "string",
        postgres: "VARCHAR(320)",
        azure_sql: "NVARCHAR(320)",
        mysql: "VARCHAR(320)",
        typeorm: "varchar",
        input: "email",
    },
    TypeDef {
        scalar: ScalarType::Url,
        name: "url",
        aliases: &["uri", "link"],
        typescript: "string",
        csharp: "string",
        csharp_value_type: false,
        bicep: "string",
        postgres: "VARCHAR(2048)",
        azure_sql: "NVARCHAR(2048)",
        mysql: "VARCHAR(2048)",
        typeorm: "varchar",
        input: "url",
    },
    TypeDef {
        scalar: ScalarType::Json,
        name: "json",
        aliases: &["object", "map"],
        typescript: "Record<string, unknown>",
        csharp: "string",
        csharp_value_type: false,
        bicep: "object",
        postgres: "JSONB",
        azure_sql: "NVARCHAR(MAX)",
        mysql: "JSON",
        typeorm: "simple-json",
        input: "text",
    },
];

/// Map a semantic type to a target-syntax type name.
pub fn target_type(ty: &SemanticType, syntax: TargetSyntax) -> &'static str {
    match ty.def() {
        Some(def) => match syntax {
            TargetSyntax::TypeScript => def.typescript,
            TargetSyntax::CSharp => def.csharp,
            TargetSyntax::Bicep => def.bicep,
        },
        None => syntax.any_type(),
    }
}

/// Map a semantic type to a C# property type, adding `?` when optional.
pub fn csharp_type(ty: &SemanticType, required: bool) -> String {
    let base = target_type(ty, TargetSyntax::CSharp);
    if required { base.to_string() } else { format!("{base}?") }
}

/// Map a semantic type to a storage column type for `engine`.
pub fn column_type(ty: &SemanticType, engine: DatabaseEngine) -> &'static str {
    match (ty.def(), engine) {
        (Some(def), DatabaseEngine::PostgreSql) => def.postgres,
        (Some(def), DatabaseEngine::AzureSql) => def.azure_sql,
        (Some(def), DatabaseEngine::MySql) => def.mysql,
        (None, DatabaseEngine::AzureSql) => "NVARCHAR(MAX)",
        (None, _) => "TEXT",
    }
}

/// TypeORM column type. Unknown types are stored as text.
pub fn typeorm_column(ty: &SemanticType) -> &'static str {
    ty.def().map_or("text", |def| def.typeorm)
}

/// HTML input type for a generated form control.
pub fn input_type(ty: &SemanticType) -> &'static str {
    ty.def().map_or("text", |def| def.input)
}
