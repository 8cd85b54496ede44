//! Case and type transform utilities shared by every generator.
//!
//! Pure functions and static tables only; nothing here allocates state that
//! outlives a call.

pub mod case;
pub mod imports;
pub mod types;

pub use case::{
    pluralize, singularize, split_words, to_camel_case, to_kebab_case, to_pascal_case,
    to_screaming_snake_case, to_snake_case, validate_identifier,
};
pub use imports::{ImportSet, references};
pub use types::{
    ScalarType, SemanticType, TYPE_REGISTRY, TargetSyntax, TypeDef, column_type, csharp_type,
    input_type, target_type, typeorm_column,
};
