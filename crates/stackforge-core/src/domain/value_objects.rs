//! Domain value objects: facets and the per-facet choices a stack can make.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! Each carries its canonical string form and a lenient `FromStr` parser so
//! request manifests can spell them the way humans do (`"aspnet"`,
//! `"asp.net-core"`, `"AspNetCore"` all resolve to the same variant).
//!
//! Serde goes through the same `as_str` / `FromStr` pair, so manifests accept
//! every alias the parser does and always serialize the canonical form.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. Teach a generator in `stackforge-generators` to `supports()` it

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! impl_display_fromstr {
    ($ty:ty, $label:literal, { $($($alias:literal)|+ => $variant:expr),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($($alias)|+ => Ok($variant),)+
                    other => Err(DomainError::InvalidDescriptor(format!(
                        concat!("unknown ", $label, ": {}"),
                        other
                    ))),
                }
            }
        }

        impl TryFrom<String> for $ty {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

// ── Facet ────────────────────────────────────────────────────────────────────

/// One independently selectable concern of a target stack.
///
/// The declaration order is the canonical order used whenever facets are
/// listed (error messages, `StackDescriptor::requested_facets`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Facet {
    Ui,
    Server,
    Database,
    Infrastructure,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Self::Ui, Self::Server, Self::Database, Self::Infrastructure];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::Server => "server",
            Self::Database => "database",
            Self::Infrastructure => "infrastructure",
        }
    }
}

impl_display_fromstr!(Facet, "facet", {
    "ui" | "frontend" | "ui-framework" => Facet::Ui,
    "server" | "backend" | "api" | "server-framework" => Facet::Server,
    "database" | "db" | "relational-database" => Facet::Database,
    "infrastructure" | "infra" | "iac" => Facet::Infrastructure,
});

// ── UI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UiFramework {
    React,
}

impl UiFramework {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::React => "react",
        }
    }
}

impl_display_fromstr!(UiFramework, "ui framework", {
    "react" | "reactjs" => UiFramework::React,
});

/// Client-side state management strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StateManagement {
    #[default]
    Context,
    Redux,
    Zustand,
}

impl StateManagement {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::Redux => "redux",
            Self::Zustand => "zustand",
        }
    }
}

impl_display_fromstr!(StateManagement, "state management", {
    "context" | "react-context" => StateManagement::Context,
    "redux" | "redux-toolkit" => StateManagement::Redux,
    "zustand" => StateManagement::Zustand,
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Styling {
    #[default]
    CssModules,
    Tailwind,
}

impl Styling {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CssModules => "css-modules",
            Self::Tailwind => "tailwind",
        }
    }
}

impl_display_fromstr!(Styling, "styling", {
    "css-modules" | "css" => Styling::CssModules,
    "tailwind" | "tailwindcss" => Styling::Tailwind,
});

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ServerFramework {
    Express,
    AspNetCore,
}

impl ServerFramework {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Express => "express",
            Self::AspNetCore => "aspnet-core",
        }
    }

    /// Persistence model flavour that pairs naturally with this server.
    pub const fn default_models(&self) -> ModelFlavor {
        match self {
            Self::Express => ModelFlavor::TypeOrm,
            Self::AspNetCore => ModelFlavor::EfCore,
        }
    }
}

impl_display_fromstr!(ServerFramework, "server framework", {
    "express" | "expressjs" | "node" => ServerFramework::Express,
    "aspnet-core" | "aspnetcore" | "aspnet" | "asp.net-core" | "dotnet" => ServerFramework::AspNetCore,
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AuthScheme {
    #[default]
    None,
    Jwt,
    EntraId,
}

impl AuthScheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Jwt => "jwt",
            Self::EntraId => "entra-id",
        }
    }

    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl_display_fromstr!(AuthScheme, "auth scheme", {
    "none" | "anonymous" => AuthScheme::None,
    "jwt" | "bearer" => AuthScheme::Jwt,
    "entra-id" | "entra" | "azure-ad" | "aad" => AuthScheme::EntraId,
});

// ── Database ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DatabaseEngine {
    PostgreSql,
    AzureSql,
    MySql,
}

impl DatabaseEngine {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PostgreSql => "postgresql",
            Self::AzureSql => "azure-sql",
            Self::MySql => "mysql",
        }
    }

    /// Quote an identifier the way this engine expects.
    pub fn quote_ident(&self, ident: &str) -> String {
        match self {
            Self::PostgreSql => format!("\"{ident}\""),
            Self::AzureSql => format!("[{ident}]"),
            Self::MySql => format!("`{ident}`"),
        }
    }
}

impl_display_fromstr!(DatabaseEngine, "database engine", {
    "postgresql" | "postgres" | "pg" => DatabaseEngine::PostgreSql,
    "azure-sql" | "azuresql" | "sqlserver" | "mssql" => DatabaseEngine::AzureSql,
    "mysql" | "mariadb" => DatabaseEngine::MySql,
});

/// Shape of the emitted persistence models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelFlavor {
    TypeOrm,
    EfCore,
}

impl ModelFlavor {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TypeOrm => "typeorm",
            Self::EfCore => "ef-core",
        }
    }
}

impl_display_fromstr!(ModelFlavor, "model flavor", {
    "typeorm" => ModelFlavor::TypeOrm,
    "ef-core" | "efcore" | "entity-framework" => ModelFlavor::EfCore,
});

// ── Infrastructure ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InfraPlatform {
    AzureBicep,
}

impl InfraPlatform {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AzureBicep => "azure-bicep",
        }
    }
}

impl_display_fromstr!(InfraPlatform, "infra platform", {
    "azure-bicep" | "bicep" | "azure" => InfraPlatform::AzureBicep,
});

/// An infrastructure capability the application needs.
///
/// Declaration order is the canonical application order of the resolver's
/// inclusion rules, and therefore the declaration order of resource nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InfraCapability {
    ComputeHosting,
    RelationalStorage,
    ObjectStorage,
    SecretStorage,
    Telemetry,
}

impl InfraCapability {
    pub const ALL: [InfraCapability; 5] = [
        Self::ComputeHosting,
        Self::RelationalStorage,
        Self::ObjectStorage,
        Self::SecretStorage,
        Self::Telemetry,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ComputeHosting => "compute-hosting",
            Self::RelationalStorage => "relational-storage",
            Self::ObjectStorage => "object-storage",
            Self::SecretStorage => "secret-storage",
            Self::Telemetry => "telemetry",
        }
    }
}

impl_display_fromstr!(InfraCapability, "infra capability", {
    "compute-hosting" | "compute" | "hosting" | "web-app" => InfraCapability::ComputeHosting,
    "relational-storage" | "sql" | "relational" | "database" => InfraCapability::RelationalStorage,
    "object-storage" | "blob" | "storage" => InfraCapability::ObjectStorage,
    "secret-storage" | "secrets" | "key-vault" | "keyvault" => InfraCapability::SecretStorage,
    "telemetry" | "monitoring" | "observability" => InfraCapability::Telemetry,
});
