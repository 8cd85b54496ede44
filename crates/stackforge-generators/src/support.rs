//! Helpers shared by every generator: a line writer, an artifact sink and
//! a few naming helpers that more than one target needs.

use serde_json::Value;
use stackforge_core::{
    application::{GenerationError, GeneratorOutput},
    domain::{
        ArtifactKind, ComponentSpec, DomainError, DomainValidator, Entity, Facet, Field,
        FileArtifact, GenerationContext, RelationKind,
        transform::{ImportSet, SemanticType, singularize, split_words, to_pascal_case},
    },
};
use tracing::{debug, warn};

/// Indentation-aware line builder.
pub(crate) struct CodeWriter {
    buf: String,
    depth: usize,
    unit: &'static str,
}

impl CodeWriter {
    /// Two-space indentation (TypeScript, JSON-ish, Bicep).
    pub fn new() -> Self {
        Self::with_unit("  ")
    }

    pub fn with_unit(unit: &'static str) -> Self {
        Self {
            buf: String::new(),
            depth: 0,
            unit,
        }
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(self.unit);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Write `text`, then indent what follows.
    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.depth += 1;
        self
    }

    /// Dedent, then write `text`.
    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }

    /// Dedent, write `text`, indent again (`} else {`).
    pub fn reopen(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
        self.depth += 1;
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Collects artifacts and per-unit failures for one `generate` call.
pub(crate) struct Sink {
    generator: &'static str,
    facet: Facet,
    output: GeneratorOutput,
}

impl Sink {
    pub fn new(generator: &'static str, facet: Facet) -> Self {
        Self {
            generator,
            facet,
            output: GeneratorOutput::new(),
        }
    }

    pub fn emit(&mut self, path: impl Into<String>, kind: ArtifactKind, content: String) {
        let path = path.into();
        match FileArtifact::new(path.clone(), content, kind, self.generator) {
            Ok(artifact) => self.output.push(artifact),
            Err(e) => self.fail_domain(path, &e),
        }
    }

    pub fn fail(&mut self, subject: impl Into<String>, reason: impl Into<String>) {
        let error = GenerationError::new(self.generator, self.facet, subject, reason);
        warn!(generator = self.generator, error = %error, "Unit skipped");
        self.output.fail(error);
    }

    pub fn fail_domain(&mut self, subject: impl Into<String>, error: &DomainError) {
        self.fail(subject, error.to_string());
    }

    /// Entities that pass domain validation. Each malformed entity is
    /// recorded as a failure naming it.
    pub fn valid_entities<'c>(&mut self, ctx: &'c GenerationContext) -> Vec<&'c Entity> {
        let mut valid = Vec::with_capacity(ctx.entities.len());
        for entity in &ctx.entities {
            match DomainValidator::validate_entity(entity, ctx) {
                Ok(()) => valid.push(entity),
                Err(e) => self.fail_domain(subject_name(&entity.name, "entity"), &e),
            }
        }
        valid
    }

    /// Components that pass domain validation.
    pub fn valid_components<'c>(&mut self, ctx: &'c GenerationContext) -> Vec<&'c ComponentSpec> {
        let mut valid = Vec::with_capacity(ctx.components.len());
        for component in &ctx.components {
            match DomainValidator::validate_component(component, ctx) {
                Ok(()) => valid.push(component),
                Err(e) => self.fail_domain(subject_name(&component.name, "component"), &e),
            }
        }
        valid
    }

    pub fn finish(self) -> GeneratorOutput {
        debug!(
            generator = self.generator,
            artifacts = self.output.artifacts.len(),
            errors = self.output.errors.len(),
            "Generator finished"
        );
        self.output
    }
}

fn subject_name(name: &str, fallback: &str) -> String {
    if name.trim().is_empty() {
        format!("<unnamed {fallback}>")
    } else {
        name.to_string()
    }
}

/// Prepend the imports `body` actually references.
pub(crate) fn typescript_file(imports: &ImportSet, body: &str) -> String {
    let used = imports.retain_referenced(body);
    if used.is_empty() {
        body.to_string()
    } else {
        format!("{}\n{body}", used.render_typescript())
    }
}

/// Prepend the `using` directives `body` actually needs.
pub(crate) fn csharp_file(imports: &ImportSet, body: &str) -> String {
    let used = imports.retain_referenced(body);
    if used.is_empty() {
        body.to_string()
    } else {
        format!("{}\n{body}", used.render_csharp())
    }
}

/// Single-quoted TypeScript (and Bicep) string literal.
pub(crate) fn quoted(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Double-quoted C# string literal.
pub(crate) fn cs_quoted(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Pretty JSON with a trailing newline.
pub(crate) fn pretty_json(value: &Value) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    text.push('\n');
    text
}

/// Human label for an identifier (`dueDate` → `Due Date`).
pub(crate) fn label(name: &str) -> String {
    split_words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Type of the entity's primary key: the declared `id` field, else uuid.
pub(crate) fn id_type(entity: &Entity) -> SemanticType {
    entity
        .field("id")
        .map_or_else(|| SemanticType::parse("uuid"), |f| f.ty.clone())
}

/// Fields a client sends and receives besides `id`: declared fields plus
/// one foreign key per many-to-one relation, typed as the target's key.
pub(crate) fn payload_fields(entity: &Entity, ctx: &GenerationContext) -> Vec<Field> {
    let mut fields: Vec<Field> = entity
        .fields
        .iter()
        .filter(|f| !f.name.eq_ignore_ascii_case("id"))
        .cloned()
        .collect();
    for relation in &entity.relations {
        if let Some(fk) = relation.foreign_key() {
            let key = ctx
                .entity(&relation.target)
                .map_or_else(|| SemanticType::parse("uuid"), id_type);
            let mut field = Field::new(fk, key.name());
            if !relation.is_required() {
                field = field.optional();
            }
            fields.push(field);
        }
    }
    fields
}

/// Name of the many-to-one property on `target` pointing back at `entity`.
pub(crate) fn inverse_property(entity: &Entity, target: &Entity) -> String {
    target
        .relations
        .iter()
        .find(|r| {
            r.kind == RelationKind::ManyToOne
                && to_pascal_case(&singularize(&r.target)) == entity.singular()
        })
        .map_or_else(|| entity.camel(), |r| r.property_name())
}
