//! `FileArtifact`: one generated file, addressed by a project-relative path.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::DomainError;

/// What role a generated file plays in the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    EntryPoint,
    Route,
    Controller,
    Service,
    Middleware,
    Schema,
    PersistenceModel,
    Page,
    Component,
    ApiClient,
    State,
    Markup,
    Stylesheet,
    InfraModule,
    InfraComposition,
    InfraParameters,
    Manifest,
    Config,
}

/// One generated file.
///
/// Invariants: `path` is relative, `/`-separated and never escapes the
/// project root; `size` is the byte length of `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileArtifact {
    path: String,
    content: String,
    kind: ArtifactKind,
    generator: String,
    size: usize,
}

impl FileArtifact {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<String>,
        kind: ArtifactKind,
        generator: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let path = path.into();
        check_path(&path)?;
        let content = content.into();
        Ok(Self {
            size: content.len(),
            path,
            content,
            kind,
            generator: generator.into(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// File extension without the dot, if any.
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.path.rsplit('/').next()?;
        file_name.rsplit_once('.').map(|(_, ext)| ext).filter(|ext| !ext.is_empty())
    }
}

impl fmt::Display for FileArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes, {})", self.path, self.size, self.generator)
    }
}

fn check_path(path: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidArtifactPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.trim().is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.starts_with('/') || path.as_bytes().get(1) == Some(&b':') {
        return Err(invalid("path must be relative"));
    }
    if path.contains('\\') {
        return Err(invalid("use '/' as the separator"));
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err(invalid("path has an empty segment")),
            "." | ".." => return Err(invalid("path must not contain '.' or '..' segments")),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_tracks_content_bytes() {
        let artifact =
            FileArtifact::new("api/src/app.ts", "héllo", ArtifactKind::EntryPoint, "express-server")
                .unwrap();
        assert_eq!(artifact.size(), 6);
        assert_eq!(artifact.extension(), Some("ts"));
    }

    #[test]
    fn escaping_or_absolute_paths_are_rejected() {
        for bad in ["", "/etc/passwd", "C:/x.cs", "api/../secret", "api//x.ts", "api\\x.ts"] {
            assert!(
                FileArtifact::new(bad, "", ArtifactKind::Config, "test").is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let artifact =
            FileArtifact::new("web/index.html", "<html></html>", ArtifactKind::Markup, "react-ui")
                .unwrap();
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["path"], "web/index.html");
        assert_eq!(json["kind"], "markup");
        assert_eq!(json["generator"], "react-ui");
        assert_eq!(json["size"], 13);
    }
}
