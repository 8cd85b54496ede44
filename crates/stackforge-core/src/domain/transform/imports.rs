//! Per-file import aggregation.
//!
//! A generator registers every import a file *might* need as a candidate,
//! renders the body, then asks the set for the subset the body actually
//! references. The emitted import list is therefore minimal per file and
//! never a static superset.

use std::collections::{BTreeMap, BTreeSet};

/// Candidate imports for one file, keyed by module (or namespace).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    /// module → named symbols (`import { a, b } from 'module'`, or the
    /// symbols that make `using Namespace;` necessary).
    named: BTreeMap<String, BTreeSet<String>>,
    /// module → default binding (`import binding from 'module'`).
    defaults: BTreeMap<String, String>,
    /// module → type-only named symbols (`import type { T } from 'module'`).
    types: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named import candidate.
    pub fn named(&mut self, module: impl Into<String>, symbol: impl Into<String>) -> &mut Self {
        self.named
            .entry(module.into())
            .or_default()
            .insert(symbol.into());
        self
    }

    /// Register several named candidates from one module.
    pub fn named_all<I, S>(&mut self, module: &str, symbols: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for symbol in symbols {
            self.named(module, symbol);
        }
        self
    }

    /// Register a default import candidate.
    pub fn default_import(
        &mut self,
        module: impl Into<String>,
        binding: impl Into<String>,
    ) -> &mut Self {
        self.defaults.insert(module.into(), binding.into());
        self
    }

    /// Register a type-only import candidate.
    pub fn type_only(&mut self, module: impl Into<String>, symbol: impl Into<String>) -> &mut Self {
        self.types
            .entry(module.into())
            .or_default()
            .insert(symbol.into());
        self
    }

    /// The subset of candidates referenced by `body`.
    pub fn retain_referenced(&self, body: &str) -> ImportSet {
        let filter = |map: &BTreeMap<String, BTreeSet<String>>| {
            map.iter()
                .filter_map(|(module, symbols)| {
                    let used: BTreeSet<String> = symbols
                        .iter()
                        .filter(|s| references(body, s))
                        .cloned()
                        .collect();
                    (!used.is_empty()).then(|| (module.clone(), used))
                })
                .collect::<BTreeMap<_, _>>()
        };

        ImportSet {
            named: filter(&self.named),
            defaults: self
                .defaults
                .iter()
                .filter(|(_, binding)| references(body, binding))
                .map(|(m, b)| (m.clone(), b.clone()))
                .collect(),
            types: filter(&self.types),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.defaults.is_empty() && self.types.is_empty()
    }

    /// Number of distinct modules imported.
    pub fn module_count(&self) -> usize {
        self.named
            .keys()
            .chain(self.defaults.keys())
            .chain(self.types.keys())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Render as ECMAScript import statements, one per module, sorted.
    ///
    /// Package imports come before relative (`./`, `../`) imports.
    pub fn render_typescript(&self) -> String {
        let modules: BTreeSet<&String> = self
            .named
            .keys()
            .chain(self.defaults.keys())
            .chain(self.types.keys())
            .collect();

        let (packages, relative): (Vec<&String>, Vec<&String>) =
            modules.into_iter().partition(|m| !m.starts_with('.'));

        let mut out = String::new();
        for module in packages.into_iter().chain(relative) {
            let default = self.defaults.get(module.as_str());
            let named = self.named.get(module.as_str());
            match (default, named) {
                (Some(binding), Some(symbols)) => out.push_str(&format!(
                    "import {binding}, {{ {} }} from '{module}';\n",
                    join(symbols)
                )),
                (Some(binding), None) => {
                    out.push_str(&format!("import {binding} from '{module}';\n"))
                }
                (None, Some(symbols)) => out.push_str(&format!(
                    "import {{ {} }} from '{module}';\n",
                    join(symbols)
                )),
                (None, None) => {}
            }
            if let Some(symbols) = self.types.get(module.as_str()) {
                out.push_str(&format!(
                    "import type {{ {} }} from '{module}';\n",
                    join(symbols)
                ));
            }
        }
        out
    }

    /// Render as C# `using` directives, sorted with `System*` first.
    pub fn render_csharp(&self) -> String {
        let mut namespaces: Vec<&String> = self.named.keys().collect();
        namespaces.sort_by_key(|ns| (!ns.starts_with("System"), ns.as_str()));
        namespaces
            .into_iter()
            .map(|ns| format!("using {ns};\n"))
            .collect()
    }
}

fn join(symbols: &BTreeSet<String>) -> String {
    symbols.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Whether `ident` occurs in `body` as a whole identifier.
pub fn references(body: &str, ident: &str) -> bool {
    if ident.is_empty() {
        return false;
    }
    body.match_indices(ident).any(|(start, _)| {
        let end = start + ident.len();
        let before_ok = body[..start].chars().next_back().is_none_or(|c| !is_ident_char(c));
        let after_ok = body[end..].chars().next().is_none_or(|c| !is_ident_char(c));
        before_ok && after_ok
    })
}
