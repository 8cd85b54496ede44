//! Case conversion and English number inflection.
//!
//! Every generator names files, types, routes and columns through these
//! functions so that one declared name produces the same identifier
//! everywhere in the emitted tree.

use crate::domain::error::DomainError;

/// Convert a string to PascalCase ("title case" for identifiers).
///
/// | Input | Output |
/// |-------|--------|
/// | "my-app" | "MyApp" |
/// | "HTTPRequest" | "HttpRequest" |
/// | "line_item" | "LineItem" |
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// Convert a string to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// Convert a string to snake_case.
///
/// | Input | Output |
/// |-------|--------|
/// | "MyApp" | "my_app" |
/// | "my-app" | "my_app" |
/// | "XMLHttpRequest" | "xml_http_request" |
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// Convert a string to kebab-case. Used for paths, packages and routes.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// Convert a string to SCREAMING_SNAKE_CASE. Used for environment variables.
pub fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Split a string into lowercase words based on casing and separators.
///
/// 1. **Explicit separators:** `_`, `-`, `.`, whitespace always split
/// 2. **Case transition:** `aB` splits between `a` and `B`
/// 3. **Acronym boundary:** `HTTPRequest` splits between `P` and `R`
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(next) = chars.peek() {
            if (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

/// Reduce a (possibly plural) English noun to its singular form.
///
/// Only the trailing word is inflected; the rest of the input, including its
/// casing, is preserved. Deliberately small rule set: this names generated
/// code, it is not a dictionary.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();

    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    for suffix in ["sses", "xes", "ches", "shes", "zes"] {
        if lower.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.len() > 1 && lower.ends_with('s') {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Inflect a singular English noun to its plural form.
pub fn pluralize(word: &str) -> String {
    let singular = singularize(word);
    let lower = singular.to_ascii_lowercase();

    if lower.ends_with('y')
        && lower.len() > 1
        && !matches!(lower.as_bytes()[lower.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u')
    {
        return format!("{}ies", &singular[..singular.len() - 1]);
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{singular}es");
    }
    format!("{singular}s")
}

/// Check that `name` can be turned into an identifier in every target syntax.
///
/// Accepts ASCII letters, digits, `_`, `-` and spaces; must start with a letter.
pub fn validate_identifier(subject: &str, name: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidIdentifier {
        subject: subject.to_string(),
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = name.trim();
    let Some(first) = trimmed.chars().next() else {
        return Err(invalid("name is empty"));
    };
    if !first.is_ascii_alphabetic() {
        return Err(invalid("must start with an ASCII letter"));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || *c == ' '))
    {
        return Err(invalid(&format!("contains unsupported character '{bad}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_conversions_agree_on_word_boundaries() {
        assert_eq!(to_pascal_case("line_item"), "LineItem");
        assert_eq!(to_camel_case("LineItem"), "lineItem");
        assert_eq!(to_snake_case("LineItem"), "line_item");
        assert_eq!(to_kebab_case("lineItem"), "line-item");
        assert_eq!(to_screaming_snake_case("apiBaseUrl"), "API_BASE_URL");
    }

    #[test]
    fn acronyms_split_before_the_next_word() {
        assert_eq!(split_words("XMLHttpRequest"), vec!["xml", "http", "request"]);
        assert_eq!(to_pascal_case("HTTPServer"), "HttpServer");
    }

    #[test]
    fn digits_stay_attached() {
        assert_eq!(to_snake_case("oauth2Client"), "oauth2_client");
    }

    #[test]
    fn singularize_handles_common_suffixes() {
        assert_eq!(singularize("Invoices"), "Invoice");
        assert_eq!(singularize("Categories"), "Category");
        assert_eq!(singularize("Addresses"), "Address");
        assert_eq!(singularize("Boxes"), "Box");
        assert_eq!(singularize("Status"), "Status");
        assert_eq!(singularize("Invoice"), "Invoice");
    }

    #[test]
    fn pluralize_is_stable_on_plural_input() {
        assert_eq!(pluralize("Invoice"), "Invoices");
        assert_eq!(pluralize("Invoices"), "Invoices");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Status"), "Statuses");
    }

    #[test]
    fn identifier_validation() {
        assert!(validate_identifier("entity", "Invoice").is_ok());
        assert!(validate_identifier("entity", "line item").is_ok());
        assert!(validate_identifier("entity", "").is_err());
        assert!(validate_identifier("entity", "9lives").is_err());
        assert!(validate_identifier("entity", "bad/name").is_err());
    }
}
