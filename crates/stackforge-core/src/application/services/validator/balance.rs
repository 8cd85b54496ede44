//! String- and comment-aware delimiter balance.
//!
//! A small per-family lexer: it only knows where comments and string
//! literals start and end, so braces inside them are ignored. Interpolation
//! holes (`${ ... }` in TypeScript template literals and Bicep strings) are
//! scanned as code.

use super::LanguageFamily;
use crate::domain::ValidationFinding;

struct Syntax {
    line_comments: &'static [&'static str],
    block_comment: Option<(&'static str, &'static str)>,
    quotes: &'static [char],
    /// Quotes whose literals may span lines.
    multiline_quotes: &'static [char],
    /// Quote whose literals open `${` interpolation holes.
    interpolating: Option<char>,
    triple_quotes: bool,
    backslash_escapes: bool,
    /// C# `@"..."` verbatim strings.
    verbatim_prefix: bool,
}

impl Syntax {
    fn for_family(family: LanguageFamily) -> Option<Self> {
        let syntax = match family {
            LanguageFamily::TypeScript => Self {
                line_comments: &["//"],
                block_comment: Some(("/*", "*/")),
                quotes: &['\'', '"', '`'],
                multiline_quotes: &['`'],
                interpolating: Some('`'),
                triple_quotes: false,
                backslash_escapes: true,
                verbatim_prefix: false,
            },
            LanguageFamily::CSharp => Self {
                line_comments: &["//"],
                block_comment: Some(("/*", "*/")),
                quotes: &['"', '\''],
                multiline_quotes: &[],
                interpolating: None,
                triple_quotes: false,
                backslash_escapes: true,
                verbatim_prefix: true,
            },
            LanguageFamily::Python => Self {
                line_comments: &["#"],
                block_comment: None,
                quotes: &['\'', '"'],
                multiline_quotes: &[],
                interpolating: None,
                triple_quotes: true,
                backslash_escapes: true,
                verbatim_prefix: false,
            },
            LanguageFamily::Sql => Self {
                line_comments: &["--"],
                block_comment: Some(("/*", "*/")),
                quotes: &['\'', '"'],
                multiline_quotes: &['\''],
                interpolating: None,
                triple_quotes: false,
                backslash_escapes: false,
                verbatim_prefix: false,
            },
            LanguageFamily::Bicep => Self {
                line_comments: &["//"],
                block_comment: Some(("/*", "*/")),
                quotes: &['\''],
                multiline_quotes: &[],
                interpolating: Some('\''),
                triple_quotes: true,
                backslash_escapes: true,
                verbatim_prefix: false,
            },
            LanguageFamily::Json => Self {
                line_comments: &[],
                block_comment: None,
                quotes: &['"'],
                multiline_quotes: &[],
                interpolating: None,
                triple_quotes: false,
                backslash_escapes: true,
                verbatim_prefix: false,
            },
            LanguageFamily::Css => Self {
                line_comments: &[],
                block_comment: Some(("/*", "*/")),
                quotes: &['\'', '"'],
                multiline_quotes: &[],
                interpolating: None,
                triple_quotes: false,
                backslash_escapes: true,
                verbatim_prefix: false,
            },
            LanguageFamily::Markup | LanguageFamily::Yaml | LanguageFamily::Unknown => return None,
        };
        Some(syntax)
    }
}

#[derive(Clone, Copy)]
struct StringState {
    quote: char,
    start: usize,
    triple: bool,
    verbatim: bool,
}

#[derive(Clone, Copy)]
enum Mode {
    Code,
    LineComment,
    BlockComment { start: usize },
    Str(StringState),
}

enum Frame {
    Open { delim: char, line: usize },
    Interpolation(StringState),
}

fn closer_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn starts_with(chars: &[char], at: usize, pattern: &str) -> bool {
    let mut i = at;
    for p in pattern.chars() {
        if chars.get(i) != Some(&p) {
            return false;
        }
        i += 1;
    }
    true
}

/// Balance findings for `content`; empty for families without a lexer.
pub(super) fn check(family: LanguageFamily, file: &str, content: &str) -> Vec<ValidationFinding> {
    let Some(syntax) = Syntax::for_family(family) else {
        return Vec::new();
    };

    let chars: Vec<char> = content.chars().collect();
    let mut findings = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut mode = Mode::Code;
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match mode {
            Mode::Code => {
                if let Some(lc) = syntax.line_comments.iter().find(|lc| starts_with(&chars, i, lc)) {
                    mode = Mode::LineComment;
                    i += lc.chars().count();
                    continue;
                }
                if let Some((open, _)) = syntax.block_comment {
                    if starts_with(&chars, i, open) {
                        mode = Mode::BlockComment { start: line };
                        i += open.chars().count();
                        continue;
                    }
                }
                if syntax.quotes.contains(&c) {
                    let triple = syntax.triple_quotes
                        && chars.get(i + 1) == Some(&c)
                        && chars.get(i + 2) == Some(&c);
                    let verbatim = syntax.verbatim_prefix
                        && c == '"'
                        && (chars.get(i.wrapping_sub(1)) == Some(&'@')
                            || (chars.get(i.wrapping_sub(1)) == Some(&'$')
                                && chars.get(i.wrapping_sub(2)) == Some(&'@')));
                    mode = Mode::Str(StringState {
                        quote: c,
                        start: line,
                        triple,
                        verbatim,
                    });
                    i += if triple { 3 } else { 1 };
                    continue;
                }
                match c {
                    '(' | '[' | '{' => stack.push(Frame::Open { delim: c, line }),
                    ')' | ']' | '}' => match stack.last() {
                        Some(Frame::Interpolation(state)) if c == '}' => {
                            mode = Mode::Str(*state);
                            stack.pop();
                        }
                        Some(Frame::Open { delim, .. }) if closer_for(*delim) == c => {
                            stack.pop();
                        }
                        Some(Frame::Open { delim, line: opened }) => {
                            findings.push(ValidationFinding::error(
                                file,
                                Some(line),
                                format!(
                                    "mismatched '{c}': expected '{}' to close '{delim}' from line {opened}",
                                    closer_for(*delim)
                                ),
                            ));
                            stack.pop();
                        }
                        Some(Frame::Interpolation(_)) | None => {
                            findings.push(ValidationFinding::error(
                                file,
                                Some(line),
                                format!("unexpected closing '{c}'"),
                            ));
                        }
                    },
                    '\n' => line += 1,
                    _ => {}
                }
            }
            Mode::LineComment => {
                if c == '\n' {
                    line += 1;
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment { .. } => {
                if let Some((_, close)) = syntax.block_comment {
                    if starts_with(&chars, i, close) {
                        mode = Mode::Code;
                        i += close.chars().count();
                        continue;
                    }
                }
                if c == '\n' {
                    line += 1;
                }
            }
            Mode::Str(state) => {
                if c == '\\' && syntax.backslash_escapes && !state.verbatim && !state.triple {
                    if chars.get(i + 1) == Some(&'\n') {
                        line += 1;
                    }
                    i += 2;
                    continue;
                }
                if state.verbatim && c == '"' && chars.get(i + 1) == Some(&'"') {
                    i += 2;
                    continue;
                }
                if syntax.interpolating == Some(state.quote)
                    && !state.triple
                    && c == '$'
                    && chars.get(i + 1) == Some(&'{')
                {
                    stack.push(Frame::Interpolation(state));
                    mode = Mode::Code;
                    i += 2;
                    continue;
                }
                if state.triple {
                    if c == state.quote
                        && chars.get(i + 1) == Some(&c)
                        && chars.get(i + 2) == Some(&c)
                    {
                        mode = Mode::Code;
                        i += 3;
                        continue;
                    }
                } else if c == state.quote {
                    mode = Mode::Code;
                }
                if c == '\n' {
                    if !state.triple
                        && !state.verbatim
                        && !syntax.multiline_quotes.contains(&state.quote)
                    {
                        findings.push(ValidationFinding::error(
                            file,
                            Some(state.start),
                            format!("unterminated string literal starting with {}", state.quote),
                        ));
                        mode = Mode::Code;
                    }
                    line += 1;
                }
            }
        }
        i += 1;
    }

    match mode {
        Mode::Str(state) => findings.push(ValidationFinding::error(
            file,
            Some(state.start),
            format!("unterminated string literal starting with {}", state.quote),
        )),
        Mode::BlockComment { start } => findings.push(ValidationFinding::error(
            file,
            Some(start),
            "unterminated block comment",
        )),
        Mode::Code | Mode::LineComment => {}
    }

    for frame in stack {
        match frame {
            Frame::Open { delim, line } => findings.push(ValidationFinding::error(
                file,
                Some(line),
                format!("unclosed '{delim}'"),
            )),
            Frame::Interpolation(state) => findings.push(ValidationFinding::error(
                file,
                Some(state.start),
                "unterminated '${' interpolation",
            )),
        }
    }

    findings.sort_by_key(|f| f.line);
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(family: LanguageFamily, src: &str) -> Vec<(Option<usize>, String)> {
        check(family, "f", src)
            .into_iter()
            .map(|f| (f.line, f.message))
            .collect()
    }

    #[test]
    fn balanced_code_is_clean() {
        let src = "function f(a: number[]) {\n  return { a };\n}\n";
        assert!(errors(LanguageFamily::TypeScript, src).is_empty());
    }

    #[test]
    fn one_unresolved_brace_is_reported_once_at_its_line() {
        let src = "const a = 1;\nfunction f() {\n  return a;\n";
        let found = errors(LanguageFamily::TypeScript, src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, Some(2));
        assert!(found[0].1.contains("unclosed '{'"));
    }

    #[test]
    fn braces_in_strings_and_comments_are_ignored() {
        let src = r#"
const a = "{ not code";
const b = '}';
// { comment
/* ( block
   [ comment */
const c = `template { ${a.length} }`;
"#;
        assert!(errors(LanguageFamily::TypeScript, src).is_empty());
    }

    #[test]
    fn interpolation_holes_are_code() {
        let src = "const s = `${fn(1}`;\n";
        let found = errors(LanguageFamily::TypeScript, src);
        assert!(!found.is_empty());
    }

    #[test]
    fn stray_and_mismatched_closers_are_errors() {
        let stray = errors(LanguageFamily::CSharp, "class A { }\n}\n");
        assert_eq!(stray, vec![(Some(2), "unexpected closing '}'".to_string())]);

        let mismatched = errors(LanguageFamily::CSharp, "Foo(a]\n");
        assert_eq!(mismatched.len(), 1);
        assert!(mismatched[0].1.contains("mismatched"));
    }

    #[test]
    fn csharp_verbatim_strings_span_quotes() {
        let src = "var s = @\"say \"\"{\"\" here\";\nvar t = $@\"{x}\";\n";
        assert!(errors(LanguageFamily::CSharp, src).is_empty());
    }

    #[test]
    fn bicep_interpolation_and_multiline_strings() {
        let src = "var name = '${prefix}-${toLower(env)}'\nvar doc = '''\n{ not code\n'''\n";
        assert!(errors(LanguageFamily::Bicep, src).is_empty());
    }

    #[test]
    fn sql_doubled_quotes_and_dash_comments() {
        let src = "-- (comment\nINSERT INTO t (a) VALUES ('it''s');\n";
        assert!(errors(LanguageFamily::Sql, src).is_empty());
    }

    #[test]
    fn css_braces_in_strings_and_comments() {
        let src = ".a::after {\n  content: '}';\n}\n/* .b { */\n";
        assert!(errors(LanguageFamily::Css, src).is_empty());
    }

    #[test]
    fn python_triple_quoted_strings() {
        let src = "def f():\n    \"\"\"Docs with ( paren\n    \"\"\"\n    return [1, 2]  # ]\n";
        assert!(errors(LanguageFamily::Python, src).is_empty());
    }

    #[test]
    fn unterminated_string_is_reported_and_scan_recovers() {
        let src = "const a = 'oops;\nconst b = { c: 1 };\n";
        let found = errors(LanguageFamily::TypeScript, src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, Some(1));
    }

    #[test]
    fn garbage_never_panics() {
        for src in ["\\", "'", "`${", "/*", "@\"", "'''", "\"\\", "}}}(((", "\u{1F600}{"] {
            for family in [
                LanguageFamily::TypeScript,
                LanguageFamily::CSharp,
                LanguageFamily::Python,
                LanguageFamily::Sql,
                LanguageFamily::Bicep,
                LanguageFamily::Json,
                LanguageFamily::Css,
            ] {
                let _ = check(family, "f", src);
            }
        }
    }
}
