//! User-friendly parse error types and formatting.
//!
//! Converts raw pest parser errors into structured, human-readable diagnostics
//! with source context, precise column indicators, and actionable hints.

use std::fmt;

use super::Rule;

/// A structured, user-friendly parser error.
///
/// Produced by converting a raw `pest::error::Error` and enriching it with
/// source context, translated rule names, and optional hints.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Human-readable error message (no raw rule names).
    pub message: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed) where the error begins.
    pub col: usize,
    /// End column for span errors (used to size the underline caret).
    pub col_end: Option<usize>,
    /// The full text of the offending source line.
    pub source_line: Option<String>,
    /// Optional source file name shown in the error header.
    pub filename: Option<String>,
    /// Optional suggestion to help the user fix the error.
    pub hint: Option<String>,
}

impl ParseError {
    /// Build a `ParseError` from a pest error, enriching it with source context.
    ///
    /// * `error`    – the raw pest error
    /// * `source`   – full source text that was being parsed
    /// * `filename` – optional file name to include in the error header
    #[must_use]
    pub fn from_pest(
        error: &pest::error::Error<Rule>,
        source: &str,
        filename: Option<&str>,
    ) -> Self {
        let (line, col, col_end) = match error.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c, None),
            pest::error::LineColLocation::Span((sl, sc), (el, ec)) => {
                let end = if sl == el { Some(ec) } else { None };
                (sl, sc, end)
            }
        };

        let source_line = source
            .lines()
            .nth(line.saturating_sub(1))
            .map(str::to_string);
        let at_end = line > source.lines().count()
            || source_line
                .as_deref()
                .is_some_and(|l| col > l.trim_end().len() && line == source.lines().count());

        let (message, hint) = match &error.variant {
            pest::error::ErrorVariant::ParsingError {
                positives,
                negatives,
            } => {
                let msg = friendly_message(positives, negatives, at_end);
                let h = friendly_hint(positives, at_end);
                (msg, h)
            }
            pest::error::ErrorVariant::CustomError { message } => (message.clone(), None),
        };

        ParseError {
            message,
            line,
            col,
            col_end,
            source_line,
            filename: filename.map(str::to_string),
            hint,
        }
    }
}

/// Return a short, user-facing label for a grammar rule, or `None` to omit it.
fn rule_label(rule: Rule) -> Option<&'static str> {
    match rule {
        Rule::identifier => Some("identifier"),
        Rule::item => Some("item"),
        Rule::function_def => Some("function definition"),
        Rule::function_body => Some("function body (`{ ... }`)"),
        Rule::param_list => Some("parameter list"),
        Rule::param => Some("parameter (`name: Type`)"),
        Rule::param_pattern => Some("parameter name"),
        Rule::param_type => Some("parameter type"),
        Rule::return_type => Some("return type"),
        Rule::generics => Some("generic parameters"),
        Rule::attribute => Some("attribute"),
        Rule::doc_comment => Some("doc comment"),
        Rule::string_lit => Some("string literal"),
        Rule::raw_string => Some("raw string literal"),
        Rule::char_lit => Some("character literal"),
        Rule::lifetime => Some("lifetime"),
        // EOI, punctuation and silent rules are suppressed.
        _ => None,
    }
}

/// Compose a human-readable message from the expected/unexpected rule sets.
fn friendly_message(positives: &[Rule], _negatives: &[Rule], at_end: bool) -> String {
    if at_end {
        return "unexpected end of file".to_string();
    }

    let mut named: Vec<&str> = positives.iter().copied().filter_map(rule_label).collect();
    named.dedup();

    match named.as_slice() {
        [] => "unexpected token".to_string(),
        [single] => format!("expected {single}"),
        [a, b] => format!("expected {a} or {b}"),
        many => {
            if let Some((last, rest)) = many.split_last() {
                format!("expected {} or {}", rest.join(", "), last)
            } else {
                "unexpected token".to_string()
            }
        }
    }
}

/// Return an actionable hint based on the set of expected rules and context.
fn friendly_hint(positives: &[Rule], at_end: bool) -> Option<String> {
    let has = |r: Rule| positives.contains(&r);

    if at_end {
        return Some(
            "A `{`, `(` or `[` is never closed, or a string literal is not terminated."
                .to_string(),
        );
    }

    if has(Rule::param) || has(Rule::param_pattern) || has(Rule::param_type) {
        return Some(
            "Task parameters look like `name: Type`, separated by commas.".to_string(),
        );
    }

    if has(Rule::string_lit) || has(Rule::char_lit) {
        return Some(
            "Check for an unterminated string or character literal, or a stray closing delimiter."
                .to_string(),
        );
    }

    None
}

/// Format the caret underline for an error at `col` with optional `col_end`.
fn underline(col: usize, col_end: Option<usize>) -> String {
    let start = col.saturating_sub(1);
    let len = col_end.map_or(1, |end| end.saturating_sub(col).max(1));
    format!("{}{}", " ".repeat(start), "^".repeat(len))
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ── error header ────────────────────────────────────────────────────
        //   error: <message>
        //     --> <file>:<line>:<col>
        writeln!(f, "error: {}", self.message)?;

        let location = match &self.filename {
            Some(name) => format!("{name}:{}:{}", self.line, self.col),
            None => format!("{}:{}", self.line, self.col),
        };
        writeln!(f, "  --> {location}")?;

        // ── source context ──────────────────────────────────────────────────
        //    |
        // NN | <source line>
        //    | <caret>
        if let Some(ref src) = self.source_line {
            let num = self.line.to_string();
            let pad = " ".repeat(num.len());

            writeln!(f, "   {pad} |")?;
            writeln!(f, "   {num} | {src}")?;
            writeln!(f, "   {pad} | {}", underline(self.col, self.col_end))?;
        }

        // ── hint ─────────────────────────────────────────────────────────────
        if let Some(ref hint) = self.hint {
            writeln!(f)?;
            write!(f, "   = hint: {hint}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::{super::SourceParser, *};
    use pest::Parser;

    /// Drive a real pest parse failure and convert it to `ParseError`.
    fn parse_err(input: &str, filename: Option<&str>) -> ParseError {
        let err = SourceParser::parse(Rule::file, input)
            .expect_err("expected a parse failure for this input");
        ParseError::from_pest(&err, input, filename)
    }

    #[test]
    fn test_display_includes_filename_and_location() {
        let err = parse_err("fn f() {}\n}\n", Some("src/main.rs"));
        let rendered = err.to_string();
        assert!(
            rendered.contains("src/main.rs:"),
            "filename missing in:\n{rendered}"
        );
        assert!(rendered.contains("error:"), "'error:' prefix missing in:\n{rendered}");
        assert!(rendered.contains("-->"), "location arrow missing in:\n{rendered}");
    }

    #[test]
    fn test_display_without_filename() {
        let err = parse_err("fn f() {}\n}\n", None);
        let rendered = err.to_string();
        assert!(!rendered.contains(".rs"), "unexpected filename in:\n{rendered}");
        assert!(rendered.contains("-->"), "location arrow missing in:\n{rendered}");
    }

    #[test]
    fn test_stray_closing_brace_points_to_its_line() {
        let err = parse_err("fn ok() {}\n} // stray\n", None);
        assert_eq!(err.line, 2, "error should point to second line");
        assert!(
            err.source_line.as_deref().unwrap_or("").contains("stray"),
            "source_line should contain the bad token; got: {:?}",
            err.source_line
        );
        assert!(err.to_string().contains('^'));
    }

    #[test]
    fn test_unclosed_block_reports_end_of_file() {
        let err = parse_err("fn open() {\n    let x = 1;\n", None);
        assert_eq!(err.message, "unexpected end of file");
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_no_raw_rule_names_in_message() {
        for input in ["fn f() {}\n)", "\"unclosed", "fn g(", "}"] {
            let err = parse_err(input, None);
            assert!(
                !err.message.contains("Rule::"),
                "raw rule name in message for `{input}`: {}",
                err.message
            );
            if let Some(ref hint) = err.hint {
                assert!(!hint.contains("Rule::"), "raw rule name in hint: {hint}");
            }
        }
    }
}
