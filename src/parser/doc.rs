//! Doc comment extraction
//!
//! Turns the `///` and `/** */` comments in front of a function into the
//! task description shown in usage listings.

use super::Rule;
use pest::iterators::Pair;

/// Text lines of a single doc comment, with comment markers removed.
pub(super) fn comment_lines(pair: Pair<Rule>) -> Vec<String> {
    let Some(inner) = pair.into_inner().next() else {
        return Vec::new();
    };

    match inner.as_rule() {
        Rule::line_doc => {
            let text = inner
                .into_inner()
                .next()
                .map_or("", |t| t.as_str());
            vec![strip_leading_space(text.trim_end_matches('\r')).to_string()]
        }
        Rule::block_doc => {
            let text = inner
                .into_inner()
                .next()
                .map_or("", |t| t.as_str());
            text.lines()
                .map(|line| {
                    let line = line.trim_start();
                    let line = line.strip_prefix('*').unwrap_or(line);
                    strip_leading_space(line.trim_end()).to_string()
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Build a task description: the first mention of the function's own name is
/// dropped and surrounding newlines and spaces are trimmed.
pub(super) fn task_doc(lines: &[String], name: &str) -> String {
    let text = lines.join("\n");
    text.replacen(name, "", 1)
        .trim_matches(|c| c == '\n' || c == ' ')
        .to_string()
}

fn strip_leading_space(line: &str) -> &str {
    line.strip_prefix(' ').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_name_is_removed_once() {
        let doc = task_doc(&lines(&["greet greets; greet twice"]), "greet");
        assert_eq!(doc, "greets; greet twice");
    }

    #[test]
    fn test_name_not_mentioned() {
        let doc = task_doc(&lines(&["Builds everything"]), "build");
        assert_eq!(doc, "Builds everything");
    }

    #[test]
    fn test_multiline_doc_is_trimmed() {
        let doc = task_doc(&lines(&["", "deploy ships it", "to production", ""]), "deploy");
        assert_eq!(doc, "ships it\nto production");
    }

    #[test]
    fn test_empty_doc() {
        assert_eq!(task_doc(&[], "anything"), "");
    }
}
