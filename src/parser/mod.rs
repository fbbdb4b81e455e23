//! Source introspection using pest
//!
//! This module reads a Rust source file and turns every top-level function
//! (other than `main`) into a [`Task`] candidate: its name, its doc comment
//! and its typed parameter list. Everything that is not a top-level `fn` is
//! skipped as a balanced token tree.

mod doc;
mod error;
mod types;

pub use error::ParseError;

use crate::ast::{Parameter, Task};
use crate::error::TaskError;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct SourceParser;

/// Name of the process entry point, never exposed as a task.
pub const ENTRY_POINT: &str = "main";

/// Read `path` and discover the tasks declared in it.
///
/// # Errors
///
/// Returns `Err` if the file cannot be read, is not syntactically valid, or
/// declares a parameter whose type cannot be mapped to a task argument.
pub fn discover(path: &Path) -> Result<Vec<Task>, TaskError> {
    let source = fs::read_to_string(path).map_err(|source| TaskError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path.display().to_string();
    parse_source(&source, Some(&filename))
}

/// Discover tasks from source text, in file order.
///
/// # Errors
///
/// Returns `Err` if:
/// - The text does not parse (unbalanced delimiters, unterminated literals)
/// - A parameter uses a pattern or type that cannot be bound from the command line
/// - Two top-level functions share a name
pub fn parse_source(input: &str, filename: Option<&str>) -> Result<Vec<Task>, TaskError> {
    let pairs = SourceParser::parse(Rule::file, input)
        .map_err(|e| ParseError::from_pest(&e, input, filename))?;
    let mut tasks: Vec<Task> = Vec::new();

    for pair in pairs {
        if pair.as_rule() != Rule::file {
            continue;
        }
        for item in pair.into_inner() {
            if item.as_rule() != Rule::item {
                continue;
            }
            let Some(task) = parse_item(item)? else {
                continue;
            };
            if tasks.iter().any(|t| t.name == task.name) {
                return Err(TaskError::DuplicateTaskName { name: task.name });
            }
            tasks.push(task);
        }
    }

    Ok(tasks)
}

fn parse_item(pair: Pair<Rule>) -> Result<Option<Task>, TaskError> {
    let mut doc_lines = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::doc_comment => doc_lines.extend(doc::comment_lines(inner)),
            Rule::function_def => return parse_function(inner, &doc_lines),
            // Attributes and non-function items carry nothing we need
            _ => {}
        }
    }

    Ok(None)
}

fn parse_function(pair: Pair<Rule>, doc_lines: &[String]) -> Result<Option<Task>, TaskError> {
    let Some(name) = pair
        .clone()
        .into_inner()
        .find(|p| p.as_rule() == Rule::identifier)
        .map(|p| p.as_str().to_string())
    else {
        return Ok(None);
    };

    if name == ENTRY_POINT {
        return Ok(None);
    }

    let mut params = Vec::new();
    if let Some(list) = pair.into_inner().find(|p| p.as_rule() == Rule::param_list) {
        for param_pair in list.into_inner() {
            if param_pair.as_rule() == Rule::param {
                params.push(parse_param(param_pair, &name)?);
            }
        }
    }

    let doc = doc::task_doc(doc_lines, &name);
    Ok(Some(Task::new(name, doc, params)))
}

fn parse_param(pair: Pair<Rule>, task: &str) -> Result<Parameter, TaskError> {
    let mut name: Option<String> = None;
    let mut raw_type: Option<&str> = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::param_pattern => {
                let pattern = inner.as_str().trim().to_string();
                let ident = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::identifier)
                    .map(|p| p.as_str());
                match ident {
                    Some("_") | None => {
                        return Err(TaskError::UnsupportedSignature {
                            task: task.to_string(),
                            param: pattern,
                            reason: "each parameter needs exactly one name".to_string(),
                        });
                    }
                    Some(ident) => name = Some(ident.to_string()),
                }
            }
            Rule::param_type => raw_type = Some(inner.as_str()),
            _ => {}
        }
    }

    let (Some(name), Some(raw_type)) = (name, raw_type) else {
        return Err(TaskError::UnsupportedSignature {
            task: task.to_string(),
            param: String::new(),
            reason: "malformed parameter".to_string(),
        });
    };

    let (param_type, optional) =
        types::classify(raw_type).map_err(|reason| TaskError::UnsupportedSignature {
            task: task.to_string(),
            param: name.clone(),
            reason,
        })?;

    Ok(Parameter {
        name,
        param_type,
        optional,
        value: None,
    })
}
