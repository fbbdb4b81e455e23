//! Per-task flag set
//!
//! Parses `-name`, `--name`, `-name=value` and `-name value` tokens until the
//! first non-flag token or a `--` terminator, and hands back the remaining
//! tokens as positionals. Flags are kept in registration order.

use super::coerce;
use crate::ast::{ArgType, ArgValue};
use crate::error::TaskError;

#[derive(Debug, Clone)]
struct Flag {
    name: String,
    kind: ArgType,
    value: Option<ArgValue>,
}

#[derive(Debug, Clone)]
pub struct FlagSet {
    task: String,
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            flags: Vec::new(),
        }
    }

    /// Register a flag. Registration order is the order of [`FlagSet::into_values`].
    pub fn define(&mut self, name: impl Into<String>, kind: ArgType) {
        self.flags.push(Flag {
            name: name.into(),
            kind,
            value: None,
        });
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        self.flags.iter().position(|f| f.name == name)
    }

    /// Whether `token` is a flag that takes its value from the next token
    /// (`-name value` for a declared non-bool flag).
    #[must_use]
    pub fn takes_separate_value(&self, token: &str) -> bool {
        let Some(name) = flag_name(token) else {
            return false;
        };
        if name.contains('=') {
            return false;
        }
        self.lookup(name)
            .is_some_and(|i| self.flags[i].kind != ArgType::Boolean)
    }

    /// Parse flags from the front of `args`, returning the unconsumed tokens.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Argument` for malformed or unknown flags and values
    /// that fail to coerce, and `TaskError::HelpRequested` for an undeclared
    /// `-h` / `-help`.
    pub fn parse(&mut self, args: &[String]) -> Result<Vec<String>, TaskError> {
        let mut index = 0;
        while index < args.len() {
            let token = &args[index];
            if token == "--" {
                index += 1;
                break;
            }
            let Some(body) = flag_name(token) else {
                break;
            };
            index += 1;

            if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
                return Err(TaskError::argument(
                    token,
                    format!("bad flag syntax: {token}"),
                ));
            }

            let (name, inline_value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };

            let Some(slot) = self.lookup(name) else {
                if name == "h" || name == "help" {
                    return Err(TaskError::HelpRequested {
                        task: self.task.clone(),
                    });
                }
                return Err(TaskError::argument(
                    token,
                    format!("flag provided but not defined: -{name}"),
                ));
            };

            let kind = self.flags[slot].kind;
            let raw = match (kind, inline_value) {
                (_, Some(value)) => value.to_string(),
                (ArgType::Boolean, None) => "true".to_string(),
                (_, None) => {
                    let Some(next) = args.get(index) else {
                        return Err(TaskError::argument(
                            token,
                            format!("flag needs an argument: -{name}"),
                        ));
                    };
                    index += 1;
                    next.clone()
                }
            };

            let value = coerce(kind, &raw).map_err(|reason| {
                TaskError::argument(
                    token,
                    format!("invalid value {raw:?} for flag -{name}: {reason}"),
                )
            })?;
            self.flags[slot].value = Some(value);
        }

        Ok(args[index..].to_vec())
    }

    /// Parsed values in registration order; `None` for flags not given.
    #[must_use]
    pub fn into_values(self) -> Vec<Option<ArgValue>> {
        self.flags.into_iter().map(|f| f.value).collect()
    }
}

/// Whether `token` is syntactically a flag: a dash followed by anything.
/// A lone `-` is a positional.
#[must_use]
pub fn is_flag(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('-')
}

/// Strip one or two leading dashes from a flag token.
fn flag_name(token: &str) -> Option<&str> {
    if !is_flag(token) || token == "--" {
        return None;
    }
    let body = token.strip_prefix("--").unwrap_or(&token[1..]);
    Some(body)
}
