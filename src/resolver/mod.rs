//! Argument resolution
//!
//! Turns the raw tokens that follow a task name into typed parameter values:
//!
//! 1. flag tokens are stably moved ahead of positional tokens,
//! 2. a flag set is built from the task's optional parameters,
//! 3. the flag set parses the reordered tokens,
//! 4. leftovers bind to required parameters in declaration order,
//! 5. flag values bind to optional parameters in declaration order.
//!
//! Values are written into the task only when every step succeeds.

mod flags;

pub use flags::{FlagSet, is_flag};

use crate::ast::{ArgType, ArgValue, Task};
use crate::error::TaskError;

/// Resolve `args` against `task`, writing each parameter's value in place.
///
/// # Errors
///
/// Returns `Err` if a flag is unknown or malformed, a value fails to coerce,
/// the positional count does not match, or a required parameter is a bool.
/// On error every parameter value is left unset.
pub fn resolve(task: &mut Task, args: &[String]) -> Result<(), TaskError> {
    task.clear_values();

    let mut flag_set = build_flag_set(task);
    let reordered = partition(args, &flag_set);
    tracing::debug!(task = %task.name, ?reordered, "reordered arguments");

    let positionals = flag_set.parse(&reordered)?;
    let positional_values = bind_positionals(task, &positionals)?;
    let mut flag_values = flag_set.into_values().into_iter();
    let mut positional_values = positional_values.into_iter();

    let resolved: Vec<Option<ArgValue>> = task
        .params
        .iter()
        .map(|param| {
            if param.optional {
                flag_values.next().flatten()
            } else {
                positional_values.next()
            }
        })
        .collect();

    for (param, value) in task.params.iter_mut().zip(resolved) {
        param.value = value;
    }
    Ok(())
}

/// One flag per optional parameter, registered in declaration order.
fn build_flag_set(task: &Task) -> FlagSet {
    let mut flag_set = FlagSet::new(&task.name);
    for param in task.optional_params() {
        flag_set.define(&param.name, param.param_type);
    }
    flag_set
}

/// Stable partition: flag tokens (with their separate values) first, then
/// positional tokens, each group in original order.
///
/// Tokens after a literal `--` are always positional. The terminator is kept
/// in front of the positionals only when one of them looks like a flag.
#[must_use]
pub fn partition(args: &[String], flag_set: &FlagSet) -> Vec<String> {
    let mut flag_tokens = Vec::new();
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(token) = iter.next() {
        if token == "--" {
            positional.extend(iter.by_ref().cloned());
            break;
        }
        if is_flag(token) {
            flag_tokens.push(token.clone());
            if flag_set.takes_separate_value(token)
                && let Some(value) = iter.next()
            {
                flag_tokens.push(value.clone());
            }
        } else {
            positional.push(token.clone());
        }
    }

    if positional.iter().any(|p| is_flag(p)) {
        flag_tokens.push("--".to_string());
    }
    flag_tokens.extend(positional);
    flag_tokens
}

/// Coerce leftover tokens onto the required parameters, in declaration order.
fn bind_positionals(task: &Task, positionals: &[String]) -> Result<Vec<ArgValue>, TaskError> {
    let mut values = Vec::new();

    for (index, param) in task.required_params().enumerate() {
        if param.param_type == ArgType::Boolean {
            return Err(TaskError::UnsupportedPositionalType {
                task: task.name.clone(),
                param: param.name.clone(),
            });
        }
        let Some(token) = positionals.get(index) else {
            return Err(TaskError::argument(
                param.name.as_str(),
                format!(
                    "missing positional argument `{}` ({})",
                    param.name, param.param_type
                ),
            ));
        };
        let value = coerce(param.param_type, token).map_err(|reason| TaskError::Conversion {
            param: param.name.clone(),
            value: token.clone(),
            expected: param.param_type.label(),
            reason,
        })?;
        values.push(value);
    }

    if let Some(extra) = positionals.get(values.len()) {
        return Err(TaskError::argument(
            extra.as_str(),
            format!(
                "unexpected positional argument {extra:?}: task {} takes {}",
                task.name,
                values.len()
            ),
        ));
    }

    Ok(values)
}

/// Convert a raw token into a value of the given type.
pub(crate) fn coerce(kind: ArgType, raw: &str) -> Result<ArgValue, String> {
    match kind {
        ArgType::String => Ok(ArgValue::String(raw.to_string())),
        ArgType::Integer => parse_int(raw).map(ArgValue::Integer),
        ArgType::Boolean => parse_bool(raw).map(ArgValue::Boolean),
    }
}

/// Integers accept an optional sign, `0x`/`0o`/`0b` prefixes and `_` separators.
fn parse_int(raw: &str) -> Result<i64, String> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        Some("0b" | "0B") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };
    let digits = digits.replace('_', "");
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err("invalid digit found in string".to_string());
    }
    let signed = if negative { format!("-{digits}") } else { digits };
    i64::from_str_radix(&signed, radix).map_err(|e| e.to_string())
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err("invalid boolean".to_string()),
    }
}
