//! Mapping of declared Rust parameter types onto task argument types

use crate::ast::ArgType;
use once_cell::sync::Lazy;
use regex::Regex;

static LIFETIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'[A-Za-z_][A-Za-z0-9_]*\s*").expect("lifetime regex pattern is valid"));

static OPTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:std|core)::option::)?Option<(.+)>$").expect("option regex pattern is valid")
});

static STD_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(&?)(?:std|core|alloc)::(?:[A-Za-z_][A-Za-z0-9_]*::)*")
        .expect("std path regex pattern is valid")
});

/// Classify the text of a parameter type.
///
/// Returns the primitive type and whether the parameter is optional
/// (`Option<T>`), or a human-readable reason the type is not supported.
pub(super) fn classify(raw: &str) -> Result<(ArgType, bool), String> {
    let ty = normalize(raw);

    if let Some(caps) = OPTION_REGEX.captures(&ty) {
        let inner = strip_std_path(&caps[1]);
        if OPTION_REGEX.is_match(&inner) {
            return Err(format!("nested `{ty}` is not supported"));
        }
        return primitive(&inner).map(|t| (t, true));
    }

    primitive(&strip_std_path(&ty)).map(|t| (t, false))
}

fn primitive(ty: &str) -> Result<ArgType, String> {
    if ty == "&str" {
        return Err(
            "a borrowed `&str` cannot hold a command-line value; declare `String`".to_string(),
        );
    }
    ArgType::from_rust_type(ty).map_err(|e| e.to_string())
}

/// Drop lifetimes and all whitespace: `& 'a str` becomes `&str`.
fn normalize(raw: &str) -> String {
    let without_lifetimes = LIFETIME_REGEX.replace_all(raw, "");
    without_lifetimes.split_whitespace().collect()
}

fn strip_std_path(ty: &str) -> String {
    STD_PATH_REGEX.replace(ty, "$1").into_owned()
}
