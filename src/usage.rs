//! Usage banners for the whole task set and for a single task.

use crate::ast::{Parameter, Task};
use std::fmt::Write as _;

/// ANSI escapes used in banners. All empty when colors are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub info: &'static str,
    pub ok: &'static str,
    pub err: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub const ANSI: Self = Self {
        info: "\x1b[36m",
        ok: "\x1b[32m",
        err: "\x1b[31m",
        reset: "\x1b[0m",
    };

    pub const PLAIN: Self = Self {
        info: "",
        ok: "",
        err: "",
        reset: "",
    };

    #[must_use]
    pub fn new(color: bool) -> Self {
        if color { Self::ANSI } else { Self::PLAIN }
    }
}

/// How a parameter is written on the command line: `who:string` for a
/// positional, `-times:int` for a flag.
fn param_usage(param: &Parameter, palette: Palette) -> String {
    let dash = if param.optional { "-" } else { "" };
    format!(
        "{}{dash}{}{}:{}",
        palette.info, param.name, palette.reset, param.param_type
    )
}

/// Banner listing every discovered task with its parameters and the first
/// line of its doc.
#[must_use]
pub fn render(program: &str, tasks: &[Task], palette: Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}Usage:{}", palette.info, palette.reset);
    let _ = writeln!(out, "  {program} [command] [arguments]");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}Commands:{}", palette.info, palette.reset);

    if tasks.is_empty() {
        let _ = writeln!(out, "  (no tasks declared)");
        return out;
    }

    for task in tasks {
        let params: Vec<String> = task.params.iter().map(|p| param_usage(p, palette)).collect();
        let _ = write!(
            out,
            "  {}{}{}  - {} [ {} ]",
            palette.ok,
            task.name,
            palette.reset,
            task.doc.lines().next().unwrap_or_default(),
            params.join(" ")
        );
        if !task.is_bound() {
            let _ = write!(out, " {}(not registered){}", palette.err, palette.reset);
        }
        let _ = writeln!(out);
    }
    out
}

/// Help for one task, shown for `-h` / `-help`.
#[must_use]
pub fn render_task(program: &str, task: &Task, palette: Palette) -> String {
    let mut out = String::new();
    let positionals: Vec<String> = task
        .required_params()
        .map(|p| format!(" <{}:{}>", p.name, p.param_type))
        .collect();
    let has_flags = task.optional_params().next().is_some();

    let _ = writeln!(out, "{}Usage:{}", palette.info, palette.reset);
    let _ = writeln!(
        out,
        "  {program} {}{}{}{}{}",
        palette.ok,
        task.name,
        palette.reset,
        if has_flags { " [flags]" } else { "" },
        positionals.concat()
    );

    if !task.doc.is_empty() {
        let _ = writeln!(out);
        for line in task.doc.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }

    if has_flags {
        let width = task.optional_params().map(|p| p.name.len()).max().unwrap_or(0);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}Flags:{}", palette.info, palette.reset);
        for param in task.optional_params() {
            let _ = writeln!(out, "  -{:<width$}  {}", param.name, param.param_type);
        }
    }
    out
}
