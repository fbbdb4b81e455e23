//! Run configuration: which source file to introspect and how to print.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Overrides the caller-supplied source path.
pub const SOURCE_ENV: &str = "TASKMAN_SOURCE";
/// `tracing` filter directives, e.g. `taskman=debug`.
pub const LOG_ENV: &str = "TASKMAN_LOG";
/// Disables ANSI colors when set to any value.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Source file declaring the tasks, possibly relative.
    pub source: PathBuf,
    /// Manifest directory of the calling crate; a relative source is looked
    /// up here and in its ancestors before the current directory.
    pub manifest_dir: Option<PathBuf>,
    /// Program name shown in the usage banner.
    pub program: String,
    pub color: bool,
}

impl Config {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            manifest_dir: None,
            program: program_name(),
            color: true,
        }
    }

    #[must_use]
    pub fn with_manifest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.manifest_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Apply `TASKMAN_SOURCE` and `NO_COLOR` from the process environment.
    ///
    /// A source taken from the environment is relative to the current
    /// directory, so it drops the manifest directory.
    #[must_use]
    pub fn from_env(self) -> Self {
        self.with_env(|key| std::env::var_os(key))
    }

    /// Apply environment overrides read through `lookup`.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        if let Some(source) = lookup(SOURCE_ENV).filter(|s| !s.is_empty()) {
            self = self.with_source_override(source);
        }
        if lookup(NO_COLOR_ENV).is_some() {
            self.color = false;
        }
        self
    }

    /// Replace the source with a user-supplied path, read relative to the
    /// current directory.
    #[must_use]
    pub fn with_source_override(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = source.into();
        self.manifest_dir = None;
        self
    }

    /// Locate the source file on disk.
    ///
    /// Absolute paths are used as given. A relative path is tried against the
    /// manifest directory and each of its ancestors, then against the current
    /// directory. If nothing exists the path is returned unchanged so the read
    /// reports the original name.
    #[must_use]
    pub fn resolve_source(&self) -> PathBuf {
        if self.source.is_absolute() {
            return self.source.clone();
        }

        if let Some(dir) = &self.manifest_dir {
            for base in dir.ancestors() {
                let candidate = base.join(&self.source);
                if candidate.is_file() {
                    return candidate;
                }
            }
        }

        self.source.clone()
    }
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map_or_else(|| "taskman".to_string(), |n| n.to_string_lossy().into_owned())
}
