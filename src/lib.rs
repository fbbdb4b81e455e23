//! # taskman
//!
//! Expose plain Rust functions as command-line tasks.
//!
//! The tasks are declared as ordinary top-level functions in the program's
//! own source file. That file is read at startup to recover each function's
//! name, doc comment and parameter list, the functions handed to [`run!`]
//! are matched to those declarations by name, and the command-line tail is
//! resolved into typed arguments:
//!
//! - required parameters are positional: `String` or an integer type
//! - `Option<T>` parameters are flags: `-name=value`, `-name value`, or a
//!   bare `-name` for `Option<bool>`
//!
//! ```ignore
//! /// hello says Hello
//! fn hello(who: String, times: Option<i64>) { /* ... */ }
//!
//! fn main() {
//!     taskman::run!(hello);
//! }
//! ```
//!
//! `cargo run -- hello Bob -times=3`

pub mod ast;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod inspect;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod usage;

pub use ast::{ArgType, ArgValue, Parameter, Task};
pub use cli::{Outcome, run, try_run};
pub use config::Config;
pub use error::TaskError;
pub use registry::Registry;

/// Print an error message and exit with code 1.
pub fn fatal_error(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

/// Register the given functions and run the task named on the command line.
///
/// Tasks are discovered from the invoking source file; relative paths are
/// resolved against the invoking crate's manifest directory.
#[macro_export]
macro_rules! run {
    ($($task:path),* $(,)?) => {{
        let mut registry = $crate::Registry::new();
        $(
            if let Err(e) = registry.register($task) {
                $crate::fatal_error(&format!("Error: {e}"));
            }
        )*
        $crate::run(
            $crate::Config::new(file!()).with_manifest_dir(env!("CARGO_MANIFEST_DIR")),
            &registry,
        )
    }};
}
