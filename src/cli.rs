//! Process entry point: command-line parsing, discovery, binding and dispatch.
//!
//! [`try_run`] does the work and reports what happened; [`run`] prints that
//! report and turns it into an exit status.

use crate::config::{Config, LOG_ENV};
use crate::error::TaskError;
use crate::registry::{self, Registry};
use crate::usage::{self, Palette};
use crate::{executor, inspect, parser};
use clap::Parser as ClapParser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command-line arguments accepted by a task program, up to the task name.
/// Everything after the task name belongs to the task and never reaches clap.
#[derive(ClapParser, Debug)]
#[command(about = "Run a task declared in this program's source", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Task to run, followed by its positionals and -flag=value pairs
    #[arg(value_name = "TASK")]
    task: Option<String>,

    /// List all declared tasks
    #[arg(long)]
    list: bool,

    /// Output a JSON description of all declared tasks
    #[arg(long)]
    inspect: bool,

    /// Source file declaring the tasks (overrides TASKMAN_SOURCE)
    #[arg(long, value_name = "PATH")]
    source: Option<PathBuf>,
}

/// What a run did, with any text it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The named task ran to completion.
    Invoked { task: String },
    /// No task was named; carries the banner.
    Usage(String),
    /// `--list`; carries the banner.
    Listed(String),
    /// `--inspect`; carries the JSON document.
    Inspected(String),
    /// `-h` on a task; carries that task's help.
    Help(String),
}

impl Outcome {
    /// Print the outcome's text and return the process exit status.
    fn report(&self) -> i32 {
        match self {
            Self::Invoked { .. } => 0,
            Self::Usage(banner) => {
                eprint!("{banner}");
                1
            }
            Self::Listed(banner) => {
                print!("{banner}");
                0
            }
            Self::Inspected(json) => {
                println!("{json}");
                0
            }
            Self::Help(help) => {
                eprint!("{help}");
                0
            }
        }
    }
}

/// Split `argv` after the task name. The head holds the program name, the
/// program's own options and the task; the tail is the task's argument list,
/// kept verbatim so `-h` and `--` reach the task.
///
/// The task is the first token that is not an option. `--source` consumes
/// the token after it, and a `--` marks the next token as the task.
fn split_at_task(mut argv: Vec<OsString>) -> (Vec<OsString>, Vec<String>) {
    let mut index = 1;
    let task_at = loop {
        let Some(token) = argv.get(index) else { break None };
        let token = token.to_string_lossy();
        if token == "--" {
            break (index + 1 < argv.len()).then_some(index + 1);
        }
        if token == "--source" {
            index += 2;
        } else if token.len() > 1 && token.starts_with('-') {
            index += 1;
        } else {
            break Some(index);
        }
    };

    let Some(at) = task_at else {
        return (argv, Vec::new());
    };
    let tail = argv
        .split_off(at + 1)
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    (argv, tail)
}

/// Discover, bind and dispatch according to `argv` (program name first).
///
/// # Errors
///
/// Returns the first failure of the pipeline: command-line parsing, source
/// discovery, lookup, argument resolution or invocation.
pub fn try_run<I, T>(config: &Config, registry: &Registry, argv: I) -> Result<Outcome, TaskError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let (head, args) = split_at_task(argv.into_iter().map(Into::into).collect());
    let cli = Cli::try_parse_from(head)?;

    let mut config = config.clone();
    if let Some(source) = cli.source {
        config = config.with_source_override(source);
    }
    let path = config.resolve_source();
    let discovered = parser::discover(&path)?;
    tracing::debug!(
        path = %path.display(),
        tasks = ?discovered.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "discovered tasks"
    );
    let mut tasks = registry::bind(discovered, registry);
    let palette = Palette::new(config.color);

    if cli.inspect {
        return Ok(Outcome::Inspected(inspect::render(&tasks)));
    }
    if cli.list {
        return Ok(Outcome::Listed(usage::render(&config.program, &tasks, palette)));
    }
    let Some(name) = cli.task else {
        return Ok(Outcome::Usage(usage::render(&config.program, &tasks, palette)));
    };

    match executor::dispatch(&mut tasks, &name, &args) {
        Ok(()) => Ok(Outcome::Invoked { task: name }),
        Err(TaskError::HelpRequested { task }) => {
            let task = executor::find_task(&mut tasks, &task)?;
            Ok(Outcome::Help(usage::render_task(&config.program, task, palette)))
        }
        Err(e) => Err(e),
    }
}

/// Install a stderr `tracing` subscriber filtered by `TASKMAN_LOG`.
/// Does nothing if the host already installed one.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the task named on the process command line and exit.
///
/// Environment overrides are applied on top of `config`.
pub fn run(config: Config, registry: &Registry) -> ! {
    init_logging();
    let config = config.from_env();

    match try_run(&config, registry, std::env::args_os()) {
        Ok(outcome) => std::process::exit(outcome.report()),
        Err(TaskError::Cli(e)) => e.exit(),
        Err(e) => crate::fatal_error(&format!("Error: {e}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    const SOURCE: &str = r#"
/// greet says hi
fn greet(who: String, loud: Option<bool>) {}

fn main() {}
"#;

    fn fixture() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.rs");
        fs::write(&path, SOURCE).unwrap();
        let config = Config::new(path).with_program("demo").with_color(false);
        (dir, config)
    }

    fn split(argv: &[&str]) -> (Vec<String>, Vec<String>) {
        let (head, tail) = split_at_task(argv.iter().map(OsString::from).collect());
        let head = head.into_iter().map(|a| a.into_string().unwrap()).collect();
        (head, tail)
    }

    #[test]
    fn test_cli_splits_task_and_tail() {
        let (head, tail) = split(&["demo", "greet", "-loud", "Bob", "--", "-x"]);
        assert_eq!(head, vec!["demo", "greet"]);
        assert_eq!(tail, vec!["-loud", "Bob", "--", "-x"]);

        let cli = Cli::try_parse_from(head).unwrap();
        assert_eq!(cli.task.as_deref(), Some("greet"));
        assert!(!cli.list);
    }

    #[test]
    fn test_cli_leaves_task_flags_alone() {
        assert_eq!(split(&["demo", "offset", "--", "-5"]).1, vec!["--", "-5"]);
        assert_eq!(split(&["demo", "greet", "-h"]).1, vec!["-h"]);
        assert_eq!(split(&["demo", "greet", "--help"]).1, vec!["--help"]);
    }

    #[test]
    fn test_cli_options_before_task() {
        let (head, tail) = split(&["demo", "--source", "x.rs", "--list"]);
        assert!(tail.is_empty());
        let cli = Cli::try_parse_from(head).unwrap();
        assert_eq!(cli.source, Some(PathBuf::from("x.rs")));
        assert!(cli.list);
        assert!(cli.task.is_none());

        let (head, tail) = split(&["demo", "--source=x.rs", "greet", "--source", "y"]);
        assert_eq!(head, vec!["demo", "--source=x.rs", "greet"]);
        assert_eq!(tail, vec!["--source", "y"]);
    }

    #[test]
    fn test_double_dash_before_task() {
        let (head, tail) = split(&["demo", "--", "greet", "Bob"]);
        assert_eq!(head, vec!["demo", "--", "greet"]);
        assert_eq!(tail, vec!["Bob"]);
        let cli = Cli::try_parse_from(head).unwrap();
        assert_eq!(cli.task.as_deref(), Some("greet"));

        assert_eq!(split(&["demo", "--"]), (vec!["demo".to_string(), "--".to_string()], vec![]));
    }

    #[test]
    fn test_leading_double_dash_reaches_task() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.rs");
        fs::write(&path, "fn offset(n: i64) {}\n").unwrap();
        let config = Config::new(path).with_program("demo").with_color(false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut registry = Registry::new();
        registry
            .register_as("offset", move |n: i64| sink.borrow_mut().push(n))
            .unwrap();

        let outcome = try_run(&config, &registry, ["demo", "offset", "--", "-5"]).unwrap();
        assert_eq!(outcome, Outcome::Invoked { task: "offset".to_string() });
        assert_eq!(*seen.borrow(), vec![-5]);
    }

    #[test]
    fn test_no_task_is_usage() {
        let (_dir, config) = fixture();
        let outcome = try_run(&config, &Registry::new(), ["demo"]).unwrap();
        let Outcome::Usage(banner) = &outcome else {
            panic!("expected usage, got {outcome:?}");
        };
        assert!(banner.contains("greet  - says hi [ who:string -loud:bool ]"));
    }

    #[test]
    fn test_invokes_registered_task() {
        let (_dir, config) = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut registry = Registry::new();
        registry
            .register_as("greet", move |who: String, loud: Option<bool>| {
                sink.borrow_mut().push((who, loud));
            })
            .unwrap();

        let outcome = try_run(&config, &registry, ["demo", "greet", "Bob", "-loud"]).unwrap();
        assert_eq!(outcome, Outcome::Invoked { task: "greet".to_string() });
        assert_eq!(*seen.borrow(), vec![("Bob".to_string(), Some(true))]);
    }

    #[test]
    fn test_task_help() {
        let (_dir, config) = fixture();
        for flag in ["-h", "-help", "--help"] {
            let outcome = try_run(&config, &Registry::new(), ["demo", "greet", flag]).unwrap();
            assert!(
                matches!(outcome, Outcome::Help(ref help) if help.contains("demo greet [flags] <who:string>")),
                "{flag}: {outcome:?}"
            );
        }
    }

    #[test]
    fn test_source_flag_overrides_config() {
        let (dir, _) = fixture();
        let config = Config::new("does/not/exist.rs").with_color(false);
        let source = dir.path().join("main.rs");
        let argv = vec![
            OsString::from("demo"),
            OsString::from("--source"),
            source.into_os_string(),
            OsString::from("--list"),
        ];
        let outcome = try_run(&config, &Registry::new(), argv).unwrap();
        assert!(matches!(outcome, Outcome::Listed(ref banner) if banner.contains("greet")));
    }

    #[test]
    fn test_missing_source() {
        let config = Config::new("/definitely/not/here.rs");
        let err = try_run(&config, &Registry::new(), ["demo"]).unwrap_err();
        assert!(matches!(err, TaskError::SourceUnreadable { .. }));
    }

    #[test]
    fn test_unknown_task() {
        let (_dir, config) = fixture();
        let err = try_run(&config, &Registry::new(), ["demo", "nope"]).unwrap_err();
        assert_eq!(err.to_string(), "Task not found: nope");
    }
}
