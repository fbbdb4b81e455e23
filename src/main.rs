//! # taskman-demo
//!
//! Demonstration task program: every top-level function below is a task.
//!
//! - `taskman-demo hello Bob -times=2`
//! - `taskman-demo exec "ls -la"`
//! - `taskman-demo replicate echo 3 -format=json -verbose`
//! - `taskman-demo --list`

use std::process::Command;

/// hello says Hello
fn hello(who: String, times: Option<i64>, show: Option<bool>) {
    if !show.unwrap_or(true) {
        return;
    }
    for _ in 0..times.unwrap_or(1) {
        println!("Hello, {who}!");
    }
}

/// exec executes shell cmd
fn exec(cmd: String) -> Result<(), String> {
    let shell = which::which("sh").map_err(|e| format!("no shell found: {e}"))?;
    let output = Command::new(shell)
        .arg("-c")
        .arg(&cmd)
        .output()
        .map_err(|e| format!("failed to start `{cmd}`: {e}"))?;

    print!("{}", String::from_utf8_lossy(&output.stdout));
    eprint!("{}", String::from_utf8_lossy(&output.stderr));
    if output.status.success() {
        Ok(())
    } else {
        Err(format!("`{cmd}` exited with {}", output.status))
    }
}

/// replicate prints a command several times
///
/// Output is one line per repetition, optionally as JSON and capped by `limit`.
fn replicate(
    command: String,
    times: u32,
    format: Option<String>,
    limit: Option<u32>,
    verbose: Option<bool>,
) -> Result<(), String> {
    let count = limit.map_or(times, |l| times.min(l));
    if verbose.unwrap_or(false) {
        eprintln!("replicating {command:?} {count} time(s)");
    }
    match format.as_deref() {
        None | Some("text") => {
            for _ in 0..count {
                println!("{command}");
            }
        }
        Some("json") => {
            let lines: Vec<&str> = (0..count).map(|_| command.as_str()).collect();
            let json = serde_json::to_string(&lines).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        Some(other) => return Err(format!("unknown format `{other}` (expected text or json)")),
    }
    Ok(())
}

fn main() {
    taskman::run!(hello, exec, replicate);
}
