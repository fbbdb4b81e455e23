//! End-to-end tests driving the demo binary (usage, --list, --inspect,
//! task invocation and error reporting)

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::*;

#[test]
fn test_no_task_prints_usage_and_fails() {
    let output = run_demo(&[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(stderr.contains("Usage:"), "stderr: {stderr}");
    assert!(stderr.contains("[command] [arguments]"));
    assert!(stderr.contains("hello  - says Hello [ who:string -times:int -show:bool ]"));
    assert!(stderr.contains("exec  - executes shell cmd [ cmd:string ]"));
    assert!(!stderr.contains("main"));
}

#[test]
fn test_list_flag() {
    let output = run_demo(&["--list"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    let hello = stdout.find("hello").expect("hello listed");
    let exec = stdout.find("exec ").expect("exec listed");
    let replicate = stdout.find("replicate").expect("replicate listed");
    assert!(hello < exec && exec < replicate, "tasks out of file order:\n{stdout}");
    assert!(!stdout.contains("not registered"));
}

#[test]
fn test_hello_with_inline_flag() {
    let output = run_demo(&["hello", "Bob", "-times=2"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Hello, Bob!\nHello, Bob!\n");
    assert!(stderr(&output).contains("Task hello: who=\"Bob\", times=2, show=<unset>"));
}

#[test]
fn test_hello_with_separate_flag_value_before_positional() {
    let output = run_demo(&["hello", "-times", "3", "Ann"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).matches("Hello, Ann!").count(), 3);
}

#[test]
fn test_hello_bool_flag_false() {
    let output = run_demo(&["hello", "Bob", "-show=false"]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_task_not_found() {
    let output = run_demo(&["nope"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Task not found: nope"));
}

#[test]
fn test_missing_positional() {
    let output = run_demo(&["hello"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output)
            .contains("Error: Bad command arguments: missing positional argument `who` (string)")
    );
}

#[test]
fn test_unknown_flag() {
    let output = run_demo(&["hello", "Bob", "-nope"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("flag provided but not defined: -nope"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_conversion_error_names_parameter() {
    let output = run_demo(&["replicate", "echo", "abc"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(
        stderr.contains("Cannot convert \"abc\" for parameter `times` to int"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_replicate_multi_type() {
    let output = run_demo(&["replicate", "echo", "3", "-format=json", "-limit=2", "-verbose"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), r#"["echo","echo"]"#);
    let stderr = stderr(&output);
    assert!(stderr.contains(
        "Task replicate: command=\"echo\", times=3, format=\"json\", limit=2, verbose=true"
    ));
    assert!(stderr.contains("replicating \"echo\" 2 time(s)"));
}

#[test]
fn test_out_of_range_value_fails_at_invocation() {
    let output = run_demo(&["replicate", "echo", "--", "-1"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(stderr.contains("Task replicate could not be invoked"), "stderr: {stderr}");
    assert!(stderr.contains("parameter `times`"));
}

#[test]
fn test_task_error_is_reported() {
    let output = run_demo(&["replicate", "echo", "1", "-format=xml"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Task replicate failed: unknown format `xml`"));
}

#[test]
fn test_exec_runs_shell_command() {
    if which::which("sh").is_err() {
        return;
    }
    let output = run_demo(&["exec", "echo from-shell"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "from-shell");
}

#[test]
fn test_task_help() {
    let output = run_demo(&["hello", "-h"]);

    assert!(output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("hello [flags] <who:string>"), "stderr: {stderr}");
    assert!(stderr.contains("-times  int"));
}

#[test]
fn test_inspect_outputs_json() {
    let output = run_demo(&["--inspect"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tasks = json["tasks"].as_array().unwrap();
    let names: Vec<&str> = tasks.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["hello", "exec", "replicate"]);
    assert_eq!(tasks[0]["description"], "says Hello");
    assert_eq!(tasks[0]["bound"], true);
    assert_eq!(tasks[0]["inputSchema"]["required"], serde_json::json!(["who"]));
    assert_eq!(tasks[0]["inputSchema"]["properties"]["times"]["type"], "integer");
    assert_eq!(tasks[0]["inputSchema"]["properties"]["times"]["flag"], true);
}

#[test]
fn test_source_env_override() {
    let temp_dir = create_temp_dir();
    let source = create_source(
        temp_dir.path(),
        r"
/// hello greets
fn hello(who: String) {}

/// ghost is declared but never registered
fn ghost() {}
",
    );

    let output = test_command()
        .arg("--list")
        .env("TASKMAN_SOURCE", &source)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("ghost  - is declared but never registered [  ] (not registered)"));
    assert!(!stdout.contains("replicate"));

    let output = test_command()
        .arg("ghost")
        .env("TASKMAN_SOURCE", &source)
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output)
            .contains("Error: Task ghost is declared but no function was registered for it")
    );
}

#[test]
fn test_source_flag_with_parse_error() {
    let temp_dir = create_temp_dir();
    let source = create_source(temp_dir.path(), "fn broken(who: String) {\n    let x = 1;\n");

    let output = test_command()
        .arg("--source")
        .arg(&source)
        .arg("--list")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(stderr.contains("Parse error in source file"), "stderr: {stderr}");
    assert!(stderr.contains("tasks.rs"));
}

#[test]
fn test_missing_source_file() {
    let output = test_command()
        .args(["--source", "/no/such/dir/tasks.rs", "--list"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read source file /no/such/dir/tasks.rs"));
}

#[test]
fn test_foreign_current_dir_does_not_shadow_source() {
    let temp_dir = create_temp_dir();
    std::fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    std::fs::write(
        temp_dir.path().join("src/main.rs"),
        "/// evil is not part of the demo\nfn evil(x: String) {}\n",
    )
    .unwrap();

    let output = test_command()
        .arg("--list")
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    for task in ["hello", "exec", "replicate"] {
        assert!(stdout.contains(task), "{task} missing:\n{stdout}");
    }
    assert!(!stdout.contains("evil"));
}

#[test]
fn test_negative_positional_after_double_dash() {
    let output = run_demo(&["hello", "-times=1", "--", "-Bob"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "Hello, -Bob!\n");
}
