//! Task lookup, argument resolution and invocation.

use crate::ast::Task;
use crate::error::TaskError;
use crate::registry::CallError;
use crate::resolver;

/// Find a task by exact name.
///
/// # Errors
///
/// Returns `TaskError::TaskNotFound` if no discovered task has that name.
pub fn find_task<'a>(tasks: &'a mut [Task], name: &str) -> Result<&'a mut Task, TaskError> {
    tasks
        .iter_mut()
        .find(|t| t.name == name)
        .ok_or_else(|| TaskError::TaskNotFound {
            name: name.to_string(),
        })
}

/// One-line summary of the call about to be made, e.g.
/// `Task hello: who="Bob", times=3, show=<unset>`.
#[must_use]
pub fn announcement(task: &Task) -> String {
    let values: Vec<String> = task
        .params
        .iter()
        .map(|p| match &p.value {
            Some(value) => format!("{}={value}", p.name),
            None => format!("{}=<unset>", p.name),
        })
        .collect();
    if values.is_empty() {
        format!("Task {}", task.name)
    } else {
        format!("Task {}: {}", task.name, values.join(", "))
    }
}

/// Call the task's bound function with its resolved values in declaration order.
///
/// # Errors
///
/// Returns `TaskError::Binding` if no function was registered for the task,
/// `TaskError::Invocation` if the values do not fit the function's signature,
/// and `TaskError::TaskFailed` if the function itself returned an error.
pub fn invoke(task: &Task) -> Result<(), TaskError> {
    let Some(bound) = &task.bound else {
        return Err(TaskError::Binding {
            task: task.name.clone(),
        });
    };

    tracing::info!(task = %task.name, "invoking task");
    bound(&task.values()).map_err(|e| match e {
        CallError::Arity { expected, got } => TaskError::Invocation {
            task: task.name.clone(),
            reason: format!(
                "function takes {expected} argument(s) but {got} parameter(s) were declared"
            ),
        },
        CallError::Argument { position, reason } => {
            let param = task
                .params
                .get(position)
                .map_or_else(|| format!("#{position}"), |p| p.name.clone());
            TaskError::Invocation {
                task: task.name.clone(),
                reason: format!("parameter `{param}`: {reason}"),
            }
        }
        CallError::Failed(message) => TaskError::TaskFailed {
            task: task.name.clone(),
            message,
        },
    })
}

/// Look up `name`, resolve `args` against it, announce and invoke it.
///
/// # Errors
///
/// Propagates lookup, resolution and invocation failures. Nothing is
/// invoked unless resolution fully succeeds.
pub fn dispatch(tasks: &mut [Task], name: &str, args: &[String]) -> Result<(), TaskError> {
    let task = find_task(tasks, name)?;
    resolver::resolve(task, args)?;
    eprintln!("{}", announcement(task));
    invoke(task)
}
