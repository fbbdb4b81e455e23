//! Machine-readable description of the discovered tasks (`--inspect`).

use crate::ast::Task;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON Schema for one task parameter
#[derive(Debug, Serialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub param_type: &'static str,
    /// Passed as `-name=value` rather than positionally
    pub flag: bool,
    /// Zero-based index among the positional arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    pub properties: BTreeMap<String, ParameterSchema>,
    pub required: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskSchema {
    pub name: String,
    pub description: String,
    /// A function was registered for this task
    pub bound: bool,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub tasks: Vec<TaskSchema>,
}

fn task_schema(task: &Task) -> TaskSchema {
    let mut properties = BTreeMap::new();
    let mut required = Vec::new();
    let mut position = 0;

    for param in &task.params {
        let slot = if param.optional {
            None
        } else {
            required.push(param.name.clone());
            position += 1;
            Some(position - 1)
        };
        properties.insert(
            param.name.clone(),
            ParameterSchema {
                param_type: param.param_type.json_type(),
                flag: param.optional,
                position: slot,
            },
        );
    }

    TaskSchema {
        name: task.name.clone(),
        description: task.doc.clone(),
        bound: task.is_bound(),
        input_schema: InputSchema {
            schema_type: "object",
            properties,
            required,
        },
    }
}

#[must_use]
pub fn inspect(tasks: &[Task]) -> InspectOutput {
    InspectOutput {
        tasks: tasks.iter().map(task_schema).collect(),
    }
}

/// Pretty-printed JSON for `--inspect`.
#[must_use]
pub fn render(tasks: &[Task]) -> String {
    serde_json::to_string_pretty(&inspect(tasks)).unwrap_or_default()
}
