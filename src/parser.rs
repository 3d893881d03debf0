use thiserror::Error;

use crate::ir::{TaskGraph, TaskId};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid task graph: {0}")]
    Syntax(#[from] json5::Error),
    #[error("task {id} has a negative or non-finite duration")]
    InvalidDuration { id: TaskId },
}

/// Reads a task graph from JSON5 (plain JSON also works):
///
/// ```json5
/// {
///   tasks: [{ id: 1, name: "Dig", duration: 2, start: "Mon", end: "Tue" }],
///   dependencies: [{ predecessor: 1, successor: 2 }],
/// }
/// ```
///
/// Unknown ids and duplicate edges are not errors here; the graph model skips
/// them with a warning.
pub fn parse_task_graph(input: &str) -> Result<TaskGraph, ParseError> {
    let graph: TaskGraph = json5::from_str(input)?;
    if let Some(task) = graph
        .tasks
        .iter()
        .find(|task| !task.duration.is_finite() || task.duration < 0.0)
    {
        return Err(ParseError::InvalidDuration { id: task.id });
    }
    Ok(graph)
}
