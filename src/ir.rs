use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a task, unique within one task graph and stable across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaskId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Normal,
    Super,
    Milestone,
}

impl NodeKind {
    /// Milestones win over summary tasks, matching how the task provider flags them.
    pub fn classify(is_milestone: bool, has_children: bool) -> Self {
        if is_milestone {
            Self::Milestone
        } else if has_children {
            Self::Super
        } else {
            Self::Normal
        }
    }
}

/// One task as handed over by the task-graph provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub is_milestone: bool,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub is_critical: bool,
}

impl TaskRecord {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: TaskId(id),
            name: name.into(),
            duration: 0.0,
            start: String::new(),
            end: String::new(),
            is_milestone: false,
            has_children: false,
            is_critical: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::classify(self.is_milestone, self.has_children)
    }
}

/// A "predecessor finishes before successor" dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub predecessor: TaskId,
    pub successor: TaskId,
}

impl Dependency {
    pub fn new(predecessor: u32, successor: u32) -> Self {
        Self {
            predecessor: TaskId(predecessor),
            successor: TaskId(successor),
        }
    }
}

/// Narrow interface to whatever owns the tasks (scheduler, project model, file).
pub trait TaskGraphProvider {
    /// Tasks in display order. The order drives root placement and tie breaking.
    fn tasks(&self) -> Vec<TaskRecord>;
    fn dependencies(&self) -> Vec<Dependency>;
}

/// Plain task graph, the provider used by the CLI and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskGraph {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&mut self, task: TaskRecord) -> &mut Self {
        self.tasks.push(task);
        self
    }

    pub fn add_dependency(&mut self, predecessor: u32, successor: u32) -> &mut Self {
        self.dependencies.push(Dependency::new(predecessor, successor));
        self
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut TaskRecord> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }
}

impl TaskGraphProvider for TaskGraph {
    fn tasks(&self) -> Vec<TaskRecord> {
        self.tasks.clone()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies.clone()
    }
}
