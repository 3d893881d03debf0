use std::collections::HashMap;

use tracing::{debug, warn};

use crate::ir::{NodeKind, TaskGraphProvider, TaskId, TaskRecord};

/// Immutable snapshot of one task as seen by the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: TaskId,
    pub name: String,
    pub duration: f64,
    pub start: String,
    pub end: String,
    pub kind: NodeKind,
    pub critical: bool,
    /// Successor ids in dependency order, without duplicates.
    pub successors: Vec<TaskId>,
}

impl Node {
    fn from_record(record: TaskRecord) -> Self {
        let kind = record.kind();
        Self {
            id: record.id,
            name: record.name,
            duration: record.duration,
            start: record.start,
            end: record.end,
            kind,
            critical: record.is_critical,
            successors: Vec::new(),
        }
    }

    fn copy_attributes(&mut self, other: &Node) {
        self.name = other.name.clone();
        self.duration = other.duration;
        self.start = other.start.clone();
        self.end = other.end.clone();
        self.kind = other.kind;
        self.critical = other.critical;
    }
}

/// Id-indexed arena of nodes plus successor and predecessor adjacency.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    index: HashMap<TaskId, usize>,
    predecessors: Vec<Vec<TaskId>>,
}

impl GraphModel {
    pub fn from_provider<P: TaskGraphProvider + ?Sized>(provider: &P) -> Self {
        let mut model = GraphModel::default();
        for record in provider.tasks() {
            if model.index.contains_key(&record.id) {
                warn!(task = %record.id, "duplicate task id, keeping the first occurrence");
                continue;
            }
            model.index.insert(record.id, model.nodes.len());
            model.nodes.push(Node::from_record(record));
            model.predecessors.push(Vec::new());
        }

        let mut skipped = 0usize;
        for dep in provider.dependencies() {
            let (Some(&from), Some(&to)) = (
                model.index.get(&dep.predecessor),
                model.index.get(&dep.successor),
            ) else {
                warn!(
                    predecessor = %dep.predecessor,
                    successor = %dep.successor,
                    "dependency references an unknown task, skipping"
                );
                skipped += 1;
                continue;
            };
            if from == to {
                warn!(task = %dep.predecessor, "self dependency, skipping");
                skipped += 1;
                continue;
            }
            if model.nodes[from].successors.contains(&dep.successor) {
                continue;
            }
            model.nodes[from].successors.push(dep.successor);
            model.predecessors[to].push(dep.predecessor);
        }

        // Predecessors are kept in model order so repair passes scan them
        // deterministically regardless of dependency order.
        let index = &model.index;
        for preds in &mut model.predecessors {
            preds.sort_by_key(|id| index.get(id).copied().unwrap_or(usize::MAX));
        }

        debug!(
            nodes = model.nodes.len(),
            edges = model.edge_count(),
            skipped,
            "graph model built"
        );
        model
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: TaskId) -> Option<&Node> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn successors(&self, id: TaskId) -> &[TaskId] {
        self.node(id)
            .map(|node| node.successors.as_slice())
            .unwrap_or(&[])
    }

    pub fn predecessors(&self, id: TaskId) -> &[TaskId] {
        self.index
            .get(&id)
            .map(|&idx| self.predecessors[idx].as_slice())
            .unwrap_or(&[])
    }

    pub fn is_root(&self, id: TaskId) -> bool {
        self.contains(id) && self.predecessors(id).is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.predecessors[*idx].is_empty())
            .map(|(_, node)| node)
    }

    /// Every edge as `(predecessor, successor)`, grouped by predecessor in model order.
    pub fn edges(&self) -> impl Iterator<Item = (TaskId, TaskId)> + '_ {
        self.nodes
            .iter()
            .flat_map(|node| node.successors.iter().map(move |succ| (node.id, *succ)))
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.successors.len()).sum()
    }

    /// Replaces name, dates, duration, kind and critical flag of nodes that exist in
    /// both models. Topology and the node set stay as they are. Returns how many
    /// nodes were updated.
    pub fn refresh_attributes(&mut self, fresh: &GraphModel) -> usize {
        let mut updated = 0;
        for node in &mut self.nodes {
            if let Some(other) = fresh.node(node.id) {
                node.copy_attributes(other);
                updated += 1;
            }
        }
        updated
    }
}
