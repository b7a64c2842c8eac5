//! Consistency checks for a conversation asset.

use crate::graph::{Action, ConversationGraph, GIVE_NODE, KILL_NODE, KILLED_NODE, START_NODE};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub node: Option<String>,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.node {
            Some(node) => write!(f, "{level}: [{node}] {}", self.message),
            None => write!(f, "{level}: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub issues: Vec<Issue>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    fn push(&mut self, severity: Severity, node: Option<&str>, message: impl Into<String>) {
        self.issues.push(Issue {
            severity,
            node: node.map(str::to_string),
            message: message.into(),
        });
    }
}

pub fn validate(graph: &ConversationGraph) -> Report {
    let mut report = Report::default();

    for required in [START_NODE, KILLED_NODE] {
        if !graph.contains(required) {
            report.push(Severity::Error, None, format!("missing required node `{required}`"));
        }
    }

    for (id, node) in graph.iter() {
        if node.choices.is_some() && node.entry_mode.is_some() {
            report.push(Severity::Warning, Some(id), "has both choices and entry mode, choices are never shown");
        }
        if node.choices.is_none() && node.entry_mode.is_none() && id != KILLED_NODE {
            report.push(Severity::Warning, Some(id), "dead end, no choices and no entry mode");
        }

        for choice in node.choices.iter().flatten() {
            if choice.action.is_none() && choice.next_node_id.is_none() {
                report.push(
                    Severity::Warning,
                    Some(id),
                    format!("choice {:?} has neither action nor target", choice.text),
                );
            }
            if choice.action.is_some() && choice.next_node_id.is_some() {
                report.push(
                    Severity::Warning,
                    Some(id),
                    format!("choice {:?} has an action, its target is ignored", choice.text),
                );
            }
            if choice.action == Some(Action::IncreaseSpare) && !graph.contains(GIVE_NODE) {
                report.push(Severity::Error, Some(id), format!("`increase_spare` needs a `{GIVE_NODE}` node"));
            }
        }

        for edge in node.edges() {
            if edge.target.is_empty() {
                report.push(Severity::Error, Some(id), format!("{edge}: empty target"));
            } else if !graph.contains(&edge.target) {
                report.push(Severity::Error, Some(id), format!("{edge}: unknown node"));
            }
        }
    }

    // `check_*` targets are covered by the edge scan; killed is entered through the flag.
    let reachable = reachable_from(graph, START_NODE);
    for (id, _) in graph.iter() {
        if !reachable.contains(id) && ![KILLED_NODE, GIVE_NODE, KILL_NODE].contains(&id) {
            report.push(Severity::Warning, Some(id), "unreachable from `start`");
        }
    }

    report
}

fn reachable_from<'a>(graph: &'a ConversationGraph, root: &'a str) -> BTreeSet<&'a str> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::new();

    if graph.contains(root) {
        seen.insert(root);
        queue.push_back(root);
    }

    while let Some(id) = queue.pop_front() {
        let Some(node) = graph.get(id) else { continue };
        for edge in node.edges() {
            if let Some((target, _)) = graph.nodes.get_key_value(edge.target.as_str()) {
                if seen.insert(target.as_str()) {
                    queue.push_back(target.as_str());
                }
            }
        }
    }

    seen
}
