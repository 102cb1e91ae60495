//! Lookup table from `(task-token, operation-token)` to an operation.

use std::collections::HashSet;

use strsim::levenshtein;
use thiserror::Error;
use tracing::{debug, warn};

use super::dispatch::DispatchConfig;
use crate::naming::to_token;
use crate::task::{Operation, TaskType};

/// Largest edit distance still offered as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("Task '{task}' declares operation '{operation}' more than once")]
    DuplicateOperation { task: String, operation: String },
}

/// One indexed operation.
#[derive(Debug, Clone)]
pub struct IndexEntry<'r> {
    pub task: &'r TaskType,
    pub operation: &'r Operation,
    pub task_token: String,
    pub operation_token: String,
    /// Also addressable without an operation token.
    pub is_default: bool,
}

impl IndexEntry<'_> {
    /// Same `(task, operation)` identity.
    pub fn same_as(&self, other: &IndexEntry<'_>) -> bool {
        self.task_token == other.task_token && self.operation_token == other.operation_token
    }
}

/// Operations of every task type, in registration order.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex<'r> {
    entries: Vec<IndexEntry<'r>>,
}

impl<'r> TaskIndex<'r> {
    /// Index the own, non-ignored operations of `types`.
    pub fn build(types: &'r [TaskType], config: &DispatchConfig) -> Result<Self, IndexError> {
        let default_token = config
            .default_operation
            .as_deref()
            .map(to_token)
            .filter(|token| !token.is_empty());
        let ignored: HashSet<String> = config
            .ignored_operations
            .iter()
            .map(|name| to_token(name))
            .collect();

        let mut entries = Vec::new();
        let mut task_tokens = HashSet::new();

        for task in types {
            let task_token = task.token();
            if !task_tokens.insert(task_token.clone()) {
                warn!(
                    task = task.name(),
                    token = %task_token,
                    "task token already registered, skipping"
                );
                continue;
            }

            let mut operation_tokens = HashSet::new();
            for operation in task.operations() {
                if operation.is_inherited() {
                    continue;
                }
                let operation_token = operation.token();
                if ignored.contains(&operation_token) {
                    continue;
                }
                if !operation_tokens.insert(operation_token.clone()) {
                    return Err(IndexError::DuplicateOperation {
                        task: task.name().to_string(),
                        operation: operation_token,
                    });
                }
                let is_default = default_token.as_deref() == Some(operation_token.as_str());
                entries.push(IndexEntry {
                    task,
                    operation,
                    task_token: task_token.clone(),
                    operation_token,
                    is_default,
                });
            }
        }

        debug!(
            tasks = task_tokens.len(),
            operations = entries.len(),
            "task index built"
        );
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[IndexEntry<'r>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact operation match; an empty `operation_token` selects the default.
    pub fn lookup(&self, task_token: &str, operation_token: &str) -> Option<&IndexEntry<'r>> {
        self.entries.iter().find(|entry| {
            entry.task_token == task_token
                && if operation_token.is_empty() {
                    entry.is_default
                } else {
                    entry.operation_token == operation_token
                }
        })
    }

    /// Entries of one task type.
    pub fn operations_of<'a>(
        &'a self,
        task_token: &'a str,
    ) -> impl Iterator<Item = &'a IndexEntry<'r>> {
        self.entries
            .iter()
            .filter(move |entry| entry.task_token == task_token)
    }

    /// Other operations of the same task type.
    pub fn siblings<'a>(
        &'a self,
        entry: &'a IndexEntry<'r>,
    ) -> impl Iterator<Item = &'a IndexEntry<'r>> {
        self.operations_of(&entry.task_token)
            .filter(move |other| !other.same_as(entry))
    }

    /// Closest known invocation for an unresolved selector.
    pub fn suggest(&self, task_token: &str, operation_token: Option<&str>) -> Option<String> {
        let known_task = self.entries.iter().any(|e| e.task_token == task_token);
        if known_task {
            let operation_token = operation_token?;
            return closest(
                operation_token,
                self.operations_of(task_token).map(|e| e.operation_token.as_str()),
            )
            .map(|op| format!("{} {}", task_token, op));
        }
        closest(task_token, self.entries.iter().map(|e| e.task_token.as_str())).map(str::to_string)
    }
}

fn closest<'a>(input: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let input = input.to_lowercase();
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let distance = levenshtein(&input, candidate);
        if distance > MAX_SUGGESTION_DISTANCE {
            continue;
        }
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}
