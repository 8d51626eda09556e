//! In-memory task bookkeeping with soft deletes

use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityOutcome, ErrorKind};

pub type TaskId = u64;

/// A scheduled task. Date and time are kept as the user phrased them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub deleted: bool,
}

impl Task {
    pub fn status(&self) -> &'static str {
        if self.deleted { "deleted" } else { "scheduled" }
    }
}

/// Ordered task list. Records are never removed, only flagged deleted.
///
/// Description lookups scan active tasks in insertion order and act on the
/// first exact match, so two active tasks sharing a description can only be
/// told apart through their ids.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(
        &mut self,
        description: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> CapabilityOutcome {
        let id = self.insert(description.into(), date.into(), time.into());
        tracing::debug!(task_id = id, "Task added");
        CapabilityOutcome::ok("Task added successfully.")
    }

    /// Append a task and hand back its id
    pub fn insert(&mut self, description: String, date: String, time: String) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            description,
            date,
            time,
            deleted: false,
        });
        id
    }

    pub fn delete(&mut self, description: &str) -> CapabilityOutcome {
        match self.first_active_mut(description) {
            Some(task) => {
                task.deleted = true;
                CapabilityOutcome::ok(format!("Task '{description}' deleted successfully."))
            }
            None => not_found(description),
        }
    }

    pub fn update(
        &mut self,
        description: &str,
        new_description: &str,
        new_date: &str,
        new_time: &str,
    ) -> CapabilityOutcome {
        match self.first_active_mut(description) {
            Some(task) => {
                task.description = new_description.to_string();
                task.date = new_date.to_string();
                task.time = new_time.to_string();
                CapabilityOutcome::ok(format!(
                    "Task '{description}' updated successfully to '{new_description}' scheduled for {new_date} at {new_time}."
                ))
            }
            None => not_found(description),
        }
    }

    pub fn list_active(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| !t.deleted).cloned().collect()
    }

    /// Every task ever added, soft-deleted ones included
    pub fn list_all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.deleted).count()
    }

    pub fn summary(&self) -> String {
        let lines: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| !t.deleted)
            .map(|t| format!("- {} on {} at {}", t.description, t.date, t.time))
            .collect();

        if lines.is_empty() {
            "No active tasks.".to_string()
        } else {
            lines.join("\n")
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn delete_by_id(&mut self, id: TaskId) -> CapabilityOutcome {
        match self.tasks.iter_mut().find(|t| t.id == id && !t.deleted) {
            Some(task) => {
                task.deleted = true;
                CapabilityOutcome::ok(format!(
                    "Task '{}' deleted successfully.",
                    task.description
                ))
            }
            None => CapabilityOutcome::failed(
                ErrorKind::NotFound,
                format!("Task #{id} not found."),
            ),
        }
    }

    pub fn update_by_id(
        &mut self,
        id: TaskId,
        new_description: &str,
        new_date: &str,
        new_time: &str,
    ) -> CapabilityOutcome {
        match self.tasks.iter_mut().find(|t| t.id == id && !t.deleted) {
            Some(task) => {
                let old = std::mem::replace(&mut task.description, new_description.to_string());
                task.date = new_date.to_string();
                task.time = new_time.to_string();
                CapabilityOutcome::ok(format!(
                    "Task '{old}' updated successfully to '{new_description}' scheduled for {new_date} at {new_time}."
                ))
            }
            None => CapabilityOutcome::failed(
                ErrorKind::NotFound,
                format!("Task #{id} not found."),
            ),
        }
    }

    fn first_active_mut(&mut self, description: &str) -> Option<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| !t.deleted && t.description == description)
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(description: &str) -> CapabilityOutcome {
    CapabilityOutcome::failed(ErrorKind::NotFound, format!("Task '{description}' not found."))
}
