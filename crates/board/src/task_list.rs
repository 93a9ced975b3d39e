//! Local task lists and the edits a user can make to them.
//!
//! A [`TaskList`] is one kanban column persisted as one file. Its identity is
//! its storage path, which lives outside this type; the `order` field decides
//! its display position among its siblings.

use serde::{Deserialize, Serialize};

use crate::{Progress, TaskListError};

/// Title given to tasks created without one.
pub const DEFAULT_TASK_TITLE: &str = "New Task";

/// A sub-item of a task that can be checked off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletPoint {
    pub description: String,
    #[serde(default)]
    pub done: bool,
}

/// A named pointer to a file or object related to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub path: String,
}

/// A single work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub bullet_points: Vec<BulletPoint>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl Default for Task {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_TITLE)
    }
}

impl Task {
    /// Creates an unstarted task with an empty description.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            progress: Progress::NOT_STARTED,
            bullet_points: Vec::new(),
            references: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_done(&self) -> bool {
        self.progress.is_done()
    }

    pub fn mark_done(&mut self) {
        self.progress = Progress::DONE;
    }

    pub fn mark_not_done(&mut self) {
        self.progress = Progress::NOT_STARTED;
    }

    /// Sets tracked progress. `None` switches progress tracking off.
    pub fn set_progress(&mut self, value: Option<f32>) -> Result<(), TaskListError> {
        self.progress = match value {
            None => Progress::Untracked,
            Some(v) => Progress::tracked(v).ok_or(TaskListError::InvalidProgress { value: v })?,
        };
        Ok(())
    }

    pub fn add_bullet_point(&mut self, description: impl Into<String>) {
        self.bullet_points.push(BulletPoint {
            description: description.into(),
            done: false,
        });
    }

    /// Flips the `done` flag of one bullet point and returns its new value.
    pub fn toggle_bullet_point(&mut self, index: usize) -> Result<bool, TaskListError> {
        let len = self.bullet_points.len();
        let bullet = self
            .bullet_points
            .get_mut(index)
            .ok_or(TaskListError::BulletOutOfRange { index, len })?;
        bullet.done = !bullet.done;
        Ok(bullet.done)
    }

    pub fn add_reference(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.references.push(Reference {
            name: name.into(),
            path: path.into(),
        });
    }
}

/// A named, ordered collection of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    pub title: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Fields of a task list that an import may overwrite. Absent fields keep
/// their current value.
#[derive(Debug, Deserialize)]
struct TaskListPatch {
    title: Option<String>,
    order: Option<i32>,
    tasks: Option<Vec<Task>>,
}

impl TaskList {
    pub fn new(title: impl Into<String>, order: i32) -> Self {
        Self {
            title: title.into(),
            order,
            tasks: Vec::new(),
        }
    }

    /// Overall completion in `[0.0, 1.0]`.
    ///
    /// The mean of the tracked tasks' progress. A list without tracked tasks
    /// counts as complete.
    pub fn progress(&self) -> f32 {
        let tracked: Vec<f32> = self
            .tasks
            .iter()
            .filter_map(|t| t.progress.fraction())
            .collect();
        if tracked.is_empty() {
            return 1.0;
        }
        (tracked.iter().sum::<f32>() / tracked.len() as f32).clamp(0.0, 1.0)
    }

    /// Appends a task and returns its index.
    pub fn add_task(&mut self, task: Task) -> usize {
        self.tasks.push(task);
        self.tasks.len() - 1
    }

    pub fn task(&self, index: usize) -> Result<&Task, TaskListError> {
        let len = self.tasks.len();
        self.tasks
            .get(index)
            .ok_or(TaskListError::TaskOutOfRange { index, len })
    }

    pub fn task_mut(&mut self, index: usize) -> Result<&mut Task, TaskListError> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or(TaskListError::TaskOutOfRange { index, len })
    }

    pub fn remove_task(&mut self, index: usize) -> Result<Task, TaskListError> {
        self.task(index)?;
        Ok(self.tasks.remove(index))
    }

    /// Inserts a copy of a task directly after it and returns the copy's index.
    pub fn duplicate_task(&mut self, index: usize) -> Result<usize, TaskListError> {
        let copy = self.task(index)?.clone();
        self.tasks.insert(index + 1, copy);
        Ok(index + 1)
    }

    /// Moves a task to the end of another list.
    pub fn move_task(&mut self, index: usize, target: &mut TaskList) -> Result<(), TaskListError> {
        let task = self.remove_task(index)?;
        target.tasks.push(task);
        Ok(())
    }

    /// Sorts tasks by progress, most complete first. Untracked tasks go last;
    /// ties keep their relative order.
    pub fn sort_by_progress(&mut self) {
        self.tasks.sort_by(|a, b| {
            let a = a.progress.fraction().unwrap_or(f32::NEG_INFINITY);
            let b = b.progress.fraction().unwrap_or(f32::NEG_INFINITY);
            b.total_cmp(&a)
        });
    }

    /// Serialises the list for sharing (e.g. via the clipboard).
    pub fn export_json(&self) -> Result<String, TaskListError> {
        serde_json::to_string_pretty(self).map_err(|e| TaskListError::Import {
            message: e.to_string(),
        })
    }

    /// Overwrites this list with the fields present in `json`.
    pub fn import_json(&mut self, json: &str) -> Result<(), TaskListError> {
        let patch: TaskListPatch = serde_json::from_str(json).map_err(|e| TaskListError::Import {
            message: e.to_string(),
        })?;
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(tasks) = patch.tasks {
            self.tasks = tasks;
        }
        Ok(())
    }
}
