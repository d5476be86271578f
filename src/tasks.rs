// Task operations scoped to the selected list

use crate::backend::Backend;
use crate::models::Task;
use crate::selection::Selection;
use crate::store::{Edit, Store};
use eyre::Result;
use tracing::{debug, info};

/// Result of a scoped task operation
///
/// Everything other than `Applied` is a no-op that wrote nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Applied(T),
    /// No task with that id in the selected list
    NotFound,
    /// No list is selected
    NoSelection,
    /// Task text was empty after trimming
    EmptyText,
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            _ => None,
        }
    }
}

impl<B: Backend> Store<B> {
    /// Task operations scoped to `selection`
    pub fn tasks(&self, selection: Selection) -> ScopedTasks<'_, B> {
        ScopedTasks { store: self, selection }
    }
}

/// Handle for reading and mutating the tasks of one selected list
pub struct ScopedTasks<'a, B: Backend> {
    store: &'a Store<B>,
    selection: Selection,
}

impl<B: Backend> ScopedTasks<'_, B> {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Tasks of the selected list, in stored order; empty without a selection
    pub fn load(&self) -> Result<Vec<Task>> {
        self.store.load_partition(&self.selection)
    }

    /// Replace the selected list with `tasks`
    ///
    /// `tasks` must be the complete desired state of the list: tasks of this list
    /// that are not passed are deleted. Other lists are never touched.
    pub fn save(&self, tasks: &[Task]) -> Result<Outcome<()>> {
        let Some(list_id) = self.selection.list_id() else {
            return Ok(Outcome::NoSelection);
        };
        self.store.replace_partition(list_id, tasks)?;
        Ok(Outcome::Applied(()))
    }

    /// Flip `completed` on the task with this id, if it is in the selected list
    pub fn toggle_completion(&self, task_id: &str) -> Result<Outcome<Task>> {
        self.edit(|tasks| match tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.completed = !task.completed;
                info!(task_id, completed = task.completed, "Toggled task");
                Edit::Commit(Outcome::Applied(task.clone()))
            }
            None => Edit::Skip(Outcome::NotFound),
        })
    }

    /// Remove every task with this id from the selected list
    ///
    /// Returns the first removed task. Deleting a missing id is a no-op, so
    /// repeated deletes are safe.
    pub fn delete_task(&self, task_id: &str) -> Result<Outcome<Task>> {
        self.edit(|tasks| {
            let Some(removed) = tasks.iter().find(|t| t.id == task_id).cloned() else {
                return Edit::Skip(Outcome::NotFound);
            };
            tasks.retain(|t| t.id != task_id);
            info!(task_id, "Deleted task");
            Edit::Commit(Outcome::Applied(removed))
        })
    }

    /// Append a new task to the end of the selected list
    pub fn add_task(&self, text: &str) -> Result<Outcome<Task>> {
        self.add_task_with_order(text, None)
    }

    /// Append a new task, with an explicit order hint instead of the list length
    pub fn add_task_with_order(&self, text: &str, order: Option<i64>) -> Result<Outcome<Task>> {
        let Some(list_id) = self.selection.list_id() else {
            debug!("Add rejected: no list selected");
            return Ok(Outcome::NoSelection);
        };
        let text = text.trim();
        if text.is_empty() {
            debug!("Add rejected: empty text");
            return Ok(Outcome::EmptyText);
        }

        self.store.modify_partition(list_id, |tasks: &mut Vec<Task>| {
            let order = order.unwrap_or(tasks.len() as i64);
            let task = Task::new(list_id, text, order);
            info!(task_id = %task.id, list_id, order, "Added task");
            tasks.push(task.clone());
            Edit::Commit(Outcome::Applied(task))
        })
    }

    /// Replace the text of a task in the selected list
    pub fn edit_text(&self, task_id: &str, text: &str) -> Result<Outcome<Task>> {
        let text = text.trim();
        if self.selection.is_selected() && text.is_empty() {
            return Ok(Outcome::EmptyText);
        }

        self.edit(|tasks| match tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) if task.text == text => Edit::Skip(Outcome::Applied(task.clone())),
            Some(task) => {
                task.text = text.to_string();
                info!(task_id, "Edited task text");
                Edit::Commit(Outcome::Applied(task.clone()))
            }
            None => Edit::Skip(Outcome::NotFound),
        })
    }

    /// Mark every task in the selected list completed (or not)
    ///
    /// Returns how many tasks changed; nothing is written when none did.
    pub fn set_all_completed(&self, completed: bool) -> Result<Outcome<usize>> {
        self.edit(|tasks| {
            let changed = tasks.iter_mut().filter(|t| t.completed != completed).fold(0usize, |n, t| {
                t.completed = completed;
                n + 1
            });
            if changed == 0 {
                return Edit::Skip(Outcome::Applied(0));
            }
            info!(changed, completed, "Set completion on all tasks");
            Edit::Commit(Outcome::Applied(changed))
        })
    }

    fn edit<R>(&self, f: impl FnOnce(&mut Vec<Task>) -> Edit<Outcome<R>>) -> Result<Outcome<R>> {
        match self.selection.list_id() {
            Some(list_id) => self.store.modify_partition(list_id, f),
            None => Ok(Outcome::NoSelection),
        }
    }
}
