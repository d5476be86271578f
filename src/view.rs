// Render model for the widget surface

use crate::backend::Backend;
use crate::models::Task;
use crate::router::Action;
use crate::store::Store;
use colored::Colorize;
use eyre::Result;
use serde::Serialize;

/// Title shown when no list name can be resolved
pub const FALLBACK_TITLE: &str = "Task List";

/// Line shown when the selected list has no tasks
pub const EMPTY_MESSAGE: &str = "No tasks yet";

/// One task row with its two affordances
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    pub task_id: String,
    pub text: String,
    pub completed: bool,
    #[serde(skip)]
    pub toggle: Action,
    #[serde(skip)]
    pub delete: Action,
}

impl ItemView {
    fn from_task(task: Task) -> Self {
        Self {
            toggle: Action::Toggle {
                task_id: task.id.clone(),
            },
            delete: Action::Delete {
                task_id: task.id.clone(),
            },
            task_id: task.id,
            text: task.text,
            completed: task.completed,
        }
    }
}

/// Everything a renderer needs to draw the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetView {
    pub title: String,
    pub items: Vec<ItemView>,
}

impl WidgetView {
    /// Plain-text rendering, completed tasks dimmed and struck through
    pub fn render_text(&self) -> String {
        let mut out = format!("{}\n", self.title.bold());
        if self.items.is_empty() {
            out.push_str(&format!("  {}\n", EMPTY_MESSAGE.italic()));
            return out;
        }
        for item in &self.items {
            let line = if item.completed {
                format!("  [x] {}", item.text.dimmed().strikethrough())
            } else {
                format!("  [ ] {}", item.text)
            };
            out.push_str(&format!("{}  {}\n", line, item.task_id.dimmed()));
        }
        out
    }
}

/// Build the view from a fresh scoped read of the persisted selection
pub fn build_view<B: Backend>(store: &Store<B>, fallback_title: &str) -> Result<WidgetView> {
    let directory = store.directory();
    let selection = directory.selection()?;

    let title = match selection.list_id() {
        Some(list_id) => directory.resolve_list_name(list_id)?,
        None => None,
    }
    .filter(|name| !name.is_empty())
    .unwrap_or_else(|| fallback_title.to_string());

    let items = store.tasks(selection).load()?.into_iter().map(ItemView::from_task).collect();
    Ok(WidgetView { title, items })
}
