// List directory lookup and selection state

use crate::backend::Backend;
use crate::codec;
use crate::models::TaskList;
use crate::selection::Selection;
use crate::store::Store;
use eyre::{Context, Result};
use tracing::info;

/// Key holding the id of the list the widget shows
pub const CURRENT_LIST_KEY: &str = "currentTaskListId";

/// Key holding the task list directory, written by the main application
pub const TASK_LISTS_KEY: &str = "taskLists";

impl<B: Backend> Store<B> {
    pub fn directory(&self) -> ListDirectory<'_, B> {
        ListDirectory { store: self }
    }
}

/// Read access to the list directory plus the selection scalar
pub struct ListDirectory<'a, B: Backend> {
    store: &'a Store<B>,
}

impl<B: Backend> ListDirectory<'_, B> {
    /// All known lists; malformed data reads as no lists
    pub fn lists(&self) -> Result<Vec<TaskList>> {
        let text = self
            .store
            .backend()
            .get(TASK_LISTS_KEY)
            .context("Failed to read task lists")?
            .unwrap_or_default();
        Ok(codec::decode(&text))
    }

    /// Name of the list with this id, `None` when no list matches
    pub fn resolve_list_name(&self, list_id: &str) -> Result<Option<String>> {
        Ok(self.lists()?.into_iter().find(|list| list.id == list_id).map(|list| list.name))
    }

    /// The selected list id; blank values count as no selection
    pub fn current_list_id(&self) -> Result<Option<String>> {
        Ok(self.selection()?.list_id().map(str::to_string))
    }

    pub fn selection(&self) -> Result<Selection> {
        let raw = self
            .store
            .backend()
            .get(CURRENT_LIST_KEY)
            .context("Failed to read current list id")?;
        Ok(Selection::from(raw))
    }

    /// Set the selected list; normally done by the host application
    pub fn select(&self, list_id: &str) -> Result<()> {
        let selection = Selection::list(list_id);
        let backend = self.store.backend();
        let _lock = backend.lock()?;
        match selection.list_id() {
            Some(id) => backend.set(CURRENT_LIST_KEY, id)?,
            None => backend.remove(CURRENT_LIST_KEY)?,
        }
        info!(list_id = %selection, "Selected list");
        Ok(())
    }

    pub fn clear_selection(&self) -> Result<()> {
        self.select("")
    }
}
