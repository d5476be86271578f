// Action router: external triggers to store operations

use crate::backend::Backend;
use crate::store::Store;
use crate::tasks::Outcome;
use eyre::Result;
use serde::Deserialize;
use tracing::debug;

pub const ACTION_TOGGLE_TASK: &str = "com.taskapp.TOGGLE_TASK";
pub const ACTION_DELETE_TASK: &str = "com.taskapp.DELETE_TASK";
pub const ACTION_ADD_TASK: &str = "com.taskapp.ADD_TASK";
pub const ACTION_REFRESH: &str = "com.taskapp.REFRESH";
pub const ACTION_OPEN_APP: &str = "com.taskapp.OPEN_APP";

/// Raw trigger as delivered by the host: an action name plus optional payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Intent {
    pub action: Option<String>,
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
    #[serde(rename = "taskText")]
    pub task_text: Option<String>,
}

/// A decoded trigger; task ids are carried verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Toggle { task_id: String },
    Delete { task_id: String },
    Add { text: String },
    Refresh,
    OpenHost,
}

impl Action {
    /// Decode an intent; unknown actions and missing task ids yield `None`
    pub fn from_intent(intent: &Intent) -> Option<Self> {
        let task_id = intent.task_id.as_deref().filter(|id| !id.is_empty()).map(str::to_string);

        match intent.action.as_deref()? {
            ACTION_TOGGLE_TASK => task_id.map(|task_id| Action::Toggle { task_id }),
            ACTION_DELETE_TASK => task_id.map(|task_id| Action::Delete { task_id }),
            ACTION_ADD_TASK => Some(Action::Add {
                text: intent.task_text.clone().unwrap_or_default(),
            }),
            ACTION_REFRESH => Some(Action::Refresh),
            ACTION_OPEN_APP => Some(Action::OpenHost),
            _ => None,
        }
    }

    /// Encode back to the host's intent form
    pub fn to_intent(&self) -> Intent {
        let mut intent = Intent {
            action: Some(self.name().to_string()),
            ..Intent::default()
        };
        match self {
            Action::Toggle { task_id } | Action::Delete { task_id } => intent.task_id = Some(task_id.clone()),
            Action::Add { text } => intent.task_text = Some(text.clone()),
            Action::Refresh | Action::OpenHost => {}
        }
        intent
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Toggle { .. } => ACTION_TOGGLE_TASK,
            Action::Delete { .. } => ACTION_DELETE_TASK,
            Action::Add { .. } => ACTION_ADD_TASK,
            Action::Refresh => ACTION_REFRESH,
            Action::OpenHost => ACTION_OPEN_APP,
        }
    }
}

/// What the host surface should do for a given request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Just bring the host application up
    Open,
    /// Let the user type a new task there
    ComposeTask,
    /// Let the user pick or create a list first
    SelectList,
}

/// What the caller should do after dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Rerender,
    OpenHost(HostRequest),
    Ignore,
}

/// Run one action against the store
///
/// Performs at most one store mutation, scoped to the persisted selection.
/// Errors from the medium propagate, so a failed write never yields `Rerender`.
pub fn dispatch<B: Backend>(store: &Store<B>, action: Option<&Action>) -> Result<Response> {
    let Some(action) = action else {
        debug!("No recognized action, ignoring");
        return Ok(Response::Ignore);
    };
    debug!(action = action.name(), "Dispatching");

    let response = match action {
        Action::Toggle { task_id } => {
            let selection = store.directory().selection()?;
            store.tasks(selection).toggle_completion(task_id)?;
            Response::Rerender
        }
        Action::Delete { task_id } => {
            let selection = store.directory().selection()?;
            store.tasks(selection).delete_task(task_id)?;
            Response::Rerender
        }
        // Blank text goes to the host's composer before the selection is consulted
        Action::Add { text } if text.trim().is_empty() => Response::OpenHost(HostRequest::ComposeTask),
        Action::Add { text } => {
            let selection = store.directory().selection()?;
            match store.tasks(selection).add_task(text)? {
                Outcome::Applied(_) | Outcome::NotFound => Response::Rerender,
                Outcome::EmptyText => Response::OpenHost(HostRequest::ComposeTask),
                Outcome::NoSelection => Response::OpenHost(HostRequest::SelectList),
            }
        }
        Action::Refresh => Response::Rerender,
        Action::OpenHost => Response::OpenHost(HostRequest::Open),
    };
    Ok(response)
}
