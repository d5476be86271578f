// TaskWidget - partitioned task store backing a home-screen widget

pub mod backend;
pub mod codec;
pub mod config;
pub mod directory;
pub mod models;
pub mod record;
pub mod router;
pub mod selection;
pub mod store;
pub mod tasks;
pub mod view;

// Re-export main types for convenience
pub use backend::{Backend, FileBackend, MemoryBackend};
pub use directory::ListDirectory;
pub use models::{Task, TaskList};
pub use record::Record;
pub use router::{Action, HostRequest, Intent, Response, dispatch};
pub use selection::Selection;
pub use store::{Edit, Store};
pub use tasks::{Outcome, ScopedTasks};
pub use view::{WidgetView, build_view};
