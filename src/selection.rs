// Current-list selection, passed explicitly into scoped operations

use crate::record::Record;

/// Which partition scoped operations act on
///
/// An empty or whitespace-only list id is the same as no selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    list_id: Option<String>,
}

impl Selection {
    /// No list selected: scoped reads are empty, scoped writes are refused
    pub fn none() -> Self {
        Self::default()
    }

    pub fn list(list_id: impl Into<String>) -> Self {
        let list_id = list_id.into();
        if list_id.trim().is_empty() {
            return Self::none();
        }
        Self { list_id: Some(list_id) }
    }

    pub fn list_id(&self) -> Option<&str> {
        self.list_id.as_deref()
    }

    pub fn is_selected(&self) -> bool {
        self.list_id.is_some()
    }

    /// True when the record belongs to the selected partition
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.list_id() == Some(record.partition())
    }
}

impl From<Option<String>> for Selection {
    fn from(list_id: Option<String>) -> Self {
        list_id.map(Self::list).unwrap_or_default()
    }
}

impl From<&str> for Selection {
    fn from(list_id: &str) -> Self {
        Self::list(list_id)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.list_id {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "<none>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    #[test]
    fn test_selection_creation() {
        let selection = Selection::list("L1");
        assert!(selection.is_selected());
        assert_eq!(selection.list_id(), Some("L1"));
    }

    #[test]
    fn test_blank_list_id_is_no_selection() {
        assert_eq!(Selection::list(""), Selection::none());
        assert_eq!(Selection::list("  "), Selection::none());
        assert_eq!(Selection::from(Some(String::new())), Selection::none());
        assert_eq!(Selection::from(None), Selection::none());
        assert!(!Selection::none().is_selected());
    }

    #[test]
    fn test_matches_only_selected_partition() {
        let task = Task {
            list_id: "L1".to_string(),
            ..Task::default()
        };
        let orphan = Task::default();

        assert!(Selection::list("L1").matches(&task));
        assert!(!Selection::list("L2").matches(&task));
        assert!(!Selection::none().matches(&task));
        assert!(!Selection::none().matches(&orphan));
    }

    #[test]
    fn test_selection_display() {
        assert_eq!(Selection::list("L1").to_string(), "L1");
        assert_eq!(Selection::none().to_string(), "<none>");
    }
}
