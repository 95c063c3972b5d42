use serde::{Deserialize, Serialize};

/// One page of a procedure. Identity is the `id`; position lives in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_terminal: bool,
}

impl Step {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_terminal: false,
        }
    }

    pub(crate) fn terminal(mut self, is_terminal: bool) -> Self {
        self.is_terminal = is_terminal;
        self
    }
}

/// Compact constructor used by the catalogs: `steps(&[("id", "Title"), ...])`.
pub fn steps(entries: &[(&str, &str)]) -> Vec<Step> {
    entries
        .iter()
        .map(|(id, title)| Step::new(*id, *title))
        .collect()
}
