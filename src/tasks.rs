//! Loading the selected-tasks file produced by the task-selection UI.
//!
//! The file maps each processed document to the ordered list of requirements
//! chosen for a run:
//!
//! ```json
//! {
//!   "signup_flow": [
//!     { "FR-1": "The first name field should only allow Latin letters..." },
//!     { "FR-2": "..." }
//!   ]
//! }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

static FR_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^FR-\d+$").expect("valid FR id pattern"));

#[derive(Error, Debug)]
pub enum TasksError {
    #[error("Failed to read tasks file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Tasks file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Tasks file has an unexpected shape: {0}")]
    BadShape(String),

    #[error("Invalid requirement id {0:?} (expected FR-<n>)")]
    BadRequirementId(String),
}

/// One functional requirement, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub text: String,
}

/// One document's ordered requirement selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTasks {
    pub document: String,
    pub requirements: Vec<Requirement>,
}

/// Documents in file order, each with its requirements in file order.
pub type TaskSelection = Vec<DocumentTasks>;

/// Parse and validate a selected-tasks file.
pub fn load_tasks(path: &Path) -> Result<TaskSelection, TasksError> {
    let raw = fs::read_to_string(path).map_err(|source| TasksError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| TasksError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    parse_tasks(&value)
}

/// Validate the in-memory tasks shape (document → single-entry FR maps).
pub fn parse_tasks(value: &serde_json::Value) -> Result<TaskSelection, TasksError> {
    let documents = value
        .as_object()
        .ok_or_else(|| TasksError::BadShape("top level must be an object".to_string()))?;

    let mut selection = Vec::with_capacity(documents.len());
    for (document, entries) in documents {
        let entries = entries.as_array().ok_or_else(|| {
            TasksError::BadShape(format!("document {:?} must map to an array", document))
        })?;

        let mut requirements = Vec::with_capacity(entries.len());
        for entry in entries {
            let map = entry.as_object().filter(|m| m.len() == 1).ok_or_else(|| {
                TasksError::BadShape(format!(
                    "each requirement under {:?} must be a single-entry object",
                    document
                ))
            })?;
            let (id, text) = map.iter().next().expect("single entry checked above");

            if !FR_ID.is_match(id) {
                return Err(TasksError::BadRequirementId(id.clone()));
            }
            let text = text.as_str().ok_or_else(|| {
                TasksError::BadShape(format!("requirement {:?} text must be a string", id))
            })?;

            requirements.push(Requirement {
                id: id.clone(),
                text: text.to_string(),
            });
        }

        selection.push(DocumentTasks {
            document: document.clone(),
            requirements,
        });
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_documents_and_requirements_in_order() {
        let value = json!({
            "zeta_signup": [
                { "FR-1": "Only Latin letters" },
                { "FR-2": "Between 2 and 25 characters" }
            ],
            "alpha_checkout": [
                { "FR-1": "Cart total must update" }
            ]
        });

        let selection = parse_tasks(&value).unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(selection[0].document, "zeta_signup");
        assert_eq!(selection[0].requirements[1].id, "FR-2");
        assert_eq!(selection[1].document, "alpha_checkout");
    }

    #[test]
    fn rejects_bad_requirement_ids() {
        let value = json!({ "doc": [ { "REQ-1": "text" } ] });
        assert!(matches!(
            parse_tasks(&value),
            Err(TasksError::BadRequirementId(_))
        ));
    }

    #[test]
    fn rejects_multi_entry_requirement_objects() {
        let value = json!({ "doc": [ { "FR-1": "a", "FR-2": "b" } ] });
        assert!(matches!(parse_tasks(&value), Err(TasksError::BadShape(_))));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"{"signup": [{"FR-1": "Only Latin letters"}]}"#).unwrap();

        let selection = load_tasks(&path).unwrap();
        assert_eq!(selection[0].requirements[0].text, "Only Latin letters");
    }
}
