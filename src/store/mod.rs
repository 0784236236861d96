//! Checkpoint persistence.
//!
//! One JSON file per (document-stem, FR-id, step-number) cell under a base
//! directory, laid out as `<base>/<stem>/<FR-id>/step<n>.json`. Writes are
//! last-write-wins; a cell that is missing or unreadable reads as absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access checkpoint file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed checkpoint file {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The exact prompt pair sent to the model for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// Persisted record of one step execution for one requirement.
///
/// `llm_response` and `error` are mutually exclusive: a checkpoint holds
/// either the parsed response or the failure message, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub prompt: RenderedPrompt,
    pub input_data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_response: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub fr_id: String,
    pub fr_text: String,
    pub step_number: u8,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn success(
        prompt: RenderedPrompt,
        input_data: serde_json::Value,
        response: serde_json::Value,
        fr_id: &str,
        fr_text: &str,
        step_number: u8,
    ) -> Self {
        Self {
            prompt,
            input_data,
            llm_response: Some(response),
            error: None,
            fr_id: fr_id.to_string(),
            fr_text: fr_text.to_string(),
            step_number,
            created_at: Utc::now(),
        }
    }

    pub fn failure(
        prompt: RenderedPrompt,
        input_data: serde_json::Value,
        error: String,
        fr_id: &str,
        fr_text: &str,
        step_number: u8,
    ) -> Self {
        Self {
            prompt,
            input_data,
            llm_response: None,
            error: Some(error),
            fr_id: fr_id.to_string(),
            fr_text: fr_text.to_string(),
            step_number,
            created_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.llm_response.is_some()
    }
}

/// Address of one checkpoint cell, as discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub document: String,
    pub fr_id: String,
}

/// File-backed checkpoint store.
pub struct StepStore {
    base_path: PathBuf,
}

impl StepStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Strip the extension and anything path-like from a document name, so
    /// `reports/signup flow.pdf` and `signup flow` address the same cells.
    pub fn sanitize_stem(document: &str) -> String {
        let name = document
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(document);
        let stem = name.strip_suffix(".pdf").unwrap_or(name);
        stem.chars()
            .map(|c| if c.is_control() || c == '/' || c == '\\' { '_' } else { c })
            .collect()
    }

    fn cell_path(&self, document: &str, fr_id: &str, step_number: u8) -> PathBuf {
        self.base_path
            .join(Self::sanitize_stem(document))
            .join(fr_id)
            .join(format!("step{}.json", step_number))
    }

    /// Create the directory that holds all of a requirement's cells.
    pub fn ensure_cell_dir(&self, document: &str, fr_id: &str) -> Result<(), StoreError> {
        let dir = self.base_path.join(Self::sanitize_stem(document)).join(fr_id);
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir, source })
    }

    /// Persist a checkpoint, replacing any previous record for the cell.
    pub fn write(
        &self,
        document: &str,
        fr_id: &str,
        step_number: u8,
        checkpoint: &Checkpoint,
    ) -> Result<(), StoreError> {
        let path = self.cell_path(document, fr_id, step_number);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(checkpoint).map_err(|source| {
            StoreError::Malformed {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, json).map_err(|source| StoreError::Io { path, source })
    }

    /// Read a cell for resume purposes: missing and unreadable cells both
    /// come back as `None`, the latter with a warning.
    pub fn read(&self, document: &str, fr_id: &str, step_number: u8) -> Option<Checkpoint> {
        let path = self.cell_path(document, fr_id, step_number);
        if !path.exists() {
            return None;
        }
        match self.try_read(document, fr_id, step_number) {
            Ok(checkpoint) => Some(checkpoint),
            Err(err) => {
                tracing::warn!("treating unreadable checkpoint as absent: {}", err);
                None
            }
        }
    }

    /// Read a cell, surfacing the reason when the file exists but cannot be
    /// used. The combiner needs the distinction; the pipeline does not.
    pub fn try_read(
        &self,
        document: &str,
        fr_id: &str,
        step_number: u8,
    ) -> Result<Checkpoint, StoreError> {
        let path = self.cell_path(document, fr_id, step_number);
        let json = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| StoreError::Malformed { path, source })
    }

    /// Discover every (document, FR) cell that has a file for `step_number`,
    /// in document order then FR order.
    pub fn cells_with_step(&self, step_number: u8) -> Vec<CellRef> {
        let mut cells = Vec::new();

        let Ok(doc_entries) = fs::read_dir(&self.base_path) else {
            return cells;
        };
        let mut doc_dirs: Vec<PathBuf> = doc_entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        doc_dirs.sort();

        for doc_dir in doc_dirs {
            let Ok(fr_entries) = fs::read_dir(&doc_dir) else {
                continue;
            };
            let mut fr_dirs: Vec<PathBuf> = fr_entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| {
                    p.is_dir()
                        && p.file_name()
                            .and_then(|n| n.to_str())
                            .map(|n| n.starts_with("FR-"))
                            .unwrap_or(false)
                })
                .collect();
            fr_dirs.sort_by_key(|p| fr_ordinal(p));

            for fr_dir in fr_dirs {
                if fr_dir.join(format!("step{}.json", step_number)).exists() {
                    cells.push(CellRef {
                        document: dir_name(&doc_dir),
                        fr_id: dir_name(&fr_dir),
                    });
                }
            }
        }

        cells
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Numeric suffix of an `FR-<n>` directory, so FR-10 sorts after FR-2.
fn fr_ordinal(path: &Path) -> u64 {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_prefix("FR-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(u64::MAX)
}
