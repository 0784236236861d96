//! Shared, advisory run progress.
//!
//! One scalar, overwritten on every step transition. Only the orchestrating
//! call chain writes it; anything may read it. Readers must tolerate stale
//! values: this is display state, never pipeline control state.

use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressStatus {
    pub document: String,
    pub fr_id: String,
    pub step_number: u8,
    pub message: String,
}

/// Cloneable handle to the run's progress scalar.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    status: Arc<Mutex<ProgressStatus>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the scalar ahead of one step execution.
    pub fn step_started(&self, document: &str, fr_id: &str, step_number: u8, step_name: &str) {
        let message = format!("{} {}: step {} ({})", document, fr_id, step_number, step_name);
        tracing::info!("{}", message);
        *self.status.lock() = ProgressStatus {
            document: document.to_string(),
            fr_id: fr_id.to_string(),
            step_number,
            message,
        };
    }

    /// Overwrite the scalar with a free-form milestone message.
    pub fn announce(&self, message: String) {
        tracing::info!("{}", message);
        let mut status = self.status.lock();
        status.message = message;
    }

    pub fn current(&self) -> ProgressStatus {
        self.status.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_transitions_overwrite_the_scalar() {
        let tracker = ProgressTracker::new();
        tracker.step_started("signup.pdf", "FR-1", 1, "Atomic blocks");
        tracker.step_started("signup.pdf", "FR-1", 2, "Partitions");

        let status = tracker.current();
        assert_eq!(status.step_number, 2);
        assert!(status.message.contains("step 2"));
    }

    #[test]
    fn announce_keeps_position_fields() {
        let tracker = ProgressTracker::new();
        tracker.step_started("signup.pdf", "FR-2", 8, "Test cases");
        tracker.announce("Pipeline completed for signup.pdf - FR-2".to_string());

        let status = tracker.current();
        assert_eq!(status.fr_id, "FR-2");
        assert!(status.message.contains("completed"));
    }
}
