use serde::{Deserialize, Serialize};

// ============================================================================
// Restore report: aggregates per-control outcomes of one reconciliation
// ============================================================================

/// Which snapshot control a per-control error refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRef {
    /// Position in the snapshot's control list
    pub index: usize,

    /// Logical name captured with the control
    pub name: String,

    /// Short fingerprint of the control's match key
    pub fingerprint: String,
}

/// A control that matched but could not take its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlError {
    pub control: ControlRef,
    pub message: String,
}

/// Outcome of one restore. Built up control by control; never fails as a
/// whole because of a single control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    /// Controls matched and written
    pub restored_count: usize,

    /// Controls with no live counterpart
    pub skipped_count: usize,

    /// Controls matched but not written, with the reason
    pub per_control_errors: Vec<ControlError>,
}

impl RestoreReport {
    pub fn record_restored(&mut self) {
        self.restored_count += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    pub fn record_error(&mut self, control: ControlRef, message: impl Into<String>) {
        self.per_control_errors.push(ControlError {
            control,
            message: message.into(),
        });
    }

    /// Controls that were considered at all.
    pub fn total(&self) -> usize {
        self.restored_count + self.skipped_count + self.per_control_errors.len()
    }

    /// Whether any matched control failed to take its value. Skips do not
    /// count.
    pub fn has_errors(&self) -> bool {
        !self.per_control_errors.is_empty()
    }

    /// Whether every considered control was written.
    pub fn is_complete(&self) -> bool {
        self.skipped_count == 0 && self.per_control_errors.is_empty()
    }
}
