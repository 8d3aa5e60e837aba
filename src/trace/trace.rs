use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::pipeline::pipeline::{Operation, Phase};

/// One line of the pipeline journal.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub step: u64,

    pub operation: String,
    pub phase: String,

    pub decision: Option<String>,
    pub detail: Option<String>,

    pub control_count: Option<usize>,
    pub restored: Option<usize>,
    pub skipped: Option<usize>,
    pub errors: Option<usize>,
}

impl TraceEvent {
    pub fn now(step: u64, operation: Operation, phase: &Phase) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            step,
            operation: operation.as_str().to_string(),
            phase: format!("{:?}", phase),
            decision: None,
            detail: None,
            control_count: None,
            restored: None,
            skipped: None,
            errors: None,
        }
    }

    pub fn with_decision(mut self, decision: impl ToString) -> Self {
        self.decision = Some(decision.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_controls(mut self, count: usize) -> Self {
        self.control_count = Some(count);
        self
    }

    pub fn with_outcome(mut self, restored: usize, skipped: usize, errors: usize) -> Self {
        self.restored = Some(restored);
        self.skipped = Some(skipped);
        self.errors = Some(errors);
        self
    }
}
