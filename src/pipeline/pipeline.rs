use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::codec::{CodecOptions, decode, encode};
use crate::codec::snapshot_model::Snapshot;
use crate::error::{Ceiling, Result, SnapshotError};
use crate::extract::extractor::{ExtractOptions, Extraction, extract};
use crate::page::dom::Document;
use crate::pipeline::presence::{AssumePresent, PresenceOracle};
use crate::reconcile::engine::reconcile;
use crate::report::report_model::RestoreReport;
use crate::trace::{logger::TraceLogger, trace::TraceEvent};

/// Which state machine is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Capture,
    Restore,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Capture => "capture",
            Operation::Restore => "restore",
        }
    }
}

/// Phases of both state machines.
///
/// Capture: `Idle → Extracting → Encoding → Done`.
/// Restore: `Idle → Decoding → LiveExtracting → Applying → Done`.
/// A whole-operation error from any phase moves to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Extracting,
    Encoding,
    Decoding,
    LiveExtracting,
    Applying,
    Done,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub extract: ExtractOptions,
    pub codec: CodecOptions,

    /// Fixed capture timestamp; the system clock is used when unset
    pub captured_at: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub snapshot: Snapshot,
    pub token: String,

    /// Value-carrying controls in the snapshot (containers excluded)
    pub control_count: usize,
}

/// What a restore starts from.
#[derive(Debug, Clone)]
pub enum RestoreInput {
    Token(String),
    Snapshot(Snapshot),
}

pub struct Pipeline {
    pub options: PipelineOptions,
    pub phase: Phase,

    /// Phases visited by the most recent operation, `Idle` first
    pub history: Vec<Phase>,

    oracle: Box<dyn PresenceOracle>,
    tracer: TraceLogger,
    step: u64,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            phase: Phase::Idle,
            history: vec![],
            oracle: Box::new(AssumePresent),
            tracer: TraceLogger::disabled(),
            step: 0,
        }
    }

    pub fn with_oracle(mut self, oracle: Box<dyn PresenceOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    /// Read every control on `doc` and encode the result as a token.
    pub fn capture(&mut self, doc: &Document) -> Result<CaptureOutcome> {
        self.begin(Operation::Capture);
        let outcome = self.run_capture(doc);
        self.finish(Operation::Capture, outcome)
    }

    /// Write a snapshot's values back onto the live controls of `doc`.
    ///
    /// Only whole-operation failures are returned as `Err`; controls that
    /// could not be written are listed in the report.
    pub fn restore(&mut self, input: RestoreInput, doc: &mut Document) -> Result<RestoreReport> {
        self.begin(Operation::Restore);
        let report = self.run_restore(input, doc);
        self.finish(Operation::Restore, report)
    }

    fn run_capture(&mut self, doc: &Document) -> Result<CaptureOutcome> {
        self.check_presence(doc)?;

        self.enter(Operation::Capture, Phase::Extracting);
        let extraction = extract(doc, &self.options.extract)?;
        let control_count = extraction.value_control_count();
        let unreadable = extraction.issues.len();
        self.trace(Operation::Capture, |e| {
            e.with_controls(control_count)
                .with_detail(format!("{unreadable} unreadable"))
        });

        self.enter(Operation::Capture, Phase::Encoding);
        let captured_at = self.options.captured_at.unwrap_or_else(epoch_millis);
        let snapshot = Snapshot::new(
            captured_at,
            doc.url.clone(),
            doc.title.clone(),
            extraction.into_controls(),
        );
        let token = encode(&snapshot, &self.options.codec)?;
        debug!(controls = control_count, token_len = token.len(), "capture encoded");

        Ok(CaptureOutcome {
            snapshot,
            token,
            control_count,
        })
    }

    fn run_restore(&mut self, input: RestoreInput, doc: &mut Document) -> Result<RestoreReport> {
        self.check_presence(doc)?;

        self.enter(Operation::Restore, Phase::Decoding);
        let snapshot = match input {
            RestoreInput::Token(token) => decode(&token, &self.options.codec)?,
            RestoreInput::Snapshot(snapshot) => self.accept_snapshot(snapshot)?,
        };
        if !snapshot.page_url.is_empty() && snapshot.page_url != doc.url {
            warn!(
                captured = %snapshot.page_url,
                live = %doc.url,
                "restoring onto a different page url"
            );
        }

        self.enter(Operation::Restore, Phase::LiveExtracting);
        let live: Extraction = extract(doc, &self.options.extract)?;
        if live.value_control_count() == 0 {
            return Err(SnapshotError::NoLiveControls);
        }
        let live_count = live.value_control_count();
        self.trace(Operation::Restore, |e| e.with_controls(live_count));

        self.enter(Operation::Restore, Phase::Applying);
        let report = reconcile(&snapshot, &live, doc);
        self.trace(Operation::Restore, |e| {
            e.with_outcome(
                report.restored_count,
                report.skipped_count,
                report.per_control_errors.len(),
            )
        });
        Ok(report)
    }

    /// In-memory snapshots get the same gates a decoded token would.
    fn accept_snapshot(&self, snapshot: Snapshot) -> Result<Snapshot> {
        snapshot.ensure_current_version()?;
        let limit = self.options.codec.max_controls;
        if snapshot.controls.len() > limit {
            return Err(SnapshotError::capacity(
                Ceiling::ControlCount,
                snapshot.controls.len(),
                limit,
            ));
        }
        Ok(snapshot)
    }

    fn check_presence(&self, doc: &Document) -> Result<()> {
        let report = self.oracle.probe(doc);
        if report.is_target_present {
            Ok(())
        } else {
            Err(SnapshotError::TargetAbsent(report.context))
        }
    }

    fn begin(&mut self, operation: Operation) {
        self.phase = Phase::Idle;
        self.history = vec![Phase::Idle];
        self.trace(operation, |e| e.with_decision("start"));
    }

    fn enter(&mut self, operation: Operation, phase: Phase) {
        debug!(operation = operation.as_str(), phase = ?phase, "phase transition");
        self.phase = phase;
        self.history.push(phase);
        self.trace(operation, |e| e.with_decision("enter"));
    }

    fn finish<T>(&mut self, operation: Operation, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => {
                self.enter(operation, Phase::Done);
            }
            Err(e) => {
                warn!(operation = operation.as_str(), phase = ?self.phase, error = %e, "operation failed");
                let failed_in = self.phase;
                self.phase = Phase::Failed;
                self.history.push(Phase::Failed);
                self.trace(operation, |ev| {
                    ev.with_decision(format!("failed in {:?}", failed_in))
                        .with_detail(e)
                });
            }
        }
        result
    }

    fn trace(&mut self, operation: Operation, build: impl FnOnce(TraceEvent) -> TraceEvent) {
        let event = build(TraceEvent::now(self.step, operation, &self.phase));
        self.step += 1;
        self.tracer.log(&event);
    }
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
