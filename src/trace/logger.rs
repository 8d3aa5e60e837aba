use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::trace::trace::TraceEvent;

type Sink = Box<dyn Write + Send>;

/// Append-only JSONL journal of pipeline transitions.
///
/// Journaling is best effort: a sink that cannot be opened or written only
/// produces a warning, and the operation being traced carries on.
pub struct TraceLogger {
    sink: Option<Mutex<Sink>>,
    written: AtomicUsize,
}

impl TraceLogger {
    /// Journal appended to the file at `path`. Falls back to a disabled
    /// logger when the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self::to_writer(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "trace journal disabled");
                Self::disabled()
            }
        }
    }

    /// Journal written to any sink, one line per event.
    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Some(Mutex::new(Box::new(writer))),
            written: AtomicUsize::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self {
            sink: None,
            written: AtomicUsize::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Events that reached the sink.
    pub fn written(&self) -> usize {
        self.written.load(Ordering::Relaxed)
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };
        match append_line(sink, event) {
            Ok(()) => {
                self.written.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => tracing::warn!(step = event.step, error = %e, "trace event dropped"),
        }
    }
}

fn append_line(sink: &Mutex<Sink>, event: &TraceEvent) -> io::Result<()> {
    let mut line = serde_json::to_vec(event).map_err(io::Error::other)?;
    line.push(b'\n');

    // A panic mid-write leaves at most one torn line; keep journaling.
    let mut out = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    out.write_all(&line)?;
    out.flush()
}
