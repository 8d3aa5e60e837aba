use std::time::{Duration, Instant};

use crate::error::Result;
use crate::extract::extractor::{ExtractOptions, Extraction, extract};
use crate::page::dom::Document;
use crate::watch::debounce::RescanDebouncer;

/// Keeps a fresh extraction of a page whose structure keeps changing.
pub struct LiveWatcher {
    options: ExtractOptions,
    debouncer: RescanDebouncer,
    current: Option<Extraction>,
    rescans: usize,
}

impl LiveWatcher {
    pub fn new(options: ExtractOptions, window: Duration) -> Self {
        Self {
            options,
            debouncer: RescanDebouncer::new(window),
            current: None,
            rescans: 0,
        }
    }

    /// Record a structural change seen at `now`.
    pub fn on_mutation(&mut self, now: Instant) {
        self.debouncer.notify(now);
    }

    /// Whether the next `tick` at `now` would rescan.
    pub fn is_due(&self, now: Instant) -> bool {
        self.debouncer.is_due(now)
    }

    /// Rescan `doc` if a debounced rescan is due. Returns whether it ran.
    pub fn tick(&mut self, now: Instant, doc: &Document) -> Result<bool> {
        if self.debouncer.poll(now).is_none() {
            return Ok(false);
        }
        self.rescan(doc)?;
        Ok(true)
    }

    /// Rescan immediately, dropping any pending notification.
    pub fn rescan(&mut self, doc: &Document) -> Result<&Extraction> {
        self.debouncer.cancel();
        let extraction = extract(doc, &self.options)?;
        self.rescans += 1;
        tracing::debug!(controls = extraction.len(), rescans = self.rescans, "page rescanned");
        Ok(self.current.insert(extraction))
    }

    pub fn current(&self) -> Option<&Extraction> {
        self.current.as_ref()
    }

    pub fn window(&self) -> Duration {
        self.debouncer.window()
    }

    pub fn rescans(&self) -> usize {
        self.rescans
    }
}
