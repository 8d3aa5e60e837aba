use std::time::{Duration, Instant};

pub const DEFAULT_RESCAN_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
struct PendingRescan {
    requested_at: Instant,
    notifications: usize,
}

/// Collapses bursts of structural-change notifications into one rescan.
///
/// Each notification restarts the window; the rescan is due once the window
/// has passed with no further notification.
#[derive(Debug, Clone)]
pub struct RescanDebouncer {
    window: Duration,
    pending: Option<PendingRescan>,
}

impl Default for RescanDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESCAN_DEBOUNCE)
    }
}

impl RescanDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn notify(&mut self, now: Instant) {
        let notifications = self.pending.as_ref().map_or(0, |p| p.notifications) + 1;
        self.pending = Some(PendingRescan {
            requested_at: now,
            notifications,
        });
    }

    /// Whether a rescan is due at `now`, without consuming it.
    pub fn is_due(&self, now: Instant) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.requested_at) >= self.window)
    }

    /// Returns the number of notifications collapsed into the rescan when one
    /// is due, and clears the pending state.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let pending = self.pending.as_ref()?;
        if now.saturating_duration_since(pending.requested_at) < self.window {
            return None;
        }
        let collapsed = pending.notifications;
        self.pending = None;
        tracing::debug!(collapsed, "rescan due");
        Some(collapsed)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
