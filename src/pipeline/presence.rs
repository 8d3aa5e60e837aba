use crate::page::dom::Document;

/// Answer from a presence probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceReport {
    pub is_target_present: bool,

    /// Free-form explanation, carried into `TargetAbsent`
    pub context: Option<String>,
}

impl PresenceReport {
    pub fn present() -> Self {
        Self {
            is_target_present: true,
            context: None,
        }
    }

    pub fn absent(context: impl Into<String>) -> Self {
        Self {
            is_target_present: false,
            context: Some(context.into()),
        }
    }
}

/// Decides whether the page in front of the pipeline is one it should touch.
pub trait PresenceOracle {
    fn probe(&self, doc: &Document) -> PresenceReport;
}

/// Treats every page as the target.
pub struct AssumePresent;

impl PresenceOracle for AssumePresent {
    fn probe(&self, _doc: &Document) -> PresenceReport {
        PresenceReport::present()
    }
}

/// Fixed answer, for callers that decided presence elsewhere.
pub struct StaticPresence(pub PresenceReport);

impl PresenceOracle for StaticPresence {
    fn probe(&self, _doc: &Document) -> PresenceReport {
        self.0.clone()
    }
}
