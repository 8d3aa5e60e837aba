use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};
use crate::extract::descriptor_model::ControlDescriptor;

/// Format version written into every token and snapshot.
pub const FORMAT_VERSION: u32 = 1;

/// The unit that gets encoded: captured controls plus capture context.
///
/// `controls` keeps capture order through encode and decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub format_version: u32,
    pub captured_at_epoch_millis: i64,
    pub page_url: String,
    pub page_title: String,
    pub controls: Vec<ControlDescriptor>,
}

impl Snapshot {
    pub fn new(
        captured_at_epoch_millis: i64,
        page_url: impl Into<String>,
        page_title: impl Into<String>,
        controls: Vec<ControlDescriptor>,
    ) -> Self {
        Snapshot {
            format_version: FORMAT_VERSION,
            captured_at_epoch_millis,
            page_url: page_url.into(),
            page_title: page_title.into(),
            controls,
        }
    }

    /// Only snapshots in the current format can be encoded or restored.
    pub fn ensure_current_version(&self) -> Result<()> {
        if self.format_version == FORMAT_VERSION {
            return Ok(());
        }
        Err(SnapshotError::Version {
            found: self.format_version.to_string(),
            expected: FORMAT_VERSION.to_string(),
        })
    }
}
