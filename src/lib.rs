pub mod cli;
pub mod codec;
pub mod error;
pub mod extract;
pub mod identity;
pub mod page;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod trace;
pub mod watch;

pub use codec::codec::{CodecOptions, decode, encode};
pub use codec::snapshot_model::{FORMAT_VERSION, Snapshot};
pub use error::{ApplyError, PageError, SnapshotError};
pub use extract::descriptor_model::{ControlDescriptor, ControlFamily, ControlValue, InputKind};
pub use extract::extractor::{ExtractOptions, Extraction, extract};
pub use identity::match_key::{MatchKey, match_key};
pub use page::dom::Document;
pub use pipeline::pipeline::{CaptureOutcome, Phase, Pipeline, PipelineOptions, RestoreInput};
pub use reconcile::engine::reconcile;
pub use report::report_model::RestoreReport;
