use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::codec::snapshot_model::Snapshot;
use crate::error::ApplyError;
use crate::extract::descriptor_model::{ControlDescriptor, ControlFamily};
use crate::extract::extractor::Extraction;
use crate::identity::match_key::{MatchKey, match_key};
use crate::page::dom::Document;
use crate::reconcile::apply::{apply_value, notify};
use crate::reconcile::component::reconcile_component;
use crate::report::report_model::{ControlRef, RestoreReport};

/// Live controls grouped by match key, each queue in extraction order.
fn index_live(live: &Extraction) -> HashMap<MatchKey, VecDeque<usize>> {
    let mut index: HashMap<MatchKey, VecDeque<usize>> = HashMap::new();
    for (i, control) in live.controls.iter().enumerate() {
        if control.is_container() {
            continue;
        }
        index.entry(match_key(control)).or_default().push_back(i);
    }
    index
}

/// Apply every captured value to its live counterpart in `doc`.
///
/// Controls sharing a key pair up positionally: the n-th captured one goes to
/// the n-th live one. Containers are neither applied nor counted. A control
/// that fails lands in the report; the rest of the restore carries on.
pub fn reconcile(snapshot: &Snapshot, live: &Extraction, doc: &mut Document) -> RestoreReport {
    let mut index = index_live(live);
    let mut report = RestoreReport::default();

    for (i, captured) in snapshot.controls.iter().enumerate() {
        if captured.is_container() {
            continue;
        }
        let key = match_key(captured);
        let control = ControlRef {
            index: i,
            name: captured.name.clone(),
            fingerprint: key.fingerprint(),
        };

        let Some(live_index) = index.get_mut(&key).and_then(VecDeque::pop_front) else {
            debug!(name = %captured.name, key = %control.fingerprint, "no live counterpart");
            report.record_skipped();
            continue;
        };

        let target = &live.controls[live_index];
        match restore_one(doc, live, live_index, target, captured) {
            Ok(()) => report.record_restored(),
            Err(e) => {
                warn!(name = %captured.name, key = %control.fingerprint, error = %e, "control not restored");
                report.record_error(control, e.to_string());
            }
        }
    }

    debug!(
        restored = report.restored_count,
        skipped = report.skipped_count,
        errors = report.per_control_errors.len(),
        "reconciliation finished"
    );
    report
}

fn restore_one(
    doc: &mut Document,
    live: &Extraction,
    live_index: usize,
    target: &ControlDescriptor,
    captured: &ControlDescriptor,
) -> Result<(), ApplyError> {
    if target.is_locked() {
        return Err(ApplyError::ReadonlyOrDisabled);
    }
    let node = live.node_of(live_index);
    apply_value(doc, node, target.input_kind, &captured.value)?;
    notify(doc, node);
    if target.family == ControlFamily::RichComponent {
        reconcile_component(doc, node, &captured.value)?;
    }
    Ok(())
}
