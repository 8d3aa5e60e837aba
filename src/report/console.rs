use crate::codec::snapshot_model::Snapshot;
use crate::extract::extractor::Extraction;
use crate::identity::match_key::match_key;
use crate::pipeline::pipeline::CaptureOutcome;
use crate::report::report_model::RestoreReport;

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a capture summary.
///
/// ```text
/// === Capture: https://app.test/signup ===
///
/// 2 controls captured (1 container), token 312 chars
/// ```
pub fn format_capture_summary(outcome: &CaptureOutcome) -> String {
    let containers = outcome.snapshot.controls.len() - outcome.control_count;
    let mut out = String::new();
    out.push_str(&format!("=== Capture: {} ===\n\n", page_label(&outcome.snapshot)));
    out.push_str(&format!(
        "{} controls captured ({} container{}), token {} chars\n",
        outcome.control_count,
        containers,
        if containers == 1 { "" } else { "s" },
        outcome.token.len()
    ));
    out
}

/// Format a restore report.
///
/// ```text
/// ✓ restored 4, skipped 0, errors 1
///     [ERROR] #2 newsletter (3fa1c09b2d4e): control is readonly or disabled
/// ```
pub fn format_restore_report(report: &RestoreReport) -> String {
    let marker = if report.is_complete() {
        "\u{2713}"
    } else {
        "\u{2717}"
    };
    let mut out = format!(
        "{} restored {}, skipped {}, errors {}\n",
        marker,
        report.restored_count,
        report.skipped_count,
        report.per_control_errors.len()
    );
    for err in &report.per_control_errors {
        out.push_str(&format!(
            "    [ERROR] #{} {} ({}): {}\n",
            err.control.index, err.control.name, err.control.fingerprint, err.message
        ));
    }
    out
}

/// One line per captured control: position, family, kind, name, value.
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    let mut out = format!(
        "=== Snapshot v{}: {} ({} controls) ===\n",
        snapshot.format_version,
        page_label(snapshot),
        snapshot.controls.len()
    );
    for (i, control) in snapshot.controls.iter().enumerate() {
        let value = serde_json::to_string(&control.value).unwrap_or_default();
        let parent = control.parent_form_id.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "{:>3}  {:<14} {:<13} {:<20} parent={:<5} {}\n",
            i,
            control.family.as_str(),
            control.input_kind.as_str(),
            control.name,
            parent,
            value
        ));
    }
    out
}

/// Match keys of a live extraction, with their fingerprints.
pub fn format_keys(extraction: &Extraction) -> String {
    let mut out = String::new();
    for control in &extraction.controls {
        let key = match_key(control);
        let marker = if control.is_container() { "+" } else { " " };
        out.push_str(&format!("{} {}  {}\n", marker, key.fingerprint(), key));
    }
    for issue in &extraction.issues {
        out.push_str(&format!(
            "! {} <{}>: {}\n",
            issue.name, issue.tag, issue.message
        ));
    }
    out
}

fn page_label(snapshot: &Snapshot) -> &str {
    if !snapshot.page_title.is_empty() {
        &snapshot.page_title
    } else if !snapshot.page_url.is_empty() {
        &snapshot.page_url
    } else {
        "(untitled page)"
    }
}
