use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use crate::codec::codec::decode;
use crate::extract::extractor::extract;
use crate::page::loader::{load_page, save_page};
use crate::pipeline::pipeline::{Pipeline, PipelineOptions, RestoreInput};
use crate::report::console::{
    format_capture_summary, format_keys, format_restore_report, format_snapshot,
};
use crate::trace::logger::TraceLogger;
use crate::watch::watcher::LiveWatcher;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

fn build_pipeline(options: PipelineOptions, trace_path: Option<&str>) -> Pipeline {
    let pipeline = Pipeline::new(options);
    match trace_path {
        Some(path) => pipeline.with_tracer(TraceLogger::new(path)),
        None => pipeline,
    }
}

/// Token text from `--token` or `--token-file`.
pub fn read_token(token: Option<&str>, token_file: Option<&str>) -> CmdResult<String> {
    match (token, token_file) {
        (Some(t), _) => Ok(t.trim().to_string()),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?.trim().to_string()),
        (None, None) => Err("either --token or --token-file is required".into()),
    }
}

// ============================================================================
// capture subcommand
// ============================================================================

pub fn cmd_capture(
    page: &str,
    output: Option<&str>,
    options: PipelineOptions,
    trace_path: Option<&str>,
    verbose: u8,
) -> CmdResult<()> {
    let doc = load_page(page)?;
    let mut pipeline = build_pipeline(options, trace_path);

    if verbose > 0 {
        eprintln!("Capturing {} ({} elements)...", page, doc.len());
    }

    let outcome = pipeline.capture(&doc)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", outcome.token))?;
            print!("{}", format_capture_summary(&outcome));
            println!("Token written to {}", path);
        }
        None => {
            // stdout carries only the token so it can be piped
            println!("{}", outcome.token);
            if verbose > 0 {
                eprint!("{}", format_capture_summary(&outcome));
            }
        }
    }

    Ok(())
}

// ============================================================================
// restore subcommand
// ============================================================================

/// Restore a token onto a page dump. Returns `false` when a matched control
/// could not be written; unmatched controls are only reported.
pub fn cmd_restore(
    page: &str,
    token: Option<&str>,
    token_file: Option<&str>,
    output: Option<&str>,
    options: PipelineOptions,
    trace_path: Option<&str>,
    verbose: u8,
) -> CmdResult<bool> {
    let token = read_token(token, token_file)?;
    let mut doc = load_page(page)?;
    let mut pipeline = build_pipeline(options, trace_path);

    if verbose > 0 {
        eprintln!("Restoring onto {} ({} elements)...", page, doc.len());
    }

    let report = pipeline.restore(RestoreInput::Token(token), &mut doc)?;
    print!("{}", format_restore_report(&report));

    if let Some(path) = output {
        save_page(path, &doc)?;
        println!("Restored page written to {}", path);
    }

    Ok(!report.has_errors())
}

// ============================================================================
// inspect subcommand
// ============================================================================

pub fn cmd_inspect(
    token: Option<&str>,
    token_file: Option<&str>,
    json: bool,
    options: &PipelineOptions,
) -> CmdResult<()> {
    let token = read_token(token, token_file)?;
    let snapshot = decode(&token, &options.codec)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", format_snapshot(&snapshot));
    }
    Ok(())
}

// ============================================================================
// keys subcommand
// ============================================================================

pub fn cmd_keys(page: &str, options: &PipelineOptions) -> CmdResult<()> {
    let doc = load_page(page)?;
    let extraction = extract(&doc, &options.extract)?;
    print!("{}", format_keys(&extraction));
    Ok(())
}

// ============================================================================
// watch subcommand
// ============================================================================

/// Follows a page dump on disk. Every change to the file counts as a
/// structural mutation; the page is reloaded and rescanned once changes have
/// settled for the watcher's debounce window.
pub struct PageWatch {
    path: PathBuf,
    watcher: LiveWatcher,
    seen: Option<(SystemTime, u64)>,
}

impl PageWatch {
    pub fn new(path: impl Into<PathBuf>, watcher: LiveWatcher) -> Self {
        Self {
            path: path.into(),
            watcher,
            seen: None,
        }
    }

    /// Look at the file once. Returns the number of value controls found
    /// when a rescan ran.
    ///
    /// A dump that fails to parse (for example, half written) is retried on
    /// the next look.
    pub fn poll(&mut self, now: Instant) -> CmdResult<Option<usize>> {
        let meta = std::fs::metadata(&self.path)?;
        let stamp = (meta.modified()?, meta.len());
        if self.seen != Some(stamp) {
            self.seen = Some(stamp);
            self.watcher.on_mutation(now);
        }

        if !self.watcher.is_due(now) {
            return Ok(None);
        }
        let doc = match load_page(&self.path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "page dump not readable yet");
                return Ok(None);
            }
        };
        self.watcher.tick(now, &doc)?;
        Ok(self.watcher.current().map(|e| e.value_control_count()))
    }

    pub fn watcher(&self) -> &LiveWatcher {
        &self.watcher
    }
}

pub fn cmd_watch(
    page: &str,
    watcher: LiveWatcher,
    interval: Duration,
    polls: Option<usize>,
    verbose: u8,
) -> CmdResult<()> {
    if verbose > 0 {
        eprintln!(
            "Watching {} (debounce {} ms)...",
            page,
            watcher.window().as_millis()
        );
    }

    let mut follow = PageWatch::new(page, watcher);
    let mut looked = 0;
    loop {
        if let Some(count) = follow.poll(Instant::now())? {
            println!("rescan #{}: {} controls", follow.watcher().rescans(), count);
            if verbose > 0 {
                if let Some(extraction) = follow.watcher().current() {
                    eprint!("{}", format_keys(extraction));
                }
            }
        }
        looked += 1;
        if polls.is_some_and(|max| looked >= max) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}
