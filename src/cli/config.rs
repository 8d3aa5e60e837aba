use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::codec::codec::{CodecOptions, DEFAULT_COMPRESSION_THRESHOLD, DEFAULT_MAX_PAYLOAD_BYTES};
use crate::extract::extractor::{DEFAULT_MAX_CONTROLS, DEFAULT_MAX_DEPTH, ExtractOptions};
use crate::pipeline::pipeline::PipelineOptions;
use crate::watch::watcher::LiveWatcher;

pub const DEFAULT_CONFIG_FILE: &str = "form-snapshot.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-snapshot",
    version,
    about = "Capture form state from a page dump and restore it later"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-snapshot.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Append pipeline phase transitions to this JSONL file
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Override the per-page control ceiling
    #[arg(long, global = true)]
    pub max_controls: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture every control on a page dump into a token
    Capture {
        /// Page dump (JSON)
        #[arg(long)]
        page: String,

        /// Write the token here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Restore a token onto a page dump
    Restore {
        /// Page dump (JSON) to restore onto
        #[arg(long)]
        page: String,

        /// Token text
        #[arg(long, conflicts_with = "token_file", required_unless_present = "token_file")]
        token: Option<String>,

        /// File holding the token
        #[arg(long)]
        token_file: Option<String>,

        /// Write the restored page dump here
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Decode a token and list its controls
    Inspect {
        /// Token text
        #[arg(long, conflicts_with = "token_file", required_unless_present = "token_file")]
        token: Option<String>,

        /// File holding the token
        #[arg(long)]
        token_file: Option<String>,

        /// Print the decoded snapshot as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the match key of every control on a page dump
    Keys {
        /// Page dump (JSON)
        #[arg(long)]
        page: String,
    },

    /// Follow a page dump file and rescan it once its changes settle
    Watch {
        /// Page dump (JSON) to follow
        #[arg(long)]
        page: String,

        /// How often to look at the file, in milliseconds
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,

        /// Stop after this many looks (runs until interrupted when unset)
        #[arg(long)]
        polls: Option<usize>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-snapshot.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_controls")]
    pub max_controls: usize,

    #[serde(default = "default_max_depth")]
    pub max_nesting_depth: usize,

    #[serde(default = "default_max_depth")]
    pub max_path_ancestors: usize,

    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: usize,

    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_controls: DEFAULT_MAX_CONTROLS,
            max_nesting_depth: DEFAULT_MAX_DEPTH,
            max_path_ancestors: DEFAULT_MAX_DEPTH,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

// Serde default helpers
fn default_max_controls() -> usize { DEFAULT_MAX_CONTROLS }
fn default_max_depth() -> usize { DEFAULT_MAX_DEPTH }
fn default_max_payload_bytes() -> usize { DEFAULT_MAX_PAYLOAD_BYTES }
fn default_compression_threshold() -> usize { DEFAULT_COMPRESSION_THRESHOLD }
fn default_debounce_ms() -> u64 { 300 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = config_path, error = %e, "malformed config, using defaults");
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Pipeline options from the config file, with CLI overrides applied.
pub fn build_pipeline_options(config: &AppConfig, max_controls: Option<usize>) -> PipelineOptions {
    let limits = &config.limits;
    let max_controls = max_controls.unwrap_or(limits.max_controls);
    PipelineOptions {
        extract: ExtractOptions {
            max_path_ancestors: limits.max_path_ancestors,
            max_nesting_depth: limits.max_nesting_depth,
            max_controls,
            include_hidden: limits.include_hidden,
        },
        codec: CodecOptions {
            max_payload_bytes: limits.max_payload_bytes,
            max_controls,
            compression_threshold: limits.compression_threshold,
        },
        captured_at: None,
    }
}

/// Trace journal path: CLI flag first, then config.
pub fn resolve_trace_path<'a>(cli: Option<&'a str>, config: &'a AppConfig) -> Option<&'a str> {
    cli.or(config.trace.path.as_deref())
}

/// Rescan watcher using the resolved extraction limits and the configured
/// debounce window.
pub fn build_live_watcher(config: &AppConfig, options: &PipelineOptions) -> LiveWatcher {
    LiveWatcher::new(
        options.extract.clone(),
        Duration::from_millis(config.watch.debounce_ms),
    )
}
