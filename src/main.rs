use std::time::Duration;

use clap::Parser;
use form_snapshot::cli::commands::{cmd_capture, cmd_inspect, cmd_keys, cmd_restore, cmd_watch};
use form_snapshot::cli::config::{
    Cli, Commands, build_live_watcher, build_pipeline_options, load_config, resolve_trace_path,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref());
    let options = build_pipeline_options(&config, cli.max_controls);
    let trace_path = resolve_trace_path(cli.trace.as_deref(), &config);

    match cli.command {
        Commands::Capture { page, output } => {
            cmd_capture(&page, output.as_deref(), options, trace_path, cli.verbose)?;
        }
        Commands::Restore {
            page,
            token,
            token_file,
            output,
        } => {
            let clean = cmd_restore(
                &page,
                token.as_deref(),
                token_file.as_deref(),
                output.as_deref(),
                options,
                trace_path,
                cli.verbose,
            )?;
            if !clean {
                std::process::exit(1);
            }
        }
        Commands::Inspect {
            token,
            token_file,
            json,
        } => {
            cmd_inspect(token.as_deref(), token_file.as_deref(), json, &options)?;
        }
        Commands::Keys { page } => {
            cmd_keys(&page, &options)?;
        }
        Commands::Watch {
            page,
            interval_ms,
            polls,
        } => {
            let watcher = build_live_watcher(&config, &options);
            cmd_watch(
                &page,
                watcher,
                Duration::from_millis(interval_ms),
                polls,
                cli.verbose,
            )?;
        }
    }

    Ok(())
}
