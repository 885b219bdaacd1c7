//! drive-walker - Concurrent Google Drive Tree Walker
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use drive_walker::config::{CliArgs, WalkConfig};
use drive_walker::drive::{auth, DriveClient, Node};
use drive_walker::engine::{NoopProcessor, Traversal};
use drive_walker::progress::{print_header, print_summary, ProgressReporter};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(
            &config.root_id,
            config.worker_count,
            config.expand_concurrency,
        );
    }

    let token = auth::load_token(&config.token_path).context("Failed to load token")?;
    let client = Arc::new(DriveClient::new(token.access_token, config.page_size));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime.block_on(run_inner(config, client))
}

async fn run_inner(config: WalkConfig, client: Arc<DriveClient>) -> Result<()> {
    let config = Arc::new(config);
    let traversal = Traversal::new(Arc::clone(&config), client, Arc::new(NoopProcessor));

    // Graceful shutdown on Ctrl-C
    let shutdown_flag = traversal.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    // Progress reporter thread reads the shared atomic counters
    let progress = if config.show_progress {
        let reporter = Arc::new(ProgressReporter::new());
        let stats = traversal.stats();
        let stop = traversal.shutdown_flag();
        let start = Instant::now();

        let handle = {
            let reporter = Arc::clone(&reporter);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    reporter.update(&stats.snapshot(start.elapsed()));
                    std::thread::sleep(Duration::from_millis(100));
                }
            })
        };
        Some((reporter, handle))
    } else {
        None
    };

    let root = Node::root(&config.root_id);
    let result = traversal.run(root).await;

    // Stop the reporter before printing anything
    traversal.shutdown_flag().store(true, Ordering::SeqCst);
    if let Some((reporter, handle)) = progress {
        let _ = handle.join();
        match &result {
            Ok(report) if report.completed => reporter.finish("Traversal completed"),
            Ok(_) => reporter.finish("Traversal interrupted"),
            Err(_) => reporter.finish("Traversal failed"),
        }
    }

    let report = result.context("Traversal failed")?;

    print_summary(
        report.dirs_expanded,
        report.files_found,
        report.files_processed,
        report.bytes_found,
        (report.listing_failures.len() + report.process_failures.len()) as u64,
        report.duration,
    );

    if !report.completed {
        info!("Traversal was interrupted before completion");
    }

    for failure in &report.listing_failures {
        info!(path = %failure.path, error = %failure.error, "Folder skipped");
    }
    for failure in &report.process_failures {
        info!(path = %failure.path, error = %failure.error, "File failed");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("drive_walker=debug,warn")
    } else {
        EnvFilter::new("drive_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
