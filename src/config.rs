//! Configuration types for drive-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Maximum concurrent directory expansions
const MAX_EXPANDERS: usize = 64;

/// Minimum queue capacity
const MIN_QUEUE_SIZE: usize = 1;

/// Maximum page size accepted by the Drive files.list endpoint
const MAX_PAGE_SIZE: u32 = 1000;

/// Concurrent Google Drive tree walker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "drive-walker",
    version,
    about = "Concurrent Google Drive tree walker",
    long_about = "Walks a Google Drive folder tree through the paginated files.list API,\n\
                  expanding subfolders concurrently and dispatching every discovered\n\
                  file to a bounded worker pool.",
    after_help = "EXAMPLES:\n    \
        drive-walker 1TWHmapjJP0NfMMmCwjK3qNMjws1mncOn\n    \
        drive-walker root -w 32 --expanders 8\n    \
        drive-walker <FOLDER_ID> --exclude 'Archive' --max-depth 4\n    \
        drive-walker <FOLDER_ID> --keep-going -v"
)]
pub struct CliArgs {
    /// ID of the Drive folder to walk ("root" for My Drive)
    #[arg(value_name = "FOLDER_ID", default_value = "root")]
    pub folder_id: String,

    /// Path to the stored OAuth token file
    #[arg(short = 't', long, default_value = "token.json", value_name = "FILE")]
    pub token_file: PathBuf,

    /// Number of concurrent file-processing workers
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Number of directory listings allowed in flight at once
    #[arg(long, default_value = "4", value_name = "NUM")]
    pub expanders: usize,

    /// Directory queue capacity (controls memory usage)
    #[arg(long, default_value = "1024", value_name = "NUM")]
    pub queue_size: usize,

    /// File queue capacity (backpressure on slow processing)
    #[arg(long, default_value = "1024", value_name = "NUM")]
    pub file_queue_size: usize,

    /// Listing page size (entries per files.list call)
    #[arg(long, default_value = "100", value_name = "NUM")]
    pub page_size: u32,

    /// Maximum folder depth (unlimited if not set)
    #[arg(short = 'd', long, value_name = "NUM")]
    pub max_depth: Option<usize>,

    /// Exclude paths matching pattern (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Record listing failures and keep walking instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (show per-directory activity)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    // Listing and processing are network bound, so go wider than the cores
    num_cpus::get() * 2
}

/// Policy applied when a directory listing fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPolicy {
    /// Abort the whole traversal on the first listing failure
    Fatal,
    /// Record the failure, skip the directory, keep walking
    Skip,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Root folder ID to walk
    pub root_id: String,

    /// Stored OAuth token path
    pub token_path: PathBuf,

    /// Number of file-processing workers
    pub worker_count: usize,

    /// Concurrent directory expansions
    pub expand_concurrency: usize,

    /// Directory queue capacity
    pub dir_queue_size: usize,

    /// File queue capacity
    pub file_queue_size: usize,

    /// Listing page size
    pub page_size: u32,

    /// Maximum traversal depth
    pub max_depth: Option<usize>,

    /// Compiled exclude patterns
    pub exclude_patterns: Vec<Regex>,

    /// Listing failure policy
    pub listing_policy: ListingPolicy,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl WalkConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        if args.expanders == 0 || args.expanders > MAX_EXPANDERS {
            return Err(ConfigError::InvalidExpanderCount {
                count: args.expanders,
                max: MAX_EXPANDERS,
            });
        }

        if args.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        if args.file_queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.file_queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        if args.page_size == 0 || args.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize {
                size: args.page_size,
                max: MAX_PAGE_SIZE,
            });
        }

        let exclude_patterns = args
            .exclude_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidExcludePattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let listing_policy = if args.keep_going {
            ListingPolicy::Skip
        } else {
            ListingPolicy::Fatal
        };

        Ok(Self {
            root_id: args.folder_id,
            token_path: args.token_file,
            worker_count: args.workers,
            expand_concurrency: args.expanders,
            dir_queue_size: args.queue_size,
            file_queue_size: args.file_queue_size,
            page_size: args.page_size,
            max_depth: args.max_depth,
            exclude_patterns,
            listing_policy,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_patterns.iter().any(|re| re.is_match(path))
    }
}
