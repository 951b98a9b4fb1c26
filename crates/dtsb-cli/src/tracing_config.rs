//! Tracing configuration for the dts-bundle binary.
//!
//! Supports three output formats controlled by `DTSB_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`
//! - `json`: One JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Follow every parsed file and rewritten line
//! DTSB_LOG=trace DTSB_LOG_FORMAT=tree dts-bundle --name pkg --main lib/index.d.ts
//!
//! # Only the inclusion decisions
//! DTSB_LOG="dtsb_core::inclusion=debug" dts-bundle --configJson dts-bundle.json
//! ```
//!
//! Without `DTSB_LOG` or `RUST_LOG` only warnings are shown; `--verbose`
//! raises the dts-bundle crates to `debug`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,dtsb_core=debug,dtsb_cli=debug";

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Parse from the `DTSB_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        Self::parse(&std::env::var("DTSB_LOG_FORMAT").unwrap_or_default())
    }
}

/// Directive string used when no filter variable is set.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Build an `EnvFilter` from `DTSB_LOG`, falling back to `RUST_LOG`, then to
/// the defaults.
fn build_filter(verbose: bool) -> EnvFilter {
    if let Ok(val) = std::env::var("DTSB_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::builder().parse_lossy(default_directives(verbose))
    }
}

/// Initialise the global tracing subscriber. All output goes to stderr.
pub fn init_tracing(verbose: bool) {
    let filter = build_filter(verbose);

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
}
