#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use dtsb_cli::args::CliArgs;
use dtsb_cli::config::{load_cli_option_file, merge_bundle_options};
use dtsb_cli::tracing_config::init_tracing;
use tracing::warn;

/// Output was written.
const EXIT_SUCCESS: i32 = 0;
/// The run finished but the output was withheld (a referenced file was missing).
const EXIT_NOT_EMITTED: i32 = 1;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let file = load_cli_option_file(&args, &cwd)?;
    init_tracing(args.verbose || file.verbose.unwrap_or(false));
    let options = merge_bundle_options(&args, file)?;

    let result = dtsb_core::bundle_with(&options, &dtsb_core::NativeFileSystem, &cwd)
        .context("bundling failed")?;

    if !result.emitted {
        warn!(used_files = result.used_files.len(), "output withheld");
        eprintln!(
            "{} result not emitted - use --verbose to see details",
            "dts-bundle:".yellow().bold()
        );
        std::process::exit(EXIT_NOT_EMITTED);
    }

    eprintln!(
        "{} wrote {} ({} files)",
        "dts-bundle:".green().bold(),
        result.output_path.display(),
        result.used_files.len()
    );
    std::process::exit(EXIT_SUCCESS);
}
