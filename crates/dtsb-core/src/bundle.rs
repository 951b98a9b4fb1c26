//! The bundle entry operation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::emitter::{Emitter, block_comment_header, generated_header};
use crate::error::{BundleError, Result};
use crate::fs::{FileSystem, NativeFileSystem, SourceTypings};
use crate::graph::{ExportMap, ParseRegistry, walk};
use crate::inclusion::{Inclusion, resolve_inclusion};
use crate::options::{BundleOptions, HeaderSource, ResolvedBundleOptions};
use crate::paths::is_declaration_file;
use crate::rewriter::rewrite_external_names;

/// Outcome of a bundling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleResult {
    /// Whether the output file was written.
    pub emitted: bool,
    pub output_path: PathBuf,
    /// The rendered bundle, also when it was not written.
    pub content: String,
    /// Included files in emission order.
    pub used_files: Vec<PathBuf>,
    pub excluded_files: Vec<PathBuf>,
    /// Dependencies listed in the header, as written there.
    pub external_dependencies: Vec<String>,
    /// Referenced or imported files that do not exist.
    pub missing_files: Vec<PathBuf>,
}

/// Bundle on the native filesystem, resolving relative paths against the
/// current directory.
pub fn bundle(options: &BundleOptions) -> Result<BundleResult> {
    let cwd = std::env::current_dir().map_err(|err| BundleError::io(".", err))?;
    bundle_with(options, &NativeFileSystem, &cwd)
}

pub fn bundle_with(
    options: &BundleOptions,
    fs: &dyn FileSystem,
    cwd: &Path,
) -> Result<BundleResult> {
    let options = options.resolve(cwd)?;
    debug!(?options, "resolved options");

    if !fs.is_file(&options.main_file) {
        return Err(BundleError::MainNotFound(options.main_file.clone()));
    }
    let header = load_header(&options, fs)?;

    let sources = SourceTypings::discover(fs, &options.base_dir)?;
    debug!(count = sources.len(), base_dir = %options.base_dir.display(), "source typings");

    let mut registry = walk(&options, fs, &sources)?;
    let exports = ExportMap::build(&registry)?;
    let inclusion = resolve_inclusion(&options, &registry, &exports);
    rewrite_external_names(&options, &mut registry, &exports, &inclusion);

    let content = Emitter::new(&options, &registry, &inclusion).emit(header.as_deref());

    let missing_files = report_missing_files(&registry, &inclusion);
    let emitted = should_emit(&options, &registry, &inclusion);

    if emitted {
        write_output(&options, fs, &content)?;
        if options.remove_source {
            remove_sources(&options, fs, &sources)?;
        }
    } else {
        warn!(out = %options.out_file.display(), "not emitting output: a referenced file was not found");
    }

    if options.verbose {
        log_statistics(&options, &registry, &sources, &inclusion);
    }
    debug!("### done ###");

    Ok(BundleResult {
        emitted,
        output_path: options.out_file.clone(),
        content,
        used_files: inclusion.used.clone(),
        excluded_files: inclusion.excluded.iter().cloned().collect(),
        external_dependencies: inclusion
            .external_dependencies
            .iter()
            .map(|dependency| dependency.display(&options))
            .collect(),
        missing_files,
    })
}

fn load_header(options: &ResolvedBundleOptions, fs: &dyn FileSystem) -> Result<Option<String>> {
    Ok(match &options.header {
        HeaderSource::Generated => Some(generated_header()),
        HeaderSource::Suppressed => None,
        HeaderSource::Text(text) => Some(block_comment_header(text)),
        HeaderSource::File(path) => {
            let text = fs
                .read_to_string(path)
                .map_err(|source| BundleError::Header {
                    path: path.clone(),
                    source,
                })?;
            Some(block_comment_header(&text))
        }
    })
}

fn report_missing_files(registry: &ParseRegistry, inclusion: &Inclusion) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    for record in registry.records().filter(|record| !record.file_exists) {
        if inclusion.is_used(&record.path) {
            warn!(file = %record.path.display(), "included file not found");
        } else {
            trace!(file = %record.path.display(), "unused file not found");
        }
        missing.push(record.path.clone());
    }
    missing
}

fn should_emit(
    options: &ResolvedBundleOptions,
    registry: &ParseRegistry,
    inclusion: &Inclusion,
) -> bool {
    let (mut included_missing, mut unused_missing) = (false, false);
    for record in registry.records().filter(|record| !record.file_exists) {
        if inclusion.is_used(&record.path) {
            included_missing = true;
        } else {
            unused_missing = true;
        }
    }

    !(included_missing && !options.emit_on_included_file_not_found
        || unused_missing && !options.emit_on_no_included_file_not_found)
}

fn write_output(options: &ResolvedBundleOptions, fs: &dyn FileSystem, content: &str) -> Result<()> {
    debug!(out = %options.out_file.display(), "### write output ###");

    if let Some(dir) = options.out_file.parent()
        && !fs.exists(dir)
    {
        fs.create_dir_all(dir)
            .map_err(|err| BundleError::io(dir, err))?;
    }
    fs.write(&options.out_file, content)
        .map_err(|err| BundleError::io(&options.out_file, err))
}

/// Delete every source typing except the freshly written output.
fn remove_sources(
    options: &ResolvedBundleOptions,
    fs: &dyn FileSystem,
    sources: &SourceTypings,
) -> Result<()> {
    debug!("### remove source typings ###");

    for path in sources.iter() {
        if path == options.out_file || !is_declaration_file(path) || !fs.is_file(path) {
            continue;
        }
        trace!(file = %path.display(), "remove");
        fs.remove_file(path)
            .map_err(|err| BundleError::io(path, err))?;
    }
    Ok(())
}

fn log_statistics(
    options: &ResolvedBundleOptions,
    registry: &ParseRegistry,
    sources: &SourceTypings,
    inclusion: &Inclusion,
) {
    let rel = |path: &Path| options.display_relative(path);

    for path in sources.iter() {
        if inclusion.is_used(path) {
            info!(file = %rel(path), "used source typing");
        } else {
            info!(file = %rel(path), "unused source typing");
        }
    }
    for path in &inclusion.excluded {
        info!(file = %rel(path), "excluded typing");
    }
    for path in registry.external_typings() {
        if inclusion.is_used(path) {
            info!(file = %rel(path), "used external typing");
        } else {
            info!(file = %rel(path), "unused external typing");
        }
    }
    for dependency in &inclusion.external_dependencies {
        info!(dependency = %dependency.display(options), "external dependency");
    }
    info!(
        parsed = registry.len(),
        used = inclusion.used.len(),
        excluded = inclusion.excluded.len(),
        external_dependencies = inclusion.external_dependencies.len(),
        "bundle statistics"
    );
}
