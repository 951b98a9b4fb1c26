//! Bundle options and their resolution.
//!
//! [`BundleOptions`] is what callers fill in; every field is optional.
//! [`BundleOptions::resolve`] validates it and applies defaults, producing the
//! immutable [`ResolvedBundleOptions`] the rest of the run reads from.

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::Arc;

use globset::GlobMatcher;
use regex::Regex;

use crate::error::{BundleError, Result};
use crate::paths::{absolutize, normalize_path, relative_path, strip_dts_suffix, to_slash};

pub const DEFAULT_INDENT: &str = "    ";
pub const DEFAULT_PREFIX: &str = "__";
pub const DEFAULT_SEPARATOR: &str = "/";

/// Header path value that suppresses the generated header.
pub const NO_HEADER: &str = "none";

/// Hook applied to the body of each generated `declare module` block.
/// Receives the block's module name and its indented body.
pub type ModuleBodyTransform = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewLineKind {
    #[default]
    LineFeed,
    CarriageReturnLineFeed,
}

impl NewLineKind {
    pub fn platform() -> Self {
        if cfg!(windows) {
            NewLineKind::CarriageReturnLineFeed
        } else {
            NewLineKind::LineFeed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NewLineKind::LineFeed => "\n",
            NewLineKind::CarriageReturnLineFeed => "\r\n",
        }
    }
}

/// Decides which dependencies are left out of the bundle.
///
/// Filters see the dependency path relative to the base directory (with `/`
/// separators) and whether it was reached through a bare module import.
#[derive(Clone, Default)]
pub enum ExcludeFilter {
    #[default]
    None,
    Regex(Regex),
    Glob(GlobMatcher),
    Func(Arc<dyn Fn(&str, bool) -> bool + Send + Sync>),
}

impl ExcludeFilter {
    pub fn func(f: impl Fn(&str, bool) -> bool + Send + Sync + 'static) -> Self {
        ExcludeFilter::Func(Arc::new(f))
    }

    pub fn is_excluded(&self, relative_path: &str, is_external: bool) -> bool {
        match self {
            ExcludeFilter::None => false,
            ExcludeFilter::Regex(regex) => regex.is_match(relative_path),
            ExcludeFilter::Glob(glob) => glob.is_match(relative_path),
            ExcludeFilter::Func(f) => f(relative_path, is_external),
        }
    }
}

impl fmt::Debug for ExcludeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExcludeFilter::None => f.write_str("None"),
            ExcludeFilter::Regex(regex) => write!(f, "Regex({})", regex.as_str()),
            ExcludeFilter::Glob(glob) => write!(f, "Glob({})", glob.glob()),
            ExcludeFilter::Func(_) => f.write_str("Func(..)"),
        }
    }
}

#[derive(Clone, Default)]
pub struct BundleOptions {
    /// Entry declaration file.
    pub main: Option<PathBuf>,
    /// Name of the bundled root module.
    pub name: Option<String>,
    pub base_dir: Option<PathBuf>,
    /// Output path; relative to `base_dir`, or to the working directory when
    /// it starts with `~/`.
    pub out: Option<String>,
    pub newline: Option<String>,
    pub indent: Option<String>,
    pub prefix: Option<String>,
    pub separator: Option<String>,
    /// Inline declarations of bare-specifier imports.
    pub externals: Option<bool>,
    pub exclude: ExcludeFilter,
    /// Delete the source typings after the bundle is written.
    pub remove_source: Option<bool>,
    /// List external dependencies as reference directives instead of comments.
    pub reference_externals: Option<bool>,
    pub verbose: Option<bool>,
    pub emit_on_included_file_not_found: Option<bool>,
    pub emit_on_no_included_file_not_found: Option<bool>,
    pub header_path: Option<PathBuf>,
    pub header_text: Option<String>,
    pub transform_module_body: Option<ModuleBodyTransform>,
}

impl fmt::Debug for BundleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleOptions")
            .field("main", &self.main)
            .field("name", &self.name)
            .field("base_dir", &self.base_dir)
            .field("out", &self.out)
            .field("newline", &self.newline)
            .field("indent", &self.indent)
            .field("prefix", &self.prefix)
            .field("separator", &self.separator)
            .field("externals", &self.externals)
            .field("exclude", &self.exclude)
            .field("remove_source", &self.remove_source)
            .field("reference_externals", &self.reference_externals)
            .field("verbose", &self.verbose)
            .field(
                "emit_on_included_file_not_found",
                &self.emit_on_included_file_not_found,
            )
            .field(
                "emit_on_no_included_file_not_found",
                &self.emit_on_no_included_file_not_found,
            )
            .field("header_path", &self.header_path)
            .field("header_text", &self.header_text)
            .field(
                "transform_module_body",
                &self.transform_module_body.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

impl BundleOptions {
    pub fn new(main: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            main: Some(main.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Validate and apply defaults. Relative paths resolve against `cwd`.
    pub fn resolve(&self, cwd: &Path) -> Result<ResolvedBundleOptions> {
        let main = self
            .main
            .as_deref()
            .filter(|main| !main.as_os_str().is_empty())
            .ok_or(BundleError::MissingOption("main"))?;
        let name = self
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(BundleError::MissingOption("name"))?;

        let separator = self
            .separator
            .clone()
            .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
        if separator.is_empty() {
            return Err(BundleError::InvalidOption {
                name: "separator",
                reason: "must have non-zero length".to_string(),
            });
        }

        let main_file = absolutize(cwd, main);
        let base_dir = match &self.base_dir {
            Some(dir) => absolutize(cwd, dir),
            None => main_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.to_path_buf()),
        };

        let out = self
            .out
            .clone()
            .unwrap_or_else(|| format!("{name}.d.ts"));
        let out_file = resolve_out_file(&out, &base_dir, cwd);

        Ok(ResolvedBundleOptions {
            main_file,
            name: name.to_string(),
            base_dir,
            out_file,
            newline: self
                .newline
                .clone()
                .unwrap_or_else(|| NewLineKind::platform().as_str().to_string()),
            indent: self
                .indent
                .clone()
                .unwrap_or_else(|| DEFAULT_INDENT.to_string()),
            prefix: self
                .prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            separator,
            externals: self.externals.unwrap_or(false),
            exclude: self.exclude.clone(),
            remove_source: self.remove_source.unwrap_or(false),
            reference_externals: self.reference_externals.unwrap_or(false),
            verbose: self.verbose.unwrap_or(false),
            emit_on_included_file_not_found: self.emit_on_included_file_not_found.unwrap_or(true),
            emit_on_no_included_file_not_found: self
                .emit_on_no_included_file_not_found
                .unwrap_or(true),
            header: resolve_header(self.header_path.as_deref(), self.header_text.as_deref(), cwd),
            transform_module_body: self.transform_module_body.clone(),
        })
    }
}

/// Where the output header comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderSource {
    /// `// Generated by dts-bundle v<version>`
    Generated,
    Suppressed,
    /// Wrapped in a block comment.
    Text(String),
    /// File contents wrapped in a block comment.
    File(PathBuf),
}

fn resolve_header(path: Option<&Path>, text: Option<&str>, cwd: &Path) -> HeaderSource {
    match (path, text) {
        (Some(path), _) if path == Path::new(NO_HEADER) => HeaderSource::Suppressed,
        (Some(path), _) => HeaderSource::File(absolutize(cwd, path)),
        (None, Some(text)) => HeaderSource::Text(text.to_string()),
        (None, None) => HeaderSource::Generated,
    }
}

fn resolve_out_file(out: &str, base_dir: &Path, cwd: &Path) -> PathBuf {
    let out = out.replace('/', &MAIN_SEPARATOR.to_string());
    let home_relative = format!("~{MAIN_SEPARATOR}");
    match out.strip_prefix(&home_relative) {
        Some(rest) => absolutize(cwd, Path::new(rest)),
        None => normalize_path(&base_dir.join(out)),
    }
}

/// Fully resolved options for one run. Paths are absolute and normalized.
#[derive(Clone)]
pub struct ResolvedBundleOptions {
    pub main_file: PathBuf,
    pub name: String,
    pub base_dir: PathBuf,
    pub out_file: PathBuf,
    pub newline: String,
    pub indent: String,
    pub prefix: String,
    pub separator: String,
    pub externals: bool,
    pub exclude: ExcludeFilter,
    pub remove_source: bool,
    pub reference_externals: bool,
    pub verbose: bool,
    pub emit_on_included_file_not_found: bool,
    pub emit_on_no_included_file_not_found: bool,
    pub header: HeaderSource,
    pub transform_module_body: Option<ModuleBodyTransform>,
}

impl fmt::Debug for ResolvedBundleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedBundleOptions")
            .field("main_file", &self.main_file)
            .field("name", &self.name)
            .field("base_dir", &self.base_dir)
            .field("out_file", &self.out_file)
            .field("newline", &self.newline)
            .field("indent", &self.indent)
            .field("prefix", &self.prefix)
            .field("separator", &self.separator)
            .field("externals", &self.externals)
            .field("exclude", &self.exclude)
            .field("remove_source", &self.remove_source)
            .field("reference_externals", &self.reference_externals)
            .field("verbose", &self.verbose)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

impl ResolvedBundleOptions {
    /// Module name derived from position: the path relative to the base
    /// directory without the `.d.ts` suffix.
    pub fn module_name(&self, file: &Path) -> String {
        let stem = strip_dts_suffix(file);
        to_slash(&relative_path(&self.base_dir, &stem))
    }

    /// Name a file's contents are addressed by in the bundle: the root name
    /// for the entry file, a prefixed position-derived name otherwise.
    pub fn exported_name(&self, file: &Path) -> String {
        if file == self.main_file {
            return self.name.clone();
        }
        self.exported_name_raw(file)
    }

    fn exported_name_raw(&self, file: &Path) -> String {
        let module_name = self
            .module_name(file)
            .replace("..", "--")
            .replace('/', &self.separator);
        format!(
            "{}{}{}{}",
            self.prefix, self.name, self.separator, module_name
        )
    }

    /// Generated name for an ambient external module pulled into the bundle.
    /// Position-derived names never contain `<separator><prefix><separator>`
    /// right after the root, so these cannot collide with them.
    pub fn library_name(&self, identifier: &str) -> String {
        format!(
            "{prefix}{root}{sep}{prefix}{sep}{identifier}",
            prefix = self.prefix,
            root = self.name,
            sep = self.separator,
        )
    }

    /// Path relative to the base directory with `/` separators, as handed to
    /// exclusion filters and written into the header.
    pub fn display_relative(&self, file: &Path) -> String {
        to_slash(&relative_path(&self.base_dir, file))
    }
}
