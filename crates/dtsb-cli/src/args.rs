use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use dtsb_core::NewLineKind;

/// CLI arguments for the dts-bundle binary.
#[derive(Parser, Debug)]
#[command(
    name = "dts-bundle",
    version,
    about = "Bundle a tree of TypeScript declaration files into a single .d.ts"
)]
pub struct CliArgs {
    /// Path to a JSON option file. Loaded first; command-line options override it.
    #[arg(long = "configJson", alias = "config-json")]
    pub config_json: Option<PathBuf>,

    /// Name of the bundled module, as in package.json.
    #[arg(long)]
    pub name: Option<String>,

    /// Path to the entry declaration file.
    #[arg(long)]
    pub main: Option<PathBuf>,

    /// Directory to discover source declarations in (default: directory of main).
    #[arg(long = "baseDir", alias = "base-dir")]
    pub base_dir: Option<PathBuf>,

    /// Output file, relative to baseDir. A leading `~/` makes it relative to the
    /// current directory.
    #[arg(long)]
    pub out: Option<String>,

    /// Inline typings of bare module imports (e.g. node.d.ts).
    #[arg(long)]
    pub externals: bool,

    /// List omitted external dependencies as reference directives.
    #[arg(long = "referenceExternals", alias = "reference-externals")]
    pub reference_externals: bool,

    /// Regular expression over base-relative paths of dependencies to leave out.
    #[arg(long)]
    pub exclude: Option<String>,

    /// Delete every source declaration under baseDir after writing the bundle.
    #[arg(long = "removeSource", alias = "remove-source")]
    pub remove_source: bool,

    /// Newline style of the output file.
    #[arg(long, value_enum, ignore_case = true)]
    pub newline: Option<NewLineStyle>,

    /// Indentation unit of the output file.
    #[arg(long)]
    pub indent: Option<String>,

    /// Prefix for rewritten module names.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Separator for rewritten module path names.
    #[arg(long)]
    pub separator: Option<String>,

    /// Log every reference, inclusion and exclusion.
    #[arg(long)]
    pub verbose: bool,

    /// Emit even if an included file was not found.
    #[arg(
        long = "emitOnIncludedFileNotFound",
        alias = "emit-on-included-file-not-found",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub emit_on_included_file_not_found: Option<bool>,

    /// Emit even if a file that is not included was not found.
    #[arg(
        long = "emitOnNoIncludedFileNotFound",
        alias = "emit-on-no-included-file-not-found",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub emit_on_no_included_file_not_found: Option<bool>,

    /// File whose contents replace the generated header, or `none` to omit it.
    #[arg(long = "headerPath", alias = "header-path")]
    pub header_path: Option<PathBuf>,

    /// Text that replaces the generated header.
    #[arg(long = "headerText", alias = "header-text")]
    pub header_text: Option<String>,

    /// Accepted for compatibility; has no effect.
    #[arg(
        long = "outputAsModuleFolder",
        alias = "output-as-module-folder",
        hide = true
    )]
    pub output_as_module_folder: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum NewLineStyle {
    /// Line feed only (\\n).
    Unix,
    /// Carriage return followed by line feed (\\r\\n).
    Windows,
    /// Whatever the current platform uses.
    #[value(name = "currentOsDefault", alias = "current-os-default")]
    CurrentOsDefault,
}

impl NewLineStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLineStyle::Unix => NewLineKind::LineFeed.as_str(),
            NewLineStyle::Windows => NewLineKind::CarriageReturnLineFeed.as_str(),
            NewLineStyle::CurrentOsDefault => NewLineKind::platform().as_str(),
        }
    }
}
