//! Bundles a tree of TypeScript declaration files into a single `.d.ts`.
//!
//! A run goes through fixed phases:
//! - Options resolution (`options`)
//! - Parsing every reachable file into line records (`classifier`, `parser`)
//! - Building the parse registry and export-name map (`graph`)
//! - Deciding what to include (`inclusion`)
//! - Renaming bundled ambient modules (`rewriter`)
//! - Rendering and writing the output (`emitter`, `bundle`)

// Errors
pub mod error;
pub use error::{BundleError, Result};

// Options and their resolution
pub mod options;
pub use options::{
    BundleOptions, ExcludeFilter, HeaderSource, ModuleBodyTransform, NewLineKind,
    ResolvedBundleOptions,
};

// Filesystem collaborator
pub mod fs;
pub use fs::{FileSystem, MemoryFileSystem, NativeFileSystem, SourceTypings};

pub mod paths;

// Indentation detection and normalization
pub mod indent;
pub use indent::{Reindenter, detect_indent};

// Line classification and per-file parsing
pub mod classifier;
pub mod parser;
pub use parser::{FileParser, LineEntry, ParseRecord};

// Graph walk, inclusion, rewriting
pub mod graph;
pub use graph::{ExportMap, ParseRegistry};
pub mod inclusion;
pub use inclusion::{ExternalDependency, Inclusion};
pub mod rewriter;

// Output
pub mod emitter;
pub use emitter::Emitter;

pub mod bundle;
pub use bundle::{BundleResult, bundle, bundle_with};

#[cfg(test)]
#[path = "tests/parser_tests.rs"]
mod parser_tests;

#[cfg(test)]
#[path = "tests/graph_tests.rs"]
mod graph_tests;

#[cfg(test)]
#[path = "tests/inclusion_tests.rs"]
mod inclusion_tests;

#[cfg(test)]
#[path = "tests/emitter_tests.rs"]
mod emitter_tests;
