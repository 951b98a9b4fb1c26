//! Per-file parsing into a line-level model.
//!
//! A [`ParseRecord`] keeps every emitted line as a [`LineEntry`] holding the
//! original text and an optional rewrite. Lines whose module specifier may be
//! renamed later are listed by index in `import_refs` / `declaration_refs`,
//! so the name rewriter edits one entry and the emitter sees the change.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::classifier::{
    ImportMatch, ImportStyle, LineClass, QuotedSpecifier, classify, fix_doc_comment_line,
    is_doc_comment_start, is_path_specifier, strip_declare, strip_public,
};
use crate::error::{BundleError, Result};
use crate::fs::{FileSystem, SourceTypings, read_declaration_source};
use crate::indent::detect_indent;
use crate::options::ResolvedBundleOptions;
use crate::paths::{absolutize, with_dts_suffix};

const DIRECTORY_INDEX: &str = "index.d.ts";

/// One output line. Rewrites never discard the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEntry {
    pub original: String,
    pub rewritten: Option<String>,
}

impl LineEntry {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            rewritten: None,
        }
    }

    pub fn rewritten(original: impl Into<String>, rewritten: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            rewritten: Some(rewritten.into()),
        }
    }

    /// Text to emit: the rewrite if there is one.
    pub fn text(&self) -> &str {
        self.rewritten.as_deref().unwrap_or(&self.original)
    }
}

#[derive(Debug, Clone)]
pub struct ParseRecord {
    pub path: PathBuf,
    /// Base-relative module name without `.d.ts`.
    pub module_name: String,
    /// Name the file is addressed by inside the bundle.
    pub exported_name: String,
    pub detected_indent: String,
    /// Files pulled in through `/// <reference path>` directives.
    pub references: IndexSet<PathBuf>,
    /// Bare module specifiers (`import x = require('events')`).
    pub external_import_names: IndexSet<String>,
    /// Files imported through relative specifiers.
    pub relative_import_files: IndexSet<PathBuf>,
    /// Ambient modules declared here (`declare module "x" {`).
    pub declared_exports: IndexSet<String>,
    pub lines: Vec<LineEntry>,
    /// Indices into `lines` of bare-specifier imports eligible for renaming.
    pub import_refs: Vec<usize>,
    /// Indices into `lines` of ambient module declarations eligible for renaming.
    pub declaration_refs: Vec<usize>,
    pub file_exists: bool,
    /// Found under the base directory (wrapped in its own module block).
    pub is_source: bool,
}

impl ParseRecord {
    fn empty(path: &Path, options: &ResolvedBundleOptions, is_source: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            module_name: options.module_name(path),
            exported_name: options.exported_name(path),
            detected_indent: options.indent.clone(),
            references: IndexSet::new(),
            external_import_names: IndexSet::new(),
            relative_import_files: IndexSet::new(),
            declared_exports: IndexSet::new(),
            lines: Vec::new(),
            import_refs: Vec::new(),
            declaration_refs: Vec::new(),
            file_exists: true,
            is_source,
        }
    }

    fn push_line(&mut self, entry: LineEntry) -> usize {
        self.lines.push(entry);
        self.lines.len() - 1
    }
}

/// Parses declaration files for one run.
pub struct FileParser<'a> {
    options: &'a ResolvedBundleOptions,
    fs: &'a dyn FileSystem,
    sources: &'a SourceTypings,
}

impl<'a> FileParser<'a> {
    pub fn new(
        options: &'a ResolvedBundleOptions,
        fs: &'a dyn FileSystem,
        sources: &'a SourceTypings,
    ) -> Self {
        Self {
            options,
            fs,
            sources,
        }
    }

    /// Parse `file`. A missing file yields an empty record with
    /// `file_exists == false`; other read failures are errors.
    pub fn parse(&self, file: &Path) -> Result<ParseRecord> {
        let mut record = ParseRecord::empty(file, self.options, self.sources.contains(file));
        debug!(module = %record.module_name, file = %file.display(), "parse");

        if !self.fs.is_file(file) {
            debug!(file = %file.display(), "file not found");
            record.file_exists = false;
            return Ok(record);
        }

        let code =
            read_declaration_source(self.fs, file).map_err(|err| BundleError::io(file, err))?;
        if let Some(indent) = detect_indent(&code) {
            record.detected_indent = indent;
        }

        let dir = file.parent().unwrap_or_else(|| Path::new(""));
        let mut state = CommentState::default();

        for line in code.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.parse_line(&mut record, &mut state, dir, line);
        }

        Ok(record)
    }

    fn parse_line(&self, record: &mut ParseRecord, state: &mut CommentState, dir: &Path, line: &str) {
        match classify(line, state.in_block) {
            LineClass::BlockCommentEnd => {
                state.block.push(line.to_string());
                state.close_block();
            }
            LineClass::BlockCommentStart { closes } => {
                state.block.push(line.to_string());
                state.in_block = true;
                if closes {
                    state.close_block();
                }
            }
            LineClass::BlockCommentBody => state.block.push(line.to_string()),
            LineClass::Blank => {
                record.push_line(LineEntry::new(""));
            }
            LineClass::Reference(target) => {
                let target = absolutize(dir, Path::new(target));
                if self.sources.contains(&target) {
                    trace!(reference = %target.display(), "reference source typing");
                } else {
                    trace!(reference = %target.display(), "reference external typing");
                }
                record.references.insert(target);
            }
            LineClass::LineComment => {}
            LineClass::PrivateMember => {
                state.queued_doc = None;
            }
            LineClass::Import(import) => {
                state.flush_doc(record);
                self.parse_import(record, dir, line, import);
            }
            LineClass::ModuleDeclaration(declaration) => {
                state.flush_doc(record);
                self.parse_module_declaration(record, line, declaration);
            }
            LineClass::Code => {
                state.flush_doc(record);
                let line = strip_public(line);
                let line = if record.is_source {
                    strip_declare(&line).into_owned()
                } else {
                    line.into_owned()
                };
                record.push_line(LineEntry::new(line));
            }
        }
    }

    fn parse_import(&self, record: &mut ParseRecord, dir: &Path, line: &str, import: ImportMatch<'_>) {
        let specifier = import.spec.specifier;

        if !is_path_specifier(specifier) {
            trace!(specifier, "import external");
            record.external_import_names.insert(specifier.to_string());
            let index = record.push_line(LineEntry::new(line));
            if self.options.externals {
                record.import_refs.push(index);
            }
            return;
        }

        let target = self.resolve_relative(dir, specifier);
        if import.style == ImportStyle::SideEffect && !self.fs.is_file(&target) {
            // `import './styles.css';` and friends have no typings to follow.
            trace!(specifier, "side-effect import without typings");
            record.push_line(LineEntry::new(line));
            return;
        }

        let exported_name = self.options.exported_name(&target);
        trace!(specifier, target = %target.display(), exported_name = %exported_name, "import relative");
        record.push_line(LineEntry::rewritten(
            line,
            import.spec.with_specifier(&exported_name),
        ));
        record.relative_import_files.insert(target);
    }

    /// `./lib/helper` resolves to `./lib/helper.d.ts`, falling back to
    /// `./lib/helper/index.d.ts` when only the directory index exists.
    fn resolve_relative(&self, dir: &Path, specifier: &str) -> PathBuf {
        let base = absolutize(dir, Path::new(specifier));
        let file = with_dts_suffix(&base);
        if !self.fs.is_file(&file) {
            let index = base.join(DIRECTORY_INDEX);
            if self.fs.is_file(&index) {
                return index;
            }
        }
        file
    }

    fn parse_module_declaration(
        &self,
        record: &mut ParseRecord,
        line: &str,
        declaration: QuotedSpecifier<'_>,
    ) {
        trace!(module = declaration.specifier, "declare");
        record
            .declared_exports
            .insert(declaration.specifier.to_string());

        let entry = if record.is_source {
            LineEntry::rewritten(line, strip_declare(line))
        } else {
            LineEntry::new(line)
        };
        let index = record.push_line(entry);
        if self.options.externals {
            record.declaration_refs.push(index);
        }
    }
}

/// Block comment buffering. Doc comments are held until the next line of
/// code and dropped if that line is a private member.
#[derive(Debug, Default)]
struct CommentState {
    in_block: bool,
    block: Vec<String>,
    queued_doc: Option<Vec<String>>,
}

impl CommentState {
    fn close_block(&mut self) {
        let block = std::mem::take(&mut self.block);
        if block.first().is_some_and(|first| is_doc_comment_start(first)) {
            self.queued_doc = Some(block);
        }
        self.in_block = false;
    }

    fn flush_doc(&mut self, record: &mut ParseRecord) {
        if let Some(doc) = self.queued_doc.take() {
            for line in doc {
                record.push_line(LineEntry::new(fix_doc_comment_line(&line)));
            }
        }
    }
}
