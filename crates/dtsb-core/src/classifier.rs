//! Line classification for declaration files.
//!
//! Each matcher is a pure function over a single physical line. [`classify`]
//! chains them in priority order; the file parser owns the only state
//! (whether a block comment is open).

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BLOCK_COMMENT_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*\*+/").unwrap());
static BLOCK_COMMENT_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*/\*").unwrap());
static BLOCK_COMMENT_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*+/[ \t]*$").unwrap());
static DOC_COMMENT_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*/\*\*").unwrap());
static DOC_COMMENT_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<sp>[ \t]*)(?P<rest>\*.*)$").unwrap());

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[ \t]*///[ \t]*<reference[ \t]+path=["'](?P<path>[^"']*)["']?[ \t]*/>.*$"#)
        .unwrap()
});
static LINE_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*//").unwrap());
static PRIVATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[ \t]*(?:static )?private (?:static )?").unwrap());
static PUBLIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<sp>[ \t]*)(?P<st>static )?public (?P<rest>.*)$").unwrap());
static DECLARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?P<ex>export )?declare ").unwrap());

// Quote pairs are spelled out as alternatives: the regex crate has no
// backreferences.
static MODULE_DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<lead>[ \t]*declare module )(?:'(?P<sq>[^']+)'|"(?P<dq>[^"]+)")(?P<trail>[ \t]*\{?.*)$"#,
    )
    .unwrap()
});
static REQUIRE_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<lead>[ \t]*(?:export )?(?:import .+? )= require\()(?:'(?P<sq>[^']+)'|"(?P<dq>[^"]+)")(?P<trail>\);.*)$"#,
    )
    .unwrap()
});
static ES_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<lead>[ \t]*(?:export|import)\b.*?\bfrom ?)(?:'(?P<sq>[^' ,]+)'|"(?P<dq>[^" ,]+)")(?P<trail>;.*)$"#,
    )
    .unwrap()
});
static SIDE_EFFECT_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<lead>[ \t]*import ?)(?:'(?P<sq>[^' ,]+)'|"(?P<dq>[^" ,]+)")(?P<trail>;.*)$"#,
    )
    .unwrap()
});

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+(?:[.-]\w+)*$").unwrap());
static PATH_SPECIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[./].*|.:.*)$").unwrap());

/// A line split around a quoted module specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotedSpecifier<'a> {
    pub lead: &'a str,
    pub quote: char,
    pub specifier: &'a str,
    pub trail: &'a str,
}

impl QuotedSpecifier<'_> {
    /// Rebuild the line with a different specifier, keeping quotes and
    /// surrounding text.
    pub fn with_specifier(&self, specifier: &str) -> String {
        format!(
            "{}{}{}{}{}",
            self.lead, self.quote, specifier, self.quote, self.trail
        )
    }
}

fn quoted<'a>(caps: &Captures<'a>) -> Option<QuotedSpecifier<'a>> {
    let lead = caps.name("lead")?.as_str();
    let trail = caps.name("trail")?.as_str();
    let (quote, specifier) = match (caps.name("sq"), caps.name("dq")) {
        (Some(single), _) => ('\'', single.as_str()),
        (None, Some(double)) => ('"', double.as_str()),
        (None, None) => return None,
    };
    Some(QuotedSpecifier {
        lead,
        quote,
        specifier,
        trail,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStyle {
    /// `import x = require('...');`
    Require,
    /// `import ... from '...';` and `export ... from '...';`
    EsModule,
    /// `import '...';`
    SideEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportMatch<'a> {
    pub style: ImportStyle,
    pub spec: QuotedSpecifier<'a>,
}

/// Result of classifying one line, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Closes a block comment.
    BlockCommentEnd,
    /// Opens a block comment; `closes` when it also ends on this line.
    BlockCommentStart { closes: bool },
    /// Inside an open block comment.
    BlockCommentBody,
    Blank,
    /// `/// <reference path="..." />`
    Reference(&'a str),
    LineComment,
    PrivateMember,
    Import(ImportMatch<'a>),
    /// `declare module "name" {`
    ModuleDeclaration(QuotedSpecifier<'a>),
    Code,
}

pub fn classify(line: &str, in_block_comment: bool) -> LineClass<'_> {
    if is_block_comment_end(line) || (in_block_comment && closes_block_comment(line)) {
        return LineClass::BlockCommentEnd;
    }
    if let Some(closes) = match_block_comment_start(line) {
        return LineClass::BlockCommentStart { closes };
    }
    if in_block_comment {
        return LineClass::BlockCommentBody;
    }
    if is_blank(line) {
        return LineClass::Blank;
    }
    if let Some(path) = match_reference(line) {
        return LineClass::Reference(path);
    }
    if is_line_comment(line) {
        return LineClass::LineComment;
    }
    if is_private_member(line) {
        return LineClass::PrivateMember;
    }
    if let Some(import) = match_import(line) {
        return LineClass::Import(import);
    }
    if let Some(declaration) = match_module_declaration(line) {
        return LineClass::ModuleDeclaration(declaration);
    }
    LineClass::Code
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub fn is_block_comment_end(line: &str) -> bool {
    BLOCK_COMMENT_END_RE.is_match(line)
}

/// `Some(closes_on_same_line)` when the line opens a block comment.
pub fn match_block_comment_start(line: &str) -> Option<bool> {
    if BLOCK_COMMENT_START_RE.is_match(line) {
        Some(closes_block_comment(line))
    } else {
        None
    }
}

/// Whether the line ends with a block comment terminator (`... */`).
pub fn closes_block_comment(line: &str) -> bool {
    BLOCK_COMMENT_CLOSE_RE.is_match(line)
}

pub fn is_doc_comment_start(line: &str) -> bool {
    DOC_COMMENT_START_RE.is_match(line)
}

/// Compiler-emitted JSDoc continuation lines are one space short; add it.
pub fn fix_doc_comment_line(line: &str) -> String {
    match DOC_COMMENT_LINE_RE.captures(line) {
        Some(caps) => format!("{} {}", &caps["sp"], &caps["rest"]),
        None => line.to_string(),
    }
}

pub fn match_reference(line: &str) -> Option<&str> {
    REFERENCE_RE
        .captures(line)
        .and_then(|caps| caps.name("path"))
        .map(|path| path.as_str())
}

pub fn is_line_comment(line: &str) -> bool {
    LINE_COMMENT_RE.is_match(line)
}

pub fn is_private_member(line: &str) -> bool {
    PRIVATE_RE.is_match(line)
}

pub fn match_require_import(line: &str) -> Option<QuotedSpecifier<'_>> {
    REQUIRE_IMPORT_RE
        .captures(line)
        .and_then(|caps| quoted(&caps))
}

pub fn match_es_import(line: &str) -> Option<ImportMatch<'_>> {
    if let Some(spec) = ES_IMPORT_RE.captures(line).and_then(|caps| quoted(&caps)) {
        return Some(ImportMatch {
            style: ImportStyle::EsModule,
            spec,
        });
    }
    SIDE_EFFECT_IMPORT_RE
        .captures(line)
        .and_then(|caps| quoted(&caps))
        .map(|spec| ImportMatch {
            style: ImportStyle::SideEffect,
            spec,
        })
}

pub fn match_import(line: &str) -> Option<ImportMatch<'_>> {
    if let Some(spec) = match_require_import(line) {
        return Some(ImportMatch {
            style: ImportStyle::Require,
            spec,
        });
    }
    match_es_import(line)
}

pub fn match_module_declaration(line: &str) -> Option<QuotedSpecifier<'_>> {
    MODULE_DECLARATION_RE
        .captures(line)
        .and_then(|caps| quoted(&caps))
}

/// Drop a leading `public` modifier, keeping `static` and indentation.
pub fn strip_public(line: &str) -> Cow<'_, str> {
    PUBLIC_RE.replace(line, "${sp}${st}${rest}")
}

/// Drop a leading `declare` keyword, keeping a preceding `export`.
pub fn strip_declare(line: &str) -> Cow<'_, str> {
    DECLARE_RE.replace(line, "${ex}")
}

/// Relative, absolute or drive-letter specifier (`./x`, `/x`, `c:x`).
pub fn is_path_specifier(specifier: &str) -> bool {
    PATH_SPECIFIER_RE.is_match(specifier)
}

/// Plain module identifier such as `events` or `some-pkg.core`.
pub fn is_plain_identifier(specifier: &str) -> bool {
    IDENTIFIER_RE.is_match(specifier)
}
