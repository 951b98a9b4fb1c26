//! Indentation detection and normalization.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

/// Detect the dominant indentation unit of `text`.
///
/// Returns `"\t"` when most indented lines start with a tab, otherwise the
/// most common positive step (in spaces) between consecutive non-blank lines.
/// Single-space steps only count when nothing wider was seen, since they are
/// almost always JSDoc continuation lines. `None` when nothing is indented.
pub fn detect_indent(text: &str) -> Option<String> {
    let mut tab_lines = 0usize;
    let mut space_lines = 0usize;
    let mut steps: FxHashMap<usize, usize> = FxHashMap::default();
    let mut previous_width = 0usize;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with('\t') {
            tab_lines += 1;
            continue;
        }

        let width = line.len() - line.trim_start_matches(' ').len();
        if width > 0 {
            space_lines += 1;
        }
        if width > previous_width {
            *steps.entry(width - previous_width).or_default() += 1;
        }
        previous_width = width;
    }

    if tab_lines == 0 && space_lines == 0 {
        return None;
    }
    if tab_lines > space_lines {
        return Some("\t".to_string());
    }

    let pick = |min_width: usize| {
        steps
            .iter()
            .filter(|(width, _)| **width >= min_width)
            .max_by(|(wa, ca), (wb, cb)| ca.cmp(cb).then(wb.cmp(wa)))
            .map(|(width, _)| *width)
    };

    pick(2).or_else(|| pick(1)).map(|width| " ".repeat(width))
}

/// Rewrites leading runs of a file's indentation unit into the output unit.
#[derive(Debug, Clone)]
pub struct Reindenter<'a> {
    actual: &'a str,
    target: &'a str,
}

impl<'a> Reindenter<'a> {
    pub fn new(actual: &'a str, target: &'a str) -> Self {
        Self { actual, target }
    }

    fn is_identity(&self) -> bool {
        self.actual.is_empty() || self.actual == self.target
    }

    /// Only the leading run is rewritten; whitespace after the first other
    /// character is left alone.
    pub fn reindent<'l>(&self, line: &'l str) -> Cow<'l, str> {
        if self.is_identity() {
            return Cow::Borrowed(line);
        }

        let mut rest = line;
        let mut depth = 0usize;
        while let Some(stripped) = rest.strip_prefix(self.actual) {
            rest = stripped;
            depth += 1;
        }

        if depth == 0 {
            return Cow::Borrowed(line);
        }

        let mut out = self.target.repeat(depth);
        out.push_str(rest);
        Cow::Owned(out)
    }
}
