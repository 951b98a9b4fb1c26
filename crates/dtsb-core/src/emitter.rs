//! Builds the bundled declaration text.
//!
//! Layout, every piece joined with the configured newline:
//!
//! ```text
//! <header>
//! // Dependencies for this module:
//! //   <dependency>
//!
//! declare module '<exported name>' {
//!     <lines>
//! }
//! ```

use tracing::debug;

use crate::graph::ParseRegistry;
use crate::inclusion::{ExternalDependency, Inclusion};
use crate::indent::Reindenter;
use crate::options::ResolvedBundleOptions;
use crate::parser::ParseRecord;

pub const DEPENDENCIES_COMMENT: &str = "// Dependencies for this module:";

/// Header line written when no custom header is configured.
pub fn generated_header() -> String {
    format!("// Generated by dts-bundle v{}", env!("CARGO_PKG_VERSION"))
}

/// Wrap user-supplied header text in a block comment.
pub fn block_comment_header(text: &str) -> String {
    format!("/*{text}*/")
}

/// `/// <reference ... />` for an omitted dependency: a path for files, a
/// types reference for unresolved module names.
pub fn format_reference(options: &ResolvedBundleOptions, dependency: &ExternalDependency) -> String {
    match dependency {
        ExternalDependency::File(_) => {
            format!("/// <reference path=\"{}\" />", dependency.display(options))
        }
        ExternalDependency::Unresolved(name) => format!("/// <reference types=\"{name}\" />"),
    }
}

pub struct Emitter<'a> {
    options: &'a ResolvedBundleOptions,
    registry: &'a ParseRegistry,
    inclusion: &'a Inclusion,
}

impl<'a> Emitter<'a> {
    pub fn new(
        options: &'a ResolvedBundleOptions,
        registry: &'a ParseRegistry,
        inclusion: &'a Inclusion,
    ) -> Self {
        Self {
            options,
            registry,
            inclusion,
        }
    }

    /// Render the whole output. `header` is the first line(s) without a
    /// trailing newline, or `None` to omit it.
    pub fn emit(&self, header: Option<&str>) -> String {
        debug!("### build output ###");

        let nl = self.options.newline.as_str();
        let mut content = String::new();

        if let Some(header) = header {
            content.push_str(header);
            content.push_str(nl);
        }

        if !self.inclusion.external_dependencies.is_empty() {
            content.push_str(DEPENDENCIES_COMMENT);
            content.push_str(nl);
            for dependency in &self.inclusion.external_dependencies {
                if self.options.reference_externals {
                    content.push_str(&format_reference(self.options, dependency));
                } else {
                    content.push_str("//   ");
                    content.push_str(&dependency.display(self.options));
                }
                content.push_str(nl);
            }
        }

        content.push_str(nl);

        let blocks: Vec<String> = self
            .inclusion
            .used
            .iter()
            .filter_map(|path| self.registry.get(path))
            .map(|record| self.emit_record(record))
            .collect();
        content.push_str(&blocks.join(nl));
        content.push_str(nl);

        content
    }

    fn emit_record(&self, record: &ParseRecord) -> String {
        let nl = self.options.newline.as_str();
        let reindenter = Reindenter::new(&record.detected_indent, &self.options.indent);
        let lines: Vec<String> = record
            .lines
            .iter()
            .map(|line| reindenter.reindent(line.text()).into_owned())
            .collect();

        if record.is_source {
            self.format_module(&record.exported_name, &lines)
        } else {
            let mut out = lines.join(nl);
            out.push_str(nl);
            out
        }
    }

    fn format_module(&self, exported_name: &str, lines: &[String]) -> String {
        let nl = self.options.newline.as_str();
        let indent = self.options.indent.as_str();

        let body = if lines.is_empty() {
            String::new()
        } else {
            let separator = format!("{nl}{indent}");
            format!("{indent}{}", lines.join(separator.as_str()))
        };
        let body = match &self.options.transform_module_body {
            Some(transform) => transform(exported_name, &body),
            None => body,
        };

        format!("declare module '{exported_name}' {{{nl}{body}{nl}}}{nl}")
    }
}
