//! Renames bundled ambient modules to library-unique names.
//!
//! Runs over the included records only and touches nothing but the
//! `rewritten` half of the lines listed in `declaration_refs` and
//! `import_refs`. Every rewrite is recomputed from the original text, so
//! running it twice gives the same result.

use tracing::{debug, trace};

use crate::classifier::{is_plain_identifier, match_import, match_module_declaration, strip_declare};
use crate::graph::{ExportMap, ParseRegistry};
use crate::inclusion::Inclusion;
use crate::options::ResolvedBundleOptions;
use crate::parser::ParseRecord;

pub fn rewrite_external_names(
    options: &ResolvedBundleOptions,
    registry: &mut ParseRegistry,
    exports: &ExportMap,
    inclusion: &Inclusion,
) {
    debug!("### rewrite global external modules ###");

    for path in &inclusion.used {
        let Some(record) = registry.get_mut(path) else {
            continue;
        };
        debug!(module = %record.module_name, "rewrite");
        rewrite_declarations(options, record);
        rewrite_imports(options, record, exports, inclusion);
    }
}

fn rewrite_declarations(options: &ResolvedBundleOptions, record: &mut ParseRecord) {
    for &index in &record.declaration_refs {
        let entry = &mut record.lines[index];
        let Some(declaration) = match_module_declaration(&entry.original) else {
            continue;
        };
        if !is_plain_identifier(declaration.specifier) {
            continue;
        }

        let renamed = declaration.with_specifier(&options.library_name(declaration.specifier));
        let renamed = if record.is_source {
            strip_declare(&renamed).into_owned()
        } else {
            renamed
        };
        trace!(original = %entry.original, rewritten = %renamed, "declaration");
        entry.rewritten = Some(renamed);
    }
}

fn rewrite_imports(
    options: &ResolvedBundleOptions,
    record: &mut ParseRecord,
    exports: &ExportMap,
    inclusion: &Inclusion,
) {
    for &index in &record.import_refs {
        let entry = &mut record.lines[index];
        let Some(import) = match_import(&entry.original) else {
            continue;
        };
        let specifier = import.spec.specifier;
        if !is_plain_identifier(specifier) {
            continue;
        }
        // Only point at generated names that have a block in the output.
        if !exports
            .owner(specifier)
            .is_some_and(|owner| inclusion.is_used(owner))
        {
            trace!(specifier, "import left as is");
            continue;
        }

        let renamed = import.spec.with_specifier(&options.library_name(specifier));
        trace!(original = %entry.original, rewritten = %renamed, "import");
        entry.rewritten = Some(renamed);
    }
}
