//! Decides which parsed files make it into the bundle.
//!
//! A second breadth-first walk, over parse records this time, starting at the
//! main file. Bare-specifier imports are followed through the export map only
//! when externals are enabled; relative imports are always followed. Either
//! edge stops at the exclusion filter.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::graph::{ExportMap, ParseRegistry};
use crate::options::ResolvedBundleOptions;

/// A dependency left out of the bundle and listed in the header instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternalDependency {
    /// The file declaring the imported module.
    File(PathBuf),
    /// No parsed file declares the imported module.
    Unresolved(String),
}

impl ExternalDependency {
    pub fn display(&self, options: &ResolvedBundleOptions) -> String {
        match self {
            ExternalDependency::File(path) => options.display_relative(path),
            ExternalDependency::Unresolved(name) => name.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Inclusion {
    /// Files to emit, in traversal order.
    pub used: Vec<PathBuf>,
    used_lookup: FxHashSet<PathBuf>,
    /// Files dropped by the exclusion filter.
    pub excluded: IndexSet<PathBuf>,
    /// Externals omitted because externals are disabled (or unresolved).
    pub external_dependencies: IndexSet<ExternalDependency>,
}

impl Inclusion {
    pub fn is_used(&self, path: &Path) -> bool {
        self.used_lookup.contains(path)
    }

    fn mark_used(&mut self, path: &Path) {
        self.used_lookup.insert(path.to_path_buf());
        self.used.push(path.to_path_buf());
    }
}

pub fn resolve_inclusion(
    options: &ResolvedBundleOptions,
    registry: &ParseRegistry,
    exports: &ExportMap,
) -> Inclusion {
    debug!("### determine typings to include ###");

    let mut inclusion = Inclusion::default();
    let mut queue: VecDeque<&Path> = VecDeque::from([registry.main_path()]);
    let mut seen: FxHashSet<&Path> = FxHashSet::default();

    while let Some(path) = queue.pop_front() {
        if !seen.insert(path) {
            continue;
        }
        let Some(record) = registry.get(path) else {
            continue;
        };

        debug!(module = %record.module_name, file = %path.display(), "include");
        inclusion.mark_used(path);

        for name in &record.external_import_names {
            let owner = exports.owner(name);

            if !options.externals {
                debug!(name = %name, "exclude external");
                inclusion.external_dependencies.insert(match owner {
                    Some(owner) => ExternalDependency::File(owner.to_path_buf()),
                    None => ExternalDependency::Unresolved(name.clone()),
                });
                continue;
            }

            let Some(owner) = owner else {
                warn!(name = %name, importer = %path.display(), "no declaration found for external module");
                inclusion
                    .external_dependencies
                    .insert(ExternalDependency::Unresolved(name.clone()));
                continue;
            };

            if options
                .exclude
                .is_excluded(&options.display_relative(owner), true)
            {
                debug!(name = %name, "exclude external filter");
                inclusion.excluded.insert(owner.to_path_buf());
                continue;
            }

            debug!(name = %name, "include external");
            queue.push_back(owner);
        }

        for file in &record.relative_import_files {
            if options
                .exclude
                .is_excluded(&options.display_relative(file), false)
            {
                debug!(file = %file.display(), "exclude internal filter");
                inclusion.excluded.insert(file.clone());
                continue;
            }

            debug!(file = %file.display(), "import relative");
            queue.push_back(file);
        }
    }

    inclusion
}
