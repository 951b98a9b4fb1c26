//! Dependency graph walk and the export-name map.
//!
//! The walk is breadth-first with an explicit queue and a `seen` set, so
//! cyclic reference directives terminate. It parses everything reachable
//! through references and relative imports, regardless of whether the file
//! ends up in the bundle.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{BundleError, Result};
use crate::fs::{FileSystem, SourceTypings};
use crate::options::ResolvedBundleOptions;
use crate::parser::{FileParser, ParseRecord};

/// Every parsed file of a run, in discovery order.
#[derive(Debug)]
pub struct ParseRegistry {
    records: IndexMap<PathBuf, ParseRecord>,
    main: PathBuf,
    /// Referenced files outside the base directory.
    external_typings: IndexSet<PathBuf>,
}

impl ParseRegistry {
    pub fn main(&self) -> &ParseRecord {
        &self.records[&self.main]
    }

    pub fn main_path(&self) -> &Path {
        &self.main
    }

    pub fn get(&self, path: &Path) -> Option<&ParseRecord> {
        self.records.get(path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut ParseRecord> {
        self.records.get_mut(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.records.contains_key(path)
    }

    pub fn records(&self) -> impl Iterator<Item = &ParseRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn external_typings(&self) -> impl Iterator<Item = &Path> {
        self.external_typings.iter().map(PathBuf::as_path)
    }
}

/// Parse the main file and everything it reaches.
pub fn walk(
    options: &ResolvedBundleOptions,
    fs: &dyn FileSystem,
    sources: &SourceTypings,
) -> Result<ParseRegistry> {
    debug!("### parse files ###");

    let parser = FileParser::new(options, fs, sources);
    let mut records: IndexMap<PathBuf, ParseRecord> = IndexMap::new();
    let mut external_typings = IndexSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::from([options.main_file.clone()]);
    let mut seen: FxHashSet<PathBuf> = FxHashSet::default();

    while let Some(target) = queue.pop_front() {
        if !seen.insert(target.clone()) {
            continue;
        }

        let record = parser.parse(&target)?;
        for reference in &record.references {
            if !sources.contains(reference) {
                external_typings.insert(reference.clone());
            }
        }
        for next in record
            .references
            .iter()
            .chain(record.relative_import_files.iter())
        {
            if !seen.contains(next) && !queue.contains(next) {
                queue.push_back(next.clone());
            }
        }
        records.insert(target, record);
    }

    Ok(ParseRegistry {
        records,
        main: options.main_file.clone(),
        external_typings,
    })
}

/// Ambient module name -> declaring file.
#[derive(Debug, Default)]
pub struct ExportMap {
    owners: IndexMap<String, PathBuf>,
}

impl ExportMap {
    /// Fails when two files declare the same ambient module.
    pub fn build(registry: &ParseRegistry) -> Result<Self> {
        debug!("### map exports ###");

        let mut owners: IndexMap<String, PathBuf> = IndexMap::new();
        for record in registry.records() {
            for name in &record.declared_exports {
                if let Some(first) = owners.get(name) {
                    if first != &record.path {
                        return Err(BundleError::DuplicateExport {
                            name: name.clone(),
                            first: first.clone(),
                            second: record.path.clone(),
                        });
                    }
                    continue;
                }
                debug!(name = %name, file = %record.path.display(), "export");
                owners.insert(name.clone(), record.path.clone());
            }
        }

        Ok(Self { owners })
    }

    pub fn owner(&self, name: &str) -> Option<&Path> {
        self.owners.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
