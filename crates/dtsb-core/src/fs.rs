//! Filesystem access for a bundling run.
//!
//! All reads happen while the dependency graph is walked; all writes and
//! deletions happen after the output text is complete. The [`FileSystem`]
//! trait lets embedders bundle from memory.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use walkdir::WalkDir;

use crate::error::{BundleError, Result};
use crate::paths::{is_declaration_file, normalize_path};

const UTF8_BOM: char = '\u{FEFF}';

pub trait FileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Every `*.d.ts` file below `base_dir`, as absolute normalized paths in
    /// a deterministic order.
    fn list_declaration_files(&self, base_dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Read a declaration file the way the parser wants it: without a leading
/// byte-order mark and without trailing whitespace.
pub fn read_declaration_source(fs: &dyn FileSystem, path: &Path) -> io::Result<String> {
    let text = fs.read_to_string(path)?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(&text);
    Ok(text.trim_end().to_string())
}

/// Declaration files found under the base directory at the start of a run.
///
/// Only these are wrapped in generated `declare module` blocks; anything else
/// reached during the walk is treated as an external typing.
#[derive(Debug, Clone, Default)]
pub struct SourceTypings {
    files: Vec<PathBuf>,
    lookup: FxHashSet<PathBuf>,
}

impl SourceTypings {
    pub fn discover(fs: &dyn FileSystem, base_dir: &Path) -> Result<Self> {
        let files = fs
            .list_declaration_files(base_dir)
            .map_err(|err| BundleError::io(base_dir, err))?;
        Ok(Self::from_files(files))
    }

    pub fn from_files(files: Vec<PathBuf>) -> Self {
        let lookup = files.iter().cloned().collect();
        Self { files, lookup }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lookup.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFileSystem;

impl FileSystem for NativeFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn list_declaration_files(&self, base_dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(base_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if is_declaration_file(path) {
                files.push(normalize_path(path));
            }
        }

        Ok(files)
    }
}

/// In-memory [`FileSystem`]. Directories exist implicitly.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RefCell<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file.
    pub fn insert(&self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files
            .borrow_mut()
            .insert(normalize_path(path.as_ref()), contents.into());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .borrow()
            .get(&normalize_path(path.as_ref()))
            .cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    )
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.insert(path, contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.files
            .borrow_mut()
            .remove(&normalize_path(path))
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn exists(&self, path: &Path) -> bool {
        let path = normalize_path(path);
        self.files
            .borrow()
            .keys()
            .any(|file| file == &path || file.starts_with(&path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(&normalize_path(path))
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn list_declaration_files(&self, base_dir: &Path) -> io::Result<Vec<PathBuf>> {
        let base_dir = normalize_path(base_dir);
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|path| path.starts_with(&base_dir) && is_declaration_file(path))
            .cloned()
            .collect())
    }
}
