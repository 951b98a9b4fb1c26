//! Lexical path helpers.
//!
//! File identities are absolute, lexically normalized paths. Nothing here
//! touches the filesystem, so a reference to a missing file still gets a
//! stable identity.

use std::path::{Component, Path, PathBuf};

pub const DTS_SUFFIX: &str = ".d.ts";

/// Remove `.` segments and fold `..` segments into their parent.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::RootDir | Component::Normal(_) | Component::Prefix(_) => {
                normalized.push(component.as_os_str());
            }
        }
    }

    normalized
}

/// Resolve `path` against `base` (unless already absolute) and normalize.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Path of `to` relative to the directory `from`.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from_components: Vec<_> = from
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    let to_components: Vec<_> = to
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();

    let mut common = 0;
    while common < from_components.len()
        && common < to_components.len()
        && from_components[common] == to_components[common]
    {
        common += 1;
    }

    let mut result = PathBuf::new();
    for _ in common..from_components.len() {
        result.push("..");
    }
    for component in &to_components[common..] {
        result.push(component.as_os_str());
    }

    result
}

/// Render a path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// `foo/bar.d.ts` -> `foo/bar`. Paths without the suffix are returned as-is.
pub fn strip_dts_suffix(path: &Path) -> PathBuf {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return path.to_path_buf();
    };
    match file_name.strip_suffix(DTS_SUFFIX) {
        Some(stem) => path.with_file_name(stem),
        None => path.to_path_buf(),
    }
}

pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(DTS_SUFFIX))
}

/// Append `.d.ts` to a module path without disturbing dots already in it
/// (`./sub.service` -> `./sub.service.d.ts`).
pub fn with_dts_suffix(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(DTS_SUFFIX);
    PathBuf::from(raw)
}
