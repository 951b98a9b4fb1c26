//! Option handling, error reporting and emission control of `bundle_with`.

use std::path::{Path, PathBuf};

use dtsb_core::{BundleError, BundleOptions, MemoryFileSystem, NativeFileSystem, bundle_with};
use tempfile::TempDir;

fn memory_project() -> MemoryFileSystem {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/p/index.d.ts",
        "import { A } from './a';\nexport declare const root: A;\n",
    );
    fs.insert("/p/a.d.ts", "export declare class A {\n}\n");
    fs
}

fn options() -> BundleOptions {
    let mut options = BundleOptions::new("/p/index.d.ts", "pkg");
    options.newline = Some("\n".to_string());
    options
}

#[test]
fn missing_required_options_are_rejected() {
    let fs = memory_project();

    let mut no_main = options();
    no_main.main = None;
    assert!(matches!(
        bundle_with(&no_main, &fs, Path::new("/")),
        Err(BundleError::MissingOption("main"))
    ));

    let mut no_name = options();
    no_name.name = Some(String::new());
    let err = bundle_with(&no_name, &fs, Path::new("/")).unwrap_err();
    assert_eq!(err.to_string(), "option \"name\" must be defined");
}

#[test]
fn empty_separator_is_rejected() {
    let fs = memory_project();
    let mut options = options();
    options.separator = Some(String::new());

    let err = bundle_with(&options, &fs, Path::new("/")).unwrap_err();
    assert!(matches!(
        err,
        BundleError::InvalidOption {
            name: "separator",
            ..
        }
    ));
    assert!(fs.get("/p/pkg.d.ts").is_none());
}

#[test]
fn missing_main_is_fatal() {
    let fs = MemoryFileSystem::new();
    let err = bundle_with(&options(), &fs, Path::new("/")).unwrap_err();
    assert!(matches!(err, BundleError::MainNotFound(path) if path == Path::new("/p/index.d.ts")));
}

#[test]
fn duplicate_ambient_module_aborts_without_output() {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/p/index.d.ts",
        "/// <reference path=\"x.d.ts\" />\n/// <reference path=\"y.d.ts\" />\n",
    );
    fs.insert("/p/x.d.ts", "declare module 'dup' {\n}\n");
    fs.insert("/p/y.d.ts", "declare module 'dup' {\n}\n");

    let err = bundle_with(&options(), &fs, Path::new("/")).unwrap_err();
    assert!(matches!(err, BundleError::DuplicateExport { ref name, .. } if name == "dup"));
    assert!(fs.get("/p/pkg.d.ts").is_none());
}

#[test]
fn writes_default_output_next_to_main() {
    let fs = memory_project();
    let result = bundle_with(&options(), &fs, Path::new("/")).unwrap();

    assert!(result.emitted);
    assert_eq!(result.output_path, PathBuf::from("/p/pkg.d.ts"));
    assert_eq!(fs.get("/p/pkg.d.ts"), Some(result.content.clone()));
    assert!(result.content.starts_with(&format!(
        "// Generated by dts-bundle v{}\n\n",
        env!("CARGO_PKG_VERSION")
    )));
    assert!(result.content.contains("declare module 'pkg' {\n    import { A } from '__pkg/a';\n"));
}

#[test]
fn custom_prefix_and_separator_shape_names() {
    let fs = memory_project();
    let mut options = options();
    options.prefix = Some("$".to_string());
    options.separator = Some("::".to_string());

    let result = bundle_with(&options, &fs, Path::new("/")).unwrap();

    assert!(result.content.contains("import { A } from '$pkg::a';"));
    assert!(result.content.contains("declare module '$pkg::a' {"));
}

#[test]
fn home_relative_out_resolves_against_cwd() {
    let fs = memory_project();
    let mut options = options();
    options.base_dir = Some(PathBuf::from("/p"));
    options.out = Some("~/build/bundle.d.ts".to_string());

    let result = bundle_with(&options, &fs, Path::new("/work")).unwrap();

    assert_eq!(result.output_path, PathBuf::from("/work/build/bundle.d.ts"));
    assert!(fs.get("/work/build/bundle.d.ts").is_some());
}

#[test]
fn out_relative_to_base_dir() {
    let fs = memory_project();
    let mut options = options();
    options.out = Some("dist/types.d.ts".to_string());

    let result = bundle_with(&options, &fs, Path::new("/")).unwrap();

    assert_eq!(result.output_path, PathBuf::from("/p/dist/types.d.ts"));
}

#[test]
fn header_variants() {
    let fs = memory_project();
    fs.insert("/p/HEADER.txt", " Copyright (c) 2026 ");

    let mut text = options();
    text.header_text = Some(" Licensed MIT ".to_string());
    let result = bundle_with(&text, &fs, Path::new("/")).unwrap();
    assert!(result.content.starts_with("/* Licensed MIT */\n\n"));

    let mut file = options();
    file.header_path = Some(PathBuf::from("HEADER.txt"));
    let result = bundle_with(&file, &fs, Path::new("/p")).unwrap();
    assert!(result.content.starts_with("/* Copyright (c) 2026 */\n\n"));

    let mut none = options();
    none.header_path = Some(PathBuf::from("none"));
    let result = bundle_with(&none, &fs, Path::new("/")).unwrap();
    assert!(result.content.starts_with("\ndeclare module 'pkg' {"));

    let mut missing = options();
    missing.header_path = Some(PathBuf::from("/p/NOPE.txt"));
    let err = bundle_with(&missing, &fs, Path::new("/")).unwrap_err();
    assert!(matches!(err, BundleError::Header { .. }));
}

#[test]
fn missing_included_file_warns_by_default() {
    let fs = MemoryFileSystem::new();
    fs.insert("/p/index.d.ts", "import { Gone } from './gone';\n");

    let result = bundle_with(&options(), &fs, Path::new("/")).unwrap();

    assert!(result.emitted);
    assert_eq!(result.missing_files, vec![PathBuf::from("/p/gone.d.ts")]);
    assert!(result.content.contains("import { Gone } from '__pkg/gone';"));
    assert_eq!(result.used_files.len(), 2);
}

#[test]
fn missing_included_file_can_block_emission() {
    let fs = MemoryFileSystem::new();
    fs.insert("/p/index.d.ts", "import { Gone } from './gone';\n");
    let mut options = options();
    options.emit_on_included_file_not_found = Some(false);

    let result = bundle_with(&options, &fs, Path::new("/")).unwrap();

    assert!(!result.emitted);
    assert!(fs.get("/p/pkg.d.ts").is_none());
}

#[test]
fn missing_unused_file_can_block_emission() {
    let fs = MemoryFileSystem::new();
    fs.insert("/p/index.d.ts", "import { Gone } from './lib/gone';\n");
    let mut options = options();
    options.exclude = dtsb_core::ExcludeFilter::func(|path, _| path.starts_with("lib/"));

    let result = bundle_with(&options, &fs, Path::new("/")).unwrap();
    assert!(result.emitted);

    options.emit_on_no_included_file_not_found = Some(false);
    options.remove_source = Some(true);
    let result = bundle_with(&options, &fs, Path::new("/")).unwrap();
    assert!(!result.emitted);
    // Nothing is removed when the output is not written.
    assert!(fs.get("/p/index.d.ts").is_some());
}

#[test]
fn windows_newlines_throughout() {
    let fs = memory_project();
    let mut options = options();
    options.newline = Some("\r\n".to_string());

    let result = bundle_with(&options, &fs, Path::new("/")).unwrap();

    assert!(result.content.contains("declare module 'pkg' {\r\n"));
    assert!(!result.content.replace("\r\n", "").contains('\n'));
}

#[test]
fn verbose_run_produces_the_same_output() {
    let fs = memory_project();
    let quiet = bundle_with(&options(), &fs, Path::new("/")).unwrap();

    let mut verbose = options();
    verbose.verbose = Some(true);
    let loud = bundle_with(&verbose, &fs, Path::new("/")).unwrap();

    assert_eq!(quiet.content, loud.content);
}

#[test]
fn native_output_directories_are_created() {
    let temp = TempDir::new().unwrap();
    let main = temp.path().join("index.d.ts");
    std::fs::write(&main, "export declare const a: 1;\n").unwrap();

    let mut options = BundleOptions::new(&main, "pkg");
    options.out = Some("deep/nested/out.d.ts".to_string());
    let result = bundle_with(&options, &NativeFileSystem, temp.path()).unwrap();

    assert!(temp.path().join("deep/nested/out.d.ts").is_file());
    assert!(result.emitted);
}
