//! End-to-end bundles over real temporary directories.

use std::path::{Path, PathBuf};

use dtsb_core::{BundleOptions, ExcludeFilter, NativeFileSystem, bundle_with};
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

/// `src/index.d.ts` exporting `Foo`, importing `./lib/helper` and the bare
/// module `some-pkg`, whose ambient declaration lives outside `src/`.
fn create_project(root: &Path) -> PathBuf {
    write_file(
        root,
        "typings/some-pkg.d.ts",
        "declare module 'some-pkg' {\n    export class SubService {\n    }\n}\n",
    );
    write_file(
        root,
        "src/lib/helper.d.ts",
        "export declare class Helper {\n}\n",
    );
    write_file(
        root,
        "src/index.d.ts",
        concat!(
            "/// <reference path=\"../typings/some-pkg.d.ts\" />\n",
            "import { Helper } from './lib/helper';\n",
            "import { SubService } from 'some-pkg';\n",
            "export declare class Foo {\n",
            "    helper: Helper;\n",
            "    service: SubService;\n",
            "}\n",
        ),
    )
}

fn options(main: &Path) -> BundleOptions {
    let mut options = BundleOptions::new(main, "root");
    options.newline = Some("\n".to_string());
    options.header_path = Some(PathBuf::from("none"));
    options
}

#[test]
fn externals_disabled_lists_the_dependency_in_the_header() {
    let temp = TempDir::new().unwrap();
    let main = create_project(temp.path());

    let result = bundle_with(&options(&main), &NativeFileSystem, temp.path()).unwrap();

    assert!(result.emitted);
    assert_eq!(result.output_path, temp.path().join("src").join("root.d.ts"));
    let written = std::fs::read_to_string(&result.output_path).unwrap();
    assert_eq!(written, result.content);
    assert_eq!(
        written,
        concat!(
            "// Dependencies for this module:\n",
            "//   ../typings/some-pkg.d.ts\n",
            "\n",
            "declare module 'root' {\n",
            "    import { Helper } from '__root/lib/helper';\n",
            "    import { SubService } from 'some-pkg';\n",
            "    export class Foo {\n",
            "        helper: Helper;\n",
            "        service: SubService;\n",
            "    }\n",
            "}\n",
            "\n",
            "declare module '__root/lib/helper' {\n",
            "    export class Helper {\n",
            "    }\n",
            "}\n",
            "\n",
        )
    );
    assert!(!written.contains("declare module 'some-pkg'"));
}

#[test]
fn externals_enabled_inlines_the_dependency_under_a_library_name() {
    let temp = TempDir::new().unwrap();
    let main = create_project(temp.path());
    let mut options = options(&main);
    options.externals = Some(true);

    let result = bundle_with(&options, &NativeFileSystem, temp.path()).unwrap();

    assert!(result.external_dependencies.is_empty());
    assert_eq!(
        result.content,
        concat!(
            "\n",
            "declare module 'root' {\n",
            "    import { Helper } from '__root/lib/helper';\n",
            "    import { SubService } from '__root/__/some-pkg';\n",
            "    export class Foo {\n",
            "        helper: Helper;\n",
            "        service: SubService;\n",
            "    }\n",
            "}\n",
            "\n",
            "declare module '__root/__/some-pkg' {\n",
            "    export class SubService {\n",
            "    }\n",
            "}\n",
            "\n",
            "declare module '__root/lib/helper' {\n",
            "    export class Helper {\n",
            "    }\n",
            "}\n",
            "\n",
        )
    );
}

#[test]
fn exclusion_takes_precedence_over_externals() {
    let temp = TempDir::new().unwrap();
    let main = create_project(temp.path());
    let mut options = options(&main);
    options.externals = Some(true);
    options.exclude = ExcludeFilter::Glob(
        globset::Glob::new("**/some-pkg.d.ts")
            .unwrap()
            .compile_matcher(),
    );

    let result = bundle_with(&options, &NativeFileSystem, temp.path()).unwrap();

    assert_eq!(
        result.excluded_files,
        vec![temp.path().join("typings").join("some-pkg.d.ts")]
    );
    assert!(!result.content.contains("__root/__/some-pkg"));
    assert!(result.content.contains("import { SubService } from 'some-pkg';"));
}

#[test]
fn private_members_are_dropped_with_their_doc_comments() {
    let temp = TempDir::new().unwrap();
    let main = write_file(
        temp.path(),
        "index.d.ts",
        concat!(
            "export declare class Foo {\n",
            "    /**\n",
            "     * Public docs\n",
            "     */\n",
            "    shown(): void;\n",
            "    /**\n",
            "     * Private docs\n",
            "     */\n",
            "    private hidden;\n",
            "    private static alsoHidden();\n",
            "}\n",
        ),
    );

    let result = bundle_with(&options(&main), &NativeFileSystem, temp.path()).unwrap();

    assert!(result.content.contains("Public docs"));
    assert!(result.content.contains("shown(): void;"));
    assert!(!result.content.contains("Private docs"));
    assert!(!result.content.contains("hidden"));
}

#[test]
fn shared_dependency_is_emitted_once() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "shared.d.ts", "export declare class Shared {\n}\n");
    write_file(
        temp.path(),
        "left.d.ts",
        "import { Shared } from './shared';\nexport declare class Left extends Shared {\n}\n",
    );
    write_file(
        temp.path(),
        "right.d.ts",
        "import { Shared } from './shared';\nexport declare class Right extends Shared {\n}\n",
    );
    let main = write_file(
        temp.path(),
        "index.d.ts",
        "export * from './left';\nexport * from './right';\n",
    );

    let result = bundle_with(&options(&main), &NativeFileSystem, temp.path()).unwrap();

    assert_eq!(
        result
            .content
            .matches("declare module '__root/shared' {")
            .count(),
        1
    );
    assert_eq!(result.used_files.len(), 4);
}

#[test]
fn tab_indentation_is_replaced_one_for_one() {
    let temp = TempDir::new().unwrap();
    let main = write_file(
        temp.path(),
        "index.d.ts",
        "export declare namespace ns {\n\tinterface A {\n\t\tfield:\tstring;\n\t}\n}\n",
    );

    let result = bundle_with(&options(&main), &NativeFileSystem, temp.path()).unwrap();

    assert!(result.content.contains(concat!(
        "    export namespace ns {\n",
        "        interface A {\n",
        "            field:\tstring;\n",
        "        }\n",
        "    }\n",
    )));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let temp = TempDir::new().unwrap();
    let main = create_project(temp.path());
    let mut options = options(&main);
    options.externals = Some(true);

    let first = bundle_with(&options, &NativeFileSystem, temp.path()).unwrap();
    let second = bundle_with(&options, &NativeFileSystem, temp.path()).unwrap();

    assert_eq!(first.content, second.content);
    assert_eq!(
        std::fs::read(&second.output_path).unwrap(),
        first.content.as_bytes()
    );
}

#[test]
fn remove_source_deletes_every_source_typing_but_the_output() {
    let temp = TempDir::new().unwrap();
    let main = create_project(temp.path());
    write_file(temp.path(), "src/unused.d.ts", "export declare const u: 1;\n");
    let mut options = options(&main);
    options.remove_source = Some(true);

    let result = bundle_with(&options, &NativeFileSystem, temp.path()).unwrap();

    assert!(result.emitted);
    assert!(result.output_path.is_file());
    assert!(!main.exists());
    assert!(!temp.path().join("src/lib/helper.d.ts").exists());
    assert!(!temp.path().join("src/unused.d.ts").exists());
    // Outside the base directory.
    assert!(temp.path().join("typings/some-pkg.d.ts").exists());
}

#[test]
fn remove_source_keeps_output_inside_base_dir() {
    let temp = TempDir::new().unwrap();
    let main = create_project(temp.path());
    let mut options = options(&main);
    options.remove_source = Some(true);

    // First run leaves `src/root.d.ts` behind as a discovered source typing.
    bundle_with(&options, &NativeFileSystem, temp.path()).unwrap();
    let main = create_project(temp.path());
    let result = bundle_with(&options, &NativeFileSystem, temp.path()).unwrap();

    assert!(result.output_path.is_file());
    assert!(!main.exists());
}
