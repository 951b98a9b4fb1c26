use std::path::Path;
use std::sync::Arc;

use crate::emitter::{Emitter, format_reference, generated_header};
use crate::fs::{MemoryFileSystem, SourceTypings};
use crate::graph::{ExportMap, walk};
use crate::inclusion::{ExternalDependency, resolve_inclusion};
use crate::options::BundleOptions;
use crate::rewriter::rewrite_external_names;

fn render(fs: &MemoryFileSystem, options: &BundleOptions, header: Option<&str>) -> String {
    let options = options.resolve(Path::new("/")).unwrap();
    let sources = SourceTypings::discover(fs, &options.base_dir).unwrap();
    let mut registry = walk(&options, fs, &sources).unwrap();
    let exports = ExportMap::build(&registry).unwrap();
    let inclusion = resolve_inclusion(&options, &registry, &exports);
    rewrite_external_names(&options, &mut registry, &exports, &inclusion);
    Emitter::new(&options, &registry, &inclusion).emit(header)
}

fn options() -> BundleOptions {
    let mut options = BundleOptions::new("/p/index.d.ts", "root");
    options.newline = Some("\n".to_string());
    options
}

#[test]
fn wraps_source_typings_in_module_blocks() {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/p/index.d.ts",
        "import { B } from './b';\nexport declare class A {\n    b: B;\n}",
    );
    fs.insert("/p/b.d.ts", "export declare class B {\n}");

    let content = render(&fs, &options(), Some("// header"));
    assert_eq!(
        content,
        concat!(
            "// header\n",
            "\n",
            "declare module 'root' {\n",
            "    import { B } from '__root/b';\n",
            "    export class A {\n",
            "        b: B;\n",
            "    }\n",
            "}\n",
            "\n",
            "declare module '__root/b' {\n",
            "    export class B {\n",
            "    }\n",
            "}\n",
            "\n",
        )
    );
}

#[test]
fn empty_file_yields_single_blank_line() {
    let fs = MemoryFileSystem::new();
    fs.insert("/p/index.d.ts", "");

    let content = render(&fs, &options(), None);
    assert_eq!(content, "\ndeclare module 'root' {\n    \n}\n\n");
}

#[test]
fn reindents_tabs_and_uses_configured_newline() {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/p/index.d.ts",
        "export declare class A {\n\tmethod(a:\tstring): void;\n\tother(): void;\n}",
    );
    let mut options = options();
    options.newline = Some("\r\n".to_string());
    options.indent = Some("  ".to_string());

    let content = render(&fs, &options, None);
    assert_eq!(
        content,
        concat!(
            "\r\n",
            "declare module 'root' {\r\n",
            "  export class A {\r\n",
            "    method(a:\tstring): void;\r\n",
            "    other(): void;\r\n",
            "  }\r\n",
            "}\r\n",
            "\r\n",
        )
    );
}

#[test]
fn lists_dependencies_as_comments_or_references() {
    let fs = MemoryFileSystem::new();
    fs.insert(
        "/p/index.d.ts",
        "/// <reference path=\"../typings/events.d.ts\" />\nimport { EventEmitter } from 'events';\nimport * as x from 'unknown';",
    );
    fs.insert("/typings/events.d.ts", "declare module 'events' {\n}");

    let content = render(&fs, &options(), None);
    assert!(content.starts_with(concat!(
        "// Dependencies for this module:\n",
        "//   ../typings/events.d.ts\n",
        "//   unknown\n",
        "\n",
    )));

    let mut referenced = options();
    referenced.reference_externals = Some(true);
    let content = render(&fs, &referenced, None);
    assert!(content.starts_with(concat!(
        "// Dependencies for this module:\n",
        "/// <reference path=\"../typings/events.d.ts\" />\n",
        "/// <reference types=\"unknown\" />\n",
        "\n",
    )));
}

#[test]
fn module_body_transform_sees_indented_body() {
    let fs = MemoryFileSystem::new();
    fs.insert("/p/index.d.ts", "export declare const a: 1;");
    let mut options = options();
    options.transform_module_body = Some(Arc::new(|name: &str, body: &str| {
        format!("    // {name}\n{body}")
    }));

    let content = render(&fs, &options, None);
    assert_eq!(
        content,
        "\ndeclare module 'root' {\n    // root\n    export const a: 1;\n}\n\n"
    );
}

#[test]
fn reference_format() {
    let options = options().resolve(Path::new("/")).unwrap();
    assert_eq!(
        format_reference(
            &options,
            &ExternalDependency::File("/p/typings/node.d.ts".into())
        ),
        "/// <reference path=\"typings/node.d.ts\" />"
    );
    assert!(generated_header().starts_with("// Generated by dts-bundle v"));
}
