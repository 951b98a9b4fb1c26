use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use dtsb_core::{BundleOptions, ExcludeFilter};

use crate::args::CliArgs;

/// Option-file keys whose values must be JSON strings.
const STRING_OPTIONS: &[&str] = &[
    "main",
    "name",
    "baseDir",
    "out",
    "newline",
    "indent",
    "prefix",
    "separator",
    "exclude",
    "headerPath",
    "headerText",
];

/// Custom deserializer for boolean options that accepts both bool and string values.
/// This handles option files containing `"externals": "true"` instead of `"externals": true`.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

/// Contents of a `--configJson` file. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionFile {
    pub main: Option<PathBuf>,
    pub name: Option<String>,
    pub base_dir: Option<PathBuf>,
    pub out: Option<String>,
    /// Literal newline text, e.g. `"\r\n"`.
    pub newline: Option<String>,
    pub indent: Option<String>,
    pub prefix: Option<String>,
    pub separator: Option<String>,
    /// Regular expression over base-relative dependency paths.
    pub exclude: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub externals: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub reference_externals: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub remove_source: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub verbose: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub emit_on_included_file_not_found: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub emit_on_no_included_file_not_found: Option<bool>,
    pub header_path: Option<PathBuf>,
    pub header_text: Option<String>,
}

pub fn parse_option_file(source: &str) -> Result<OptionFile> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let value: serde_json::Value =
        serde_json::from_str(&normalized).context("failed to parse option file JSON")?;

    let Some(object) = value.as_object() else {
        bail!("option file must contain a JSON object");
    };
    for name in STRING_OPTIONS {
        if let Some(value) = object.get(*name)
            && !value.is_string()
        {
            bail!("option \"{name}\" must be a string");
        }
    }

    let options = serde_json::from_value(value).context("failed to read option file")?;
    Ok(options)
}

pub fn load_option_file(path: &Path) -> Result<OptionFile> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read option file: {}", path.display()))?;
    parse_option_file(&source)
        .with_context(|| format!("failed to parse option file: {}", path.display()))
}

/// The option file named by `--configJson`, or an empty one.
pub fn load_cli_option_file(args: &CliArgs, cwd: &Path) -> Result<OptionFile> {
    match &args.config_json {
        Some(path) => load_option_file(&cwd.join(path)),
        None => Ok(OptionFile::default()),
    }
}

pub fn resolve_bundle_options(args: &CliArgs, cwd: &Path) -> Result<BundleOptions> {
    merge_bundle_options(args, load_cli_option_file(args, cwd)?)
}

/// Merge the option file with command-line arguments.
/// Command-line values win; switches only override when given.
pub fn merge_bundle_options(args: &CliArgs, file: OptionFile) -> Result<BundleOptions> {
    if args.output_as_module_folder {
        warn!("--outputAsModuleFolder has no effect");
    }

    let exclude = match args.exclude.as_ref().or(file.exclude.as_ref()) {
        Some(pattern) => ExcludeFilter::Regex(
            Regex::new(pattern).with_context(|| format!("invalid exclude pattern: {pattern}"))?,
        ),
        None => ExcludeFilter::None,
    };

    let options = BundleOptions {
        main: args.main.clone().or(file.main),
        name: args.name.clone().or(file.name),
        base_dir: args.base_dir.clone().or(file.base_dir),
        out: args.out.clone().or(file.out),
        newline: args
            .newline
            .map(|style| style.as_str().to_string())
            .or(file.newline),
        indent: args.indent.clone().or(file.indent),
        prefix: args.prefix.clone().or(file.prefix),
        separator: args.separator.clone().or(file.separator),
        externals: switch(args.externals, file.externals),
        exclude,
        remove_source: switch(args.remove_source, file.remove_source),
        reference_externals: switch(args.reference_externals, file.reference_externals),
        verbose: switch(args.verbose, file.verbose),
        emit_on_included_file_not_found: args
            .emit_on_included_file_not_found
            .or(file.emit_on_included_file_not_found),
        emit_on_no_included_file_not_found: args
            .emit_on_no_included_file_not_found
            .or(file.emit_on_no_included_file_not_found),
        header_path: args.header_path.clone().or(file.header_path),
        header_text: args.header_text.clone().or(file.header_text),
        transform_module_body: None,
    };
    debug!(?options, "merged command-line options");
    Ok(options)
}

fn switch(flag: bool, file: Option<bool>) -> Option<bool> {
    if flag { Some(true) } else { file }
}

// Drops `//` and `/* */` comments outside strings; newlines inside comments are kept.
fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' {
                if let Some('/') = chars.peek().copied() {
                    chars.next();
                    in_block_comment = false;
                }
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }

        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }

        if ch == '/'
            && let Some(&next) = chars.peek()
        {
            if next == '/' {
                chars.next();
                in_line_comment = true;
                continue;
            }
            if next == '*' {
                chars.next();
                in_block_comment = true;
                continue;
            }
        }

        out.push(ch);
    }

    out
}

// Drops a comma followed (after whitespace) by `}` or `]`.
fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }

        if ch == ',' {
            let mut lookahead = chars.clone();
            while lookahead.next_if(|next| next.is_whitespace()).is_some() {}
            if matches!(lookahead.peek(), Some('}' | ']')) {
                continue;
            }
        }

        out.push(ch);
    }

    out
}
