//! Package-definition and root-manifest parsing.
//!
//! A definition file is TOML. Every top-level key is one declaration; the file
//! is first turned into a list of typed `Declaration`s and then applied, in
//! file order, to a fresh `Specification` through its declaration methods.

use indexmap::IndexMap;
use pod_core::error::PodError;
use pod_core::types::{GitRevision, SourceReference, Specification, Version, VersionReq};
use std::collections::BTreeMap;
use std::path::Path;
use toml::Value;

use crate::ConfigResult;

/// Table in a root manifest that carries install settings, not declarations
pub const SETTINGS_KEY: &str = "settings";

/// One recognized declaration from a definition file
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Name(String),
    Version(Version),
    Authors(IndexMap<String, Option<String>>),
    Homepage(String),
    Summary(String),
    Description(String),
    PartOf { name: String, version_reqs: Vec<VersionReq> },
    PartOfDependency { name: String, version_reqs: Vec<VersionReq> },
    SourceFiles(Vec<String>),
    Source(SourceReference),
    Dependency { name: String, version_reqs: Vec<VersionReq> },
    BuildConfig(BTreeMap<String, String>),
}

/// What kind of file is being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    /// Published package definition; name and version are required
    Package,
    /// Project manifest; name and version are not allowed
    RootManifest,
}

/// Parse a root manifest file
pub fn parse_root_manifest(path: &Path) -> ConfigResult<Specification> {
    if !path.exists() {
        return Err(PodError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = read_definition(path)?;
    parse_definition_str(&content, path, DefinitionKind::RootManifest)
}

/// Parse a package definition file
pub fn parse_package_definition(path: &Path) -> ConfigResult<Specification> {
    let content = read_definition(path)?;
    parse_definition_str(&content, path, DefinitionKind::Package)
}

fn read_definition(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PodError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => PodError::io("Failed to read definition file", path, e),
    })
}

/// Parse definition text as if it were read from `path`.
///
/// Relative `path` sources are resolved against the directory of `path`.
pub fn parse_definition_str(content: &str, path: &Path, kind: DefinitionKind) -> ConfigResult<Specification> {
    let declarations = parse_declarations(content, path, kind)?;

    let mut spec = Specification::new();
    for declaration in declarations {
        apply_declaration(&mut spec, declaration);
    }
    spec.set_defined_in_file(path);

    match kind {
        DefinitionKind::Package if spec.identity().is_none() => {
            return Err(PodError::parse(path, "package definition must declare both `name` and `version`"));
        }
        DefinitionKind::RootManifest if !spec.is_root_manifest() => {
            return Err(PodError::parse(path, "root manifest must not declare `name` or `version`"));
        }
        _ => {}
    }
    spec.validate()?;

    Ok(spec)
}

/// Turn definition text into an ordered declaration list
pub fn parse_declarations(content: &str, path: &Path, kind: DefinitionKind) -> ConfigResult<Vec<Declaration>> {
    let table: toml::Table = content
        .parse()
        .map_err(|e: toml::de::Error| PodError::parse(path, format!("TOML syntax error: {}", e)))?;

    let base_dir = path.parent();
    let mut declarations = Vec::with_capacity(table.len());

    for (key, value) in &table {
        let declaration = match key.as_str() {
            "name" => Declaration::Name(expect_string(path, key, value)?),
            "version" => {
                let text = expect_string(path, key, value)?;
                let version = text
                    .parse()
                    .map_err(|e| PodError::parse(path, format!("`version`: {}", e)))?;
                Declaration::Version(version)
            }
            "authors" | "author" => Declaration::Authors(parse_authors(path, key, value)?),
            "homepage" => Declaration::Homepage(expect_string(path, key, value)?),
            "summary" => Declaration::Summary(expect_string(path, key, value)?),
            "description" => Declaration::Description(expect_string(path, key, value)?),
            "part_of" => {
                let (name, version_reqs) = parse_reference(path, key, value)?;
                Declaration::PartOf { name, version_reqs }
            }
            "part_of_dependency" => {
                let (name, version_reqs) = parse_reference(path, key, value)?;
                Declaration::PartOfDependency { name, version_reqs }
            }
            "source_files" => Declaration::SourceFiles(expect_string_list(path, key, value)?),
            "source" => Declaration::Source(parse_source(path, key, value, base_dir)?),
            "dependency" | "dependencies" => {
                let entries = value.as_array().ok_or_else(|| type_error(path, key, "an array of tables"))?;
                for entry in entries {
                    let (name, version_reqs) = parse_reference(path, key, entry)?;
                    declarations.push(Declaration::Dependency { name, version_reqs });
                }
                continue;
            }
            "build_config" => Declaration::BuildConfig(parse_build_config(path, key, value)?),
            SETTINGS_KEY if kind == DefinitionKind::RootManifest => continue,
            other => {
                return Err(PodError::parse(path, format!("unknown declaration `{}`", other)));
            }
        };
        declarations.push(declaration);
    }

    Ok(declarations)
}

/// Apply one declaration through the matching specification method
pub fn apply_declaration(spec: &mut Specification, declaration: Declaration) {
    match declaration {
        Declaration::Name(name) => {
            spec.set_name(name);
        }
        Declaration::Version(version) => {
            spec.set_version(version);
        }
        Declaration::Authors(authors) => {
            spec.set_authors(authors);
        }
        Declaration::Homepage(url) => {
            spec.set_homepage(url);
        }
        Declaration::Summary(summary) => {
            spec.set_summary(summary);
        }
        Declaration::Description(description) => {
            spec.set_description(description);
        }
        Declaration::PartOf { name, version_reqs } => {
            spec.set_part_of(name, version_reqs);
        }
        Declaration::PartOfDependency { name, version_reqs } => {
            spec.set_part_of_dependency(name, version_reqs);
        }
        Declaration::SourceFiles(patterns) => {
            spec.set_source_files(patterns);
        }
        Declaration::Source(source) => {
            spec.set_source(source);
        }
        Declaration::Dependency { name, version_reqs } => {
            spec.add_dependency(name, version_reqs);
        }
        Declaration::BuildConfig(fragment) => {
            spec.set_build_config(fragment);
        }
    }
}

fn type_error(path: &Path, key: &str, expected: &str) -> PodError {
    PodError::parse(path, format!("`{}` must be {}", key, expected))
}

fn expect_string(path: &Path, key: &str, value: &Value) -> ConfigResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| type_error(path, key, "a string"))
}

/// A single string or an array of strings
fn expect_string_list(path: &Path, key: &str, value: &Value) -> ConfigResult<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| expect_string(path, key, item))
            .collect(),
        _ => Err(type_error(path, key, "a string or an array of strings")),
    }
}

/// `"Ann"`, `["Ann", { Bob = "bob@example.com" }]` or `{ Ann = "ann@example.com" }`
fn parse_authors(path: &Path, key: &str, value: &Value) -> ConfigResult<IndexMap<String, Option<String>>> {
    let mut authors = IndexMap::new();

    let add_table = |table: &toml::Table, authors: &mut IndexMap<String, Option<String>>| {
        for (name, email) in table {
            let email = expect_string(path, key, email)?;
            authors.insert(name.clone(), Some(email));
        }
        Ok::<(), PodError>(())
    };

    match value {
        Value::String(name) => {
            authors.insert(name.clone(), None);
        }
        Value::Table(table) => add_table(table, &mut authors)?,
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(name) => {
                        authors.insert(name.clone(), None);
                    }
                    Value::Table(table) => add_table(table, &mut authors)?,
                    _ => return Err(type_error(path, key, "author names or name = email tables")),
                }
            }
        }
        _ => return Err(type_error(path, key, "a string, array or table")),
    }

    Ok(authors)
}

/// `"Name"` or `{ name = "Name", version = ">= 1.0" | [">= 1.0", "< 2.0"] }`
fn parse_reference(path: &Path, key: &str, value: &Value) -> ConfigResult<(String, Vec<VersionReq>)> {
    let (name, requirements) = match value {
        Value::String(name) => (name.clone(), Vec::new()),
        Value::Table(table) => {
            let name = table
                .get("name")
                .ok_or_else(|| PodError::parse(path, format!("`{}` entry is missing `name`", key)))
                .and_then(|name| expect_string(path, key, name))?;
            if let Some(unknown) = table.keys().find(|k| *k != "name" && *k != "version") {
                return Err(PodError::parse(path, format!("unknown field `{}` in `{}`", unknown, key)));
            }
            let requirements = match table.get("version") {
                Some(version) => expect_string_list(path, key, version)?,
                None => Vec::new(),
            };
            (name, requirements)
        }
        _ => return Err(type_error(path, key, "a package name or a table with `name`")),
    };

    if name.trim().is_empty() {
        return Err(PodError::parse(path, format!("`{}` has an empty package name", key)));
    }

    let version_reqs = requirements
        .iter()
        .map(|req| {
            VersionReq::parse(req)
                .map_err(|e| PodError::parse(path, format!("`{}` requirement for '{}': {}", key, name, e)))
        })
        .collect::<ConfigResult<Vec<_>>>()?;

    Ok((name, version_reqs))
}

/// `{ git = url, tag | branch | commit }`, `{ http = url }` or `{ path = dir }`
fn parse_source(path: &Path, key: &str, value: &Value, base_dir: Option<&Path>) -> ConfigResult<SourceReference> {
    let table = value
        .as_table()
        .ok_or_else(|| type_error(path, key, "a table with `git`, `http` or `path`"))?;
    let field = |name: &str| -> ConfigResult<Option<String>> {
        table.get(name).map(|v| expect_string(path, key, v)).transpose()
    };

    let invalid_url = |e: url::ParseError| PodError::parse(path, format!("`{}`: invalid URL: {}", key, e));

    let (git, http, local) = (field("git")?, field("http")?, field("path")?);
    let source = match (git, http, local) {
        (Some(url), None, None) => {
            let revisions = [
                field("tag")?.map(GitRevision::Tag),
                field("branch")?.map(GitRevision::Branch),
                field("commit")?.map(GitRevision::Commit),
            ];
            let mut given = revisions.into_iter().flatten();
            let revision = given.next().unwrap_or(GitRevision::Head);
            if given.next().is_some() {
                return Err(PodError::parse(path, "`source` may name only one of `tag`, `branch` or `commit`"));
            }
            SourceReference::git(&url, revision).map_err(invalid_url)?
        }
        (None, Some(url), None) => SourceReference::http(&url).map_err(invalid_url)?,
        (None, None, Some(local)) => SourceReference::path(local, base_dir),
        _ => {
            return Err(PodError::parse(path, "`source` must specify exactly one of `git`, `http` or `path`"));
        }
    };

    Ok(source)
}

fn parse_build_config(path: &Path, key: &str, value: &Value) -> ConfigResult<BTreeMap<String, String>> {
    let table = value
        .as_table()
        .ok_or_else(|| type_error(path, key, "a table of strings"))?;

    table
        .iter()
        .map(|(setting, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Array(_) => expect_string_list(path, key, value)?.join(" "),
                _ => return Err(type_error(path, &format!("{}.{}", key, setting), "a string")),
            };
            Ok((setting.clone(), value))
        })
        .collect()
}
