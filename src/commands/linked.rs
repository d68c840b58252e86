use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use crate::application::{LinkedEntry, ListQueries, RegisteredEntry};
use crate::registry::RegistryStore;
use crate::runtime::Runtime;

use super::config::Config;

const NAME_WIDTH: usize = 30;
const PATH_WIDTH: usize = 60;
const RULE_WIDTH: usize = 100;

/// Which links to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedScope {
    /// Packages linked into the current project
    Project,
    /// Globally registered packages
    Global,
    /// Every project that has links
    All,
}

/// List linked or registered packages
#[tracing::instrument(skip(runtime, config))]
pub fn linked<R: Runtime>(runtime: R, scope: LinkedScope, config: Config) -> Result<()> {
    let store = RegistryStore::new(&runtime, config.state_dir.clone());
    let queries = ListQueries::new(&runtime, &store, config.project_dir);

    let output = match scope {
        LinkedScope::Project => render_project(&queries.list_linked_in_project()?),
        LinkedScope::Global => render_registered(&queries.list_registered()?),
        LinkedScope::All => render_all(&queries.list_all_projects_with_links()?),
    };
    print!("{}", output);
    Ok(())
}

fn status(exists: bool) -> &'static str {
    if exists { "Available" } else { "Missing" }
}

fn header(out: &mut String, extra: Option<&str>) {
    let width = RULE_WIDTH + extra.map_or(0, |e| e.len() + 20);
    let rule = "-".repeat(width);
    let _ = writeln!(out, "{}", rule);
    let _ = write!(out, "{:<NAME_WIDTH$} {:<PATH_WIDTH$} {:<10}", "Package", "Path", "Status");
    if let Some(extra) = extra {
        let _ = write!(out, " {}", extra);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule);
}

fn row(out: &mut String, name: &str, path: &Path, exists: bool) {
    let _ = write!(
        out,
        "{:<NAME_WIDTH$} {:<PATH_WIDTH$} {:<10}",
        name,
        truncate_path(path, PATH_WIDTH),
        status(exists)
    );
}

fn linked_rows(out: &mut String, entries: &[LinkedEntry]) {
    header(out, None);
    for entry in entries {
        row(out, &entry.name, &entry.path, entry.exists);
        let _ = writeln!(out);
    }
}

pub(crate) fn render_project(entries: &[LinkedEntry]) -> String {
    if entries.is_empty() {
        return "No packages are linked in this project.\n".to_string();
    }
    let mut out = String::from("Packages linked in this project:\n");
    linked_rows(&mut out, entries);
    out
}

pub(crate) fn render_registered(entries: &[RegisteredEntry]) -> String {
    if entries.is_empty() {
        return "No packages are globally registered.\n".to_string();
    }
    let mut out = String::from("Globally registered packages:\n");
    header(&mut out, Some("Registered"));
    for entry in entries {
        row(&mut out, &entry.name, &entry.path, entry.exists);
        let _ = writeln!(
            out,
            " {}",
            entry.registered_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    out
}

pub(crate) fn render_all(projects: &BTreeMap<PathBuf, Vec<LinkedEntry>>) -> String {
    if projects.is_empty() {
        return "No linked packages found in any projects.\n".to_string();
    }
    let mut out = String::from("All projects with linked packages:\n");
    for (project, entries) in projects {
        let _ = writeln!(out, "\nProject: {}", project.display());
        linked_rows(&mut out, entries);
    }
    out
}

/// Shorten `path` to at most `max` characters, keeping the root and as many
/// trailing components as fit: `/home/.../packages/widget`.
pub fn truncate_path(path: &Path, max: usize) -> String {
    let text = path.display().to_string();
    if text.chars().count() <= max {
        return text;
    }

    let mut parts: Vec<&str> = text.split(MAIN_SEPARATOR).collect();
    let Some(file_name) = parts.pop() else {
        return text;
    };
    let root = parts.first().copied().unwrap_or_default();
    let prefix = format!("{root}{MAIN_SEPARATOR}...{MAIN_SEPARATOR}");

    let mut tail = file_name.to_string();
    for part in parts.iter().skip(1).rev() {
        let len = prefix.chars().count() + part.chars().count() + 1 + tail.chars().count();
        if len > max {
            break;
        }
        tail = format!("{part}{MAIN_SEPARATOR}{tail}");
    }

    format!("{prefix}{tail}")
}
