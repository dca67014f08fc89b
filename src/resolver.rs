//! Profile discovery and section parsing.
//!
//! `dbconns`/`.dbconns` files are searched from the current directory up
//! through every ancestor, then the home directory. The first file whose
//! contents yield the requested section wins; sections are never merged
//! across files.

use crate::config::ConnectionConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Unhidden config filename checked in each search directory.
pub const CONFIG_FILE: &str = "dbconns";
/// Hidden variant, checked after the unhidden name.
pub const CONFIG_FILE_HIDDEN: &str = ".dbconns";

/// Locates candidate config files and parses named sections.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    cwd: PathBuf,
    home: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver rooted at the process working directory and the user's
    /// home directory.
    pub fn from_cwd() -> std::io::Result<Self> {
        Ok(Self::with_roots(std::env::current_dir()?, dirs::home_dir()))
    }

    /// Resolver with explicit roots, for isolated use in tests.
    pub fn with_roots(cwd: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            home,
        }
    }

    /// Directories that may hold a config file: the working directory and
    /// every ancestor up to and including the root, deepest first, then
    /// the home directory. Duplicates are not collapsed.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.cwd.ancestors().map(Path::to_path_buf).collect();
        if let Some(ref home) = self.home {
            dirs.push(home.clone());
        }
        dirs
    }

    /// Candidate files that exist as regular files, in search order.
    ///
    /// Each directory contributes the unhidden name before the hidden one.
    pub fn candidate_files(&self) -> Vec<PathBuf> {
        self.search_dirs()
            .iter()
            .flat_map(|dir| [dir.join(CONFIG_FILE), dir.join(CONFIG_FILE_HIDDEN)])
            .filter(|path| path.is_file())
            .collect()
    }

    /// Find the section named `name` in the candidate files.
    ///
    /// Returns `Ok(None)` when no file contains the section. Unreadable
    /// files are skipped rather than failing the scan.
    pub fn resolve(&self, name: &str) -> Result<Option<ConnectionConfig>> {
        for path in self.candidate_files() {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    debug!(path = %path.display(), %err, "skipping unreadable config file");
                    continue;
                }
            };

            if let Some(config) = parse_section(&content, name) {
                debug!(path = %path.display(), name, "resolved connection profile");
                return Ok(Some(config));
            }
        }
        Ok(None)
    }
}

/// Parse the named section out of one file's contents.
///
/// The section starts at a line exactly matching `[name]` and ends at the
/// next `[...]` line or end of input. Blank lines and lines without `=`
/// are skipped; unknown keys are ignored.
fn parse_section(content: &str, name: &str) -> Option<ConnectionConfig> {
    let header = format!("[{name}]");
    let mut draft: Option<ConnectionConfig> = None;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let Some(ref mut config) = draft else {
            if line == header {
                draft = Some(ConnectionConfig::default());
            }
            continue;
        };

        // A new section header ends ours, even if the draft is partial.
        if line.starts_with('[') {
            break;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "hostname" => config.hostname = value.to_string(),
            "port" => config.port = value.to_string(),
            "namespace" => config.namespace = value.to_string(),
            "username" => config.username = Some(value.to_string()),
            "confirm" => config.confirm = parse_bool(value),
            _ => {}
        }
    }

    draft
}

/// Boolean rule for the `confirm` key: a handful of falsy spellings turn
/// it off, anything else leaves it on.
fn parse_bool(value: &str) -> bool {
    !matches!(
        value.to_lowercase().as_str(),
        "false" | "no" | "off" | "f" | "n" | "0"
    )
}
