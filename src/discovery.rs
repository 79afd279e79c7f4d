//! Startup unit discovery
//!
//! A startup unit is a directory whose name ends in `.startup` and which
//! may contain an executable entry script named `startup`. Units are
//! ordered by their full path, case-insensitively, so operators control
//! execution order with zero-padded numeric prefixes (`10-initial.startup`
//! runs before `20-network.startup`).

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

use crate::logs;

/// Directory name suffix marking a startup unit.
pub const UNIT_DIR_SUFFIX: &str = ".startup";

/// Entry script name expected inside a unit directory.
pub const UNIT_SCRIPT_NAME: &str = "startup";

/// One initialization step: a `*.startup` directory and its entry script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupUnit {
    pub dir: PathBuf,
}

impl StartupUnit {
    /// Path of the unit's entry script (`<dir>/startup`).
    pub fn script(&self) -> PathBuf {
        self.dir.join(UNIT_SCRIPT_NAME)
    }

    /// Whether the entry script exists as a regular file. Units without
    /// one are listed but skipped by the runner.
    pub fn has_script(&self) -> bool {
        self.script().is_file()
    }
}

/// Scan `root` recursively for startup unit directories.
///
/// A missing root yields an empty sequence; the base image ships without
/// any startup units and that is not an error. The ordering is plain
/// lexicographic on the lowercased path, deliberately not numeric-aware.
pub fn discover(root: &Path) -> Result<Vec<StartupUnit>> {
    if !root.is_dir() {
        logs::debug(format!("Startup directory '{}' does not exist, nothing to run.", root.display()));
        return Ok(Vec::new());
    }

    let root_str = root
        .to_str()
        .with_context(|| format!("Startup directory path '{}' is not valid UTF-8.", root.display()))?;
    // The root is a literal path; escape it so glob metacharacters in
    // directory names do not alter the match.
    let pattern = format!("{}/**/*{}", Pattern::escape(root_str), UNIT_DIR_SUFFIX);

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let mut units = Vec::new();
    for entry in glob::glob_with(&pattern, options)
        .with_context(|| format!("Invalid startup directory pattern '{}'.", pattern))?
    {
        let path = entry.context("Failed to read a directory entry while scanning for startup units.")?;
        if path.is_dir() {
            units.push(StartupUnit { dir: path });
        }
    }

    units.sort_by_key(|unit| unit.dir.to_string_lossy().to_lowercase());

    logs::debug(format!("Found {} startup unit(s) under '{}'.", units.len(), root.display()));
    Ok(units)
}
