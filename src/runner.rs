//! Startup unit runner
//!
//! Runs a discovered startup sequence to completion or first failure.
//! Every unit receives the original argument vector and inherits the
//! entrypoint's stdio, so unit output appears live in the container log.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::discovery::StartupUnit;
use crate::logs;

/// Shell convention for "command not found".
pub const EXIT_CODE_COMMAND_NOT_FOUND: i32 = 127;

/// Shell convention for "found but not executable".
pub const EXIT_CODE_NOT_EXECUTABLE: i32 = 126;

/// Result of running one startup unit or the eventual hand-off.
///
/// 127 is kept apart from other failures because pass-through mode
/// reinterprets it as "the arguments were not a startup directive".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure(i32),
    CommandNotFound,
}

impl ExitOutcome {
    pub fn code(self) -> i32 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::Failure(code) => code,
            ExitOutcome::CommandNotFound => EXIT_CODE_COMMAND_NOT_FOUND,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitOutcome::Success
    }

    fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => ExitOutcome::Success,
            Some(EXIT_CODE_COMMAND_NOT_FOUND) => ExitOutcome::CommandNotFound,
            Some(code) => ExitOutcome::Failure(code),
            // Terminated by a signal; report 128+signo as a shell would.
            None => ExitOutcome::Failure(128 + status.signal().unwrap_or(0)),
        }
    }
}

/// Mark a script executable by owner and group. Idempotent.
pub fn ensure_executable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to inspect '{}'.", path.display()))?;
    let mut permissions = metadata.permissions();
    let mode = permissions.mode();
    if mode & 0o110 != 0o110 {
        permissions.set_mode(mode | 0o110);
        fs::set_permissions(path, permissions)
            .with_context(|| format!("Failed to mark '{}' executable.", path.display()))?;
    }
    Ok(())
}

/// Run each unit in order, stopping at the first non-zero exit.
///
/// Units without an entry script are skipped silently. The first
/// non-Success outcome is returned with the child's exact exit code;
/// later units are never invoked.
pub fn run_sequence(units: &[StartupUnit], ctx: &[OsString]) -> Result<ExitOutcome> {
    for unit in units {
        if !unit.has_script() {
            logs::debug(format!("Skipping '{}', no entry script.", unit.dir.display()));
            continue;
        }

        let script = unit.script();
        ensure_executable(&script)?;

        logs::info(format!("Running startup unit '{}'...", unit.dir.display()));
        let outcome = match Command::new(&script).args(ctx).status() {
            Ok(status) => ExitOutcome::from_status(status),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                // Typically a missing interpreter in the shebang line.
                ExitOutcome::CommandNotFound
            }
            Err(error) if error.kind() == io::ErrorKind::PermissionDenied => {
                ExitOutcome::Failure(EXIT_CODE_NOT_EXECUTABLE)
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("Failed to start '{}'.", script.display()));
            }
        };

        if !outcome.is_success() {
            logs::error(format!(
                "Startup unit '{}' exited with code {}.",
                unit.dir.display(),
                outcome.code()
            ));
            return Ok(outcome);
        }

        logs::info(format!("Startup unit '{}' succeeded.", unit.dir.display()));
    }

    Ok(ExitOutcome::Success)
}
