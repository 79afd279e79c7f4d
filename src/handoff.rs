//! Application hand-off
//!
//! The final stage of every successful boot: the entrypoint replaces its
//! own process image with the application (or a shell, or an arbitrary
//! command). PID 1, the open stdio descriptors and the signal
//! disposition carry over, so the container runtime observes the
//! application's exit code directly.
//!
//! The exec functions return only if the exec itself failed; the
//! returned value is the exit code to terminate with in that case.

use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::unistd::execv;
use std::ffi::{CString, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::logs;
use crate::runner::{self, EXIT_CODE_COMMAND_NOT_FOUND, EXIT_CODE_NOT_EXECUTABLE};
use crate::shell::ShellInit;

/// Environment flag read by shell profiles; kept for compatibility with
/// derived images even though the launch decision itself travels as a
/// `ShellInit` value.
pub const RUN_DOCKER_APP_ENV: &str = "RUN_DOCKER_APP";

const SHELL: &str = "/bin/bash";

fn cstring(value: &OsStr) -> Result<CString> {
    CString::new(value.as_bytes())
        .with_context(|| format!("Argument '{}' contains an interior NUL byte.", value.to_string_lossy()))
}

/// Replace the current process image. Returns the failure exit code if
/// the exec did not happen.
fn exec(path: &Path, argv: &[CString]) -> i32 {
    let program = match cstring(path.as_os_str()) {
        Ok(program) => program,
        Err(error) => {
            logs::error(format!("{:#}", error));
            return EXIT_CODE_NOT_EXECUTABLE;
        }
    };

    // On success execv does not return.
    let error = execv(&program, argv).unwrap_err();
    logs::error(format!("Failed to execute '{}': {}.", path.display(), error));
    match error {
        Errno::ENOENT => EXIT_CODE_COMMAND_NOT_FOUND,
        _ => EXIT_CODE_NOT_EXECUTABLE,
    }
}

fn build_argv(program: &OsStr, args: &[OsString]) -> Result<Vec<CString>> {
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(cstring(program)?);
    for arg in args {
        argv.push(cstring(arg)?);
    }
    Ok(argv)
}

/// Hand off to the long-running application, threading the original
/// argument vector through.
pub fn exec_app(app: &Path, ctx: &[OsString]) -> Result<i32> {
    if let Err(error) = runner::ensure_executable(app) {
        logs::warning(format!("{:#}", error));
    }

    logs::info(format!("Handing off to '{}'.", app.display()));
    let argv = build_argv(app.as_os_str(), ctx)?;
    Ok(exec(app, &argv))
}

/// Hand off to an interactive bash shell initialized from `init`.
pub fn exec_shell(init: &ShellInit) -> Result<i32> {
    let rcfile = init.write_rcfile()?;

    if init.launch_app {
        std::env::set_var(RUN_DOCKER_APP_ENV, "1");
    }

    logs::info("Entering interactive shell.");
    let argv = build_argv(
        OsStr::new(SHELL),
        &[OsString::from("--rcfile"), rcfile.into_os_string()],
    )?;
    Ok(exec(Path::new(SHELL), &argv))
}

/// Hand off to an arbitrary command, resolved on PATH. A command that
/// cannot be resolved exits 127 without an exec attempt.
pub fn exec_command(args: &[OsString]) -> Result<i32> {
    let Some(program) = args.first() else {
        return Ok(EXIT_CODE_COMMAND_NOT_FOUND);
    };

    let resolved = match which::which(program) {
        Ok(resolved) => resolved,
        Err(_) => {
            let message = format!("Unknown command ({}).", program.to_string_lossy());
            logs::error(&message);
            // In pass-through mode the logger writes to the file only;
            // the user still needs the diagnostic on stderr.
            if !logs::uses_stdio() {
                eprintln!("ERROR: {}", message);
            }
            return Ok(EXIT_CODE_COMMAND_NOT_FOUND);
        }
    };

    logs::debug(format!("Executing '{}' directly.", resolved.display()));
    let argv = build_argv(program, &args[1..])?;
    Ok(exec(&resolved, &argv))
}
