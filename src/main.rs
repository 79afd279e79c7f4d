//! strongSwan VPN gateway container entrypoint
//!
//! Staged-startup orchestrator: discovers `*.startup` initialization
//! units, runs them in order with fail-fast semantics, then hands process
//! control to the VPN gateway application (or an interactive shell, or a
//! pass-through command), preserving exit-code and signal behavior for
//! the container runtime.

use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::process;

mod config;
mod discovery;
mod env;
mod handoff;
mod logs;
mod runner;
mod shell;

use config::Config;
use runner::ExitOutcome;
use shell::ShellInit;

const EXIT_CODE_SUCCESS: i32 = 0;
const EXIT_CODE_GENERAL_ERROR: i32 = 1;
const EXIT_CODE_IO_ERROR: i32 = 4;
const EXIT_CODE_CONFIGURATION_ERROR: i32 = 5;

#[derive(Parser)]
#[command(name = "entrypoint")]
#[command(about = "strongSwan VPN gateway container entrypoint")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Mode selector (`run`, `run-and-enter`) or a pass-through command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<OsString>,
}

/// Operating mode, selected by the first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Run the startup sequence, then hand off to the application.
    Run,
    /// Run the startup sequence, then enter an interactive shell with
    /// the application launched in the background.
    RunAndEnter,
    /// Treat the arguments as a startup directive; fall back to
    /// executing them literally when no unit recognizes them.
    PassThrough,
}

impl Mode {
    /// `None` when the argument list is empty (nothing runs at all).
    fn from_args(args: &[OsString]) -> Option<Mode> {
        let first = args.first()?;
        match first.to_str().map(str::to_lowercase).as_deref() {
            Some("run") => Some(Mode::Run),
            Some("run-and-enter") => Some(Mode::RunAndEnter),
            _ => Some(Mode::PassThrough),
        }
    }

    fn uses_stdio(self) -> bool {
        matches!(self, Mode::Run | Mode::RunAndEnter)
    }
}

fn main() {
    let cli = Cli::parse();
    process::exit(run(cli.args));
}

fn run(args: Vec<OsString>) -> i32 {
    let Some(mode) = Mode::from_args(&args) else {
        // Invoked without arguments: nothing to do.
        return EXIT_CODE_SUCCESS;
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("[error] {:#}", error);
            return EXIT_CODE_CONFIGURATION_ERROR;
        }
    };

    logs::init(mode.uses_stdio(), config.verbosity);
    logs::info("--- strongSwan VPN gateway container startup");

    if config.debug {
        logs::info(format!("startup dir: {}", config.startup_dir.display()));
        logs::info(format!("application: {}", config.app.display()));
        logs::info(format!("verbosity:   {}", config.verbosity));
    }

    let code = match dispatch(mode, &config, &args) {
        Ok(code) => code,
        Err(error) => {
            logs::error(format!("{:#}", error));
            exit_code_for(&error)
        }
    };

    logs::info(format!("--- container startup exited with code {}", code));
    code
}

/// Exit code for an entrypoint-internal failure. Unit exit codes never
/// pass through here; they are propagated verbatim by `dispatch`.
fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error
        .chain()
        .any(|cause| cause.downcast_ref::<std::io::Error>().is_some())
    {
        EXIT_CODE_IO_ERROR
    } else {
        EXIT_CODE_GENERAL_ERROR
    }
}

/// The mode state machine. Returns the process exit code; on a
/// successful exec-replace this function never returns at all.
fn dispatch(mode: Mode, config: &Config, args: &[OsString]) -> Result<i32> {
    let units = discovery::discover(&config.startup_dir)?;
    let outcome = runner::run_sequence(&units, args)?;

    match mode {
        Mode::Run => match outcome {
            ExitOutcome::Success => handoff::exec_app(&config.app, args),
            other => Ok(other.code()),
        },
        Mode::RunAndEnter => match outcome {
            ExitOutcome::Success => handoff::exec_shell(&ShellInit::launch(&config.app, args)),
            other => Ok(other.code()),
        },
        Mode::PassThrough => match outcome {
            // 127 from the sequence means no unit recognized the
            // directive; execute the arguments as a literal command.
            ExitOutcome::CommandNotFound => handoff::exec_command(args),
            // Success deliberately exits 0 without a hand-off: the
            // directive was consumed by a startup unit.
            other => Ok(other.code()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn to_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn write_unit(root: &Path, name: &str, body: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(discovery::UNIT_SCRIPT_NAME), format!("#!/bin/sh\n{}\n", body)).unwrap();
    }

    fn test_config(startup_dir: &Path) -> Config {
        Config {
            startup_dir: startup_dir.to_path_buf(),
            app: PathBuf::from("/nonexistent/run-app"),
            verbosity: 0,
            debug: false,
        }
    }

    #[test]
    fn test_run_mode_propagates_unit_failure_without_handoff() {
        let root = tempdir().unwrap();
        let trace = root.path().join("trace");
        write_unit(root.path(), "10-initial.startup", &format!("echo one >> {}", trace.display()));
        write_unit(root.path(), "20-network.startup", "exit 3");

        let config = test_config(root.path());
        let code = dispatch(Mode::Run, &config, &to_args(&["run"])).unwrap();
        assert_eq!(code, 3);
        assert_eq!(fs::read_to_string(&trace).unwrap(), "one\n");
    }

    #[test]
    fn test_run_mode_success_proceeds_to_handoff() {
        let root = tempdir().unwrap();
        write_unit(root.path(), "10-initial.startup", "exit 0");
        write_unit(root.path(), "20-network.startup", "exit 0");

        // The configured app does not exist, so the attempted hand-off
        // reports 127 instead of exec-replacing the test process. A
        // failing sequence would have returned the unit's code before
        // reaching exec_app at all.
        let config = test_config(root.path());
        let code = dispatch(Mode::Run, &config, &to_args(&["run"])).unwrap();
        assert_eq!(code, 127);
    }

    #[test]
    fn test_run_mode_without_units_hands_off_directly() {
        let root = tempdir().unwrap();

        let config = test_config(root.path());
        let code = dispatch(Mode::Run, &config, &to_args(&["run"])).unwrap();
        assert_eq!(code, 127);
    }

    #[test]
    fn test_run_and_enter_failure_skips_shell() {
        let root = tempdir().unwrap();
        write_unit(root.path(), "10-initial.startup", "exit 5");

        let config = test_config(root.path());
        let code = dispatch(Mode::RunAndEnter, &config, &to_args(&["run-and-enter"])).unwrap();
        assert_eq!(code, 5);
    }

    #[test]
    fn test_pass_through_success_exits_zero_without_handoff() {
        let root = tempdir().unwrap();
        write_unit(root.path(), "10-initial.startup", "exit 0");

        let config = test_config(root.path());
        let code = dispatch(Mode::PassThrough, &config, &to_args(&["configure"])).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_pass_through_unrecognized_directive_falls_back_to_command() {
        let root = tempdir().unwrap();
        write_unit(root.path(), "10-initial.startup", "exit 127");

        // The fallback command does not exist either, so the hand-off
        // reports 127 instead of exec-replacing the test process.
        let config = test_config(root.path());
        let code = dispatch(
            Mode::PassThrough,
            &config,
            &to_args(&["no-such-command-for-sure-42"]),
        )
        .unwrap();
        assert_eq!(code, 127);
    }

    #[test]
    fn test_pass_through_hard_failure_is_fatal() {
        let root = tempdir().unwrap();
        write_unit(root.path(), "10-initial.startup", "exit 2");

        let config = test_config(root.path());
        let code = dispatch(Mode::PassThrough, &config, &to_args(&["configure"])).unwrap();
        assert_eq!(code, 2);
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(Mode::from_args(&to_args(&["run"])), Some(Mode::Run));
        assert_eq!(Mode::from_args(&to_args(&["run-and-enter"])), Some(Mode::RunAndEnter));
        assert_eq!(Mode::from_args(&to_args(&["sh", "-c", "id"])), Some(Mode::PassThrough));
        assert_eq!(Mode::from_args(&[]), None);
    }

    #[test]
    fn test_mode_selection_is_case_insensitive() {
        assert_eq!(Mode::from_args(&to_args(&["RUN"])), Some(Mode::Run));
        assert_eq!(Mode::from_args(&to_args(&["Run-And-Enter"])), Some(Mode::RunAndEnter));
    }

    #[test]
    fn test_extra_arguments_keep_the_mode() {
        assert_eq!(Mode::from_args(&to_args(&["run", "--verbose"])), Some(Mode::Run));
    }

    #[test]
    fn test_stdio_logging_modes() {
        assert!(Mode::Run.uses_stdio());
        assert!(Mode::RunAndEnter.uses_stdio());
        assert!(!Mode::PassThrough.uses_stdio());
    }

    #[test]
    fn test_no_arguments_exits_zero() {
        assert_eq!(run(Vec::new()), EXIT_CODE_SUCCESS);
    }

    #[test]
    fn test_internal_io_errors_map_to_io_exit_code() {
        let io_error = anyhow::Error::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk unhappy",
        ))
        .context("Failed to read a startup unit.");
        assert_eq!(exit_code_for(&io_error), EXIT_CODE_IO_ERROR);

        let plain = anyhow::anyhow!("not an io failure");
        assert_eq!(exit_code_for(&plain), EXIT_CODE_GENERAL_ERROR);
    }
}
