//! Shell initialization for `run-and-enter` mode
//!
//! When the operator enters the container interactively, the application
//! can be launched in the background so the gateway still comes up. The
//! decision travels as an explicit `ShellInit` value rather than ambient
//! environment state; a generated bash rcfile performs the launch,
//! records the PID and tears the process down when the shell exits.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Background application stdout log.
pub const APP_STDOUT_LOG: &str = "/var/log/app-stdout.log";

/// Background application stderr log.
pub const APP_STDERR_LOG: &str = "/var/log/app-stderr.log";

/// File recording the background application's PID.
pub const APP_PID_FILE: &str = "/run/app.pid";

/// Configuration for the interactive shell's initialization.
#[derive(Debug, Clone)]
pub struct ShellInit {
    /// Launch the application in the background before presenting the
    /// prompt.
    pub launch_app: bool,
    /// The application to launch.
    pub app: PathBuf,
    /// Arguments threaded through to the application.
    pub args: Vec<OsString>,
    pub stdout_log: PathBuf,
    pub stderr_log: PathBuf,
    pub pid_file: PathBuf,
}

impl ShellInit {
    /// Shell init that launches `app` in the background with the fixed
    /// log and PID file paths.
    pub fn launch(app: &Path, args: &[OsString]) -> Self {
        ShellInit {
            launch_app: true,
            app: app.to_path_buf(),
            args: args.to_vec(),
            stdout_log: PathBuf::from(APP_STDOUT_LOG),
            stderr_log: PathBuf::from(APP_STDERR_LOG),
            pid_file: PathBuf::from(APP_PID_FILE),
        }
    }

    /// Render the bash rcfile for this configuration.
    pub fn rcfile_contents(&self) -> String {
        let mut script = String::new();
        script.push_str("# Generated by the container entrypoint for run-and-enter mode.\n");
        script.push_str("[ -f \"$HOME/.bashrc\" ] && . \"$HOME/.bashrc\"\n");

        if self.launch_app {
            let mut command = sh_quote(&self.app.to_string_lossy());
            for arg in &self.args {
                command.push(' ');
                command.push_str(&sh_quote(&arg.to_string_lossy()));
            }

            script.push('\n');
            script.push_str(&format!(
                "{} >{} 2>{} &\n",
                command,
                sh_quote(&self.stdout_log.to_string_lossy()),
                sh_quote(&self.stderr_log.to_string_lossy())
            ));
            script.push_str("APP_PID=$!\n");
            script.push_str(&format!(
                "echo \"$APP_PID\" > {}\n",
                sh_quote(&self.pid_file.to_string_lossy())
            ));
            script.push_str("trap 'kill \"$APP_PID\" 2>/dev/null' EXIT\n");
            script.push_str("echo \"Application is running in the background (pid $APP_PID).\"\n");
        }

        script
    }

    /// Write the rcfile to a persistent temporary file and return its
    /// path. The file outlives this process; bash reads it after the
    /// exec-replace.
    pub fn write_rcfile(&self) -> Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix("entrypoint-rc-")
            .suffix(".sh")
            .tempfile()
            .context("Failed to create the shell init file.")?;
        file.write_all(self.rcfile_contents().as_bytes())
            .context("Failed to write the shell init file.")?;
        let (_, path) = file
            .keep()
            .context("Failed to persist the shell init file.")?;
        Ok(path)
    }
}

/// Quote a string for safe interpolation into a bash script.
fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
