//! Environment-driven entrypoint configuration

use anyhow::Result;
use std::path::PathBuf;

use crate::env;

const STARTUP_DIR_ENV: &str = "STARTUP_DIR";
const STARTUP_VERBOSITY_ENV: &str = "STARTUP_VERBOSITY";
const DOCKER_APP_ENV: &str = "DOCKER_APP";
const DEBUG_ENV: &str = "DEBUG";

const DEFAULT_STARTUP_DIR: &str = "/docker-startup";
const DEFAULT_APP: &str = "/docker-startup/run-app";
const DEFAULT_VERBOSITY: i64 = 4;

/// Effective entrypoint configuration, read once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory scanned for `*.startup` unit directories.
    pub startup_dir: PathBuf,
    /// The long-running application handed off to after startup.
    pub app: PathBuf,
    /// Log verbosity, 0 (off) to 5 (debug).
    pub verbosity: u8,
    /// Dump the effective configuration on startup.
    pub debug: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            startup_dir: PathBuf::from(env::get_string(STARTUP_DIR_ENV, DEFAULT_STARTUP_DIR)),
            app: PathBuf::from(env::get_string(DOCKER_APP_ENV, DEFAULT_APP)),
            verbosity: env::get_integer(STARTUP_VERBOSITY_ENV, DEFAULT_VERBOSITY, 0, 5)? as u8,
            debug: env::get_bool(DEBUG_ENV, false)?,
        })
    }
}
