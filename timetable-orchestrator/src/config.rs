//! Service configuration for timetable-orchestrator
//!
//! Priority: command line → environment → TOML file → compiled default.

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use timetable_common::config::{
    database_path, resolve_root_folder, TomlConfig, DEFAULT_ENGINE_TIMEOUT_SECS,
    DEFAULT_ENGINE_URL,
};
use timetable_common::{Error, Result};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "TIMETABLE_ROOT_FOLDER";

/// TOML file name under the platform config directory
pub const CONFIG_FILE_NAME: &str = "orchestrator.toml";

/// Command-line arguments for timetable-orchestrator
#[derive(Parser, Debug, Clone)]
#[command(name = "timetable-orchestrator")]
#[command(about = "Timetable generation and approval service")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5780", env = "TIMETABLE_PORT")]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "TIMETABLE_BIND")]
    pub bind: IpAddr,

    /// Folder holding the database (also read from TIMETABLE_ROOT_FOLDER)
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// Base URL of the optimization engine
    #[arg(long, env = "TIMETABLE_ENGINE_URL")]
    pub engine_url: Option<String>,

    /// Seconds to wait for the engine before giving up
    #[arg(long, env = "TIMETABLE_ENGINE_TIMEOUT_SECS")]
    pub engine_timeout_secs: Option<u64>,

    /// TOML config file (defaults to the platform config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Fully resolved service settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub listen_addr: SocketAddr,
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub engine_url: String,
    pub engine_timeout_secs: u64,
    pub log_level: String,
}

impl ServiceConfig {
    pub fn resolve(args: &Args, toml_config: &TomlConfig) -> Result<Self> {
        let root_folder =
            resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, toml_config);

        let engine_url = args
            .engine_url
            .clone()
            .or_else(|| toml_config.engine.url.clone())
            .unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string());
        if !engine_url.starts_with("http://") && !engine_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Engine URL must be http(s): {}",
                engine_url
            )));
        }

        let engine_timeout_secs = args
            .engine_timeout_secs
            .or(toml_config.engine.timeout_secs)
            .unwrap_or(DEFAULT_ENGINE_TIMEOUT_SECS);
        if engine_timeout_secs == 0 {
            return Err(Error::Config("Engine timeout must be at least 1 second".into()));
        }

        Ok(Self {
            listen_addr: SocketAddr::new(args.bind, args.port),
            database_path: database_path(&root_folder),
            root_folder,
            engine_url,
            engine_timeout_secs,
            log_level: toml_config.logging.level.clone(),
        })
    }

    /// Default tracing filter when RUST_LOG is unset
    pub fn default_log_filter(&self) -> String {
        format!(
            "timetable_orchestrator={level},timetable_common={level},tower_http={level}",
            level = self.log_level
        )
    }
}
