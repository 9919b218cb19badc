use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "previewer",
    version,
    about = "Serves exact-size image previews with a disk-backed LRU cache",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", env = "PREVIEWER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", env = "PREVIEWER_LOG_PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, env = "PREVIEWER_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Interface to bind.
    #[arg(long, env = "PREVIEWER_HOST")]
    pub host: Option<String>,

    /// TCP port to bind.
    #[arg(short, long, env = "PREVIEWER_PORT")]
    pub port: Option<u16>,

    /// Scheme used to fetch source images.
    #[arg(long, env = "PREVIEWER_PROTOCOL")]
    pub protocol: Option<String>,

    /// Source download timeout in seconds.
    #[arg(long, env = "PREVIEWER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Maximum number of cached previews.
    #[arg(long, env = "PREVIEWER_CACHE_CAPACITY")]
    pub cache_capacity: Option<usize>,

    /// Directory holding cached previews.
    #[arg(long, value_name = "PATH", env = "PREVIEWER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}
