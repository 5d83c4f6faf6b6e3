pub mod config;
pub mod model;

pub use config::Package;
pub use model::{AppCdsMode, AppLaunchSpec, MainEntry, PackageFile};

use std::path::PathBuf;

use crate::core::cache::{CachePaths, CacheState};
use crate::core::error::LauncherResult;

/// Application configuration as seen by the bootstrap.
pub trait PackageConfig: Send + Sync {
    /// Load (or reload) the configuration and everything derived from it.
    fn initialize(&mut self) -> LauncherResult<()>;

    /// Drop every derived value. Command-line arguments survive.
    fn clear(&mut self);

    fn set_command_line_arguments(&mut self, args: Vec<String>);

    fn name(&self) -> &str;

    fn app_directory(&self) -> LauncherResult<PathBuf>;

    fn cache_paths(&self) -> LauncherResult<CachePaths>;

    /// Cache state requested by the configuration, if it names one.
    fn cache_mode(&self) -> Option<CacheState>;

    fn single_instance(&self) -> bool;

    /// Arguments supplied by the user on this invocation.
    fn user_args(&self) -> &[String];

    /// Arguments the application should receive: user arguments if any were
    /// given, the configured defaults otherwise.
    fn app_args(&self) -> Vec<String>;

    fn launch_spec(&self) -> LauncherResult<AppLaunchSpec>;
}
