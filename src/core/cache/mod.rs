pub mod state_machine;

pub use state_machine::CacheStateMachine;

use std::path::PathBuf;

/// AppCDS cache lifecycle for one launcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheState {
    Uninitialized,
    Disabled,
    GenerateCache,
    Enabled,
    Auto,
}

impl CacheState {
    /// Initial state: a command-line flag wins over the package configuration.
    /// With neither, the state stays `Uninitialized`.
    pub fn initial(flag: Option<CacheState>, configured: Option<CacheState>) -> Self {
        flag.or(configured).unwrap_or(CacheState::Uninitialized)
    }

    /// The single legal in-flight transition: `Auto` becomes `Disabled`.
    /// Every other state is returned as-is.
    pub fn downgraded(self) -> Self {
        match self {
            CacheState::Auto => CacheState::Disabled,
            other => other,
        }
    }

    /// States whose launch depends on an existing cache file.
    pub fn requires_cache_file(self) -> bool {
        matches!(self, CacheState::Enabled | CacheState::Auto)
    }
}

/// Where the cache lives, derived from the package configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    pub cache_dir: PathBuf,
    pub cache_file: PathBuf,
}

impl CachePaths {
    pub fn new(cache_dir: PathBuf, file_name: &str) -> Self {
        let cache_file = cache_dir.join(file_name);
        Self {
            cache_dir,
            cache_file,
        }
    }
}

/// What the VM must do with the cache on this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDirective {
    None,
    Generate(PathBuf),
    Use(PathBuf),
}

impl CacheDirective {
    pub fn for_state(state: CacheState, paths: &CachePaths) -> Self {
        match state {
            CacheState::GenerateCache => CacheDirective::Generate(paths.cache_file.clone()),
            CacheState::Enabled | CacheState::Auto => {
                CacheDirective::Use(paths.cache_file.clone())
            }
            CacheState::Disabled | CacheState::Uninitialized => CacheDirective::None,
        }
    }
}
