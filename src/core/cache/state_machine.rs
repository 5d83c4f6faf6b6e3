// ─── AppCDS cache state machine ───
// Materializes the resolved cache state on disk before the VM starts.

use tracing::{debug, info, instrument, warn};

use super::CacheState;
use crate::core::error::LauncherResult;
use crate::core::launch::args::{generate_cache_child_args, ProcessRole};
use crate::core::package::PackageConfig;
use crate::core::platform::Platform;

pub struct CacheStateMachine<'a> {
    platform: &'a dyn Platform,
}

impl<'a> CacheStateMachine<'a> {
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    /// Perform the side effects `state` calls for and return the state the
    /// launch continues with. Only `Auto` can come back different (`Disabled`).
    ///
    /// Filesystem and spawn failures are returned to the caller untouched.
    /// A generation child that leaves no cache file behind is not an error.
    pub async fn resolve(
        &self,
        state: CacheState,
        role: ProcessRole,
        package: &mut dyn PackageConfig,
    ) -> LauncherResult<CacheState> {
        let resolved = match state {
            CacheState::Disabled | CacheState::Enabled | CacheState::Uninitialized => state,
            CacheState::GenerateCache => {
                self.prepare_generation(&*package).await?;
                state
            }
            CacheState::Auto => self.ensure_generated(state, role, package).await?,
        };
        debug!("Cache state {:?} resolved to {:?}", state, resolved);
        Ok(resolved)
    }

    /// Give the VM a clean target: create the directory, or drop a stale
    /// archive from an existing one.
    async fn prepare_generation(&self, package: &dyn PackageConfig) -> LauncherResult<()> {
        let paths = package.cache_paths()?;

        if !self.platform.directory_exists(&paths.cache_dir).await {
            info!("Creating AppCDS cache directory {:?}", paths.cache_dir);
            self.platform
                .create_directory(&paths.cache_dir, true)
                .await?;
        } else if self.platform.file_exists(&paths.cache_file).await {
            info!("Removing stale AppCDS cache {:?}", paths.cache_file);
            self.platform.delete_file(&paths.cache_file).await?;
        }

        Ok(())
    }

    #[instrument(skip(self, package))]
    async fn ensure_generated(
        &self,
        state: CacheState,
        role: ProcessRole,
        package: &mut dyn PackageConfig,
    ) -> LauncherResult<CacheState> {
        if role == ProcessRole::Child {
            debug!("Child process never spawns cache generation");
            return Ok(state);
        }

        let cache_file = package.cache_paths()?.cache_file;
        if self.platform.file_exists(&cache_file).await {
            return Ok(state);
        }

        let launcher = self.platform.module_file_name()?;
        info!("AppCDS cache missing, generating it with {:?}", launcher);
        let exit = self
            .platform
            .execute(&launcher, &generate_cache_child_args())
            .await?;
        debug!("Cache generation child exited with {:?}", exit.code);

        if self.platform.file_exists(&cache_file).await {
            info!("AppCDS cache generated at {:?}", cache_file);
            return Ok(state);
        }

        warn!(
            "AppCDS cache still missing after generation (exit {:?}), running without it",
            exit.code
        );
        downgrade(state, package)
    }
}

/// Apply the `Auto` → `Disabled` fallback. When the state actually changes the
/// package is rebuilt so nothing derived under the cache assumption survives.
/// On any other state this does nothing.
pub fn downgrade(state: CacheState, package: &mut dyn PackageConfig) -> LauncherResult<CacheState> {
    let next = state.downgraded();
    if next != state {
        package.clear();
        package.initialize()?;
    }
    Ok(next)
}
