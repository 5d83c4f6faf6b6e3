// ─── Launch sequencer ───
// Drives one launcher run: platform, package, single instance, cache, VM.

use tracing::{debug, error, info, instrument, warn};

use super::args::{LaunchArgs, ProcessRole};
use crate::core::cache::{CacheDirective, CacheState, CacheStateMachine};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::{SingleInstanceCoordinator, SingleInstanceResult};
use crate::core::messages::Messages;
use crate::core::package::PackageConfig;
use crate::core::platform::Platform;
use crate::core::vm::{LaunchMode, VmRequest, VmRunner};

pub struct Launcher<'a> {
    platform: &'a dyn Platform,
    package: &'a mut dyn PackageConfig,
    vm: &'a dyn VmRunner,
    messages: Messages,
    /// Set once a message was shown. A run never shows a second one.
    notified: bool,
}

impl<'a> Launcher<'a> {
    pub fn new(
        platform: &'a dyn Platform,
        package: &'a mut dyn PackageConfig,
        vm: &'a dyn VmRunner,
    ) -> Self {
        Self {
            platform,
            package,
            vm,
            messages: Messages::default(),
            notified: false,
        }
    }

    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Run the launcher for `argv` (program name first).
    ///
    /// Returns `true` when the VM ran successfully or the launch was handed
    /// off to a running instance. A run shows at most one message.
    pub async fn run(&mut self, argv: &[String]) -> bool {
        match self.launch(argv).await {
            Ok(result) => result,
            Err(LauncherError::CacheFileNotFound { path }) => {
                error!("AppCDS cache file {:?} is missing", path);
                let text = self.messages.cache_file_not_found(&path);
                self.notify(&text);
                false
            }
            Err(err) => {
                error!("Launch failed: {}", err);
                self.notify(&err.to_string());
                false
            }
        }
    }

    fn notify(&mut self, text: &str) {
        if self.notified {
            debug!("Suppressed second message: {}", text);
            return;
        }
        self.notified = true;
        self.platform.show_message(text);
    }

    async fn launch(&mut self, argv: &[String]) -> LauncherResult<bool> {
        self.platform.initialize()?;

        let args = LaunchArgs::parse(argv);

        #[cfg(debug_assertions)]
        if args.native_debug {
            self.wait_for_native_debugger().await;
        }

        self.package.initialize()?;
        self.package
            .set_command_line_arguments(args.passthrough.clone());
        let app_dir = self.package.app_directory()?;
        self.platform.set_current_directory(&app_dir)?;

        if args.role == ProcessRole::Parent {
            match SingleInstanceCoordinator::new(self.platform)
                .check(&*self.package)
                .await
            {
                SingleInstanceResult::OtherInstanceFoundWithArgsToForward { pid } => {
                    self.platform.reactivate_another_instance(Some(pid)).await;
                    return self
                        .run_vm(
                            LaunchMode::SingleInstanceNotification,
                            CacheDirective::None,
                            Some(pid),
                        )
                        .await;
                }
                SingleInstanceResult::OtherInstanceFoundNoArgs { pid } => {
                    self.platform.reactivate_another_instance(pid).await;
                    info!("Handed off to the running instance");
                    return Ok(true);
                }
                SingleInstanceResult::NoOtherInstance => {}
            }
        }

        let initial = CacheState::initial(args.cache_state, self.package.cache_mode());
        let state = CacheStateMachine::new(self.platform)
            .resolve(initial, args.role, &mut *self.package)
            .await?;

        self.validate_cache(state).await?;

        let directive = match state {
            CacheState::Uninitialized => CacheDirective::None,
            _ => CacheDirective::for_state(state, &self.package.cache_paths()?),
        };
        self.run_vm(LaunchMode::UserAppLaunch, directive, None).await
    }

    /// An `Enabled`/`Auto` launch needs the cache file on disk. An
    /// `Uninitialized` state is reported and the launch goes on without a cache.
    async fn validate_cache(&mut self, state: CacheState) -> LauncherResult<()> {
        if state.requires_cache_file() {
            let cache_file = self.package.cache_paths()?.cache_file;
            if !self.platform.file_exists(&cache_file).await {
                return Err(LauncherError::CacheFileNotFound { path: cache_file });
            }
        } else if state == CacheState::Uninitialized {
            warn!("Cache state was never resolved, continuing without AppCDS");
            let text = self.messages.internal_error();
            self.notify(&text);
        }
        Ok(())
    }

    #[instrument(skip(self, cache))]
    async fn run_vm(
        &mut self,
        mode: LaunchMode,
        cache: CacheDirective,
        other_instance_pid: Option<u32>,
    ) -> LauncherResult<bool> {
        let request = VmRequest {
            mode,
            cache,
            app: self.package.launch_spec()?,
            arguments: self.package.app_args(),
            other_instance_pid,
        };

        let success = self.vm.run(&request).await;
        if !success {
            let text = self.messages.failed_to_launch_vm();
            self.notify(&text);
        }
        Ok(success)
    }

    #[cfg(debug_assertions)]
    async fn wait_for_native_debugger(&self) {
        use crate::core::platform::MessageResponse;

        let prompt = self.messages.debug_prompt(self.platform.process_id());
        if self.platform.show_response_message("Test", &prompt) != MessageResponse::Ok {
            return;
        }
        info!("Waiting for a native debugger to attach");
        while !self.platform.native_debugger_present() {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }
}
