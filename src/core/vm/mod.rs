pub mod java;

pub use java::JavaVm;

use async_trait::async_trait;

use crate::core::cache::CacheDirective;
use crate::core::package::AppLaunchSpec;

/// What kind of run the VM is started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    UserAppLaunch,
    SingleInstanceNotification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRequest {
    pub mode: LaunchMode,
    pub cache: CacheDirective,
    pub app: AppLaunchSpec,
    pub arguments: Vec<String>,
    /// PID of the running instance a notification launch is aimed at.
    pub other_instance_pid: Option<u32>,
}

#[async_trait]
pub trait VmRunner: Send + Sync {
    /// Start the runtime and wait for it. `true` means the run succeeded.
    async fn run(&self, request: &VmRequest) -> bool;
}
