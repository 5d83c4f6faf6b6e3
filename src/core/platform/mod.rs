// ─── Platform services ───
// Filesystem, process and user-interaction primitives the bootstrap relies on.

pub mod lock;
pub mod native;

pub use native::NativePlatform;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::core::error::LauncherResult;

/// Exit status of a child process. `code` is `None` when the child was
/// terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A running instance of the same application, found through the instance lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtherInstance {
    pub pid: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageResponse {
    Ok,
    Cancel,
}

#[async_trait]
pub trait Platform: Send + Sync {
    /// Must run before any other call.
    fn initialize(&self) -> LauncherResult<()>;

    /// Absolute path of the running launcher executable.
    fn module_file_name(&self) -> LauncherResult<PathBuf>;

    fn set_current_directory(&self, path: &Path) -> LauncherResult<()>;

    async fn directory_exists(&self, path: &Path) -> bool;

    async fn file_exists(&self, path: &Path) -> bool;

    async fn create_directory(&self, path: &Path, recursive: bool) -> LauncherResult<()>;

    async fn delete_file(&self, path: &Path) -> LauncherResult<()>;

    /// Run `program` with `args` and block until it exits.
    async fn execute(&self, program: &Path, args: &[String]) -> LauncherResult<ProcessExit>;

    fn process_id(&self) -> u32;

    fn is_process_alive(&self, pid: u32) -> bool;

    /// `Some` when another instance of `app_name` already holds the instance lock.
    /// Otherwise this process takes the lock for the rest of its lifetime.
    async fn check_for_single_instance(&self, app_name: &str) -> Option<OtherInstance>;

    /// Ask the running instance to come to the foreground. Best effort.
    async fn reactivate_another_instance(&self, pid: Option<u32>);

    fn show_message(&self, description: &str);

    fn show_response_message(&self, title: &str, description: &str) -> MessageResponse;

    fn native_debugger_present(&self) -> bool;
}
