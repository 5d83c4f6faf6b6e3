// ─── Native platform ───
// Real filesystem, process table and console for the running OS.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::lock::{self, InstanceLockGuard, LockOutcome};
use super::{MessageResponse, OtherInstance, Platform, ProcessExit};
use crate::core::error::{LauncherError, LauncherResult};

const LOCK_DIR_NAME: &str = "applauncher";

pub struct NativePlatform {
    module_file: OnceLock<PathBuf>,
    lock_dir: PathBuf,
    app_name: OnceLock<String>,
    instance_lock: Mutex<Option<InstanceLockGuard>>,
}

impl Default for NativePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl NativePlatform {
    pub fn new() -> Self {
        Self::with_lock_dir(default_lock_dir())
    }

    pub fn with_lock_dir(lock_dir: PathBuf) -> Self {
        Self {
            module_file: OnceLock::new(),
            lock_dir,
            app_name: OnceLock::new(),
            instance_lock: Mutex::new(None),
        }
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    fn display_name(&self) -> String {
        self.module_file
            .get()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| LOCK_DIR_NAME.to_string())
    }
}

#[async_trait]
impl Platform for NativePlatform {
    fn initialize(&self) -> LauncherResult<()> {
        self.module_file_name()?;
        std::fs::create_dir_all(&self.lock_dir)
            .map_err(|source| LauncherError::io(&self.lock_dir, source))?;
        debug!("Platform ready, lock dir {:?}", self.lock_dir);
        Ok(())
    }

    fn module_file_name(&self) -> LauncherResult<PathBuf> {
        if let Some(path) = self.module_file.get() {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe()?;
        let exe = std::fs::canonicalize(&exe).unwrap_or(exe);
        let _ = self.module_file.set(exe.clone());
        Ok(exe)
    }

    fn set_current_directory(&self, path: &Path) -> LauncherResult<()> {
        std::env::set_current_dir(path).map_err(|source| LauncherError::io(path, source))
    }

    async fn directory_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }

    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }

    async fn create_directory(&self, path: &Path, recursive: bool) -> LauncherResult<()> {
        let result = if recursive {
            tokio::fs::create_dir_all(path).await
        } else {
            tokio::fs::create_dir(path).await
        };
        result.map_err(|source| LauncherError::io(path, source))
    }

    async fn delete_file(&self, path: &Path) -> LauncherResult<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|source| LauncherError::io(path, source))
    }

    #[instrument(skip(self))]
    async fn execute(&self, program: &Path, args: &[String]) -> LauncherResult<ProcessExit> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| LauncherError::ProcessSpawn {
            program: program.to_path_buf(),
            source,
        })?;
        info!("Started {:?} (pid {:?}), waiting for it to exit", program, child.id());

        let status = child
            .wait()
            .await
            .map_err(|source| LauncherError::io(program, source))?;
        Ok(ProcessExit {
            code: status.code(),
        })
    }

    fn process_id(&self) -> u32 {
        std::process::id()
    }

    fn is_process_alive(&self, pid: u32) -> bool {
        if pid == 0 {
            return false;
        }
        let pid = sysinfo::Pid::from_u32(pid);
        let mut system = sysinfo::System::new();
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
        system.process(pid).is_some()
    }

    async fn check_for_single_instance(&self, app_name: &str) -> Option<OtherInstance> {
        let _ = self.app_name.set(app_name.to_string());
        let path = lock::lock_path(&self.lock_dir, app_name);

        match lock::try_acquire(&path, self.process_id(), |pid| self.is_process_alive(pid)).await
        {
            Ok(LockOutcome::Acquired(guard)) => {
                match self.instance_lock.lock() {
                    Ok(mut slot) => *slot = Some(guard),
                    Err(poisoned) => *poisoned.into_inner() = Some(guard),
                }
                None
            }
            Ok(LockOutcome::Held { pid }) => Some(OtherInstance { pid }),
            Err(err) => {
                warn!("Unable to check for single instance: {}", err);
                None
            }
        }
    }

    async fn reactivate_another_instance(&self, pid: Option<u32>) {
        let Some(pid) = pid else {
            warn!("Unable to reactivate another instance, PID is undefined");
            return;
        };
        let app_name = self
            .app_name
            .get()
            .cloned()
            .unwrap_or_else(|| self.display_name());
        let path = lock::activation_path(&self.lock_dir, &app_name);
        match lock::write_activation_request(&path, self.process_id(), pid).await {
            Ok(()) => info!("Asked instance {} to reactivate via {:?}", pid, path),
            Err(err) => warn!("Failed to reactivate instance {}: {}", pid, err),
        }
    }

    fn show_message(&self, description: &str) {
        eprintln!("{} {}", self.display_name(), description);
    }

    fn show_response_message(&self, title: &str, description: &str) -> MessageResponse {
        print!("{} {} (Y/N) ", title, description);
        let _ = std::io::stdout().flush();

        let mut input = String::new();
        if std::io::stdin().lock().read_line(&mut input).is_err() {
            return MessageResponse::Cancel;
        }
        if input.trim().eq_ignore_ascii_case("y") {
            MessageResponse::Ok
        } else {
            MessageResponse::Cancel
        }
    }

    fn native_debugger_present(&self) -> bool {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/self/status")
                .map(|status| tracer_pid(&status).is_some_and(|pid| pid != 0))
                .unwrap_or(false)
        }
        #[cfg(not(target_os = "linux"))]
        {
            false
        }
    }
}

/// Per-user directory for instance locks. `/tmp` is shared between users, so
/// it is only the last resort.
fn default_lock_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(LOCK_DIR_NAME)
}

/// `TracerPid` from a `/proc/<pid>/status` document.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn tracer_pid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("TracerPid:"))
        .and_then(|value| value.trim().parse().ok())
}
