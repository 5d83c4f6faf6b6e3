// ─── Instance lock ───
// One lock file per application name. The holder writes its pid; a lock whose
// pid is gone is stale and gets reclaimed.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};

const LOCK_EXTENSION: &str = "lock";
const ACTIVATE_EXTENSION: &str = "activate";
/// A lock file without a readable payload is treated as being written for this long.
const UNREADABLE_LOCK_GRACE: Duration = Duration::from_secs(10);
const ACQUIRE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LockPayload {
    pid: u32,
    timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub requester_pid: u32,
    pub target_pid: u32,
    pub timestamp: i64,
}

#[derive(Debug)]
pub enum LockOutcome {
    Acquired(InstanceLockGuard),
    /// Another live process holds the lock. `pid` is `None` when the payload
    /// could not be read yet.
    Held { pid: Option<u32> },
}

/// Removes the lock file when dropped.
#[derive(Debug)]
pub struct InstanceLockGuard {
    path: PathBuf,
}

impl Drop for InstanceLockGuard {
    fn drop(&mut self) {
        if let Err(source) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove instance lock {:?}: {}", self.path, source);
        }
    }
}

/// Strip characters that cannot appear in a file name on any platform.
pub fn fix_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '?' | ':' | '*' | '<' | '>' | '/' | '\\'))
        .collect()
}

pub fn lock_path(lock_dir: &Path, app_name: &str) -> PathBuf {
    lock_dir.join(format!("{}.{}", fix_name(app_name), LOCK_EXTENSION))
}

pub fn activation_path(lock_dir: &Path, app_name: &str) -> PathBuf {
    lock_dir.join(format!("{}.{}", fix_name(app_name), ACTIVATE_EXTENSION))
}

pub async fn try_acquire(
    lock_path: &Path,
    own_pid: u32,
    is_alive: impl Fn(u32) -> bool,
) -> LauncherResult<LockOutcome> {
    for _ in 0..ACQUIRE_ATTEMPTS {
        match tokio::fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(lock_path)
            .await
        {
            Ok(mut file) => {
                let payload = LockPayload {
                    pid: own_pid,
                    timestamp: Utc::now().timestamp(),
                };
                let guard = InstanceLockGuard {
                    path: lock_path.to_path_buf(),
                };
                file.write_all(serde_json::to_string(&payload)?.as_bytes())
                    .await
                    .map_err(|source| LauncherError::io(lock_path, source))?;
                file.flush()
                    .await
                    .map_err(|source| LauncherError::io(lock_path, source))?;
                debug!("Took instance lock {:?}", lock_path);
                return Ok(LockOutcome::Acquired(guard));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                match read_holder(lock_path).await {
                    Some(pid) if pid != own_pid && is_alive(pid) => {
                        info!("Another instance is running with PID {}", pid);
                        return Ok(LockOutcome::Held { pid: Some(pid) });
                    }
                    Some(pid) => {
                        info!("Reclaiming stale instance lock left by PID {}", pid);
                        remove_stale(lock_path, Some(pid)).await?;
                    }
                    None if lock_is_fresh(lock_path).await => {
                        return Ok(LockOutcome::Held { pid: None });
                    }
                    None => {
                        info!("Reclaiming unreadable instance lock {:?}", lock_path);
                        remove_stale(lock_path, None).await?;
                    }
                }
            }
            Err(source) => return Err(LauncherError::io(lock_path, source)),
        }
    }

    warn!("Instance lock {:?} keeps changing hands", lock_path);
    Ok(LockOutcome::Held { pid: None })
}

async fn read_holder(lock_path: &Path) -> Option<u32> {
    let content = tokio::fs::read_to_string(lock_path).await.ok()?;
    let payload: LockPayload = serde_json::from_str(&content).ok()?;
    (payload.pid != 0).then_some(payload.pid)
}

async fn lock_is_fresh(lock_path: &Path) -> bool {
    let Ok(metadata) = tokio::fs::metadata(lock_path).await else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    SystemTime::now()
        .duration_since(modified)
        .map(|age| age < UNREADABLE_LOCK_GRACE)
        .unwrap_or(true)
}

/// Delete the lock only if it still names `stale_holder`. Another launcher may
/// have reclaimed it since it was read, and that lock is live.
async fn remove_stale(lock_path: &Path, stale_holder: Option<u32>) -> LauncherResult<()> {
    let current = read_holder(lock_path).await;
    if current != stale_holder {
        debug!(
            "Instance lock {:?} changed hands ({:?} -> {:?}), leaving it",
            lock_path, stale_holder, current
        );
        return Ok(());
    }
    match tokio::fs::remove_file(lock_path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LauncherError::io(lock_path, source)),
    }
}

/// Leave an activation request for the running instance.
pub async fn write_activation_request(
    path: &Path,
    requester_pid: u32,
    target_pid: u32,
) -> LauncherResult<()> {
    let request = ActivationRequest {
        requester_pid,
        target_pid,
        timestamp: Utc::now().timestamp(),
    };
    let payload = serde_json::to_string_pretty(&request)?;
    tokio::fs::write(path, payload)
        .await
        .map_err(|source| LauncherError::io(path, source))
}
