// ─── Launcher arguments ───
// Picks the launcher's own flags out of argv. Everything else belongs to the application.

use tracing::debug;

use crate::core::cache::CacheState;

pub const GENERATE_CACHE_FLAG: &str = "-Xappcds:generatecache";
pub const CACHE_OFF_FLAG: &str = "-Xappcds:off";
pub const CHILD_FLAG: &str = "-Xapp:child";
pub const NATIVE_DEBUG_FLAG: &str = "-nativedebug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessRole {
    #[default]
    Parent,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Cache state requested on the command line, if any.
    pub cache_state: Option<CacheState>,
    pub role: ProcessRole,
    pub native_debug: bool,
    /// Application arguments, in their original order.
    pub passthrough: Vec<String>,
}

impl LaunchArgs {
    /// Parse a full argv (program name first).
    ///
    /// Flags may appear anywhere and are consumed even when repeated.
    /// `-Xappcds:off` wins over `-Xappcds:generatecache` regardless of order.
    pub fn parse(argv: &[String]) -> Self {
        let mut parsed = LaunchArgs::default();
        let mut generate = false;
        let mut off = false;

        for arg in argv.iter().skip(1) {
            match arg.as_str() {
                GENERATE_CACHE_FLAG => generate = true,
                CACHE_OFF_FLAG => off = true,
                CHILD_FLAG => parsed.role = ProcessRole::Child,
                NATIVE_DEBUG_FLAG if cfg!(debug_assertions) => parsed.native_debug = true,
                _ => parsed.passthrough.push(arg.clone()),
            }
        }

        parsed.cache_state = if off {
            Some(CacheState::Disabled)
        } else if generate {
            Some(CacheState::GenerateCache)
        } else {
            None
        };

        debug!(
            "Launcher flags: cache={:?} role={:?} native_debug={} app_args={}",
            parsed.cache_state,
            parsed.role,
            parsed.native_debug,
            parsed.passthrough.len()
        );
        parsed
    }
}

/// Arguments for the cache-generation child. The child flag keeps it from
/// forking again or taking part in single-instance checks.
pub fn generate_cache_child_args() -> Vec<String> {
    vec![GENERATE_CACHE_FLAG.to_string(), CHILD_FLAG.to_string()]
}
