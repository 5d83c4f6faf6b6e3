// ─── Single instance ───
// Decides whether this launch hands off to an already running instance.

use tracing::{debug, info};

use crate::core::package::PackageConfig;
use crate::core::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleInstanceResult {
    NoOtherInstance,
    /// The running instance is alive and there are user arguments to pass on.
    OtherInstanceFoundWithArgsToForward { pid: u32 },
    OtherInstanceFoundNoArgs { pid: Option<u32> },
}

pub struct SingleInstanceCoordinator<'a> {
    platform: &'a dyn Platform,
}

impl<'a> SingleInstanceCoordinator<'a> {
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    pub async fn check(&self, config: &dyn PackageConfig) -> SingleInstanceResult {
        if !config.single_instance() {
            debug!("Single instance policy is off");
            return SingleInstanceResult::NoOtherInstance;
        }

        let Some(other) = self.platform.check_for_single_instance(config.name()).await else {
            return SingleInstanceResult::NoOtherInstance;
        };

        let result = match other.pid {
            Some(pid)
                if !config.user_args().is_empty()
                    && pid != 0
                    && self.platform.is_process_alive(pid) =>
            {
                SingleInstanceResult::OtherInstanceFoundWithArgsToForward { pid }
            }
            pid => SingleInstanceResult::OtherInstanceFoundNoArgs { pid },
        };
        info!("Another instance of '{}' is running: {:?}", config.name(), result);
        result
    }
}
