pub mod core;

use std::ffi::{c_char, c_int, CStr};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::core::launch::Launcher;
use crate::core::package::Package;
use crate::core::platform::NativePlatform;
use crate::core::vm::JavaVm;

fn init_logging() {
    // The launched application owns stdout.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,applauncher_lib=info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Binary entry point.
pub fn run() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    if start(argv) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn start(argv: Vec<String>) -> bool {
    init_logging();
    tracing::debug!("AppLauncher starting with {} argument(s)", argv.len());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("Failed to start async runtime: {}", err);
            return false;
        }
    };

    runtime.block_on(async move {
        let launcher_path = match std::env::current_exe() {
            Ok(path) => path,
            Err(err) => {
                tracing::error!("Cannot locate launcher executable: {}", err);
                return false;
            }
        };

        let platform = NativePlatform::new();
        let mut package = Package::new(launcher_path);
        let vm = JavaVm::new();
        let mut launcher = Launcher::new(&platform, &mut package, &vm);

        tokio::select! {
            result = launcher.run(&argv) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("Interrupted, stopping launcher");
                false
            }
        }
    })
}

/// C entry point for a native stub executable.
///
/// # Safety
///
/// `argv` must point to `argc` valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn start_launcher(argc: c_int, argv: *const *const c_char) -> bool {
    let mut args = Vec::new();
    if !argv.is_null() {
        for index in 0..usize::try_from(argc).unwrap_or(0) {
            let arg = *argv.add(index);
            if arg.is_null() {
                break;
            }
            args.push(CStr::from_ptr(arg).to_string_lossy().into_owned());
        }
    }
    start(args)
}

/// Shutdown hook paired with [`start_launcher`]. Nothing to release.
#[no_mangle]
pub extern "C" fn stop_launcher() {}
