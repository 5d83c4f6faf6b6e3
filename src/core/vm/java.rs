// ─── Java VM runner ───
// Starts the bundled Java runtime as a child process and waits for it.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

use super::{LaunchMode, VmRequest, VmRunner};
use crate::core::cache::CacheDirective;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::package::MainEntry;

const SINGLE_INSTANCE_PID_PROPERTY: &str = "jpackage.app.singleinstance.pid";
const CACHE_FILE_TOKEN: &str = "$CACHEFILE";
const CACHE_DIR_TOKEN: &str = "$CACHEDIR";

#[derive(Debug, Clone, Default)]
pub struct JavaVm;

impl JavaVm {
    pub fn new() -> Self {
        Self
    }

    fn build_command(&self, request: &VmRequest) -> LauncherResult<tokio::process::Command> {
        let java_bin = java_binary(&request.app.runtime_home);
        let mut cmd = tokio::process::Command::new(&java_bin);
        cmd.args(jvm_arguments(request)?);
        configure_native_library_env(&mut cmd, &request.app.app_dir);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        Ok(cmd)
    }

    async fn launch(&self, request: &VmRequest) -> LauncherResult<bool> {
        let mut cmd = self.build_command(request)?;
        info!(
            "Launching {:?} with Java from {:?}",
            request.mode, request.app.runtime_home
        );
        debug!(
            "Command (copy/paste): {}",
            format_command_for_logs(cmd.as_std())
        );

        let program = PathBuf::from(cmd.as_std().get_program());
        let mut child = cmd.spawn().map_err(|source| LauncherError::ProcessSpawn {
            program: program.clone(),
            source,
        })?;
        let status = child
            .wait()
            .await
            .map_err(|source| LauncherError::io(&program, source))?;

        info!("Java exited with {:?}", status.code());
        Ok(status.success())
    }
}

#[async_trait]
impl VmRunner for JavaVm {
    #[instrument(skip(self, request), fields(mode = ?request.mode))]
    async fn run(&self, request: &VmRequest) -> bool {
        match self.launch(request).await {
            Ok(success) => success,
            Err(err) => {
                error!("Failed to launch JVM: {}", err);
                false
            }
        }
    }
}

pub fn java_binary(runtime_home: &Path) -> PathBuf {
    if cfg!(target_os = "windows") {
        runtime_home.join("bin").join("java.exe")
    } else {
        runtime_home.join("bin").join("java")
    }
}

/// Full JVM argument list for `request`, program name excluded.
pub fn jvm_arguments(request: &VmRequest) -> LauncherResult<Vec<String>> {
    let app = &request.app;
    let mut args = app.jvm_options.clone();

    let library_path = [app.app_dir.as_path(), app.launcher_dir.as_path()]
        .iter()
        .map(|path| path_str(path))
        .collect::<Vec<_>>()
        .join(path_list_separator());
    set_jvm_system_property(&mut args, "java.library.path", &library_path);
    set_jvm_system_property(&mut args, "java.launcher.path", &path_str(&app.launcher_dir));

    match &request.cache {
        CacheDirective::Generate(cache_file) => args.extend(appcds_options(
            &app.appcds_generate_jvm_options,
            cache_file,
            "-XX:ArchiveClassesAtExit",
        )),
        CacheDirective::Use(cache_file) => args.extend(appcds_options(
            &app.appcds_jvm_options,
            cache_file,
            "-XX:SharedArchiveFile",
        )),
        CacheDirective::None => {}
    }

    let main = match request.mode {
        LaunchMode::UserAppLaunch => app.main.clone(),
        LaunchMode::SingleInstanceNotification => {
            let pid = request.other_instance_pid.ok_or_else(|| {
                LauncherError::VmLaunch("No running instance to notify".into())
            })?;
            set_jvm_system_property(&mut args, SINGLE_INSTANCE_PID_PROPERTY, &pid.to_string());
            notification_entry(app.notification_main.as_deref())?
        }
    };

    if !app.classpath.is_empty() {
        let classpath = app
            .classpath
            .iter()
            .map(|entry| path_str(entry))
            .collect::<Vec<_>>()
            .join(path_list_separator());
        args.push("-cp".into());
        args.push(classpath);
    }

    match main {
        MainEntry::Module(module) => {
            args.push("-m".into());
            args.push(module);
        }
        MainEntry::Class(class) => args.push(class),
    }

    args.extend(request.arguments.iter().cloned());
    Ok(args)
}

/// Configured AppCDS options with `$CACHEFILE` and `$CACHEDIR` filled in.
/// Without configured options this is `<default_flag>=<cache file>`.
fn appcds_options(configured: &[String], cache_file: &Path, default_flag: &str) -> Vec<String> {
    let file = path_str(cache_file);
    if configured.is_empty() {
        return vec![format!("{}={}", default_flag, file)];
    }

    let dir = cache_file.parent().map(path_str).unwrap_or_default();
    configured
        .iter()
        .map(|option| {
            option
                .replace(CACHE_FILE_TOKEN, &file)
                .replace(CACHE_DIR_TOKEN, &dir)
        })
        .collect()
}

/// `module/class` names a module entry point, anything else a class on the classpath.
fn notification_entry(raw: Option<&str>) -> LauncherResult<MainEntry> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) if value.contains('/') => Ok(MainEntry::Module(value.to_string())),
        Some(value) => Ok(MainEntry::Class(value.to_string())),
        None => Err(LauncherError::VmLaunch(
            "notification_main is not configured".into(),
        )),
    }
}

fn set_jvm_system_property(args: &mut Vec<String>, property: &str, value: &str) {
    let prefix = format!("-D{}=", property);
    args.retain(|arg| !arg.starts_with(&prefix));
    args.push(format!("{}{}", prefix, value));
}

fn configure_native_library_env(cmd: &mut tokio::process::Command, app_dir: &Path) {
    let native_path = path_str(app_dir);

    if cfg!(target_os = "windows") {
        cmd.env("PATH", append_env_path("PATH", &native_path));
    } else if cfg!(target_os = "linux") {
        cmd.env(
            "LD_LIBRARY_PATH",
            append_env_path("LD_LIBRARY_PATH", &native_path),
        );
    } else if cfg!(target_os = "macos") {
        cmd.env(
            "DYLD_LIBRARY_PATH",
            append_env_path("DYLD_LIBRARY_PATH", &native_path),
        );
    }
}

fn path_list_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

fn append_env_path(var_name: &str, value: &str) -> String {
    match std::env::var(var_name) {
        Ok(existing) if !existing.trim().is_empty() => {
            format!("{}{}{}", value, path_list_separator(), existing)
        }
        _ => value.to_string(),
    }
}

fn path_str(path: &Path) -> String {
    let text = path.to_string_lossy().to_string();

    // Java rejects Windows extended-length paths on the classpath.
    #[cfg(target_os = "windows")]
    {
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

fn format_command_for_logs(cmd: &std::process::Command) -> String {
    let program = shell_escape(&cmd.get_program().to_string_lossy());
    let args = cmd
        .get_args()
        .map(|arg| shell_escape(&arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ");

    if args.is_empty() {
        program
    } else {
        format!("{} {}", program, args)
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
