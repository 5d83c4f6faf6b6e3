// ─── Test doubles ───
// Recording fakes for the bootstrap seams. Every side effect lands in one
// shared, ordered event log.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::cache::{CachePaths, CacheState};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::package::{AppLaunchSpec, MainEntry, PackageConfig};
use crate::core::platform::{MessageResponse, OtherInstance, Platform, ProcessExit};
use crate::core::vm::{LaunchMode, VmRequest, VmRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PlatformInitialize,
    SetCurrentDirectory(PathBuf),
    CreateDirectory { path: PathBuf, recursive: bool },
    DeleteFile(PathBuf),
    Execute { program: PathBuf, args: Vec<String> },
    CheckSingleInstance(String),
    Reactivate(Option<u32>),
    Message(String),
    PackageInitialize,
    PackageClear,
    SetArguments(Vec<String>),
    VmRun(LaunchMode),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

fn record(log: &EventLog, event: Event) {
    log.lock().unwrap().push(event);
}

pub struct FakePlatform {
    pub exe: PathBuf,
    log: EventLog,
    dirs: Mutex<HashSet<PathBuf>>,
    files: Mutex<HashSet<PathBuf>>,
    child_output: Mutex<Option<PathBuf>>,
    spawn_fails: Mutex<bool>,
    other_instance: Mutex<Option<OtherInstance>>,
    alive: Mutex<HashSet<u32>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            exe: PathBuf::from("/opt/demo/demo"),
            log: Arc::new(Mutex::new(Vec::new())),
            dirs: Mutex::new(HashSet::new()),
            files: Mutex::new(HashSet::new()),
            child_output: Mutex::new(None),
            spawn_fails: Mutex::new(false),
            other_instance: Mutex::new(None),
            alive: Mutex::new(HashSet::new()),
        }
    }

    pub fn log(&self) -> EventLog {
        Arc::clone(&self.log)
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }

    pub fn spawn_count(&self) -> usize {
        self.count(|event| matches!(event, Event::Execute { .. }))
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn add_dir(&self, path: &Path) {
        self.dirs.lock().unwrap().insert(path.to_path_buf());
    }

    pub fn add_file(&self, path: &Path) {
        self.files.lock().unwrap().insert(path.to_path_buf());
    }

    pub fn has_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    pub fn has_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains(path)
    }

    /// Simulated generation child writes `path` before exiting.
    pub fn child_creates(&self, path: &Path) {
        *self.child_output.lock().unwrap() = Some(path.to_path_buf());
    }

    pub fn fail_spawn(&self) {
        *self.spawn_fails.lock().unwrap() = true;
    }

    pub fn other_instance(&self, pid: Option<u32>, alive: bool) {
        *self.other_instance.lock().unwrap() = Some(OtherInstance { pid });
        if let (Some(pid), true) = (pid, alive) {
            self.alive.lock().unwrap().insert(pid);
        }
    }
}

#[async_trait]
impl Platform for FakePlatform {
    fn initialize(&self) -> LauncherResult<()> {
        record(&self.log, Event::PlatformInitialize);
        Ok(())
    }

    fn module_file_name(&self) -> LauncherResult<PathBuf> {
        Ok(self.exe.clone())
    }

    fn set_current_directory(&self, path: &Path) -> LauncherResult<()> {
        record(&self.log, Event::SetCurrentDirectory(path.to_path_buf()));
        Ok(())
    }

    async fn directory_exists(&self, path: &Path) -> bool {
        self.has_dir(path)
    }

    async fn file_exists(&self, path: &Path) -> bool {
        self.has_file(path)
    }

    async fn create_directory(&self, path: &Path, recursive: bool) -> LauncherResult<()> {
        record(
            &self.log,
            Event::CreateDirectory {
                path: path.to_path_buf(),
                recursive,
            },
        );
        self.add_dir(path);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> LauncherResult<()> {
        record(&self.log, Event::DeleteFile(path.to_path_buf()));
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    async fn execute(&self, program: &Path, args: &[String]) -> LauncherResult<ProcessExit> {
        if *self.spawn_fails.lock().unwrap() {
            return Err(LauncherError::ProcessSpawn {
                program: program.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"),
            });
        }
        record(
            &self.log,
            Event::Execute {
                program: program.to_path_buf(),
                args: args.to_vec(),
            },
        );
        let output = self.child_output.lock().unwrap().clone();
        match output {
            Some(path) => {
                self.add_file(&path);
                Ok(ProcessExit { code: Some(0) })
            }
            None => Ok(ProcessExit { code: Some(1) }),
        }
    }

    fn process_id(&self) -> u32 {
        4321
    }

    fn is_process_alive(&self, pid: u32) -> bool {
        self.alive.lock().unwrap().contains(&pid)
    }

    async fn check_for_single_instance(&self, app_name: &str) -> Option<OtherInstance> {
        record(&self.log, Event::CheckSingleInstance(app_name.to_string()));
        *self.other_instance.lock().unwrap()
    }

    async fn reactivate_another_instance(&self, pid: Option<u32>) {
        record(&self.log, Event::Reactivate(pid));
    }

    fn show_message(&self, description: &str) {
        record(&self.log, Event::Message(description.to_string()));
    }

    fn show_response_message(&self, _title: &str, _description: &str) -> MessageResponse {
        MessageResponse::Cancel
    }

    fn native_debugger_present(&self) -> bool {
        true
    }
}

pub struct FakePackage {
    log: EventLog,
    pub name: String,
    pub app_dir: PathBuf,
    pub paths: CachePaths,
    pub mode: Option<CacheState>,
    pub single_instance: bool,
    pub defaults: Vec<String>,
    pub fail_initialize: bool,
    args: Vec<String>,
}

impl FakePackage {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            name: "Demo".into(),
            app_dir: PathBuf::from("/opt/demo/app"),
            paths: CachePaths::new(PathBuf::from("/home/user/.cache/demo/appcds"), "demo.jsa"),
            mode: None,
            single_instance: false,
            defaults: Vec::new(),
            fail_initialize: false,
            args: Vec::new(),
        }
    }

    fn count(&self, wanted: &Event) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|event| *event == wanted)
            .count()
    }

    pub fn clears(&self) -> usize {
        self.count(&Event::PackageClear)
    }

    pub fn initializes(&self) -> usize {
        self.count(&Event::PackageInitialize)
    }
}

impl PackageConfig for FakePackage {
    fn initialize(&mut self) -> LauncherResult<()> {
        record(&self.log, Event::PackageInitialize);
        if self.fail_initialize {
            return Err(LauncherError::Config("broken package".into()));
        }
        Ok(())
    }

    fn clear(&mut self) {
        record(&self.log, Event::PackageClear);
    }

    fn set_command_line_arguments(&mut self, args: Vec<String>) {
        record(&self.log, Event::SetArguments(args.clone()));
        self.args = args;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn app_directory(&self) -> LauncherResult<PathBuf> {
        Ok(self.app_dir.clone())
    }

    fn cache_paths(&self) -> LauncherResult<CachePaths> {
        Ok(self.paths.clone())
    }

    fn cache_mode(&self) -> Option<CacheState> {
        self.mode
    }

    fn single_instance(&self) -> bool {
        self.single_instance
    }

    fn user_args(&self) -> &[String] {
        &self.args
    }

    fn app_args(&self) -> Vec<String> {
        if self.args.is_empty() {
            self.defaults.clone()
        } else {
            self.args.clone()
        }
    }

    fn launch_spec(&self) -> LauncherResult<AppLaunchSpec> {
        Ok(AppLaunchSpec {
            app_dir: self.app_dir.clone(),
            launcher_dir: PathBuf::from("/opt/demo"),
            runtime_home: PathBuf::from("/opt/demo/runtime"),
            classpath: vec![self.app_dir.join("demo.jar")],
            main: MainEntry::Class("demo.Main".into()),
            jvm_options: Vec::new(),
            notification_main: Some("demo.Notify".into()),
            appcds_jvm_options: Vec::new(),
            appcds_generate_jvm_options: Vec::new(),
        })
    }
}

pub struct FakeVm {
    log: EventLog,
    result: bool,
    requests: Mutex<Vec<VmRequest>>,
}

impl FakeVm {
    pub fn new(log: EventLog, result: bool) -> Self {
        Self {
            log,
            result,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<VmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VmRunner for FakeVm {
    async fn run(&self, request: &VmRequest) -> bool {
        record(&self.log, Event::VmRun(request.mode));
        self.requests.lock().unwrap().push(request.clone());
        self.result
    }
}
