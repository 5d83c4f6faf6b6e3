use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::model::{AppLaunchSpec, MainEntry, PackageFile};
use super::PackageConfig;
use crate::core::cache::{CachePaths, CacheState};
use crate::core::error::{LauncherError, LauncherResult};

const APP_SUBDIR: &str = "app";
const RUNTIME_SUBDIR: &str = "runtime";
const FALLBACK_CONFIG: &str = "package.json";
const CACHE_SUBDIR: &str = "appcds";

/// Package configuration read from `<launcher dir>/app/<launcher stem>.json`.
#[derive(Debug)]
pub struct Package {
    launcher_path: PathBuf,
    command_line: Vec<String>,
    loaded: Option<LoadedPackage>,
}

#[derive(Debug, Clone)]
struct LoadedPackage {
    file: PackageFile,
    config_path: PathBuf,
    runtime_home: PathBuf,
    cache: CachePaths,
}

impl Package {
    pub fn new(launcher_path: PathBuf) -> Self {
        Self {
            launcher_path,
            command_line: Vec::new(),
            loaded: None,
        }
    }

    pub fn launcher_dir(&self) -> PathBuf {
        self.launcher_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|loaded| loaded.config_path.as_path())
    }

    fn launcher_stem(&self) -> String {
        self.launcher_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "launcher".to_string())
    }

    fn locate_config(&self) -> LauncherResult<PathBuf> {
        let app_dir = self.launcher_dir().join(APP_SUBDIR);
        let named = app_dir.join(format!("{}.json", self.launcher_stem()));
        if named.is_file() {
            return Ok(named);
        }
        let fallback = app_dir.join(FALLBACK_CONFIG);
        if fallback.is_file() {
            return Ok(fallback);
        }
        Err(LauncherError::Config(format!(
            "No package configuration found at {:?} or {:?}",
            named, fallback
        )))
    }

    fn loaded(&self) -> LauncherResult<&LoadedPackage> {
        self.loaded
            .as_ref()
            .ok_or_else(|| LauncherError::Config("Package is not initialized".into()))
    }

    fn resolve_in_app_dir(&self, raw: &Path) -> PathBuf {
        if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.launcher_dir().join(APP_SUBDIR).join(raw)
        }
    }
}

impl PackageConfig for Package {
    fn initialize(&mut self) -> LauncherResult<()> {
        let config_path = self.locate_config()?;
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|source| LauncherError::io(&config_path, source))?;
        let file: PackageFile = serde_json::from_str(&raw)?;

        if file.name.trim().is_empty() {
            return Err(LauncherError::Config(format!(
                "Package name is empty in {:?}",
                config_path
            )));
        }

        let runtime_home = match &file.runtime {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.launcher_dir().join(path),
            None => self.launcher_dir().join(RUNTIME_SUBDIR),
        };

        let cache_dir = match &file.cache_dir {
            Some(dir) => self.resolve_in_app_dir(dir),
            None => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(file.cache_namespace())
                .join(CACHE_SUBDIR),
        };
        let cache = CachePaths::new(cache_dir, &file.cache_file_name(&runtime_home));

        info!(
            "Loaded package '{}' from {:?} (appcds={:?}, single_instance={})",
            file.name, config_path, file.appcds, file.single_instance
        );
        debug!("AppCDS cache file: {:?}", cache.cache_file);

        self.loaded = Some(LoadedPackage {
            file,
            config_path,
            runtime_home,
            cache,
        });
        Ok(())
    }

    fn clear(&mut self) {
        debug!("Clearing package configuration");
        self.loaded = None;
    }

    fn set_command_line_arguments(&mut self, args: Vec<String>) {
        self.command_line = args;
    }

    fn name(&self) -> &str {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.file.name.as_str())
            .unwrap_or_default()
    }

    fn app_directory(&self) -> LauncherResult<PathBuf> {
        Ok(self.launcher_dir().join(APP_SUBDIR))
    }

    fn cache_paths(&self) -> LauncherResult<CachePaths> {
        Ok(self.loaded()?.cache.clone())
    }

    fn cache_mode(&self) -> Option<CacheState> {
        self.loaded
            .as_ref()
            .map(|loaded| CacheState::from(loaded.file.appcds))
    }

    fn single_instance(&self) -> bool {
        self.loaded
            .as_ref()
            .is_some_and(|loaded| loaded.file.single_instance)
    }

    fn user_args(&self) -> &[String] {
        &self.command_line
    }

    fn app_args(&self) -> Vec<String> {
        if !self.command_line.is_empty() {
            return self.command_line.clone();
        }
        self.loaded
            .as_ref()
            .map(|loaded| loaded.file.arguments.clone())
            .unwrap_or_default()
    }

    fn launch_spec(&self) -> LauncherResult<AppLaunchSpec> {
        let loaded = self.loaded()?;
        let file = &loaded.file;

        let main = match (&file.main_module, &file.main_class) {
            (Some(module), _) if !module.trim().is_empty() => MainEntry::Module(module.clone()),
            (_, Some(class)) if !class.trim().is_empty() => {
                MainEntry::Class(class.replace('/', "."))
            }
            _ => {
                return Err(LauncherError::Config(format!(
                    "Neither main_module nor main_class is set in {:?}",
                    loaded.config_path
                )))
            }
        };

        let classpath = file
            .main_jar
            .iter()
            .chain(file.classpath.iter())
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| self.resolve_in_app_dir(Path::new(entry)))
            .collect();

        Ok(AppLaunchSpec {
            app_dir: self.app_directory()?,
            launcher_dir: self.launcher_dir(),
            runtime_home: loaded.runtime_home.clone(),
            classpath,
            main,
            jvm_options: file.jvm_options.clone(),
            notification_main: file.notification_main.clone(),
            appcds_jvm_options: file.appcds_jvm_options.clone(),
            appcds_generate_jvm_options: file.appcds_generate_jvm_options.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "applauncher-package-{}-{}",
            label,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join(APP_SUBDIR)).unwrap();
        dir
    }

    fn write_config(root: &Path, file_name: &str, value: serde_json::Value) {
        std::fs::write(
            root.join(APP_SUBDIR).join(file_name),
            serde_json::to_string_pretty(&value).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn initialize_reads_launcher_named_config() {
        let root = scratch("named");
        write_config(
            &root,
            "demo.json",
            serde_json::json!({
                "name": "Demo",
                "main_jar": "demo.jar",
                "main_class": "com/example/Main",
                "classpath": ["lib/a.jar"],
                "appcds": "auto",
                "single_instance": true,
                "cache_dir": "cache",
                "arguments": ["--default"],
                "appcds_jvm_options": ["-XX:SharedArchiveFile=$CACHEFILE", "-Xshare:auto"],
                "appcds_generate_jvm_options": ["-XX:ArchiveClassesAtExit=$CACHEFILE"]
            }),
        );

        let mut package = Package::new(root.join("demo"));
        package.initialize().unwrap();

        assert_eq!(package.name(), "Demo");
        assert_eq!(package.cache_mode(), Some(CacheState::Auto));
        assert!(package.single_instance());

        let paths = package.cache_paths().unwrap();
        assert_eq!(paths.cache_dir, root.join("app").join("cache"));
        assert_eq!(paths.cache_file.parent().unwrap(), paths.cache_dir);

        let spec = package.launch_spec().unwrap();
        assert_eq!(spec.main, MainEntry::Class("com.example.Main".into()));
        assert_eq!(
            spec.classpath,
            vec![
                root.join("app").join("demo.jar"),
                root.join("app").join("lib/a.jar")
            ]
        );
        assert_eq!(spec.runtime_home, root.join("runtime"));
        assert_eq!(
            spec.appcds_jvm_options,
            vec!["-XX:SharedArchiveFile=$CACHEFILE", "-Xshare:auto"]
        );
        assert_eq!(
            spec.appcds_generate_jvm_options,
            vec!["-XX:ArchiveClassesAtExit=$CACHEFILE"]
        );

        assert_eq!(package.app_args(), vec!["--default"]);
        package.set_command_line_arguments(vec!["--user".into()]);
        assert_eq!(package.app_args(), vec!["--user"]);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn falls_back_to_package_json() {
        let root = scratch("fallback");
        write_config(&root, FALLBACK_CONFIG, serde_json::json!({ "name": "Fallback" }));

        let mut package = Package::new(root.join("other-launcher"));
        package.initialize().unwrap();
        assert_eq!(package.name(), "Fallback");
        assert_eq!(package.cache_mode(), Some(CacheState::Disabled));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_config_is_an_error() {
        let root = scratch("missing");
        let mut package = Package::new(root.join("demo"));
        let err = package.initialize().unwrap_err();
        assert!(matches!(err, LauncherError::Config(_)));

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn clear_drops_derived_state_but_keeps_arguments() {
        let root = scratch("clear");
        write_config(
            &root,
            "demo.json",
            serde_json::json!({ "name": "Demo", "main_class": "Main", "cache_dir": "c" }),
        );

        let mut package = Package::new(root.join("demo"));
        package.initialize().unwrap();
        package.set_command_line_arguments(vec!["x".into()]);
        let before = package.cache_paths().unwrap();

        package.clear();
        assert!(package.cache_paths().is_err());
        assert_eq!(package.cache_mode(), None);
        assert_eq!(package.user_args(), ["x".to_string()]);

        package.initialize().unwrap();
        assert_eq!(package.cache_paths().unwrap(), before);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn launch_spec_requires_an_entry_point() {
        let root = scratch("entry");
        write_config(&root, "demo.json", serde_json::json!({ "name": "Demo" }));

        let mut package = Package::new(root.join("demo"));
        package.initialize().unwrap();
        assert!(package.launch_spec().is_err());

        let _ = std::fs::remove_dir_all(&root);
    }
}
