use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::cache::CacheState;

/// On-disk package configuration (`app/<launcher>.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageFile {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub main_jar: Option<String>,
    #[serde(default)]
    pub main_module: Option<String>,
    #[serde(default)]
    pub classpath: Vec<String>,
    #[serde(default)]
    pub runtime: Option<PathBuf>,
    #[serde(default)]
    pub jvm_options: Vec<String>,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub single_instance: bool,
    #[serde(default)]
    pub appcds: AppCdsMode,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub notification_main: Option<String>,
    /// JVM options for a launch that uses the archive. Empty means
    /// `-XX:SharedArchiveFile=$CACHEFILE`.
    #[serde(default)]
    pub appcds_jvm_options: Vec<String>,
    /// JVM options for the run that writes the archive. Empty means
    /// `-XX:ArchiveClassesAtExit=$CACHEFILE`.
    #[serde(default)]
    pub appcds_generate_jvm_options: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppCdsMode {
    #[default]
    Off,
    On,
    Auto,
}

impl From<AppCdsMode> for CacheState {
    fn from(mode: AppCdsMode) -> Self {
        match mode {
            AppCdsMode::Off => CacheState::Disabled,
            AppCdsMode::On => CacheState::Enabled,
            AppCdsMode::Auto => CacheState::Auto,
        }
    }
}

impl PackageFile {
    /// Directory name used under the user cache dir.
    pub fn cache_namespace(&self) -> &str {
        self.identifier
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(&self.name)
    }

    /// Name of the archive file. The fingerprint covers everything that makes
    /// an existing archive unusable: version, runtime, classpath, entry point.
    pub fn cache_file_name(&self, runtime_home: &std::path::Path) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.version.as_deref().unwrap_or_default().as_bytes());
        hasher.update([0u8]);
        hasher.update(runtime_home.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        for entry in self.main_jar.iter().chain(self.classpath.iter()) {
            hasher.update(entry.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(
            self.main_module
                .as_deref()
                .or(self.main_class.as_deref())
                .unwrap_or_default()
                .as_bytes(),
        );
        let digest = hex::encode(hasher.finalize());
        format!("{}-{}.jsa", sanitize_file_stem(&self.name), &digest[..16])
    }
}

fn sanitize_file_stem(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "app".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainEntry {
    Module(String),
    Class(String),
}

/// Everything the VM runner needs to start the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLaunchSpec {
    pub app_dir: PathBuf,
    pub launcher_dir: PathBuf,
    pub runtime_home: PathBuf,
    pub classpath: Vec<PathBuf>,
    pub main: MainEntry,
    pub jvm_options: Vec<String>,
    pub notification_main: Option<String>,
    pub appcds_jvm_options: Vec<String>,
    pub appcds_generate_jvm_options: Vec<String>,
}
