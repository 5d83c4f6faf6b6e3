// ─── User-facing messages ───
// Localized templates rendered through `Platform::show_message`.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    CacheFileNotFound,
    InternalError,
    FailedToLaunchVm,
    DebugPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    English,
    Spanish,
}

impl Locale {
    /// Pick the locale from `LC_ALL`, then `LANG`. Unknown languages fall back to English.
    pub fn from_env() -> Self {
        let raw = std::env::var("LC_ALL")
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| std::env::var("LANG").ok())
            .unwrap_or_default();
        Self::from_tag(&raw)
    }

    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['_', '-', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "es" => Locale::Spanish,
            _ => Locale::English,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Messages {
    locale: Locale,
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Locale::from_env())
    }
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn template(&self, key: MessageKey) -> &'static str {
        match (self.locale, key) {
            (Locale::English, MessageKey::CacheFileNotFound) => {
                "Error: AppCDS cache file was not found: {path}"
            }
            (Locale::English, MessageKey::InternalError) => "Internal Error",
            (Locale::English, MessageKey::FailedToLaunchVm) => "Failed to launch JVM",
            (Locale::English, MessageKey::DebugPrompt) => {
                "Would you like to debug?\n\nProcessID: {pid}"
            }
            (Locale::Spanish, MessageKey::CacheFileNotFound) => {
                "Error: no se encontró el archivo de caché AppCDS: {path}"
            }
            (Locale::Spanish, MessageKey::InternalError) => "Error interno",
            (Locale::Spanish, MessageKey::FailedToLaunchVm) => "No se pudo iniciar la JVM",
            (Locale::Spanish, MessageKey::DebugPrompt) => {
                "¿Desea depurar?\n\nProcessID: {pid}"
            }
        }
    }

    pub fn cache_file_not_found(&self, path: &Path) -> String {
        self.template(MessageKey::CacheFileNotFound)
            .replace("{path}", &path.to_string_lossy())
    }

    pub fn internal_error(&self) -> String {
        self.template(MessageKey::InternalError).to_string()
    }

    pub fn failed_to_launch_vm(&self) -> String {
        self.template(MessageKey::FailedToLaunchVm).to_string()
    }

    pub fn debug_prompt(&self, pid: u32) -> String {
        self.template(MessageKey::DebugPrompt)
            .replace("{pid}", &pid.to_string())
    }
}
