//! Configuration loading and the store factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use admissions_core::catalog::{Catalog, DEFAULT_TIME_SLOTS};
use admissions_core::model::ProgramType;
use admissions_core::observe::ObservedStore;
use admissions_core::traits::DataStore;
use admissions_core::wizard::StepPlan;

use crate::rest::RestStore;

/// Key value shipped in sample `.env` files. Treated as unset.
pub const PLACEHOLDER_KEY: &str = "your-anon-key-here";

/// Environment variables checked for the store URL, highest priority first.
pub const URL_VARS: [&str; 2] = ["ADMISSIONS_STORE_URL", "SUPABASE_URL"];
/// Environment variables checked for the access key, highest priority first.
pub const KEY_VARS: [&str; 2] = ["ADMISSIONS_STORE_KEY", "SUPABASE_ANON_KEY"];

/// The store cannot be reached with the current configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("store URL is not set (set ADMISSIONS_STORE_URL or [store].url)")]
    MissingUrl,

    #[error("store access key is not set (set ADMISSIONS_STORE_KEY or [store].anon_key)")]
    MissingKey,

    #[error("store access key is still the placeholder '{PLACEHOLDER_KEY}'")]
    PlaceholderKey,
}

/// Connection settings for the hosted store.
///
/// Note: Custom Debug impl masks the access key.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("anon_key", &if self.anon_key.is_empty() { "" } else { "***" })
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl StoreConfig {
    /// Check that both URL and key are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let key = self.anon_key.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingKey);
        }
        if key == PLACEHOLDER_KEY {
            return Err(ConfigError::PlaceholderKey);
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.validate().is_ok()
    }
}

fn default_timeout() -> u64 {
    30
}

/// Remote table names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNames {
    #[serde(default = "default_students")]
    pub students: String,
    #[serde(default = "default_questions")]
    pub questions: String,
    #[serde(default = "default_submissions")]
    pub submissions: String,
    #[serde(default = "default_answers")]
    pub answers: String,
    #[serde(default = "default_time_slots")]
    pub time_slots: String,
}

fn default_students() -> String {
    "students".to_string()
}
fn default_questions() -> String {
    "questions".to_string()
}
fn default_submissions() -> String {
    "submissions".to_string()
}
fn default_answers() -> String {
    "student_answers".to_string()
}
fn default_time_slots() -> String {
    "alloted_timeslotes".to_string()
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            students: default_students(),
            questions: default_questions(),
            submissions: default_submissions(),
            answers: default_answers(),
            time_slots: default_time_slots(),
        }
    }
}

/// Wizard behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Ordered steps, e.g. `["select-program", "register", "assess", "done"]`.
    #[serde(default)]
    pub plan: StepPlan,
    /// Slots offered when the server list cannot be fetched.
    #[serde(default)]
    pub fallback_slots: Vec<String>,
}

impl WizardConfig {
    pub fn fallback_slots(&self) -> Vec<String> {
        if self.fallback_slots.is_empty() {
            DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect()
        } else {
            self.fallback_slots.clone()
        }
    }
}

/// Which programs accept registrations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// When set, exactly these programs are open.
    #[serde(default)]
    pub available: Option<Vec<ProgramType>>,
}

/// Top-level admissions configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdmissionsConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tables: TableNames,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AdmissionsConfig {
    /// The program catalog with configured availability applied.
    pub fn catalog(&self) -> Catalog {
        match &self.catalog.available {
            Some(open) => Catalog::default().with_available_programs(open),
            None => Catalog::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as-is and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Apply URL/key overrides from the environment.
fn apply_env_overrides(config: &mut StoreConfig, lookup: impl Fn(&str) -> Option<String>) {
    let first_set = |vars: &[&str]| {
        vars.iter()
            .filter_map(|v| lookup(v))
            .find(|value| !value.trim().is_empty())
    };
    if let Some(url) = first_set(&URL_VARS) {
        config.url = url;
    }
    if let Some(key) = first_set(&KEY_VARS) {
        config.anon_key = key;
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `admissions.toml` in the current directory
/// 2. `~/.config/admissions/config.toml`
///
/// Environment variable overrides: `ADMISSIONS_STORE_URL`,
/// `ADMISSIONS_STORE_KEY` (falling back to `SUPABASE_URL`,
/// `SUPABASE_ANON_KEY`).
pub fn load_config() -> Result<AdmissionsConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AdmissionsConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("admissions.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AdmissionsConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AdmissionsConfig::default(),
    };

    apply_env_overrides(&mut config.store, |name| std::env::var(name).ok());
    config.store.url = resolve_env_vars(&config.store.url);
    config.store.anon_key = resolve_env_vars(&config.store.anon_key);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("admissions"))
}

/// Create the REST store described by the configuration, wrapped with
/// tracing instrumentation.
pub fn create_store(config: &AdmissionsConfig) -> Result<Box<dyn DataStore>> {
    config.store.validate()?;
    let store = RestStore::new(
        &config.store.url,
        &config.store.anon_key,
        config.tables.clone(),
        config.store.timeout_secs,
    )?;
    Ok(Box::new(ObservedStore::traced(store)))
}

/// Starter configuration written by `admissions init`.
pub fn starter_config() -> &'static str {
    r#"# admissions configuration

[store]
url = "${SUPABASE_URL}"
anon_key = "${SUPABASE_ANON_KEY}"
timeout_secs = 30

[tables]
students = "students"
questions = "questions"
submissions = "submissions"
answers = "student_answers"
time_slots = "alloted_timeslotes"

[wizard]
plan = ["select-program", "select-course", "register", "assess", "done"]
fallback_slots = ["19th January", "2nd February"]

[catalog]
available = ["cohort", "workshop"]
"#
}
