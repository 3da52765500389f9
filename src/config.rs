use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::governor::{DEFAULT_COOLDOWN_HOURS, DEFAULT_PASS_SCORE, TestPolicy};
use crate::core::learning::{DEFAULT_RESOURCE_BASE_URL, LearningPathGenerator};
use crate::error::{CmError, Result};

const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "competency";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub robot: RobotConfig,
}

impl Config {
    /// Layered load: defaults, global file, project file, then environment.
    ///
    /// An explicit path (or `COMPETENCY_CONFIG`) replaces both files.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let global_dir = dirs::config_dir().map(|dir| dir.join(APP_DIR));
        Self::load_with(explicit_path, project_root, global_dir.as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Same as [`Config::load`] with the global directory and environment
    /// lookup supplied by the caller.
    pub fn load_with<F>(
        explicit_path: Option<&Path>,
        project_root: &Path,
        global_dir: Option<&Path>,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env("COMPETENCY_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(CmError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(dir) = global_dir {
                if let Some(global) = Self::load_patch(&dir.join(CONFIG_FILE))? {
                    config.merge_patch(global);
                }
            }
            if let Some(project) = Self::load_patch(&project_root.join(CONFIG_FILE))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides(&env)?;
        config.validate()?;

        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| CmError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| CmError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
        if let Some(patch) = patch.workflow {
            self.workflow.merge(patch);
        }
        if let Some(patch) = patch.robot {
            self.robot.merge(patch);
        }
    }

    fn apply_env_overrides<F>(&mut self, env: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = env_bool(env, "COMPETENCY_ROBOT") {
            self.robot.enabled = enabled;
        }
        if let Some(value) = env("COMPETENCY_DATABASE_PATH") {
            self.storage.database_path = Some(PathBuf::from(value));
        }
        if let Some(value) = env_u32(env, "COMPETENCY_PASS_SCORE")? {
            self.workflow.pass_score = u8::try_from(value).map_err(|_| {
                CmError::Config(format!("invalid COMPETENCY_PASS_SCORE value {value}"))
            })?;
        }
        if let Some(value) = env_u32(env, "COMPETENCY_COOLDOWN_HOURS")? {
            self.workflow.cooldown_hours = value;
        }
        if let Some(value) = env("COMPETENCY_RESOURCE_BASE_URL") {
            self.workflow.resource_base_url = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.workflow.pass_score) {
            return Err(CmError::Config(format!(
                "workflow.pass_score must be between 1 and 100, got {}",
                self.workflow.pass_score
            )));
        }
        if self.workflow.cooldown_hours == 0 {
            return Err(CmError::Config(
                "workflow.cooldown_hours must be at least 1".to_string(),
            ));
        }
        if !matches!(self.robot.format.as_str(), "json" | "compact") {
            return Err(CmError::Config(format!(
                "robot.format must be json or compact, got '{}'",
                self.robot.format
            )));
        }
        if self.workflow.resource_base_url.trim().is_empty() {
            return Err(CmError::Config(
                "workflow.resource_base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Falls back to the platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.database_path {
            self.database_path = Some(value);
        }
    }

    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join("competency.db"))
            .ok_or_else(|| CmError::MissingConfig("storage.database_path".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_pass_score")]
    pub pass_score: u8,
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: u32,
    #[serde(default = "default_resource_base_url")]
    pub resource_base_url: String,
}

const fn default_pass_score() -> u8 {
    DEFAULT_PASS_SCORE
}

const fn default_cooldown_hours() -> u32 {
    DEFAULT_COOLDOWN_HOURS
}

fn default_resource_base_url() -> String {
    DEFAULT_RESOURCE_BASE_URL.to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pass_score: default_pass_score(),
            cooldown_hours: default_cooldown_hours(),
            resource_base_url: default_resource_base_url(),
        }
    }
}

impl WorkflowConfig {
    fn merge(&mut self, patch: WorkflowPatch) {
        if let Some(value) = patch.pass_score {
            self.pass_score = value;
        }
        if let Some(value) = patch.cooldown_hours {
            self.cooldown_hours = value;
        }
        if let Some(value) = patch.resource_base_url {
            self.resource_base_url = value;
        }
    }

    #[must_use]
    pub fn test_policy(&self) -> TestPolicy {
        TestPolicy {
            pass_score: self.pass_score,
            cooldown: Duration::hours(i64::from(self.cooldown_hours)),
        }
    }

    #[must_use]
    pub fn learning_generator(&self) -> LearningPathGenerator {
        LearningPathGenerator::new(self.resource_base_url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Machine output without passing `--robot`.
    #[serde(default)]
    pub enabled: bool,
    /// `json` (pretty) or `compact` (one line per response).
    #[serde(default)]
    pub format: String,
    /// Add timestamp and version to every response.
    #[serde(default)]
    pub include_metadata: bool,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            format: "json".to_string(),
            include_metadata: true,
        }
    }
}

impl RobotConfig {
    #[must_use]
    pub fn compact(&self) -> bool {
        self.format == "compact"
    }

    fn merge(&mut self, patch: RobotPatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.format {
            self.format = value;
        }
        if let Some(value) = patch.include_metadata {
            self.include_metadata = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub storage: Option<StoragePatch>,
    pub workflow: Option<WorkflowPatch>,
    pub robot: Option<RobotPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WorkflowPatch {
    pub pass_score: Option<u8>,
    pub cooldown_hours: Option<u32>,
    pub resource_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RobotPatch {
    pub enabled: Option<bool>,
    pub format: Option<String>,
    pub include_metadata: Option<bool>,
}

fn env_bool<F>(env: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    env(key).map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_u32<F>(env: &F, key: &str) -> Result<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|err| CmError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}
