//! Per-invocation application context.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::cli::Cli;
use crate::cli::output::{emit_robot, robot_ok};
use crate::config::{Config, RobotConfig};
use crate::error::Result;
use crate::service::CompetencyService;
use crate::storage::Database;

pub struct AppContext {
    pub config: Config,
    pub db: Database,
    pub db_path: PathBuf,
    pub robot_mode: bool,
}

impl AppContext {
    /// Layered configuration for this invocation.
    pub fn load_config(cli: &Cli) -> Result<Config> {
        let project_root = std::env::current_dir()?;
        Config::load(cli.config.as_deref(), &project_root)
    }

    /// Robot settings in effect, or `None` for human output.
    #[must_use]
    pub fn robot_settings<'a>(cli: &Cli, config: &'a Config) -> Option<&'a RobotConfig> {
        (cli.robot_mode() || config.robot.enabled).then_some(&config.robot)
    }

    pub fn open(cli: &Cli, config: Config) -> Result<Self> {
        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => config.storage.resolved_database_path()?,
        };
        debug!(db = %db_path.display(), "opening database");
        let db = Database::open(&db_path)?;
        let robot_mode = Self::robot_settings(cli, &config).is_some();

        Ok(Self {
            config,
            db,
            db_path,
            robot_mode,
        })
    }

    /// Workflow service over this invocation's database and policies.
    pub fn service(&self) -> CompetencyService<&Database> {
        CompetencyService::new(&self.db)
            .with_policy(self.config.workflow.test_policy())
            .with_generator(self.config.workflow.learning_generator())
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Emit a successful robot response honoring the `[robot]` settings.
    pub fn emit_ok<T: Serialize>(&self, data: T) -> Result<()> {
        let mut response = robot_ok(data);
        if !self.config.robot.include_metadata {
            response = response.without_metadata();
        }
        emit_robot(&response, self.config.robot.compact())
    }
}
