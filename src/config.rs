use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::credentials::Credentials;
use crate::model::date_range::DateRange;
use crate::pipeline::query::QueryMode;

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
pub const DEFAULT_BATCH_SIZE: usize = 200;
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Optional settings file, overridden key by key by the environment.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub user: Option<String>,
    pub personal_token: Option<String>,
    pub account: Option<String>,
    pub default_project: Option<String>,
    pub default_team: Option<String>,
    pub projects: Option<Vec<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub batch_size: Option<usize>,
    pub query_mode: Option<String>,
    pub dedupe_ids: Option<bool>,
    pub discover_projects: Option<bool>,
    pub output_dir: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub account: String,
    pub default_project: String,
    pub default_team: String,
    pub projects: Vec<String>,
    pub date_range: DateRange,
    pub batch_size: usize,
    pub query_mode: QueryMode,
    pub dedupe_ids: bool,
    pub discover_projects: bool,
    pub output_dir: PathBuf,
    pub base_url: String,
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".devops-extract")
        .join("config.toml")
}

pub fn load_file_config() -> Result<FileConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: FileConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

/// Load `./.env` (or one in a parent directory) into the process environment.
/// A missing file is fine, a malformed one is not. Variables already set are kept.
pub fn load_dotenv() -> Result<()> {
    ignore_missing(dotenvy::dotenv().map(|_| ()))
}

pub fn load_dotenv_from(path: &Path) -> Result<()> {
    ignore_missing(dotenvy::from_path(path))
}

fn ignore_missing(result: Result<(), dotenvy::Error>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to load .env"),
    }
}

/// Load the config file and overlay the process environment.
pub fn load_config() -> Result<AppConfig> {
    let file = load_file_config()?;
    let today = chrono::Local::now().date_naive();
    let config = resolve(file, |key| std::env::var(key).ok(), today)?;
    Ok(config)
}

/// Merge file settings with `lookup` (environment) values and validate them.
pub fn resolve<F>(file: FileConfig, lookup: F, today: NaiveDate) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let required = |key: &'static str, fallback: Option<String>| {
        env(key)
            .or(fallback)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(key))
    };

    let user = required("DEVOPS_USER", file.user)?;
    let personal_token = required("DEVOPS_PERSONAL_TOKEN", file.personal_token)?;
    let account = required("DEVOPS_ACCOUNT", file.account)?;
    let default_project = required("DEVOPS_DEFAULT_PROJECT", file.default_project)?;
    let default_team = required("DEVOPS_DEFAULT_TEAM", file.default_team)?;

    let projects = match env("DEVOPS_PROJECTS") {
        Some(list) => parse_project_list(&list),
        None => file
            .projects
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
    };

    let start = env("DEVOPS_START_DATE").or(file.start_date);
    let end = env("DEVOPS_END_DATE").or(file.end_date);
    let date_range = match (start, end) {
        (Some(start), Some(end)) => DateRange::parse(&start, &end)?,
        (None, None) => DateRange::current_month(today),
        (start, _) => {
            let given = if start.is_some() { "start" } else { "end" };
            tracing::warn!(given, "Only one date bound configured, using the current month");
            DateRange::current_month(today)
        }
    };

    let batch_size = match env("DEVOPS_BATCH_SIZE") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidBatchSize(raw.clone()))?,
        None => file.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
    };
    if batch_size == 0 {
        return Err(ConfigError::InvalidBatchSize("0".into()));
    }

    let query_mode = match env("DEVOPS_QUERY_MODE").or(file.query_mode) {
        Some(raw) => raw.parse::<QueryMode>()?,
        None => QueryMode::default(),
    };

    let dedupe_ids = match env("DEVOPS_DEDUPE_IDS") {
        Some(raw) => parse_flag("DEVOPS_DEDUPE_IDS", &raw)?,
        None => file.dedupe_ids.unwrap_or(false),
    };
    let discover_projects = match env("DEVOPS_DISCOVER_PROJECTS") {
        Some(raw) => parse_flag("DEVOPS_DISCOVER_PROJECTS", &raw)?,
        None => file.discover_projects.unwrap_or(true),
    };

    let output_dir = env("DEVOPS_OUTPUT_DIR")
        .or(file.output_dir)
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
    let base_url = env("DEVOPS_BASE_URL")
        .or(file.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Ok(AppConfig {
        credentials: Credentials::new(user, personal_token),
        account,
        default_project,
        default_team,
        projects,
        date_range,
        batch_size,
        query_mode,
        dedupe_ids,
        discover_projects,
        output_dir: PathBuf::from(output_dir),
        base_url: base_url.trim_end_matches('/').to_string(),
    })
}

pub fn parse_project_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            key,
            value: raw.to_string(),
        }),
    }
}
