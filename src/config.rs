use crate::error::{Error, Result};
use directories::ProjectDirs;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Option<String>,
    pub data_dir: PathBuf,
    pub log_format: LogFormat,
    pub request_timeout_secs: u64,
    pub validate_responses: bool,
    pub check_response_types: bool,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let data_dir = match env::var("JOBBOARD_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        let log_format = match env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            api_url: env::var("API_URL").ok().filter(|url| !url.trim().is_empty()),
            data_dir,
            log_format,
            request_timeout_secs: get_env_parse_or("REQUEST_TIMEOUT_SECS", 0)?,
            validate_responses: get_env_parse_or("VALIDATE_RESPONSES", true)?,
            check_response_types: get_env_parse_or("CHECK_RESPONSE_TYPES", false)?,
        })
    }

    pub fn cookie_file(&self) -> PathBuf {
        self.data_dir.join("cookies.json")
    }

    pub fn endpoint_file(&self) -> PathBuf {
        self.data_dir.join("api_base_url")
    }
}

fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "jobboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not resolve a home directory".to_string()))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
