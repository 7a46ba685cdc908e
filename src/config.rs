use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

const DEFAULT_INTERVIEW_VENUE: &str = "Head Office";
const DEFAULT_LINK_DURATION_DAYS: i64 = 7;
const DEFAULT_UPLOADS_DIR: &str = "./uploads";
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub public_rps: u32,
    pub hr_rps: u32,
    pub mail_from: String,
    pub hr_notification_emails: Vec<String>,
    pub public_base_url: String,
    pub interview_venue: String,
    pub link_duration_days: i64,
    pub uploads_dir: String,
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings. Absent when `SMTP_HOST` is not set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            hr_rps: get_env_parse("HR_RPS")?,
            mail_from: get_env("MAIL_FROM")?,
            hr_notification_emails: split_recipients(&get_env("HR_NOTIFICATION_EMAILS")?),
            public_base_url: get_env("PUBLIC_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            interview_venue: env::var("INTERVIEW_VENUE")
                .unwrap_or_else(|_| DEFAULT_INTERVIEW_VENUE.to_string()),
            link_duration_days: get_env_parse_or("LINK_DURATION_DAYS", DEFAULT_LINK_DURATION_DAYS)?,
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| DEFAULT_UPLOADS_DIR.to_string()),
            smtp: SmtpConfig::from_env()?,
        })
    }
}

impl SmtpConfig {
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(host) = env::var("SMTP_HOST") else {
            return Ok(None);
        };
        Ok(Some(Self {
            host,
            port: get_env_parse_or("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            user: env::var("SMTP_USER").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
        }))
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
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

pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
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
