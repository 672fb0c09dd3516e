//! Service configuration
//!
//! Defaults carry the interview constants (10 questions, 30s/60s/120s waits).
//! `ServerConfig::from_env` reads `PSYCHAT_*` variables, loading a `.env`
//! file first when one exists:
//!
//! | Variable | Default |
//! |---|---|
//! | `PSYCHAT_BIND_ADDR` | `127.0.0.1:5001` |
//! | `PSYCHAT_ALLOWED_ORIGINS` | `http://localhost:5173,http://127.0.0.1:5173` |
//! | `PSYCHAT_REPORT_DIR` | system temp dir |
//! | `PSYCHAT_MAX_TURNS` | `10` |
//! | `PSYCHAT_FIRST_PROMPT_TIMEOUT_SECS` | `30` |
//! | `PSYCHAT_REPLY_TIMEOUT_SECS` | `60` |
//! | `PSYCHAT_NEXT_PROMPT_TIMEOUT_SECS` | `120` |
//! | `PSYCHAT_FINALIZE_GRACE_SECS` | `5` |
//! | `PSYCHAT_IDLE_TTL_SECS` | `3600` |
//! | `PSYCHAT_CLEANUP_INTERVAL_SECS` | `60` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::budget::DEFAULT_MAX_TURNS;
use crate::error::{InterviewError, Result};

const ENV_PREFIX: &str = "PSYCHAT_";

/// Default listen address; the web frontend talks to port 5001
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5001";

/// Origins of the bundled web frontend
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

/// Timing and budget settings for interview sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Question cap per session
    pub max_turns: u32,
    /// How long `start` waits for the first question
    pub first_prompt_timeout: Duration,
    /// How long the workflow waits for each answer
    pub reply_timeout: Duration,
    /// How long `submit_answer` waits for the next question or the end marker
    pub next_prompt_timeout: Duration,
    /// How long finalization waits for the task to wind down
    pub finalize_grace: Duration,
    /// Sessions idle for longer than this are discarded
    pub idle_ttl: Duration,
    /// Interval of the idle-session sweep
    pub cleanup_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            first_prompt_timeout: Duration::from_secs(30),
            reply_timeout: Duration::from_secs(60),
            next_prompt_timeout: Duration::from_secs(120),
            finalize_grace: Duration::from_secs(5),
            idle_ttl: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl SessionConfig {
    /// Reject settings that would make sessions unusable
    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            return Err(InterviewError::invalid_config("max_turns must be at least 1"));
        }

        let waits = [
            ("first_prompt_timeout", self.first_prompt_timeout),
            ("reply_timeout", self.reply_timeout),
            ("next_prompt_timeout", self.next_prompt_timeout),
            ("cleanup_interval", self.cleanup_interval),
        ];
        for (name, value) in waits {
            if value.is_zero() {
                return Err(InterviewError::invalid_config(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(turns) = env_parse::<u32>("MAX_TURNS")? {
            self.max_turns = turns;
        }
        if let Some(secs) = env_parse::<u64>("FIRST_PROMPT_TIMEOUT_SECS")? {
            self.first_prompt_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("REPLY_TIMEOUT_SECS")? {
            self.reply_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("NEXT_PROMPT_TIMEOUT_SECS")? {
            self.next_prompt_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("FINALIZE_GRACE_SECS")? {
            self.finalize_grace = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("IDLE_TTL_SECS")? {
            self.idle_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("CLEANUP_INTERVAL_SECS")? {
            self.cleanup_interval = Duration::from_secs(secs);
        }
        Ok(())
    }
}

/// Full server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address of the HTTP gateway
    pub bind_addr: SocketAddr,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    /// Directory for rendered reports
    pub report_dir: PathBuf,
    /// Session timing and budget
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5001)),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| (*o).to_string()).collect(),
            report_dir: std::env::temp_dir(),
            session: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build configuration from defaults, `.env` and `PSYCHAT_*` variables
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(InterviewError::invalid_config(format!(".env: {e}"))),
        }

        let mut config = Self::default();

        if let Some(addr) = env_parse::<SocketAddr>("BIND_ADDR")? {
            config.bind_addr = addr;
        }
        if let Some(origins) = env_var("ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(dir) = env_var("REPORT_DIR") {
            config.report_dir = PathBuf::from(dir);
        }
        config.session.apply_env()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        if self.report_dir.as_os_str().is_empty() {
            return Err(InterviewError::invalid_config("report_dir must not be empty"));
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                InterviewError::invalid_config(format!("{ENV_PREFIX}{name}={raw}: {e}"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_interview_constants() {
        let config = SessionConfig::default();
        assert_eq!(config.max_turns, 10);
        assert_eq!(config.first_prompt_timeout, Duration::from_secs(30));
        assert_eq!(config.reply_timeout, Duration::from_secs(60));
        assert_eq!(config.next_prompt_timeout, Duration::from_secs(120));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_cap_is_rejected() {
        let config = SessionConfig {
            max_turns: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InterviewError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = SessionConfig {
            reply_timeout: Duration::ZERO,
            ..SessionConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reply_timeout"));
    }

    #[test]
    fn server_defaults_allow_frontend_origins() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.allowed_origins.iter().any(|o| o == "http://localhost:5173"));
    }
}
