use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {var_name} = '{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    #[error("cannot read config file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("portal_url must not be empty")]
    EmptyPortalUrl,
}

/// Program configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Portal login URL
    pub portal_url: String,
    /// Keep the authenticated profile between runs
    pub use_existing_session: bool,
    /// Browser profile directory (defaults to the user data dir)
    pub profile_dir: Option<PathBuf>,
    /// Browser executable (auto-detected when unset)
    pub browser_executable: Option<PathBuf>,
    /// Attach to a running browser on this debug port instead of launching one
    pub browser_debug_port: Option<u16>,
    /// Delay after every click/fill, also used as the settle delay
    pub action_delay_ms: u64,
    pub headless: bool,
    /// Stop the reject workflow before submitting
    pub dry_run: bool,
    pub probe_timeout_secs: u64,
    pub login_timeout_secs: u64,
    pub results_timeout_secs: u64,
    pub dropdown_timeout_secs: u64,
    pub action_timeout_secs: u64,
    /// Run log file
    pub output_log_file: String,
    /// Failed records are appended here
    pub warn_file: String,
    pub verbose_logging: bool,
    /// Buffer size of the event channels
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_url: "https://evision.ucl.ac.uk/urd/sits.urd/run/siw_lgn".to_string(),
            use_existing_session: true,
            profile_dir: None,
            browser_executable: None,
            browser_debug_port: None,
            action_delay_ms: 500,
            headless: false,
            dry_run: false,
            probe_timeout_secs: 5,
            login_timeout_secs: 240,
            results_timeout_secs: 10,
            dropdown_timeout_secs: 5,
            action_timeout_secs: 30,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            verbose_logging: false,
            event_capacity: 1024,
        }
    }
}

/// Timeout classes used by the workflow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    /// Short existence probes
    pub probe: Duration,
    /// Human SSO/MFA wait
    pub login: Duration,
    /// Search results table
    pub results_table: Duration,
    /// Reason dropdowns after choosing reject
    pub dropdown: Duration,
    /// Upper bound for a single click/fill/quiescence wait
    pub action: Duration,
    /// Fixed pause after each navigation step
    pub settle: Duration,
}

impl Timeouts {
    /// Zero-length waits, for driving a scripted page in tests
    pub fn immediate() -> Self {
        Self {
            probe: Duration::from_millis(20),
            login: Duration::from_millis(20),
            results_table: Duration::from_millis(20),
            dropdown: Duration::from_millis(20),
            action: Duration::from_millis(20),
            settle: Duration::ZERO,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file (if any), then `.env` / environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    fn apply_env(self) -> Result<Self, ConfigError> {
        Ok(Self {
            portal_url: std::env::var("PORTAL_URL").unwrap_or(self.portal_url),
            use_existing_session: env_parse("USE_EXISTING_SESSION", "bool")?
                .unwrap_or(self.use_existing_session),
            profile_dir: std::env::var_os("PROFILE_DIR")
                .map(PathBuf::from)
                .or(self.profile_dir),
            browser_executable: std::env::var_os("BROWSER_EXECUTABLE")
                .map(PathBuf::from)
                .or(self.browser_executable),
            browser_debug_port: env_parse("BROWSER_DEBUG_PORT", "port")?
                .or(self.browser_debug_port),
            action_delay_ms: env_parse("ACTION_DELAY_MS", "integer")?
                .unwrap_or(self.action_delay_ms),
            headless: env_parse("HEADLESS", "bool")?.unwrap_or(self.headless),
            dry_run: env_parse("DRY_RUN", "bool")?.unwrap_or(self.dry_run),
            probe_timeout_secs: env_parse("PROBE_TIMEOUT_SECS", "integer")?
                .unwrap_or(self.probe_timeout_secs),
            login_timeout_secs: env_parse("LOGIN_TIMEOUT_SECS", "integer")?
                .unwrap_or(self.login_timeout_secs),
            results_timeout_secs: env_parse("RESULTS_TIMEOUT_SECS", "integer")?
                .unwrap_or(self.results_timeout_secs),
            dropdown_timeout_secs: env_parse("DROPDOWN_TIMEOUT_SECS", "integer")?
                .unwrap_or(self.dropdown_timeout_secs),
            action_timeout_secs: env_parse("ACTION_TIMEOUT_SECS", "integer")?
                .unwrap_or(self.action_timeout_secs),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(self.warn_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
            event_capacity: env_parse("EVENT_CAPACITY", "integer")?
                .unwrap_or(self.event_capacity),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.portal_url.trim().is_empty() {
            return Err(ConfigError::EmptyPortalUrl);
        }
        Ok(())
    }

    pub fn action_delay(&self) -> Duration {
        Duration::from_millis(self.action_delay_ms)
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            probe: Duration::from_secs(self.probe_timeout_secs),
            login: Duration::from_secs(self.login_timeout_secs),
            results_table: Duration::from_secs(self.results_timeout_secs),
            dropdown: Duration::from_secs(self.dropdown_timeout_secs),
            action: Duration::from_secs(self.action_timeout_secs),
            settle: self.action_delay(),
        }
    }

    /// Configured profile directory, or `<data dir>/decision_submit/profile`.
    pub fn resolved_profile_dir(&self) -> PathBuf {
        if let Some(dir) = &self.profile_dir {
            return dir.clone();
        }
        let base = std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("XDG_DATA_HOME").map(PathBuf::from))
            .or_else(|| {
                std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share"))
            })
            .unwrap_or_else(std::env::temp_dir);
        base.join("decision_submit").join("profile")
    }
}

fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &'static str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_portal_timeouts() {
        let timeouts = Config::default().timeouts();
        assert_eq!(timeouts.probe, Duration::from_secs(5));
        assert_eq!(timeouts.login, Duration::from_secs(240));
        assert_eq!(timeouts.results_table, Duration::from_secs(10));
        assert_eq!(timeouts.settle, Duration::from_millis(500));
    }

    #[test]
    fn toml_overrides_only_given_fields() {
        let config: Config = toml::from_str(
            r#"
            headless = true
            action_delay_ms = 250
            profile_dir = "/tmp/portal-profile"
            "#,
        )
        .unwrap();

        assert!(config.headless);
        assert_eq!(config.action_delay_ms, 250);
        assert_eq!(
            config.resolved_profile_dir(),
            PathBuf::from("/tmp/portal-profile")
        );
        assert_eq!(config.login_timeout_secs, 240);
        assert!(config.use_existing_session);
    }

    #[test]
    fn empty_portal_url_is_rejected() {
        let config = Config {
            portal_url: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyPortalUrl)
        ));
    }
}
