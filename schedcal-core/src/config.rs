//! schedcal configuration.
//!
//! Values are layered: built-in defaults, then `~/.config/schedcal/config.toml`
//! (or the file given with `--config`), then `SCHEDCAL_*` environment
//! variables. Command-line flags are applied on top by the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{SchedError, SchedResult};
use crate::export::Venue;
use crate::schedule::FetchOptions;

static DEFAULT_SCHEDULE_URL: &str = "https://us.pycon.org/2015/schedule/talks/";
static DEFAULT_CALENDAR: &str = "PyCon15";
static DEFAULT_LOCATION: &str = "201 Avenue Viger Ouest, Montréal, QC H2Z 1X7, Canada";
static DEFAULT_TIME_ZONE: &str = "America/Montreal";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_schedule_url() -> String {
    DEFAULT_SCHEDULE_URL.to_string()
}

fn default_calendar() -> String {
    DEFAULT_CALENDAR.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// `SCHEDCAL_*` variables, numbers and booleans parsed from their text.
fn environment() -> Environment {
    Environment::with_prefix("SCHEDCAL").try_parsing(true)
}

/// Configuration at ~/.config/schedcal/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedcalConfig {
    /// Page holding the day tables
    #[serde(default = "default_schedule_url")]
    pub schedule_url: String,

    /// Name of the calendar events are added to ("primary" for the main one)
    #[serde(default = "default_calendar")]
    pub calendar: String,

    /// Venue address written on every event
    #[serde(default = "default_location")]
    pub location: String,

    /// IANA zone the schedule times are expressed in
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Skip TLS certificate validation when downloading the schedule
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// OAuth access token for the calendar service
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
}

impl Default for SchedcalConfig {
    fn default() -> Self {
        SchedcalConfig {
            schedule_url: default_schedule_url(),
            calendar: default_calendar(),
            location: default_location(),
            time_zone: default_time_zone(),
            insecure: false,
            request_timeout_secs: default_request_timeout_secs(),
            access_token: None,
        }
    }
}

impl SchedcalConfig {
    pub fn config_path() -> SchedResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SchedError::Config("Could not determine config directory".into()))?
            .join("schedcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file is not an error; the default location gets a
    /// commented-out template so users can find the available options.
    pub fn load_from(path: Option<&Path>) -> SchedResult<Self> {
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()),
            None => {
                let default_path = Self::config_path()?;
                if !default_path.exists() {
                    if let Err(e) = Self::create_default_config(&default_path) {
                        tracing::warn!(path = %default_path.display(), error = %e, "could not write default config");
                    }
                }
                default_path
            }
        };

        Self::load_layered(&path, environment())
    }

    fn load_layered(path: &Path, environment: Environment) -> SchedResult<Self> {
        tracing::debug!(path = %path.display(), "loading configuration");

        let config: SchedcalConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| SchedError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SchedError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn load() -> SchedResult<Self> {
        Self::load_from(None)
    }

    fn validate(&self) -> SchedResult<()> {
        self.time_zone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| SchedError::Config(format!("Unknown time zone '{}'", self.time_zone)))?;

        if self.request_timeout_secs == 0 {
            return Err(SchedError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    pub fn venue(&self) -> Venue {
        Venue {
            location: self.location.clone(),
            time_zone: self.time_zone.clone(),
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            accept_invalid_certs: self.insecure,
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Create a config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SchedResult<()> {
        let contents = format!(
            "\
# schedcal configuration

# Schedule page to read talks from:
# schedule_url = \"{DEFAULT_SCHEDULE_URL}\"

# Calendar to add events to (\"primary\" for your main calendar):
# calendar = \"{DEFAULT_CALENDAR}\"

# Venue and time zone written on every event:
# location = \"{DEFAULT_LOCATION}\"
# time_zone = \"{DEFAULT_TIME_ZONE}\"

# Disable TLS certificate validation for the schedule download:
# insecure = false

# request_timeout_secs = {DEFAULT_REQUEST_TIMEOUT_SECS}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SchedError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SchedError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SchedcalConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();

        assert_eq!(config.calendar, "PyCon15");
        assert_eq!(config.time_zone, "America/Montreal");
        assert!(!config.insecure);
        assert_eq!(config.fetch_options().timeout, Duration::from_secs(30));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "calendar = \"EuroPython\"\ntime_zone = \"Europe/Dublin\"\nlocation = \"Convention Centre Dublin\"\ninsecure = true\n",
        )
        .unwrap();

        let config = SchedcalConfig::load_from(Some(&path)).unwrap();

        assert_eq!(config.calendar, "EuroPython");
        assert_eq!(
            config.venue(),
            Venue {
                location: "Convention Centre Dublin".into(),
                time_zone: "Europe/Dublin".into(),
            }
        );
        assert!(config.fetch_options().accept_invalid_certs);
        assert_eq!(config.schedule_url, DEFAULT_SCHEDULE_URL);
    }

    #[test]
    fn environment_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "calendar = \"EuroPython\"\nrequest_timeout_secs = 10\n").unwrap();

        let vars: config::Map<String, String> = [
            ("SCHEDCAL_CALENDAR", "primary"),
            ("SCHEDCAL_REQUEST_TIMEOUT_SECS", "45"),
            ("SCHEDCAL_INSECURE", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = SchedcalConfig::load_layered(&path, environment().source(Some(vars))).unwrap();

        assert_eq!(config.calendar, "primary");
        assert_eq!(config.request_timeout_secs, 45);
        assert!(config.insecure);
        assert_eq!(config.time_zone, DEFAULT_TIME_ZONE);
    }

    #[test]
    fn unknown_time_zone_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "time_zone = \"Mars/Olympus_Mons\"\n").unwrap();

        let err = SchedcalConfig::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, SchedError::Config(msg) if msg.contains("Mars/Olympus_Mons")));
    }

    #[test]
    fn default_template_is_valid_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        SchedcalConfig::create_default_config(&path).unwrap();
        let config = SchedcalConfig::load_from(Some(&path)).unwrap();

        assert_eq!(config.schedule_url, DEFAULT_SCHEDULE_URL);
    }
}
