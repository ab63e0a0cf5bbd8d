//! Global ttsync configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::address::BuildingDirectory;
use crate::error::{TtSyncError, TtSyncResult};
use crate::event::EncodeContext;

static DEFAULT_CALENDAR: &str = "Timetable";
static DEFAULT_TIME_ZONE: &str = "Europe/London";
static DEFAULT_TIMETABLE_PATH: &str = "~/.config/ttsync/timetable.json";
static DEFAULT_CACHE_TTL: &str = "1h";
const DEFAULT_WINDOW_PADDING_DAYS: u32 = 7;

fn default_calendar() -> String {
    DEFAULT_CALENDAR.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_timetable() -> PathBuf {
    PathBuf::from(DEFAULT_TIMETABLE_PATH)
}

fn default_cache_ttl() -> String {
    DEFAULT_CACHE_TTL.to_string()
}

fn default_window_padding_days() -> u32 {
    DEFAULT_WINDOW_PADDING_DAYS
}

/// Configuration at ~/.config/ttsync/config.toml, overridable with
/// `TTSYNC_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Name of the remote calendar the timetable is mirrored into.
    #[serde(default = "default_calendar")]
    pub calendar: String,

    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Timetable export to read.
    #[serde(default = "default_timetable")]
    pub timetable: PathBuf,

    /// How old the export may get before a warning, e.g. `1h` or `2days`.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    /// Extra days listed on either side of the timetable's date span.
    #[serde(default = "default_window_padding_days")]
    pub window_padding_days: u32,

    pub google_account: Option<String>,

    /// Building code to address.
    #[serde(default)]
    pub buildings: BTreeMap<String, String>,
}

impl SyncConfig {
    pub fn config_dir() -> TtSyncResult<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| TtSyncError::Config("Could not determine config directory".into()))?
            .join("ttsync"))
    }

    pub fn config_path() -> TtSyncResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first if
    /// there is no config yet.
    pub fn load() -> TtSyncResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TtSyncResult<Self> {
        let config: SyncConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("TTSYNC"))
            .build()
            .map_err(|e| TtSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TtSyncError::Config(e.to_string()))?;

        // Reject bad values at load time.
        config.tz()?;
        config.cache_ttl()?;

        Ok(config)
    }

    pub fn tz(&self) -> TtSyncResult<Tz> {
        self.time_zone
            .parse()
            .map_err(|_| TtSyncError::Config(format!("Unknown time zone '{}'", self.time_zone)))
    }

    pub fn cache_ttl(&self) -> TtSyncResult<Duration> {
        humantime::parse_duration(&self.cache_ttl).map_err(|e| {
            TtSyncError::Config(format!("Invalid cache_ttl '{}': {}", self.cache_ttl, e))
        })
    }

    pub fn timetable_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.timetable.to_string_lossy()).into_owned())
    }

    pub fn building_directory(&self) -> BuildingDirectory {
        BuildingDirectory::new(self.buildings.clone())
    }

    pub fn encode_context(&self) -> TtSyncResult<EncodeContext> {
        Ok(EncodeContext::new(self.tz()?, self.building_directory()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TtSyncResult<()> {
        let contents = format!(
            "\
# ttsync configuration

# Remote calendar the timetable is written to:
# calendar = \"{}\"

# Time zone of the timetable:
# time_zone = \"{}\"

# Timetable export to read:
# timetable = \"{}\"

# Warn when the export is older than:
# cache_ttl = \"{}\"

# Days listed either side of the timetable when reading the calendar:
# window_padding_days = {}

# Google account to sync with (defaults to the only one signed in):
# google_account = \"me@example.com\"

# Building codes (the start of a room code) and their addresses:
[buildings]
# SCH = \"Schofield Building, University Rd\"
",
            DEFAULT_CALENDAR,
            DEFAULT_TIME_ZONE,
            DEFAULT_TIMETABLE_PATH,
            DEFAULT_CACHE_TTL,
            DEFAULT_WINDOW_PADDING_DAYS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TtSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TtSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).expect("Should write config");
        (dir, path)
    }

    #[test]
    fn test_default_template_loads_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        SyncConfig::create_default_config(&path).expect("Should create template");
        let config = SyncConfig::load_from(&path).expect("Should load template");

        assert_eq!(config.calendar, "Timetable");
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::London);
        assert_eq!(config.cache_ttl().unwrap(), Duration::from_secs(3600));
        assert_eq!(config.window_padding_days, 7);
        assert!(config.building_directory().is_empty());
    }

    #[test]
    fn test_values_are_read_from_file() {
        let (_dir, path) = write_config(
            r#"
calendar = "Uni"
time_zone = "America/New_York"
cache_ttl = "30m"
timetable = "/tmp/export.json"

[buildings]
SCH = "Schofield Building"
"#,
        );

        let config = SyncConfig::load_from(&path).expect("Should load config");

        assert_eq!(config.calendar, "Uni");
        assert_eq!(config.tz().unwrap(), chrono_tz::America::New_York);
        assert_eq!(config.cache_ttl().unwrap(), Duration::from_secs(30 * 60));
        assert_eq!(config.timetable_path(), PathBuf::from("/tmp/export.json"));
        assert_eq!(
            config.building_directory().building("SCH.0.01"),
            Some("Schofield Building")
        );
    }

    #[test]
    fn test_unknown_time_zone_is_rejected() {
        let (_dir, path) = write_config("time_zone = \"Mars/Olympus\"\n");

        assert!(matches!(
            SyncConfig::load_from(&path),
            Err(TtSyncError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_cache_ttl_is_rejected() {
        let (_dir, path) = write_config("cache_ttl = \"soon\"\n");

        assert!(matches!(
            SyncConfig::load_from(&path),
            Err(TtSyncError::Config(_))
        ));
    }
}
