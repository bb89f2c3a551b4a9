//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use st_core::day::DayBoundaryError;
use st_core::{DEFAULT_CUTOFF_HOUR, DayBoundary, Profile};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub profile: Profile,
    /// Days of logs to read when `--days` is not given.
    pub days: u32,
    /// Hour at which a logical day begins.
    pub cutoff_hour: u32,
    /// Extra case-insensitive substrings that drop a message before matching.
    #[serde(default)]
    pub suppress: Vec<String>,
    /// Directory for default output files.
    pub output_dir: PathBuf,
    /// Bins in the session length histogram.
    pub histogram_bins: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            days: 7,
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
            suppress: Vec::new(),
            output_dir: PathBuf::from("."),
            histogram_bins: 20,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ST_DAYS, ST_PROFILE, ...
        figment = figment.merge(Env::prefixed("ST_"));

        figment.extract()
    }

    /// The configured day boundary.
    pub const fn day_boundary(&self) -> Result<DayBoundary, DayBoundaryError> {
        DayBoundary::new(self.cutoff_hour)
    }

    /// Default path of the daily CSV for a profile.
    pub fn default_output(&self, profile: Profile) -> PathBuf {
        self.output_dir.join(format!("{profile}_analysis.csv"))
    }

    /// Default path of the raw records saved by `st collect`.
    pub fn default_collect_output(&self, profile: Profile) -> PathBuf {
        self.output_dir.join(format!("{profile}_logs.json"))
    }
}

/// Returns the platform-specific config directory for screentime.
///
/// On Linux: `~/.config/screentime`
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("screentime"))
}
