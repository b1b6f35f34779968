use directories::UserDirs;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid gestures.{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Touch-interaction constants. Distances in pixels, velocities in px/s,
/// timeouts in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub touch_slop: f32,
    pub double_tap_slop: f32,
    pub min_fling_velocity: f32,
    pub max_fling_velocity: f32,
    pub tap_timeout_ms: u64,
    pub double_tap_timeout_ms: u64,
    pub long_press_timeout_ms: u64,
    /// Cap on concurrently tracked single-pointer gestures. Scale tracking is not affected.
    pub max_pointers: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            double_tap_slop: 100.0,
            min_fling_velocity: 50.0,
            max_fling_velocity: 8000.0,
            tap_timeout_ms: 100,
            double_tap_timeout_ms: 300,
            long_press_timeout_ms: 500,
            max_pointers: 10,
        }
    }
}

impl GestureConfig {
    pub fn touch_slop_square(&self) -> f32 {
        self.touch_slop * self.touch_slop
    }

    pub fn double_tap_slop_square(&self) -> f32 {
        self.double_tap_slop * self.double_tap_slop
    }

    pub fn min_fling_velocity_square(&self) -> f32 {
        self.min_fling_velocity * self.min_fling_velocity
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let distances = [
            ("touch_slop", self.touch_slop),
            ("double_tap_slop", self.double_tap_slop),
            ("min_fling_velocity", self.min_fling_velocity),
            ("max_fling_velocity", self.max_fling_velocity),
        ];
        for (field, v) in distances {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a finite non-negative number, got {v}"),
                });
            }
        }
        if self.min_fling_velocity > self.max_fling_velocity {
            return Err(ConfigError::Invalid {
                field: "min_fling_velocity",
                reason: format!(
                    "{} exceeds max_fling_velocity {}",
                    self.min_fling_velocity, self.max_fling_velocity
                ),
            });
        }
        let timeouts = [
            ("tap_timeout_ms", self.tap_timeout_ms),
            ("double_tap_timeout_ms", self.double_tap_timeout_ms),
            ("long_press_timeout_ms", self.long_press_timeout_ms),
        ];
        for (field, v) in timeouts {
            if v == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "timeouts must be positive durations".into(),
                });
            }
        }
        if self.max_pointers == 0 {
            return Err(ConfigError::Invalid {
                field: "max_pointers",
                reason: "at least one pointer must be trackable".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub gestures: GestureConfig,
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

/// `~/.config/gesturectl/profile.toml`, if a home directory is known.
pub fn user_profile_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("gesturectl")
            .join("profile.toml")
    })
}

impl Profile {
    pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let profile: Profile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        profile.gestures.validate()?;
        Ok(profile)
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse(default_profile_text(), "built-in profile")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let txt = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&txt, &path.display().to_string())
    }

    /// Explicit path, else the user profile if present, else the built-in one.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(p) = explicit {
            return Self::load(p);
        }
        if let Some(p) = user_profile_path().filter(|p| p.exists()) {
            info!("using profile {}", p.display());
            return Self::load(&p);
        }
        Self::builtin()
    }
}
