// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runtime configuration, read from a RON file and the environment.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use khora_control::ReloadConfig;
use khora_core::platform::AudioFormat;
use khora_core::time::MAX_TICK_CAP;
use serde::Deserialize;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "khora-live.ron";

/// Environment variable overriding [`RuntimeConfig::module_path`].
pub const MODULE_ENV: &str = "KHORA_MODULE";

const MIB: u32 = 1024 * 1024;

/// Errors raised while reading or validating a [`RuntimeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid RON for this structure.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// The parser error, with its position.
        #[source]
        source: ron::error::SpannedError,
    },
    /// The target frame rate is zero, negative or not a number.
    #[error("target_fps must be a positive number, got {fps}")]
    InvalidFps {
        /// The rejected value.
        fps: f64,
    },
    /// The frame rate is so low that a single frame would last a minute or more.
    #[error("target_fps {fps} gives a frame cap of {cap:?}, which must be below {max:?}", max = MAX_TICK_CAP)]
    FrameCapTooLarge {
        /// The rejected value.
        fps: f64,
        /// The resulting frame cap.
        cap: Duration,
    },
    /// The frame buffer has no pixels.
    #[error("frame buffer must not be empty, got {width}x{height}")]
    EmptyFrame {
        /// Configured width.
        width: i32,
        /// Configured height.
        height: i32,
    },
    /// The sample rate is zero.
    #[error("sample_rate must not be zero")]
    ZeroSampleRate,
    /// The directory of the running executable could not be determined.
    #[error("failed to locate the executable directory: {0}")]
    ExecutableDir(#[source] io::Error),
}

/// Settings for one runtime instance.
///
/// Every field has a default, so a configuration file only lists what it
/// changes:
///
/// ```ron
/// (
///     module_path: "target/debug/libgame.so",
///     target_fps: 30.0,
///     max_frames: Some(600),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// The game module artifact. Relative paths resolve against the
    /// executable's directory.
    pub module_path: PathBuf,
    /// Capacity of the persistent arena buffer in bytes.
    pub persistent_bytes: u32,
    /// Capacity of the transient arena buffer in bytes.
    pub transient_bytes: u32,
    /// Iterations per second the loop is capped at.
    pub target_fps: f64,
    /// How long the artifact must stay unchanged before a reload is attempted.
    pub reload_quiet_ms: u64,
    /// Frame buffer width in pixels.
    pub frame_width: i32,
    /// Frame buffer height in pixels.
    pub frame_height: i32,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
    /// Size of the audio buffer handed to `Sound`, in bytes.
    pub audio_buffer_bytes: u32,
    /// Stop after this many iterations. Runs until stopped when `None`.
    pub max_frames: Option<u64>,
    /// How often frame statistics are logged.
    pub stats_interval_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from(default_module_name()),
            persistent_bytes: 64 * MIB,
            transient_bytes: 16 * MIB,
            target_fps: 60.0,
            reload_quiet_ms: 250,
            frame_width: 960,
            frame_height: 540,
            sample_rate: 44_100,
            audio_buffer_bytes: 16 * 1024,
            max_frames: None,
            stats_interval_ms: 1000,
        }
    }
}

impl RuntimeConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, falling back to the defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_ron_str(&text, path)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No {} found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Reads [`CONFIG_FILE`] from the working directory, applies the
    /// environment overrides and validates the result.
    pub fn from_environment() -> Result<Self, ConfigError> {
        let mut config = Self::load_or_default(Path::new(CONFIG_FILE))?;
        config.apply_module_override(std::env::var_os(MODULE_ENV));
        config.validate()?;
        Ok(config)
    }

    /// Replaces the module path with `value` when it is set and non-empty.
    pub fn apply_module_override(&mut self, value: Option<OsString>) {
        if let Some(path) = value.filter(|v| !v.is_empty()) {
            log::info!("{MODULE_ENV} overrides the module path with {path:?}");
            self.module_path = PathBuf::from(path);
        }
    }

    /// Checks the values no runtime can start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(ConfigError::InvalidFps {
                fps: self.target_fps,
            });
        }
        let cap = self.frame_cap();
        if cap >= MAX_TICK_CAP {
            return Err(ConfigError::FrameCapTooLarge {
                fps: self.target_fps,
                cap,
            });
        }
        if self.frame_width <= 0 || self.frame_height <= 0 {
            return Err(ConfigError::EmptyFrame {
                width: self.frame_width,
                height: self.frame_height,
            });
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        Ok(())
    }

    /// The minimum duration of one iteration.
    pub fn frame_cap(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.target_fps).unwrap_or(Duration::MAX)
    }

    /// The interval between two frame statistics reports.
    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }

    /// Debounce settings for the reload controller.
    pub fn reload_config(&self) -> ReloadConfig {
        ReloadConfig {
            quiet_period: Duration::from_millis(self.reload_quiet_ms),
        }
    }

    /// The PCM format handed to `Sound`.
    pub fn audio_format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            ..AudioFormat::STEREO_16
        }
    }

    /// The module path, made absolute against the running executable's directory.
    pub fn resolve_module_path(&self) -> Result<PathBuf, ConfigError> {
        if self.module_path.is_absolute() {
            return Ok(self.module_path.clone());
        }
        let exe = std::env::current_exe().map_err(ConfigError::ExecutableDir)?;
        let dir = exe.parent().ok_or_else(|| {
            ConfigError::ExecutableDir(io::Error::new(
                io::ErrorKind::NotFound,
                "executable has no parent directory",
            ))
        })?;
        Ok(self.resolve_module_path_in(dir))
    }

    /// The module path, made absolute against `dir`.
    pub fn resolve_module_path_in(&self, dir: &Path) -> PathBuf {
        if self.module_path.is_absolute() {
            self.module_path.clone()
        } else {
            dir.join(&self.module_path)
        }
    }
}

/// The platform's file name for a dynamic library called `game`.
pub fn default_module_name() -> String {
    format!("{DLL_PREFIX}game{DLL_SUFFIX}")
}
