//! Configuration file handling.
//!
//! Loads `~/.config/scope-viewer/config.toml` (or a custom path) and merges it
//! with command-line flags into [`Settings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Args;
use crate::error::ConfigError;
use crate::layout::{DisplayMode, LayoutParams};
use crate::render::DEFAULT_TICK;
use crate::shutdown;
use crate::types::Resolution;

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub device: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            width: 640,
            height: 360,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Overrides the size reported by the monitor.
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    pub zoom: f64,
    pub max_height_fraction: f64,
    pub tick_ms: u64,
    pub title: String,
    pub fullscreen: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            screen_width: None,
            screen_height: None,
            zoom: 1.0,
            max_height_fraction: 0.7,
            tick_ms: DEFAULT_TICK.as_millis() as u64,
            title: "Microscope".to_string(),
            fullscreen: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShutdownConfig {
    pub command: Vec<String>,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            command: shutdown::default_command(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// A missing file at the default location gives defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some();
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            if explicit {
                return Err(ConfigError::Io {
                    path,
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scope-viewer")
        .join("config.toml")
}

/// Screen size assumed when the monitor cannot be queried and the config
/// does not name one.
pub const FALLBACK_SCREEN: Resolution = Resolution {
    width: 1920,
    height: 1080,
};

/// Per axis: config override, then the detected monitor, then the fallback.
fn resolve_screen(display: &DisplayConfig, detected: Option<Resolution>) -> Resolution {
    if detected.is_none() && (display.screen_width.is_none() || display.screen_height.is_none()) {
        log::warn!("screen size unknown, assuming {FALLBACK_SCREEN}");
    }
    let base = detected.unwrap_or(FALLBACK_SCREEN);
    Resolution::new(
        display.screen_width.unwrap_or(base.width),
        display.screen_height.unwrap_or(base.height),
    )
}

/// Everything the session needs, after CLI > file > default precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub device: u32,
    pub requested: Resolution,
    pub mode: DisplayMode,
    pub screen: Resolution,
    pub zoom: f64,
    pub max_height_fraction: f64,
    pub tick: Duration,
    pub title: String,
    pub shutdown_command: Vec<String>,
}

impl Settings {
    /// `detected` is the primary monitor size, if the display could report it.
    pub fn resolve(
        args: &Args,
        config: &Config,
        detected: Option<Resolution>,
    ) -> Result<Self, ConfigError> {
        let fullscreen = args.fullscreen || config.display.fullscreen;
        let settings = Self {
            device: args.device.unwrap_or(config.camera.device),
            requested: Resolution::new(
                args.width.unwrap_or(config.camera.width),
                args.height.unwrap_or(config.camera.height),
            ),
            mode: if fullscreen {
                DisplayMode::Fullscreen
            } else {
                DisplayMode::Windowed
            },
            screen: resolve_screen(&config.display, detected),
            zoom: config.display.zoom,
            max_height_fraction: config.display.max_height_fraction,
            tick: Duration::from_millis(config.display.tick_ms),
            title: config.display.title.clone(),
            shutdown_command: config.shutdown.command.clone(),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.requested.width == 0 || self.requested.height == 0 {
            return invalid("camera width and height must be greater than 0");
        }
        if self.screen.width == 0 || self.screen.height == 0 {
            return invalid("display screen_width and screen_height must be greater than 0");
        }
        if !(self.zoom > 0.0 && self.zoom <= 1.0) {
            return invalid("display zoom must be in (0, 1]");
        }
        if !(self.max_height_fraction > 0.0 && self.max_height_fraction <= 1.0) {
            return invalid("display max_height_fraction must be in (0, 1]");
        }
        if self.tick.is_zero() {
            return invalid("display tick_ms must be greater than 0");
        }
        if self.shutdown_command.is_empty() {
            return invalid("shutdown command must not be empty");
        }
        Ok(())
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            screen: self.screen,
            mode: self.mode,
            zoom: self.zoom,
            max_height_fraction: self.max_height_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["scope-viewer"];
        full.extend_from_slice(argv);
        Args::parse_from(full)
    }

    #[test]
    fn test_defaults() {
        let s = Settings::resolve(&args(&[]), &Config::default(), None).unwrap();
        assert_eq!(s.requested, Resolution::new(640, 360));
        assert_eq!(s.mode, DisplayMode::Windowed);
        assert_eq!(s.tick, DEFAULT_TICK);
        assert_eq!(DEFAULT_TICK, Duration::from_millis(30));
        assert_eq!(s.zoom, 1.0);
        assert_eq!(s.title, "Microscope");
        assert_eq!(s.screen, FALLBACK_SCREEN);
    }

    #[test]
    fn test_detected_screen_is_used() {
        let panel = Resolution::new(800, 480);
        let s = Settings::resolve(&args(&["--fullscreen"]), &Config::default(), Some(panel))
            .unwrap();
        assert_eq!(s.screen, panel);
    }

    #[test]
    fn test_config_screen_overrides_detected() {
        let config: Config = toml::from_str("[display]\nscreen_width = 1024\n").unwrap();
        let s = Settings::resolve(&args(&[]), &config, Some(Resolution::new(800, 480))).unwrap();
        assert_eq!(s.screen, Resolution::new(1024, 480));

        let mut config = Config::default();
        config.display.screen_height = Some(0);
        assert!(Settings::resolve(&args(&[]), &config, None).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let config: Config = toml::from_str(
            r#"
            [camera]
            device = 1
            width = 800
            height = 600
            "#,
        )
        .unwrap();
        let s = Settings::resolve(&args(&["--width", "1920", "--fullscreen"]), &config, None)
            .unwrap();
        assert_eq!(s.requested, Resolution::new(1920, 600));
        assert_eq!(s.device, 1);
        assert_eq!(s.mode, DisplayMode::Fullscreen);
    }

    #[test]
    fn test_load_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[display]\nzoom = 0.5\ntick_ms = 40\n\
             [shutdown]\ncommand = [\"systemctl\", \"poweroff\"]"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.display.zoom, 0.5);
        assert_eq!(config.display.tick_ms, 40);
        assert_eq!(config.display.screen_width, None);
        assert_eq!(config.shutdown.command, vec!["systemctl", "poweroff"]);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display\nzoom = ").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let parsed: Result<Config, _> = toml::from_str("[display]\nzoom_percent = 50\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.display.zoom = 1.5;
        assert!(matches!(
            Settings::resolve(&args(&[]), &config, None),
            Err(ConfigError::Invalid(_))
        ));

        let mut config = Config::default();
        config.display.tick_ms = 0;
        assert!(Settings::resolve(&args(&[]), &config, None).is_err());

        let mut config = Config::default();
        config.shutdown.command.clear();
        assert!(Settings::resolve(&args(&[]), &config, None).is_err());
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.ends_with("scope-viewer/config.toml"));
    }
}
