use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{ModPilotError, ModPilotResult};

/// Tuning knobs loaded from `config.toml`. Every field has a sensible
/// default, so the file is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory holding the template button images.
    #[serde(default = "default_assets_dir")]
    pub dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: default_assets_dir(),
        }
    }
}

fn default_assets_dir() -> String {
    "assets".into()
}

/// Per-template descriptor-distance thresholds. Tuned empirically per
/// template; an absolute cutoff, not a ratio test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_loose_threshold")]
    pub vortex_download: u32,
    #[serde(default = "default_loose_threshold")]
    pub website_download: u32,
    #[serde(default = "default_tight_threshold")]
    pub click_here: u32,
    #[serde(default = "default_tight_threshold")]
    pub understood: u32,
    #[serde(default = "default_tight_threshold")]
    pub staging: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            vortex_download: default_loose_threshold(),
            website_download: default_loose_threshold(),
            click_here: default_tight_threshold(),
            understood: default_tight_threshold(),
            staging: default_tight_threshold(),
        }
    }
}

fn default_loose_threshold() -> u32 {
    100
}

fn default_tight_threshold() -> u32 {
    80
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause between scan ticks, in seconds.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
    /// Pause after clicking a dismiss-dialog button.
    #[serde(default = "default_settle_seconds")]
    pub settle_seconds: u64,
    /// Pause after the confirmation target appears, while the download or
    /// page finishes.
    #[serde(default = "default_confirm_pause_seconds")]
    pub confirm_pause_seconds: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
            settle_seconds: default_settle_seconds(),
            confirm_pause_seconds: default_confirm_pause_seconds(),
        }
    }
}

fn default_tick_seconds() -> u64 {
    2
}

fn default_settle_seconds() -> u64 {
    1
}

fn default_confirm_pause_seconds() -> u64 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Title of the mod-manager window used to constrain primary-button
    /// detection.
    #[serde(default = "default_window_title")]
    pub window_title: String,
    /// Fraction of the window extent shaved off each edge of the detection
    /// region to suppress matches on window chrome.
    #[serde(default = "default_window_margin")]
    pub window_margin_fraction: f64,
    /// Consecutive web-button misses tolerated before restarting the
    /// workflow from the top. Reset fires strictly above this value.
    #[serde(default = "default_miss_streak_limit")]
    pub web_miss_streak_limit: u32,
    /// FAST corner threshold for the feature extractor.
    #[serde(default = "default_corner_threshold")]
    pub corner_threshold: u8,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            window_margin_fraction: default_window_margin(),
            web_miss_streak_limit: default_miss_streak_limit(),
            corner_threshold: default_corner_threshold(),
        }
    }
}

fn default_window_title() -> String {
    "Vortex".into()
}

fn default_window_margin() -> f64 {
    0.15
}

fn default_miss_streak_limit() -> u32 {
    5
}

fn default_corner_threshold() -> u8 {
    20
}

/// Which browser the operator pairs with the mod manager. Only used to
/// validate the flag combination; window placement itself is handled by an
/// external helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Browser {
    Chrome,
    Firefox,
}

/// Validated run options derived from the CLI flags. Invalid combinations
/// fail before the scan loop starts.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Two-phase workflow: drive the mod manager's download button as the
    /// primary target and wait for the confirmation page after each web
    /// click.
    pub two_phase: bool,
    pub browser: Option<Browser>,
    pub force_primary: bool,
}

impl RunOptions {
    pub fn new(
        two_phase: bool,
        browser: Option<Browser>,
        force_primary: bool,
    ) -> ModPilotResult<Self> {
        if browser.is_some() && !two_phase {
            return Err(ModPilotError::Config(
                "--browser requires the two-phase workflow (--vortex)".into(),
            ));
        }
        Ok(Self {
            two_phase,
            browser,
            force_primary,
        })
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join("config.toml");
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    None
}

/// Loads `config.toml` from next to the executable or the working directory,
/// falling back to built-in defaults when no file exists.
pub fn load_config() -> ModPilotResult<AppConfig> {
    match resolve_config_path() {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            let config: AppConfig = toml::from_str(&content)?;
            tracing::info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => {
            tracing::info!("no config.toml found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let config = AppConfig::default();
        assert_eq!(config.thresholds.vortex_download, 100);
        assert_eq!(config.thresholds.staging, 80);
        assert_eq!(config.timing.tick_seconds, 2);
        assert_eq!(config.detection.web_miss_streak_limit, 5);
    }

    #[test]
    fn empty_toml_parses_to_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.thresholds.click_here, 80);
        assert_eq!(config.detection.window_title, "Vortex");
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: AppConfig = toml::from_str(
            "[thresholds]\nvortex_download = 64\n\n[timing]\ntick_seconds = 1\n",
        )
        .unwrap();
        assert_eq!(config.thresholds.vortex_download, 64);
        assert_eq!(config.thresholds.website_download, 100);
        assert_eq!(config.timing.tick_seconds, 1);
        assert_eq!(config.timing.settle_seconds, 1);
    }

    #[test]
    fn browser_without_two_phase_is_rejected() {
        let err = RunOptions::new(false, Some(Browser::Chrome), false).unwrap_err();
        assert!(matches!(err, ModPilotError::Config(_)));
    }

    #[test]
    fn browser_with_two_phase_is_accepted() {
        let opts = RunOptions::new(true, Some(Browser::Firefox), false).unwrap();
        assert!(opts.two_phase);
        assert_eq!(opts.browser, Some(Browser::Firefox));
    }
}
