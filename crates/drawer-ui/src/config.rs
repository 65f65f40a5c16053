//! Presentation configuration.
//!
//! Three sections, each with serde defaults so a partial TOML file only
//! overrides what it names:
//!
//! ```toml
//! [flags]
//! use_fullscreen = true
//!
//! [metrics]
//! corner_radius = 12.0
//!
//! [gestures]
//! flick_velocity = 800.0
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ── FeatureFlags ──────────────────────────────────────────────────────────

/// Process-wide switches read by every presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Present new screens edge-to-edge instead of as an inset card.
    pub use_fullscreen: bool,
    /// Use 3D layer transforms (with a tiny z scale) for receding screens.
    pub use_3d_transforms: bool,
    /// Run a screen's presentation-accompanying animation after it appears.
    #[serde(alias = "animate_bottom_view")]
    pub animate_with_presentation: bool,
    /// Default number of rows in demo content.
    pub row_count: u32,
    /// Demo screens embed a nested scrollable.
    pub present_scrollable: bool,
    /// Demo scrollables carry a pull-to-refresh indicator.
    pub use_refresh_control: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            use_fullscreen: false,
            use_3d_transforms: false,
            animate_with_presentation: true,
            row_count: 30,
            present_scrollable: true,
            use_refresh_control: false,
        }
    }
}

// ── DrawerMetrics ─────────────────────────────────────────────────────────

/// Layout constants for cards, receding ancestors and proxies (logical points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawerMetrics {
    pub corner_radius: f32,
    /// Total horizontal inset of a receded screen (split evenly left/right).
    pub side_margin: f32,
    /// Gap between the status bar and a receded screen's top edge.
    pub origin_padding: f32,
    /// Extra downward shift applied to the grandpresenter.
    pub grand_parent_offset: f32,
    /// How far a card extends below the window to absorb upward overscroll.
    pub bottom_overshoot: f32,
    /// Maximum upward stretch of a card dragged past its resting position.
    pub stretch_limit: f32,
    pub status_bar_height: f32,
    /// Height correction used when a full-screen presented screen recedes.
    pub full_screen_extra: f32,
    pub presentation_delay_ms: u64,
    pub presentation_animation_ms: u64,
    pub unstretch_ms: u64,
    pub corner_animation_ms: u64,
}

impl DrawerMetrics {
    #[inline]
    pub fn presentation_delay(&self) -> Duration {
        Duration::from_millis(self.presentation_delay_ms)
    }

    #[inline]
    pub fn presentation_animation(&self) -> Duration {
        Duration::from_millis(self.presentation_animation_ms)
    }

    #[inline]
    pub fn unstretch(&self) -> Duration {
        Duration::from_millis(self.unstretch_ms)
    }

    #[inline]
    pub fn corner_animation(&self) -> Duration {
        Duration::from_millis(self.corner_animation_ms)
    }
}

impl Default for DrawerMetrics {
    fn default() -> Self {
        Self {
            corner_radius: 18.0,
            side_margin: 32.0,
            origin_padding: 10.0,
            grand_parent_offset: 10.0,
            bottom_overshoot: 20.0,
            stretch_limit: 20.0,
            status_bar_height: 44.0,
            full_screen_extra: 36.0,
            presentation_delay_ms: 100,
            presentation_animation_ms: 800,
            unstretch_ms: 650,
            corner_animation_ms: 300,
        }
    }
}

// ── GestureThresholds ─────────────────────────────────────────────────────

/// Decision thresholds for interactive dismissal. Velocities in points/second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Progress at which a released drag commits.
    pub complete_fraction: f32,
    /// Downward release velocity that commits regardless of progress.
    pub flick_velocity: f32,
    /// Downward release velocity that commits even over a refresh indicator.
    pub refresh_flick_velocity: f32,
    /// At or below this release velocity the nested scroll is re-armed.
    pub scroll_reset_velocity: f32,
    /// Progress after which the status bar follows the presenter.
    pub status_bar_switch: f32,
    /// Drag distance before the status bar switches to light content.
    pub status_bar_lead: f32,
    /// Width of the screen-edge strip that starts edge pans.
    pub edge_width: f32,
    pub touch_slop: f32,
    /// Floor for the remaining fraction used to derive finish speed.
    pub completion_epsilon: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            complete_fraction: 0.5,
            flick_velocity: 650.0,
            refresh_flick_velocity: 1750.0,
            scroll_reset_velocity: 700.0,
            status_bar_switch: 0.75,
            status_bar_lead: 14.0,
            edge_width: 20.0,
            touch_slop: 8.0,
            completion_epsilon: 0.01,
        }
    }
}

// ── DrawerConfig ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawerConfig {
    pub flags: FeatureFlags,
    pub metrics: DrawerMetrics,
    pub gestures: GestureThresholds,
}

impl DrawerConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: DrawerConfig = toml::from_str(src).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Rejects values the geometry cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.metrics;
        let g = &self.gestures;
        if !(m.corner_radius >= 0.0) {
            return Err(ConfigError::Invalid("metrics.corner_radius must be >= 0".into()));
        }
        if !(m.side_margin >= 0.0) {
            return Err(ConfigError::Invalid("metrics.side_margin must be >= 0".into()));
        }
        if !(m.status_bar_height >= 0.0) {
            return Err(ConfigError::Invalid("metrics.status_bar_height must be >= 0".into()));
        }
        if !(g.complete_fraction > 0.0 && g.complete_fraction < 1.0) {
            return Err(ConfigError::Invalid("gestures.complete_fraction must be in (0, 1)".into()));
        }
        if !(g.completion_epsilon > 0.0 && g.completion_epsilon < 1.0) {
            return Err(ConfigError::Invalid("gestures.completion_epsilon must be in (0, 1)".into()));
        }
        Ok(())
    }
}

// ── ConfigError ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read drawer config {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid drawer config: {e}"),
            ConfigError::Serialize(e) => write!(f, "cannot serialize drawer config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid drawer config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        assert_eq!(DrawerConfig::from_toml_str("").unwrap(), DrawerConfig::default());
    }

    #[test]
    fn partial_sections_override_only_named_keys() {
        let cfg = DrawerConfig::from_toml_str(
            "[flags]\nuse_fullscreen = true\n\n[metrics]\ncorner_radius = 12.0\n",
        )
        .unwrap();
        assert!(cfg.flags.use_fullscreen);
        assert!(cfg.flags.animate_with_presentation);
        assert_eq!(cfg.metrics.corner_radius, 12.0);
        assert_eq!(cfg.metrics.side_margin, 32.0);
        assert_eq!(cfg.gestures, GestureThresholds::default());
    }

    #[test]
    fn legacy_flag_name_is_accepted() {
        let cfg = DrawerConfig::from_toml_str("[flags]\nanimate_bottom_view = false\n").unwrap();
        assert!(!cfg.flags.animate_with_presentation);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = DrawerConfig::from_toml_str("[gestures]\ncomplete_fraction = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("complete_fraction"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = DrawerConfig::from_toml_str("[flags\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn serialized_config_reloads_identically() {
        let mut cfg = DrawerConfig::default();
        cfg.flags.row_count = 12;
        cfg.gestures.flick_velocity = 900.0;
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(DrawerConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DrawerConfig::load("/nonexistent/drawer.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/drawer.toml"));
    }
}
