//! Per-instance widget configuration.
//!
//! ```
//! use horizon_select::{PickerStyle, SelectConfig};
//!
//! let config = SelectConfig::from_toml_str(r#"
//! min_bottom_space = 200.0
//! picker = "os-popup"
//! "#).unwrap();
//!
//! assert_eq!(config.min_bottom_space, 200.0);
//! assert_eq!(config.picker, PickerStyle::OsPopup);
//! ```

use std::time::Duration;

use horizon_select_core::KeyboardModifiers;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Space in pixels the dropdown wants below its anchor before opening upward.
pub const DEFAULT_MIN_BOTTOM_SPACE: f32 = 160.0;

/// Delay before the focus marker is removed after a blur: one frame at 30 fps.
pub const DEFAULT_BLUR_DEBOUNCE_MS: f64 = 1000.0 / 30.0;

/// Reject a minimum bottom space that is negative or not finite.
pub fn validate_min_bottom_space(pixels: f32) -> Result<(), ConfigError> {
    if pixels.is_finite() && pixels >= 0.0 {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        field: "min_bottom_space",
        reason: format!("expected a non-negative pixel count, got {pixels}"),
    })
}

/// How the platform's native control lets the user change its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PickerStyle {
    /// Arrow keys change the selection in place.
    Inline,
    /// Changing the value opens an OS-level picker; the widget performs
    /// arrow-key stepping itself.
    OsPopup,
}

impl Default for PickerStyle {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self::OsPopup
        } else {
            Self::Inline
        }
    }
}

/// Modifier that turns ArrowUp/ArrowDown into an open gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenModifier {
    #[default]
    Alt,
    Control,
    Shift,
    Meta,
}

impl OpenModifier {
    /// Whether this modifier is held in `modifiers`.
    pub fn is_held(self, modifiers: KeyboardModifiers) -> bool {
        match self {
            Self::Alt => modifiers.alt,
            Self::Control => modifiers.control,
            Self::Shift => modifiers.shift,
            Self::Meta => modifiers.meta,
        }
    }
}

/// Configuration of a [`Select`](crate::Select).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    /// Initial minimum bottom space handed to the tethered panel, in pixels.
    pub min_bottom_space: f32,
    /// Blur debounce in milliseconds.
    pub blur_debounce_ms: f64,
    /// Native picker behaviour of the platform.
    pub picker: PickerStyle,
    /// Modifier for the arrow-key open gesture.
    pub open_modifier: OpenModifier,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            min_bottom_space: DEFAULT_MIN_BOTTOM_SPACE,
            blur_debounce_ms: DEFAULT_BLUR_DEBOUNCE_MS,
            picker: PickerStyle::default(),
            open_modifier: OpenModifier::default(),
        }
    }
}

impl SelectConfig {
    /// Parse and validate a configuration from TOML. Missing fields keep
    /// their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_min_bottom_space(self.min_bottom_space)?;
        if !self.blur_debounce_ms.is_finite() || self.blur_debounce_ms < 0.0 {
            return Err(ConfigError::Invalid {
                field: "blur_debounce_ms",
                reason: format!("expected non-negative milliseconds, got {}", self.blur_debounce_ms),
            });
        }
        Ok(())
    }

    /// The blur debounce as a duration.
    pub fn blur_debounce(&self) -> Duration {
        Duration::from_secs_f64(self.blur_debounce_ms.max(0.0) / 1000.0)
    }

    pub fn with_min_bottom_space(mut self, pixels: f32) -> Self {
        self.min_bottom_space = pixels;
        self
    }

    pub fn with_blur_debounce_ms(mut self, ms: f64) -> Self {
        self.blur_debounce_ms = ms;
        self
    }

    pub fn with_picker(mut self, picker: PickerStyle) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_open_modifier(mut self, modifier: OpenModifier) -> Self {
        self.open_modifier = modifier;
        self
    }
}
