//! Character Settings
//!
//! Tunables for a [`Character`](crate::character::Character): palette size,
//! crossfade defaults, speed limits and the clip picked at load time.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use marionette::settings::CharacterSettings;
//!
//! let settings = CharacterSettings {
//!     palette_capacity: 64,
//!     default_fade_seconds: 0.5,
//!     ..Default::default()
//! };
//!
//! // Or from a JSON file shipped next to the asset
//! let settings = CharacterSettings::from_json_str(r#"{ "max_speed": 4.0 }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::animation::LoopMode;
use crate::errors::{MarionetteError, Result};

/// Number of bone matrices in the GPU uniform block ("Bones").
pub const DEFAULT_PALETTE_CAPACITY: usize = 100;

/// Per-character configuration.
///
/// Every field has a default, so a partial JSON document only overrides the
/// keys it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    /// Number of matrix slots in the bone palette. Bones beyond this are
    /// dropped at load time.
    pub palette_capacity: usize,
    /// Fade duration used by [`crossfade_to_name`](crate::character::Character::crossfade_to_name)
    /// when the caller passes `None`.
    pub default_fade_seconds: f32,
    /// Positive fade requests shorter than this are stretched to it.
    pub min_fade_seconds: f32,
    /// Upper bound for playback speed multipliers.
    pub max_speed: f32,
    /// Clip selected at load: first clip whose name contains one of these
    /// (case-insensitive). Falls back to clip 0.
    pub default_clip_hints: Vec<String>,
    /// Start playing immediately after load.
    pub autoplay: bool,
    /// Wrap behaviour for every clock of the character.
    pub loop_mode: LoopMode,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            palette_capacity: DEFAULT_PALETTE_CAPACITY,
            default_fade_seconds: 0.35,
            min_fade_seconds: 0.05,
            max_speed: 8.0,
            default_clip_hints: vec!["idle".to_string()],
            autoplay: true,
            loop_mode: LoopMode::Loop,
        }
    }
}

impl CharacterSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.palette_capacity == 0 {
            return Err(MarionetteError::InvalidSettings(
                "palette_capacity must be at least 1".to_string(),
            ));
        }

        let non_negative = [
            ("default_fade_seconds", self.default_fade_seconds),
            ("min_fade_seconds", self.min_fade_seconds),
            ("max_speed", self.max_speed),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(MarionetteError::InvalidSettings(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        Ok(())
    }
}
