use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::foundation::error::{SplashError, SplashResult};

/// How the card (and therefore the usable plate area) is sized from the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum UsableArea {
    /// Card is the surface inset by `outer_padding_px` on every side.
    #[default]
    Padding,
    /// Card is a centered rectangle covering the given fraction of each surface axis.
    Fraction {
        /// Fraction of the surface width, clamped to `0..=1`.
        width: f64,
        /// Fraction of the surface height, clamped to `0..=1`.
        height: f64,
    },
}

/// Geometry constants for [`crate::compute_layout`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Space between surface edge and card (padding policy only).
    pub outer_padding_px: f64,
    /// Space between card edge and plates.
    pub card_padding_px: f64,
    /// Horizontal gap between consecutive plates.
    pub gap_px: f64,
    /// Smallest scale ever produced, in px per cm.
    pub min_scale: f64,
    /// Card sizing policy.
    pub usable_area: UsableArea,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            outer_padding_px: 24.0,
            card_padding_px: 16.0,
            gap_px: 12.0,
            min_scale: 0.1,
            usable_area: UsableArea::Padding,
        }
    }
}

/// Colors and corner/shadow metrics used by the compositor. Colors are straight RGBA8.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleParams {
    /// Surface clear color.
    pub background: [u8; 4],
    /// Card gradient color at the top edge.
    pub card_top: [u8; 4],
    /// Card gradient color at the bottom edge.
    pub card_bottom: [u8; 4],
    /// Card drop shadow color at full strength.
    pub shadow: [u8; 4],
    /// Plate border color.
    pub border: [u8; 4],
    /// Plate fill when no motif is available.
    pub placeholder: [u8; 4],
    /// Card corner radius.
    pub card_radius_px: f64,
    /// Plate corner radius.
    pub plate_radius_px: f64,
    /// Downward shadow offset.
    pub shadow_offset_px: f64,
    /// Shadow falloff distance.
    pub shadow_blur_px: f64,
    /// Plate border stroke width.
    pub border_width_px: f64,
}

impl Default for StyleParams {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 0],
            card_top: [250, 250, 248, 255],
            card_bottom: [232, 230, 226, 255],
            shadow: [0, 0, 0, 64],
            border: [0, 0, 0, 40],
            placeholder: [214, 211, 205, 255],
            card_radius_px: 18.0,
            plate_radius_px: 8.0,
            shadow_offset_px: 6.0,
            shadow_blur_px: 12.0,
            border_width_px: 1.0,
        }
    }
}

/// Motif fallback chain settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MotifParams {
    /// Remote default locator, tried after the user tier.
    pub remote_default: String,
    /// Local fallback locator, tried last. `None` uses the motif embedded in the crate.
    pub local_fallback: Option<String>,
    /// Upper bound for one tier's fetch and decode.
    pub timeout_ms: u64,
    /// Origin sent with cross-origin requests.
    pub origin: String,
}

impl Default for MotifParams {
    fn default() -> Self {
        Self {
            remote_default: "https://assets.example.com/splashback/motif-default.jpg".to_owned(),
            local_fallback: None,
            timeout_ms: 6500,
            origin: "http://localhost".to_owned(),
        }
    }
}

impl MotifParams {
    /// Per-tier timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Complete render configuration. Every section falls back to defaults when omitted.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Geometry constants.
    pub layout: LayoutParams,
    /// Paint style.
    pub style: StyleParams,
    /// Motif resolution.
    pub motif: MotifParams,
}

impl RenderConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SplashResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| SplashError::serde(format!("parse render config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SplashResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SplashError::validation(format!("open render config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject values that would break layout invariants.
    pub fn validate(&self) -> SplashResult<()> {
        let l = &self.layout;
        for (name, v) in [
            ("outer_padding_px", l.outer_padding_px),
            ("card_padding_px", l.card_padding_px),
            ("gap_px", l.gap_px),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SplashError::validation(format!(
                    "layout.{name} must be finite and >= 0"
                )));
            }
        }
        if !l.min_scale.is_finite() || l.min_scale <= 0.0 {
            return Err(SplashError::validation("layout.min_scale must be > 0"));
        }
        if let UsableArea::Fraction { width, height } = l.usable_area
            && !(width > 0.0 && width <= 1.0 && height > 0.0 && height <= 1.0)
        {
            return Err(SplashError::validation(
                "layout.usable_area fractions must be in (0, 1]",
            ));
        }
        if self.motif.timeout_ms == 0 {
            return Err(SplashError::validation("motif.timeout_ms must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
