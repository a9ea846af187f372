use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{SplashError, SplashResult};

/// Accepted plate widths in centimeters.
pub const PLATE_WIDTH_CM: RangeInclusive<f64> = 20.0..=300.0;
/// Accepted plate heights in centimeters.
pub const PLATE_HEIGHT_CM: RangeInclusive<f64> = 30.0..=128.0;
/// Accepted number of plates in one arrangement.
pub const PLATE_COUNT: RangeInclusive<usize> = 1..=10;

/// Opaque, unique plate token assigned by the editor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PlateId(pub String);

impl From<&str> for PlateId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PlateId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PlateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One plate with real-world dimensions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlateSpec {
    /// Editor-assigned identity.
    pub id: PlateId,
    /// Width in centimeters.
    pub width_cm: f64,
    /// Height in centimeters.
    pub height_cm: f64,
}

impl PlateSpec {
    /// Create a plate without bounds checks. Layout tolerates any values.
    pub fn new(id: impl Into<PlateId>, width_cm: f64, height_cm: f64) -> Self {
        Self {
            id: id.into(),
            width_cm,
            height_cm,
        }
    }

    /// Check the editor bounds for a single plate.
    pub fn validate(&self) -> SplashResult<()> {
        if !self.width_cm.is_finite() || !PLATE_WIDTH_CM.contains(&self.width_cm) {
            return Err(SplashError::validation(format!(
                "plate '{}': width {} cm outside {}..={} cm",
                self.id,
                self.width_cm,
                PLATE_WIDTH_CM.start(),
                PLATE_WIDTH_CM.end()
            )));
        }
        if !self.height_cm.is_finite() || !PLATE_HEIGHT_CM.contains(&self.height_cm) {
            return Err(SplashError::validation(format!(
                "plate '{}': height {} cm outside {}..={} cm",
                self.id,
                self.height_cm,
                PLATE_HEIGHT_CM.start(),
                PLATE_HEIGHT_CM.end()
            )));
        }
        Ok(())
    }
}

/// Validated, ordered plate arrangement (left to right).
///
/// The inner sequence is shared and immutable; editors replace the whole set on change.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateSet {
    plates: Arc<[PlateSpec]>,
}

impl PlateSet {
    /// Validate bounds, count, and id uniqueness.
    pub fn new(plates: Vec<PlateSpec>) -> SplashResult<Self> {
        if !PLATE_COUNT.contains(&plates.len()) {
            return Err(SplashError::validation(format!(
                "plate count {} outside {}..={}",
                plates.len(),
                PLATE_COUNT.start(),
                PLATE_COUNT.end()
            )));
        }
        let mut seen = HashSet::with_capacity(plates.len());
        for p in &plates {
            p.validate()?;
            if !seen.insert(&p.id) {
                return Err(SplashError::validation(format!(
                    "duplicate plate id '{}'",
                    p.id
                )));
            }
        }
        Ok(Self {
            plates: plates.into(),
        })
    }

    /// Parse a JSON array of plates and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> SplashResult<Self> {
        let plates: Vec<PlateSpec> = serde_json::from_reader(r)
            .map_err(|e| SplashError::serde(format!("parse plates JSON: {e}")))?;
        Self::new(plates)
    }

    /// Parse a JSON plates file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> SplashResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SplashError::validation(format!("open plates JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Borrow the plates in placement order.
    pub fn as_slice(&self) -> &[PlateSpec] {
        &self.plates
    }

    /// Shared snapshot of the sequence.
    pub fn snapshot(&self) -> Arc<[PlateSpec]> {
        Arc::clone(&self.plates)
    }

    /// Number of plates.
    pub fn len(&self) -> usize {
        self.plates.len()
    }

    /// Always `false` for a validated set.
    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/plates.rs"]
mod tests;
