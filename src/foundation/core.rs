use crate::foundation::error::{SplashError, SplashResult};

/// Drawing-surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width_px: u32,
    /// Height in pixels.
    pub height_px: u32,
}

impl SurfaceSize {
    /// Largest edge a CPU surface can have.
    pub const MAX_EDGE_PX: u32 = u16::MAX as u32;

    /// Create a size, without validation.
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Validate that the size can back a raster surface.
    pub fn checked(self) -> SplashResult<Self> {
        if self.width_px == 0 || self.height_px == 0 {
            return Err(SplashError::validation("surface size must be non-zero"));
        }
        if self.width_px > Self::MAX_EDGE_PX || self.height_px > Self::MAX_EDGE_PX {
            return Err(SplashError::validation(format!(
                "surface size {}x{} exceeds {} px per edge",
                self.width_px,
                self.height_px,
                Self::MAX_EDGE_PX
            )));
        }
        Ok(self)
    }
}

/// Axis-aligned rectangle in pixel space, `{x, y, w, h}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PxRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, never negative.
    pub w: f64,
    /// Height, never negative.
    pub h: f64,
}

impl PxRect {
    /// Create a rectangle, clamping negative extents to zero.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w: w.max(0.0),
            h: h.max(0.0),
        }
    }

    /// Right edge.
    pub fn right(self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge.
    pub fn bottom(self) -> f64 {
        self.y + self.h
    }

    /// Shrink by `d` on every side. Extents clamp at zero, keeping the center.
    pub fn inset(self, d: f64) -> Self {
        let w = (self.w - 2.0 * d).max(0.0);
        let h = (self.h - 2.0 * d).max(0.0);
        Self {
            x: self.x + (self.w - w) * 0.5,
            y: self.y + (self.h - h) * 0.5,
            w,
            h,
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Pixel bytes in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
