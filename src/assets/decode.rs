use anyhow::Context;

use crate::foundation::error::{SplashError, SplashResult};
use crate::foundation::math::Fnv1a64;

/// Decoded motif raster, straight-alpha RGBA8.
#[derive(Clone, Debug)]
pub struct MotifImage {
    pixels: image::RgbaImage,
    origin_clean: bool,
    fingerprint: u64,
}

impl MotifImage {
    /// Wrap already decoded pixels. Zero-sized images are rejected.
    pub fn from_rgba(pixels: image::RgbaImage, origin_clean: bool) -> SplashResult<Self> {
        let (w, h) = pixels.dimensions();
        if w == 0 || h == 0 {
            return Err(SplashError::image_load("decoded image has zero size"));
        }
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u32(w);
        hasher.write_u32(h);
        hasher.write_bytes(pixels.as_raw());
        Ok(Self {
            pixels,
            origin_clean,
            fingerprint: hasher.finish(),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Straight-alpha pixels.
    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }

    /// `false` when the pixels came from a foreign origin that did not grant read access.
    pub fn origin_clean(&self) -> bool {
        self.origin_clean
    }

    /// Content hash over dimensions and pixels; identifies the motif for strip caching.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// Decode encoded image bytes (any format the `image` crate recognizes).
pub fn decode_motif(bytes: &[u8], origin_clean: bool) -> SplashResult<MotifImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    MotifImage::from_rgba(dyn_img.to_rgba8(), origin_clean)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
