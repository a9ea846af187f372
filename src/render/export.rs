use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::error::{SplashError, SplashResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::surface::Surface;

/// Encode the surface as PNG, reporting why when it cannot.
pub fn try_export_png(surface: &Surface) -> SplashResult<Vec<u8>> {
    if !surface.origin_clean() {
        return Err(SplashError::ExportUnavailable);
    }
    let frame = surface.to_frame();
    let mut data = frame.data;
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| SplashError::validation("surface byte length mismatch"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Encode the surface as PNG, or `None` when it cannot be read back.
///
/// A tainted surface is an expected outcome, not a failure; the reason is only logged.
pub fn export_png(surface: &Surface) -> Option<Vec<u8>> {
    match try_export_png(surface) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(error = %e, "raster export unavailable");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
