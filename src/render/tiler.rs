use image::imageops::{self, FilterType};

use crate::assets::decode::MotifImage;
use crate::foundation::error::{SplashError, SplashResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// One tile of the mirrored strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilePlacement {
    /// Signed distance from the center tile, in tiles.
    pub index: i64,
    /// Left edge in strip pixels; may be negative for the leftmost tile.
    pub x: i64,
    /// Whether the tile is flipped horizontally.
    pub mirrored: bool,
}

/// Placements covering `[0, strip_width)` with tiles of `tile_width`.
///
/// The center tile (index 0) is unflipped and centered; tiles are then added alternately on the
/// left and right, each mirrored relative to its neighbor, until both edges are covered. The
/// result is sorted left to right.
pub fn tile_placements(strip_width: u32, tile_width: u32) -> Vec<TilePlacement> {
    let s = i64::from(strip_width);
    let t = i64::from(tile_width.max(1));
    let center_x = (s - t).div_euclid(2);
    let at = |index: i64| TilePlacement {
        index,
        x: center_x + index * t,
        mirrored: index.rem_euclid(2) == 1,
    };

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut left_edge = center_x;
    let mut right_edge = center_x + t;
    let mut step = 1i64;
    while left_edge > 0 || right_edge < s {
        if left_edge > 0 {
            left.push(at(-step));
            left_edge -= t;
        }
        if right_edge < s {
            right.push(at(step));
            right_edge += t;
        }
        step += 1;
    }

    left.reverse();
    left.push(at(0));
    left.extend(right);
    left
}

/// Tile width preserving the source aspect ratio at `strip_height`.
pub fn tile_width_for(src_width: u32, src_height: u32, strip_height: u32) -> u32 {
    let w = (f64::from(src_width) * f64::from(strip_height) / f64::from(src_height.max(1))).round();
    (w as u32).max(1)
}

/// Rectangle of a strip that is actually rasterized, in strip pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StripWindow {
    /// Left edge inside the full strip.
    pub x: u32,
    /// Top edge inside the full strip.
    pub y: u32,
    /// Window width.
    pub width: u32,
    /// Window height.
    pub height: u32,
}

impl StripWindow {
    /// The whole `width`×`height` strip.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Part of a `full_width`×`full_height` strip whose top-left corner sits at `origin` (surface
    /// pixels) that lands inside a `surface_width`×`surface_height` surface. `None` when nothing
    /// of the strip is visible.
    pub fn visible(
        full_width: u32,
        full_height: u32,
        origin: (f64, f64),
        surface_width: u32,
        surface_height: u32,
    ) -> Option<Self> {
        let (x, width) = visible_span(full_width, origin.0, surface_width)?;
        let (y, height) = visible_span(full_height, origin.1, surface_height)?;
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    fn fits(self, full_width: u32, full_height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(full_width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(full_height)
    }
}

fn visible_span(full: u32, origin: f64, surface: u32) -> Option<(u32, u32)> {
    if !origin.is_finite() {
        return None;
    }
    let full = f64::from(full);
    let start = (-origin).max(0.0).floor().min(full);
    let end = (f64::from(surface) - origin).ceil().min(full);
    if end <= start {
        return None;
    }
    let len = (end - start).min(f64::from(u16::MAX));
    Some((start as u32, len as u32))
}

/// Offscreen mirrored-tile raster. Only a window of the full strip is stored.
#[derive(Clone, Debug)]
pub struct MotifStrip {
    full_width: u32,
    full_height: u32,
    window: StripWindow,
    rgba8_premul: Vec<u8>,
    origin_clean: bool,
}

impl MotifStrip {
    /// Stored width in pixels.
    pub fn width(&self) -> u32 {
        self.window.width
    }

    /// Stored height in pixels.
    pub fn height(&self) -> u32 {
        self.window.height
    }

    /// Width of the whole strip the tiles are laid out over.
    pub fn full_width(&self) -> u32 {
        self.full_width
    }

    /// Height of the whole strip; also the tile height.
    pub fn full_height(&self) -> u32 {
        self.full_height
    }

    /// Where the stored pixels sit inside the full strip.
    pub fn window(&self) -> StripWindow {
        self.window
    }

    /// Premultiplied RGBA8 pixels of the window, row-major.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Inherited from the source motif.
    pub fn origin_clean(&self) -> bool {
        self.origin_clean
    }
}

/// Render `motif` into a `width`×`height` strip of mirrored tiles.
pub fn build_strip(motif: &MotifImage, width: u32, height: u32) -> SplashResult<MotifStrip> {
    build_strip_window(motif, width, height, StripWindow::full(width, height))
}

/// Render only `window` of a `full_width`×`full_height` strip of mirrored tiles.
///
/// Memory is bounded by the window and the source image, never by the full strip size.
#[tracing::instrument(level = "debug", skip(motif), fields(src_w = motif.width(), src_h = motif.height()))]
pub fn build_strip_window(
    motif: &MotifImage,
    full_width: u32,
    full_height: u32,
    window: StripWindow,
) -> SplashResult<MotifStrip> {
    if full_width == 0 || full_height == 0 {
        return Err(SplashError::validation("strip size must be non-zero"));
    }
    if window.width == 0 || window.height == 0 || !window.fits(full_width, full_height) {
        return Err(SplashError::validation("strip window must be non-empty and inside the strip"));
    }
    if window.width > u32::from(u16::MAX) || window.height > u32::from(u16::MAX) {
        return Err(SplashError::validation("strip window exceeds u16"));
    }

    let tile_w = tile_width_for(motif.width(), motif.height(), full_height);
    let t = i64::from(tile_w);
    let center_x = (i64::from(full_width) - t).div_euclid(2);
    let sampler = TileSampler::new(motif, tile_w, full_height);

    let mut strip = image::RgbaImage::new(window.width, window.height);
    for (i, j, px) in strip.enumerate_pixels_mut() {
        let rel = i64::from(window.x) + i64::from(i) - center_x;
        let mut u = rel.rem_euclid(t);
        if rel.div_euclid(t).rem_euclid(2) == 1 {
            u = t - 1 - u;
        }
        *px = sampler.sample(u as u32, window.y + j);
    }

    let mut rgba8_premul = strip.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Ok(MotifStrip {
        full_width,
        full_height,
        window,
        rgba8_premul,
        origin_clean: motif.origin_clean(),
    })
}

/// Pixel source for one unflipped tile of `tile_w`×`tile_h`.
enum TileSampler<'a> {
    /// Tile no taller than the source: resized once, bounded by the source size.
    Resized(image::RgbaImage),
    /// Enlarged tile: sampled bilinearly from the source on demand.
    Scaled {
        src: &'a image::RgbaImage,
        sx: f64,
        sy: f64,
    },
}

impl<'a> TileSampler<'a> {
    fn new(motif: &'a MotifImage, tile_w: u32, tile_h: u32) -> Self {
        let src = motif.pixels();
        if tile_h <= src.height() && tile_w <= src.width().saturating_mul(2) {
            Self::Resized(imageops::resize(src, tile_w, tile_h, FilterType::Triangle))
        } else {
            Self::Scaled {
                src,
                sx: f64::from(src.width()) / f64::from(tile_w),
                sy: f64::from(src.height()) / f64::from(tile_h),
            }
        }
    }

    fn sample(&self, u: u32, v: u32) -> image::Rgba<u8> {
        match self {
            Self::Resized(tile) => *tile.get_pixel(u, v),
            Self::Scaled { src, sx, sy } => bilinear(
                src,
                (f64::from(u) + 0.5) * sx - 0.5,
                (f64::from(v) + 0.5) * sy - 0.5,
            ),
        }
    }
}

fn bilinear(src: &image::RgbaImage, fx: f64, fy: f64) -> image::Rgba<u8> {
    let fx = fx.clamp(0.0, f64::from(src.width() - 1));
    let fy = fy.clamp(0.0, f64::from(src.height() - 1));
    let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let (tx, ty) = (fx - f64::from(x0), fy - f64::from(y0));

    let [a, b, c, d] = [
        src.get_pixel(x0, y0).0,
        src.get_pixel(x1, y0).0,
        src.get_pixel(x0, y1).0,
        src.get_pixel(x1, y1).0,
    ];
    let mut out = [0u8; 4];
    for (k, o) in out.iter_mut().enumerate() {
        let top = f64::from(a[k]) + (f64::from(b[k]) - f64::from(a[k])) * tx;
        let bottom = f64::from(c[k]) + (f64::from(d[k]) - f64::from(c[k])) * tx;
        *o = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    image::Rgba(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/tiler.rs"]
mod tests;
