use std::sync::Arc;

use kurbo::Shape as _;

use crate::foundation::core::{PxRect, Rgba8Premul};
use crate::foundation::error::{SplashError, SplashResult};
use crate::layout::calculator::LayoutResult;
use crate::render::surface::Surface;
use crate::render::tiler::MotifStrip;
use crate::scene::config::StyleParams;

const SHADOW_STEPS: u32 = 6;
const PATH_TOLERANCE: f64 = 0.1;

/// Paints card, plates, and motif slices onto a [`Surface`].
///
/// Holds a reusable `vello_cpu` render context; every call repaints the whole surface.
#[derive(Default)]
pub struct PlateCompositor {
    ctx: Option<vello_cpu::RenderContext>,
}

impl PlateCompositor {
    /// Create a compositor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint one full pass.
    ///
    /// With a strip, every plate shows the slice of the strip under it: the horizontal offset is
    /// the plate's distance from the first plate's left edge and the window is bottom-aligned.
    /// Without a strip, plates get a flat placeholder fill.
    #[tracing::instrument(level = "debug", skip_all, fields(plates = layout.plates.len(), motif = strip.is_some()))]
    pub fn paint(
        &mut self,
        surface: &mut Surface,
        layout: &LayoutResult,
        strip: Option<&MotifStrip>,
        style: &StyleParams,
    ) -> SplashResult<()> {
        let strip_paint = strip.map(strip_to_image).transpose()?;
        let width = surface.pixmap.width();
        let height = surface.pixmap.height();

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();

        let background = color(style.background);
        if style.background[3] > 0 {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(background);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        draw_card(&mut ctx, layout.card, style)?;

        let origin_x = layout.plates.first().map_or(0.0, |p| p.x);
        for rect in &layout.plates {
            if rect.w <= 0.0 || rect.h <= 0.0 {
                continue;
            }
            let path = rounded_path(
                PxRect::new(0.0, 0.0, rect.w, rect.h),
                style.plate_radius_px,
            );
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((rect.x, rect.y)));
            match (&strip_paint, strip) {
                (Some(img), Some(strip)) => {
                    let window = strip.window();
                    let dx = rect.x - origin_x - f64::from(window.x);
                    let dy = f64::from(strip.full_height()) - rect.h - f64::from(window.y);
                    ctx.set_paint(img.clone());
                    ctx.set_paint_transform(vello_cpu::kurbo::Affine::translate((-dx, -dy)));
                    ctx.fill_path(&path);
                    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                }
                _ => {
                    ctx.set_paint(color(style.placeholder));
                    ctx.fill_path(&path);
                }
            }
            if style.border_width_px > 0.0 {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(style.border_width_px));
                ctx.set_paint(color(style.border));
                ctx.stroke_path(&path);
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);
        self.ctx = Some(ctx);

        if strip.is_some_and(|s| !s.origin_clean()) {
            surface.taint();
        }
        Ok(())
    }
}

fn draw_card(
    ctx: &mut vello_cpu::RenderContext,
    card: PxRect,
    style: &StyleParams,
) -> SplashResult<()> {
    if card.w <= 0.0 || card.h <= 0.0 {
        return Ok(());
    }

    // Stacked translucent layers, widest and faintest first.
    let [r, g, b, a] = style.shadow;
    let step_alpha = (f64::from(a) / f64::from(SHADOW_STEPS)).round() as u8;
    if step_alpha > 0 {
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, step_alpha));
        for i in (1..=SHADOW_STEPS).rev() {
            let spread = style.shadow_blur_px * f64::from(i) / f64::from(SHADOW_STEPS);
            let rect = PxRect::new(
                card.x - spread * 0.5,
                card.y + style.shadow_offset_px - spread * 0.5,
                card.w + spread,
                card.h + spread,
            );
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.fill_path(&rounded_path(rect, style.card_radius_px + spread * 0.5));
        }
    }

    let gw = card.w.ceil().max(1.0) as u32;
    let gh = card.h.ceil().max(1.0) as u32;
    let gradient = vertical_gradient(style.card_top, style.card_bottom, gw, gh)?;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((card.x, card.y)));
    ctx.set_paint(gradient);
    ctx.fill_path(&rounded_path(
        PxRect::new(0.0, 0.0, card.w, card.h),
        style.card_radius_px,
    ));
    Ok(())
}

fn rounded_path(rect: PxRect, radius: f64) -> vello_cpu::kurbo::BezPath {
    let r = radius.min(rect.w * 0.5).min(rect.h * 0.5).max(0.0);
    let rr = kurbo::RoundedRect::new(rect.x, rect.y, rect.right(), rect.bottom(), r);
    let mut p = vello_cpu::kurbo::BezPath::new();
    for el in rr.path_elements(PATH_TOLERANCE) {
        p.push(el);
    }
    p
}

fn color(rgba: [u8; 4]) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = rgba;
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn vertical_gradient(
    top: [u8; 4],
    bottom: [u8; 4],
    w: u32,
    h: u32,
) -> SplashResult<vello_cpu::Image> {
    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    let h1 = (h.max(1) - 1) as f32;
    for y in 0..h {
        let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
        let lerp = |a: u8, b: u8| -> u8 {
            let af = a as f32;
            let bf = b as f32;
            (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
        };
        let c = Rgba8Premul::from_straight_rgba(
            lerp(top[0], bottom[0]),
            lerp(top[1], bottom[1]),
            lerp(top[2], bottom[2]),
            lerp(top[3], bottom[3]),
        )
        .to_array();
        let row = (y as usize) * (w as usize) * 4;
        for px in bytes[row..row + (w as usize) * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }
    rgba_premul_to_image(&bytes, w, h)
}

fn strip_to_image(strip: &MotifStrip) -> SplashResult<vello_cpu::Image> {
    rgba_premul_to_image(strip.rgba8_premul(), strip.width(), strip.height())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SplashResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SplashError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SplashError::validation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(SplashError::validation("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(bytes.len() / 4);
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn rgba_premul_to_image(bytes: &[u8], width: u32, height: u32) -> SplashResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
