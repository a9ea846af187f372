use crate::foundation::core::{PxRect, SurfaceSize};
use crate::scene::config::{LayoutParams, UsableArea};
use crate::scene::plates::PlateSpec;

/// Pixel geometry for one render pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LayoutResult {
    /// Shared horizontal and vertical scale in px per cm. Always `> 0`.
    pub scale: f64,
    /// Rounded background region behind all plates.
    pub card: PxRect,
    /// Area inside the card that plates are fitted into.
    pub usable: PxRect,
    /// Plate rectangles, 1:1 with the input order.
    pub plates: Vec<PxRect>,
    /// `true` when the input had no measurable extent and `scale` is the floor.
    pub degenerate: bool,
}

impl LayoutResult {
    /// Horizontal span from the first plate's left edge to the last plate's right edge.
    pub fn group_width(&self) -> f64 {
        match (self.plates.first(), self.plates.last()) {
            (Some(first), Some(last)) => last.right() - first.x,
            _ => 0.0,
        }
    }

    /// Height of the tallest plate.
    pub fn max_plate_height(&self) -> f64 {
        self.plates.iter().map(|p| p.h).fold(0.0, f64::max)
    }

    /// Shared bottom edge of all plates.
    pub fn baseline(&self) -> f64 {
        self.usable.bottom()
    }
}

/// Scale candidates before the floor is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFit {
    /// Scale that makes the plates plus gaps fill the usable width.
    pub by_width: f64,
    /// Scale that makes the tallest plate fill the usable height.
    pub by_height: f64,
}

impl ScaleFit {
    /// The tighter axis wins.
    pub fn binding(self) -> f64 {
        self.by_width.min(self.by_height)
    }
}

/// Card rectangle for a surface under the configured policy.
pub fn card_rect(surface: SurfaceSize, params: &LayoutParams) -> PxRect {
    let sw = f64::from(surface.width_px);
    let sh = f64::from(surface.height_px);
    match params.usable_area {
        UsableArea::Padding => PxRect::new(0.0, 0.0, sw, sh).inset(params.outer_padding_px),
        UsableArea::Fraction { width, height } => {
            let w = sw * width.clamp(0.0, 1.0);
            let h = sh * height.clamp(0.0, 1.0);
            PxRect::new((sw - w) * 0.5, (sh - h) * 0.5, w, h)
        }
    }
}

/// Width and height scale candidates for `plates` inside `usable`.
pub fn scale_fit(plates: &[PlateSpec], usable: PxRect, gap_px: f64) -> ScaleFit {
    let total_width_cm = plates
        .iter()
        .map(|p| sanitize_cm(p.width_cm))
        .sum::<f64>()
        .max(1.0);
    let max_height_cm = plates
        .iter()
        .map(|p| sanitize_cm(p.height_cm))
        .fold(0.0, f64::max)
        .max(1.0);
    ScaleFit {
        by_width: (usable.w - total_gap_px(plates.len(), gap_px)) / total_width_cm,
        by_height: usable.h / max_height_cm,
    }
}

/// Map plate dimensions onto pixel space under one shared scale.
///
/// Plates are centered horizontally as a group and bottom-aligned to the usable region. Inputs
/// outside editor bounds are tolerated: negative or non-finite dimensions count as zero, and an
/// input with no measurable width or height falls back to `params.min_scale`.
#[tracing::instrument(level = "debug", skip(plates, params), fields(plates = plates.len()))]
pub fn compute_layout(
    plates: &[PlateSpec],
    surface: SurfaceSize,
    params: &LayoutParams,
) -> LayoutResult {
    let card = card_rect(surface, params);
    let usable = card.inset(params.card_padding_px);
    let min_scale = params.min_scale.max(f64::MIN_POSITIVE);

    let degenerate = plates.is_empty()
        || plates.iter().all(|p| sanitize_cm(p.width_cm) == 0.0)
        || plates.iter().all(|p| sanitize_cm(p.height_cm) == 0.0);

    let scale = if degenerate {
        tracing::debug!("degenerate layout input, using minimum scale {min_scale}");
        min_scale
    } else {
        let fit = scale_fit(plates, usable, params.gap_px);
        let s = fit.binding();
        if s.is_finite() { s.max(min_scale) } else { min_scale }
    };

    let widths = plates
        .iter()
        .map(|p| sanitize_cm(p.width_cm) * scale)
        .collect::<Vec<_>>();
    let group_w = widths.iter().sum::<f64>() + total_gap_px(plates.len(), params.gap_px);
    let baseline = usable.bottom();

    let mut x = usable.x + (usable.w - group_w) * 0.5;
    let mut rects = Vec::with_capacity(plates.len());
    for (p, &w) in plates.iter().zip(&widths) {
        let h = sanitize_cm(p.height_cm) * scale;
        rects.push(PxRect::new(x, baseline - h, w, h));
        x += w + params.gap_px;
    }

    LayoutResult {
        scale,
        card,
        usable,
        plates: rects,
        degenerate,
    }
}

fn total_gap_px(count: usize, gap_px: f64) -> f64 {
    count.saturating_sub(1) as f64 * gap_px
}

fn sanitize_cm(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/calculator.rs"]
mod tests;
