use std::sync::Arc;

use crate::assets::decode::MotifImage;
use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{SplashError, SplashResult};
use crate::layout::calculator::{LayoutResult, compute_layout};
use crate::render::compositor::PlateCompositor;
use crate::render::export::{export_png, try_export_png};
use crate::render::surface::Surface;
use crate::render::tiler::{MotifStrip, StripWindow, build_strip_window};
use crate::resolve::resolver::{ResolvedMotif, Tier};
use crate::scene::config::RenderConfig;
use crate::scene::plates::PlateSpec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StripKey {
    fingerprint: u64,
    full_width: u32,
    full_height: u32,
    window: StripWindow,
}

/// Stateful front end tying layout, tiling, compositing, and export together.
///
/// Inputs are replaced wholesale through the setters; any change drops the painted surface so the
/// next [`render`](Self::render) repaints from scratch onto a fresh surface. Only the part of the
/// motif strip that lands on the surface is rasterized; it is cached and rebuilt when the motif,
/// the strip size, or the visible window changes.
pub struct PlateSession {
    config: RenderConfig,
    plates: Arc<[PlateSpec]>,
    size: SurfaceSize,
    motif: ResolvedMotif,
    strip: Option<(StripKey, Arc<MotifStrip>)>,
    compositor: PlateCompositor,
    surface: Option<Surface>,
}

impl PlateSession {
    /// Create a session with no motif loaded.
    pub fn new(
        config: RenderConfig,
        plates: Arc<[PlateSpec]>,
        size: SurfaceSize,
    ) -> SplashResult<Self> {
        config.validate()?;
        let size = size.checked()?;
        Ok(Self {
            config,
            plates,
            size,
            motif: ResolvedMotif::unavailable(),
            strip: None,
            compositor: PlateCompositor::new(),
            surface: None,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Current plate snapshot.
    pub fn plates(&self) -> &[PlateSpec] {
        &self.plates
    }

    /// Current surface size.
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Replace the plate list.
    pub fn set_plates(&mut self, plates: Arc<[PlateSpec]>) {
        self.plates = plates;
        self.surface = None;
    }

    /// Change the surface size.
    pub fn resize(&mut self, size: SurfaceSize) -> SplashResult<()> {
        self.size = size.checked()?;
        self.surface = None;
        Ok(())
    }

    /// Swap in a newly resolved motif.
    pub fn set_motif(&mut self, motif: ResolvedMotif) {
        tracing::debug!(tier = %motif.tier, "motif replaced");
        self.motif = motif;
        self.surface = None;
    }

    /// Tier that supplied the current motif.
    pub fn status(&self) -> Tier {
        self.motif.tier
    }

    /// Notice for hosts when the preferred motif could not be used.
    pub fn advisory(&self) -> Option<&'static str> {
        self.motif.advisory()
    }

    /// Geometry for the current inputs, without painting.
    pub fn layout(&self) -> LayoutResult {
        compute_layout(&self.plates, self.size, &self.config.layout)
    }

    /// Paint a full pass and return the surface.
    #[tracing::instrument(level = "debug", skip(self), fields(w = self.size.width_px, h = self.size.height_px))]
    pub fn render(&mut self) -> SplashResult<&Surface> {
        let layout = self.layout();
        let strip = match self.motif.image.clone() {
            Some(image) => self.strip_for(&image, &layout)?,
            None => None,
        };

        let mut surface = Surface::new(self.size)?;
        self.compositor.paint(
            &mut surface,
            &layout,
            strip.as_deref(),
            &self.config.style,
        )?;
        Ok(self.surface.insert(surface))
    }

    /// Last painted surface, if inputs have not changed since.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Export the current picture as PNG, painting first if needed.
    pub fn export_png(&mut self) -> Option<Vec<u8>> {
        match self.painted() {
            Ok(surface) => export_png(surface),
            Err(e) => {
                tracing::warn!(error = %e, "render failed before export");
                None
            }
        }
    }

    /// Like [`export_png`](Self::export_png) but reports why export failed.
    pub fn try_export_png(&mut self) -> SplashResult<Vec<u8>> {
        try_export_png(self.painted()?)
    }

    fn painted(&mut self) -> SplashResult<&Surface> {
        if self.surface.is_none() {
            self.render()?;
        }
        self.surface
            .as_ref()
            .ok_or_else(|| SplashError::validation("painted surface missing"))
    }

    fn strip_for(
        &mut self,
        image: &MotifImage,
        layout: &LayoutResult,
    ) -> SplashResult<Option<Arc<MotifStrip>>> {
        let Some(first) = layout.plates.first() else {
            return Ok(None);
        };
        let full_width = layout.group_width().ceil().max(1.0) as u32;
        let full_height = layout.max_plate_height().ceil().max(1.0) as u32;
        let origin = (first.x, layout.baseline() - f64::from(full_height));
        let Some(window) = StripWindow::visible(
            full_width,
            full_height,
            origin,
            self.size.width_px,
            self.size.height_px,
        ) else {
            return Ok(None);
        };

        let key = StripKey {
            fingerprint: image.fingerprint(),
            full_width,
            full_height,
            window,
        };
        if let Some((cached, strip)) = &self.strip
            && *cached == key
        {
            return Ok(Some(Arc::clone(strip)));
        }

        tracing::debug!(
            full_width,
            full_height,
            width = window.width,
            height = window.height,
            "rebuilding motif strip"
        );
        let strip = Arc::new(build_strip_window(image, full_width, full_height, window)?);
        self.strip = Some((key, Arc::clone(&strip)));
        Ok(Some(strip))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/plate_session.rs"]
mod tests;
