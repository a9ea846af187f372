use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{SplashError, SplashResult};

/// A read-back of a surface as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Drawing surface owned by one render pass.
///
/// Like a browser canvas, the surface stops being origin-clean as soon as foreign pixels without
/// read permission are drawn onto it, and it never becomes clean again.
pub struct Surface {
    pub(crate) pixmap: vello_cpu::Pixmap,
    origin_clean: bool,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(size: SurfaceSize) -> SplashResult<Self> {
        let size = size.checked()?;
        let w: u16 = size
            .width_px
            .try_into()
            .map_err(|_| SplashError::validation("surface width exceeds u16"))?;
        let h: u16 = size
            .height_px
            .try_into()
            .map_err(|_| SplashError::validation("surface height exceeds u16"))?;
        Ok(Self {
            pixmap: vello_cpu::Pixmap::new(w, h),
            origin_clean: true,
        })
    }

    /// Surface size.
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(u32::from(self.pixmap.width()), u32::from(self.pixmap.height()))
    }

    /// `false` once a non-readable motif has been drawn.
    pub fn origin_clean(&self) -> bool {
        self.origin_clean
    }

    pub(crate) fn taint(&mut self) {
        self.origin_clean = false;
    }

    /// Premultiplied pixel bytes, row-major.
    pub fn rgba8_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Copy the pixels into a [`FrameRGBA`].
    pub fn to_frame(&self) -> FrameRGBA {
        let size = self.size();
        FrameRGBA {
            width: size.width_px,
            height: size.height_px,
            data: self.rgba8_premul().to_vec(),
            premultiplied: true,
        }
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("size", &self.size())
            .field("origin_clean", &self.origin_clean)
            .finish_non_exhaustive()
    }
}
