//! splashback lays out a row of backsplash plates and carves each one from a single continuous
//! motif image.
//!
//! The pipeline, leaf-first:
//!
//! - [`MotifResolver`] picks the motif through a user → remote → local fallback chain with a
//!   per-tier timeout and reports the [`Tier`] that succeeded
//! - [`compute_layout`] maps plate dimensions in centimeters onto pixels under one shared scale
//! - [`build_strip`] extends the motif across the plate group by mirrored tiling
//! - [`PlateCompositor`] paints the card, the rounded plates, and their strip slices
//! - [`export_png`] reads the surface back as PNG unless a foreign motif tainted it
//!
//! [`PlateSession`] owns the mutable state and runs the whole pass.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod resolve;
pub(crate) mod scene;
pub(crate) mod session;

pub use crate::foundation::core::{PxRect, Rgba8Premul, SurfaceSize};
pub use crate::foundation::error::{SplashError, SplashResult};

pub use crate::assets::decode::{MotifImage, decode_motif};
pub use crate::assets::fetch::{CrossOrigin, FetchRequest, Fetched, ImageFetcher, StdFetcher};
pub use crate::assets::locator::MotifLocator;
pub use crate::layout::calculator::{LayoutResult, ScaleFit, card_rect, compute_layout, scale_fit};
pub use crate::render::compositor::PlateCompositor;
pub use crate::render::export::{export_png, try_export_png};
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::render::tiler::{
    MotifStrip, StripWindow, TilePlacement, build_strip, build_strip_window, tile_placements,
    tile_width_for,
};
pub use crate::resolve::resolver::{
    MotifResolver, ResolveHandle, ResolvedMotif, ResolverOpts, Tier,
};
pub use crate::scene::config::{LayoutParams, MotifParams, RenderConfig, StyleParams, UsableArea};
pub use crate::scene::plates::{
    PLATE_COUNT, PLATE_HEIGHT_CM, PLATE_WIDTH_CM, PlateId, PlateSet, PlateSpec,
};
pub use crate::session::plate_session::PlateSession;
