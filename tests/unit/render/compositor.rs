use super::*;
use crate::assets::decode::MotifImage;
use crate::foundation::core::SurfaceSize;
use crate::layout::calculator::compute_layout;
use crate::render::tiler::build_strip;
use crate::scene::config::LayoutParams;
use crate::scene::plates::PlateSpec;

fn px(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
    let w = surface.size().width_px;
    let i = ((y * w + x) as usize) * 4;
    let d = surface.rgba8_premul();
    [d[i], d[i + 1], d[i + 2], d[i + 3]]
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
}

fn layout() -> LayoutResult {
    compute_layout(
        &[
            PlateSpec::new("a", 100.0, 60.0),
            PlateSpec::new("b", 60.0, 40.0),
        ],
        SurfaceSize::new(320, 200),
        &LayoutParams::default(),
    )
}

fn center(r: PxRect) -> (u32, u32) {
    ((r.x + r.w * 0.5) as u32, (r.y + r.h * 0.5) as u32)
}

fn solid_strip(rgba: [u8; 4], origin_clean: bool, l: &LayoutResult) -> MotifStrip {
    let motif =
        MotifImage::from_rgba(image::RgbaImage::from_pixel(8, 8, image::Rgba(rgba)), origin_clean)
            .unwrap();
    build_strip(
        &motif,
        l.group_width().ceil() as u32,
        l.max_plate_height().ceil() as u32,
    )
    .unwrap()
}

#[test]
fn placeholder_fills_plates_without_motif() {
    let l = layout();
    let style = StyleParams::default();
    let mut surface = Surface::new(SurfaceSize::new(320, 200)).unwrap();
    PlateCompositor::new()
        .paint(&mut surface, &l, None, &style)
        .unwrap();

    for r in &l.plates {
        let (x, y) = center(*r);
        assert_eq!(px(&surface, x, y), style.placeholder);
    }
    assert!(surface.origin_clean());
}

#[test]
fn card_gradient_shows_between_plates_and_corner_is_clear() {
    let l = layout();
    let style = StyleParams::default();
    let mut surface = Surface::new(SurfaceSize::new(320, 200)).unwrap();
    PlateCompositor::new()
        .paint(&mut surface, &l, None, &style)
        .unwrap();

    let gap_x = ((l.plates[0].right() + l.plates[1].x) * 0.5) as u32;
    let y = (l.usable.bottom() - 2.0) as u32;
    let between = px(&surface, gap_x, y);
    assert_eq!(between[3], 255);
    assert_ne!(between, style.placeholder);

    assert_eq!(px(&surface, 0, 0), [0, 0, 0, 0]);
}

#[test]
fn motif_slice_fills_plates() {
    let l = layout();
    let green = [10, 200, 30, 255];
    let strip = solid_strip(green, true, &l);
    let mut surface = Surface::new(SurfaceSize::new(320, 200)).unwrap();
    PlateCompositor::new()
        .paint(&mut surface, &l, Some(&strip), &StyleParams::default())
        .unwrap();

    for r in &l.plates {
        let (x, y) = center(*r);
        assert!(close(px(&surface, x, y), green));
    }
    assert!(surface.origin_clean());
}

#[test]
fn foreign_motif_taints_surface() {
    let l = layout();
    let strip = solid_strip([10, 200, 30, 255], false, &l);
    let mut surface = Surface::new(SurfaceSize::new(320, 200)).unwrap();
    PlateCompositor::new()
        .paint(&mut surface, &l, Some(&strip), &StyleParams::default())
        .unwrap();
    assert!(!surface.origin_clean());
}

#[test]
fn repaint_is_idempotent_across_passes() {
    let l = layout();
    let strip = solid_strip([90, 60, 30, 255], true, &l);
    let style = StyleParams::default();
    let mut compositor = PlateCompositor::new();

    let mut a = Surface::new(SurfaceSize::new(320, 200)).unwrap();
    compositor.paint(&mut a, &l, Some(&strip), &style).unwrap();
    let mut b = Surface::new(SurfaceSize::new(320, 200)).unwrap();
    compositor.paint(&mut b, &l, None, &style).unwrap();
    compositor.paint(&mut b, &l, Some(&strip), &style).unwrap();

    assert_eq!(a.to_frame(), b.to_frame());
}

#[test]
fn rounded_path_clamps_radius() {
    let p = rounded_path(PxRect::new(0.0, 0.0, 10.0, 4.0), 50.0);
    let bbox = vello_cpu::kurbo::Shape::bounding_box(&p);
    assert!((bbox.width() - 10.0).abs() < 1e-6);
    assert!((bbox.height() - 4.0).abs() < 1e-6);
}

#[test]
fn transparent_motif_lets_card_show_through() {
    let l = layout();
    let strip = solid_strip([10, 200, 30, 0], true, &l);
    let mut surface = Surface::new(SurfaceSize::new(320, 200)).unwrap();
    PlateCompositor::new()
        .paint(&mut surface, &l, Some(&strip), &StyleParams::default())
        .unwrap();

    let (x, y) = center(l.plates[0]);
    let got = px(&surface, x, y);
    assert_eq!(got[3], 255);
    assert!(got[0] > 200 && got[1] > 200 && got[2] > 200, "{got:?}");
}

#[test]
fn pixmap_keeps_premultiplied_bytes() {
    let bytes = [10u8, 20, 30, 40, 255, 255, 255, 255];
    let pixmap = pixmap_from_premul_bytes(&bytes, 2, 1).unwrap();
    assert_eq!(pixmap.data_as_u8_slice(), &bytes);
    assert!(pixmap_from_premul_bytes(&bytes, 3, 1).is_err());
}
