use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = RenderConfig::from_reader(&b"{}"[..]).unwrap();
    assert_eq!(cfg, RenderConfig::default());
    assert_eq!(cfg.layout.gap_px, 12.0);
    assert_eq!(cfg.motif.timeout(), Duration::from_millis(6500));
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let json = br#"{
        "layout": {"gap_px": 4, "usable_area": {"mode": "fraction", "width": 0.9, "height": 0.8}},
        "motif": {"timeout_ms": 100}
    }"#;
    let cfg = RenderConfig::from_reader(&json[..]).unwrap();
    assert_eq!(cfg.layout.gap_px, 4.0);
    assert_eq!(cfg.layout.outer_padding_px, 24.0);
    assert_eq!(
        cfg.layout.usable_area,
        UsableArea::Fraction {
            width: 0.9,
            height: 0.8
        }
    );
    assert_eq!(cfg.motif.timeout_ms, 100);
    assert_eq!(cfg.style, StyleParams::default());
}

#[test]
fn rejects_non_positive_min_scale_and_bad_fraction() {
    let err = RenderConfig::from_reader(&br#"{"layout": {"min_scale": 0}}"#[..]).unwrap_err();
    assert!(err.to_string().contains("min_scale"));

    let err = RenderConfig::from_reader(
        &br#"{"layout": {"usable_area": {"mode": "fraction", "width": 1.5, "height": 0.5}}}"#[..],
    )
    .unwrap_err();
    assert!(err.to_string().contains("fractions"));
}

#[test]
fn unknown_mode_is_a_serde_error() {
    let err =
        RenderConfig::from_reader(&br#"{"layout": {"usable_area": {"mode": "grid"}}}"#[..])
            .unwrap_err();
    assert!(matches!(err, SplashError::Serde(_)));
}

#[test]
fn local_fallback_is_embedded_unless_overridden() {
    assert_eq!(RenderConfig::default().motif.local_fallback, None);
    let cfg = RenderConfig::from_reader(
        &br#"{"motif": {"local_fallback": "/srv/motifs/fallback.png"}}"#[..],
    )
    .unwrap();
    assert_eq!(
        cfg.motif.local_fallback.as_deref(),
        Some("/srv/motifs/fallback.png")
    );
}
