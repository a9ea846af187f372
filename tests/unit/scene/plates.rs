use super::*;

#[test]
fn validates_bounds_inclusive() {
    assert!(PlateSpec::new("a", 20.0, 30.0).validate().is_ok());
    assert!(PlateSpec::new("a", 300.0, 128.0).validate().is_ok());
    assert!(PlateSpec::new("a", 19.9, 60.0).validate().is_err());
    assert!(PlateSpec::new("a", 60.0, 128.5).validate().is_err());
    assert!(PlateSpec::new("a", f64::NAN, 60.0).validate().is_err());
}

#[test]
fn set_rejects_duplicates_and_bad_counts() {
    let dup = vec![
        PlateSpec::new("a", 60.0, 60.0),
        PlateSpec::new("a", 80.0, 60.0),
    ];
    let err = PlateSet::new(dup).unwrap_err();
    assert!(err.to_string().contains("duplicate plate id"));

    assert!(PlateSet::new(vec![]).is_err());

    let eleven = (0..11)
        .map(|i| PlateSpec::new(format!("p{i}"), 40.0, 60.0))
        .collect();
    assert!(PlateSet::new(eleven).is_err());
}

#[test]
fn parses_json_in_order() {
    let json = br#"[
        {"id": "left", "width_cm": 120, "height_cm": 60},
        {"id": "right", "width_cm": 80.5, "height_cm": 45}
    ]"#;
    let set = PlateSet::from_reader(&json[..]).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.as_slice()[0].id, PlateId::from("left"));
    assert_eq!(set.as_slice()[1].width_cm, 80.5);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = PlateSet::from_reader(&b"[{\"id\": 1}]"[..]).unwrap_err();
    assert!(matches!(err, SplashError::Serde(_)));
}
