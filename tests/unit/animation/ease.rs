use super::*;

#[test]
fn codes_follow_the_legacy_table() {
    assert_eq!(Easing::None.code(), 0);
    assert_eq!(Easing::Out.code(), 1);
    assert_eq!(Easing::In.code(), 2);
    assert_eq!(Easing::InOutSine.code(), 17);
    assert_eq!(Easing::OutElasticQuarter.code(), 27);
    assert_eq!(Easing::InOutBounce.code(), 34);
    for (i, e) in Easing::ALL.iter().enumerate() {
        assert_eq!(Easing::from_code(i as u8), Some(*e));
    }
    assert_eq!(Easing::from_code(35), None);
}

#[test]
fn every_curve_hits_its_endpoints() {
    for e in Easing::ALL {
        assert!(e.apply(0.0).abs() < 1e-9, "{e:?} at 0");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-9, "{e:?} at 1");
    }
}

#[test]
fn in_and_out_mirror_each_other() {
    let t = 0.3;
    assert!((Easing::InCubic.apply(t) - (1.0 - Easing::OutCubic.apply(1.0 - t))).abs() < 1e-12);
    assert!(Easing::InQuad.apply(0.5) < 0.5);
    assert!(Easing::OutQuad.apply(0.5) > 0.5);
    assert!((Easing::InOutQuad.apply(0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn progress_is_clamped() {
    assert_eq!(Easing::None.apply(-1.0), 0.0);
    assert_eq!(Easing::None.apply(2.0), 1.0);
}
