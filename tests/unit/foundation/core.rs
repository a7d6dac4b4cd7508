use super::*;

#[test]
fn layers_visit_in_declared_order() {
    let mut shuffled = vec![
        Layer::Overlay,
        Layer::Pass,
        Layer::Background,
        Layer::Foreground,
        Layer::Fail,
    ];
    shuffled.sort();
    assert_eq!(shuffled, Layer::ALL.to_vec());
    assert_eq!(Layer::Foreground.index(), 3);
    assert_eq!(Layer::Background.to_string(), "Background");
}

#[test]
fn rgb_hex_parsing() {
    assert_eq!(Rgb::from_hex("#ff8000").unwrap(), Rgb::new(255.0, 128.0, 0.0));
    assert_eq!(Rgb::from_hex("00ff00").unwrap(), Rgb::new(0.0, 255.0, 0.0));
    assert!(Rgb::from_hex("#fff").is_err());
    assert!(Rgb::from_hex("#gg0000").is_err());
}

#[test]
fn rgb_normalized_round_trip() {
    let c = Rgb::from_normalized(1.0, 0.5, 0.0);
    assert_eq!(c, Rgb::new(255.0, 127.5, 0.0));
    let [r, g, b] = c.to_normalized();
    assert!((r - 1.0).abs() < 1e-12);
    assert!((g - 0.5).abs() < 1e-12);
    assert!(b.abs() < 1e-12);
}

#[test]
fn rgb_lerp_midpoint() {
    let c = Rgb::new(0.0, 100.0, 200.0).lerp(Rgb::new(100.0, 100.0, 0.0), 0.5);
    assert_eq!(c, Rgb::new(50.0, 100.0, 100.0));
}
