use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "storyweave_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn solid_asset_writes_png() {
    let root = temp_dir("materialize_solid");
    let asset = Asset::new(
        "sb/px.png",
        AssetSource::Solid {
            width: 3,
            height: 2,
            rgba: [10, 20, 30, 255],
        },
    )
    .unwrap();
    materialize(&root, &asset).unwrap();

    let img = image::open(root.join("sb/px.png")).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [10, 20, 30, 255]);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn missing_font_is_a_missing_resource() {
    let root = temp_dir("materialize_font");
    let asset = Asset::new(
        "sb/title.png",
        AssetSource::Text {
            text: "hello".to_string(),
            font: "fonts/Nope.ttf".to_string(),
            size_px: 24.0,
            rgba: [255, 255, 255, 255],
        },
    )
    .unwrap();
    let err = materialize(&root, &asset).unwrap_err();
    assert!(matches!(err, StoryError::MissingResource(_)));
    assert!(!root.join("sb/title.png").exists());
}

#[test]
fn escaping_and_empty_sizes() {
    assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    assert!(solid_pixels(0, 4, [0; 4]).is_err());
    assert!(destination(Path::new("/root"), "../evil.png").is_err());
}

#[test]
fn crop_keeps_only_opaque_region() {
    // 3x3 with a single opaque pixel at (1, 2).
    let mut data = vec![0u8; 3 * 3 * 4];
    let i = (2 * 3 + 1) * 4;
    data[i..i + 4].copy_from_slice(&[1, 2, 3, 255]);
    let (w, h, out) = crop_transparent(3, 3, data);
    assert_eq!((w, h), (1, 1));
    assert_eq!(out, vec![1, 2, 3, 255]);

    let (w, h, out) = crop_transparent(2, 2, vec![0; 16]);
    assert_eq!((w, h), (1, 1));
    assert_eq!(out.len(), 4);
}

#[test]
fn unpremultiply_restores_color() {
    let mut px = vec![64u8, 0, 128, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![128, 0, 255, 128]);
}
