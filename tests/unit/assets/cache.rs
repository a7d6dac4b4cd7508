use super::*;

const SETTLE: Duration = Duration::from_secs(10);

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

fn quick() -> AssetCacheOpts {
    AssetCacheOpts {
        debounce: Duration::from_millis(20),
    }
}

fn solid(path: &str, rgba: [u8; 4]) -> Asset {
    Asset::new(
        path,
        AssetSource::Solid {
            width: 2,
            height: 2,
            rgba,
        },
    )
    .unwrap()
}

fn pixel(root: &Path, rel: &str) -> [u8; 4] {
    image::open(root.join(rel)).unwrap().to_rgba8().get_pixel(0, 0).0
}

#[test]
fn unreferenced_asset_is_deleted_and_evicted() {
    let root = temp_dir("cache_evict");
    let cache = AssetCache::new(&root, quick()).unwrap();
    let a = solid("a.png", [255, 0, 0, 255]);

    cache.add(&a);
    assert!(cache.wait_settled(SETTLE));
    assert!(root.join("a.png").is_file());
    let snap = cache.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].reference_count, 1);
    assert!(snap[0].is_materialized());

    cache.apply(std::iter::empty());
    assert!(cache.wait_settled(SETTLE));
    assert!(!root.join("a.png").exists());
    assert!(cache.snapshot().is_empty());

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn matching_path_and_hash_bumps_the_count() {
    let root = temp_dir("cache_bump");
    let cache = AssetCache::new(&root, quick()).unwrap();
    let a = solid("a.png", [1, 2, 3, 255]);

    cache.add_range([&a, &a]);
    cache.remove(&a);
    assert!(cache.wait_settled(SETTLE));
    let snap = cache.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].reference_count, 1);
    assert!(root.join("a.png").is_file());

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn same_content_at_new_path_is_renamed() {
    let root = temp_dir("cache_rename");
    let cache = AssetCache::new(&root, quick()).unwrap();

    cache.apply([&solid("old/a.png", [9, 9, 9, 255])]);
    assert!(cache.wait_settled(SETTLE));
    assert!(root.join("old/a.png").is_file());

    cache.apply([&solid("new/b.png", [9, 9, 9, 255])]);
    assert!(cache.wait_settled(SETTLE));
    assert!(!root.join("old/a.png").exists());
    assert_eq!(pixel(&root, "new/b.png"), [9, 9, 9, 255]);
    let snap = cache.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].path, "new/b.png");
    assert_eq!(snap[0].reference_count, 1);

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn new_content_at_same_path_is_regenerated() {
    let root = temp_dir("cache_regen");
    let cache = AssetCache::new(&root, quick()).unwrap();

    cache.apply([&solid("a.png", [255, 0, 0, 255])]);
    assert!(cache.wait_settled(SETTLE));
    assert_eq!(pixel(&root, "a.png"), [255, 0, 0, 255]);

    cache.apply([&solid("a.png", [0, 0, 255, 255])]);
    assert!(cache.wait_settled(SETTLE));
    assert_eq!(pixel(&root, "a.png"), [0, 0, 255, 255]);
    assert_eq!(cache.snapshot().len(), 1);

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn swapped_paths_keep_their_content() {
    let root = temp_dir("cache_swap");
    let cache = AssetCache::new(&root, quick()).unwrap();
    let red = [255, 0, 0, 255];
    let blue = [0, 0, 255, 255];

    cache.apply([&solid("x.png", red), &solid("y.png", blue)]);
    assert!(cache.wait_settled(SETTLE));

    cache.apply([&solid("y.png", red), &solid("x.png", blue)]);
    assert!(cache.wait_settled(SETTLE));
    assert_eq!(pixel(&root, "y.png"), red);
    assert_eq!(pixel(&root, "x.png"), blue);
    assert!(!root.join("x.png.moving").exists());

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn missing_file_is_regenerated_on_next_pass() {
    let root = temp_dir("cache_missing");
    let cache = AssetCache::new(&root, quick()).unwrap();
    let a = solid("a.png", [5, 5, 5, 255]);

    cache.apply([&a]);
    assert!(cache.wait_settled(SETTLE));
    std::fs::remove_file(root.join("a.png")).unwrap();

    cache.apply([&a]);
    assert!(cache.wait_settled(SETTLE));
    assert!(root.join("a.png").is_file());

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn missing_font_is_skipped_without_blocking_others() {
    let root = temp_dir("cache_font");
    let cache = AssetCache::new(&root, quick()).unwrap();
    let text = Asset::new(
        "title.png",
        AssetSource::Text {
            text: "hi".to_string(),
            font: "fonts/Missing.ttf".to_string(),
            size_px: 20.0,
            rgba: [255, 255, 255, 255],
        },
    )
    .unwrap();

    cache.apply([&text, &solid("dot.png", [1, 1, 1, 255])]);
    assert!(cache.wait_settled(SETTLE));
    assert!(!root.join("title.png").exists());
    assert!(root.join("dot.png").is_file());
    let snap = cache.snapshot();
    assert_eq!(snap.len(), 2);
    assert!(!snap.iter().find(|e| e.path == "title.png").unwrap().is_materialized());

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn bursts_coalesce_into_one_pass() {
    let root = temp_dir("cache_burst");
    let cache = AssetCache::new(
        &root,
        AssetCacheOpts {
            debounce: Duration::from_millis(300),
        },
    )
    .unwrap();

    for i in 0..10u8 {
        cache.apply([&solid("a.png", [i, 0, 0, 255])]);
    }
    assert!(cache.wait_settled(SETTLE));
    assert_eq!(cache.passes_run(), 1);
    assert_eq!(pixel(&root, "a.png"), [9, 0, 0, 255]);

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn materialize_now_writes_synchronously() {
    let root = temp_dir("cache_now");
    let cache = AssetCache::new(
        &root,
        AssetCacheOpts {
            debounce: Duration::from_secs(60),
        },
    )
    .unwrap();

    cache.add(&solid("a.png", [0, 0, 0, 255]));
    cache.materialize_now();
    assert!(root.join("a.png").is_file());
    assert!(cache.wait_settled(Duration::from_millis(1)));

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn spellings_of_one_path_share_an_entry() {
    let root = temp_dir("cache_spelling");
    let cache = AssetCache::new(&root, quick()).unwrap();
    let plain = solid("sb/a.png", [0, 255, 0, 255]);
    let dotted = solid("./sb//a.png", [0, 255, 0, 255]);

    cache.apply([&plain, &dotted]);
    assert!(cache.wait_settled(SETTLE));
    let snap = cache.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].path, "sb/a.png");
    assert_eq!(snap[0].reference_count, 2);
    assert_eq!(pixel(&root, "sb/a.png"), [0, 255, 0, 255]);

    drop(cache);
    std::fs::remove_dir_all(&root).ok();
}
