use super::*;

fn frame(w: u32) -> Raster {
    Raster::filled(w, 1, [1, 2, 3, 4]).unwrap()
}

#[test]
fn keys_round_timestamps_to_milliseconds() {
    assert_eq!(frame_key("a.mp4", 1.0001, 640, 85), frame_key("a.mp4", 1.0, 640, 85));
    assert_ne!(frame_key("a.mp4", 1.002, 640, 85), frame_key("a.mp4", 1.0, 640, 85));
    assert_ne!(frame_key("a.mp4", 1.0, 320, 85), frame_key("a.mp4", 1.0, 640, 85));
    assert_ne!(frame_key("b.mp4", 1.0, 640, 85), frame_key("a.mp4", 1.0, 640, 85));
}

#[test]
fn evicts_least_recently_used_over_budget() {
    // Each frame is 16 bytes; room for two.
    let mut cache = FrameCache::new(32);
    cache.insert(1, frame(4));
    cache.insert(2, frame(4));
    assert!(cache.get(1).is_some());
    cache.insert(3, frame(4));

    assert!(cache.get(2).is_none());
    assert!(cache.get(1).is_some());
    assert!(cache.get(3).is_some());
    assert_eq!(cache.used_bytes(), 32);
}

#[test]
fn oversized_frames_are_skipped_and_reinsert_replaces() {
    let mut cache = FrameCache::new(32);
    cache.insert(1, frame(16));
    assert!(cache.is_empty());

    cache.insert(1, frame(4));
    cache.insert(1, frame(2));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.used_bytes(), 8);

    cache.clear();
    assert_eq!(cache.used_bytes(), 0);
}
