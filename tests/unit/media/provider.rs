use super::*;

fn opts(root: &Path) -> FsMediaOptions {
    FsMediaOptions {
        roots: vec![root.to_path_buf()],
        video_extensions: vec![".mp4".into(), ".mkv".into(), ".mov".into()],
        preview_max_width: 640,
        thumbnail_quality: 85,
        cache_bytes: 1 << 20,
    }
}

fn library() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("a.mp4"), b"1234").unwrap();
    std::fs::write(root.join("B.mkv"), b"x").unwrap();
    std::fs::write(root.join("notes.txt"), b"x").unwrap();
    std::fs::create_dir_all(root.join("sub/deep")).unwrap();
    std::fs::write(root.join("sub/deep/c.MOV"), b"x").unwrap();
    std::fs::create_dir_all(root.join("empty")).unwrap();
    dir
}

#[test]
fn lists_videos_and_video_directories_sorted_case_insensitively() {
    let lib = library();
    let provider = FsMediaProvider::new(opts(lib.path()));
    let entries = provider.list_entries(None).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["a.mp4", "B.mkv", "sub"]);
    assert_eq!(entries[0].size, Some(4));
    assert_eq!(entries[2].kind, EntryKind::Directory);

    let nested = provider.list_entries(Some("sub")).unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].path, "sub/deep");

    assert!(provider.list_entries(Some("../etc")).is_err());
}

#[test]
fn resolve_checks_root_and_existence() {
    let lib = library();
    let provider = FsMediaProvider::new(opts(lib.path()));
    let base = lib.path().to_string_lossy().into_owned();

    assert!(provider.resolve(&SourceRef::new(base.clone(), "a.mp4")).is_ok());
    let missing = provider
        .resolve(&SourceRef::new(base, "nope.mp4"))
        .unwrap_err();
    assert!(missing.is_transient());
    let foreign = provider
        .resolve(&SourceRef::new("/elsewhere", "a.mp4"))
        .unwrap_err();
    assert!(matches!(foreign, PosterError::Validation(_)));
}

#[test]
fn frame_uri_is_percent_encoded() {
    let lib = library();
    let provider = FsMediaProvider::new(opts(lib.path()));
    let uri = provider.frame_uri(
        &SourceRef::new("/videos/a", "My Movie/x&y.mp4"),
        12.5,
        FrameVariant::Preview,
    );
    assert_eq!(
        uri,
        "/api/frames/preview?base=%2Fvideos%2Fa&path=My%20Movie%2Fx%26y.mp4&t=12.5"
    );
}

#[test]
fn thumbnail_times_are_evenly_spaced() {
    assert_eq!(thumbnail_times(10.0, 4), vec![0.0, 2.5, 5.0, 7.5]);
    assert!(thumbnail_times(0.0, 4).is_empty());
    assert!(thumbnail_times(10.0, 0).is_empty());
}

#[test]
fn rel_paths_are_normalized() {
    assert_eq!(normalize_rel_path("a\\b/./c.mp4").unwrap(), "a/b/c.mp4");
    assert!(normalize_rel_path("/abs").is_err());
    assert!(normalize_rel_path("a/../b").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn entries_serialize_type_field() {
    let e = MediaEntry {
        name: "a.mp4".into(),
        path: "a.mp4".into(),
        kind: EntryKind::Video,
        base: "/v".into(),
        size: None,
    };
    let v = serde_json::to_value(&e).unwrap();
    assert_eq!(v["type"], "video");
    assert!(v.get("size").is_none());
}
