use super::*;

#[test]
fn candidate_order_prefers_variant_then_family_then_system() {
    let lib = FontLibrary::with_system_dirs(
        Some(PathBuf::from("/fonts")),
        vec![PathBuf::from("/sys/dejavu"), PathBuf::from("/sys/liberation")],
    );
    let c = lib.candidates("Oswald", FontWeight::Bold, FontStyle::Normal);
    let expected: Vec<PathBuf> = [
        "/fonts/Oswald-Bold.ttf",
        "/fonts/Oswald-Bold.otf",
        "/fonts/Oswald.ttf",
        "/fonts/Oswald.otf",
        "/sys/dejavu/DejaVuSans-Bold.ttf",
        "/sys/dejavu/DejaVuSans.ttf",
        "/sys/liberation/LiberationSans-Regular.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(c, expected);
}

#[test]
fn regular_variant_has_no_duplicates() {
    let lib = FontLibrary::with_system_dirs(Some(PathBuf::from("/fonts")), vec![]);
    let c = lib.candidates("Oswald", FontWeight::Normal, FontStyle::Normal);
    assert_eq!(
        c,
        vec![PathBuf::from("/fonts/Oswald.ttf"), PathBuf::from("/fonts/Oswald.otf")]
    );
}

#[test]
fn path_like_families_skip_custom_dir() {
    let lib = FontLibrary::with_system_dirs(Some(PathBuf::from("/fonts")), vec![]);
    assert!(lib.candidates("../etc/x", FontWeight::Normal, FontStyle::Normal).is_empty());
}

#[test]
fn load_reads_and_caches_first_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Custom-Italic.otf"), b"fontbytes").unwrap();
    let mut lib = FontLibrary::with_system_dirs(Some(dir.path().to_path_buf()), vec![]);

    let f = lib.load("Custom", FontWeight::Normal, FontStyle::Italic).unwrap();
    assert_eq!(f.path, dir.path().join("Custom-Italic.otf"));
    assert_eq!(f.bytes.as_slice(), b"fontbytes");

    let again = lib.load("Custom", FontWeight::Normal, FontStyle::Italic).unwrap();
    assert!(Arc::ptr_eq(&f.bytes, &again.bytes));

    // Unknown families fall back to whatever font the directory holds.
    let other = lib.load("Missing", FontWeight::Normal, FontStyle::Normal).unwrap();
    assert_eq!(other.path, dir.path().join("Custom-Italic.otf"));
}

#[test]
fn fallback_picks_first_font_file_across_dirs() {
    let custom = tempfile::tempdir().unwrap();
    let system = tempfile::tempdir().unwrap();
    std::fs::write(custom.path().join("notes.txt"), b"x").unwrap();
    std::fs::write(system.path().join("Zeta.TTF"), b"z").unwrap();
    std::fs::write(system.path().join("Alpha.otf"), b"a").unwrap();

    let lib = FontLibrary::with_system_dirs(
        Some(custom.path().to_path_buf()),
        vec![system.path().to_path_buf()],
    );
    assert_eq!(lib.any_font(), Some(system.path().join("Alpha.otf")));
    assert_eq!(
        lib.resolve("Nope", FontWeight::Bold, FontStyle::Normal),
        Some(system.path().join("Alpha.otf"))
    );
}

#[test]
fn no_font_anywhere_is_an_error() {
    let empty = tempfile::tempdir().unwrap();
    let mut lib = FontLibrary::with_system_dirs(Some(empty.path().to_path_buf()), vec![]);
    assert!(lib.any_font().is_none());
    assert!(lib.load("Missing", FontWeight::Normal, FontStyle::Normal).is_err());
}

#[test]
fn suffixes() {
    assert_eq!(variant_suffix(FontWeight::Bold, FontStyle::Italic), "-BoldItalic");
    assert_eq!(variant_suffix(FontWeight::Normal, FontStyle::Italic), "-Italic");
}
