use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PosterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PosterError::fetch("x").to_string().contains("fetch error:"));
    assert!(
        PosterError::capture("x")
            .to_string()
            .contains("capture error:")
    );
    assert!(PosterError::render("x").to_string().contains("render error:"));
    assert!(
        PosterError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PosterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_fetch_is_transient() {
    assert!(PosterError::fetch("timeout").is_transient());
    assert!(!PosterError::validation("no source").is_transient());
    assert!(!PosterError::render("disk full").is_transient());
}
