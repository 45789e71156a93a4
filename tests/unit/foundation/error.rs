use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CardError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CardError::fetch("x").to_string().contains("fetch error:"));
    assert!(CardError::render("x").to_string().contains("render error:"));
    assert!(CardError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn cache_error_names_the_path() {
    let err = CardError::cache("/tmp/cards/__a.jpg", std::io::Error::other("disk full"));
    let msg = err.to_string();
    assert!(msg.contains("__a.jpg"));
    assert!(msg.contains("disk full"));
    assert!(!err.is_fetch());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CardError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
