use super::*;

#[test]
fn errors_map_to_statuses() {
    assert_eq!(
        status_for(&CardError::validation("x")),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(status_for(&CardError::fetch("x")), StatusCode::BAD_GATEWAY);
    assert_eq!(
        status_for(&CardError::render("x")),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_for(&CardError::encode("x")),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_for(&CardError::cache(
            "/tmp/x.jpg",
            std::io::Error::other("disk full")
        )),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_for(&CardError::Other(anyhow::anyhow!("boom"))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
