use super::*;

#[test]
fn inline_upload_decodes_back_to_bytes() {
    let image = ImageRef::from_bytes(b"\x89PNG-fake", "image/png");
    assert!(image.is_data_url());
    assert!(image.as_str().starts_with("data:image/png;base64,"));

    let decoded = image.decode().expect("decode data url");
    assert_eq!(decoded.mime_type, "image/png");
    assert_eq!(decoded.bytes, b"\x89PNG-fake");
    assert_eq!(decoded.file_name(), "upload.png");
}

#[test]
fn remote_and_malformed_refs_do_not_decode() {
    let remote = ImageRef::from_url("http://127.0.0.1:8000/image/out.png");
    assert!(!remote.is_data_url());
    assert!(remote.decode().is_err());

    assert!(ImageRef::from_url("data:image/png,plain").decode().is_err());
    assert!(ImageRef::from_url("data:image/png;base64,@@@").decode().is_err());
}

#[test]
fn display_shortens_inline_uploads() {
    let image = ImageRef::from_bytes(&[0u8; 64], "image/jpeg");
    let shown = image.to_string();
    assert!(shown.starts_with("<inline image/jpeg"), "{shown}");

    let remote = ImageRef::from_url("http://host/image/a.png");
    assert_eq!(remote.to_string(), "http://host/image/a.png");
}

#[tokio::test]
async fn read_file_guesses_mime_from_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("photo.jpg");
    tokio::fs::write(&path, b"jpeg-bytes").await.expect("write");

    let image = ImageRef::read_file(&path).await.expect("read image");
    let decoded = image.decode().expect("decode");
    assert_eq!(decoded.mime_type, "image/jpeg");
    assert_eq!(decoded.bytes, b"jpeg-bytes");

    assert!(ImageRef::read_file(dir.path().join("missing.png"))
        .await
        .is_err());
}
