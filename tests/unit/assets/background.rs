use std::io::Cursor;

use super::*;

fn write_png(path: &Path, w: u32, h: u32) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 10, 10, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, buf).unwrap();
}

#[test]
fn site_paths_resolve_under_public_dir() {
    let root = Path::new("/srv/public");
    assert_eq!(
        resolve_image_path("/img/photo.jpg", root),
        Some(PathBuf::from("/srv/public/img/photo.jpg"))
    );
    assert_eq!(
        resolve_image_path("img/./photo.jpg", root),
        Some(PathBuf::from("/srv/public/img/photo.jpg"))
    );
}

#[test]
fn ipx_prefix_is_stripped() {
    let root = Path::new("/srv/public");
    assert_eq!(
        resolve_image_path("/_ipx/w_640&f_webp/img/photo.jpg", root),
        Some(PathBuf::from("/srv/public/img/photo.jpg"))
    );
}

#[test]
fn remote_and_traversing_urls_do_not_resolve() {
    let root = Path::new("/srv/public");
    assert_eq!(resolve_image_path("https://cdn.example.com/a.jpg", root), None);
    assert_eq!(resolve_image_path("//cdn.example.com/a.jpg", root), None);
    assert_eq!(resolve_image_path("/../etc/passwd.png", root), None);
    assert_eq!(resolve_image_path("/", root), None);
}

#[test]
fn first_candidate_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    write_png(&dir.path().join("img/a.png"), 4, 2);
    write_png(&dir.path().join("img/b.png"), 8, 8);

    let images = vec!["/img/a.png".to_string(), "/img/b.png".to_string()];
    let img = prepare_background(&images, dir.path()).unwrap();
    assert_eq!((img.width, img.height), (4, 2));
}

#[test]
fn missing_or_corrupt_files_mean_no_background() {
    let dir = tempfile::tempdir().unwrap();
    assert!(prepare_background(&["/nope.jpg".to_string()], dir.path()).is_none());

    std::fs::write(dir.path().join("bad.gif"), b"GIF89a-truncated").unwrap();
    assert!(prepare_background(&["/bad.gif".to_string()], dir.path()).is_none());

    assert!(prepare_background(&[], dir.path()).is_none());
}
