use std::path::{Path, PathBuf};

use crate::assets::decode::{PreparedImage, decode_image};

const IPX_PREFIX: &str = "/_ipx/";

/// Map a page image URL to a file under `public_dir`.
///
/// Image-optimizer URLs (`/_ipx/<modifiers>/<path>`) are unwrapped to the original asset path.
/// URLs with a scheme, empty paths and `..` traversals do not resolve.
pub fn resolve_image_path(src: &str, public_dir: &Path) -> Option<PathBuf> {
    if src.contains("://") || src.starts_with("//") || src.starts_with("data:") {
        return None;
    }

    let unwrapped: String = if src.starts_with(IPX_PREFIX) {
        src.split('/').skip(3).collect::<Vec<_>>().join("/")
    } else {
        src.to_string()
    };

    let mut out = public_dir.to_path_buf();
    let mut pushed = false;
    for part in unwrapped.replace('\\', "/").split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return None;
        }
        out.push(part);
        pushed = true;
    }

    pushed.then_some(out)
}

/// Load the first image candidate as the card background.
///
/// Every failure (unresolvable URL, missing file, undecodable bytes) degrades to `None`.
pub fn prepare_background(images: &[String], public_dir: &Path) -> Option<PreparedImage> {
    let src = images.first()?;
    let Some(path) = resolve_image_path(src, public_dir) else {
        tracing::debug!(src = %src, "background image is not a local asset");
        return None;
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "background image unreadable");
            return None;
        }
    };

    match decode_image(&bytes) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "background image undecodable");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/background.rs"]
mod tests;
