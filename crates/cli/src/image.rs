//! Reading receipt images from disk.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Infers the image MIME type from the file extension.
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}

/// An image file loaded into memory.
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

/// Reads `path`, rejecting files whose extension is not a known image type.
pub async fn read_image(path: &Path) -> Result<ImageFile> {
    let Some(mime_type) = mime_from_path(path) else {
        bail!(
            "'{}' does not look like an image (expected jpg, jpeg, png, webp, gif, bmp or tiff)",
            path.display()
        );
    };
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("could not read '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("cupom")
        .to_string();
    Ok(ImageFile {
        file_name,
        mime_type,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("cupom.JPG")), Some("image/jpeg"));
        assert_eq!(mime_from_path(Path::new("a/b/nota.png")), Some("image/png"));
        assert_eq!(mime_from_path(Path::new("scan.tif")), Some("image/tiff"));
        assert_eq!(mime_from_path(Path::new("nota.pdf")), None);
        assert_eq!(mime_from_path(Path::new("sem_extensao")), None);
    }
}
