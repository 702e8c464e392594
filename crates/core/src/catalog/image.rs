//! Uploaded images, stored as blobs next to the catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::ImageId;

/// Largest accepted upload (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Content types the site will store and serve back.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/svg+xml",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("the uploaded file is empty")]
    Empty,
    #[error("images must be at most {max} bytes (got {got})")]
    TooLarge { max: usize, got: usize },
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("a file name is required")]
    MissingFilename,
}

/// Image metadata without the bytes, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct ImageMeta {
    pub id: ImageId,
    pub filename: String,
    pub content_type: String,
    pub byte_size: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Image {
    pub meta: ImageMeta,
    pub data: Vec<u8>,
}

/// A validated upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Check size and type of an uploaded file.
    ///
    /// The content type is taken from the upload and lowercased; parameters
    /// such as `; charset=` are dropped. The file name is reduced to its last
    /// path component.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageError`] when the file is empty, too large, or not an
    /// allowed image type.
    pub fn new(filename: &str, content_type: &str, data: Vec<u8>) -> Result<Self, ImageError> {
        let filename = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned();
        if filename.is_empty() {
            return Err(ImageError::MissingFilename);
        }

        let content_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(ImageError::UnsupportedType(content_type));
        }

        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                max: MAX_IMAGE_BYTES,
                got: data.len(),
            });
        }

        Ok(Self {
            filename,
            content_type,
            data,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_png_and_strips_path() {
        let upload = ImageUpload::new("C:\\photos\\panel.png", "Image/PNG", vec![1, 2, 3]).unwrap();
        assert_eq!(upload.filename, "panel.png");
        assert_eq!(upload.content_type, "image/png");
    }

    #[test]
    fn test_rejects_other_types() {
        assert_eq!(
            ImageUpload::new("x.pdf", "application/pdf", vec![1]).unwrap_err(),
            ImageError::UnsupportedType("application/pdf".to_string())
        );
    }

    #[test]
    fn test_rejects_empty_and_large() {
        assert_eq!(
            ImageUpload::new("a.jpg", "image/jpeg", Vec::new()).unwrap_err(),
            ImageError::Empty
        );
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            ImageUpload::new("a.jpg", "image/jpeg", big),
            Err(ImageError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_requires_filename() {
        assert_eq!(
            ImageUpload::new("uploads/", "image/gif", vec![1]).unwrap_err(),
            ImageError::MissingFilename
        );
    }
}
