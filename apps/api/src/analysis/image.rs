//! Resume image intake — extension allow-list plus magic-number sniffing.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;

use crate::llm_client::ImageAttachment;

/// File extensions accepted by the upload form.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SOI: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else if data.starts_with(JPEG_SOI) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("The uploaded resume is empty")]
    Empty,

    #[error("Unsupported file type '.{0}'. Upload a JPG or PNG image")]
    UnsupportedExtension(String),

    #[error("The uploaded file is not a JPG or PNG image")]
    UnrecognizedContent,

    #[error("The uploaded resume is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

/// A validated resume image. The format comes from the bytes, not the file name.
#[derive(Debug, Clone)]
pub struct ResumeImage {
    format: ImageFormat,
    data: Bytes,
}

impl ResumeImage {
    pub fn from_upload(
        file_name: Option<&str>,
        data: Bytes,
        limit: usize,
    ) -> Result<Self, ImageError> {
        if let Some(extension) = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
        {
            if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
                return Err(ImageError::UnsupportedExtension(extension));
            }
        }

        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        if data.len() > limit {
            return Err(ImageError::TooLarge {
                size: data.len(),
                limit,
            });
        }

        let format = ImageFormat::sniff(&data).ok_or(ImageError::UnrecognizedContent)?;
        Ok(Self { format, data })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn attachment(&self) -> ImageAttachment {
        ImageAttachment {
            media_type: self.format.media_type(),
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn png_fixture() -> Bytes {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(b"\0\0\0\rIHDR");
    Bytes::from(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024;

    #[test]
    fn test_png_accepted() {
        let image = ResumeImage::from_upload(Some("resume.PNG"), png_fixture(), LIMIT).unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.attachment().media_type, "image/png");
    }

    #[test]
    fn test_jpeg_accepted_without_file_name() {
        let data = Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
        let image = ResumeImage::from_upload(None, data, LIMIT).unwrap();
        assert_eq!(image.format(), ImageFormat::Jpeg);
        assert_eq!(image.size(), 6);
    }

    #[test]
    fn test_sniffed_format_wins_over_extension() {
        let image = ResumeImage::from_upload(Some("scan.jpg"), png_fixture(), LIMIT).unwrap();
        assert_eq!(image.format(), ImageFormat::Png);
    }

    #[test]
    fn test_pdf_extension_rejected() {
        let err = ResumeImage::from_upload(Some("resume.pdf"), png_fixture(), LIMIT).unwrap_err();
        assert_eq!(err, ImageError::UnsupportedExtension("pdf".to_string()));
    }

    #[test]
    fn test_empty_upload_rejected() {
        let err = ResumeImage::from_upload(Some("a.png"), Bytes::new(), LIMIT).unwrap_err();
        assert_eq!(err, ImageError::Empty);
    }

    #[test]
    fn test_non_image_bytes_rejected() {
        let err = ResumeImage::from_upload(Some("a.png"), Bytes::from_static(b"%PDF-1.7"), LIMIT)
            .unwrap_err();
        assert_eq!(err, ImageError::UnrecognizedContent);
    }

    #[test]
    fn test_oversized_upload_rejected() {
        let data = Bytes::from(vec![0xFF; LIMIT + 1]);
        let err = ResumeImage::from_upload(Some("a.jpg"), data, LIMIT).unwrap_err();
        assert_eq!(
            err,
            ImageError::TooLarge {
                size: LIMIT + 1,
                limit: LIMIT
            }
        );
    }
}
