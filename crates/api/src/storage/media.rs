//! Upload media-type detection.
//!
//! Images are identified by their header bytes; PDF by its magic; CSV and
//! DOCX by the declared content type or the file extension, checked against
//! the content where a signature exists.

use image::ImageFormat;

/// Largest accepted image upload.
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Png,
    Jpeg,
    Webp,
    Pdf,
    Csv,
    Docx,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Webp => "image/webp",
            MediaType::Pdf => "application/pdf",
            MediaType::Csv => "text/csv",
            MediaType::Docx => DOCX,
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, MediaType::Png | MediaType::Jpeg | MediaType::Webp)
    }
}

fn has_extension(file_name: &str, ext: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, e)| e.eq_ignore_ascii_case(ext))
}

/// Detect an allowed media type, or `None` when the upload is not one.
pub fn sniff_media_type(
    content: &[u8],
    file_name: &str,
    declared: Option<&str>,
) -> Option<MediaType> {
    if let Ok(format) = image::guess_format(content) {
        return match format {
            ImageFormat::Png => Some(MediaType::Png),
            ImageFormat::Jpeg => Some(MediaType::Jpeg),
            ImageFormat::WebP => Some(MediaType::Webp),
            _ => None,
        };
    }
    if content.starts_with(b"%PDF-") {
        return Some(MediaType::Pdf);
    }
    if content.starts_with(b"PK\x03\x04")
        && (declared == Some(DOCX) || has_extension(file_name, "docx"))
    {
        return Some(MediaType::Docx);
    }
    if (declared == Some("text/csv") || has_extension(file_name, "csv"))
        && std::str::from_utf8(content).is_ok()
    {
        return Some(MediaType::Csv);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn images_are_detected_from_content() {
        assert_eq!(
            sniff_media_type(PNG_HEADER, "upload.bin", None),
            Some(MediaType::Png)
        );
        assert_eq!(
            sniff_media_type(b"\xff\xd8\xff\xe0\0\x10JFIF", "a.jpg", None),
            Some(MediaType::Jpeg)
        );
    }

    #[test]
    fn pdf_and_csv() {
        assert_eq!(sniff_media_type(b"%PDF-1.4\n", "doc", None), Some(MediaType::Pdf));
        assert_eq!(
            sniff_media_type(b"a,b\n1,2\n", "table.CSV", None),
            Some(MediaType::Csv)
        );
        assert_eq!(sniff_media_type(b"a,b\n1,2\n", "table.txt", None), None);
    }

    #[test]
    fn docx_needs_zip_signature() {
        assert_eq!(
            sniff_media_type(b"PK\x03\x04rest", "cv.docx", None),
            Some(MediaType::Docx)
        );
        assert_eq!(sniff_media_type(b"not a zip", "cv.docx", None), None);
    }

    #[test]
    fn other_types_are_rejected() {
        assert_eq!(sniff_media_type(b"GIF89a....", "a.gif", None), None);
        assert!(!MediaType::Pdf.is_image());
        assert!(MediaType::Webp.is_image());
    }
}
