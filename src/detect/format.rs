#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Avif,
    Bmp,
    Unknown,
}

impl ImageFormat {
    pub fn is_known(self) -> bool {
        self != ImageFormat::Unknown
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            ImageFormat::Avif => "avif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Unknown => "bin",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Avif => "image/avif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Unknown => "application/octet-stream",
        }
    }
}

/// Detect image format from the first bytes of a payload.
pub fn detect_image_format(header: &[u8]) -> ImageFormat {
    // JPEG: SOI marker followed by the start of another marker
    if header.len() >= 3 && header[0..3] == [0xFF, 0xD8, 0xFF] {
        return ImageFormat::Jpeg;
    }

    if header.len() >= 8 && header[0..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
        return ImageFormat::Png;
    }

    if header.len() >= 6 && (&header[0..6] == b"GIF87a" || &header[0..6] == b"GIF89a") {
        return ImageFormat::Gif;
    }

    // WebP: RIFF container with "WEBP" form type
    if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
        return ImageFormat::WebP;
    }

    // AVIF: ISO-BMFF "ftyp" box with an avif/avis brand
    if header.len() >= 12
        && &header[4..8] == b"ftyp"
        && (&header[8..12] == b"avif" || &header[8..12] == b"avis")
    {
        return ImageFormat::Avif;
    }

    if header.len() >= 2 && &header[0..2] == b"BM" {
        return ImageFormat::Bmp;
    }

    ImageFormat::Unknown
}
