use gallery_engine::detect::format::{detect_image_format, ImageFormat};

#[test]
fn test_detect_jpeg() {
    // JPEG: SOI marker FF D8 followed by an APP0 marker
    let header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    assert_eq!(detect_image_format(&header), ImageFormat::Jpeg);
}

#[test]
fn test_detect_png() {
    let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    assert_eq!(detect_image_format(&header), ImageFormat::Png);
}

#[test]
fn test_detect_gif() {
    assert_eq!(detect_image_format(b"GIF89a\x01\x00"), ImageFormat::Gif);
    assert_eq!(detect_image_format(b"GIF87a\x01\x00"), ImageFormat::Gif);
}

#[test]
fn test_detect_webp() {
    // RIFF <size> WEBP
    let mut header = vec![0u8; 16];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&1024u32.to_le_bytes());
    header[8..12].copy_from_slice(b"WEBP");
    assert_eq!(detect_image_format(&header), ImageFormat::WebP);

    // A RIFF container that is not WebP (e.g. WAV) is not an image.
    header[8..12].copy_from_slice(b"WAVE");
    assert_eq!(detect_image_format(&header), ImageFormat::Unknown);
}

#[test]
fn test_detect_avif() {
    let mut header = vec![0u8; 32];
    header[0..4].copy_from_slice(&32u32.to_be_bytes());
    header[4..8].copy_from_slice(b"ftyp");
    header[8..12].copy_from_slice(b"avif");
    assert_eq!(detect_image_format(&header), ImageFormat::Avif);

    // Same box layout with a video brand.
    header[8..12].copy_from_slice(b"isom");
    assert_eq!(detect_image_format(&header), ImageFormat::Unknown);
}

#[test]
fn test_detect_unknown() {
    assert_eq!(detect_image_format(b""), ImageFormat::Unknown);
    assert_eq!(detect_image_format(b"<!DOCTYPE html>"), ImageFormat::Unknown);
    // Truncated PNG signature.
    assert_eq!(detect_image_format(&[0x89, b'P', b'N']), ImageFormat::Unknown);
}

#[test]
fn test_format_helpers() {
    assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    assert_eq!(ImageFormat::WebP.mime_type(), "image/webp");
    assert!(ImageFormat::Bmp.is_known());
    assert!(!ImageFormat::Unknown.is_known());
}
