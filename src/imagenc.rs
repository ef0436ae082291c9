use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use crate::error::{QRError, QRResult};

// Output format
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
}

impl FromStr for OutputFormat {
    type Err = QRError;

    fn from_str(s: &str) -> QRResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::WebP),
            _ => Err(QRError::UnsupportedFormat),
        }
    }
}

// Serialization
//------------------------------------------------------------------------------

/// Serializes the pixel buffer to an in-memory byte stream. `quality` is
/// clamped to 1-100 and only applies to JPEG; PNG and WebP are lossless.
pub fn encode(img: &RgbImage, format: OutputFormat, quality: u8) -> QRResult<Vec<u8>> {
    let (w, h) = img.dimensions();
    let mut buf = Vec::new();
    let res = match format {
        OutputFormat::Png => PngEncoder::new(Cursor::new(&mut buf)).write_image(
            img.as_raw(),
            w,
            h,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::Jpeg => {
            JpegEncoder::new_with_quality(Cursor::new(&mut buf), quality.clamp(1, 100))
                .write_image(img.as_raw(), w, h, ExtendedColorType::Rgb8)
        }
        OutputFormat::WebP => WebPEncoder::new_lossless(Cursor::new(&mut buf)).write_image(
            img.as_raw(),
            w,
            h,
            ExtendedColorType::Rgb8,
        ),
    };
    res.map_err(|_| QRError::EncodingError)?;
    Ok(buf)
}

/// Encodes fully in memory before touching the filesystem, so a failure
/// never leaves a partial file behind.
pub fn write_file(
    img: &RgbImage,
    path: impl AsRef<Path>,
    format: OutputFormat,
    quality: u8,
) -> QRResult<()> {
    let buf = encode(img, format, quality)?;
    fs::write(path, buf).map_err(|_| QRError::EncodingError)
}
