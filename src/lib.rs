//! # fastqr
//!
//! A QR code generation and rasterization engine. Encodes arbitrary data
//! into ISO/IEC 18004 symbols with Reed-Solomon error correction, renders
//! them to pixel buffers with custom colors and an optional centered logo,
//! and serializes the result as PNG, JPEG or WebP. The same pipeline is
//! exposed over a stable C ABI (see [`ffi`]) for use from language bindings.
//!
//! ## Quick Start
//!
//! ```rust
//! use fastqr::{generate_image, QROptions};
//!
//! # fn main() -> Result<(), fastqr::QRError> {
//! // Defaults: 300x300 px, black on white, EC level M, PNG
//! let img = generate_image(b"https://example.com", &QROptions::default())?;
//! assert_eq!(img.dimensions(), (300, 300));
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing to a file
//!
//! ```rust,no_run
//! use fastqr::{generate, ECLevel, QROptions};
//!
//! # fn main() -> Result<(), fastqr::QRError> {
//! let opts = QROptions {
//!     size: 512,
//!     optimize_size: true,            // round up so modules map to whole pixels
//!     ec_level: ECLevel::H,
//!     logo_path: Some("logo.png".into()),
//!     ..Default::default()
//! };
//! generate(b"https://example.com", "qr.png", &opts)?;
//! # Ok(())
//! # }
//! ```

mod bits;
mod codec;
mod ec;
mod error;
pub mod ffi;
mod imagenc;
mod iter;
mod mask;
mod metadata;
mod qr;
mod render;

use std::path::{Path, PathBuf};

use image::RgbImage;
use rayon::prelude::*;

pub use error::{QRError, QRResult};
pub use imagenc::OutputFormat;
pub use metadata::{ECLevel, Version};

// Options
//------------------------------------------------------------------------------

/// Generation options, read-only during a run. The defaults mirror the C
/// header: 300px, black on white, EC level M, 20% logo, PNG at quality 95.
#[derive(Debug, Clone)]
pub struct QROptions {
    /// Output dimension in pixels (symbols are square)
    pub size: u32,
    /// Round the output up to a whole multiple of the module count
    pub optimize_size: bool,
    /// Module color as RGB
    pub foreground: [u8; 3],
    /// Background color as RGB
    pub background: [u8; 3],
    pub ec_level: ECLevel,
    /// Logo image composited over the center, if any
    pub logo_path: Option<PathBuf>,
    /// Logo size as a percentage of the output dimension
    pub logo_size_percent: u32,
    pub format: OutputFormat,
    /// JPEG quality 1-100; ignored by PNG and WebP
    pub quality: u8,
}

impl Default for QROptions {
    fn default() -> Self {
        Self {
            size: 300,
            optimize_size: false,
            foreground: [0, 0, 0],
            background: [255, 255, 255],
            ec_level: ECLevel::M,
            logo_path: None,
            logo_size_percent: 20,
            format: OutputFormat::Png,
            quality: 95,
        }
    }
}

// Generation pipeline
//------------------------------------------------------------------------------

// Segment, add error correction, place and mask
pub(crate) fn build_symbol(data: &[u8], ecl: ECLevel) -> QRResult<qr::QR> {
    if data.is_empty() {
        return Err(QRError::InvalidInput);
    }

    let (payload, ver) = codec::encode(data, ecl)?;
    let codewords = ec::assemble_codewords(payload.data(), ver, ecl);

    let mut bits = bits::BitStream::new(codewords.len() << 3);
    bits.extend(&codewords);

    let mut qr = qr::QR::new(ver, ecl);
    qr.draw_all_function_patterns();
    qr.draw_encoding_region(bits);
    mask::apply_best_mask(&mut qr);
    Ok(qr)
}

/// Generates a symbol for `data` and returns the rendered pixel buffer.
pub fn generate_image(data: &[u8], options: &QROptions) -> QRResult<RgbImage> {
    let qr = build_symbol(data, options.ec_level)?;
    render::rasterize(&qr, options)
}

/// Generates a symbol for `data` and writes it to `output_path` in the
/// configured format. The file is written in one shot after the image is
/// fully encoded.
pub fn generate(data: &[u8], output_path: impl AsRef<Path>, options: &QROptions) -> QRResult<()> {
    let path = output_path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(QRError::InvalidInput);
    }
    let img = generate_image(data, options)?;
    imagenc::write_file(&img, path, options.format, options.quality)
}

/// Generates one symbol per (data, output path) job in parallel. Results
/// are returned in job order; one failing job doesn't affect the others.
pub fn generate_batch<D, P>(jobs: &[(D, P)], options: &QROptions) -> Vec<QRResult<()>>
where
    D: AsRef<[u8]> + Sync,
    P: AsRef<Path> + Sync,
{
    jobs.par_iter().map(|(data, path)| generate(data.as_ref(), path, options)).collect()
}

/// Library version, matching what `fastqr_version` reports over the ABI.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
