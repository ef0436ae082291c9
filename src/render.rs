use std::path::Path;

use image::{imageops::FilterType, Rgb, RgbImage};

use crate::error::{QRError, QRResult};
use crate::qr::QR;
use crate::QROptions;

// Rasterizer
//------------------------------------------------------------------------------

/// Expands the module grid into an RGB pixel buffer. With `optimize_size`
/// the output is rounded up to the nearest whole multiple of the symbol
/// width so every module maps to an integer pixel block; otherwise the
/// output is exactly `size` pixels with nearest-fill sampling.
pub fn rasterize(qr: &QR, opts: &QROptions) -> QRResult<RgbImage> {
    if opts.size == 0 {
        return Err(QRError::InvalidInput);
    }

    let w = qr.width() as u32;
    let final_size = if opts.optimize_size { opts.size.div_ceil(w) * w } else { opts.size };

    let fg = Rgb(opts.foreground);
    let bg = Rgb(opts.background);

    let mut canvas = RgbImage::new(final_size, final_size);
    for y in 0..final_size {
        let r = (y as u64 * w as u64 / final_size as u64) as i16;
        for x in 0..final_size {
            let c = (x as u64 * w as u64 / final_size as u64) as i16;
            let px = qr.get(r, c).select(fg, bg);
            canvas.put_pixel(x, y, px);
        }
    }

    if let Some(path) = &opts.logo_path {
        overlay_logo(&mut canvas, path, opts.logo_size_percent)?;
    }

    Ok(canvas)
}

// Logo overlay
//------------------------------------------------------------------------------

// Scales the logo to the requested percentage of the output dimension,
// preserving its aspect ratio, and alpha-composites it in the center. Error
// correction has to absorb the covered modules.
fn overlay_logo(canvas: &mut RgbImage, path: &Path, size_percent: u32) -> QRResult<()> {
    let logo = image::open(path).map_err(|_| QRError::LogoDecodeError)?;

    let out = canvas.width();
    // The percentage is clamped so the logo never outgrows the canvas; the
    // FFI layer clamps too, but the field is public on the Rust side
    let target = (out * size_percent.min(100) / 100).max(1);
    let scaled = logo.resize(target, target, FilterType::Nearest).to_rgba8();

    let x0 = (out - scaled.width()) / 2;
    let y0 = (out - scaled.height()) / 2;
    for (x, y, px) in scaled.enumerate_pixels() {
        let a = px[3] as u32;
        if a == 0 {
            continue;
        }
        let dst = canvas.get_pixel_mut(x0 + x, y0 + y);
        for i in 0..3 {
            dst[i] = ((px[i] as u32 * a + dst[i] as u32 * (255 - a)) / 255) as u8;
        }
    }
    Ok(())
}
