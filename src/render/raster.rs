//! Rasterizes an encoded QR symbol into styled PNG bytes

use std::io::Cursor;

use image::{imageops, ImageFormat, Rgba, RgbaImage};
use log::debug;
use qrcode::{Color, EcLevel, QrCode};

use super::{ModuleShape, RenderOptions};
use crate::error::{Error, Result};

/// Quiet-zone width in modules on each side of the symbol
const QUIET_ZONE: u32 = 4;

/// The logo may cover at most 1/LOGO_FRACTION of the symbol's linear
/// dimension; larger overlays risk unrecoverable data loss even at the
/// highest error-correction level.
const LOGO_FRACTION: u32 = 5;

const DEFAULT_FOREGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Encode `payload` into a QR symbol and render it with the given options
///
/// The symbol is encoded at error-correction level H, the redundancy budget
/// that lets the centered logo overlay survive scanning. Rendering is
/// deterministic: identical payload and options produce identical bytes.
pub fn compose(payload: &str, options: &RenderOptions) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)
        .map_err(|e| Error::EncodeError(format!("cannot encode payload: {}", e)))?;

    let canvas = paint(&code, options);

    let mut out = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| Error::RenderError(format!("cannot write PNG: {}", e)))?;
    Ok(out)
}

/// Draw the symbol's dark modules and overlay the logo at the center
fn paint(code: &QrCode, options: &RenderOptions) -> RgbaImage {
    let modules = code.to_colors();
    let width = code.width() as u32;
    let total = width + 2 * QUIET_ZONE;

    // Scale the modules up until the logo fits within its linear-fraction cap.
    let target = options.logo.pixels.width() * LOGO_FRACTION;
    let scale = ((target + total - 1) / total).max(1);
    let size = total * scale;

    let foreground = match options.foreground_hex.as_deref() {
        Some(hex) => parse_hex_color(hex).unwrap_or_else(|| {
            debug!("ignoring unparseable foreground color {:?}", hex);
            DEFAULT_FOREGROUND
        }),
        None => DEFAULT_FOREGROUND,
    };

    let mut canvas = RgbaImage::from_pixel(size, size, BACKGROUND);
    for (i, module) in modules.iter().enumerate() {
        if *module != Color::Dark {
            continue;
        }
        let x0 = (i as u32 % width + QUIET_ZONE) * scale;
        let y0 = (i as u32 / width + QUIET_ZONE) * scale;
        match options.shape {
            ModuleShape::Square => fill_square(&mut canvas, x0, y0, scale, foreground),
            ModuleShape::Circle => fill_circle(&mut canvas, x0, y0, scale, foreground),
        }
    }

    // Alpha-blended, so the transparent placeholder has zero visual effect.
    let logo = &options.logo.pixels;
    let offset = (i64::from(size) - i64::from(logo.width())) / 2;
    imageops::overlay(&mut canvas, logo, offset, offset);

    canvas
}

fn fill_square(canvas: &mut RgbaImage, x0: u32, y0: u32, scale: u32, color: Rgba<u8>) {
    for dy in 0..scale {
        for dx in 0..scale {
            canvas.put_pixel(x0 + dx, y0 + dy, color);
        }
    }
}

/// Fill the largest circle that fits the module cell
fn fill_circle(canvas: &mut RgbaImage, x0: u32, y0: u32, scale: u32, color: Rgba<u8>) {
    let center = (scale as f32 - 1.0) / 2.0;
    let radius = scale as f32 / 2.0;
    for dy in 0..scale {
        for dx in 0..scale {
            let dist2 = (dx as f32 - center).powi(2) + (dy as f32 - center).powi(2);
            if dist2 <= radius * radius {
                canvas.put_pixel(x0 + dx, y0 + dy, color);
            }
        }
    }
}

/// Accepts `#RRGGBB` or `RRGGBB`, case-insensitive
fn parse_hex_color(value: &str) -> Option<Rgba<u8>> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgba([r, g, b, 255]))
}
