// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ESC/POS encoding for thermal receipt printers.
//
// Logos are sent as a single `GS v 0` raster bit image: one bit per dot,
// most significant bit leftmost, 1 = black.  Rows are padded to a whole
// number of bytes with white dots.

use image::DynamicImage;
use tracing::{debug, instrument};

use printlink_core::error::{PrintlinkError, Result};

/// ESC @ — initialise printer.
const ESC_INIT: &[u8] = b"\x1B\x40";

/// ESC a 1 — centre justification.
const ESC_ALIGN_CENTER: &[u8] = b"\x1B\x61\x01";

/// ESC a 0 — left justification.
const ESC_ALIGN_LEFT: &[u8] = b"\x1B\x61\x00";

/// GS V 0 — full cut.
const GS_CUT: &[u8] = b"\x1D\x56\x00";

/// GS v 0, normal density.
const GS_RASTER: &[u8] = b"\x1D\x76\x30\x00";

/// Luma below this value prints as a black dot.
const BLACK_THRESHOLD: u8 = 128;

/// Alpha below this value is treated as paper (white).
const OPAQUE_THRESHOLD: u8 = 128;

/// Encode an image as a `GS v 0` raster command.
pub fn raster_image(image: &DynamicImage) -> Result<Vec<u8>> {
    let pixels = image.to_luma_alpha8();
    let (width, height) = pixels.dimensions();
    let width_bytes = width.div_ceil(8);

    if width_bytes > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(PrintlinkError::Image(format!(
            "logo too large for raster mode: {width}x{height}"
        )));
    }

    let mut out = Vec::with_capacity(GS_RASTER.len() + 4 + (width_bytes * height) as usize);
    out.extend_from_slice(GS_RASTER);
    out.extend_from_slice(&(width_bytes as u16).to_le_bytes());
    out.extend_from_slice(&(height as u16).to_le_bytes());

    for y in 0..height {
        for column in 0..width_bytes {
            let mut byte = 0u8;
            for bit in 0..8 {
                let x = column * 8 + bit;
                if x >= width {
                    break;
                }
                let [luma, alpha] = pixels.get_pixel(x, y).0;
                if alpha >= OPAQUE_THRESHOLD && luma < BLACK_THRESHOLD {
                    byte |= 0x80 >> bit;
                }
            }
            out.push(byte);
        }
    }

    debug!(width, height, width_bytes, "encoded raster logo");
    Ok(out)
}

/// Decode an encoded image (PNG, JPEG, ...) and raster-encode it.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn raster_from_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let image = image::load_from_memory(data)
        .map_err(|e| PrintlinkError::Image(format!("failed to decode logo: {e}")))?;
    raster_image(&image)
}

/// Build a complete receipt: centred logo, then left-aligned text, feed and cut.
pub fn logo_receipt(logo_raster: &[u8], text: &str) -> Vec<u8> {
    let parts: [&[u8]; 8] = [
        ESC_INIT,
        ESC_ALIGN_CENTER,
        logo_raster,
        ESC_ALIGN_LEFT,
        b"\n",
        text.as_bytes(),
        b"\n\n\n",
        GS_CUT,
    ];
    parts.concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, ImageFormat, Luma, LumaA};
    use std::io::Cursor;

    #[test]
    fn header_encodes_padded_width_and_height() {
        // 10 dots wide -> 2 bytes per row.
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 3, Luma([255])));
        let raster = raster_image(&img).unwrap();
        assert_eq!(&raster[..4], GS_RASTER);
        assert_eq!(&raster[4..8], &[2, 0, 3, 0]);
        assert_eq!(raster.len(), 8 + 2 * 3);
        // All white -> all zero bits.
        assert!(raster[8..].iter().all(|b| *b == 0));
    }

    #[test]
    fn black_dots_are_set_bits_msb_first() {
        let mut img = GrayImage::from_pixel(9, 1, Luma([255]));
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(7, 0, Luma([10]));
        img.put_pixel(8, 0, Luma([0]));
        let raster = raster_image(&DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(&raster[8..], &[0b1000_0001, 0b1000_0000]);
    }

    #[test]
    fn transparent_pixels_print_white() {
        let img = GrayAlphaImage::from_pixel(8, 1, LumaA([0, 0]));
        let raster = raster_image(&DynamicImage::ImageLumaA8(img)).unwrap();
        assert_eq!(raster[8], 0);
    }

    #[test]
    fn decodes_png_logo() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 2, Luma([0])));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();

        let raster = raster_from_bytes(&png).unwrap();
        assert_eq!(&raster[4..8], &[1, 0, 2, 0]);
        assert_eq!(&raster[8..], &[0xFF, 0xFF]);
    }

    #[test]
    fn rejects_non_image_bytes() {
        let err = raster_from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PrintlinkError::Image(_)));
    }

    #[test]
    fn receipt_layout() {
        let receipt = logo_receipt(b"LOGO", "Total: 3.50");
        let parts: [&[u8]; 5] = [
            b"\x1B\x40\x1B\x61\x01",
            b"LOGO",
            b"\x1B\x61\x00\n",
            b"Total: 3.50",
            b"\n\n\n\x1D\x56\x00",
        ];
        assert_eq!(receipt, parts.concat());
    }
}
