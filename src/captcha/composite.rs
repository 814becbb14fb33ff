//! Module for merging rendered glyphs into the canvas.

use image::{GrayImage, Luma, RgbImage, RgbaImage};


/// Factor by which glyph luminance is amplified to obtain its opacity.
const OPACITY_GAIN: f64 = 1.97;

lazy_static! {
    /// Lookup table from glyph luminance to compositing opacity.
    ///
    /// It pushes the anti-aliased edges of the characters towards full opacity,
    /// so they read as solid ink rather than fading into the background.
    pub static ref OPACITY_TABLE: [u8; 256] = {
        let mut table = [0u8; 256];
        for (v, entry) in table.iter_mut().enumerate() {
            *entry = (v as f64 * OPACITY_GAIN).round().min(255.0) as u8;
        }
        table
    };
}


/// Build the compositing mask of given glyph.
///
/// Every pixel's luminance (ITU-R 601-2 luma, ignoring alpha)
/// is mapped through the `OPACITY_TABLE`.
pub fn mask_for(glyph: &RgbaImage) -> GrayImage {
    let table = &*OPACITY_TABLE;
    GrayImage::from_fn(glyph.width(), glyph.height(), |x, y| {
        let [r, g, b, _] = glyph.get_pixel(x, y).0;
        let luma = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000;
        Luma([table[luma as usize]])
    })
}

/// Paste the glyph onto the canvas with its top-left corner at `(x, y)`,
/// blending through the mask.
///
/// Parts of the glyph that fall outside of the canvas are clipped.
pub fn paste(canvas: &mut RgbImage, glyph: &RgbaImage, (x, y): (i64, i64), mask: &GrayImage) {
    debug_assert_eq!(glyph.dimensions(), mask.dimensions());
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);

    for (gx, gy, src) in glyph.enumerate_pixels() {
        let (cx, cy) = (x.saturating_add(gx as i64), y.saturating_add(gy as i64));
        if cx < 0 || cy < 0 || cx >= width || cy >= height {
            continue;
        }
        let m = mask.get_pixel(gx, gy).0[0] as u32;
        if m == 0 {
            continue;
        }
        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
        for c in 0..3 {
            let blended = src.0[c] as u32 * m + dst.0[c] as u32 * (255 - m);
            dst.0[c] = ((blended + 127) / 255) as u8;
        }
    }
}
