//! Module responsible for rendering & distorting single characters.

use image::{imageops, Rgba, RgbaImage};
use rand::Rng;
use rusttype::point;

use crate::model::Palette;
use crate::resources::FontFace;


/// Maximum extra room added to the right of a character before drawing it.
const MAX_DX: u32 = 4;
/// Maximum extra room added below a character before drawing it.
const MAX_DY: u32 = 6;
/// Maximum rotation of a character (in degrees), in either direction.
pub const MAX_ROTATION: f64 = 30.0;


/// Rasterize a single character as a tightly cropped RGBA glyph.
///
/// Color channels are scaled by ink coverage just like the alpha channel,
/// which is what later makes the luminance-based mask follow the ink.
pub fn render<R: Rng + ?Sized>(ch: char, face: &FontFace,
                               palette: &Palette, rng: &mut R) -> RgbaImage {
    let scale = face.scale();
    let v_metrics = face.font.v_metrics(scale);
    let glyph = face.font.glyph(ch).scaled(scale);

    let width = glyph.h_metrics().advance_width.ceil().max(1.0) as u32;
    let height = (v_metrics.ascent - v_metrics.descent).ceil().max(1.0) as u32;
    let dx = rng.gen_range(0..=MAX_DX);
    let dy = rng.gen_range(0..=MAX_DY);
    trace!("Drawing {:?} at size {} into {}x{} (+{}, +{})",
        ch, face.size, width, height, dx, dy);

    let mut buffer = RgbaImage::new(width + dx, height + dy);
    let (buf_width, buf_height) = buffer.dimensions();
    let glyph = glyph.positioned(point(dx as f32, dy as f32 + v_metrics.ascent));
    if let Some(bbox) = glyph.pixel_bounding_box() {
        let Rgba([r, g, b, a]) = palette.foreground_rgba();
        glyph.draw(|x, y, v| {
            let px = bbox.min.x + x as i32;
            let py = bbox.min.y + y as i32;
            if px < 0 || py < 0 || px as u32 >= buf_width || py as u32 >= buf_height {
                return;
            }
            let coverage = v.max(0.0).min(1.0);
            let ink = |c: u8| (c as f32 * coverage).round() as u8;
            buffer.put_pixel(px as u32, py as u32, Rgba([ink(r), ink(g), ink(b), ink(a)]));
        });
    }

    crop_to_ink(buffer)
}

/// Crop the glyph buffer to the smallest rectangle with non-transparent pixels.
///
/// Buffers without any ink at all (e.g. for whitespace) are returned intact.
pub fn crop_to_ink(buffer: RgbaImage) -> RgbaImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, px) in buffer.enumerate_pixels() {
        if px.0[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    match bounds {
        Some((x0, y0, x1, y1)) => {
            imageops::crop_imm(&buffer, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image()
        }
        None => buffer,
    }
}


/// Pick a random rotation angle (in degrees).
#[inline]
pub fn random_angle<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-MAX_ROTATION..=MAX_ROTATION)
}

/// Rotate the glyph counter-clockwise by given angle (in degrees),
/// with bilinear interpolation.
///
/// The result is large enough to hold the whole rotated glyph;
/// the area not covered by it is transparent.
pub fn rotate(glyph: &RgbaImage, degrees: f64) -> RgbaImage {
    let (width, height) = (glyph.width() as f64, glyph.height() as f64);
    let radians = degrees.to_radians();
    // Rounding gets rid of float noise, so that e.g. 90 degrees swaps dimensions exactly.
    let cos = round_to(radians.cos(), 12);
    let sin = round_to(radians.sin(), 12);

    // Corners are rotated around the center but kept in the glyph's
    // coordinate space, so that an unrotated glyph keeps its exact size.
    let (in_cx, in_cy) = (width / 2.0, height / 2.0);
    let corners = [(0.0, 0.0), (width, 0.0), (0.0, height), (width, height)];
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &corners {
        let (x, y) = (x - in_cx, y - in_cy);
        let rx = x * cos + y * sin + in_cx;
        let ry = -x * sin + y * cos + in_cy;
        min_x = min_x.min(rx); max_x = max_x.max(rx);
        min_y = min_y.min(ry); max_y = max_y.max(ry);
    }
    let new_width = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let new_height = (max_y.ceil() - min_y.floor()).max(1.0) as u32;

    let (out_cx, out_cy) = (new_width as f64 / 2.0, new_height as f64 / 2.0);
    RgbaImage::from_fn(new_width, new_height, |x, y| {
        let ox = x as f64 + 0.5 - out_cx;
        let oy = y as f64 + 0.5 - out_cy;
        let sx = ox * cos - oy * sin + in_cx - 0.5;
        let sy = ox * sin + oy * cos + in_cy - 0.5;
        sample_bilinear(glyph, sx, sy)
    })
}

/// Sample the image at a fractional pixel position.
/// Anything outside of the image counts as transparent black.
fn sample_bilinear(img: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let taps = [(x0, y0, (1.0 - fx) * (1.0 - fy)),
                (x0 + 1.0, y0, fx * (1.0 - fy)),
                (x0, y0 + 1.0, (1.0 - fx) * fy),
                (x0 + 1.0, y0 + 1.0, fx * fy)];

    let mut acc = [0f64; 4];
    for &(tx, ty, weight) in &taps {
        if weight <= 0.0 || tx < 0.0 || ty < 0.0
                || tx >= img.width() as f64 || ty >= img.height() as f64 {
            continue;
        }
        let px = img.get_pixel(tx as u32, ty as u32);
        for (a, &c) in acc.iter_mut().zip(px.0.iter()) {
            *a += c as f64 * weight;
        }
    }
    Rgba(acc.map(|c| c.round().max(0.0).min(255.0) as u8))
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
