//! Module implementing the visual noise drawn over CAPTCHAs.

use std::f64::consts::PI;
use std::fmt;

use image::{Rgb, RgbImage};
use rand::{Rng, RngCore};

use crate::model::Color;


/// Default number of dots drawn by `Noise::Dots`.
pub const DEFAULT_DOT_COUNT: u32 = 30;
/// Default stroke width of dots drawn by `Noise::Dots`.
pub const DEFAULT_DOT_WIDTH: u32 = 3;


/// Something that can scribble noise over a finished CAPTCHA canvas.
///
/// This is the seam where an external noise-drawing facility
/// can be plugged into an `AlternateNoiseGenerator`.
pub trait NoiseDrawer: Send + Sync {
    /// Draw the noise on the canvas with given color.
    fn draw(&self, canvas: &mut RgbImage, color: Color, rng: &mut dyn RngCore);
}


/// Built-in kinds of noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Noise {
    /// A few connected line segments running across the canvas.
    Line,
    /// Elliptic arc spanning most of the canvas width.
    Curve,
    /// Short diagonal specks scattered around.
    Dots { number: u32, width: u32 },
}

impl Noise {
    /// Dots noise with default settings.
    #[inline]
    pub fn dots() -> Self {
        Noise::Dots{number: DEFAULT_DOT_COUNT, width: DEFAULT_DOT_WIDTH}
    }
}

impl Default for Noise {
    fn default() -> Self {
        Noise::Line
    }
}

impl fmt::Display for Noise {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Noise::Line => write!(fmt, "line"),
            Noise::Curve => write!(fmt, "curve"),
            Noise::Dots{number, width} => write!(fmt, "{}x dots ({}px)", number, width),
        }
    }
}

impl NoiseDrawer for Noise {
    fn draw(&self, canvas: &mut RgbImage, color: Color, rng: &mut dyn RngCore) {
        trace!("Drawing {} noise in {}", self, color);
        match *self {
            Noise::Line => draw_lines(canvas, color, rng),
            Noise::Curve => draw_curve(canvas, color, rng),
            Noise::Dots{number, width} => draw_dots(canvas, color, number, width, rng),
        }
    }
}

impl NoiseDrawer for [Noise] {
    fn draw(&self, canvas: &mut RgbImage, color: Color, rng: &mut dyn RngCore) {
        for noise in self {
            noise.draw(canvas, color, rng);
        }
    }
}

impl NoiseDrawer for Vec<Noise> {
    #[inline]
    fn draw(&self, canvas: &mut RgbImage, color: Color, rng: &mut dyn RngCore) {
        self[..].draw(canvas, color, rng)
    }
}


fn draw_lines(canvas: &mut RgbImage, color: Color, rng: &mut dyn RngCore) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let mut start = (rng.gen_range(0..=w), rng.gen_range(0..=h));
    for _ in 0..rng.gen_range(1..=4) {
        let end = (rng.gen_range(0..=w), rng.gen_range(0..=h));
        draw_line(canvas, start, end, color, 1);
        start = end;
    }
}

fn draw_curve(canvas: &mut RgbImage, color: Color, rng: &mut dyn RngCore) {
    let (bbox, start, end) = curve_params(canvas.width(), canvas.height(), rng);
    draw_arc(canvas, bbox, start, end, color);
}

/// Pick the bounding box and the start & end angles of a curve
/// spanning most of a `width`x`height` canvas.
fn curve_params(width: u32, height: u32,
                rng: &mut dyn RngCore) -> ((i64, i64, i64, i64), f64, f64) {
    let (w, h) = (width as i64, height as i64);
    let x1 = rng.gen_range(0..=w / 5);
    let x2 = rng.gen_range((w - w / 5)..=w);
    let y1 = rng.gen_range(h / 5..=(h - h / 5));
    let y2 = rng.gen_range(y1..=(h - h / 5));
    let start = rng.gen_range(0..=20);
    let end = rng.gen_range(160..=200);
    ((x1, y1, x2, y2), start as f64, end as f64)
}

fn draw_dots(canvas: &mut RgbImage, color: Color,
             number: u32, width: u32, rng: &mut dyn RngCore) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    for _ in 0..number {
        let (x, y) = (rng.gen_range(0..=w), rng.gen_range(0..=h));
        draw_line(canvas, (x, y), (x - 1, y - 1), color, width);
    }
}


/// Draw a straight line, `width` pixels thick, clipped to the canvas.
pub fn draw_line(canvas: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64),
                 color: Color, width: u32) {
    let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
    let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);
    loop {
        stamp(canvas, x, y, color, width);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x += sx; }
        if e2 <= dx { err += dx; y += sy; }
    }
}

/// Draw an arc of the ellipse inscribed in given bounding box.
///
/// Angles are in degrees, measured clockwise from the 3 o'clock direction.
pub fn draw_arc(canvas: &mut RgbImage, (x1, y1, x2, y2): (i64, i64, i64, i64),
                start: f64, end: f64, color: Color) {
    let (cx, cy) = ((x1 + x2) as f64 / 2.0, (y1 + y2) as f64 / 2.0);
    let (rx, ry) = ((x2 - x1) as f64 / 2.0, (y2 - y1) as f64 / 2.0);
    let point_at = |degrees: f64| {
        let t = degrees * PI / 180.0;
        ((cx + rx * t.cos()).round() as i64, (cy + ry * t.sin()).round() as i64)
    };

    let steps = (end - start).abs().ceil().max(1.0) as usize;
    let mut prev = point_at(start);
    for i in 1..=steps {
        let angle = start + (end - start) * i as f64 / steps as f64;
        let next = point_at(angle);
        draw_line(canvas, prev, next, color, 1);
        prev = next;
    }
}

/// Paint a `width`x`width` square centered at given point.
fn stamp(canvas: &mut RgbImage, x: i64, y: i64, color: Color, width: u32) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let reach = width.max(1) as i64;
    let lo = -(reach - 1) / 2;
    for py in (y + lo)..(y + lo + reach) {
        for px in (x + lo)..(x + lo + reach) {
            if px >= 0 && py >= 0 && px < w && py < h {
                canvas.put_pixel(px as u32, py as u32, Rgb::from(color));
            }
        }
    }
}
