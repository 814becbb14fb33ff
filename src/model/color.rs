//! Module implementing the `Color` type and the color policy of CAPTCHAs.

use std::fmt;

use image::{Rgb, Rgba};
use rand::Rng;


/// Lightness range of the background channels.
const BACKGROUND_RANGE: (u8, u8) = (238, 255);
/// Range of foreground (text & noise) channels.
const FOREGROUND_RANGE: (u8, u8) = (0, 200);
/// Range of the foreground opacity.
const OPACITY_RANGE: (u8, u8) = (220, 255);


/// RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Create a gray color of given intensity.
    #[inline]
    pub fn gray(value: u8) -> Self {
        Color(value, value, value)
    }

    /// Create a random color with every channel drawn independently
    /// from the `start..=end` range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, start: u8, end: u8) -> Self {
        Color(rng.gen_range(start..=end),
              rng.gen_range(start..=end),
              rng.gen_range(start..=end))
    }
}

impl Color {
    #[inline]
    pub(crate) fn to_rgb(self) -> Rgb<u8> {
        let Color(r, g, b) = self;
        Rgb([r, g, b])
    }

    #[inline]
    pub(crate) fn to_rgba(self, alpha: u8) -> Rgba<u8> {
        let Color(r, g, b) = self;
        Rgba([r, g, b, alpha])
    }
}

impl From<Color> for Rgb<u8> {
    #[inline]
    fn from(color: Color) -> Rgb<u8> {
        color.to_rgb()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let &Color(r, g, b) = self;
        write!(fmt, "#{:0>2x}{:0>2x}{:0>2x}", r, g, b)
    }
}


/// Colors that a single CAPTCHA is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Light color the canvas is filled with.
    pub background: Color,
    /// Dark(er) color of the characters and the noise.
    pub foreground: Color,
    /// Opacity of the foreground.
    ///
    /// It only shows up in the glyph buffers; noise is drawn directly
    /// on the opaque canvas where it has no effect.
    pub opacity: u8,
}

impl Palette {
    /// Pick a random palette: a light background and a contrasting foreground.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let background = Color::random(rng, BACKGROUND_RANGE.0, BACKGROUND_RANGE.1);
        let foreground = Color::random(rng, FOREGROUND_RANGE.0, FOREGROUND_RANGE.1);
        let opacity = rng.gen_range(OPACITY_RANGE.0..=OPACITY_RANGE.1);
        Palette{background, foreground, opacity}
    }

    /// Foreground color together with its opacity.
    #[inline]
    pub fn foreground_rgba(&self) -> Rgba<u8> {
        self.foreground.to_rgba(self.opacity)
    }
}
