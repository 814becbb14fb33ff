//! Module with CAPTCHA generator configuration.

use crate::captcha::noise::Noise;
use crate::resources::FontSource;


/// Default width of generated images.
pub const DEFAULT_WIDTH: u32 = 160;
/// Default height of generated images.
pub const DEFAULT_HEIGHT: u32 = 60;
/// Font sizes used by default.
pub const DEFAULT_FONT_SIZES: &[f32] = &[42.0, 50.0, 56.0];
/// Default maximum gap between characters, relative to their average width.
pub const DEFAULT_RAND_RATE: f64 = 0.25;
/// Default offset of the first character, relative to average character width.
pub const DEFAULT_OFFSET_RATE: f64 = 0.1;


/// Structure holding configuration of a generator.
///
/// This is shared with the generation tasks and never changes
/// once the generator has been built.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Width of the final image.
    pub width: u32,
    /// Height of the final image.
    pub height: u32,
    /// Fonts that the characters are randomly drawn with.
    pub fonts: Vec<FontSource>,
    /// Sizes that the characters are randomly drawn in.
    pub font_sizes: Vec<f32>,
    /// Maximum extra gap between characters, as a fraction of their average width.
    pub rand_rate: f64,
    /// Offset of the first character from the left edge,
    /// as a fraction of average character width.
    pub offset_rate: f64,
    /// Noise drawn over the characters.
    pub noise: Vec<Noise>,
}

impl Config {
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for Config {
    /// Initialize Config with default values.
    fn default() -> Self {
        Config {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fonts: vec![FontSource::Bundled],
            font_sizes: DEFAULT_FONT_SIZES.to_vec(),
            rand_rate: DEFAULT_RAND_RATE,
            offset_rate: DEFAULT_OFFSET_RATE,
            noise: vec![Noise::Line],
        }
    }
}
