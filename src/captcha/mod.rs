//! Module implementing CAPTCHA generation.

mod composite;
mod error;
mod filter;
mod generator;
mod glyph;
mod layout;
mod noise;
mod output;
mod task;



pub use self::composite::OPACITY_TABLE;
pub use self::error::CaptchaError;
pub use self::generator::{AlternateNoiseGenerator,
                          Builder as GeneratorBuilder,
                          BuildError as GeneratorBuildError,
                          Config as GeneratorConfig,
                          ImageGenerator,
                          StandardGenerator,
                          DEFAULT_FONT_SIZES, DEFAULT_HEIGHT, DEFAULT_OFFSET_RATE,
                          DEFAULT_RAND_RATE, DEFAULT_WIDTH};
pub use self::glyph::MAX_ROTATION;
pub use self::noise::{Noise, NoiseDrawer, DEFAULT_DOT_COUNT, DEFAULT_DOT_WIDTH};
pub use self::output::{CaptchaOutput, DEFAULT_IMAGE_FORMAT, IMAGE_FORMAT_NAMES, format_for};
