//! Module which defines the CAPTCHA generators.

mod builder;
mod config;

pub use self::builder::{Builder, Error as BuildError};
pub use self::config::{Config,
                       DEFAULT_FONT_SIZES, DEFAULT_HEIGHT, DEFAULT_OFFSET_RATE,
                       DEFAULT_RAND_RATE, DEFAULT_WIDTH};


use std::fmt;
use std::io::{Cursor, Write};
use std::sync::Arc;

use image::{ImageFormat, RgbImage};
use rand::{self, RngCore};

use crate::resources::{FontError, FontSet};
use super::error::CaptchaError;
use super::noise::NoiseDrawer;
use super::output::CaptchaOutput;
use super::task::CaptchaTask;


/// Common interface of CAPTCHA generators.
pub trait ImageGenerator {
    /// Generate the CAPTCHA image of given text, drawing randomness from `rng`.
    ///
    /// The image is always exactly as large as the generator is configured for.
    fn generate_image_with(&self, text: &str, rng: &mut dyn RngCore) -> Result<RgbImage, CaptchaError>;

    /// Generate the CAPTCHA image of given text.
    #[inline]
    fn generate_image(&self, text: &str) -> Result<RgbImage, CaptchaError> {
        self.generate_image_with(text, &mut rand::thread_rng())
    }

    /// Generate the CAPTCHA of given text, encoded in given image format,
    /// drawing randomness from `rng`.
    fn generate_with(&self, text: &str, format: ImageFormat,
                     rng: &mut dyn RngCore) -> Result<CaptchaOutput, CaptchaError> {
        let img = self.generate_image_with(text, rng)?;
        encode(&img, format)
    }

    /// Generate the CAPTCHA of given text, encoded in given image format.
    #[inline]
    fn generate(&self, text: &str, format: ImageFormat) -> Result<CaptchaOutput, CaptchaError> {
        self.generate_with(text, format, &mut rand::thread_rng())
    }

    /// Generate the CAPTCHA of given text and write it, encoded, to `output`,
    /// drawing randomness from `rng`.
    fn write_with(&self, text: &str, output: &mut dyn Write, format: ImageFormat,
                  rng: &mut dyn RngCore) -> Result<(), CaptchaError> {
        let encoded = self.generate_with(text, format, rng)?;
        output.write_all(encoded.bytes())?;
        Ok(())
    }

    /// Generate the CAPTCHA of given text and write it, encoded, to `output`.
    #[inline]
    fn write(&self, text: &str, output: &mut dyn Write, format: ImageFormat) -> Result<(), CaptchaError> {
        self.write_with(text, output, format, &mut rand::thread_rng())
    }
}

/// Encode the image in given format.
pub(super) fn encode(img: &RgbImage, format: ImageFormat) -> Result<CaptchaOutput, CaptchaError> {
    debug!("Encoding final image as {:?}...", format);
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format)?;
    trace!("Encoded image takes {} bytes", buffer.get_ref().len());
    Ok(CaptchaOutput::new(format, buffer.into_inner()))
}


/// State shared by a generator and its generation tasks.
#[derive(Debug)]
pub(super) struct Inner {
    pub config: Config,
    pub fonts: FontSet,
}

impl Inner {
    #[inline]
    pub fn new(config: Config) -> Self {
        let fonts = FontSet::new(config.fonts.clone(), config.font_sizes.clone());
        Inner{config, fonts}
    }
}


/// The standard CAPTCHA generator.
///
/// The generator is thread-safe (`Sync`); fonts are loaded only once,
/// when the first CAPTCHA is generated (or `preload_fonts` is called).
///
/// *Note*: `StandardGenerator` implements `Clone`
/// by merely cloning a shared reference to the underlying object.
#[derive(Clone, Debug)]
pub struct StandardGenerator {
    inner: Arc<Inner>,
}

impl From<Inner> for StandardGenerator {
    fn from(inner: Inner) -> Self {
        StandardGenerator{inner: Arc::new(inner)}
    }
}

impl Default for StandardGenerator {
    fn default() -> Self {
        StandardGenerator::from(Inner::new(Config::default()))
    }
}

impl StandardGenerator {
    /// Create a generator with default configuration.
    ///
    /// For other ways of creating `StandardGenerator`, see the `Builder`.
    #[inline]
    pub fn new() -> Self {
        StandardGenerator::default()
    }

    #[inline]
    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl StandardGenerator {
    /// Configuration of the generator.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Fonts of the generator.
    /// This can be used to examine font cache statistics (hits & misses).
    #[inline]
    pub fn font_set(&self) -> &FontSet {
        &self.inner.fonts
    }

    /// Load all the fonts right away, rather than on first use.
    pub fn preload_fonts(&self) -> Result<(), FontError> {
        self.inner.fonts.faces().map(|_| ())
    }
}

impl ImageGenerator for StandardGenerator {
    fn generate_image_with(&self, text: &str, rng: &mut dyn RngCore) -> Result<RgbImage, CaptchaError> {
        CaptchaTask::new(text, &self.inner, &self.inner.config.noise).perform(rng)
    }
}


/// CAPTCHA generator which uses an external drawer for the noise.
///
/// Characters are rendered & laid out the same way as by `StandardGenerator`.
#[derive(Clone)]
pub struct AlternateNoiseGenerator {
    inner: Arc<Inner>,
    drawer: Arc<dyn NoiseDrawer>,
}

impl AlternateNoiseGenerator {
    #[inline]
    pub(super) fn from_parts(inner: Inner, drawer: Arc<dyn NoiseDrawer>) -> Self {
        AlternateNoiseGenerator{inner: Arc::new(inner), drawer}
    }

    /// Create a generator with default configuration and given noise drawer.
    #[inline]
    pub fn new(drawer: Arc<dyn NoiseDrawer>) -> Self {
        Self::from_parts(Inner::new(Config::default()), drawer)
    }
}

impl AlternateNoiseGenerator {
    /// Configuration of the generator.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Load all the fonts right away, rather than on first use.
    pub fn preload_fonts(&self) -> Result<(), FontError> {
        self.inner.fonts.faces().map(|_| ())
    }
}

impl ImageGenerator for AlternateNoiseGenerator {
    fn generate_image_with(&self, text: &str, rng: &mut dyn RngCore) -> Result<RgbImage, CaptchaError> {
        CaptchaTask::new(text, &self.inner, &*self.drawer).perform(rng)
    }
}

impl fmt::Debug for AlternateNoiseGenerator {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("AlternateNoiseGenerator")
            .field("inner", &self.inner)
            .field("drawer", &"...")
            .finish()
    }
}
