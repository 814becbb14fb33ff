//! Module implementing the builder for CAPTCHA generators.

use std::sync::Arc;

use thiserror::Error;

use crate::captcha::noise::{Noise, NoiseDrawer};
use crate::resources::FontSource;
use super::config::Config;
use super::{AlternateNoiseGenerator, ImageGenerator, Inner, StandardGenerator};


/// Builder for CAPTCHA generators.
///
/// Every setting left unset falls back to its `Config::default()` value.
#[derive(Debug, Default)]
#[must_use = "unused builder which must be used"]
pub struct Builder {
    errors: Vec<Error>,

    width: Option<u32>,
    height: Option<u32>,
    fonts: Option<Vec<FontSource>>,
    font_sizes: Option<Vec<f32>>,
    rand_rate: Option<f64>,
    offset_rate: Option<f64>,
    noise: Option<Vec<Noise>>,
}

impl Builder {
    /// Create a new `Builder`.
    #[inline]
    pub fn new() -> Self {
        Builder::default()
    }
}

// Setters.
impl Builder {
    /// Set the width of generated images.
    #[inline]
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width); self
    }

    /// Set the height of generated images.
    #[inline]
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height); self
    }

    /// Set both dimensions of generated images.
    #[inline]
    pub fn size(self, width: u32, height: u32) -> Self {
        self.width(width).height(height)
    }

    /// Add a font that the characters may be drawn with.
    ///
    /// Once any font has been added, the bundled one is no longer used
    /// unless it's explicitly added as `FontSource::Bundled`.
    #[inline]
    pub fn font<F: Into<FontSource>>(mut self, font: F) -> Self {
        self.fonts.get_or_insert_with(Vec::new).push(font.into()); self
    }

    /// Set all the fonts that the characters may be drawn with.
    #[inline]
    pub fn fonts<I, F>(mut self, fonts: I) -> Self
        where I: IntoIterator<Item=F>, F: Into<FontSource>
    {
        self.fonts = Some(fonts.into_iter().map(Into::into).collect()); self
    }

    /// Add a size that the characters may be drawn in.
    pub fn font_size(mut self, size: f32) -> Self {
        if !is_valid_font_size(size) {
            return self.err(Error::InvalidFontSize(size));
        }
        self.font_sizes.get_or_insert_with(Vec::new).push(size); self
    }

    /// Set all the sizes that the characters may be drawn in.
    pub fn font_sizes<I: IntoIterator<Item=f32>>(mut self, sizes: I) -> Self {
        let sizes: Vec<_> = sizes.into_iter().collect();
        if let Some(&size) = sizes.iter().find(|&&s| !is_valid_font_size(s)) {
            return self.err(Error::InvalidFontSize(size));
        }
        self.font_sizes = Some(sizes); self
    }

    /// Set the maximum random gap between characters,
    /// as a fraction of their average width.
    pub fn rand_rate(mut self, rate: f64) -> Self {
        if !is_valid_rate(rate) {
            return self.err(Error::invalid_rate("rand_rate", rate));
        }
        self.rand_rate = Some(rate); self
    }

    /// Set the offset of the first character from the left edge,
    /// as a fraction of average character width.
    pub fn offset_rate(mut self, rate: f64) -> Self {
        if !is_valid_rate(rate) {
            return self.err(Error::invalid_rate("offset_rate", rate));
        }
        self.offset_rate = Some(rate); self
    }

    /// Add a kind of noise to draw over the characters.
    #[inline]
    pub fn noise(mut self, noise: Noise) -> Self {
        self.noise.get_or_insert_with(Vec::new).push(noise); self
    }

    /// Don't draw any noise over the characters.
    #[inline]
    pub fn no_noise(mut self) -> Self {
        self.noise = Some(vec![]); self
    }
}

// Validation & building.
impl Builder {
    /// Build the standard generator.
    pub fn build(self) -> Result<StandardGenerator, Error> {
        let config = self.build_config()?;
        Ok(StandardGenerator::from(Inner::new(config)))
    }

    /// Build a generator which delegates drawing the noise
    /// to given external drawer.
    ///
    /// Noise configured through `Builder::noise` is ignored in this case.
    pub fn build_alternate(self, drawer: Arc<dyn NoiseDrawer>) -> Result<AlternateNoiseGenerator, Error> {
        let config = self.build_config()?;
        Ok(AlternateNoiseGenerator::from_parts(Inner::new(config), drawer))
    }

    /// Build the alternate generator if a noise drawer is available,
    /// or the standard one otherwise.
    pub fn build_with_drawer(self, drawer: Option<Arc<dyn NoiseDrawer>>) -> Result<Box<dyn ImageGenerator + Send + Sync>, Error> {
        let generator: Box<dyn ImageGenerator + Send + Sync> = match drawer {
            Some(drawer) => Box::new(self.build_alternate(drawer)?),
            None => Box::new(self.build()?),
        };
        Ok(generator)
    }
}

// Utilities for validation & building.
impl Builder {
    #[doc(hidden)]
    fn build_config(self) -> Result<Config, Error> {
        self.check_errors()?;

        let defaults = Config::default();
        let config = Config{
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            fonts: self.fonts.unwrap_or(defaults.fonts),
            font_sizes: self.font_sizes.unwrap_or(defaults.font_sizes),
            rand_rate: self.rand_rate.unwrap_or(defaults.rand_rate),
            offset_rate: self.offset_rate.unwrap_or(defaults.offset_rate),
            noise: self.noise.unwrap_or(defaults.noise),
        };

        if config.width == 0 || config.height == 0 {
            return Err(Error::InvalidSize{width: config.width, height: config.height});
        }
        if config.fonts.is_empty() {
            return Err(Error::NoFonts);
        }
        if config.font_sizes.is_empty() {
            return Err(Error::NoFontSizes);
        }
        Ok(config)
    }

    #[doc(hidden)]
    fn check_errors(&self) -> Result<(), Error> {
        match self.errors.first() {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    #[doc(hidden)]
    fn err(mut self, error: Error) -> Self {
        self.errors.push(error); self
    }
}

#[inline]
fn is_valid_font_size(size: f32) -> bool {
    size.is_finite() && size > 0.0
}

#[inline]
fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate >= 0.0
}


/// Error that resulted from misconfiguration of a generator via its `Builder`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// One of the image dimensions is zero.
    #[error("image dimensions must be positive, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Font list is empty.
    #[error("no fonts configured")]
    NoFonts,

    /// Font size list is empty.
    #[error("no font sizes configured")]
    NoFontSizes,

    /// Font size that isn't a positive number.
    #[error("invalid font size: {0}")]
    InvalidFontSize(f32),

    /// Spacing rate that isn't a non-negative number.
    #[error("invalid {name}: {value}")]
    InvalidRate { name: &'static str, value: f64 },
}

impl Error {
    #[inline]
    pub(super) fn invalid_rate(name: &'static str, value: f64) -> Self {
        Error::InvalidRate{name, value}
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use spectral::prelude::*;

    use crate::captcha::noise::{Noise, NoiseDrawer};
    use crate::resources::FontSource;
    use super::{Builder, Error};

    #[test]
    fn defaults() {
        let generator = Builder::new().build().unwrap();
        let config = generator.config();
        assert_that!(config.dimensions()).is_equal_to((160, 60));
        assert_that!(config.fonts).is_equal_to(vec![FontSource::Bundled]);
        assert_that!(config.font_sizes).is_equal_to(vec![42.0, 50.0, 56.0]);
        assert_that!(config.rand_rate).is_equal_to(0.25);
        assert_that!(config.offset_rate).is_equal_to(0.1);
        assert_that!(config.noise).is_equal_to(vec![Noise::Line]);
    }

    #[test]
    fn custom_settings() {
        let generator = Builder::new()
            .size(200, 75)
            .font("/some/font.ttf").font(FontSource::Bundled)
            .font_sizes(vec![35.0, 37.0])
            .rand_rate(0.0).offset_rate(1.0)
            .noise(Noise::Curve).noise(Noise::dots())
            .build().unwrap();
        let config = generator.config();
        assert_that!(config.dimensions()).is_equal_to((200, 75));
        assert_that!(config.fonts.len()).is_equal_to(2);
        assert_that!(config.font_sizes).is_equal_to(vec![35.0, 37.0]);
        assert_that!(config.noise.len()).is_equal_to(2);
    }

    #[test]
    fn empty_fonts() {
        let result = Builder::new().fonts(Vec::<FontSource>::new()).build();
        assert_that!(result.err()).is_equal_to(Some(Error::NoFonts));
    }

    #[test]
    fn empty_font_sizes() {
        let result = Builder::new().font_sizes(vec![]).build();
        assert_that!(result.err()).is_equal_to(Some(Error::NoFontSizes));
    }

    #[test]
    fn zero_dimensions() {
        let result = Builder::new().width(0).build();
        assert_that!(result.err()).is_equal_to(Some(Error::InvalidSize{width: 0, height: 60}));
        let result = Builder::new().height(0).build();
        assert_that!(result.err()).is_equal_to(Some(Error::InvalidSize{width: 160, height: 0}));
    }

    #[test]
    fn invalid_values_are_reported_first() {
        let result = Builder::new()
            .rand_rate(-1.0)
            .font_size(0.0)
            .fonts(Vec::<FontSource>::new())
            .build();
        assert_that!(result.err()).is_equal_to(Some(Error::invalid_rate("rand_rate", -1.0)));

        let result = Builder::new().font_sizes(vec![42.0, f32::NAN]).build();
        assert_that!(result.is_err()).is_true();
        let result = Builder::new().offset_rate(f64::INFINITY).build();
        assert_that!(result.is_err()).is_true();
    }

    #[test]
    fn variant_depends_on_drawer() {
        let standard = Builder::new().build_with_drawer(None);
        assert_that!(standard.is_ok()).is_true();
        let drawer: Arc<dyn NoiseDrawer> = Arc::new(Noise::Curve);
        let alternate = Builder::new().build_with_drawer(Some(drawer.clone()));
        assert_that!(alternate.is_ok()).is_true();
        let invalid = Builder::new().width(0).build_with_drawer(Some(drawer));
        assert_that!(invalid.is_err()).is_true();
    }
}
