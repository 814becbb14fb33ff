//! Module implementing the actual CAPTCHA generation task.
//! Most if not all drawing logic is orchestrated here.

use std::ops::Deref;

use image::{RgbImage, RgbaImage};
use rand::{Rng, RngCore};

use crate::model::Palette;
use crate::resources::{FontFace, FontSource};
use super::composite;
use super::error::CaptchaError;
use super::filter;
use super::generator::{Config, Inner};
use super::glyph;
use super::layout::{self, Layout};
use super::noise::NoiseDrawer;


/// Represents a single generation task.
///
/// This is a separate struct so that the generation state
/// can be easily carried between its methods.
pub(super) struct CaptchaTask<'t> {
    text: &'t str,
    engine: &'t Inner,
    noise: &'t dyn NoiseDrawer,
}

impl<'t> Deref for CaptchaTask<'t> {
    type Target = Config;
    fn deref(&self) -> &Self::Target {
        &self.engine.config  // makes the drawing code a little terser
    }
}

impl<'t> CaptchaTask<'t> {
    #[inline]
    pub fn new(text: &'t str, engine: &'t Inner, noise: &'t dyn NoiseDrawer) -> Self {
        CaptchaTask{text, engine, noise}
    }
}

/// Glyphs of a CAPTCHA composited on the canvas, before noise & smoothing.
#[derive(Debug)]
pub(super) struct Composition {
    pub canvas: RgbImage,
    pub palette: Palette,
    pub layout: Layout,
    /// Font & size that each of the characters was drawn with.
    pub faces: Vec<(FontSource, f32)>,
}

impl<'t> CaptchaTask<'t> {
    /// Perform the generation task.
    pub fn perform(self, rng: &mut dyn RngCore) -> Result<RgbImage, CaptchaError> {
        let Composition{mut canvas, palette, ..} = self.compose(rng)?;

        trace!("Drawing noise...");
        self.noise.draw(&mut canvas, palette.foreground, rng);

        trace!("Smoothing the final image");
        Ok(filter::smooth(&canvas))
    }

    /// Draw the characters and composite them on a canvas
    /// of the final size.
    pub fn compose(&self, rng: &mut dyn RngCore) -> Result<Composition, CaptchaError> {
        if self.text.is_empty() {
            return Err(CaptchaError::EmptyText);
        }
        debug!("Generating {}x{} CAPTCHA of {} character(s)",
            self.width, self.height, self.text.chars().count());

        let faces = self.engine.fonts.faces()?;
        self.engine.fonts.check(self.text)?;

        let palette = Palette::random(rng);
        trace!("Using {} on {}", palette.foreground, palette.background);

        let mut glyphs = Vec::new();
        let mut used_faces = Vec::new();
        for ch in self.text.chars() {
            let face = Self::pick_face(faces, rng);
            glyphs.push(self.draw_character(ch, face, &palette, rng));
            used_faces.push((face.source.clone(), face.size));
        }

        let sizes: Vec<_> = glyphs.iter().map(|g| g.dimensions()).collect();
        let layout = layout::arrange(
            &sizes, self.dimensions(), self.rand_rate, self.offset_rate, rng);

        // The background is uniform, so stretching it is the same
        // as starting out with a wider canvas.
        let mut canvas = RgbImage::from_pixel(
            layout.canvas_width, self.height, palette.background.into());
        for (glyph, &position) in glyphs.iter().zip(&layout.positions) {
            let mask = composite::mask_for(glyph);
            composite::paste(&mut canvas, glyph, position, &mask);
        }

        if layout.is_stretched(self.width) {
            debug!("Squeezing canvas from {}x{} to {}x{}",
                layout.canvas_width, self.height, self.width, self.height);
            canvas = filter::squeeze(&canvas, self.width, self.height);
        }

        Ok(Composition{canvas, palette, layout, faces: used_faces})
    }

    /// Render a single character and rotate it randomly.
    fn draw_character(&self, ch: char, face: &FontFace,
                      palette: &Palette, rng: &mut dyn RngCore) -> RgbaImage {
        let rendered = glyph::render(ch, face, palette, rng);
        let angle = glyph::random_angle(rng);
        trace!("Rotating {:?} ({}x{}) by {:.1} degrees",
            ch, rendered.width(), rendered.height(), angle);
        glyph::rotate(&rendered, angle)
    }

    fn pick_face<'f>(faces: &'f [FontFace], rng: &mut dyn RngCore) -> &'f FontFace {
        // The builder makes sure there is at least one font & size.
        &faces[rng.gen_range(0..faces.len())]
    }
}


#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use spectral::prelude::*;

    use crate::captcha::generator::{Builder, Inner};
    use crate::captcha::noise::Noise;
    use crate::captcha::CaptchaError;
    use crate::resources::FontSource;
    use super::CaptchaTask;

    fn inner(builder: Builder) -> Inner {
        let generator = builder.build().unwrap();
        Inner::new(generator.config().clone())
    }

    #[test]
    fn one_glyph_per_character() {
        let engine = inner(Builder::new().font_sizes(vec![42.0]));
        let noise = vec![Noise::Line];
        let mut rng = StdRng::seed_from_u64(1);

        let composition = CaptchaTask::new("AB12", &engine, &noise).compose(&mut rng).unwrap();
        assert_that!(composition.canvas.dimensions()).is_equal_to((160, 60));
        assert_that!(composition.layout.positions.len()).is_equal_to(4);
        assert_that!(composition.faces).is_equal_to(vec![(FontSource::Bundled, 42.0); 4]);
    }

    #[test]
    fn faces_come_from_the_font_set() {
        let sizes = vec![30.0, 35.0, 40.0];
        let engine = inner(Builder::new().font_sizes(sizes.clone()));
        let noise = vec![Noise::Line];
        let mut rng = StdRng::seed_from_u64(2);

        let composition = CaptchaTask::new("xyzzy", &engine, &noise).compose(&mut rng).unwrap();
        assert_that!(composition.faces.len()).is_equal_to(5);
        for (source, size) in composition.faces {
            assert_that!(source).is_equal_to(FontSource::Bundled);
            assert_that!(sizes.contains(&size)).is_true();
        }
    }

    #[test]
    fn glyphs_are_on_the_canvas() {
        let engine = inner(Builder::new().no_noise());
        let noise: Vec<Noise> = vec![];
        let mut rng = StdRng::seed_from_u64(3);

        let composition = CaptchaTask::new("MW", &engine, &noise).compose(&mut rng).unwrap();
        let background = composition.palette.background.to_rgb();
        let inked = composition.canvas.pixels().filter(|&&p| p != background).count();
        assert_that!(inked).is_greater_than(0);
    }

    #[test]
    fn long_text_is_squeezed() {
        let engine = inner(Builder::new().font_sizes(vec![56.0]).rand_rate(0.0));
        let noise = vec![Noise::Line];
        let mut rng = StdRng::seed_from_u64(4);

        let composition = CaptchaTask::new("ABCDEFGHIJKL", &engine, &noise)
            .compose(&mut rng).unwrap();
        assert_that!(composition.layout.is_stretched(160)).is_true();
        assert_that!(composition.canvas.dimensions()).is_equal_to((160, 60));
    }

    #[test]
    fn empty_text() {
        let engine = inner(Builder::new());
        let noise = vec![Noise::Line];
        let mut rng = StdRng::seed_from_u64(5);

        match CaptchaTask::new("", &engine, &noise).perform(&mut rng) {
            Err(CaptchaError::EmptyText) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        // Fonts don't even get loaded.
        assert_that!(engine.fonts.is_loaded()).is_false();
    }
}
