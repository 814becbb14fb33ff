//! Module for loading fonts used to draw CAPTCHA characters.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rusttype::{self, GlyphId, Scale};
use thiserror::Error;

use crate::util::cache::SharedCache;
use super::{BytesLoader, CachingLoader, Loader};


/// Contents of the font that is used when no other font has been configured.
pub const BUNDLED_FONT: &[u8] = include_bytes!("../../data/DejaVuSansMono.ttf");


/// Where a font is loaded from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FontSource {
    /// The font bundled with the crate (DejaVu Sans Mono).
    Bundled,
    /// TrueType font file at given path.
    File(PathBuf),
}

impl Default for FontSource {
    fn default() -> Self {
        FontSource::Bundled
    }
}

impl From<PathBuf> for FontSource {
    fn from(path: PathBuf) -> Self {
        FontSource::File(path)
    }
}
impl<'p> From<&'p Path> for FontSource {
    fn from(path: &'p Path) -> Self {
        FontSource::File(path.to_owned())
    }
}
impl<'s> From<&'s str> for FontSource {
    fn from(path: &'s str) -> Self {
        FontSource::File(path.into())
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FontSource::Bundled => write!(fmt, "<bundled>"),
            FontSource::File(ref path) => write!(fmt, "{}", path.display()),
        }
    }
}


/// Font that can be used to draw CAPTCHA characters.
#[derive(Clone)]
pub struct Font(rusttype::Font<'static>);

impl Deref for Font {
    type Target = rusttype::Font<'static>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "Font({} glyphs)", self.0.glyph_count())
    }
}


/// Error that may occur while loading a font.
///
/// It is `Clone` because a `FontSet` remembers its loading failure
/// and hands it out on every subsequent use.
#[derive(Clone, Debug, Error)]
pub enum FontError {
    /// Font file couldn't be read.
    #[error("cannot read font `{font}`: {message}")]
    Io { font: FontSource, message: String },
    /// Font data couldn't be parsed.
    #[error("malformed font data in `{font}`")]
    Malformed { font: FontSource },
}


/// Loader of fonts from their sources.
#[derive(Debug, Default)]
pub struct FontLoader {
    inner: BytesLoader,
}

impl FontLoader {
    #[inline]
    pub fn new() -> Self {
        FontLoader::default()
    }
}

impl Loader for FontLoader {
    type Key = FontSource;
    type Item = Font;
    type Err = FontError;

    fn load(&self, source: &FontSource) -> Result<Font, FontError> {
        let font = match *source {
            FontSource::Bundled => rusttype::Font::try_from_bytes(BUNDLED_FONT),
            FontSource::File(ref path) => {
                let bytes = self.inner.load(path).map_err(|e| {
                    error!("Failed to read font file {}: {}", path.display(), e);
                    FontError::Io{font: source.clone(), message: e.to_string()}
                })?;
                rusttype::Font::try_from_vec(bytes)
            }
        };
        match font {
            Some(font) => {
                debug!("Font `{}` loaded successfully", source);
                Ok(Font(font))
            }
            None => {
                error!("No usable font in `{}`", source);
                Err(FontError::Malformed{font: source.clone()})
            }
        }
    }
}


/// A loaded font at a particular size.
#[derive(Clone, Debug)]
pub struct FontFace {
    pub source: FontSource,
    pub font: Arc<Font>,
    pub size: f32,
}

impl FontFace {
    #[inline]
    pub fn scale(&self) -> Scale {
        Scale::uniform(self.size)
    }

    /// Whether the font has an actual glyph for given character.
    #[inline]
    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.glyph(ch).id() != GlyphId(0)
    }
}


/// Every combination of configured font sources and sizes.
///
/// The faces are loaded lazily on first use, exactly once,
/// even if the set is shared between threads.
/// A loading failure is permanent for the given `FontSet`.
pub struct FontSet {
    sources: Vec<FontSource>,
    sizes: Vec<f32>,
    loader: CachingLoader<FontLoader>,
    faces: OnceCell<Result<Vec<FontFace>, FontError>>,
}

impl FontSet {
    pub fn new(sources: Vec<FontSource>, sizes: Vec<f32>) -> Self {
        FontSet{
            sources,
            sizes,
            loader: CachingLoader::new(FontLoader::new()),
            faces: OnceCell::new(),
        }
    }
}

impl FontSet {
    /// Return all the font faces, loading them if necessary.
    pub fn faces(&self) -> Result<&[FontFace], FontError> {
        match self.faces.get_or_init(|| self.load_all()) {
            Ok(faces) => Ok(&faces[..]),
            Err(e) => Err(e.clone()),
        }
    }

    /// Whether the faces have been loaded (successfully or not).
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.faces.get().is_some()
    }

    /// Cache of parsed fonts, shared between the sizes of each font.
    #[inline]
    pub fn cache(&self) -> &SharedCache<FontSource, Font> {
        self.loader.cache()
    }

    /// Warn about characters that some of the fonts cannot draw.
    pub fn check(&self, text: &str) -> Result<(), FontError> {
        // Faces are ordered by source first, so this visits each font once.
        let faces = self.faces()?;
        for face in faces.iter().step_by(self.sizes.len().max(1)) {
            let missing: BTreeSet<_> = text.chars()
                .filter(|&ch| !face.has_glyph(ch))
                .map(|ch| format!("{:#x}", ch as u32))
                .collect();
            if !missing.is_empty() {
                warn!("Font `{}` is missing glyphs for {} codepoint(s): {}",
                    face.source, missing.len(),
                    missing.into_iter().collect::<Vec<_>>().join(", "));
            }
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<FontFace>, FontError> {
        debug!("Loading {} font(s) in {} size(s)", self.sources.len(), self.sizes.len());
        let mut faces = Vec::with_capacity(self.sources.len() * self.sizes.len());
        for source in &self.sources {
            for &size in &self.sizes {
                let font = self.loader.load(source)?;
                faces.push(FontFace{source: source.clone(), font, size});
            }
        }
        trace!("Loaded {} font face(s)", faces.len());
        Ok(faces)
    }
}

impl fmt::Debug for FontSet {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("FontSet")
            .field("sources", &self.sources)
            .field("sizes", &self.sizes)
            .field("loaded", &self.is_loaded())
            .field("cache", self.cache())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use spectral::prelude::*;
    use crate::resources::Loader;
    use super::{FontError, FontLoader, FontSet, FontSource};

    #[test]
    fn bundled_font_loads() {
        let font = FontLoader::new().load(&FontSource::Bundled);
        assert_that!(font).is_ok();
    }

    #[test]
    fn cross_product_of_sources_and_sizes() {
        let set = FontSet::new(vec![FontSource::Bundled], vec![42.0, 50.0, 56.0]);
        assert_that!(set.is_loaded()).is_false();

        let faces = set.faces().unwrap();
        let sizes: Vec<_> = faces.iter().map(|f| f.size).collect();
        assert_that!(sizes).is_equal_to(vec![42.0, 50.0, 56.0]);

        // The font file itself is only parsed once.
        assert_that!(set.cache().len()).is_equal_to(1);
        assert_that!(set.cache().misses()).is_equal_to(1);
        assert_that!(set.cache().hits()).is_equal_to(2);
    }

    #[test]
    fn faces_are_memoized() {
        let set = FontSet::new(vec![FontSource::Bundled], vec![42.0]);
        let first = set.faces().unwrap().as_ptr();
        let second = set.faces().unwrap().as_ptr();
        assert_that!(first).is_equal_to(second);
        assert_that!(set.cache().misses()).is_equal_to(1);
    }

    #[test]
    fn missing_font_file() {
        let set = FontSet::new(vec![FontSource::Bundled, "/no/such/font.ttf".into()],
                               vec![42.0]);
        match set.faces() {
            Err(FontError::Io{font, ..}) => {
                assert_that!(font).is_equal_to(FontSource::from("/no/such/font.ttf"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // The failure sticks.
        assert_that!(set.is_loaded()).is_true();
        assert_that!(set.faces()).is_err();
    }

    #[test]
    fn malformed_font_file() {
        let manifest = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let result = FontLoader::new().load(&FontSource::from(manifest));
        match result {
            Err(FontError::Malformed{..}) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
