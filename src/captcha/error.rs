//! CAPTCHA generation error.

use std::io;

use image::ImageError;
use thiserror::Error;

use crate::resources::FontError;


/// Error that may occur while generating a CAPTCHA.
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// There were no characters to draw.
    #[error("cannot generate a CAPTCHA for empty text")]
    EmptyText,
    /// Fonts of the generator couldn't be loaded.
    #[error("cannot load fonts: {0}")]
    Font(#[from] FontError),
    /// Image format name wasn't recognized.
    #[error("unsupported image format `{0}`")]
    UnsupportedFormat(String),
    /// Final image couldn't be encoded.
    #[error("failed to encode the final image: {0}")]
    Encode(#[from] ImageError),
    /// Encoded image couldn't be written out.
    #[error("failed to write the final image: {0}")]
    Io(#[from] io::Error),
}
