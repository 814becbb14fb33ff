//! Defines the encoded output of CAPTCHA generation.

use std::collections::HashMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use image::ImageFormat;

use super::error::CaptchaError;


/// Image format that CAPTCHAs are encoded in unless told otherwise.
pub const DEFAULT_IMAGE_FORMAT: ImageFormat = ImageFormat::Png;

lazy_static! {
    /// Map of format names to supported image formats.
    pub static ref IMAGE_FORMAT_NAMES: HashMap<&'static str, ImageFormat> = hashmap!{
        "bmp" => ImageFormat::Bmp,
        "gif" => ImageFormat::Gif,
        "jpeg" => ImageFormat::Jpeg,
        "jpg" => ImageFormat::Jpeg,
        "png" => ImageFormat::Png,
    };
}

/// Find the image format with given name (like "png"), ignoring case.
pub fn format_for(name: &str) -> Result<ImageFormat, CaptchaError> {
    let key = name.trim().to_lowercase();
    IMAGE_FORMAT_NAMES.get(key.as_str()).cloned()
        .ok_or_else(|| CaptchaError::UnsupportedFormat(name.to_owned()))
}


/// Encoded CAPTCHA image.
///
/// It can be read from like a file, starting from the beginning of the image data.
#[derive(Clone, Debug)]
#[must_use = "unused CAPTCHA output which must be used"]
pub struct CaptchaOutput {
    format: ImageFormat,
    cursor: Cursor<Vec<u8>>,
}

impl CaptchaOutput {
    #[inline]
    pub(super) fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        CaptchaOutput{format, cursor: Cursor::new(bytes)}
    }
}

impl CaptchaOutput {
    /// Image format of the output.
    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The MIME type that matches output's format.
    #[inline]
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Raw bytes of the output, regardless of how much has been read already.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    /// Convert the output into a vector of bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl Read for CaptchaOutput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for CaptchaOutput {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl From<CaptchaOutput> for Vec<u8> {
    fn from(output: CaptchaOutput) -> Vec<u8> {
        output.into_bytes()
    }
}
