//! Module implementing the loader of raw file contents.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::Loader;


/// Loader that reads the entire content of files at given paths.
///
/// Wrappers around this loader can then implement their own decoding.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesLoader;

impl BytesLoader {
    #[inline]
    pub fn new() -> Self {
        BytesLoader
    }
}

impl Loader for BytesLoader {
    type Key = Path;
    type Item = Vec<u8>;
    type Err = io::Error;

    /// Load a file as its byte content.
    fn load(&self, path: &Path) -> Result<Self::Item, Self::Err> {
        trace!("Reading file {}", path.display());
        let file = File::open(path)?;

        let mut bytes = match file.metadata() {
            Ok(stat) => Vec::with_capacity(stat.len() as usize),
            Err(e) => {
                warn!("Failed to stat file {} to obtain its size: {}", path.display(), e);
                Vec::new()
            },
        };

        let mut reader = BufReader::new(file);
        reader.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
