//! Module handling the resources used for drawing CAPTCHAs.

mod filesystem;
mod fonts;


pub use self::filesystem::BytesLoader;
pub use self::fonts::{BUNDLED_FONT, Font, FontError, FontFace, FontLoader, FontSet, FontSource};


use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::util::cache::SharedCache;


/// Loader of resources from some external source.
pub trait Loader {
    /// Type of the key that identifies resources.
    type Key: ?Sized;
    /// Type of resources that this loader can load.
    type Item;
    /// Error that may occur while loading the resource.
    type Err;

    /// Load a resource identified by given key.
    fn load(&self, key: &Self::Key) -> Result<Self::Item, Self::Err>;
}


/// A loader that keeps a cache of resources previously loaded.
pub struct CachingLoader<L: Loader>
    where L::Key: Clone + Eq + Hash + Sized
{
    inner: L,
    cache: SharedCache<L::Key, L::Item>,
}

impl<L: Loader> CachingLoader<L>
    where L::Key: Clone + Eq + Hash + Sized
{
    #[inline]
    pub fn new(inner: L) -> Self {
        CachingLoader{inner, cache: SharedCache::new()}
    }

    #[inline]
    pub fn cache(&self) -> &SharedCache<L::Key, L::Item> {
        &self.cache
    }
}

impl<L: Loader> Loader for CachingLoader<L>
    where L::Key: Clone + Eq + Hash + Sized
{
    type Key = L::Key;
    type Item = Arc<L::Item>;
    type Err = L::Err;

    /// Load the object from cache or fall back on the original Loader.
    /// Cache the objects loaded this way.
    fn load(&self, key: &Self::Key) -> Result<Self::Item, Self::Err> {
        if let Some(obj) = self.cache.get(key) {
            return Ok(obj);
        }
        let obj = self.inner.load(key)?;
        Ok(self.cache.put(key.clone(), obj))
    }
}

impl<L: Loader> fmt::Debug for CachingLoader<L>
    where L::Key: Clone + Eq + Hash + Sized
{
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("CachingLoader")
            .field("inner", &"...")
            .field("cache", &self.cache)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use spectral::prelude::*;
    use super::{CachingLoader, Loader};

    /// Loader that counts how many times it was actually asked for something.
    struct CountingLoader {
        calls: Cell<usize>,
    }

    impl Loader for CountingLoader {
        type Key = String;
        type Item = usize;
        type Err = ();

        fn load(&self, key: &String) -> Result<usize, ()> {
            self.calls.set(self.calls.get() + 1);
            if key.is_empty() { Err(()) } else { Ok(key.len()) }
        }
    }

    #[test]
    fn loads_once_per_key() {
        let loader = CachingLoader::new(CountingLoader{calls: Cell::new(0)});
        for _ in 0..3 {
            assert_that!(loader.load(&"foo".to_owned()).map(|v| *v)).is_ok().is_equal_to(3);
        }
        assert_that!(loader.inner.calls.get()).is_equal_to(1);
        assert_that!(loader.cache().hits()).is_equal_to(2);
    }

    #[test]
    fn errors_are_not_cached() {
        let loader = CachingLoader::new(CountingLoader{calls: Cell::new(0)});
        assert_that!(loader.load(&String::new())).is_err();
        assert_that!(loader.load(&String::new())).is_err();
        assert_that!(loader.inner.calls.get()).is_equal_to(2);
        assert_that!(loader.cache().is_empty()).is_true();
    }
}
