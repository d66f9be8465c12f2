//! Cache of embedded image data URIs.
//!
//! Every presented frame embeds each image as a base64 PNG. Encoding is by far
//! the most expensive part of building a frame, so the encoded URI is kept per
//! object and reused until the object leaves the scene. Replacing an image
//! always produces a new object ID, so a cached entry never goes stale while
//! its object is alive.

use std::collections::HashMap;
use std::sync::Arc;

use snapstyle_core::{ObjectId, RasterImage, Scene};
use tracing::trace;

use crate::error::RenderResult;
use crate::image::to_data_uri;

#[derive(Debug)]
struct CacheEntry {
    href: Arc<str>,
    width: u32,
    height: u32,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that had to encode.
    pub misses: u64,
    /// Entries dropped because their object left the scene.
    pub evictions: u64,
}

/// Data URIs of embedded images, keyed by object.
#[derive(Debug, Default)]
pub struct ImageHrefCache {
    entries: HashMap<ObjectId, CacheEntry>,
    stats: CacheStats,
}

impl ImageHrefCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Data URI for the image of object `id`, encoding it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded.
    pub fn href(&mut self, id: ObjectId, image: &RasterImage) -> RenderResult<Arc<str>> {
        if let Some(entry) = self.entries.get(&id) {
            if (entry.width, entry.height) == (image.width(), image.height()) {
                self.stats.hits += 1;
                return Ok(Arc::clone(&entry.href));
            }
        }

        self.stats.misses += 1;
        let href: Arc<str> = to_data_uri(image)?.into();
        trace!(%id, bytes = href.len(), "encoded image href");
        self.entries.insert(
            id,
            CacheEntry {
                href: Arc::clone(&href),
                width: image.width(),
                height: image.height(),
            },
        );
        Ok(href)
    }

    /// Drop entries whose object is no longer in `scene`.
    pub fn retain_scene(&mut self, scene: &Scene) {
        let before = self.entries.len();
        self.entries.retain(|id, _| scene.contains(*id));
        self.stats.evictions += (before - self.entries.len()) as u64;
    }

    /// Whether an entry exists for `id`.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of cached URIs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Hit, miss and eviction counts.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapstyle_core::SceneObject;

    #[test]
    fn test_second_lookup_is_a_hit() {
        let mut cache = ImageHrefCache::new();
        let image = RasterImage::transparent(3, 2);
        let id = ObjectId::new();

        let first = cache.href(id, &image).expect("encode");
        let second = cache.href(id, &image).expect("cached");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.starts_with("data:image/png;base64,"));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, evictions: 0 });
    }

    #[test]
    fn test_size_change_reencodes() {
        let mut cache = ImageHrefCache::new();
        let id = ObjectId::new();
        cache.href(id, &RasterImage::transparent(3, 2)).expect("encode");
        cache.href(id, &RasterImage::transparent(4, 4)).expect("encode");
        assert_eq!(cache.stats().misses, 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_removed_objects_are_evicted() {
        let mut scene = Scene::new();
        let kept = scene.add(SceneObject::image(RasterImage::transparent(2, 2)));
        let gone = ObjectId::new();

        let mut cache = ImageHrefCache::new();
        cache.href(kept, &RasterImage::transparent(2, 2)).expect("encode");
        cache.href(gone, &RasterImage::transparent(2, 2)).expect("encode");
        cache.retain_scene(&scene);

        assert!(cache.contains(kept));
        assert!(!cache.contains(gone));
        assert_eq!(cache.stats().evictions, 1);
    }
}
