//! Material Collaborator Seam
//!
//! The pipeline engine does not own material resources; it only stores
//! reference-counted handles obtained from a [`MaterialProvider`] during
//! parsing. Resolution may be deferred: a provider is free to hand out a
//! placeholder for a material that has not been loaded yet.

use std::collections::HashMap;
use std::sync::Arc;

/// Reference-counted handle to a material resource.
///
/// Handles are cheap to clone and compare by the identity of the underlying
/// entry, so two handles obtained for the same name from the same provider
/// compare equal.
#[derive(Clone, Debug)]
pub struct MaterialHandle(Arc<str>);

impl MaterialHandle {
    /// Creates a handle for the named material.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The material's resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for MaterialHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MaterialHandle {}

/// Lookup-by-name seam to the engine's resource manager.
pub trait MaterialProvider {
    /// Returns a handle for the named material, creating a deferred-load
    /// placeholder when the material is not resident yet.
    fn request(&mut self, name: &str) -> MaterialHandle;
}

/// Minimal provider that hands out one shared handle per name.
///
/// Suitable for tooling and tests; a real engine wires its resource manager
/// into the [`MaterialProvider`] seam instead.
#[derive(Default, Debug)]
pub struct MaterialCache {
    entries: HashMap<String, MaterialHandle>,
}

impl MaterialCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct materials requested so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no material has been requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MaterialProvider for MaterialCache {
    fn request(&mut self, name: &str) -> MaterialHandle {
        self.entries
            .entry(name.to_owned())
            .or_insert_with(|| MaterialHandle::new(name))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dedupes_by_name() {
        let mut cache = MaterialCache::new();
        let a = cache.request("postfx.material.xml");
        let b = cache.request("postfx.material.xml");
        let c = cache.request("sky.material.xml");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
        assert_eq!(a.name(), "postfx.material.xml");
    }
}
