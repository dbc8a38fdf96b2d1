//! Material Class Interner
//!
//! Maps material class names to compact integer ids so that draw commands can
//! compare and hash classes without touching string data. The table is an
//! explicit object handed to `load` rather than an ambient global, so each
//! engine instance (or test) owns an independent class space.

use lasso::{Rodeo, Spur};

/// Compact identifier for an interned material class name.
///
/// Ids are stable for the lifetime of the [`MaterialClasses`] table that
/// issued them and can be compared and hashed cheaply.
pub type ClassId = Spur;

/// String interning table for material class names.
///
/// Append-only: a class name, once interned, keeps its id forever. The empty
/// string is a valid class (commands with no `class` attribute intern it).
#[derive(Debug)]
pub struct MaterialClasses {
    rodeo: Rodeo,
}

impl Default for MaterialClasses {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialClasses {
    /// Creates an empty class table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rodeo: Rodeo::new(),
        }
    }

    /// Interns a class name, returning its id.
    ///
    /// Returns the existing id when the name was interned before.
    #[inline]
    pub fn intern(&mut self, name: &str) -> ClassId {
        self.rodeo.get_or_intern(name)
    }

    /// Looks up an already-interned class name without allocating.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ClassId> {
        self.rodeo.get(name)
    }

    /// Resolves an id back to its class name.
    ///
    /// # Panics
    /// Panics if `id` was issued by a different table.
    #[inline]
    #[must_use]
    pub fn resolve(&self, id: ClassId) -> &str {
        self.rodeo.resolve(&id)
    }

    /// Number of distinct classes interned so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if no class has been interned.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let mut classes = MaterialClasses::new();
        let a1 = classes.intern("Translucent");
        let a2 = classes.intern("Translucent");
        let b = classes.intern("Skybox");

        assert_eq!(a1, a2);
        assert_ne!(a1, b);

        assert_eq!(classes.resolve(a1), "Translucent");
        assert_eq!(classes.resolve(b), "Skybox");
    }

    #[test]
    fn test_get_does_not_intern() {
        let mut classes = MaterialClasses::new();
        let _ = classes.intern("existing");

        assert!(classes.get("existing").is_some());
        assert!(classes.get("missing").is_none());
        assert_eq!(classes.len(), 1);
    }

    #[test]
    fn test_empty_class_is_valid() {
        let mut classes = MaterialClasses::new();
        let id = classes.intern("");
        assert_eq!(classes.resolve(id), "");
    }
}
