/// Generic resource manager.
///
/// A `ResourceManager` is the sole owner of a homogeneous pool of resources.
/// Callers receive typed slotmap keys: a key is a non-owning reference that
/// stays cheap to copy and is checked on every access, so a key whose
/// resource has been deleted resolves to `None` (or `Error::StaleHandle`)
/// instead of dangling.
///
/// GPU-backed resources release their handles in `Drop`. Deleting an entry,
/// clearing the pool or dropping the manager therefore destroys every
/// resource exactly once.

use slotmap::{new_key_type, Key, SlotMap};
use crate::error::{Error, Result};

new_key_type! {
    /// Key of a `Shader` in its manager
    pub struct ShaderKey;
    /// Key of a `Texture` in its manager
    pub struct TextureKey;
    /// Key of a `Material` in its manager
    pub struct MaterialKey;
    /// Key of a `Primitive` in its manager
    pub struct PrimitiveKey;
    /// Key of a `PrimitiveSet` in its manager
    pub struct PrimitiveSetKey;
    /// Key of a `Font` in its manager
    pub struct FontKey;
}

/// Anything stored in a `ResourceManager`
pub trait Resource {
    /// Name used by `find` and `delete`
    fn name(&self) -> &str;
}

/// Owning pool of resources of one kind
pub struct ResourceManager<K: Key, T: Resource> {
    items: SlotMap<K, T>,
    kind: &'static str,
}

impl<K: Key, T: Resource> ResourceManager<K, T> {
    /// Create an empty manager; `kind` names the resource type in logs and errors
    pub fn new(kind: &'static str) -> Self {
        Self {
            items: SlotMap::with_key(),
            kind,
        }
    }

    /// Resource type name ("shader", "texture", ...)
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Register a resource and return its key
    ///
    /// No deduplication: adding two equal resources yields two entries.
    pub fn add(&mut self, resource: T) -> K {
        self.items.insert(resource)
    }

    pub fn get(&self, key: K) -> Option<&T> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.items.get_mut(key)
    }

    /// Like `get`, but a dead key is an error
    pub fn try_get(&self, key: K) -> Result<&T> {
        let kind = self.kind;
        self.items
            .get(key)
            .ok_or_else(|| Error::StaleHandle(format!("{} {:?}", kind, key)))
    }

    /// Like `get_mut`, but a dead key is an error
    pub fn try_get_mut(&mut self, key: K) -> Result<&mut T> {
        let kind = self.kind;
        self.items
            .get_mut(key)
            .ok_or_else(|| Error::StaleHandle(format!("{} {:?}", kind, key)))
    }

    pub fn contains(&self, key: K) -> bool {
        self.items.contains_key(key)
    }

    /// Key of the first resource with this name (linear scan)
    pub fn find(&self, name: &str) -> Option<K> {
        self.items
            .iter()
            .find(|(_, resource)| resource.name() == name)
            .map(|(key, _)| key)
    }

    /// First resource with this name (linear scan)
    pub fn find_resource(&self, name: &str) -> Option<&T> {
        self.items.values().find(|resource| resource.name() == name)
    }

    /// Destroy the first resource with this name
    ///
    /// Returns `false` when no resource has that name.
    pub fn delete(&mut self, name: &str) -> bool {
        match self.find(name) {
            Some(key) => {
                self.items.remove(key);
                crate::engine_trace!("lumen3d::ResourceManager", "Deleted {} '{}'", self.kind, name);
                true
            }
            None => false,
        }
    }

    /// Take a resource out of the pool, transferring ownership to the caller
    pub fn remove(&mut self, key: K) -> Option<T> {
        self.items.remove(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.items.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.items.iter_mut()
    }

    /// Destroy every resource and return how many were destroyed
    ///
    /// Calling it again on an empty pool destroys nothing and returns 0.
    pub fn clear(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();
        if count > 0 {
            crate::engine_debug!("lumen3d::ResourceManager", "Destroyed {} {} resource(s)", count, self.kind);
        }
        count
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
