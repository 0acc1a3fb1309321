use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

type Disposer<R> = Box<dyn FnOnce(&R)>;

struct CacheEntry<R> {
    resource: Rc<R>,
    ref_count: usize,
    disposer: Disposer<R>,
}

/// Reference counted cache of shared resources keyed by a content derived string.
///
/// The first `acquire` of a key creates the resource, every later one returns
/// the same instance. The disposer runs when the last reference is released.
///
/// The `create` and `dispose` closures given with a key that is already cached
/// are ignored: the first acquirer's disposer is the one that eventually runs.
/// Keys must therefore fully describe the resource they map to.
pub struct ResourceCache<R> {
    entries: HashMap<String, CacheEntry<R>>,
}

impl<R> ResourceCache<R> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn acquire<C, D>(&mut self, key: &str, create: C, dispose: D) -> Rc<R>
    where
        C: FnOnce() -> R,
        D: FnOnce(&R) + 'static,
    {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry {
                resource: Rc::new(create()),
                ref_count: 0,
                disposer: Box::new(dispose),
            });
        entry.ref_count += 1;
        entry.resource.clone()
    }

    /// Drop one reference to `key` and return the number of references left.
    ///
    /// Releasing an unknown key does nothing and returns 0.
    pub fn release(&mut self, key: &str) -> usize {
        let Some(entry) = self.entries.get_mut(key) else {
            return 0;
        };
        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            return entry.ref_count;
        }
        if let Some(entry) = self.entries.remove(key) {
            (entry.disposer)(&entry.resource);
        }
        0
    }

    pub fn ref_count(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, |entry| entry.ref_count)
    }

    pub fn get(&self, key: &str) -> Option<&Rc<R>> {
        self.entries.get(key).map(|entry| &entry.resource)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<R>)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.as_str(), &entry.resource))
    }

    /// Dispose every entry regardless of its reference count.
    pub fn clear(&mut self) {
        for (_, entry) in self.entries.drain() {
            (entry.disposer)(&entry.resource);
        }
    }
}

impl<R> Default for ResourceCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Debug for ResourceCache<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, e)| (k, e.ref_count)))
            .finish()
    }
}
