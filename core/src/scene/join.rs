//! Keyed data join (enter / update / exit).

use std::hash::Hash;

use hashbrown::{HashMap, HashSet};

/// Result of matching new data against the currently bound elements.
///
/// `enter` and `update` hold indices into the data slice, in data order.
/// `exit` holds the keys whose elements have no datum anymore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlan<K> {
    pub enter: Vec<usize>,
    pub update: Vec<usize>,
    pub exit: Vec<K>,
}

/// Elements bound to data by key.
#[derive(Debug)]
pub struct KeyedJoin<K, E> {
    elements: HashMap<K, E>,
}

impl<K, E> Default for KeyedJoin<K, E> {
    fn default() -> Self {
        Self {
            elements: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, E> KeyedJoin<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `data` against the bound elements using `key`.
    ///
    /// When two data share a key only the first one is joined.
    pub fn plan<T>(&self, data: &[T], key: impl Fn(&T) -> K) -> JoinPlan<K> {
        let mut seen = HashSet::with_capacity(data.len());
        let mut enter = Vec::new();
        let mut update = Vec::new();

        for (i, datum) in data.iter().enumerate() {
            let k = key(datum);
            if !seen.insert(k.clone()) {
                continue;
            }
            if self.elements.contains_key(&k) {
                update.push(i);
            } else {
                enter.push(i);
            }
        }

        let exit: Vec<K> = self
            .elements
            .keys()
            .filter(|k| !seen.contains(*k))
            .cloned()
            .collect();

        JoinPlan {
            enter,
            update,
            exit,
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut E> {
        self.elements.get_mut(key)
    }

    pub fn get(&self, key: &K) -> Option<&E> {
        self.elements.get(key)
    }

    pub fn bind(&mut self, key: K, element: E) {
        self.elements.insert(key, element);
    }

    pub fn unbind(&mut self, key: &K) -> Option<E> {
        self.elements.remove(key)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
