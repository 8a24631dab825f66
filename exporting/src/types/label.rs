/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{RwLock, RwLockReadGuard};

use indexmap::IndexMap;

/// Where a host label came from, which decides whether an export instance
/// sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOrigin {
    /// Set by the operator in the agent configuration.
    Config,
    /// Discovered automatically by the collection subsystem.
    Auto,
}

#[derive(Debug, Clone)]
pub struct LabelValue {
    pub value: String,
    pub origin: LabelOrigin,
}

/// Ordered host label map, shared with a concurrent writer in the collection
/// subsystem.
///
/// The formatting core never takes this lock itself: callers acquire a
/// [`LabelSetReadGuard`] and hold it for the whole iteration.
#[derive(Default)]
pub struct LabelSet {
    inner: RwLock<IndexMap<String, LabelValue>>,
}

impl LabelSet {
    pub fn insert(&self, key: String, value: String, origin: LabelOrigin) {
        let mut map = self.inner.write().unwrap();
        map.insert(key, LabelValue { value, origin });
    }

    pub fn remove(&self, key: &str) {
        let mut map = self.inner.write().unwrap();
        map.shift_remove(key);
    }

    pub fn read(&self) -> LabelSetReadGuard<'_> {
        LabelSetReadGuard {
            inner: self.inner.read().unwrap(),
        }
    }
}

/// Read scope over a [`LabelSet`], blocking writers while it is held.
pub struct LabelSetReadGuard<'a> {
    inner: RwLockReadGuard<'a, IndexMap<String, LabelValue>>,
}

impl LabelSetReadGuard<'_> {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelValue)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order() {
        let labels = LabelSet::default();
        labels.insert("room".to_string(), "lab".to_string(), LabelOrigin::Config);
        labels.insert("rack".to_string(), "r12".to_string(), LabelOrigin::Auto);
        labels.insert("row".to_string(), "b".to_string(), LabelOrigin::Config);

        let guard = labels.read();
        let keys: Vec<&str> = guard.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["room", "rack", "row"]);
    }

    #[test]
    fn replace_keeps_position() {
        let labels = LabelSet::default();
        labels.insert("a".to_string(), "1".to_string(), LabelOrigin::Config);
        labels.insert("b".to_string(), "2".to_string(), LabelOrigin::Config);
        labels.insert("a".to_string(), "3".to_string(), LabelOrigin::Auto);

        let guard = labels.read();
        let mut iter = guard.iter();
        let (key, value) = iter.next().unwrap();
        assert_eq!(key, "a");
        assert_eq!(value.value, "3");
        assert_eq!(value.origin, LabelOrigin::Auto);
    }
}
