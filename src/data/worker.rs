//! See [`WorkerSet`]

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A set of worker names.
///
/// Insertion is add-if-absent, so a name never appears twice.
/// Names keep the order they were first inserted in, which keeps API output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkerSet(SmallVec<[String; 4]>);

impl<'de> Deserialize<'de> for WorkerSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // stored duplicates are collapsed rather than rejected
        SmallVec::<[String; 4]>::deserialize(deserializer).map(Self::from_iter)
    }
}

impl FromIterator<String> for WorkerSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = Self::default();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<'a> IntoIterator for &'a WorkerSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl WorkerSet {
    /// Add `name` if absent. Returns whether the set changed.
    pub fn insert(&mut self, name: String) -> bool {
        if self.contains(&name) {
            false
        } else {
            self.0.push(name);
            true
        }
    }

    /// Remove `name` if present. Returns whether the set changed.
    pub fn remove(&mut self, name: &str) -> bool {
        let len = self.0.len();
        self.0.retain(|x| x != name);
        self.0.len() != len
    }

    /// Whether `name` is a member.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|x| x == name)
    }

    /// Number of names in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no names.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate names in insertion order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}
