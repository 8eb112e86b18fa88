use std::collections::HashSet;

use serde::Serialize;

use tessera_types::Reference;

/// Deduplicated set of references missing from a store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WantSet {
    wants: HashSet<Reference>,
}

impl WantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference. Returns `false` if it was already wanted.
    pub fn insert(&mut self, reference: Reference) -> bool {
        self.wants.insert(reference)
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.wants.contains(reference)
    }

    pub fn len(&self) -> usize {
        self.wants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wants.is_empty()
    }

    /// Iterate in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.wants.iter()
    }

    /// The wanted references in ascending order.
    pub fn into_sorted_vec(self) -> Vec<Reference> {
        let mut wants: Vec<_> = self.wants.into_iter().collect();
        wants.sort();
        wants
    }
}

impl FromIterator<Reference> for WantSet {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        Self {
            wants: iter.into_iter().collect(),
        }
    }
}

impl Extend<Reference> for WantSet {
    fn extend<I: IntoIterator<Item = Reference>>(&mut self, iter: I) {
        self.wants.extend(iter);
    }
}

impl IntoIterator for WantSet {
    type Item = Reference;
    type IntoIter = std::collections::hash_set::IntoIter<Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.wants.into_iter()
    }
}
