//! Two-way map between two key spaces.
//!
//! Every left key maps to exactly one right key and back. Inserts are
//! checked against both sides before anything is written, so a rejected
//! insert leaves the map untouched.

use std::borrow::Borrow;
use std::collections::{hash_map, HashMap};
use std::fmt;
use std::hash::Hash;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BiMapError {
    #[error("left key {0} is already mapped")]
    DuplicateLeft(String),
    #[error("right key {0} is already mapped")]
    DuplicateRight(String),
}

#[derive(Clone)]
pub struct BiMap<L, R> {
    forward: HashMap<L, R>,
    reverse: HashMap<R, L>,
}

impl<L, R> Default for BiMap<L, R> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
        }
    }
}

impl<L, R> BiMap<L, R>
where
    L: Eq + Hash + Clone + fmt::Debug,
    R: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            forward: HashMap::with_capacity(capacity),
            reverse: HashMap::with_capacity(capacity),
        }
    }

    /// Build from `(left, right)` pairs. Fails on the first pair that would
    /// reuse a key on either side.
    pub fn try_from_left_pairs<I>(pairs: I) -> Result<Self, BiMapError>
    where
        I: IntoIterator<Item = (L, R)>,
    {
        let mut map = Self::new();
        for (left, right) in pairs {
            map.insert(left, right)?;
        }
        Ok(map)
    }

    /// Build from `(right, left)` pairs, e.g. a map keyed by the right side.
    pub fn try_from_right_pairs<I>(pairs: I) -> Result<Self, BiMapError>
    where
        I: IntoIterator<Item = (R, L)>,
    {
        Self::try_from_left_pairs(pairs.into_iter().map(|(right, left)| (left, right)))
    }

    /// Insert a pair. Both keys must be unused; otherwise nothing changes.
    pub fn insert(&mut self, left: L, right: R) -> Result<(), BiMapError> {
        if self.forward.contains_key(&left) {
            return Err(BiMapError::DuplicateLeft(format!("{left:?}")));
        }
        if self.reverse.contains_key(&right) {
            return Err(BiMapError::DuplicateRight(format!("{right:?}")));
        }
        self.forward.insert(left.clone(), right.clone());
        self.reverse.insert(right, left);
        Ok(())
    }

    pub fn get_by_left<Q>(&self, left: &Q) -> Option<&R>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.get(left)
    }

    pub fn get_by_right<Q>(&self, right: &Q) -> Option<&L>
    where
        R: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.reverse.get(right)
    }

    pub fn contains_left<Q>(&self, left: &Q) -> bool
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.contains_key(left)
    }

    pub fn contains_right<Q>(&self, right: &Q) -> bool
    where
        R: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.reverse.contains_key(right)
    }

    /// Remove the pair owning `left`, returning its right key.
    pub fn remove_by_left<Q>(&mut self, left: &Q) -> Option<R>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let right = self.forward.remove(left)?;
        let back = self.reverse.remove(&right);
        debug_assert!(back.is_some(), "bimap reverse side lost {right:?}");
        Some(right)
    }

    /// Remove the pair owning `right`, returning its left key.
    pub fn remove_by_right<Q>(&mut self, right: &Q) -> Option<L>
    where
        R: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let left = self.reverse.remove(right)?;
        let back = self.forward.remove(&left);
        debug_assert!(back.is_some(), "bimap forward side lost {left:?}");
        Some(left)
    }

    pub fn len(&self) -> usize {
        assert_eq!(
            self.forward.len(),
            self.reverse.len(),
            "bimap sides diverged"
        );
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }

    /// Pairs in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, L, R> {
        self.forward.iter()
    }

    pub fn left_values(&self) -> hash_map::Keys<'_, L, R> {
        self.forward.keys()
    }

    pub fn right_values(&self) -> hash_map::Keys<'_, R, L> {
        self.reverse.keys()
    }
}

impl<L: fmt::Debug, R: fmt::Debug> fmt::Debug for BiMap<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.forward.iter()).finish()
    }
}

impl<'a, L, R> IntoIterator for &'a BiMap<L, R> {
    type Item = (&'a L, &'a R);
    type IntoIter = hash_map::Iter<'a, L, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.forward.iter()
    }
}
