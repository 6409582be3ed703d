use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{BuildHasher, BuildHasherDefault, Hash, Hasher},
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

/// An unordered collection that permits duplicates.
///
/// Elements keep their insertion order for iteration, but equality and
/// hashing ignore it: two bags are equal when every element occurs the same
/// number of times in both, and the hash is the XOR of the element hashes.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bag<T> {
    elements: Vec<T>,
}

impl<T> Bag<T> {
    pub fn new() -> Self {
        Bag {
            elements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn insert(&mut self, element: T) -> &mut Self {
        self.elements.push(element);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    /// First element satisfying `predicate`.
    pub fn find_by(&self, predicate: impl FnMut(&&T) -> bool) -> Option<&T> {
        self.elements.iter().find(predicate)
    }

    pub fn find_by_mut(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Option<&mut T> {
        self.elements.iter_mut().find(|element| predicate(element))
    }

    /// Removes and returns the first element satisfying `predicate`.
    pub fn take_by(&mut self, predicate: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.elements.iter().position(predicate)?;
        Some(self.elements.remove(index))
    }

    /// Keeps only the elements satisfying `predicate`.
    pub fn retain(&mut self, predicate: impl FnMut(&T) -> bool) {
        self.elements.retain(predicate);
    }
}

impl<T: PartialEq> Bag<T> {
    /// Removes one element equal to `target`, the first found. Returns whether
    /// anything was removed.
    pub fn delete(&mut self, target: &T) -> bool {
        self.take_by(|element| element == target).is_some()
    }

    pub fn contains(&self, target: &T) -> bool {
        self.elements.contains(target)
    }

    /// The stored element equal to `target`, if any.
    pub fn find(&self, target: &T) -> Option<&T> {
        self.elements.iter().find(|element| *element == target)
    }

    pub fn find_mut(&mut self, target: &T) -> Option<&mut T> {
        self.elements.iter_mut().find(|element| **element == *target)
    }
}

impl<T: Hash> Bag<T> {
    /// Order-independent digest of the contents.
    pub fn fingerprint(&self) -> u64 {
        self.elements
            .iter()
            .map(element_hash)
            .fold(0, |acc, hash| acc ^ hash)
    }
}

/// Hash of a single value with a fixed-key hasher, so that fingerprints are
/// comparable across bags and boards.
pub(crate) fn element_hash<T: Hash>(value: &T) -> u64 {
    BuildHasherDefault::<DefaultHasher>::default().hash_one(value)
}

impl<T> Default for Bag<T> {
    fn default() -> Self {
        Bag::new()
    }
}

impl<T> From<Vec<T>> for Bag<T> {
    fn from(elements: Vec<T>) -> Self {
        Bag { elements }
    }
}

impl<T> FromIterator<T> for Bag<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Bag {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Bag<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Bag<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T> Extend<T> for Bag<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.elements.extend(iter);
    }
}

/// Multiset difference: each element of `other` cancels at most one equal
/// element of `self`.
impl<T: PartialEq + Clone> Sub<&Bag<T>> for &Bag<T> {
    type Output = Bag<T>;

    fn sub(self, other: &Bag<T>) -> Bag<T> {
        let mut remaining = self.clone();
        for element in other {
            remaining.delete(element);
        }
        remaining
    }
}

/// Multiset union: multiplicities add up.
impl<T: Clone> Add<&Bag<T>> for &Bag<T> {
    type Output = Bag<T>;

    fn add(self, other: &Bag<T>) -> Bag<T> {
        self.iter().chain(other.iter()).cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for Bag<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        // With equal sizes, `self - other` being empty implies the converse.
        let mut unmatched: Vec<&T> = other.iter().collect();
        self.iter().all(|element| {
            match unmatched.iter().position(|candidate| *candidate == element) {
                Some(index) => {
                    unmatched.swap_remove(index);
                    true
                }
                None => false,
            }
        })
    }
}

impl<T: Eq> Eq for Bag<T> {}

impl<T: Hash> Hash for Bag<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
    }
}

impl<T: fmt::Debug> fmt::Debug for Bag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bag")?;
        f.debug_list().entries(&self.elements).finish()
    }
}

#[macro_export]
macro_rules! bag {
    () => { $crate::bag::Bag::new() };
    ($($element:expr),+ $(,)?) => { $crate::bag::Bag::from(vec![$($element),+]) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

    #[test]
    fn insert_appends() {
        let mut bag: Bag<i32> = bag![];
        bag.insert(1);
        assert_eq!(bag, bag![1]);
        assert_eq!(bag![1, 2, 3].len(), 3);
        assert!(Bag::<i32>::new().is_empty());
    }

    #[test]
    fn contains_and_find() {
        let bag = bag![1, 2, 3];
        assert!(bag.contains(&1));
        assert!(!bag.contains(&9));
        assert_eq!(bag!["a"].find(&"a"), Some(&"a"));
        assert_eq!(bag!["a"].find(&"b"), None);
    }

    #[test]
    fn union_adds_multiplicities() {
        assert_eq!((&bag![1, 2, 3] + &bag![4, 5, 6]).len(), 6);
        assert_eq!((&bag![1, 1, 1] + &bag![1, 1, 1]).len(), 6);
    }

    #[test]
    fn difference_cancels_one_occurrence_per_element() {
        assert_eq!((&bag![1, 1, 1] - &bag![1]).len(), 2);
        assert_eq!((&bag![1, 2, 3] - &bag![1, 9, 8]).len(), 2);
        assert!((&bag![1, 1, 1] - &bag![1, 1, 1]).is_empty());
        assert_eq!((&bag![1, 2, 3] - &bag![4, 5, 6]).len(), 3);
    }

    #[test]
    fn equality_ignores_order_but_not_multiplicity() {
        assert_eq!(bag![1, 2, 3], bag![3, 2, 1]);
        assert_ne!(bag![1, 2, 3], bag![1, 2, 3, 3]);
        assert_ne!(bag![1, 1, 2], bag![1, 2, 2]);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let mut bag = bag!["x", "x", "y"];
        assert!(bag.delete(&"x"));
        assert_eq!(bag, bag!["x", "y"]);
        assert!(!bag.delete(&"z"));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn clone_is_independent() {
        let mut bag = bag![1, 2, 3];
        let copy = bag.clone();
        bag.delete(&1);
        assert_ne!(bag, copy);
        assert_eq!(copy, bag![1, 2, 3]);
    }

    #[test]
    fn mutation_through_find_mut_changes_value() {
        let mut bag = bag![String::from("a")];
        if let Some(element) = bag.find_mut(&String::from("a")) {
            element.make_ascii_uppercase();
        }
        assert_eq!(bag, bag![String::from("A")]);
    }

    #[test]
    fn shuffled_bags_are_equal_and_hash_alike() {
        let mut rng = StdRng::seed_from_u64(7);
        let original = vec![3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let reference: Bag<i32> = Bag::from(original.clone());
        for _ in 0..50 {
            let mut shuffled = original.clone();
            shuffled.shuffle(&mut rng);
            let bag = Bag::from(shuffled);
            assert_eq!(bag, reference);
            assert_eq!(bag.fingerprint(), reference.fingerprint());
        }
    }

    #[test]
    fn take_by_returns_first_match() {
        let mut bag = bag![(1, 'a'), (2, 'b'), (1, 'c')];
        assert_eq!(bag.take_by(|(n, _)| *n == 1), Some((1, 'a')));
        assert_eq!(bag, bag![(2, 'b'), (1, 'c')]);
    }
}
