//! Fixed-capacity bit vectors used to store sets of taxa.
//!
//! A [`BitSet`] has a length (the number of taxa it can hold) fixed at
//! construction. Bits past that length are never set, even after a
//! complement, so two sets can be compared or hashed word by word.

use std::{
    fmt::{Debug, Display},
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not},
};

use fixedbitset::FixedBitSet;

/// A word-packed bit vector of fixed length.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitSet {
    bits: FixedBitSet,
}

impl BitSet {
    /// Creates an empty bitset able to hold `len` bits
    pub fn new(len: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(len),
        }
    }

    /// Creates a bitset of length `len` with every bit set
    pub fn full(len: usize) -> Self {
        let mut set = Self::new(len);
        set.bits.insert_range(..);
        set
    }

    /// Number of bits the set can hold
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` if the set has a length of zero
    pub fn is_empty(&self) -> bool {
        self.bits.len() == 0
    }

    /// Returns `true` if no bit is set
    pub fn is_clear(&self) -> bool {
        self.first_set().is_none()
    }

    /// Extends the length of the set, new bits are unset
    pub(crate) fn grow(&mut self, len: usize) {
        self.bits.grow(len);
    }

    /// Sets bit `i`.
    ///
    /// # Panics
    /// If `i` is out of bounds.
    pub fn set(&mut self, i: usize) {
        self.bits.insert(i);
    }

    /// Clears bit `i`.
    ///
    /// # Panics
    /// If `i` is out of bounds.
    pub fn unset(&mut self, i: usize) {
        self.bits.set(i, false);
    }

    /// Returns the value of bit `i`, `false` if `i` is out of bounds
    pub fn get(&self, i: usize) -> bool {
        self.bits.contains(i)
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Position of the lowest set bit, if any
    /// ```
    /// use phylokit::bitset::BitSet;
    ///
    /// let mut set = BitSet::new(200);
    /// assert_eq!(set.first_set(), None);
    /// set.set(130);
    /// set.set(71);
    /// assert_eq!(set.first_set(), Some(71));
    /// ```
    pub fn first_set(&self) -> Option<usize> {
        self.bits.ones().next()
    }

    /// Number of bits set in both sets, without building their intersection
    pub fn overlap_count(&self, other: &Self) -> usize {
        debug_assert_eq!(self.len(), other.len(), "bitsets of different lengths");
        self.bits
            .as_slice()
            .iter()
            .zip(other.bits.as_slice())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Returns `true` if every bit set in `self` is also set in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits.is_subset(&other.bits)
    }

    /// Returns `true` if the two sets have no bit in common
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.overlap_count(other) == 0
    }

    /// Clears in `self` every bit set in `other`
    pub fn difference_with(&mut self, other: &Self) {
        debug_assert_eq!(self.len(), other.len(), "bitsets of different lengths");
        self.bits.difference_with(&other.bits);
    }

    /// Draining iterator over the set bits, lowest first.
    ///
    /// Each step finds and clears the lowest set bit, so the set is
    /// empty once the iterator is exhausted.
    /// ```
    /// use phylokit::bitset::BitSet;
    ///
    /// let mut set = BitSet::new(10);
    /// set.set(7);
    /// set.set(2);
    ///
    /// let drained: Vec<_> = set.drain().collect();
    /// assert_eq!(drained, vec![2, 7]);
    /// assert!(set.is_clear());
    /// ```
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { set: self }
    }

    /// Iterates over the set bits of a copy of this set, leaving `self` untouched
    pub fn iter(&self) -> IntoIter {
        self.clone().into_iter()
    }
}

/// Draining iterator returned by [`BitSet::drain`]
pub struct Drain<'b> {
    set: &'b mut BitSet,
}

impl Iterator for Drain<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.set.first_set()?;
        self.set.unset(i);
        Some(i)
    }
}

/// Owning iterator over the set bits of a [`BitSet`], consumes the set
pub struct IntoIter {
    set: BitSet,
}

impl Iterator for IntoIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        self.set.drain().next()
    }
}

impl IntoIterator for BitSet {
    type Item = usize;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { set: self }
    }
}

impl BitAndAssign<&BitSet> for BitSet {
    fn bitand_assign(&mut self, rhs: &BitSet) {
        debug_assert_eq!(self.len(), rhs.len(), "bitsets of different lengths");
        self.bits.intersect_with(&rhs.bits);
    }
}

impl BitOrAssign<&BitSet> for BitSet {
    fn bitor_assign(&mut self, rhs: &BitSet) {
        debug_assert_eq!(self.len(), rhs.len(), "bitsets of different lengths");
        self.bits.union_with(&rhs.bits);
    }
}

impl BitXorAssign<&BitSet> for BitSet {
    fn bitxor_assign(&mut self, rhs: &BitSet) {
        debug_assert_eq!(self.len(), rhs.len(), "bitsets of different lengths");
        self.bits.symmetric_difference_with(&rhs.bits);
    }
}

impl BitAnd for &BitSet {
    type Output = BitSet;

    fn bitand(self, rhs: Self) -> BitSet {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl BitOr for &BitSet {
    type Output = BitSet;

    fn bitor(self, rhs: Self) -> BitSet {
        let mut out = self.clone();
        out |= rhs;
        out
    }
}

impl BitXor for &BitSet {
    type Output = BitSet;

    fn bitxor(self, rhs: Self) -> BitSet {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl Not for &BitSet {
    type Output = BitSet;

    fn not(self) -> BitSet {
        // toggle_range stays within the length, the tail of the last word remains zero
        let mut out = self.clone();
        out.bits.toggle_range(..);
        out
    }
}

impl Display for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.len() {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitSet")
            .field("len", &self.len())
            .field("ones", &self.bits.ones().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const SIZE: usize = 5000;

    #[test]
    fn created_empty() {
        let set = BitSet::new(SIZE);
        assert_eq!(set.len(), SIZE);
        assert!((0..SIZE).all(|i| !set.get(i)));
        assert_eq!(set.count_ones(), 0);
        assert_eq!(set.first_set(), None);
    }

    #[test]
    fn set_and_unset() {
        let mut set = BitSet::new(SIZE);
        for i in 0..SIZE {
            assert!(!set.get(i));
            set.set(i);
            assert!(set.get(i));
            assert_eq!(set.count_ones(), i + 1);
        }
        for i in 0..SIZE {
            set.unset(i);
            assert!(!set.get(i));
        }
        assert!(set.is_clear());
    }

    #[test]
    fn first_set_descending() {
        let mut set = BitSet::new(SIZE);
        for i in (0..SIZE).rev() {
            set.set(i);
            assert_eq!(set.first_set(), Some(i));
        }
    }

    #[test]
    fn equality_and_hash() {
        let mut s1 = BitSet::new(SIZE);
        let mut s2 = BitSet::new(SIZE);
        s1.set(5);
        s2.set(434);
        assert_ne!(s1, s2);

        let mut copy = s1.clone();
        assert_eq!(s1, copy);
        copy.set(4998);
        assert_ne!(s1, copy);

        let hashed: HashSet<_> = [s1.clone(), s1.clone(), s2].into_iter().collect();
        assert_eq!(hashed.len(), 2);
    }

    #[test]
    fn complement_stays_in_bounds() {
        // 70 bits spans a partial trailing word
        let mut set = BitSet::new(70);
        set.set(3);
        set.set(69);

        let comp = !&set;
        assert_eq!(comp.count_ones(), 68);
        assert_eq!((&set | &comp), BitSet::full(70));
        assert!((&set & &comp).is_clear());
        assert_eq!(!&comp, set);
    }

    #[test]
    fn algebra() {
        let mut a = BitSet::new(100);
        let mut b = BitSet::new(100);
        for i in [1, 5, 64, 99] {
            a.set(i);
        }
        for i in [5, 64, 70] {
            b.set(i);
        }

        assert_eq!((&a & &b).iter().collect::<Vec<_>>(), vec![5, 64]);
        assert_eq!((&a | &b).iter().collect::<Vec<_>>(), vec![1, 5, 64, 70, 99]);
        assert_eq!((&a ^ &b).iter().collect::<Vec<_>>(), vec![1, 70, 99]);
        assert_eq!(a.overlap_count(&b), 2);

        let mut diff = a.clone();
        diff.difference_with(&b);
        assert_eq!(diff.iter().collect::<Vec<_>>(), vec![1, 99]);

        assert!((&a & &b).is_subset(&a));
        assert!(!a.is_subset(&b));
        assert!(diff.is_disjoint(&b));
    }

    #[test]
    fn drain_empties_set() {
        let mut set = BitSet::new(SIZE);
        set.set(4);
        set.set(75);
        set.set(4998);

        let copy = set.clone();
        assert_eq!(copy.iter().collect::<Vec<_>>(), vec![4, 75, 4998]);
        assert_eq!(copy, set);

        let mut drain = set.drain();
        assert_eq!(drain.next(), Some(4));
        drop(drain);
        assert!(!set.get(4));
        assert_eq!(set.count_ones(), 2);

        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![75, 4998]);
    }

    #[test]
    fn display() {
        let mut set = BitSet::new(5);
        set.set(0);
        set.set(3);
        assert_eq!(set.to_string(), "10010");
    }
}
