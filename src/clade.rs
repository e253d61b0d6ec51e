//! Subsets of taxa and the bipartitions they induce.
//!
//! A [`Clade`] is a [`BitSet`] scoped to a [`TaxonSet`]: bit `i` is set when
//! the taxon with identifier `i` belongs to the clade. Clades compare and
//! hash by their bits only, so they can be used as keys in sets and maps.

use std::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::{Add, AddAssign, Sub, SubAssign},
};

use itertools::Itertools;

use crate::{
    bitset::{self, BitSet},
    taxa::{TaxonError, TaxonId, TaxonSet},
};

/// A subset of the taxa of a [`TaxonSet`]
#[derive(Clone)]
pub struct Clade<'a> {
    taxa: BitSet,
    taxon_set: &'a TaxonSet,
    size: usize,
}

impl<'a> Clade<'a> {
    /// Creates an empty clade
    pub fn new(taxon_set: &'a TaxonSet) -> Self {
        Self {
            taxa: BitSet::new(taxon_set.len()),
            taxon_set,
            size: 0,
        }
    }

    /// Creates a clade containing a single taxon
    pub fn singleton(taxon_set: &'a TaxonSet, taxon: TaxonId) -> Self {
        let mut clade = Self::new(taxon_set);
        clade.add_taxon(taxon);
        clade
    }

    /// Creates a clade from a bitset of the same length as the taxon set
    pub fn from_bitset(taxon_set: &'a TaxonSet, taxa: BitSet) -> Self {
        debug_assert_eq!(taxa.len(), taxon_set.len());
        let size = taxa.count_ones();
        Self {
            taxa,
            taxon_set,
            size,
        }
    }

    /// Creates a clade from taxon identifiers
    pub fn from_taxa(taxon_set: &'a TaxonSet, taxa: impl IntoIterator<Item = TaxonId>) -> Self {
        let mut clade = Self::new(taxon_set);
        for taxon in taxa {
            clade.add_taxon(taxon);
        }
        clade
    }

    /// Parses a clade literal such as `{a, b, c}`
    /// ```
    /// use phylokit::{clade::Clade, taxa::TaxonSet};
    ///
    /// let ts = TaxonSet::from_names(["c", "a", "b", "d"]);
    /// let clade = Clade::from_literal(&ts, "{b,c, a}").unwrap();
    ///
    /// assert_eq!(clade.size(), 3);
    /// assert_eq!(clade.to_string(), "{a, b, c}");
    /// ```
    pub fn from_literal(taxon_set: &'a TaxonSet, literal: &str) -> Result<Self, TaxonError> {
        let mut clade = Self::new(taxon_set);
        for name in literal
            .split(['{', ',', '}'])
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            clade.add_taxon(taxon_set.lookup(name)?);
        }
        Ok(clade)
    }

    /// The taxon set this clade refers to
    pub fn taxon_set(&self) -> &'a TaxonSet {
        self.taxon_set
    }

    /// The underlying bitset
    pub fn taxa(&self) -> &BitSet {
        &self.taxa
    }

    /// Number of taxa in the clade
    pub fn size(&self) -> usize {
        self.size
    }

    /// Checks if the clade has no taxa
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Adds a taxon to the clade.
    ///
    /// # Panics
    /// If the identifier is out of range for the taxon set.
    pub fn add_taxon(&mut self, taxon: TaxonId) {
        if !self.taxa.get(taxon) {
            self.taxa.set(taxon);
            self.size += 1;
        }
    }

    /// Removes a taxon from the clade.
    ///
    /// # Panics
    /// If the identifier is out of range for the taxon set.
    pub fn remove_taxon(&mut self, taxon: TaxonId) {
        if self.taxa.get(taxon) {
            self.taxa.unset(taxon);
            self.size -= 1;
        }
    }

    /// Adds every taxon of `other` to the clade
    pub fn add_clade(&mut self, other: &Clade) {
        self.taxa |= &other.taxa;
        self.size = self.taxa.count_ones();
    }

    /// Removes every taxon of `other` from the clade
    pub fn remove_clade(&mut self, other: &Clade) {
        self.taxa.difference_with(&other.taxa);
        self.size = self.taxa.count_ones();
    }

    /// Union of the two clades
    pub fn plus(&self, other: &Clade) -> Self {
        Self::from_bitset(self.taxon_set, &self.taxa | &other.taxa)
    }

    /// Taxa of this clade that are not in `other`
    pub fn minus(&self, other: &Clade) -> Self {
        let mut taxa = self.taxa.clone();
        taxa.difference_with(&other.taxa);
        Self::from_bitset(self.taxon_set, taxa)
    }

    /// Copy of the clade with one more taxon
    pub fn plus_taxon(&self, taxon: TaxonId) -> Self {
        let mut clade = self.clone();
        clade.add_taxon(taxon);
        clade
    }

    /// Copy of the clade with one taxon less
    pub fn minus_taxon(&self, taxon: TaxonId) -> Self {
        let mut clade = self.clone();
        clade.remove_taxon(taxon);
        clade
    }

    /// Every taxon of the taxon set that is not in this clade
    pub fn complement(&self) -> Self {
        Self::from_bitset(self.taxon_set, self.taxon_set.all() & &!&self.taxa)
    }

    /// Taxa present in both clades
    pub fn overlap(&self, other: &Clade) -> Self {
        Self::from_bitset(self.taxon_set, &self.taxa & &other.taxa)
    }

    /// Number of taxa present in both clades
    pub fn overlap_size(&self, other: &Clade) -> usize {
        self.taxa.overlap_count(&other.taxa)
    }

    /// Checks if the taxon is in the clade
    pub fn contains_taxon(&self, taxon: TaxonId) -> bool {
        self.taxa.get(taxon)
    }

    /// Checks if every taxon of `other` is in this clade
    pub fn contains(&self, other: &Clade) -> bool {
        other.size <= self.size && other.taxa.is_subset(&self.taxa)
    }

    /// Two clades are compatible if one contains the other or if they are disjoint,
    /// i.e. they can both appear in the same tree
    /// ```
    /// use phylokit::{clade::Clade, taxa::TaxonSet};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
    /// let ab = Clade::from_literal(&ts, "{a,b}").unwrap();
    /// let abc = Clade::from_literal(&ts, "{a,b,c}").unwrap();
    /// let cd = Clade::from_literal(&ts, "{c,d}").unwrap();
    /// let bc = Clade::from_literal(&ts, "{b,c}").unwrap();
    ///
    /// assert!(ab.compatible(&abc));
    /// assert!(ab.compatible(&cd));
    /// assert!(!ab.compatible(&bc));
    /// ```
    pub fn compatible(&self, other: &Clade) -> bool {
        self.contains(other) || other.contains(self) || self.overlap_size(other) == 0
    }

    /// Iterates over the taxa of the clade.
    /// The iteration drains a copy of the bitset, the clade is left as is.
    pub fn iter(&self) -> bitset::IntoIter {
        self.taxa.iter()
    }

    /// Names of the taxa in the clade, sorted lexicographically
    pub fn names(&self) -> Vec<&'a str> {
        let taxon_set = self.taxon_set;
        self.iter().map(|taxon| &taxon_set[taxon]).sorted().collect()
    }
}

impl PartialEq for Clade<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.taxa == other.taxa
    }
}

impl Eq for Clade<'_> {}

impl Hash for Clade<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.taxa.hash(state);
    }
}

impl<'a> Add<&Clade<'a>> for &Clade<'a> {
    type Output = Clade<'a>;

    fn add(self, rhs: &Clade<'a>) -> Self::Output {
        self.plus(rhs)
    }
}

impl<'a> Sub<&Clade<'a>> for &Clade<'a> {
    type Output = Clade<'a>;

    fn sub(self, rhs: &Clade<'a>) -> Self::Output {
        self.minus(rhs)
    }
}

impl<'a> Add<TaxonId> for &Clade<'a> {
    type Output = Clade<'a>;

    fn add(self, rhs: TaxonId) -> Self::Output {
        self.plus_taxon(rhs)
    }
}

impl<'a> Sub<TaxonId> for &Clade<'a> {
    type Output = Clade<'a>;

    fn sub(self, rhs: TaxonId) -> Self::Output {
        self.minus_taxon(rhs)
    }
}

impl AddAssign<&Clade<'_>> for Clade<'_> {
    fn add_assign(&mut self, rhs: &Clade<'_>) {
        self.add_clade(rhs);
    }
}

impl SubAssign<&Clade<'_>> for Clade<'_> {
    fn sub_assign(&mut self, rhs: &Clade<'_>) {
        self.remove_clade(rhs);
    }
}

impl AddAssign<TaxonId> for Clade<'_> {
    fn add_assign(&mut self, rhs: TaxonId) {
        self.add_taxon(rhs);
    }
}

impl SubAssign<TaxonId> for Clade<'_> {
    fn sub_assign(&mut self, rhs: TaxonId) {
        self.remove_taxon(rhs);
    }
}

impl Display for Clade<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.names().join(", "))
    }
}

impl Debug for Clade<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Clade{self} Size[{}]", self.size)
    }
}

/// A clade and its complement, as an unordered pair
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bipartition<'a> {
    a1: Clade<'a>,
    a2: Clade<'a>,
}

impl<'a> Bipartition<'a> {
    /// Builds a bipartition from its two sides, in any order
    pub fn new(c1: Clade<'a>, c2: Clade<'a>) -> Self {
        // sides are kept sorted so that equality and hashing are symmetric
        if c1.taxa() <= c2.taxa() {
            Self { a1: c1, a2: c2 }
        } else {
            Self { a1: c2, a2: c1 }
        }
    }

    /// Builds the bipartition separating a clade from the rest of the taxa
    pub fn from_clade(clade: Clade<'a>) -> Self {
        let complement = clade.complement();
        Self::new(clade, complement)
    }

    /// The two sides of the bipartition
    pub fn sides(&self) -> (&Clade<'a>, &Clade<'a>) {
        (&self.a1, &self.a2)
    }
}

impl Display for Bipartition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{} {}}}", self.a1, self.a2)
    }
}
