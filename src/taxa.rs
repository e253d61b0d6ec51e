//! Bijection between taxon names and dense integer identifiers.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    fmt::Display,
    ops::Index,
};

use itertools::Itertools;
use thiserror::Error;

use crate::{bitset::BitSet, newick::NewickParseError};

/// A type that represents the identifier of a taxon within a [`TaxonSet`]
pub type TaxonId = usize;

/// Errors that can occur when looking up or adding taxa in a [`TaxonSet`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TaxonError {
    /// The name was never added to the taxon set
    #[error("Unknown taxon: {0:?}")]
    UnknownTaxon(String),
    /// The identifier is out of range for the taxon set
    #[error("There is no taxon with id: {0}")]
    UnknownTaxonId(TaxonId),
    /// A new name was added after the taxon set was frozen
    #[error("Cannot add taxon {0:?} to a frozen taxon set")]
    FrozenSetViolation(String),
}

/// The set of taxa an analysis runs over.
///
/// Identifiers are assigned densely in insertion order. Clades, trees and
/// distance matrices borrow the taxon set, so it cannot change while any of
/// them is alive.
#[derive(Debug, Clone, Default)]
pub struct TaxonSet {
    taxa: Vec<String>,
    index: HashMap<String, TaxonId>,
    all: BitSet,
    frozen: bool,
}

impl TaxonSet {
    /// Creates an empty, growable taxon set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a growable taxon set from names, duplicates are added once
    /// ```
    /// use phylokit::taxa::TaxonSet;
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "a", "c"]);
    /// assert_eq!(ts.len(), 3);
    /// assert_eq!(ts.lookup("c").unwrap(), 2);
    /// ```
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ts = Self::new();
        for name in names {
            ts.insert(name.as_ref());
        }
        ts
    }

    /// Builds a taxon set from lines of clade literals such as `{a,b,c}`.
    ///
    /// Names are deduplicated across every line before identifiers are
    /// assigned, so identifiers should be looked up by name.
    pub fn from_clade_literals(literals: &str) -> Self {
        let names: BTreeSet<&str> = literals
            .lines()
            .flat_map(|line| line.split(['{', ',', '}']))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        Self::from_names(names)
    }

    /// Builds a frozen taxon set containing every taxon named in the newick strings
    /// ```
    /// use phylokit::taxa::TaxonSet;
    ///
    /// let ts = TaxonSet::from_newick(&["((a,b),c);", "(c,(d,a));"]).unwrap();
    /// assert_eq!(ts.len(), 4);
    /// assert!(ts.is_frozen());
    /// ```
    pub fn from_newick<S: AsRef<str>>(trees: &[S]) -> Result<Self, NewickParseError> {
        let mut names = HashSet::new();
        for tree in trees {
            crate::newick::tokenize_taxon_names(tree.as_ref(), &mut names)?;
        }

        let mut ts = Self::from_names(names.into_iter().sorted());
        ts.freeze();

        Ok(ts)
    }

    /// Adds a taxon and returns its identifier.
    /// If the taxon already exists its identifier is returned.
    pub fn add(&mut self, name: &str) -> Result<TaxonId, TaxonError> {
        if let Some(id) = self.index.get(name) {
            return Ok(*id);
        }
        if self.frozen {
            return Err(TaxonError::FrozenSetViolation(name.to_string()));
        }

        Ok(self.insert(name))
    }

    /// Adds a taxon whether or not the set is frozen
    fn insert(&mut self, name: &str) -> TaxonId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }

        let id = self.taxa.len();
        self.taxa.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.all.grow(id + 1);
        self.all.set(id);

        id
    }

    /// Forbids adding new taxa, this cannot be undone
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether [`TaxonSet::freeze`] was called
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Gets the identifier of a taxon without adding it
    pub fn lookup(&self, name: &str) -> Result<TaxonId, TaxonError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| TaxonError::UnknownTaxon(name.to_string()))
    }

    /// Gets the name of a taxon from its identifier
    pub fn name_of(&self, id: TaxonId) -> Result<&str, TaxonError> {
        self.taxa
            .get(id)
            .map(String::as_str)
            .ok_or(TaxonError::UnknownTaxonId(id))
    }

    /// Checks if a taxon with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of taxa in the set
    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    /// Checks if the set has no taxa
    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    /// Bitset with the bit of every taxon set
    pub fn all(&self) -> &BitSet {
        &self.all
    }

    /// Names of the taxa, indexed by identifier
    pub fn names(&self) -> &[String] {
        &self.taxa
    }

    /// Iterates over `(identifier, name)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (TaxonId, &str)> + '_ {
        self.taxa.iter().map(String::as_str).enumerate()
    }
}

impl Index<TaxonId> for TaxonSet {
    type Output = str;

    fn index(&self, id: TaxonId) -> &Self::Output {
        &self.taxa[id]
    }
}

impl PartialEq for TaxonSet {
    fn eq(&self, other: &Self) -> bool {
        self.taxa == other.taxa
    }
}

impl Eq for TaxonSet {}

impl Display for TaxonSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (id, name) in self.iter() {
            writeln!(f, "{id}\t{name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut ts = TaxonSet::new();
        assert_eq!(ts.add("human").unwrap(), 0);
        assert_eq!(ts.add("chimp").unwrap(), 1);
        assert_eq!(ts.add("human").unwrap(), 0);

        assert_eq!(ts.len(), 2);
        assert_eq!(ts.lookup("chimp"), Ok(1));
        assert_eq!(ts.name_of(0), Ok("human"));
        assert_eq!(&ts[1], "chimp");
        assert_eq!(
            ts.lookup("gorilla"),
            Err(TaxonError::UnknownTaxon("gorilla".into()))
        );
        assert_eq!(ts.name_of(2), Err(TaxonError::UnknownTaxonId(2)));
    }

    #[test]
    fn all_tracks_populated_ids() {
        let ts = TaxonSet::from_names(["a", "b", "c"]);
        assert_eq!(ts.all().len(), 3);
        assert_eq!(ts.all().count_ones(), 3);
        assert_eq!(ts.all().iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn frozen_set() {
        let mut ts = TaxonSet::from_names(["a", "b"]);
        ts.freeze();
        ts.freeze();
        assert!(ts.is_frozen());

        assert_eq!(ts.add("a"), Ok(0));
        assert_eq!(
            ts.add("z"),
            Err(TaxonError::FrozenSetViolation("z".into()))
        );
        assert_eq!(ts.len(), 2);
    }

    #[test]
    fn from_names_keeps_first_occurrence() {
        let ts = TaxonSet::from_names(["b", "a", "b", "c", "a"]);
        assert_eq!(ts.len(), 3);
        assert!(!ts.is_frozen());
        assert_eq!(ts.lookup("b"), Ok(0));
        assert_eq!(ts.lookup("a"), Ok(1));
        assert_eq!(ts.lookup("c"), Ok(2));
        assert_eq!(ts.all().count_ones(), 3);
    }

    #[test]
    fn from_clade_literals() {
        let ts = TaxonSet::from_clade_literals("{tx1, tx8, tx3}\n\n{tx2,tx4,tx1}\n");
        assert_eq!(ts.len(), 5);
        for name in ["tx1", "tx2", "tx3", "tx4", "tx8"] {
            let id = ts.lookup(name).unwrap();
            assert_eq!(&ts[id], name);
        }
    }

    #[test]
    fn from_newick_ignores_labels() {
        let ts = TaxonSet::from_newick(&["((a:0.1,b:0.2)90:0.5,c);", "(c, (d, a));"]).unwrap();
        assert_eq!(ts.len(), 4);
        for name in ["a", "b", "c", "d"] {
            assert!(ts.contains(name), "{name} missing from {ts}");
        }
        assert!(!ts.contains("90"));
        assert!(!ts.contains("0.5"));
    }

    #[test]
    fn display() {
        let ts = TaxonSet::from_names(["a", "b"]);
        assert_eq!(ts.to_string(), "0\ta\n1\tb\n");
    }
}
