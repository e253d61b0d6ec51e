//! Compute and manipulate phylogenetic distance matrices
//!
//! A [`DistanceMatrix`] stores, for every pair of taxa of a [`TaxonSet`], an
//! accumulated distance and a weight (how many times a distance was added).
//! The mean distance of a pair is the ratio of the two. Only the lower
//! triangle, diagonal included, is stored.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashSet},
    fmt::{Debug, Display},
    fs,
    ops::MulAssign,
    path::Path,
    str::FromStr,
};

use itertools::Itertools;
use num_traits::{Float, One, Zero};
use thiserror::Error;

use crate::{
    clade::Clade,
    newick::{NewickParseError, Token, Tokenizer},
    taxa::{TaxonError, TaxonId, TaxonSet},
};

/// Errors that can occur when reading, writing and manipulating [`DistanceMatrix`] structs.
#[derive(Error, Debug)]
pub enum MatrixError {
    /// We are trying to access a taxon that is out of range for the taxon set
    #[error("There is no taxon with id {0} in the matrix")]
    UnknownTaxonId(TaxonId),
    /// The two matrices are not built over the same taxon set
    #[error("The matrices are not built over the same taxon set")]
    SizeMismatch,
    /// We are trying to access a distance between two taxa that does not
    /// exist in the matrix
    #[error("Missing distance between {0} and {1}.")]
    MissingDistance(String, String),
    /// There was an [`std::io::Error`] when writing the matrix to a phylip file
    #[error("Error writing file")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur when parsing phylip distance matrix files.
#[derive(Error, Debug)]
pub enum PhylipParseError<T>
where
    T: Debug,
{
    /// The phylip file is empty
    #[error("Matrix file is empty.")]
    EmptyMatrixFile,
    /// There was a [`std::num::ParseIntError`] when reading the number of taxa
    #[error("Could not parse size from file.")]
    SizeParseError(#[from] std::num::ParseIntError),
    /// One of the matrix rows is empty
    #[error("Row {0} is empty.")]
    EmptyRow(usize),
    /// There was an error when reading a distance.
    #[error("Could not parse distance from file.")]
    DistParseError,
    /// There is a missing distance from one of the matrix rows
    #[error("Missing distance from matrix row {0}")]
    MissingDistance(usize),
    /// The size of the matrix and the number of rows do not match
    #[error("Size and number of rows do not match: {0} rows for size {1}")]
    SizeAndRowsMismatch(usize, usize),
    /// The square phylip matrix is not symmetric
    #[error("Non symetric matrix: {0:?} and {1:?} are different")]
    NonSymmetric(T, T),
    /// A row name is not in the taxon set
    #[error(transparent)]
    TaxonError(#[from] TaxonError),
    /// There was a [`MatrixError`] when filling the distance matrix object
    #[error("Error creating matrix.")]
    MatrixError(#[from] MatrixError),
    /// There was a [`std::io::Error`] when reading the phylip file
    #[error("Error reading file")]
    IoError(#[from] std::io::Error),
}

/// Position of a pair in the packed lower triangle
pub(crate) fn tril_index(t1: TaxonId, t2: TaxonId) -> usize {
    let (a, b) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    b * (b + 1) / 2 + a
}

/// A symmetric matrix over the taxa of a [`TaxonSet`], with a weight per entry
#[derive(Debug, Clone)]
pub struct DistanceMatrix<'a, T> {
    taxon_set: &'a TaxonSet,
    distance: Vec<T>,
    weight: Vec<T>,
}

impl<'a, T> DistanceMatrix<'a, T>
where
    T: Copy + Zero + One,
{
    /// Create a matrix with every distance and weight at zero
    pub fn new(taxon_set: &'a TaxonSet) -> Self {
        let n = taxon_set.len();
        Self {
            taxon_set,
            distance: vec![Zero::zero(); n * (n + 1) / 2],
            weight: vec![Zero::zero(); n * (n + 1) / 2],
        }
    }

    /// The taxon set of the matrix
    pub fn taxon_set(&self) -> &'a TaxonSet {
        self.taxon_set
    }

    /// Number of taxa in the matrix
    pub fn size(&self) -> usize {
        self.taxon_set.len()
    }

    fn get_index(&self, t1: TaxonId, t2: TaxonId) -> Result<usize, MatrixError> {
        for t in [t1, t2] {
            if t >= self.size() {
                return Err(MatrixError::UnknownTaxonId(t));
            }
        }
        Ok(tril_index(t1, t2))
    }

    /// Get the value stored for a pair of taxa, in either order
    pub fn get(&self, t1: TaxonId, t2: TaxonId) -> Result<&T, MatrixError> {
        let idx = self.get_index(t1, t2)?;
        Ok(&self.distance[idx])
    }

    /// Get a mutable reference to the value stored for a pair of taxa
    pub fn get_mut(&mut self, t1: TaxonId, t2: TaxonId) -> Result<&mut T, MatrixError> {
        let idx = self.get_index(t1, t2)?;
        Ok(&mut self.distance[idx])
    }

    /// Get the weight of a pair of taxa
    pub fn weight(&self, t1: TaxonId, t2: TaxonId) -> Result<&T, MatrixError> {
        let idx = self.get_index(t1, t2)?;
        Ok(&self.weight[idx])
    }

    /// Get a mutable reference to the weight of a pair of taxa
    pub fn weight_mut(&mut self, t1: TaxonId, t2: TaxonId) -> Result<&mut T, MatrixError> {
        let idx = self.get_index(t1, t2)?;
        Ok(&mut self.weight[idx])
    }

    /// Set the value of a pair of taxa, its weight becomes one
    pub fn set(&mut self, t1: TaxonId, t2: TaxonId, value: T) -> Result<(), MatrixError> {
        let idx = self.get_index(t1, t2)?;
        self.distance[idx] = value;
        self.weight[idx] = One::one();
        Ok(())
    }

    /// Checks if a value was ever stored for a pair of taxa
    pub fn has(&self, t1: TaxonId, t2: TaxonId) -> bool {
        self.weight(t1, t2).map_or(false, |w| !w.is_zero())
    }
}

impl<'a, T> DistanceMatrix<'a, T>
where
    T: Display + Debug + Float + FromStr,
{
    /// Builds a matrix of path lengths from a newick string,
    /// see [`DistanceMatrix::add_newick`].
    pub fn from_newick(newick: &str, taxon_set: &'a TaxonSet) -> Result<Self, NewickParseError> {
        let mut matrix = Self::new(taxon_set);
        matrix.add_newick(newick)?;
        Ok(matrix)
    }

    /// Builds a matrix by accumulating the path lengths of many newick strings
    pub fn from_trees<I, S>(trees: I, taxon_set: &'a TaxonSet) -> Result<Self, NewickParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        log::info!("Accumulating distances over {} taxa", taxon_set.len());
        let mut matrix = Self::new(taxon_set);
        for tree in trees {
            matrix.add_newick(tree.as_ref())?;
        }
        Ok(matrix)
    }

    /// Adds to every pair of taxa of the newick string the number of edges
    /// between them, and one to their weight.
    ///
    /// Distances are tracked while reading the string: each taxon already
    /// seen keeps its depth relative to the current position, raised by an
    /// opening bracket and by a closing bracket that leaves one of its
    /// ancestors, lowered by a closing bracket that ends a subtree opened
    /// after it.
    /// ```
    /// use phylokit::{distance::DistanceMatrix, taxa::TaxonSet};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c"]);
    /// let matrix: DistanceMatrix<f64> = DistanceMatrix::from_newick("((a,b),c);", &ts).unwrap();
    ///
    /// assert_eq!(*matrix.get(0, 1).unwrap(), 2.0);
    /// assert_eq!(*matrix.get(2, 0).unwrap(), 3.0);
    /// assert_eq!(*matrix.weight(1, 2).unwrap(), 1.0);
    /// ```
    pub fn add_newick(&mut self, newick: &str) -> Result<(), NewickParseError> {
        let n = self.size();
        let one = T::one();
        let two = one + one;

        let mut dists = vec![T::zero(); n];
        let mut ops = vec![0usize; n];
        let mut seen: Vec<TaxonId> = Vec::new();

        for lexeme in Tokenizer::newick(newick) {
            match lexeme?.token {
                Token::Open => {
                    for &s in seen.iter() {
                        ops[s] += 1;
                        dists[s] = dists[s] + one;
                    }
                }
                Token::Close => {
                    for &s in seen.iter() {
                        if ops[s] > 0 {
                            dists[s] = dists[s] - one;
                            ops[s] -= 1;
                        } else {
                            dists[s] = dists[s] + one;
                        }
                    }
                }
                Token::Name(name) => {
                    let id = self.taxon_set.lookup(name)?;
                    for &other in seen.iter() {
                        let idx = tril_index(other, id);
                        self.distance[idx] = self.distance[idx] + dists[other] + two;
                        self.weight[idx] = self.weight[idx] + one;
                    }
                    seen.push(id);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Adds the distances and weights of another matrix over the same taxa
    pub fn accumulate(&mut self, other: &DistanceMatrix<T>) -> Result<(), MatrixError> {
        if !std::ptr::eq(self.taxon_set, other.taxon_set) && self.taxon_set != other.taxon_set {
            return Err(MatrixError::SizeMismatch);
        }
        log::debug!("Accumulating distance matrix over {} taxa", self.size());

        for (d, &o) in self.distance.iter_mut().zip(other.distance.iter()) {
            *d = *d + o;
        }
        for (w, &o) in self.weight.iter_mut().zip(other.weight.iter()) {
            *w = *w + o;
        }

        Ok(())
    }

    /// Multiplies every distance and weight by a factor, means are unchanged
    pub fn scale(&mut self, factor: T) {
        for d in self.distance.iter_mut() {
            *d = *d * factor;
        }
        for w in self.weight.iter_mut() {
            *w = *w * factor;
        }
    }

    /// Mean distance between two taxa, the distance of a taxon to itself is zero
    pub fn mean(&self, t1: TaxonId, t2: TaxonId) -> Result<T, MatrixError> {
        if t1 == t2 {
            self.get_index(t1, t2)?;
            return Ok(T::zero());
        }
        let weight = *self.weight(t1, t2)?;
        if weight.is_zero() {
            return Err(MatrixError::MissingDistance(
                self.taxon_set[t1].to_string(),
                self.taxon_set[t2].to_string(),
            ));
        }
        Ok(*self.get(t1, t2)? / weight)
    }

    /// Agglomerative clustering of the taxa by UPGMA.
    ///
    /// Pairs are merged by increasing mean distance, the distance from a new
    /// cluster to another one is the average of the distances of its two
    /// parts, weighted by their weights. The merged entry then has a weight
    /// of one. Pairs with no distance are never merged directly.
    /// Returns every cluster formed, singletons included.
    /// ```
    /// use phylokit::{clade::Clade, distance::DistanceMatrix, taxa::TaxonSet};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c"]);
    /// let matrix: DistanceMatrix<f64> = DistanceMatrix::from_newick("((a,b),c);", &ts).unwrap();
    /// let clades = matrix.upgma();
    ///
    /// assert_eq!(clades.len(), 5);
    /// assert!(clades.contains(&Clade::from_literal(&ts, "{a,b}").unwrap()));
    /// ```
    pub fn upgma(&self) -> HashSet<Clade<'a>> {
        let ts = self.taxon_set;
        let n = ts.len();
        log::info!("Running UPGMA on {n} taxa");

        let mut dist: Vec<T> = self
            .distance
            .iter()
            .zip(self.weight.iter())
            .map(|(&d, &w)| if w.is_zero() { T::zero() } else { d / w })
            .collect();
        let mut weight = self.weight.clone();

        let mut clades = HashSet::new();
        let mut sets = DisjointSet::new(ts);
        let mut queue = BinaryHeap::new();

        for t1 in 0..n {
            clades.insert(Clade::singleton(ts, t1));
            for t2 in (t1 + 1)..n {
                let idx = tril_index(t1, t2);
                if !weight[idx].is_zero() {
                    queue.push(Reverse(Candidate::new(dist[idx], t1, t2, 1, 1)));
                }
            }
        }

        while let Some(Reverse(candidate)) = queue.pop() {
            let Candidate { t1, t2, s1, s2, .. } = candidate;
            // stale entries
            if sets.find(t1) != t1 || sets.find(t2) != t2 {
                continue;
            }
            if sets.size(t1) != s1 || sets.size(t2) != s2 {
                continue;
            }

            let root = sets.merge(t1, t2);
            clades.insert(sets.clade(root).clone());

            for t in 0..n {
                if t == root || sets.find(t) != t {
                    continue;
                }
                let (i1, i2) = (tril_index(t1, t), tril_index(t2, t));
                let (w1, w2) = (weight[i1], weight[i2]);
                let total = w1 + w2;
                if total.is_zero() {
                    continue;
                }

                let d = (w1 * dist[i1] + w2 * dist[i2]) / total;
                let idx = tril_index(root, t);
                dist[idx] = d;
                weight[idx] = T::one();

                queue.push(Reverse(Candidate::new(
                    d,
                    root,
                    t,
                    sets.size(root),
                    sets.size(t),
                )));
            }
        }

        clades
    }

    /// Returns a string representing the mean distance matrix in square format
    fn to_phylip_square(&self) -> Result<String, MatrixError> {
        let ids: Vec<_> = self.taxon_set.iter().sorted_by_key(|&(_, name)| name).collect();
        let mut output = format!("{}\n", self.size());

        for &(id1, name1) in ids.iter() {
            output += &format!("{name1}  ");
            for &(id2, _) in ids.iter() {
                output += &format!("  {}", self.mean(id1, id2)?);
            }
            output += "\n"
        }

        Ok(output)
    }

    /// Returns a string representing the mean distance matrix in triangle format
    fn to_phylip_triangle(&self) -> Result<String, MatrixError> {
        let ids: Vec<_> = self.taxon_set.iter().sorted_by_key(|&(_, name)| name).collect();
        let mut output = format!("{}\n", self.size());

        for &(id1, name1) in ids.iter() {
            output += &format!("{name1}  ");
            for &(id2, _) in ids.iter() {
                if id1 == id2 {
                    break;
                }
                output += &format!("  {}", self.mean(id1, id2)?);
            }
            output += "\n"
        }

        Ok(output)
    }

    /// Outputs the mean distances as a phylip formatted string, rows sorted by taxon name
    pub fn to_phylip(&self, square: bool) -> Result<String, MatrixError> {
        if square {
            self.to_phylip_square()
        } else {
            self.to_phylip_triangle()
        }
    }

    /// Writes the matrix to a phylip file
    pub fn to_file(&self, path: &Path, square: bool) -> Result<(), MatrixError> {
        match fs::write(path, self.to_phylip(square)?) {
            Ok(_) => Ok(()),
            Err(e) => Err(MatrixError::IoError(e)),
        }
    }

    /// Build a distance matrix from a phylip formatted string.
    /// Every row name must be in the taxon set.
    pub fn from_phylip(
        phylip: &str,
        taxon_set: &'a TaxonSet,
        square: bool,
    ) -> Result<Self, PhylipParseError<T>> {
        let mut lines = phylip.lines().filter(|line| !line.trim().is_empty());
        let size = lines
            .next()
            .ok_or(PhylipParseError::EmptyMatrixFile)?
            .trim()
            .parse()
            .map_err(PhylipParseError::SizeParseError)?;

        let mut ids = vec![];
        let mut rows = vec![];

        for (i, line) in lines.enumerate() {
            let mut fields = line.split_whitespace();
            let name = fields.next().ok_or(PhylipParseError::EmptyRow(i))?;
            let dists: Result<Vec<T>, _> = fields
                .map(|d| d.parse::<T>().map_err(|_| PhylipParseError::DistParseError))
                .collect();

            let dists = dists?;

            if square && dists.len() != size || !square && dists.len() != i {
                return Err(PhylipParseError::MissingDistance(i + 1));
            }

            ids.push(taxon_set.lookup(name)?);
            rows.push(dists);
        }

        if ids.len() != size {
            return Err(PhylipParseError::SizeAndRowsMismatch(ids.len(), size));
        }

        if square {
            for (i, row) in rows.iter().enumerate() {
                for (j, &dist) in row.iter().enumerate().take(i) {
                    if dist != rows[j][i] {
                        return Err(PhylipParseError::NonSymmetric(dist, rows[j][i]));
                    }
                }
            }
        }

        let mut matrix = Self::new(taxon_set);
        for (&id1, row) in ids.iter().zip(rows) {
            for (&id2, dist) in ids.iter().zip(row) {
                if id1 != id2 {
                    matrix.set(id1, id2, dist)?;
                }
            }
        }

        Ok(matrix)
    }

    /// Reads the matrix from a phylip file
    pub fn from_file(
        path: &Path,
        taxon_set: &'a TaxonSet,
        square: bool,
    ) -> Result<Self, PhylipParseError<T>> {
        let phylip = fs::read_to_string(path)?;
        Self::from_phylip(&phylip, taxon_set, square)
    }
}

impl<T> MulAssign<T> for DistanceMatrix<'_, T>
where
    T: Display + Debug + Float + FromStr,
{
    fn mul_assign(&mut self, rhs: T) {
        self.scale(rhs)
    }
}

/// Union-find over the taxa of a [`TaxonSet`] that also tracks, for every
/// cluster, its size and the clade of its members.
#[derive(Debug, Clone)]
pub struct DisjointSet<'a> {
    parent: Vec<usize>,
    rank: Vec<usize>,
    size: Vec<usize>,
    clade: Vec<Clade<'a>>,
}

impl<'a> DisjointSet<'a> {
    /// Every taxon in its own cluster
    pub fn new(taxon_set: &'a TaxonSet) -> Self {
        let n = taxon_set.len();
        Self {
            parent: (0..n).collect(),
            rank: vec![1; n],
            size: vec![1; n],
            clade: (0..n).map(|t| Clade::singleton(taxon_set, t)).collect(),
        }
    }

    /// Representative of the cluster of `x`
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the clusters of `x` and `y` by rank, returns the new representative
    pub fn merge(&mut self, x: usize, y: usize) -> usize {
        let x = self.find(x);
        let y = self.find(y);
        if x == y {
            return x;
        }

        let (root, child) = match self.rank[x].cmp(&self.rank[y]) {
            Ordering::Greater => (x, y),
            Ordering::Less => (y, x),
            Ordering::Equal => {
                self.rank[y] += 1;
                (y, x)
            }
        };

        self.parent[child] = root;
        self.size[root] += self.size[child];
        self.clade[root] = self.clade[root].plus(&self.clade[child]);

        root
    }

    /// Size of the cluster whose representative is `x`
    pub fn size(&self, x: usize) -> usize {
        self.size[x]
    }

    /// Members of the cluster whose representative is `x`
    pub fn clade(&self, x: usize) -> &Clade<'a> {
        &self.clade[x]
    }
}

/// Entry of the UPGMA queue, ordered by distance then by the other fields
#[derive(Debug, Clone, Copy)]
struct Candidate<T> {
    distance: T,
    t1: TaxonId,
    t2: TaxonId,
    s1: usize,
    s2: usize,
}

impl<T> Candidate<T> {
    fn new(distance: T, t1: TaxonId, t2: TaxonId, s1: usize, s2: usize) -> Self {
        Self {
            distance,
            t1,
            t2,
            s1,
            s2,
        }
    }
}

impl<T: Float> Ord for Candidate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                (self.t1, self.t2, self.s1, self.s2).cmp(&(other.t1, other.t2, other.s1, other.s2))
            })
    }
}

impl<T: Float> PartialOrd for Candidate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Float> PartialEq for Candidate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Float> Eq for Candidate<T> {}

#[cfg(test)]
mod tests {

    use super::*;

    const SQUARE: &str = "4
s1    0  2  3  5
s2    2  0  6  10
s3    3  6  0  15
s5    5  10  15  0
";

    const TRIANGLE: &str = "4
s1
s2    2
s3    3  6
s5    5  10  15
";

    fn phylip_taxa() -> TaxonSet {
        TaxonSet::from_names(["s5", "s3", "s2", "s1"])
    }

    fn build_matrix(ts: &TaxonSet) -> DistanceMatrix<f32> {
        let names = vec![("s1", 1.0), ("s2", 2.0), ("s3", 3.0), ("s5", 5.0)];
        let mut matrix = DistanceMatrix::new(ts);

        for pair in names.iter().combinations(2) {
            let (n1, d1) = pair[0];
            let (n2, d2) = pair[1];
            matrix
                .set(ts.lookup(n1).unwrap(), ts.lookup(n2).unwrap(), d1 * d2)
                .unwrap();
        }

        matrix
    }

    #[test]
    fn packed_indices() {
        assert_eq!(tril_index(0, 0), 0);
        assert_eq!(tril_index(0, 1), 1);
        assert_eq!(tril_index(1, 1), 2);
        assert_eq!(tril_index(2, 0), 3);
        assert_eq!(tril_index(3, 2), tril_index(2, 3));
        assert_eq!(tril_index(3, 3), 9);
    }

    #[test]
    fn get_and_set() {
        let ts = TaxonSet::from_names(["a", "b", "c"]);
        let mut matrix: DistanceMatrix<usize> = DistanceMatrix::new(&ts);
        assert!(!matrix.has(0, 2));

        matrix.set(2, 0, 7).unwrap();
        assert!(matrix.has(0, 2));
        assert_eq!(*matrix.get(0, 2).unwrap(), 7);
        assert_eq!(*matrix.weight(2, 0).unwrap(), 1);

        *matrix.get_mut(1, 1).unwrap() += 3;
        assert_eq!(*matrix.get(1, 1).unwrap(), 3);
        assert!(!matrix.has(1, 1));

        assert!(matches!(
            matrix.get(0, 3),
            Err(MatrixError::UnknownTaxonId(3))
        ));
        assert!(!matrix.has(5, 0));
    }

    #[test]
    fn from_newick() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
        let matrix: DistanceMatrix<f64> =
            DistanceMatrix::from_newick("((a:1,b:2)90:1,(c, d));", &ts).unwrap();

        let test_cases = vec![
            ((0, 1), 2.0),
            ((0, 2), 4.0),
            ((0, 3), 4.0),
            ((1, 2), 4.0),
            ((2, 3), 2.0),
        ];
        for ((t1, t2), dist) in test_cases {
            assert_eq!(*matrix.get(t1, t2).unwrap(), dist, "({t1}, {t2})");
            assert_eq!(*matrix.weight(t2, t1).unwrap(), 1.0);
        }
        assert!(!matrix.has(0, 0));

        let matrix: DistanceMatrix<f64> = DistanceMatrix::from_newick("(a,(b,c));", &ts).unwrap();
        assert_eq!(*matrix.get(0, 1).unwrap(), 3.0);
        assert_eq!(*matrix.get(0, 2).unwrap(), 3.0);
        assert_eq!(*matrix.get(1, 2).unwrap(), 2.0);
        assert!(!matrix.has(0, 3));
    }

    #[test]
    fn accumulate_and_scale() {
        let ts = TaxonSet::from_names(["a", "b", "c"]);
        let mut matrix: DistanceMatrix<f64> =
            DistanceMatrix::from_trees(["((a,b),c);", "((a,c),b);"], &ts).unwrap();

        assert_eq!(*matrix.get(0, 1).unwrap(), 5.0);
        assert_eq!(*matrix.weight(0, 1).unwrap(), 2.0);
        assert_eq!(matrix.mean(0, 1).unwrap(), 2.5);
        assert_eq!(matrix.mean(1, 2).unwrap(), 3.0);
        assert_eq!(matrix.mean(1, 1).unwrap(), 0.0);

        matrix *= 0.5;
        assert_eq!(*matrix.get(0, 1).unwrap(), 2.5);
        assert_eq!(*matrix.weight(0, 1).unwrap(), 1.0);
        assert_eq!(matrix.mean(0, 1).unwrap(), 2.5);

        let other = DistanceMatrix::from_newick("(a,(b,c));", &ts).unwrap();
        matrix.accumulate(&other).unwrap();
        assert_eq!(*matrix.weight(0, 1).unwrap(), 2.0);
        assert_eq!(*matrix.get(1, 2).unwrap(), 3.0 + 2.0);
    }

    #[test]
    fn accumulate_mismatch() {
        let ts1 = TaxonSet::from_names(["a", "b", "c"]);
        let ts2 = TaxonSet::from_names(["a", "b", "d"]);
        let mut m1: DistanceMatrix<f64> = DistanceMatrix::new(&ts1);
        let m2: DistanceMatrix<f64> = DistanceMatrix::new(&ts2);

        assert!(matches!(
            m1.accumulate(&m2),
            Err(MatrixError::SizeMismatch)
        ));
    }

    #[test]
    fn missing_mean() {
        let ts = TaxonSet::from_names(["a", "b"]);
        let matrix: DistanceMatrix<f64> = DistanceMatrix::new(&ts);
        match matrix.mean(0, 1) {
            Err(MatrixError::MissingDistance(a, b)) => assert_eq!((a.as_str(), b.as_str()), ("a", "b")),
            other => panic!("Expected a missing distance, got {other:?}"),
        }
    }

    #[test]
    fn disjoint_set() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
        let mut sets = DisjointSet::new(&ts);

        let r1 = sets.merge(0, 1);
        assert_eq!(sets.find(0), r1);
        assert_eq!(sets.find(1), r1);
        assert_eq!(sets.size(r1), 2);

        let r2 = sets.merge(2, r1);
        assert_eq!(r2, r1);
        assert_eq!(sets.size(r2), 3);
        assert_eq!(sets.clade(r2).to_string(), "{a, b, c}");
        assert_eq!(sets.merge(1, 2), r2);

        assert_eq!(sets.find(3), 3);
        assert_eq!(sets.size(3), 1);
    }

    #[test]
    fn upgma() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
        let matrix: DistanceMatrix<f64> =
            DistanceMatrix::from_newick("((a,b),(c,d));", &ts).unwrap();
        let clades = matrix.upgma();

        let expected = ["{a}", "{b}", "{c}", "{d}", "{a,b}", "{c,d}", "{a,b,c,d}"];
        assert_eq!(clades.len(), expected.len());
        for literal in expected {
            assert!(clades.contains(&Clade::from_literal(&ts, literal).unwrap()));
        }
    }

    #[test]
    fn upgma_consensus() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d", "e"]);
        let trees = [
            "(((a,b),c),(d,e));",
            "(((a,b),c),(d,e));",
            "(((a,c),b),(d,e));",
        ];
        let matrix: DistanceMatrix<f64> = DistanceMatrix::from_trees(trees, &ts).unwrap();
        let clades = matrix.upgma();

        for literal in ["{a,b}", "{a,b,c}", "{d,e}", "{a,b,c,d,e}"] {
            assert!(
                clades.contains(&Clade::from_literal(&ts, literal).unwrap()),
                "missing {literal}"
            );
        }
        assert_eq!(clades.len(), 9);
    }

    #[test]
    fn upgma_merged_entries_have_unit_weight() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d", "e"]);
        let mut matrix: DistanceMatrix<f64> = DistanceMatrix::new(&ts);
        let test_cases = vec![
            ((0, 1), 1.0),
            ((0, 2), 2.0),
            ((1, 2), 2.0),
            ((0, 3), 10.0),
            ((1, 3), 10.0),
            ((2, 3), 4.0),
            ((3, 4), 7.5),
            ((0, 4), 20.0),
            ((1, 4), 20.0),
            ((2, 4), 20.0),
        ];
        for ((t1, t2), dist) in test_cases {
            matrix.set(t1, t2, dist).unwrap();
        }

        // {a,b,c} is 7 away from d, closer than e
        let clades = matrix.upgma();
        assert!(clades.contains(&Clade::from_literal(&ts, "{a,b,c,d}").unwrap()));
        assert!(!clades.contains(&Clade::from_literal(&ts, "{d,e}").unwrap()));
        assert_eq!(clades.len(), 9);
    }

    #[test]
    fn upgma_without_distances() {
        let ts = TaxonSet::from_names(["a", "b", "c"]);
        let matrix: DistanceMatrix<f64> = DistanceMatrix::new(&ts);
        let clades = matrix.upgma();
        assert_eq!(clades.len(), 3);
        assert!(clades.iter().all(|clade| clade.size() == 1));
    }

    #[test]
    fn test_to_phylip() {
        let ts = phylip_taxa();
        let matrix = build_matrix(&ts);

        assert_eq!(SQUARE, matrix.to_phylip(true).unwrap());
        assert_eq!(TRIANGLE, matrix.to_phylip(false).unwrap());
    }

    #[test]
    fn to_phylip_missing_distance() {
        let ts = TaxonSet::from_names(["a", "b"]);
        let matrix: DistanceMatrix<f64> = DistanceMatrix::new(&ts);
        assert!(matches!(
            matrix.to_phylip(true),
            Err(MatrixError::MissingDistance(_, _))
        ));
    }

    #[test]
    fn from_phylip() -> Result<(), PhylipParseError<f32>> {
        let ts = phylip_taxa();
        let build: DistanceMatrix<f32> = DistanceMatrix::from_phylip(SQUARE, &ts, true)?;
        assert_eq!(
            SQUARE,
            build.to_phylip(true).unwrap(),
            "{SQUARE}\n{}",
            build.to_phylip(true).unwrap()
        );

        let build: DistanceMatrix<f32> = DistanceMatrix::from_phylip(TRIANGLE, &ts, false)?;
        assert_eq!(
            TRIANGLE,
            build.to_phylip(false).unwrap(),
            "{TRIANGLE}\n{}",
            build.to_phylip(false).unwrap()
        );

        Ok(())
    }

    #[test]
    fn from_phylip_errors() {
        let ts = phylip_taxa();

        let square_nonsym = "4
s1    0  2  3  7
s2    2  0  6  10
s3    3  6  0  15
s5    5  10  15  0
";
        let mut matrix: Result<DistanceMatrix<f32>, _> =
            DistanceMatrix::from_phylip(square_nonsym, &ts, true);
        let err = matrix.err().unwrap();
        match err {
            PhylipParseError::NonSymmetric(_, _) => {}
            _ => panic!("Error should be 'PhylipParseError::NonSymmetric' not: {err}"),
        }

        let square_missing_dist = "4
s1    0  2  3  7
s2    2  0  6  10
s3    3  6  0
s5    5  10  15  0
";
        matrix = DistanceMatrix::from_phylip(square_missing_dist, &ts, true);
        let err = matrix.err().unwrap();
        match err {
            PhylipParseError::MissingDistance(_) => {}
            _ => panic!("Error should be 'PhylipParseError::MissingDistance' not: {err}"),
        }

        let square_missing_row = "4
s1    0  2  3  7
s2    2  0  6  10
s5    5  10  15  0
";
        matrix = DistanceMatrix::from_phylip(square_missing_row, &ts, true);
        let err = matrix.err().unwrap();
        match err {
            PhylipParseError::SizeAndRowsMismatch(_, _) => {}
            _ => panic!("Error should be 'PhylipParseError::SizeAndRowsMismatch' not: {err}"),
        }

        let square_missing_size = "s1    0  2  3  7
s2    2  0  6  10
s3    3  6  0  15
s5    5  10  15  0
";
        matrix = DistanceMatrix::from_phylip(square_missing_size, &ts, true);
        let err = matrix.err().unwrap();
        match err {
            PhylipParseError::SizeParseError(_) => {}
            _ => panic!("Error should be 'PhylipParseError::SizeParseError' not: {err}"),
        }

        let unknown_taxon = "2
s1    0  2
s9    2  0
";
        matrix = DistanceMatrix::from_phylip(unknown_taxon, &ts, true);
        let err = matrix.err().unwrap();
        match err {
            PhylipParseError::TaxonError(TaxonError::UnknownTaxon(_)) => {}
            _ => panic!("Error should be 'PhylipParseError::TaxonError' not: {err}"),
        }
    }

    #[test]
    fn files() {
        let ts = phylip_taxa();
        let matrix = build_matrix(&ts);
        let path = std::env::temp_dir().join("phylokit_distance_files.phy");

        matrix.to_file(&path, false).unwrap();
        let read: DistanceMatrix<f32> = DistanceMatrix::from_file(&path, &ts, false).unwrap();
        assert_eq!(read.to_phylip(true).unwrap(), SQUARE);

        std::fs::remove_file(&path).unwrap();
    }
}
