//! Weighted quartet tables
//!
//! A quartet `((a,b),(c,d))` is a four taxon topology. A [`QuartetTable`]
//! stores a weight for every ordered quadruple of taxa of a [`TaxonSet`];
//! setting a quartet stores its weight under the eight orderings that
//! describe the same topology.

use std::{fmt::Display, fs, path::Path};

use thiserror::Error;

use crate::taxa::{TaxonError, TaxonId, TaxonSet};

/// Errors that can occur when reading quartets
#[derive(Error, Debug)]
pub enum QuartetError {
    /// The quartet does not name exactly four taxa
    #[error("Quartet {line:?} names {count} taxa instead of 4")]
    WrongTaxonCount {
        /// Text of the quartet
        line: String,
        /// Number of names found
        count: usize,
    },
    /// The weight after the delimiter is not a number
    #[error("Could not parse quartet weight {0:?}")]
    WeightParseError(String),
    /// One of the names is not in the taxon set
    #[error(transparent)]
    TaxonError(#[from] TaxonError),
    /// There was an [`std::io::Error`] when reading the quartet file
    #[error("Error reading quartet file")]
    IoError(#[from] std::io::Error),
}

/// Four taxa, the first two on one side of the quartet and the last two on the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quartet {
    /// Identifiers of the four taxa
    pub taxa: [TaxonId; 4],
}

impl Quartet {
    /// Quartet `((a,b),(c,d))`
    pub fn new(a: TaxonId, b: TaxonId, c: TaxonId, d: TaxonId) -> Self {
        Self { taxa: [a, b, c, d] }
    }

    /// Parses a weighted quartet.
    ///
    /// The topology is either in newick form `((a,b),(c,d))` or in
    /// `a,b|c,d` form. It is followed by `:weight` or `; weight`, without
    /// either the weight is 1.
    /// ```
    /// use phylokit::{quartet::Quartet, taxa::TaxonSet};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
    ///
    /// let (q, w) = Quartet::parse("((a,c),(b,d)):0.5", &ts).unwrap();
    /// assert_eq!(q, Quartet::new(0, 2, 1, 3));
    /// assert_eq!(w, 0.5);
    ///
    /// let (q, w) = Quartet::parse("d,c|b,a", &ts).unwrap();
    /// assert_eq!(q, Quartet::new(3, 2, 1, 0));
    /// assert_eq!(w, 1.0);
    /// ```
    pub fn parse(line: &str, taxon_set: &TaxonSet) -> Result<(Self, f64), QuartetError> {
        let (topology, weight) = match line.find(|c: char| c == ':' || c == ';') {
            Some(pos) => {
                let text = line[pos + 1..].trim();
                let weight: f64 = text
                    .parse()
                    .map_err(|_| QuartetError::WeightParseError(text.to_string()))?;
                (&line[..pos], weight)
            }
            None => (line, 1.0),
        };

        let topology = topology.trim();
        let delimiters: &[char] = if topology.starts_with('(') {
            &['(', ')', ',']
        } else {
            &['|', ',']
        };

        let names: Vec<_> = topology
            .split(delimiters)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        if names.len() != 4 {
            return Err(QuartetError::WrongTaxonCount {
                line: line.to_string(),
                count: names.len(),
            });
        }

        let mut taxa = [0; 4];
        for (taxon, name) in taxa.iter_mut().zip(names) {
            *taxon = taxon_set.lookup(name)?;
        }

        Ok((Self { taxa }, weight))
    }

    /// Newick like representation `((a, b),(c, d))`
    pub fn to_newick(&self, taxon_set: &TaxonSet) -> String {
        let [a, b, c, d] = self.taxa.map(|t| &taxon_set[t]);
        format!("(({a}, {b}),({c}, {d}))")
    }
}

/// Weights of every ordered quadruple of taxa, zero when unset
#[derive(Debug, Clone)]
pub struct QuartetTable<'a> {
    taxon_set: &'a TaxonSet,
    values: Vec<f64>,
}

impl<'a> QuartetTable<'a> {
    /// Creates a table with every weight at zero
    pub fn new(taxon_set: &'a TaxonSet) -> Self {
        let n = taxon_set.len();
        log::debug!("Making quartet table with size {n}");
        Self {
            taxon_set,
            values: vec![0.0; n.pow(4)],
        }
    }

    /// Creates a table and fills it from a quartet file
    pub fn from_file(path: &Path, taxon_set: &'a TaxonSet) -> Result<Self, QuartetError> {
        let mut table = Self::new(taxon_set);
        table.read_file(path)?;
        Ok(table)
    }

    /// The taxon set of the table
    pub fn taxon_set(&self) -> &'a TaxonSet {
        self.taxon_set
    }

    fn index(&self, a: TaxonId, b: TaxonId, c: TaxonId, d: TaxonId) -> Result<usize, TaxonError> {
        let n = self.taxon_set.len();
        let mut idx = 0;
        for t in [a, b, c, d] {
            if t >= n {
                return Err(TaxonError::UnknownTaxonId(t));
            }
            idx = idx * n + t;
        }
        Ok(idx)
    }

    /// Weight stored for the ordered quadruple
    pub fn get(&self, a: TaxonId, b: TaxonId, c: TaxonId, d: TaxonId) -> Result<f64, TaxonError> {
        Ok(self.values[self.index(a, b, c, d)?])
    }

    /// Weight of a quartet
    pub fn weight(&self, quartet: &Quartet) -> Result<f64, TaxonError> {
        let [a, b, c, d] = quartet.taxa;
        self.get(a, b, c, d)
    }

    /// Sets the weight of the quartet `((a,b),(c,d))` under all of its orderings
    /// ```
    /// use phylokit::{quartet::QuartetTable, taxa::TaxonSet};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
    /// let mut table = QuartetTable::new(&ts);
    /// table.set(0, 1, 2, 3, 2.0).unwrap();
    ///
    /// assert_eq!(table.get(3, 2, 1, 0).unwrap(), 2.0);
    /// assert_eq!(table.get(0, 2, 1, 3).unwrap(), 0.0);
    /// ```
    pub fn set(
        &mut self,
        a: TaxonId,
        b: TaxonId,
        c: TaxonId,
        d: TaxonId,
        value: f64,
    ) -> Result<(), TaxonError> {
        for (w, x, y, z) in [
            (a, b, c, d),
            (b, a, c, d),
            (a, b, d, c),
            (b, a, d, c),
            (c, d, a, b),
            (c, d, b, a),
            (d, c, a, b),
            (d, c, b, a),
        ] {
            let idx = self.index(w, x, y, z)?;
            self.values[idx] = value;
        }
        Ok(())
    }

    /// Reads one quartet per non empty line, returns the number of quartets read
    pub fn read(&mut self, text: &str) -> Result<usize, QuartetError> {
        let mut count = 0;
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let (quartet, weight) = Quartet::parse(line, self.taxon_set)?;
            let [a, b, c, d] = quartet.taxa;
            self.set(a, b, c, d, weight)?;
            count += 1;
        }
        Ok(count)
    }

    /// Reads a quartet file, see [`QuartetTable::read`]
    pub fn read_file(&mut self, path: &Path) -> Result<usize, QuartetError> {
        let text = fs::read_to_string(path)?;
        let count = self.read(&text)?;
        log::info!("Read {count} quartets from {}", path.display());
        Ok(count)
    }
}

impl Display for QuartetTable<'_> {
    /// Lists the three topologies of every set of four taxa with their weights
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.taxon_set.len();
        for i in 0..n {
            for j in 0..i {
                for k in 0..j {
                    for l in 0..k {
                        for q in [
                            Quartet::new(i, j, k, l),
                            Quartet::new(i, k, l, j),
                            Quartet::new(l, i, j, k),
                        ] {
                            let [a, b, c, d] = q.taxa;
                            let w = self.values[(((a * n + b) * n + c) * n) + d];
                            writeln!(f, "{}:{}", q.to_newick(self.taxon_set), w)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quartets() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d", "e"]);
        let test_cases = vec![
            ("((a,b),(c,d)):3", Quartet::new(0, 1, 2, 3), 3.0),
            ("((e, a),(b, c))", Quartet::new(4, 0, 1, 2), 1.0),
            ("a,e|d,b:0.25", Quartet::new(0, 4, 3, 1), 0.25),
            ("c,d|a,b; 7", Quartet::new(2, 3, 0, 1), 7.0),
        ];

        for (line, quartet, weight) in test_cases {
            let (q, w) = Quartet::parse(line, &ts).unwrap();
            assert_eq!(q, quartet, "{line}");
            assert_eq!(w, weight, "{line}");
        }
    }

    #[test]
    fn parse_errors() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d"]);

        assert!(matches!(
            Quartet::parse("((a,b),c):1", &ts),
            Err(QuartetError::WrongTaxonCount { count: 3, .. })
        ));
        assert!(matches!(
            Quartet::parse("a,b|c,x", &ts),
            Err(QuartetError::TaxonError(TaxonError::UnknownTaxon(_)))
        ));
        assert!(matches!(
            Quartet::parse("a,b|c,d:heavy", &ts),
            Err(QuartetError::WeightParseError(_))
        ));
    }

    #[test]
    fn symmetric_orderings() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
        let mut table = QuartetTable::new(&ts);
        table.set(0, 1, 2, 3, 4.0).unwrap();

        let same = [
            [0, 1, 2, 3],
            [1, 0, 2, 3],
            [0, 1, 3, 2],
            [1, 0, 3, 2],
            [2, 3, 0, 1],
            [2, 3, 1, 0],
            [3, 2, 0, 1],
            [3, 2, 1, 0],
        ];
        for [a, b, c, d] in same {
            assert_eq!(table.get(a, b, c, d).unwrap(), 4.0);
        }
        assert_eq!(table.weight(&Quartet::new(0, 2, 1, 3)).unwrap(), 0.0);
        assert_eq!(table.get(0, 1, 2, 4), Err(TaxonError::UnknownTaxonId(4)));
    }

    #[test]
    fn read_and_display() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
        let mut table = QuartetTable::new(&ts);
        let count = table
            .read("((a,b),(c,d)):2\n\nd,b|c,a:0.5\n")
            .unwrap();
        assert_eq!(count, 2);

        assert_eq!(
            table.to_string(),
            "((d, c),(b, a)):2\n((d, b),(a, c)):0.5\n((a, d),(c, b)):0\n"
        );
    }

    #[test]
    fn files() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
        let path = std::env::temp_dir().join("phylokit_quartet_files.txt");
        std::fs::write(&path, "a,c|b,d; 1.5\n").unwrap();

        let table = QuartetTable::from_file(&path, &ts).unwrap();
        assert_eq!(table.get(2, 0, 3, 1).unwrap(), 1.5);

        std::fs::remove_file(&path).unwrap();
    }
}
