//! Phylogenetic toolkit over a fixed set of taxa.
//!
//! Trees are read from Newick strings against a [`taxa::TaxonSet`], every
//! node of a [`tree::Tree`] carrying the [`clade::Clade`] of taxa below it.
//! Distances between taxa accumulated over many trees are stored in a
//! [`distance::DistanceMatrix`] that can be clustered with UPGMA.

use std::collections::VecDeque;

use itertools::Itertools;
use rand::prelude::*;

use tree::{NodeId, TreeError, ROOT};

pub mod bitset;
pub mod clade;
pub mod distance;
pub mod newick;
pub mod quartet;
pub mod taxa;
pub mod tree;

type Error = Box<dyn std::error::Error>;
type Result<T> = std::result::Result<T, Error>;

fn topology_to_newick(id: NodeId, children: &[Vec<NodeId>], tips: &[usize]) -> String {
    if children[id].is_empty() {
        return format!("Tip_{}", tips[id]);
    }
    format!(
        "({})",
        children[id]
            .iter()
            .map(|child| topology_to_newick(*child, children, tips))
            .join(",")
    )
}

/// Generates a random binary topology with tips named `Tip_{i}`, as a newick string.
///
/// Leaves are split one at a time, taken at random from either end of the
/// queue of current leaves.
/// ```
/// use phylokit::{generate_newick, taxa::TaxonSet, tree::Tree};
///
/// let newick = generate_newick(10, &mut rand::thread_rng()).unwrap();
/// let taxa = TaxonSet::from_newick(&[&newick]).unwrap();
/// let tree = Tree::from_newick(&newick, &taxa).unwrap();
///
/// assert_eq!(tree.n_leaves(), 10);
/// ```
pub fn generate_newick<R: Rng + ?Sized>(n_leaves: usize, rng: &mut R) -> Result<String> {
    if n_leaves == 0 {
        return Err(Box::new(TreeError::IsEmpty));
    }

    let mut children: Vec<Vec<NodeId>> = vec![vec![]];
    let mut next_deq = VecDeque::new();
    next_deq.push_back(ROOT);

    for _ in 0..(n_leaves - 1) {
        let parent_id = if rng.gen_bool(0.5) {
            next_deq.pop_front()
        } else {
            next_deq.pop_back()
        }
        .ok_or(TreeError::IsEmpty)?;

        for _ in 0..2 {
            let id = children.len();
            children.push(vec![]);
            children[parent_id].push(id);
            next_deq.push_back(id);
        }
    }

    let mut tips = vec![0; children.len()];
    for (i, id) in next_deq.iter().enumerate() {
        tips[*id] = i;
    }

    Ok(format!("{};", topology_to_newick(ROOT, &children, &tips)))
}

/// Generates a caterpillar topology `(Tip_1,(Tip_2,(...,(Tip_{n-1},Tip_n))));`
pub fn generate_caterpillar(n_leaves: usize) -> Result<String> {
    if n_leaves == 0 {
        return Err(Box::new(TreeError::IsEmpty));
    }

    let mut newick = format!("Tip_{n_leaves}");
    for i in (1..n_leaves).rev() {
        newick = format!("(Tip_{i},{newick})");
    }
    newick.push(';');

    Ok(newick)
}
