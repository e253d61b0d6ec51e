use std::{collections::HashSet, fmt::Display, fs, path::Path};

use itertools::Itertools;
use ptree::{print_tree, TreeBuilder};
use thiserror::Error;

use super::node::{NodeError, TreeClade};
use super::{NodeId, ROOT};

use crate::{
    bitset::BitSet,
    clade::Clade,
    distance::{DistanceMatrix, MatrixError},
    newick::{self, NewickParseError},
    taxa::{TaxonId, TaxonSet},
};

/// Errors that can occur when reading, writing and manipulating [`Tree`] structs.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The tree is empty and we are trying to do something that require at least one node
    #[error("This tree is empty.")]
    IsEmpty,
    /// The requested node with index [`NodeId`] does not exist in the tree
    #[error("There is no node with index: {0}")]
    NodeNotFound(NodeId),
    /// The node does not have a child at this position
    #[error("Node {node} has no child at position {index}")]
    ChildIndexOutOfRange {
        /// Id of the node
        node: NodeId,
        /// Requested position in the children list
        index: usize,
    },
    /// The operation needs a root with exactly two children
    #[error("The root must have exactly 2 children, it has {0}")]
    RootNotBinary(usize),
    /// The taxon is not below the root of the tree
    #[error("Taxon {0} is not in the tree")]
    TaxonNotInTree(TaxonId),
    /// The trees we want to compare are not over the same taxa
    #[error("The trees are not built over the same taxon set")]
    SizeMismatch,
    /// There was a [`std::io::Error`] when writing or printing the tree
    #[error("Error writing tree")]
    IoError(#[from] std::io::Error),
    /// There was a [`NodeError`] when operating on a node
    #[error("Could not operate on node: {0}")]
    NodeError(#[from] NodeError),
    /// There was a [`MatrixError`] when filling a matrix from the tree
    #[error("Could not fill matrix: {0}")]
    MatrixError(#[from] MatrixError),
}

/// A phylogenetic tree stored as an arena of [`TreeClade`] nodes.
///
/// Node [`ROOT`] is the root. Every node holds the clade of taxa below it,
/// nodes are only ever appended and their ids are never reused.
#[derive(Debug, Clone)]
pub struct Tree<'a> {
    nodes: Vec<TreeClade<'a>>,
    taxon_set: &'a TaxonSet,
}

/// Base methods to add and get [`TreeClade`] objects to and from the [`Tree`].
impl<'a> Tree<'a> {
    /// Create a new empty Tree object over a taxon set
    pub fn new(taxon_set: &'a TaxonSet) -> Self {
        Self {
            nodes: Vec::new(),
            taxon_set,
        }
    }

    // ############################
    // # ADDING AND GETTING NODES #
    // ############################

    /// Add a new parentless node with an empty clade, returns its id
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeClade::new(self.taxon_set, id));
        id
    }

    /// Make `child` a child of `parent`.
    ///
    /// # Example
    /// ```
    /// use phylokit::{taxa::TaxonSet, tree::Tree};
    ///
    /// let ts = TaxonSet::from_names(["a", "b"]);
    /// let mut tree = Tree::new(&ts);
    /// let root = tree.add_node();
    /// let left = tree.add_node();
    /// let right = tree.add_node();
    /// tree.add_child(root, left).unwrap();
    /// tree.add_child(root, right).unwrap();
    ///
    /// assert_eq!(tree.get(&root).unwrap().children, vec![left, right]);
    /// assert_eq!(tree.get(&right).unwrap().parent, Some(root));
    /// ```
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.get(&parent)?;
        self.get_mut(&child)?.parent = Some(parent);
        self.get_mut(&parent)?.add_child(child);
        Ok(())
    }

    /// Get a reference to a specific Node of the tree
    pub fn get(&self, id: &NodeId) -> Result<&TreeClade<'a>, TreeError> {
        self.nodes.get(*id).ok_or(TreeError::NodeNotFound(*id))
    }

    /// Get a mutable reference to a specific Node of the tree
    pub fn get_mut(&mut self, id: &NodeId) -> Result<&mut TreeClade<'a>, TreeError> {
        self.nodes.get_mut(*id).ok_or(TreeError::NodeNotFound(*id))
    }

    /// Get a reference to the root node
    pub fn root(&self) -> Result<&TreeClade<'a>, TreeError> {
        self.nodes.first().ok_or(TreeError::IsEmpty)
    }

    /// Taxa of the tree, i.e. the clade of the root
    pub fn taxa(&self) -> Result<&Clade<'a>, TreeError> {
        Ok(self.root()?.clade())
    }

    /// The taxon set the tree is built over
    pub fn taxon_set(&self) -> &'a TaxonSet {
        self.taxon_set
    }

    /// Returns the number of nodes in the tree
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaves in the tree
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|&node| node.is_tip()).count()
    }

    /// Returns a [`Vec`] containing the Node IDs of leaf nodes of the tree
    pub fn get_leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|&node| node.is_tip())
            .map(|node| node.id)
            .collect()
    }

    /// Set of the clades of every node
    pub fn clades(&self) -> HashSet<Clade<'a>> {
        self.nodes.iter().map(|node| node.clade().clone()).collect()
    }
}

impl<'a> Tree<'a> {
    // ###################
    // # TREE TRAVERSALS #
    // ###################

    /// Returns a vector containing node ids in the same order as the
    /// [preorder](https://en.wikipedia.org/wiki/Tree_traversal#Pre-order,_NLR) tree traversal
    /// ```
    /// use phylokit::{taxa::TaxonSet, tree::{Tree, ROOT}};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c"]);
    /// let tree = Tree::from_newick("((a,b),c);", &ts).unwrap();
    ///
    /// assert_eq!(tree.preorder(&ROOT).unwrap(), vec![0, 1, 2, 3, 4]);
    /// ```
    pub fn preorder(&self, root: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut indices = vec![*root];
        for child in self.get(root)?.children.iter() {
            indices.extend(self.preorder(child)?)
        }

        Ok(indices)
    }

    /// Returns a vector containing node ids in the same order as the
    /// [postorder](https://en.wikipedia.org/wiki/Tree_traversal#Post-order,_LRN ) tree traversal
    /// ```
    /// use phylokit::{taxa::TaxonSet, tree::{Tree, ROOT}};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c"]);
    /// let tree = Tree::from_newick("((a,b),c);", &ts).unwrap();
    ///
    /// assert_eq!(tree.postorder(&ROOT).unwrap(), vec![2, 3, 1, 4, 0]);
    /// ```
    pub fn postorder(&self, root: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut indices = vec![];
        for child in self.get(root)?.children.iter() {
            indices.extend(self.postorder(child)?)
        }
        indices.push(*root);

        Ok(indices)
    }

    /// Checks the links and clades of every node below the root: each child
    /// must point back to its parent and a node with more than one taxon
    /// must hold exactly the union of its children.
    /// Violations are reported with [`log::debug!`].
    pub fn verify(&self) -> bool {
        self.nodes.is_empty() || self.verify_node(ROOT)
    }

    fn verify_node(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            log::debug!("Node {id} is missing from the tree");
            return false;
        };

        let mut child_taxa = Clade::new(self.taxon_set);
        for &child_id in node.children.iter() {
            let Some(child) = self.nodes.get(child_id) else {
                log::debug!("Node {id} has missing child {child_id}");
                return false;
            };
            if child.parent != Some(id) {
                log::debug!("Node {child_id} : {child} has wrong parent {:?}", child.parent);
                return false;
            }
            if !self.verify_node(child_id) {
                return false;
            }
            child_taxa += child.clade();
        }

        if node.size() > 1 && &child_taxa != node.clade() {
            log::debug!(
                "Node {id} has taxa {} when it should have taxa {child_taxa}",
                node.clade()
            );
            return false;
        }

        true
    }
}

impl<'a> Tree<'a> {
    // ##################
    // # ALTER THE TREE #
    // ##################

    /// Makes the root binary: keeps the root child at position `keep` and
    /// moves every other child of the root under a new node.
    /// Does nothing if the root has at most two children.
    /// ```
    /// use phylokit::{taxa::TaxonSet, tree::Tree};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
    /// let mut tree = Tree::from_newick("(a,b,(c,d));", &ts).unwrap();
    /// tree.binary_root(1).unwrap();
    ///
    /// assert_eq!(tree.to_newick().unwrap(), "(b,(a,(c,d)));");
    /// assert!(tree.verify());
    /// ```
    pub fn binary_root(&mut self, keep: usize) -> Result<(), TreeError> {
        let root = self.root()?;
        if root.children.len() <= 2 {
            return Ok(());
        }

        let kept = root
            .children
            .get(keep)
            .copied()
            .ok_or(TreeError::ChildIndexOutOfRange {
                node: ROOT,
                index: keep,
            })?;
        let moved = root
            .children
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != keep)
            .map(|(_, &child)| child)
            .collect_vec();

        let new = self.add_node();
        for child in moved {
            let taxa = self.get(&child)?.clade().clone();
            self.get_mut(&new)?.add_clade(&taxa);
            self.add_child(new, child)?;
        }

        self.get_mut(&ROOT)?.children.clear();
        self.add_child(ROOT, kept)?;
        self.add_child(ROOT, new)?;

        Ok(())
    }

    /// Exchanges the positions of two nodes: `a` takes the place of `b`
    /// in the children of `b`'s parent and vice versa.
    pub fn swap(&mut self, a: NodeId, b: NodeId) -> Result<(), TreeError> {
        let pa = self.get(&a)?.get_parent()?;
        let pb = self.get(&b)?.get_parent()?;

        let ia = self.get(&pa)?.child_position(&a)?;
        let ib = self.get(&pb)?.child_position(&b)?;

        self.get_mut(&pa)?.children[ia] = b;
        self.get_mut(&pb)?.children[ib] = a;

        self.get_mut(&a)?.parent = Some(pb);
        self.get_mut(&b)?.parent = Some(pa);

        Ok(())
    }

    /// Rotates the root of a binary-rooted tree: the `b_i`-th child of the
    /// `a_i`-th root child moves up to the root and the other root child moves
    /// down in its place. Clades are updated accordingly.
    pub fn rotate(&mut self, a_i: usize, b_i: usize) -> Result<(), TreeError> {
        let root = self.root()?;
        if root.children.len() != 2 {
            return Err(TreeError::RootNotBinary(root.children.len()));
        }
        if a_i > 1 {
            return Err(TreeError::ChildIndexOutOfRange {
                node: ROOT,
                index: a_i,
            });
        }

        let acomp = root.children[1 - a_i];
        let a = root.children[a_i];
        let b = self
            .get(&a)?
            .children
            .get(b_i)
            .copied()
            .ok_or(TreeError::ChildIndexOutOfRange { node: a, index: b_i })?;

        self.swap(acomp, b)?;

        let b_taxa = self.get(&b)?.clade().clone();
        let acomp_taxa = self.get(&acomp)?.clade().clone();
        let node = self.get_mut(&a)?;
        node.remove_clade(&b_taxa);
        node.add_clade(&acomp_taxa);

        Ok(())
    }

    /// Position and id of the child of `id` whose clade contains `taxon`
    fn child_containing(&self, id: &NodeId, taxon: TaxonId) -> Result<(usize, NodeId), TreeError> {
        for (i, child) in self.get(id)?.children.iter().enumerate() {
            if self.get(child)?.contains_taxon(taxon) {
                return Ok((i, *child));
            }
        }
        Err(TreeError::TaxonNotInTree(taxon))
    }

    /// Reroots the tree so that the leaf of `taxon` is a child of the root.
    ///
    /// The root is first made binary, then rotated until the root child
    /// containing the taxon is a single leaf.
    /// ```
    /// use phylokit::{taxa::TaxonSet, tree::Tree};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
    /// let mut tree = Tree::from_newick("((a,b),(c,d));", &ts).unwrap();
    /// tree.reroot(ts.lookup("c").unwrap()).unwrap();
    ///
    /// assert_eq!(tree.to_newick().unwrap(), "(c,((a,b),d));");
    /// ```
    pub fn reroot(&mut self, taxon: TaxonId) -> Result<(), TreeError> {
        if !self.root()?.contains_taxon(taxon) {
            return Err(TreeError::TaxonNotInTree(taxon));
        }

        self.binary_root(0)?;
        let n_children = self.root()?.children.len();
        if n_children != 2 {
            return Err(TreeError::RootNotBinary(n_children));
        }

        loop {
            let (i, child) = self.child_containing(&ROOT, taxon)?;
            if self.get(&child)?.size() == 1 {
                return Ok(());
            }
            let (j, _) = self.child_containing(&child, taxon)?;
            self.rotate(i, j)?;
        }
    }
}

impl<'a> Tree<'a> {
    // #################
    // # COMPARE TREES #
    // #################

    /// Matrix of lowest common ancestors: the entry of a pair of taxa is
    /// the id of the deepest node containing both of them.
    /// ```
    /// use phylokit::{taxa::TaxonSet, tree::Tree};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c"]);
    /// let tree = Tree::from_newick("((a,b),c);", &ts).unwrap();
    /// let lca = tree.lca().unwrap();
    ///
    /// assert_eq!(*lca.get(0, 1).unwrap(), 1);
    /// assert_eq!(*lca.get(1, 2).unwrap(), 0);
    /// assert_eq!(*lca.get(2, 2).unwrap(), 4);
    /// ```
    pub fn lca(&self) -> Result<DistanceMatrix<'a, NodeId>, TreeError> {
        let mut lca = DistanceMatrix::new(self.taxon_set);
        let mut stack = vec![ROOT];

        // parents are visited before their children so deeper nodes overwrite
        while let Some(id) = stack.pop() {
            let node = self.get(&id)?;
            let taxa = node.iter().collect_vec();
            for (k, &i) in taxa.iter().enumerate() {
                for &j in taxa[k..].iter() {
                    lca.set(i, j, id)?;
                }
            }
            stack.extend(node.children.iter().copied());
        }

        Ok(lca)
    }

    /// Robinson-Foulds distance restricted to the taxa the two trees share.
    ///
    /// Every non-root clade of `other` with more than one taxon in common
    /// with this tree is counted, and matched if it appears, restricted to
    /// the taxa of `other`, among the clades of this tree. The normalized
    /// distance is `1 - matching / count`, otherwise `count - matching`.
    /// ```
    /// use phylokit::{taxa::TaxonSet, tree::Tree};
    ///
    /// let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
    /// let t1 = Tree::from_newick("((a,b),(c,d));", &ts).unwrap();
    /// let t2 = Tree::from_newick("((a,c),(b,d));", &ts).unwrap();
    ///
    /// assert_eq!(t1.rf_distance(&t1, true).unwrap(), 0.0);
    /// assert_eq!(t1.rf_distance(&t2, true).unwrap(), 1.0);
    /// assert_eq!(t1.rf_distance(&t2, false).unwrap(), 2.0);
    /// ```
    pub fn rf_distance(&self, other: &Tree, normalized: bool) -> Result<f64, TreeError> {
        if !std::ptr::eq(self.taxon_set, other.taxon_set) && self.taxon_set != other.taxon_set {
            return Err(TreeError::SizeMismatch);
        }

        let my_taxa = self.taxa()?;
        let other_taxa = other.taxa()?;

        let mine: HashSet<BitSet> = self
            .nodes
            .iter()
            .skip(1)
            .map(|node| node.overlap(other_taxa).taxa().clone())
            .collect();

        let mut count = 0;
        let mut matching = 0;
        for node in other.nodes.iter().skip(1) {
            if node.overlap_size(my_taxa) <= 1 {
                continue;
            }
            count += 1;
            if mine.contains(node.overlap(my_taxa).taxa()) {
                matching += 1;
            }
        }

        if !normalized {
            Ok((count - matching) as f64)
        } else if count == 0 {
            Ok(0.0)
        } else {
            Ok(1.0 - matching as f64 / count as f64)
        }
    }
}

impl<'a> Tree<'a> {
    // ########################
    // # READ AND WRITE TREES #
    // ########################

    /// Generate newick representation of a subtree
    fn to_newick_impl(&self, root: &NodeId) -> Result<String, TreeError> {
        let node = self.get(root)?;
        if node.size() == 1 {
            Ok(node.to_string())
        } else {
            let children: Vec<String> = node
                .children
                .iter()
                .map(|child| self.to_newick_impl(child))
                .collect::<Result<_, _>>()?;
            Ok(format!("({})", children.join(",")))
        }
    }

    /// Writes the tree as a newick formatted string
    /// # Example
    /// ```
    /// use phylokit::{taxa::TaxonSet, tree::Tree};
    ///
    /// let newick = "((a,b),(c,(d,e)),f);";
    /// let ts = TaxonSet::from_newick(&[newick]).unwrap();
    /// let tree = Tree::from_newick(newick, &ts).unwrap();
    ///
    /// assert_eq!(tree.to_newick().unwrap(), newick);
    /// ```
    pub fn to_newick(&self) -> Result<String, TreeError> {
        if self.nodes.is_empty() {
            return Err(TreeError::IsEmpty);
        }
        Ok(self.to_newick_impl(&ROOT)? + ";")
    }

    /// Read a newick formatted string and build a [`Tree`] struct from it.
    /// Every taxon must already be in the taxon set.
    pub fn from_newick(newick: &str, taxon_set: &'a TaxonSet) -> Result<Self, NewickParseError> {
        newick::parse_tree(newick, taxon_set)
    }

    /// Writes the tree to a newick file
    pub fn to_file(&self, path: &Path) -> Result<(), TreeError> {
        match fs::write(path, self.to_newick()?) {
            Ok(_) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Creates a tree from a newick file
    pub fn from_file(path: &Path, taxon_set: &'a TaxonSet) -> Result<Self, NewickParseError> {
        let newick_string = fs::read_to_string(path)?;
        Self::from_newick(&newick_string, taxon_set)
    }

    /// Recursive function that adds node representation to a printable tree builder
    fn print_nodes(&self, root_idx: &NodeId, output_tree: &mut TreeBuilder) -> Result<(), TreeError> {
        let root = self.get(root_idx)?;
        let label = format!("{root}");

        if root.children.is_empty() {
            output_tree.add_empty_child(label);
        } else {
            output_tree.begin_child(label);
            for child_idx in root.children.iter() {
                self.print_nodes(child_idx, output_tree)?;
            }
            output_tree.end_child();
        }

        Ok(())
    }

    /// Print the tree to the console
    pub fn print(&self) -> Result<(), TreeError> {
        let root = self.root()?;
        let mut builder = TreeBuilder::new(format!("{root}"));
        for child_idx in root.children.iter() {
            self.print_nodes(child_idx, &mut builder)?;
        }
        let tree = builder.build();
        print_tree(&tree)?;
        Ok(())
    }
}

impl Display for Tree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let newick = self.to_newick().map_err(|_| std::fmt::Error)?;
        write!(f, "{newick}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEWICK: &str = "((a,b),(c,(d,e)),f);";

    fn taxon_set() -> TaxonSet {
        TaxonSet::from_newick(&[NEWICK]).unwrap()
    }

    fn id(ts: &TaxonSet, name: &str) -> TaxonId {
        ts.lookup(name).unwrap()
    }

    #[test]
    fn build_by_hand() -> Result<(), TreeError> {
        let ts = TaxonSet::from_names(["a", "b"]);
        let mut tree = Tree::new(&ts);
        let root = tree.add_node();
        for taxon in [0, 1] {
            let leaf = tree.add_node();
            tree.add_child(root, leaf)?;
            tree.get_mut(&leaf)?.add_taxon(taxon);
            tree.get_mut(&root)?.add_taxon(taxon);
        }

        assert!(tree.verify());
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.get_leaves(), vec![1, 2]);
        assert_eq!(tree.to_newick()?, "(a,b);");
        assert!(matches!(tree.add_child(0, 7), Err(TreeError::NodeNotFound(7))));

        Ok(())
    }

    #[test]
    fn round_trip() {
        let ts = taxon_set();
        let test_cases = vec![
            NEWICK,
            "(a,(b,(c,(d,(e,f)))));",
            "(((a,b),c),((d,e),f));",
            "(f,a,b,c,d,e);",
        ];

        for newick in test_cases {
            let tree = Tree::from_newick(newick, &ts).unwrap();
            assert_eq!(tree.to_newick().unwrap(), newick);
            assert_eq!(tree.to_string(), newick);
            assert!(tree.verify());
        }
    }

    #[test]
    fn round_trip_drops_labels() {
        let ts = taxon_set();
        let tree = Tree::from_newick("((a:1,b:2)0.9:1, (c,(d , e)), f)x;", &ts).unwrap();
        assert_eq!(tree.to_newick().unwrap(), NEWICK);
    }

    #[test]
    fn leaves_and_clades() {
        let ts = taxon_set();
        let tree = Tree::from_newick(NEWICK, &ts).unwrap();

        assert_eq!(tree.size(), 10);
        assert_eq!(tree.n_leaves(), 6);
        assert_eq!(tree.get_leaves(), vec![2, 3, 5, 7, 8, 9]);
        assert_eq!(tree.taxa().unwrap().size(), 6);

        let clades = tree.clades();
        assert_eq!(clades.len(), 10);
        assert!(clades.contains(&Clade::from_literal(&ts, "{d,e}").unwrap()));
        assert!(clades.contains(&Clade::from_literal(&ts, "{c,d,e}").unwrap()));
    }

    #[test]
    fn verify_detects_broken_links() {
        let ts = taxon_set();
        let mut tree = Tree::from_newick(NEWICK, &ts).unwrap();
        assert!(tree.verify());

        tree.get_mut(&6).unwrap().parent = Some(1);
        assert!(!tree.verify());
        tree.get_mut(&6).unwrap().parent = Some(4);
        assert!(tree.verify());

        tree.get_mut(&4).unwrap().remove_taxon(id(&ts, "c"));
        assert!(!tree.verify());
    }

    #[test]
    fn binary_root() {
        let ts = taxon_set();
        let mut tree = Tree::from_newick(NEWICK, &ts).unwrap();
        tree.binary_root(0).unwrap();

        assert_eq!(tree.root().unwrap().children.len(), 2);
        assert_eq!(tree.to_newick().unwrap(), "((a,b),((c,(d,e)),f));");
        assert!(tree.verify());

        // already binary
        tree.binary_root(1).unwrap();
        assert_eq!(tree.size(), 11);

        let mut tree = Tree::from_newick(NEWICK, &ts).unwrap();
        assert!(matches!(
            tree.binary_root(3),
            Err(TreeError::ChildIndexOutOfRange { node: 0, index: 3 })
        ));
    }

    #[test]
    fn swap_siblings() {
        let ts = taxon_set();
        let mut tree = Tree::from_newick(NEWICK, &ts).unwrap();
        tree.swap(2, 3).unwrap();
        assert_eq!(tree.to_newick().unwrap(), "((b,a),(c,(d,e)),f);");
        assert!(tree.verify());

        assert!(matches!(
            tree.swap(0, 3),
            Err(TreeError::NodeError(NodeError::HasNoParent(0)))
        ));
    }

    #[test]
    fn rotate() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d"]);
        let mut tree = Tree::from_newick("((a,b),(c,d));", &ts).unwrap();

        tree.rotate(1, 0).unwrap();
        assert_eq!(tree.to_newick().unwrap(), "(c,((a,b),d));");
        assert!(tree.verify());

        assert!(matches!(
            tree.rotate(2, 0),
            Err(TreeError::ChildIndexOutOfRange { node: 0, index: 2 })
        ));
    }

    #[test]
    fn reroot() {
        let ts = taxon_set();
        let mut tree = Tree::from_newick(NEWICK, &ts).unwrap();
        let b = id(&ts, "b");

        tree.reroot(b).unwrap();
        assert_eq!(tree.to_newick().unwrap(), "((a,((c,(d,e)),f)),b);");
        assert!(tree.verify());
        assert_eq!(tree.taxa().unwrap().size(), 6);

        let root = tree.root().unwrap();
        assert!(root
            .children
            .iter()
            .any(|child| tree.get(child).unwrap().to_string() == "b"));
    }

    #[test]
    fn reroot_every_taxon() {
        let ts = taxon_set();
        for (taxon, name) in ts.iter() {
            let mut tree = Tree::from_newick("(((a,b),c),((d,e),f));", &ts).unwrap();
            tree.reroot(taxon).unwrap();
            assert!(tree.verify(), "{name}: {tree}");

            let root = tree.root().unwrap();
            assert_eq!(root.children.len(), 2);
            assert!(root.children.iter().any(|child| {
                let child = tree.get(child).unwrap();
                child.size() == 1 && child.contains_taxon(taxon)
            }));
        }
    }

    #[test]
    fn reroot_errors() {
        let ts = TaxonSet::from_names(["a", "b", "c", "z"]);
        let mut tree = Tree::from_newick("((a,b),c);", &ts).unwrap();
        assert!(matches!(
            tree.reroot(3),
            Err(TreeError::TaxonNotInTree(3))
        ));

        let mut empty = Tree::new(&ts);
        assert!(matches!(empty.reroot(0), Err(TreeError::IsEmpty)));

        let mut lone = Tree::from_newick("(a);", &ts).unwrap();
        assert!(matches!(lone.reroot(0), Err(TreeError::RootNotBinary(1))));
    }

    #[test]
    fn lowest_common_ancestors() {
        let ts = taxon_set();
        let tree = Tree::from_newick(NEWICK, &ts).unwrap();
        let lca = tree.lca().unwrap();

        let test_cases = vec![
            (("a", "b"), 1),
            (("c", "e"), 4),
            (("d", "e"), 6),
            (("e", "d"), 6),
            (("a", "f"), 0),
            (("a", "a"), 2),
        ];

        for ((t1, t2), ancestor) in test_cases {
            assert_eq!(*lca.get(id(&ts, t1), id(&ts, t2)).unwrap(), ancestor);
        }

        let node = tree.get(lca.get(id(&ts, "c"), id(&ts, "e")).unwrap()).unwrap();
        assert!(node.contains_taxon(id(&ts, "d")));
    }

    #[test]
    fn robinson_foulds() {
        let ts = TaxonSet::from_names(["a", "b", "c", "d", "e"]);
        let t1 = Tree::from_newick("((a,b),(c,(d,e)));", &ts).unwrap();
        let t2 = Tree::from_newick("((a,b),(d,(c,e)));", &ts).unwrap();
        let t3 = Tree::from_newick("((a,b),c);", &ts).unwrap();

        assert_eq!(t1.rf_distance(&t1, true).unwrap(), 0.0);
        assert_eq!(t1.rf_distance(&t1.clone(), false).unwrap(), 0.0);

        // {a,b} and {c,d,e} match, {c,e} does not
        assert_eq!(t1.rf_distance(&t2, false).unwrap(), 1.0);
        assert!((t1.rf_distance(&t2, true).unwrap() - 1.0 / 3.0).abs() < 1e-12);

        // restricted to {a,b,c}
        assert_eq!(t1.rf_distance(&t3, true).unwrap(), 0.0);
        assert_eq!(t3.rf_distance(&t1, false).unwrap(), 0.0);
    }

    #[test]
    fn robinson_foulds_taxon_sets() {
        let ts1 = TaxonSet::from_names(["a", "b", "c"]);
        let ts2 = TaxonSet::from_names(["a", "b", "c"]);
        let ts3 = TaxonSet::from_names(["a", "b", "c", "d"]);

        let t1 = Tree::from_newick("((a,b),c);", &ts1).unwrap();
        let t2 = Tree::from_newick("((a,b),c);", &ts2).unwrap();
        let t3 = Tree::from_newick("((a,b),c);", &ts3).unwrap();

        assert_eq!(t1.rf_distance(&t2, true).unwrap(), 0.0);
        assert!(matches!(
            t1.rf_distance(&t3, true),
            Err(TreeError::SizeMismatch)
        ));
    }

    #[test]
    fn print() {
        let ts = taxon_set();
        let tree = Tree::from_newick(NEWICK, &ts).unwrap();
        tree.print().unwrap();
        assert!(matches!(Tree::new(&ts).print(), Err(TreeError::IsEmpty)));
    }

    #[test]
    fn files() {
        let ts = taxon_set();
        let tree = Tree::from_newick(NEWICK, &ts).unwrap();
        let path = std::env::temp_dir().join("phylokit_tree_impl_files.nwk");

        tree.to_file(&path).unwrap();
        let read = Tree::from_file(&path, &ts).unwrap();
        assert_eq!(read.to_newick().unwrap(), NEWICK);

        std::fs::remove_file(&path).unwrap();
    }
}
