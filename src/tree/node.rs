use std::{
    fmt::{Debug, Display},
    ops::{Deref, DerefMut},
};

use thiserror::Error;

use super::NodeId;
use crate::{clade::Clade, taxa::TaxonSet};

/// Errors that can occur when manipulating [`TreeClade`] structs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NodeError {
    /// We are trying to access the an unexisting child of the node
    #[error("Node {parent} does not have child {child}.")]
    HasNoChild {
        /// Id of the parent node
        parent: NodeId,
        /// Id of the inexistant child node
        child: NodeId,
    },
    /// We are trying to access the parent of a parentless node
    #[error("Node {0} does not have a parent")]
    HasNoParent(NodeId),
}

/// A node of a [`Tree`](super::Tree): the clade of taxa below it and its links.
///
/// A `TreeClade` dereferences to its [`Clade`], so every clade operation
/// can be called on the node directly.
#[derive(Clone)]
pub struct TreeClade<'a> {
    clade: Clade<'a>,
    /// Index of the node
    pub id: NodeId,
    /// Index of the parent node
    pub parent: Option<NodeId>,
    /// Indices of child nodes
    pub children: Vec<NodeId>,
}

impl<'a> TreeClade<'a> {
    /// Creates a new node with an empty clade
    pub fn new(taxon_set: &'a TaxonSet, id: NodeId) -> Self {
        Self {
            clade: Clade::new(taxon_set),
            id,
            parent: None,
            children: vec![],
        }
    }

    /// The clade of the node
    pub fn clade(&self) -> &Clade<'a> {
        &self.clade
    }

    /// Appends a child id, the child's parent link is set by the tree
    pub fn add_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    /// Index of the `i`-th child
    pub fn child(&self, i: usize) -> Result<NodeId, NodeError> {
        self.children.get(i).copied().ok_or(NodeError::HasNoChild {
            parent: self.id,
            child: i,
        })
    }

    /// Position of a child in the children list
    pub fn child_position(&self, child: &NodeId) -> Result<usize, NodeError> {
        self.children
            .iter()
            .position(|c| c == child)
            .ok_or(NodeError::HasNoChild {
                parent: self.id,
                child: *child,
            })
    }

    /// Index of the parent
    pub fn get_parent(&self) -> Result<NodeId, NodeError> {
        self.parent.ok_or(NodeError::HasNoParent(self.id))
    }

    /// Check if the node is a tip node
    pub fn is_tip(&self) -> bool {
        self.children.is_empty()
    }

    /// Check if the node is a root node
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl<'a> Deref for TreeClade<'a> {
    type Target = Clade<'a>;

    fn deref(&self) -> &Self::Target {
        &self.clade
    }
}

impl DerefMut for TreeClade<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.clade
    }
}

impl Display for TreeClade<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.size() == 1 {
            write!(f, "{}", self.names().concat())
        } else {
            write!(f, "{}", self.clade)
        }
    }
}

impl Debug for TreeClade<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Id[{}] Parent[{:?}] Children({:?})",
            self.clade, self.id, self.parent, self.children,
        )
    }
}
