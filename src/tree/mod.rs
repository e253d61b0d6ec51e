//! Build and manipulate phylogenetic trees.
//!
//! This module defines the two structs used to represent phylogenetic trees:
//!  - The [`TreeClade`] struct, a node of the tree holding the clade of taxa below it.
//!  - The [`Tree`] struct, an arena of [`TreeClade`] objects indexed by [`NodeId`].
//!

mod node;
mod tree_impl;

pub use self::node::{NodeError, TreeClade};
pub use self::tree_impl::{Tree, TreeError};

/// A type that represents Identifiers of [`TreeClade`] objects
/// within phylogenetic [`Tree`] object.
pub type NodeId = usize;

/// Identifier of the root node of every [`Tree`]
pub const ROOT: NodeId = 0;
