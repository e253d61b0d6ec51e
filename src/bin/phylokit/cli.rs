use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// A command line tool to work with clades, trees and distance matrices
/// over the taxa of a set of newick trees
#[derive(Parser, Debug)]
pub struct Args {
    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    /// The command to execute
    pub command: Commands,
}

/// The available commands in the `phylokit` tool
///
/// Tree files hold one newick tree per line, and the taxon set of a
/// command is the set of names found in its tree files.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the identifier and name of every taxon of the trees
    Taxa {
        /// Newick trees
        trees: PathBuf,
    },
    /// Print the clades of every tree
    Clades {
        /// Newick trees
        trees: PathBuf,
    },
    /// Print the postorder encoding of every tree
    ///
    /// Leaves are their taxon id and each internal node is minus its
    /// number of children.
    #[clap(verbatim_doc_comment)]
    Postorder {
        /// Newick trees
        trees: PathBuf,
    },
    /// Unroot trees by removing the brackets of one root child
    Deroot {
        /// Newick trees
        trees: PathBuf,
        /// File to save the trees to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reroot binary trees on the branch leading to a taxon
    Reroot {
        /// Newick trees
        trees: PathBuf,
        /// Name of the outgroup taxon
        taxon: String,
        /// File to save the trees to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the lowest common ancestor of every pair of taxa of a tree
    Lca {
        /// Newick tree, only the first line is read
        tree: PathBuf,
    },
    /// Compare trees to a reference tree with the Robinson-Foulds distance
    Compare {
        /// Reference tree, only the first line is read
        reftree: PathBuf,
        /// Trees to compare to the reference
        tocompare: PathBuf,
        /// Output the normalized distance
        #[arg(short, long)]
        normalized: bool,
    },
    /// Output the mean path length matrix of the trees in phylip format
    Matrix {
        /// Newick trees
        trees: PathBuf,
        /// Output a square matrix instead of a triangular one
        #[arg(short, long)]
        square: bool,
        /// File to save the matrix to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Cluster the taxa of the trees with UPGMA on their mean path lengths
    Upgma {
        /// Newick trees
        trees: PathBuf,
    },
    /// Generate random tree(s)
    Generate {
        /// Number of tips in the generated trees
        #[arg(short, long, default_value_t = 20)]
        tips: usize,
        /// Number of trees to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        trees: usize,
        /// Generate caterpillar trees
        #[arg(short, long)]
        caterpillar: bool,
        /// Seed of the random generator
        #[arg(long)]
        seed: Option<u64>,
        /// File to save the trees to
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the weights of the three topologies of every four taxa
    Quartets {
        /// Newick trees defining the taxa
        trees: PathBuf,
        /// Quartet file, one weighted quartet per line
        quartets: PathBuf,
    },
    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
