#![warn(missing_docs)]
//! The `phylokit` binary is a command line tool, using the `[phylokit]` crate.
//! It reads newick trees from files, one per line, and runs common analyses
//! over the taxa they contain.

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use indicatif::ProgressIterator;
use itertools::Itertools;
use phylokit::{
    distance::DistanceMatrix,
    generate_caterpillar, generate_newick,
    newick::{self, deroot, parse_clades, parse_postorder},
    quartet::QuartetTable,
    taxa::TaxonSet,
    tree::Tree,
};
use rand::{rngs::StdRng, SeedableRng};
use std::{fs, io, path::Path};

/// contains the struct representing the command line arguments
/// parsed by [`clap`] and used to execute this binary
pub mod cli;
/// minimal leveled logger for the [`log`] facade
pub mod logger;

type Error = Box<dyn std::error::Error>;
type Result<T> = std::result::Result<T, Error>;

/// Reads trees and builds the taxon set of their names
fn read_trees_and_taxa(path: &Path) -> Result<(Vec<String>, TaxonSet)> {
    let trees = newick::read_trees(path)?;
    let taxa = TaxonSet::from_newick(&trees)?;
    log::info!("Read {} trees over {} taxa", trees.len(), taxa.len());
    Ok((trees, taxa))
}

fn first_tree(path: &Path, trees: &[String]) -> Result<String> {
    trees
        .first()
        .cloned()
        .ok_or_else(|| format!("No tree in {}", path.display()).into())
}

/// Writes lines to a file or to stdout
fn write_lines(lines: &[String], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut content = lines.join("\n");
            content.push('\n');
            fs::write(path, content)?;
        }
        None => {
            for line in lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn run(command: cli::Commands) -> Result<()> {
    match command {
        cli::Commands::Taxa { trees } => {
            let (_, taxa) = read_trees_and_taxa(&trees)?;
            print!("{taxa}");
        }
        cli::Commands::Clades { trees } => {
            let (trees, taxa) = read_trees_and_taxa(&trees)?;
            for (i, tree) in trees.iter().enumerate() {
                let clades = parse_clades(tree, &taxa)?;
                for clade in clades
                    .iter()
                    .sorted_by_key(|clade| (clade.size(), clade.names()))
                {
                    println!("{i}\t{clade}");
                }
            }
        }
        cli::Commands::Postorder { trees } => {
            let (trees, taxa) = read_trees_and_taxa(&trees)?;
            for tree in trees.iter() {
                println!("{}", parse_postorder(tree, &taxa)?.iter().join(" "));
            }
        }
        cli::Commands::Deroot { trees, output } => {
            let trees = newick::read_trees(&trees)?;
            let derooted: Vec<_> = trees
                .iter()
                .map(|tree| -> Result<String> {
                    Ok(format!("{};", deroot(tree)?.trim_end_matches(';')))
                })
                .collect::<Result<_>>()?;
            write_lines(&derooted, output.as_deref())?;
        }
        cli::Commands::Reroot {
            trees,
            taxon,
            output,
        } => {
            let (trees, taxa) = read_trees_and_taxa(&trees)?;
            let outgroup = taxa.lookup(&taxon)?;
            let mut rerooted = vec![];
            for newick in trees.iter().progress() {
                let mut tree = Tree::from_newick(newick, &taxa)?;
                tree.reroot(outgroup)?;
                rerooted.push(tree.to_newick()?);
            }
            write_lines(&rerooted, output.as_deref())?;
        }
        cli::Commands::Lca { tree } => {
            let (trees, taxa) = read_trees_and_taxa(&tree)?;
            let tree = Tree::from_newick(&first_tree(&tree, &trees)?, &taxa)?;
            let lca = tree.lca()?;
            for pair in tree.taxa()?.iter().combinations(2) {
                let (t1, t2) = (pair[0], pair[1]);
                let node = tree.get(lca.get(t1, t2)?)?;
                println!("{}\t{}\t{}", &taxa[t1], &taxa[t2], node.clade());
            }
        }
        cli::Commands::Compare {
            reftree,
            tocompare,
            normalized,
        } => {
            let references = newick::read_trees(&reftree)?;
            let reference = first_tree(&reftree, &references)?;
            let compared = newick::read_trees(&tocompare)?;

            let all = std::iter::once(&reference).chain(compared.iter()).collect_vec();
            let taxa = TaxonSet::from_newick(&all)?;
            let reference = Tree::from_newick(&reference, &taxa)?;

            println!("tree\trf");
            for (i, newick) in compared.iter().enumerate().progress() {
                let tree = Tree::from_newick(newick, &taxa)?;
                println!("{i}\t{}", reference.rf_distance(&tree, normalized)?);
            }
        }
        cli::Commands::Matrix {
            trees,
            square,
            output,
        } => {
            let (trees, taxa) = read_trees_and_taxa(&trees)?;
            let matrix: DistanceMatrix<f64> =
                DistanceMatrix::from_trees(trees.iter().progress(), &taxa)?;
            if let Some(output) = output {
                matrix.to_file(&output, square)?;
            } else {
                print!("{}", matrix.to_phylip(square)?)
            }
        }
        cli::Commands::Upgma { trees } => {
            let (trees, taxa) = read_trees_and_taxa(&trees)?;
            let matrix: DistanceMatrix<f64> =
                DistanceMatrix::from_trees(trees.iter().progress(), &taxa)?;
            for clade in matrix
                .upgma()
                .iter()
                .sorted_by_key(|clade| (clade.size(), clade.names()))
            {
                println!("{clade}");
            }
        }
        cli::Commands::Generate {
            tips,
            trees,
            caterpillar,
            seed,
            output,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let generated = (0..trees)
                .map(|_| {
                    if caterpillar {
                        generate_caterpillar(tips)
                    } else {
                        generate_newick(tips, &mut rng)
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            write_lines(&generated, output.as_deref())?;
        }
        cli::Commands::Quartets { trees, quartets } => {
            let (_, taxa) = read_trees_and_taxa(&trees)?;
            let table = QuartetTable::from_file(&quartets, &taxa)?;
            print!("{table}");
        }
        cli::Commands::Completion { shell } => {
            let mut cmd = cli::Args::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}

fn main() {
    let args = cli::Args::parse();
    if let Err(e) = logger::init(args.verbose, args.quiet) {
        eprintln!("Could not set up logging: {e}");
    }

    if let Err(e) = run(args.command) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
