//! Streaming tokenizer for Newick and clade-literal text, and the parses built on it.
//!
//! The tokenizer splits its input on `;` and newlines (which are dropped) and
//! on the bracket, colon and comma delimiters (which are kept as tokens).
//! Every other run of characters is a name. A name that directly follows a
//! closing bracket or a colon is an internal label or a branch length, not a
//! taxon, and is reported as [`Token::Label`]. Whitespace-only runs are labels
//! too.
//!
//! ```
//! use phylokit::newick::{Token, Tokenizer};
//!
//! let tokens: Vec<_> = Tokenizer::newick("(a:0.1,b)x;")
//!     .map(|lexeme| lexeme.unwrap().token)
//!     .collect();
//!
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::Open,
//!         Token::Name("a"),
//!         Token::Colon,
//!         Token::Label,
//!         Token::Comma,
//!         Token::Name("b"),
//!         Token::Close,
//!         Token::Label,
//!     ]
//! );
//! ```

use std::{
    collections::HashSet,
    fmt::Display,
    fs,
    path::Path,
};

use thiserror::Error;

use crate::{
    clade::Clade,
    taxa::{TaxonError, TaxonId, TaxonSet},
    tree::{Tree, TreeError},
};

/// Errors that can occur when tokenizing or parsing newick strings.
#[derive(Error, Debug)]
pub enum NewickParseError {
    /// A closing bracket has no matching opening bracket
    #[error("Unexpected closing bracket at offset {0}")]
    UnexpectedClose(usize),
    /// The input ended with brackets still open
    #[error("Missing {0} closing bracket(s)")]
    UnclosedBracket(usize),
    /// The input contains no node
    #[error("There is no tree in this newick string")]
    Empty,
    /// A second top-level node was found after the first tree was closed
    #[error("Found a second root node at offset {0}")]
    MultipleRoots(usize),
    /// A name token could not be read as a taxon identifier
    #[error("Could not read {0:?} as a taxon id")]
    InvalidTaxonId(String),
    /// There was a [`TaxonError`] when looking up a name
    #[error(transparent)]
    TaxonError(#[from] TaxonError),
    /// There was a [`TreeError`] when building a tree from the newick string
    #[error("Problem with building the tree: {0}")]
    TreeError(#[from] TreeError),
    /// There was a [`std::io::Error`] when reading a newick file
    #[error("Problem reading file")]
    IoError(#[from] std::io::Error),
}

/// Which delimiters the tokenizer splits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `( ) : ,`
    Newick,
    /// `{ } ,`
    CladeLiteral,
}

impl Syntax {
    fn delimiter(self, c: char) -> Option<Token<'static>> {
        match (self, c) {
            (Syntax::Newick, '(') | (Syntax::CladeLiteral, '{') => Some(Token::Open),
            (Syntax::Newick, ')') | (Syntax::CladeLiteral, '}') => Some(Token::Close),
            (Syntax::Newick, ':') => Some(Token::Colon),
            (_, ',') => Some(Token::Comma),
            _ => None,
        }
    }

    fn is_separator(c: char) -> bool {
        c == ';' || c == '\n'
    }

    fn is_boundary(self, c: char) -> bool {
        Self::is_separator(c) || self.delimiter(c).is_some()
    }
}

/// Kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'s> {
    /// Opening bracket
    Open,
    /// Closing bracket
    Close,
    /// Separator before a branch length
    Colon,
    /// Separator between siblings
    Comma,
    /// A taxon name, trimmed of surrounding whitespace
    Name(&'s str),
    /// Text that is not a taxon: internal label, branch length or whitespace
    Label,
}

/// A token with its raw text and its byte offset in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'s> {
    /// Kind of the token
    pub token: Token<'s>,
    /// Text of the token as it appears in the input
    pub text: &'s str,
    /// Byte offset of the token in the input
    pub offset: usize,
}

/// Iterator over the [`Lexeme`]s of a newick or clade-literal string.
///
/// Bracket balance is checked as the input is consumed: a closing bracket
/// at depth zero yields [`NewickParseError::UnexpectedClose`] and reaching
/// the end of the input with open brackets yields
/// [`NewickParseError::UnclosedBracket`]. Iteration stops after an error.
#[derive(Debug, Clone)]
pub struct Tokenizer<'s> {
    input: &'s str,
    pos: usize,
    syntax: Syntax,
    prev: Option<Token<'s>>,
    depth: usize,
    done: bool,
}

impl<'s> Tokenizer<'s> {
    /// Tokenizer over a string written in the given syntax
    pub fn new(input: &'s str, syntax: Syntax) -> Self {
        Self {
            input,
            pos: 0,
            syntax,
            prev: None,
            depth: 0,
            done: false,
        }
    }

    /// Tokenizer over a newick string
    pub fn newick(input: &'s str) -> Self {
        Self::new(input, Syntax::Newick)
    }

    /// Tokenizer over clade literals such as `{a,b,c}`
    pub fn clade_literal(input: &'s str) -> Self {
        Self::new(input, Syntax::CladeLiteral)
    }

    /// Bracket depth after the last returned token
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn is_label(&self, text: &str) -> bool {
        text.trim().is_empty() || matches!(self.prev, Some(Token::Close | Token::Colon))
    }
}

impl<'s> Iterator for Tokenizer<'s> {
    type Item = Result<Lexeme<'s>, NewickParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let input = self.input;
        let syntax = self.syntax;

        loop {
            let start = self.pos;
            let rest = &input[start..];
            let Some(c) = rest.chars().next() else {
                self.done = true;
                if self.depth > 0 {
                    return Some(Err(NewickParseError::UnclosedBracket(self.depth)));
                }
                return None;
            };

            if Syntax::is_separator(c) {
                self.pos += c.len_utf8();
                continue;
            }

            if let Some(token) = syntax.delimiter(c) {
                self.pos += c.len_utf8();
                match token {
                    Token::Open => self.depth += 1,
                    Token::Close if self.depth == 0 => {
                        self.done = true;
                        return Some(Err(NewickParseError::UnexpectedClose(start)));
                    }
                    Token::Close => self.depth -= 1,
                    _ => {}
                }
                self.prev = Some(token);
                return Some(Ok(Lexeme {
                    token,
                    text: &input[start..self.pos],
                    offset: start,
                }));
            }

            let len = rest
                .find(|c: char| syntax.is_boundary(c))
                .unwrap_or(rest.len());
            self.pos += len;
            let text = &rest[..len];

            let token = if self.is_label(text) {
                Token::Label
            } else {
                let name = Token::Name(text.trim());
                self.prev = Some(name);
                name
            };

            return Some(Ok(Lexeme {
                token,
                text,
                offset: start,
            }));
        }
    }
}

/// Adds the taxon names of a newick string to `names`,
/// returns the number of name tokens seen (repeated names included)
pub fn tokenize_taxon_names(
    newick: &str,
    names: &mut HashSet<String>,
) -> Result<usize, NewickParseError> {
    let mut count = 0;
    for lexeme in Tokenizer::newick(newick) {
        if let Token::Name(name) = lexeme?.token {
            if !names.contains(name) {
                names.insert(name.to_string());
            }
            count += 1;
        }
    }
    Ok(count)
}

/// Clade with every taxon named in the string
pub fn parse_clade<'a>(s: &str, ts: &'a TaxonSet) -> Result<Clade<'a>, NewickParseError> {
    let mut clade = Clade::new(ts);
    for lexeme in Tokenizer::newick(s) {
        if let Token::Name(name) = lexeme?.token {
            clade.add_taxon(ts.lookup(name)?);
        }
    }
    Ok(clade)
}

/// Set of clades induced by the bracket pairs of a newick string
/// ```
/// use phylokit::{clade::Clade, newick::parse_clades, taxa::TaxonSet};
///
/// let ts = TaxonSet::from_names(["a", "b", "c"]);
/// let clades = parse_clades("((a,b),c);", &ts).unwrap();
///
/// assert_eq!(clades.len(), 2);
/// assert!(clades.contains(&Clade::from_literal(&ts, "{a,b}").unwrap()));
/// assert!(clades.contains(&Clade::from_literal(&ts, "{a,b,c}").unwrap()));
/// ```
pub fn parse_clades<'a>(s: &str, ts: &'a TaxonSet) -> Result<HashSet<Clade<'a>>, NewickParseError> {
    let mut clades = Vec::new();
    let mut active = Vec::new();

    for lexeme in Tokenizer::newick(s) {
        match lexeme?.token {
            Token::Open => {
                clades.push(Clade::new(ts));
                active.push(clades.len() - 1);
            }
            Token::Close => {
                active.pop();
            }
            Token::Name(name) => {
                let taxon = ts.lookup(name)?;
                for &a in active.iter() {
                    clades[a].add_taxon(taxon);
                }
            }
            _ => {}
        }
    }

    Ok(clades.into_iter().collect())
}

/// Builds a [`Tree`] from a newick string.
///
/// Each opening bracket creates an internal node under the innermost open
/// node and each name creates a leaf. Every open node gains the taxon of a
/// new leaf, so each node holds the clade below it.
pub fn parse_tree<'a>(s: &str, ts: &'a TaxonSet) -> Result<Tree<'a>, NewickParseError> {
    let mut tree = Tree::new(ts);
    let mut active: Vec<usize> = Vec::new();

    for lexeme in Tokenizer::newick(s) {
        let lexeme = lexeme?;
        match lexeme.token {
            Token::Open => {
                let node = new_node(&mut tree, &active, lexeme.offset)?;
                active.push(node);
            }
            Token::Close => {
                active.pop();
            }
            Token::Name(name) => {
                let taxon = ts.lookup(name)?;
                let leaf = new_node(&mut tree, &active, lexeme.offset)?;
                tree.get_mut(&leaf)?.add_taxon(taxon);
                for a in active.iter() {
                    tree.get_mut(a)?.add_taxon(taxon);
                }
            }
            _ => {}
        }
    }

    if tree.size() == 0 {
        return Err(NewickParseError::Empty);
    }

    Ok(tree)
}

fn new_node(tree: &mut Tree, active: &[usize], offset: usize) -> Result<usize, NewickParseError> {
    match active.last() {
        Some(&parent) => {
            let node = tree.add_node();
            tree.add_child(parent, node)?;
            Ok(node)
        }
        None if tree.size() == 0 => Ok(tree.add_node()),
        None => Err(NewickParseError::MultipleRoots(offset)),
    }
}

/// An element of a postorder encoding of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostorderItem {
    /// A leaf
    Leaf(TaxonId),
    /// The end of an internal node with this many children
    Close(usize),
}

impl PostorderItem {
    /// Signed encoding: taxon ids are non-negative, closings are minus their child count
    pub fn code(&self) -> isize {
        match *self {
            PostorderItem::Leaf(id) => id as isize,
            PostorderItem::Close(n) => -(n as isize),
        }
    }
}

impl Display for PostorderItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Postorder encoding of a newick string
/// ```
/// use phylokit::{newick::parse_postorder, taxa::TaxonSet};
///
/// let ts = TaxonSet::from_names(["a", "b", "c"]);
/// let codes: Vec<_> = parse_postorder("(a,(b,c));", &ts)
///     .unwrap()
///     .iter()
///     .map(|item| item.code())
///     .collect();
///
/// assert_eq!(codes, vec![0, 1, 2, -2, -2]);
/// ```
pub fn parse_postorder(s: &str, ts: &TaxonSet) -> Result<Vec<PostorderItem>, NewickParseError> {
    let mut order = Vec::new();
    let mut sizes = vec![0];

    for lexeme in Tokenizer::newick(s) {
        match lexeme?.token {
            Token::Open => {
                if let Some(last) = sizes.last_mut() {
                    *last += 1;
                }
                sizes.push(0);
            }
            Token::Close => {
                if let Some(size) = sizes.pop() {
                    order.push(PostorderItem::Close(size));
                }
            }
            Token::Name(name) => {
                if let Some(last) = sizes.last_mut() {
                    *last += 1;
                }
                order.push(PostorderItem::Leaf(ts.lookup(name)?));
            }
            _ => {}
        }
    }

    Ok(order)
}

/// Checks if the root of a newick string has exactly two children
pub fn is_rooted(s: &str) -> Result<bool, NewickParseError> {
    let mut root_children = 0;
    let mut depth = 0;

    for lexeme in Tokenizer::newick(s) {
        match lexeme?.token {
            Token::Open => {
                if depth == 1 {
                    root_children += 1;
                }
                depth += 1;
            }
            Token::Close => depth -= 1,
            Token::Name(_) if depth == 1 => root_children += 1,
            _ => {}
        }
    }

    Ok(root_children == 2)
}

/// Unroots a rooted newick string by removing the brackets of its first
/// bracketed root child. Every other token is copied verbatim, separators
/// (including the final `;`) are dropped. Unrooted strings are returned as is.
/// ```
/// use phylokit::newick::deroot;
///
/// assert_eq!(deroot("((a, b), c);").unwrap(), "(a, b, c)");
/// assert_eq!(deroot("(a, b, c)").unwrap(), "(a, b, c)");
/// ```
pub fn deroot(s: &str) -> Result<String, NewickParseError> {
    if !is_rooted(s)? {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut depth = 0;
    let mut bracketed_children = 0;

    for lexeme in Tokenizer::newick(s) {
        let lexeme = lexeme?;
        let mut copy = true;
        match lexeme.token {
            Token::Open => {
                if depth == 1 {
                    bracketed_children += 1;
                    copy = bracketed_children != 1;
                }
                depth += 1;
            }
            Token::Close => {
                depth -= 1;
                if depth == 1 && bracketed_children == 1 {
                    copy = false;
                }
            }
            _ => {}
        }
        if copy {
            out.push_str(lexeme.text);
        }
    }

    Ok(out)
}

/// Replaces every taxon name by its identifier, labels are kept verbatim
/// ```
/// use phylokit::{newick::map_names, taxa::TaxonSet};
///
/// let ts = TaxonSet::from_names(["a", "b", "c"]);
/// assert_eq!(map_names("((c,a)90:1.5,b);", &ts).unwrap(), "((2,0)90:1.5,1);");
/// ```
pub fn map_names(s: &str, ts: &TaxonSet) -> Result<String, NewickParseError> {
    let mut out = String::with_capacity(s.len());
    for lexeme in Tokenizer::newick(s) {
        let lexeme = lexeme?;
        match lexeme.token {
            Token::Name(name) => {
                out.push_str(&ts.lookup(name)?.to_string());
            }
            _ => out.push_str(lexeme.text),
        }
    }
    out.push(';');
    Ok(out)
}

fn parse_taxon_id(token: &str) -> Result<TaxonId, NewickParseError> {
    token
        .parse()
        .map_err(|_| NewickParseError::InvalidTaxonId(token.to_string()))
}

/// Inverse of [`map_names`]: replaces every taxon identifier by its name
pub fn unmap_names(s: &str, ts: &TaxonSet) -> Result<String, NewickParseError> {
    let mut out = String::with_capacity(s.len());
    for lexeme in Tokenizer::newick(s) {
        let lexeme = lexeme?;
        match lexeme.token {
            Token::Name(token) => out.push_str(ts.name_of(parse_taxon_id(token)?)?),
            _ => out.push_str(lexeme.text),
        }
    }
    out.push(';');
    Ok(out)
}

/// Replaces taxon identifiers by names in clade literals such as `{0,1,2}`.
/// Whitespace and labels are dropped.
/// ```
/// use phylokit::{newick::unmap_clade_names, taxa::TaxonSet};
///
/// let ts = TaxonSet::from_names(["a", "b", "c"]);
/// assert_eq!(unmap_clade_names("{2, 0}\n{1}", &ts).unwrap(), "{c,a}{b}");
/// ```
pub fn unmap_clade_names(s: &str, ts: &TaxonSet) -> Result<String, NewickParseError> {
    let mut out = String::with_capacity(s.len());
    for lexeme in Tokenizer::clade_literal(s) {
        let lexeme = lexeme?;
        match lexeme.token {
            Token::Name(token) => out.push_str(ts.name_of(parse_taxon_id(token)?)?),
            Token::Label => {}
            _ => out.push_str(lexeme.text),
        }
    }
    Ok(out)
}

/// Reads a file with one newick tree per line, blank lines are skipped
pub fn read_trees(path: &Path) -> Result<Vec<String>, NewickParseError> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}
