use super::error::TreeError;
use super::node::NodeId;
use super::tree::Tree;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, multispace0},
    combinator::{cut, map, opt, verify},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    multi::{many0, separated_list1},
    number::complete::double,
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};

#[derive(Clone, Debug, PartialEq)]
pub enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

/// nom error that keeps every context it passed through, innermost first.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailedError<'a> {
    pub errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for DetailedError<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: E) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }
}

type PResult<'a, O> = IResult<&'a str, O, DetailedError<'a>>;

/// Recursive form of a subtree, flattened into the arena once parsing succeeds.
#[derive(Debug, Default)]
struct ParsedNode {
    name: Option<String>,
    length: Option<f64>,
    children: Vec<ParsedNode>,
}

impl ParsedNode {
    fn into_tree(self, tree: &mut Tree) -> Result<NodeId, TreeError> {
        let id = tree.add_node();
        if let Some(node) = tree.get_node_mut(id) {
            node.name = self.name;
            node.length = self.length;
        }
        for child in self.children {
            let child_id = child.into_tree(tree)?;
            tree.add_child(id, child_id)?;
        }
        Ok(id)
    }
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// [bracketed comments] carry nothing a species tree needs
fn skip_comments(input: &str) -> PResult<'_, ()> {
    map(
        many0(ws(delimited(char('['), take_while(|c| c != ']'), char(']')))),
        |_| (),
    )
    .parse(input)
}

// Unquoted labels stop at Newick punctuation; 'single quoted' ones may
// contain it, with '' standing for a literal quote.
fn parse_label(input: &str) -> PResult<'_, String> {
    let unquoted = map(take_while(|c: char| !"():;,[]'".contains(c)), |s: &str| {
        s.trim().to_string()
    });
    let quoted = delimited(
        char('\''),
        map(is_not("'"), |s: &str| s.replace("''", "'")),
        char('\''),
    );

    context("label", alt((quoted, unquoted))).parse(input)
}

// Branch lengths are distances; a negative one is rejected here.
fn parse_length(input: &str) -> PResult<'_, f64> {
    let length = verify(double, |l: &f64| *l >= 0.0);
    context("length", preceded(ws(char(':')), cut(ws(length)))).parse(input)
}

fn parse_subtree(input: &str) -> PResult<'_, ParsedNode> {
    let (input, children) = context(
        "children",
        opt(delimited(
            ws(char('(')),
            separated_list1(ws(char(',')), parse_subtree),
            cut(ws(char(')'))),
        )),
    )
    .parse(input)?;

    let (input, _) = skip_comments(input)?;
    let (input, label) = opt(parse_label).parse(input)?;
    let (input, _) = skip_comments(input)?;
    let (input, length) = opt(parse_length).parse(input)?;
    let (input, _) = skip_comments(input)?;

    let node = ParsedNode {
        name: label.filter(|l| !l.is_empty()),
        length,
        children: children.unwrap_or_default(),
    };

    Ok((input, node))
}

/// Parse the first tree of a Newick string. Text after its `;` is ignored.
pub fn parse_newick(input: &str) -> Result<Tree, TreeError> {
    let mut parser = (skip_comments, ws(parse_subtree), context("end", ws(char(';'))));

    match parser.parse(input) {
        Ok((_, (_, root_node, _))) => {
            let mut tree = Tree::new();
            let root_id = root_node.into_tree(&mut tree)?;
            tree.set_root(root_id);
            Ok(tree)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_tree_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(TreeError::ParseError {
            message: "Incomplete input\n".to_string(),
            line: 0,
            column: 0,
            snippet: "".to_string(),
        }),
    }
}

fn make_tree_error(input: &str, e: DetailedError) -> TreeError {
    let remaining = e.errors.first().map(|(r, _)| *r).unwrap_or(input);
    let offset = input.offset(remaining);

    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    let mut message = String::new();
    for (_, kind) in e.errors.iter().rev() {
        match kind {
            DetailedErrorKind::Context(ctx) => {
                message.push_str(&format!("while parsing {}:\n", ctx));
            }
            DetailedErrorKind::Nom(k) => {
                message.push_str(&format!("  error: {:?}\n", k));
            }
        }
    }

    TreeError::ParseError {
        message,
        line,
        column,
        snippet: remaining.chars().take(50).collect(),
    }
}
