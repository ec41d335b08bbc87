//! rheac-par - Grammar, parse tree, and AST.
//!
//! This crate is the syntactic half of the compiler front-end:
//!
//! 1. a PEG grammar (`rhea.pest`) recognizing Rhea source,
//! 2. an owned parse tree whose shape mirrors the grammar rules,
//! 3. a transform pass rotating operator runs into operator-rooted trees,
//! 4. the AST builder lowering the transformed tree into the semantic AST,
//! 5. the visitor framework later passes traverse the AST with.
//!
//! The entry points below parse one compilation unit (or one statement,
//! for tests and the driver's line mode) from UTF-8 source text. Parsing
//! does not recover from errors; the first failure aborts the unit.

pub mod ast;
pub mod builder;
pub mod grammar;
pub mod parse_tree;
pub mod transform;
pub mod visitor;

mod edge_cases;

use pest::Parser as _;
use thiserror::Error;

use rheac_util::{BuildError, ParseError, SourcePosition};

use ast::{Statement, Unit};
use builder::AstBuilder;
use grammar::{RheaParser, Rule};
use parse_tree::ParseNode;

/// Everything that can go wrong turning source text into an AST.
#[derive(Debug, Error)]
pub enum FrontEndError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

fn convert_pest_error(error: pest::error::Error<Rule>, source_name: &str) -> ParseError {
    let (line, column) = match error.line_col {
        pest::error::LineColLocation::Pos((l, c)) => (l, c),
        pest::error::LineColLocation::Span((l, c), _) => (l, c),
    };
    let byte = match error.location {
        pest::error::InputLocation::Pos(p) => p,
        pest::error::InputLocation::Span((s, _)) => s,
    };

    ParseError {
        position: SourcePosition::new(source_name, line as u32, column as u32, byte),
        message: error.variant.message().into_owned(),
    }
}

fn parse_tree_for(rule: Rule, source: &str, source_name: &str) -> Result<ParseNode, ParseError> {
    let mut pairs =
        RheaParser::parse(rule, source).map_err(|e| convert_pest_error(e, source_name))?;

    let root = pairs.next().and_then(|p| parse_tree::build(p, source_name));
    root.ok_or_else(|| ParseError {
        position: SourcePosition::new(source_name, 1, 1, 0),
        message: "empty parse result".into(),
    })
}

/// Parse a whole compilation unit into its transformed parse tree.
pub fn parse_unit_tree(source: &str, source_name: &str) -> Result<ParseNode, ParseError> {
    parse_tree_for(Rule::program, source, source_name)
}

/// Parse a single statement (or block) into its transformed parse tree.
pub fn parse_statement_tree(source: &str, source_name: &str) -> Result<ParseNode, ParseError> {
    parse_tree_for(Rule::statement_input, source, source_name)
}

/// Parse a whole compilation unit into the AST. A leading `module X;`
/// makes the unit a [`Unit::Module`], otherwise it is a [`Unit::Program`].
pub fn parse_unit(source: &str, source_name: &str) -> Result<Unit, FrontEndError> {
    let tree = parse_unit_tree(source, source_name)?;
    let mut builder = AstBuilder::new();
    Ok(builder.unit(&tree)?)
}

/// Parse a single statement into the AST.
pub fn parse_statement(source: &str, source_name: &str) -> Result<Statement, FrontEndError> {
    let tree = parse_statement_tree(source, source_name)?;
    let mut builder = AstBuilder::new();
    Ok(builder.statement(&tree.children[0])?)
}
