//! The pest parser derived from `rhea.pest`.
//!
//! The generated [`Rule`] enum is the tag vocabulary shared by the parse
//! tree, the transforms, and the AST builder.

use pest_derive::Parser;

/// The Rhea PEG parser.
#[derive(Parser)]
#[grammar = "rhea.pest"]
pub struct RheaParser;
