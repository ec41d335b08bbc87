//! rheac-drv - The compiler driver.
//!
//! A set of subtools that each consume one compilation unit on stdin and
//! emit a view of the pipeline: the raw parse tree, the canonical AST,
//! the mangled-symbol table, or the result of running inference. Exit 0
//! on success, nonzero on any error, with position-annotated diagnostics
//! on stderr. Each invocation owns its grammar state, scope tree, type
//! mapper, and inference table; nothing is shared.

use std::fmt::Write as _;
use std::io::Read;

use anyhow::{bail, Context, Result};

use rheac_par::{parse_unit, parse_unit_tree};
use rheac_sem::{collect_symbols, TypeEngine};

/// The subtool to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Dump the transformed parse tree
    ParseTree,
    /// Dump the canonical S-expression AST
    Ast,
    /// Dump the unit's mangled-symbol table
    Symbols,
    /// Run inference and report diagnostics
    Check,
}

/// Driver configuration, parsed from the command line.
#[derive(Debug)]
pub struct Config {
    pub command: Command,
    /// Logical source name used in diagnostics
    pub source_name: String,
}

impl Config {
    /// Parse `rheac <command> [source-name]`.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut args = args.into_iter().skip(1);

        let command = match args.next().as_deref() {
            Some("parse-tree") => Command::ParseTree,
            Some("ast") => Command::Ast,
            Some("symbols") => Command::Symbols,
            Some("check") => Command::Check,
            Some(other) => bail!("unknown command `{}`; {}", other, USAGE),
            None => bail!("missing command; {}", USAGE),
        };

        let source_name = args.next().unwrap_or_else(|| "<stdin>".to_string());
        Ok(Self {
            command,
            source_name,
        })
    }
}

const USAGE: &str = "usage: rheac <parse-tree|ast|symbols|check> [source-name] < file.rhea";

/// One driver invocation over one compilation unit.
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the configured subtool over `source`, producing the text to
    /// print on stdout.
    pub fn run(&self, source: &str) -> Result<String> {
        let name = &self.config.source_name;

        match self.config.command {
            Command::ParseTree => {
                let tree = parse_unit_tree(source, name)?;
                Ok(tree.dump())
            }
            Command::Ast => {
                let unit = parse_unit(source, name)?;
                Ok(format!("{}\n", unit))
            }
            Command::Symbols => {
                let unit = parse_unit(source, name)?;
                let mut engine = TypeEngine::new();
                engine
                    .run(&unit)
                    .context("declaration analysis failed")?;

                let table = collect_symbols(&unit, &engine.mapper)?;
                let mut out = String::new();
                for (mangled, record) in table.iter() {
                    let _ = writeln!(
                        out,
                        "{}\t({}) -> {}",
                        mangled,
                        record
                            .signature
                            .argument_types
                            .values()
                            .map(|t| t.to_string())
                            .collect::<Vec<_>>()
                            .join(","),
                        record.signature.return_type
                    );
                }
                Ok(out)
            }
            Command::Check => {
                let unit = parse_unit(source, name)?;
                let mut engine = TypeEngine::new();
                engine.run(&unit)?;
                engine.check()?;

                let mut out = String::new();
                for diagnostic in engine.handler.take() {
                    let _ = writeln!(out, "{}", diagnostic);
                }
                let _ = writeln!(out, "ok: {} top-level statements", unit.statements().len());
                Ok(out)
            }
        }
    }
}

/// Entry point shared by the binary and the tests.
pub fn run() -> Result<()> {
    let config = Config::from_args(std::env::args())?;
    let session = Session::new(config);

    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("failed to read source from stdin")?;

    print!("{}", session.run(&source)?);
    Ok(())
}
