//! Argument model shared by both binaries

use clap::{CommandFactory, FromArgMatches, Parser};
use hrw4u_compiler::Direction;
use hrw4u_core::{Error, Result};
use std::path::PathBuf;

/// Translate between hrw4u and native header-rewrite rules
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input files, or input:output pairs. Reads stdin when empty
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,

    /// Print the parse tree as JSON instead of translating
    #[arg(long)]
    pub ast: bool,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Report every error in a file instead of stopping at the first
    #[arg(long)]
    pub collect_errors: bool,

    /// Settings file (TOML or JSON)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Never color error output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Parse the process arguments under the binary's own name
    pub fn parse_for(direction: Direction) -> Self {
        let (name, about) = match direction {
            Direction::Forward => ("hrw4u", "Compile hrw4u into header-rewrite rules"),
            Direction::Reverse => ("u4wrh", "Turn header-rewrite rules back into hrw4u"),
        };
        let matches = Cli::command()
            .name(name)
            .bin_name(name)
            .about(about)
            .get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

/// What one invocation works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Jobs {
    Stdin,
    /// Outputs go to stdout, separated by `# ---`
    Files(Vec<PathBuf>),
    /// Each output goes to its own file
    Pairs(Vec<(PathBuf, PathBuf)>),
}

impl Jobs {
    /// Every argument must use the same form
    pub fn from_args(args: &[String]) -> Result<Jobs> {
        if args.is_empty() {
            return Ok(Jobs::Stdin);
        }

        let pairs = args.iter().filter(|a| a.contains(':')).count();
        if pairs == 0 {
            return Ok(Jobs::Files(args.iter().map(PathBuf::from).collect()));
        }
        if pairs != args.len() {
            return Err(Error::Usage(
                "cannot mix input:output pairs with plain input files".to_string(),
            ));
        }

        args.iter()
            .map(|arg| match arg.split_once(':') {
                Some((input, output)) if !input.is_empty() && !output.is_empty() => {
                    Ok((PathBuf::from(input), PathBuf::from(output)))
                }
                _ => Err(Error::Usage(format!("malformed input:output pair '{}'", arg))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Jobs::Pairs)
    }
}
