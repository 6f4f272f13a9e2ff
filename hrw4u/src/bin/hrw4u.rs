//! hrw4u - compile hrw4u into header-rewrite rules

use hrw4u_cli::{init_tracing, run, Cli};
use hrw4u_compiler::Direction;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_for(Direction::Forward);
    init_tracing(cli.debug);
    run(Direction::Forward, &cli)
}
