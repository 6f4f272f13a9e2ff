//! u4wrh - turn header-rewrite rules back into hrw4u

use hrw4u_cli::{init_tracing, run, Cli};
use hrw4u_compiler::Direction;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_for(Direction::Reverse);
    init_tracing(cli.debug);
    run(Direction::Reverse, &cli)
}
