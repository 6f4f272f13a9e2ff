//! Reading inputs, translating them and reporting the results

use crate::cli::{Cli, Jobs};
use anyhow::Context;
use hrw4u_compiler::{ast_json, render, translate, CompileOutput, Direction, SourceFile};
use hrw4u_core::{ErrorMode, Settings, SettingsLoader};
use rayon::prelude::*;
use std::io::{IsTerminal, Read, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

/// Separator between outputs of several plain input files
pub const SEPARATOR: &str = "# ---";

const USAGE_EXIT: u8 = 2;

/// One translated input
#[derive(Debug)]
pub struct Translated {
    pub name: String,
    pub source: String,
    pub out: CompileOutput,
}

/// Per-invocation options
#[derive(Debug, Clone)]
pub struct Options {
    pub direction: Direction,
    pub mode: ErrorMode,
    pub ast: bool,
    pub settings: Settings,
}

impl Options {
    pub fn new(direction: Direction, cli: &Cli, settings: Settings) -> Self {
        Self {
            direction,
            mode: if cli.collect_errors {
                ErrorMode::CollectAll
            } else {
                ErrorMode::FailFast
            },
            ast: cli.ast,
            settings,
        }
    }

    /// Translate one source text
    pub fn translate(&self, name: &str, source: String) -> anyhow::Result<Translated> {
        let out = if self.ast {
            CompileOutput {
                output: ast_json(self.direction, &source)? + "\n",
                errors: Vec::new(),
            }
        } else {
            translate(self.direction, name, &source, &self.settings, self.mode)
        };
        Ok(Translated {
            name: name.to_string(),
            source,
            out,
        })
    }

    fn translate_file(&self, path: &Path) -> anyhow::Result<Translated> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        self.translate(&path.display().to_string(), source)
    }
}

/// Run one invocation of either binary
pub fn run(direction: Direction, cli: &Cli) -> anyhow::Result<ExitCode> {
    let jobs = match Jobs::from_args(&cli.files) {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(ExitCode::from(USAGE_EXIT));
        }
    };

    let settings = match &cli.config {
        Some(path) => SettingsLoader::load(path),
        None => SettingsLoader::discover(),
    }
    .context("failed to load settings")?;

    let options = Options::new(direction, cli, settings);
    let color = !cli.no_color && std::io::stderr().is_terminal();
    debug!("running {:?} with {:?}", direction, jobs);

    let failed = match jobs {
        Jobs::Stdin => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read stdin")?;
            let result = options.translate("<stdin>", source)?;
            emit_stdout(&[result], color)?
        }
        Jobs::Files(paths) => {
            let results = paths
                .par_iter()
                .map(|path| options.translate_file(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            emit_stdout(&results, color)?
        }
        Jobs::Pairs(pairs) => {
            let results = pairs
                .par_iter()
                .map(|(input, output)| write_pair(&options, input, output))
                .collect::<anyhow::Result<Vec<_>>>()?;
            results
                .iter()
                .fold(false, |failed, result| report(result, color) || failed)
        }
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Print successful outputs in argument order; `true` when any input failed
fn emit_stdout(results: &[Translated], color: bool) -> anyhow::Result<bool> {
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    let mut failed = false;
    let mut first = true;

    for result in results {
        if report(result, color) {
            failed = true;
            continue;
        }
        if !first {
            writeln!(stdout, "{}", SEPARATOR)?;
        }
        first = false;
        stdout.write_all(result.out.output.as_bytes())?;
    }
    stdout.flush()?;
    Ok(failed)
}

fn write_pair(options: &Options, input: &Path, output: &Path) -> anyhow::Result<Translated> {
    let result = options.translate_file(input)?;
    if result.out.is_ok() {
        std::fs::write(output, &result.out.output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!("✅ {} -> {}", input.display(), output.display());
    }
    Ok(result)
}

/// Render the errors of one result to stderr; `true` when there were any
fn report(result: &Translated, color: bool) -> bool {
    if result.out.is_ok() {
        return false;
    }
    let file = SourceFile::new(&result.name, &result.source);
    eprint!("{}", render(&file, &result.out.errors, color));
    eprintln!("{}: {} error(s)", result.name, result.out.errors.len());
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(direction: Direction, cli: &Cli) -> Options {
        Options::new(direction, cli, Settings::default())
    }

    #[test]
    fn test_translate_forward() {
        let opts = options(Direction::Forward, &Cli::default());
        let result = opts.translate("t.hrw4u", "REMAP { set-debug; }".to_string()).unwrap();
        assert!(result.out.is_ok());
        assert_eq!(result.out.output, "cond %{REMAP_PSEUDO_HOOK} [AND]\n    set-debug\n");
    }

    #[test]
    fn test_translate_ast() {
        let cli = Cli {
            ast: true,
            ..Cli::default()
        };
        let opts = options(Direction::Reverse, &cli);
        let result = opts.translate("t.conf", "cond %{TRUE}\n".to_string()).unwrap();
        assert!(result.out.output.trim_start().starts_with('{'));
        assert!(result.out.output.ends_with("}\n"));
    }

    #[test]
    fn test_collect_errors_flag_sets_mode() {
        let cli = Cli {
            collect_errors: true,
            ..Cli::default()
        };
        assert_eq!(options(Direction::Forward, &cli).mode, ErrorMode::CollectAll);
        assert_eq!(
            options(Direction::Forward, &Cli::default()).mode,
            ErrorMode::FailFast
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let opts = options(Direction::Forward, &Cli::default());
        let err = opts.translate_file(Path::new("/nonexistent/x.hrw4u")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
