//! Argument parsing, file/stdin wiring, and statistics output for the
//! IPPcode20 interpreter. This crate is the only place in the
//! workspace that touches argv, the filesystem, or real stdio;
//! the engine and loader crates work purely against injected data and
//! in-memory buffers.

pub mod args;
pub mod error;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

use clap::Parser;
use log::{info, warn};

use args::{stats_flag_order, validate, Action, Args, StatsFlag, HELP_TEXT};
use error::{CliError, Result};
use ippcode20::Executor;

/// Runs the interpreter end to end for one process invocation.
/// `argv` is the full `std::env::args()` sequence (program name
/// included); returns the process exit code, never panicking.
pub fn run<I: Iterator<Item = String>>(argv: I) -> i32 {
    let argv: Vec<String> = argv.collect();
    match try_run(&argv) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", err);
            err.exit_code()
        }
    }
}

fn try_run(argv: &[String]) -> Result<i32> {
    let args = Args::try_parse_from(argv.iter().cloned())
        .map_err(|err| CliError::Arguments(err.to_string()))?;

    match validate(&args)? {
        Action::PrintHelp => {
            print!("{}", HELP_TEXT);
            return Ok(0);
        }
        Action::Run => {}
    }

    let source_xml = read_source(args.source.as_deref())?;
    let program = ippcode20_loader::load(&source_xml)?;

    let mut input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(open_for_reading(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    info!("running {} instructions", program.instructions.len());
    let mut executor = Executor::new(&program, &mut input, &mut stdout, &mut stderr)?;
    let outcome = executor.run();

    let executed_instructions = executor.executed_instructions;
    let maximum_variables = executor.maximum_variables;

    if let Some(stats_path) = &args.stats {
        write_stats(stats_path, argv, executed_instructions, maximum_variables)?;
    }

    match outcome {
        Ok(stop) => Ok(stop.exit_code()),
        Err(err) => {
            warn!("run terminated with exit code {}", err.exit_code());
            Err(CliError::Engine(err))
        }
    }
}

fn read_source(source: Option<&Path>) -> Result<String> {
    let mut text = String::new();
    match source {
        Some(path) => {
            open_for_reading(path)?
                .read_to_string(&mut text)
                .map_err(|source| CliError::InputFile { path: path.to_path_buf(), source })?;
        }
        None => {
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::InputFile { path: Path::new("<stdin>").to_path_buf(), source })?;
        }
    }
    Ok(text)
}

fn open_for_reading(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| CliError::InputFile { path: path.to_path_buf(), source })
}

/// Writes one decimal integer per line, in the order `--insts`/
/// `--vars` appeared on the command line.
fn write_stats(path: &Path, argv: &[String], executed_instructions: u64, maximum_variables: usize) -> Result<()> {
    let mut file = File::create(path).map_err(|source| CliError::OutputFile { path: path.to_path_buf(), source })?;
    for flag in stats_flag_order(argv) {
        let line = match flag {
            StatsFlag::Insts => executed_instructions.to_string(),
            StatsFlag::Vars => maximum_variables.to_string(),
        };
        writeln!(file, "{}", line).map_err(|source| CliError::OutputFile { path: path.to_path_buf(), source })?;
    }
    Ok(())
}
