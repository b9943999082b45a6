use std::path::PathBuf;

use clap::Parser;

use crate::error::{CliError, Result};

/// Command-line surface of the interpreter. Help is handled by hand
/// (`disable_help_flag`) rather than clap's own `--help` machinery,
/// because the validation rules below need to see whether `--help`
/// was combined with another flag before anything prints or exits.
#[derive(Parser, Debug, Default)]
#[command(name = "ippcode20", about = "Interpreter for IPPcode20 XML programs.", disable_help_flag = true)]
pub struct Args {
    /// Path to the XML source; read from stdin if omitted.
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Path substituted for stdin while the program executes `READ`.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Path to write statistics to; required by `--insts`/`--vars`.
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Write the executed-instruction count to the statistics file.
    #[arg(long)]
    pub insts: bool,

    /// Write the maximum initialized-variable count to the statistics file.
    #[arg(long)]
    pub vars: bool,

    /// Print usage and exit 0; invalid combined with any other flag.
    #[arg(long)]
    pub help: bool,
}

/// One `--insts`/`--vars` flag, in the order it appeared on the
/// command line. Distinct boolean fields on the same struct don't
/// preserve relative order, so the statistics writer re-scans argv
/// itself rather than trusting field declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsFlag {
    Insts,
    Vars,
}

pub fn stats_flag_order(argv: &[String]) -> Vec<StatsFlag> {
    argv.iter()
        .filter_map(|arg| match arg.as_str() {
            "--insts" => Some(StatsFlag::Insts),
            "--vars" => Some(StatsFlag::Vars),
            _ => None,
        })
        .collect()
}

/// What to do once arguments are known to be well-formed.
pub enum Action {
    PrintHelp,
    Run,
}

/// Checks the combination rules that clap's own derive can't express:
/// at least one of `--source`/`--input` unless `--help`, `--help`
/// exclusive of every other flag, and `--insts`/`--vars` requiring
/// `--stats`. Any violation is a script-parameter error (10).
pub fn validate(args: &Args) -> Result<Action> {
    if args.help {
        let combined = args.source.is_some()
            || args.input.is_some()
            || args.stats.is_some()
            || args.insts
            || args.vars;
        if combined {
            return Err(CliError::Arguments("--help cannot be combined with other options".to_string()));
        }
        return Ok(Action::PrintHelp);
    }

    if (args.insts || args.vars) && args.stats.is_none() {
        return Err(CliError::Arguments("--insts/--vars require --stats".to_string()));
    }

    if args.source.is_none() && args.input.is_none() {
        return Err(CliError::Arguments("at least one of --source or --input is required".to_string()));
    }

    Ok(Action::Run)
}

pub const HELP_TEXT: &str = "\
Usage: ippcode20 [OPTIONS]

  --help               Print this help and exit.
  --source PATH        Path to the XML source (read stdin if omitted).
  --input PATH         Path substituted for stdin during READ.
  --stats PATH         Path to write statistics into.
  --insts              Write the executed-instruction count to the statistics file.
  --vars               Write the maximum initialized-variable count to the statistics file.
";

#[cfg(test)]
mod tests {
    use super::*;

    fn args(source: bool, input: bool, stats: bool, insts: bool, vars: bool, help: bool) -> Args {
        Args {
            source: if source { Some(PathBuf::from("a.xml")) } else { None },
            input: if input { Some(PathBuf::from("a.in")) } else { None },
            stats: if stats { Some(PathBuf::from("a.stats")) } else { None },
            insts,
            vars,
            help,
        }
    }

    #[test]
    fn requires_source_or_input() {
        let err = validate(&args(false, false, false, false, false, false)).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn help_alone_is_fine() {
        assert!(matches!(validate(&args(false, false, false, false, false, true)).unwrap(), Action::PrintHelp));
    }

    #[test]
    fn help_combined_with_source_is_an_error() {
        let err = validate(&args(true, false, false, false, false, true)).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn insts_without_stats_is_an_error() {
        let err = validate(&args(true, false, false, true, false, false)).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn insts_with_stats_is_fine() {
        assert!(matches!(validate(&args(true, false, true, true, false, false)).unwrap(), Action::Run));
    }

    #[test]
    fn input_alone_satisfies_the_source_requirement() {
        assert!(matches!(validate(&args(false, true, false, false, false, false)).unwrap(), Action::Run));
    }

    #[test]
    fn stats_flag_order_is_recovered_from_argv() {
        let argv: Vec<String> = vec!["ippcode20", "--vars", "--stats", "x", "--insts"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(stats_flag_order(&argv), vec![StatsFlag::Vars, StatsFlag::Insts]);
    }
}
