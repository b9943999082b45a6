use std::path::PathBuf;

use thiserror::Error;

/// Every failure this binary can report, each mapped to exactly one
/// process exit code. The 10/11/12 class is raised entirely here;
/// the engine and loader crates never see argv or a filesystem.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Arguments(String),

    #[error("cannot open `{}` for reading: {source}", path.display())]
    InputFile { path: PathBuf, source: std::io::Error },

    #[error("cannot open `{}` for writing: {source}", path.display())]
    OutputFile { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Loader(#[from] ippcode20_loader::LoaderError),

    #[error(transparent)]
    Engine(#[from] ippcode20::EngineError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Arguments(_) => 10,
            CliError::InputFile { .. } => 11,
            CliError::OutputFile { .. } => 12,
            CliError::Loader(err) => err.exit_code(),
            CliError::Engine(err) => err.exit_code(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
