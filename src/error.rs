use thiserror::Error;

/// Every failure the execution engine can raise, each tied to exactly
/// one of the exit codes IPPcode20 associates with its failure class.
///
/// Structural failures (unknown opcode, malformed XML schema rules)
/// are raised by the loader and the bind phase; everything from
/// `VariableRedefined` down is raised while the program is running.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),

    #[error("operand {position} of {opcode} is not a {expected}")]
    BadOperandKind {
        opcode: String,
        position: usize,
        expected: &'static str,
    },

    #[error("{0}")]
    InvalidOperandLiteral(String),

    #[error("label `{0}` is already defined")]
    DuplicateLabel(String),

    #[error("jump to undefined label `{0}`")]
    UndefinedLabel(String),

    #[error("variable `{0}` is already defined in its frame")]
    VariableRedefined(String),

    #[error("variable `{0}` is not defined in its frame")]
    UnknownVariable(String),

    #[error("frame `{0}` is not available")]
    FrameUnavailable(String),

    #[error("{0}")]
    MissingValue(String),

    #[error("{0}")]
    BadOperandType(String),

    #[error("{0}")]
    BadOperandValue(String),

    #[error("{0}")]
    InvalidStringOperation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// The process exit code this failure maps to, per the interpreter's
    /// per-failure-class exit code contract.
    pub fn exit_code(&self) -> i32 {
        use EngineError::*;
        match self {
            UnknownOpcode(_) | BadOperandKind { .. } | InvalidOperandLiteral(_) => 32,
            DuplicateLabel(_) | UndefinedLabel(_) | VariableRedefined(_) => 52,
            BadOperandType(_) => 53,
            UnknownVariable(_) => 54,
            FrameUnavailable(_) => 55,
            MissingValue(_) => 56,
            BadOperandValue(_) => 57,
            InvalidStringOperation(_) => 58,
            Internal(_) => 99,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
