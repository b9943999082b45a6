use std::fmt;

use crate::frame::FrameKind;
use crate::value::{TypeTag, Value};

/// A variable name split into its frame and identifier, e.g. `GF@x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualName {
    pub frame: FrameKind,
    pub ident: String,
    text: String,
}

impl QualName {
    pub fn new(frame: FrameKind, ident: impl Into<String>) -> QualName {
        let ident = ident.into();
        let prefix = match frame {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        };
        let text = format!("{}@{}", prefix, ident);
        QualName { frame, ident, text }
    }

    /// Splits a `PREFIX@ident` payload; `None` on a missing `@` or an
    /// unrecognized prefix.
    pub fn parse(text: &str) -> Option<QualName> {
        let at = text.find('@')?;
        let (prefix, ident) = (&text[..at], &text[at + 1..]);
        let frame = FrameKind::from_prefix(prefix)?;
        Some(QualName { frame, ident: ident.to_string(), text: text.to_string() })
    }
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A bound operand: constructed once at bind time, its kind already
/// validated against what the opcode expects.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Var(QualName),
    Const(Value),
    Label(String),
    Type(TypeTag),
}

impl Operand {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operand::Var(_) => "var",
            Operand::Const(_) => "symb",
            Operand::Label(_) => "label",
            Operand::Type(_) => "type",
        }
    }
}
