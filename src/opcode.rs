//! The closed set of IPPcode20 opcodes and the operand-kind signature
//! each one is bound against. Opcode lookup is case-insensitive;
//! anything outside this set is an unknown-opcode error (32).

use std::fmt;

/// The static shape an operand must have at a given position,
/// checked once at bind time. "Symb" accepts either a `Const` or a
/// `Var` operand; the others accept exactly one `Operand` variant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandKind {
    Var,
    Symb,
    Label,
    Type,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKind::Var => "var",
            OperandKind::Symb => "symb",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        };
        f.write_str(name)
    }
}

macro_rules! opcodes {
    ($($variant:ident => [$($kind:ident),*]),* $(,)?) => {
        #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
        pub enum Opcode {
            $($variant,)*
        }

        impl Opcode {
            pub fn from_name(name: &str) -> Option<Opcode> {
                match name.to_ascii_uppercase().as_str() {
                    $(stringify!($variant) => Some(Opcode::$variant),)*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Opcode::$variant => stringify!($variant),)*
                }
            }

            pub fn signature(self) -> &'static [OperandKind] {
                match self {
                    $(Opcode::$variant => &[$(OperandKind::$kind),*],)*
                }
            }
        }

        impl fmt::Display for Opcode {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

opcodes! {
    // Memory & frames
    DEFVAR => [Var],
    MOVE => [Var, Symb],
    CREATEFRAME => [],
    PUSHFRAME => [],
    POPFRAME => [],

    // Control flow
    CALL => [Label],
    RETURN => [],
    LABEL => [Label],
    JUMP => [Label],
    JUMPIFEQ => [Label, Symb, Symb],
    JUMPIFNEQ => [Label, Symb, Symb],
    EXIT => [Symb],

    // Arithmetic
    ADD => [Var, Symb, Symb],
    SUB => [Var, Symb, Symb],
    MUL => [Var, Symb, Symb],
    IDIV => [Var, Symb, Symb],
    DIV => [Var, Symb, Symb],

    // Relational
    LT => [Var, Symb, Symb],
    GT => [Var, Symb, Symb],
    EQ => [Var, Symb, Symb],

    // Logic
    AND => [Var, Symb, Symb],
    OR => [Var, Symb, Symb],
    NOT => [Var, Symb],

    // Conversions
    INT2CHAR => [Var, Symb],
    STRI2INT => [Var, Symb, Symb],
    INT2FLOAT => [Var, Symb],
    FLOAT2INT => [Var, Symb],

    // Strings
    CONCAT => [Var, Symb, Symb],
    STRLEN => [Var, Symb],
    GETCHAR => [Var, Symb, Symb],
    SETCHAR => [Var, Symb, Symb],

    // Type introspection
    TYPE => [Var, Symb],

    // I/O
    READ => [Var, Type],
    WRITE => [Symb],
    DPRINT => [Symb],
    BREAK => [],

    // Stack family
    PUSHS => [Symb],
    POPS => [Var],
    CLEARS => [],
    ADDS => [],
    SUBS => [],
    MULS => [],
    IDIVS => [],
    DIVS => [],
    ANDS => [],
    ORS => [],
    NOTS => [],
    LTS => [],
    GTS => [],
    EQS => [],
    INT2CHARS => [],
    STRI2INTS => [],
    INT2FLOATS => [],
    FLOAT2INTS => [],
    JUMPIFEQS => [Label],
    JUMPIFNEQS => [Label],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(Opcode::from_name("move"), Some(Opcode::MOVE));
        assert_eq!(Opcode::from_name("Move"), Some(Opcode::MOVE));
        assert_eq!(Opcode::from_name("MOVE"), Some(Opcode::MOVE));
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(Opcode::from_name("FROBNICATE"), None);
    }

    #[test]
    fn signatures_match_arity() {
        assert_eq!(Opcode::ADD.signature().len(), 3);
        assert_eq!(Opcode::NOT.signature().len(), 2);
        assert_eq!(Opcode::CREATEFRAME.signature().len(), 0);
    }
}
