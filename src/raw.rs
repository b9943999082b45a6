//! The contract between the XML loader and the engine's bind phase.
//! Everything here is plain data: the loader fills it in from the
//! source document, validating only XML-schema-level rules; the
//! engine's `bind` module turns it into typed `Operand`s and checks
//! opcode-specific operand kinds and counts.

/// One `<argN>` element: its `type` attribute and text content. `nil`
/// type and a missing text node both normalize to an empty string,
/// which is the loader's job, not the engine's.
#[derive(Clone, Debug, PartialEq)]
pub struct RawOperand {
    pub type_name: String,
    pub text: String,
}

/// One `<instruction>` element, operands already ordered `arg1..argN`.
#[derive(Clone, Debug, PartialEq)]
pub struct RawInstruction {
    pub opcode: String,
    pub order: i64,
    pub operands: Vec<RawOperand>,
}

/// A whole parsed document: instructions sorted ascending by `order`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawProgram {
    pub instructions: Vec<RawInstruction>,
}
