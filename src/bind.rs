//! Turns the loader's plain `RawInstruction`/`RawOperand` data into
//! the engine's typed, validated `BoundInstruction`s. This is the
//! "binding" state of the executor's state machine: opcode lookup,
//! operand decoding, and operand-kind checking all happen here, once,
//! before a single instruction executes.

use crate::error::{EngineError, Result};
use crate::hexfloat;
use crate::instruction::BoundInstruction;
use crate::opcode::{Opcode, OperandKind};
use crate::operand::{Operand, QualName};
use crate::raw::{RawInstruction, RawOperand, RawProgram};
use crate::text;
use crate::value::{TypeTag, Value};

/// Decodes one `<argN>` element into a typed `Operand`. Literal
/// parse failures (`int`, `float`, `type`) are invalid input (32);
/// `var` payloads that don't split into a known frame prefix are
/// also invalid input, since the frame/ident split is a syntactic
/// property of the literal, not something a running frame model can
/// judge.
fn decode_operand(raw: &RawOperand) -> Result<Operand> {
    match raw.type_name.as_str() {
        "int" => raw
            .text
            .parse::<i64>()
            .map(|n| Operand::Const(Value::Int(n)))
            .map_err(|_| EngineError::InvalidOperandLiteral(format!("`{}` is not a valid int literal", raw.text))),
        "float" => hexfloat::parse(&raw.text)
            .map(|f| Operand::Const(Value::Float(f)))
            .ok_or_else(|| EngineError::InvalidOperandLiteral(format!("`{}` is not a valid float literal", raw.text))),
        "bool" => Ok(Operand::Const(Value::Bool(raw.text.eq_ignore_ascii_case("true")))),
        "string" => Ok(Operand::Const(Value::String(text::decode_escapes(&raw.text)))),
        "nil" => Ok(Operand::Const(Value::Nil)),
        "label" => Ok(Operand::Label(raw.text.clone())),
        "type" => TypeTag::from_name(&raw.text)
            .map(Operand::Type)
            .ok_or_else(|| EngineError::InvalidOperandLiteral(format!("`{}` is not a type name", raw.text))),
        "var" => QualName::parse(&raw.text)
            .map(Operand::Var)
            .ok_or_else(|| EngineError::InvalidOperandLiteral(format!("`{}` is not a valid variable name", raw.text))),
        other => Err(EngineError::InvalidOperandLiteral(format!("unknown operand type `{}`", other))),
    }
}

fn kind_matches(operand: &Operand, expected: OperandKind) -> bool {
    matches!(
        (operand, expected),
        (Operand::Var(_), OperandKind::Var)
            | (Operand::Var(_), OperandKind::Symb)
            | (Operand::Const(_), OperandKind::Symb)
            | (Operand::Label(_), OperandKind::Label)
            | (Operand::Type(_), OperandKind::Type)
    )
}

/// Binds one raw instruction: resolves its opcode, decodes every
/// operand, and checks the decoded operands against the opcode's
/// fixed signature.
pub fn bind_instruction(raw: &RawInstruction) -> Result<BoundInstruction> {
    let opcode = Opcode::from_name(&raw.opcode)
        .ok_or_else(|| EngineError::UnknownOpcode(raw.opcode.clone()))?;

    let signature = opcode.signature();
    if raw.operands.len() != signature.len() {
        return Err(EngineError::BadOperandKind {
            opcode: opcode.name().to_string(),
            position: raw.operands.len(),
            expected: "operand count",
        });
    }

    let mut operands = Vec::with_capacity(signature.len());
    for (position, (raw_operand, &expected)) in raw.operands.iter().zip(signature).enumerate() {
        let operand = decode_operand(raw_operand)?;
        if !kind_matches(&operand, expected) {
            return Err(EngineError::BadOperandKind {
                opcode: opcode.name().to_string(),
                position: position + 1,
                expected: match expected {
                    OperandKind::Var => "var",
                    OperandKind::Symb => "symb",
                    OperandKind::Label => "label",
                    OperandKind::Type => "type",
                },
            });
        }
        operands.push(operand);
    }

    Ok(BoundInstruction { opcode, operands })
}

/// Binds every instruction in a loaded program, in the order the
/// loader already sorted them (ascending `order`); that order
/// becomes the program's address space.
pub fn bind_program(raw: &RawProgram) -> Result<Vec<BoundInstruction>> {
    raw.instructions.iter().map(bind_instruction).collect()
}
