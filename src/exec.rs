//! The effect of each opcode: resolves its operands, applies the
//! runtime type rules, and mutates frames/stacks/counters. Shared
//! numeric/relational/logical/conversion effects live in `ops`; this
//! module is the glue that resolves `Operand`s to `Value`s (or pops
//! them off the data stack) and writes results back.

use std::io::{BufRead, Write};

use crate::error::{EngineError, Result};
use crate::frame::FrameModel;
use crate::instruction::BoundInstruction;
use crate::opcode::Opcode;
use crate::operand::{Operand, QualName};
use crate::ops;
use crate::pc::{CallStack, LabelTable, ProgramCounter};
use crate::stack::DataStack;
use crate::value::{TypeTag, Value};

pub enum Control {
    Continue,
    Jump(usize),
    Exit(i32),
}

pub struct ExecContext<'a> {
    pub frames: &'a mut FrameModel,
    pub stack: &'a mut DataStack,
    pub pc: &'a mut ProgramCounter,
    pub calls: &'a mut CallStack,
    pub labels: &'a LabelTable,
    pub input: &'a mut dyn BufRead,
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub executed_instructions: u64,
}

fn as_var(operand: &Operand) -> &QualName {
    match operand {
        Operand::Var(q) => q,
        _ => unreachable!("operand was bound as Var"),
    }
}

fn as_label_name(operand: &Operand) -> &str {
    match operand {
        Operand::Label(name) => name,
        _ => unreachable!("operand was bound as Label"),
    }
}

fn as_type_tag(operand: &Operand) -> TypeTag {
    match operand {
        Operand::Type(tag) => *tag,
        _ => unreachable!("operand was bound as Type"),
    }
}

fn resolve_value(operand: &Operand, frames: &FrameModel) -> Result<Value> {
    match operand {
        Operand::Const(value) => Ok(value.clone()),
        Operand::Var(q) => frames.value_of(q.frame, &q.ident, &q.to_string()),
        _ => unreachable!("operand was bound as symb"),
    }
}

/// Does not raise missing-value on an uninitialized variable; `TYPE`
/// is the one opcode that needs the type of a possibly-unset slot.
fn resolve_type(operand: &Operand, frames: &FrameModel) -> Result<Option<TypeTag>> {
    match operand {
        Operand::Const(value) => Ok(Some(value.type_tag())),
        Operand::Var(q) => frames.type_of(q.frame, &q.ident),
        _ => unreachable!("operand was bound as symb"),
    }
}

pub fn execute(instr: &BoundInstruction, ctx: &mut ExecContext) -> Result<Control> {
    use Opcode::*;

    match instr.opcode {
        DEFVAR => {
            let q = as_var(instr.operand(0));
            ctx.frames.defvar(q.frame, &q.ident)?;
        }
        MOVE => {
            let dest = as_var(instr.operand(0));
            let value = resolve_value(instr.operand(1), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, value)?;
        }
        CREATEFRAME => ctx.frames.create_temporary(),
        PUSHFRAME => ctx.frames.push_temporary_to_local()?,
        POPFRAME => ctx.frames.pop_local_to_temporary()?,

        CALL => {
            let target = ctx.labels.resolve(as_label_name(instr.operand(0)))?;
            ctx.calls.push(ctx.pc.current());
            return Ok(Control::Jump(target));
        }
        RETURN => {
            let target = ctx.calls.pop()?;
            return Ok(Control::Jump(target));
        }
        LABEL => {}
        JUMP => {
            let target = ctx.labels.resolve(as_label_name(instr.operand(0)))?;
            return Ok(Control::Jump(target));
        }
        JUMPIFEQ | JUMPIFNEQ => {
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            let b = resolve_value(instr.operand(2), ctx.frames)?;
            let equal = ops::eq(&a, &b)?.as_bool().unwrap();
            let taken = if instr.opcode == JUMPIFEQ { equal } else { !equal };
            if taken {
                let target = ctx.labels.resolve(as_label_name(instr.operand(0)))?;
                return Ok(Control::Jump(target));
            }
        }
        EXIT => {
            let code = exit_code_of(&resolve_value(instr.operand(0), ctx.frames)?)?;
            return Ok(Control::Exit(code));
        }

        ADD | SUB | MUL | IDIV | DIV => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            let b = resolve_value(instr.operand(2), ctx.frames)?;
            let result = match instr.opcode {
                ADD => ops::add(&a, &b)?,
                SUB => ops::sub(&a, &b)?,
                MUL => ops::mul(&a, &b)?,
                IDIV => ops::idiv(&a, &b)?,
                DIV => ops::div(&a, &b)?,
                _ => unreachable!(),
            };
            ctx.frames.set(dest.frame, &dest.ident, result)?;
        }

        LT | GT | EQ => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            let b = resolve_value(instr.operand(2), ctx.frames)?;
            let result = match instr.opcode {
                LT => ops::lt(&a, &b)?,
                GT => ops::gt(&a, &b)?,
                EQ => ops::eq(&a, &b)?,
                _ => unreachable!(),
            };
            ctx.frames.set(dest.frame, &dest.ident, result)?;
        }

        AND | OR => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            let b = resolve_value(instr.operand(2), ctx.frames)?;
            let result = if instr.opcode == AND { ops::and(&a, &b)? } else { ops::or(&a, &b)? };
            ctx.frames.set(dest.frame, &dest.ident, result)?;
        }
        NOT => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, ops::not(&a)?)?;
        }

        INT2CHAR => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, ops::int2char(&a)?)?;
        }
        STRI2INT => {
            let dest = as_var(instr.operand(0));
            let s = resolve_value(instr.operand(1), ctx.frames)?;
            let i = resolve_value(instr.operand(2), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, ops::stri2int(&s, &i)?)?;
        }
        INT2FLOAT => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, ops::int2float(&a)?)?;
        }
        FLOAT2INT => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, ops::float2int(&a)?)?;
        }

        CONCAT => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            let b = resolve_value(instr.operand(2), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, ops::concat(&a, &b)?)?;
        }
        STRLEN => {
            let dest = as_var(instr.operand(0));
            let a = resolve_value(instr.operand(1), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, ops::strlen(&a)?)?;
        }
        GETCHAR => {
            let dest = as_var(instr.operand(0));
            let s = resolve_value(instr.operand(1), ctx.frames)?;
            let i = resolve_value(instr.operand(2), ctx.frames)?;
            ctx.frames.set(dest.frame, &dest.ident, ops::getchar(&s, &i)?)?;
        }
        SETCHAR => {
            let dest = as_var(instr.operand(0));
            let current = ctx.frames.value_of(dest.frame, &dest.ident, &dest.to_string())?;
            let i = resolve_value(instr.operand(1), ctx.frames)?;
            let r = resolve_value(instr.operand(2), ctx.frames)?;
            let result = ops::setchar(&current, &i, &r)?;
            ctx.frames.set(dest.frame, &dest.ident, result)?;
        }

        TYPE => {
            let dest = as_var(instr.operand(0));
            let tag = resolve_type(instr.operand(1), ctx.frames)?;
            let text = tag.map(|t| t.name().to_string()).unwrap_or_default();
            ctx.frames.set(dest.frame, &dest.ident, Value::String(text))?;
        }

        READ => {
            let dest = as_var(instr.operand(0));
            let type_tag = as_type_tag(instr.operand(1));
            let value = read_value(ctx.input, type_tag);
            ctx.frames.set(dest.frame, &dest.ident, value)?;
        }
        WRITE => {
            let value = resolve_value(instr.operand(0), ctx.frames)?;
            write!(ctx.stdout, "{}", value.render())
                .map_err(|e| EngineError::Internal(e.to_string()))?;
        }
        DPRINT => {
            let value = resolve_value(instr.operand(0), ctx.frames)?;
            write!(ctx.stderr, "{}", value.render())
                .map_err(|e| EngineError::Internal(e.to_string()))?;
        }
        BREAK => {
            writeln!(
                ctx.stderr,
                "position {}, executed {} instructions",
                ctx.pc.current(),
                ctx.executed_instructions
            )
            .map_err(|e| EngineError::Internal(e.to_string()))?;
        }

        PUSHS => {
            let value = resolve_value(instr.operand(0), ctx.frames)?;
            ctx.stack.push(value);
        }
        POPS => {
            let dest = as_var(instr.operand(0));
            let value = ctx.stack.pop()?;
            ctx.frames.set(dest.frame, &dest.ident, value)?;
        }
        CLEARS => ctx.stack.clear(),

        ADDS | SUBS | MULS | IDIVS | DIVS => {
            let b = ctx.stack.pop()?;
            let a = ctx.stack.pop()?;
            let result = match instr.opcode {
                ADDS => ops::add(&a, &b)?,
                SUBS => ops::sub(&a, &b)?,
                MULS => ops::mul(&a, &b)?,
                IDIVS => ops::idiv(&a, &b)?,
                DIVS => ops::div(&a, &b)?,
                _ => unreachable!(),
            };
            ctx.stack.push(result);
        }
        ANDS | ORS => {
            let b = ctx.stack.pop()?;
            let a = ctx.stack.pop()?;
            let result = if instr.opcode == ANDS { ops::and(&a, &b)? } else { ops::or(&a, &b)? };
            ctx.stack.push(result);
        }
        NOTS => {
            let a = ctx.stack.pop()?;
            ctx.stack.push(ops::not(&a)?);
        }
        LTS | GTS | EQS => {
            let b = ctx.stack.pop()?;
            let a = ctx.stack.pop()?;
            let result = match instr.opcode {
                LTS => ops::lt(&a, &b)?,
                GTS => ops::gt(&a, &b)?,
                EQS => ops::eq(&a, &b)?,
                _ => unreachable!(),
            };
            ctx.stack.push(result);
        }
        INT2CHARS => {
            let a = ctx.stack.pop()?;
            ctx.stack.push(ops::int2char(&a)?);
        }
        STRI2INTS => {
            let index = ctx.stack.pop()?;
            let string = ctx.stack.pop()?;
            ctx.stack.push(ops::stri2int(&string, &index)?);
        }
        INT2FLOATS => {
            let a = ctx.stack.pop()?;
            ctx.stack.push(ops::int2float(&a)?);
        }
        FLOAT2INTS => {
            let a = ctx.stack.pop()?;
            ctx.stack.push(ops::float2int(&a)?);
        }
        JUMPIFEQS | JUMPIFNEQS => {
            let b = ctx.stack.pop()?;
            let a = ctx.stack.pop()?;
            let equal = ops::eq(&a, &b)?.as_bool().unwrap();
            let taken = if instr.opcode == JUMPIFEQS { equal } else { !equal };
            if taken {
                let target = ctx.labels.resolve(as_label_name(instr.operand(0)))?;
                return Ok(Control::Jump(target));
            }
        }
    }

    Ok(Control::Continue)
}

fn exit_code_of(value: &Value) -> Result<i32> {
    let n = value
        .as_int()
        .ok_or_else(|| EngineError::BadOperandType(format!("EXIT requires int, got {}", value.type_tag())))?;
    if (0..=49).contains(&n) {
        Ok(n as i32)
    } else {
        Err(EngineError::BadOperandValue(format!("exit code {} is out of range [0, 49]", n)))
    }
}

/// `READ`: one line per call; any parse failure (including running
/// out of input) coerces the variable to `(nil, nil)` rather than
/// propagating an error.
fn read_value(input: &mut dyn BufRead, type_tag: TypeTag) -> Value {
    let mut line = String::new();
    if input.read_line(&mut line).unwrap_or(0) == 0 {
        return Value::Nil;
    }
    let text = line.trim_end_matches(['\n', '\r']);

    match type_tag {
        TypeTag::Int => text.trim().parse::<i64>().map(Value::Int).unwrap_or(Value::Nil),
        TypeTag::Float => {
            crate::hexfloat::parse(text.trim()).map(Value::Float).unwrap_or(Value::Nil)
        }
        TypeTag::Bool => Value::Bool(text.trim().eq_ignore_ascii_case("true")),
        TypeTag::String => Value::String(text.to_string()),
        TypeTag::Nil => Value::Nil,
    }
}
