use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::instruction::BoundInstruction;
use crate::opcode::Opcode;
use crate::operand::Operand;

/// Maps label names to instruction indices. Built in one pass over
/// the bound program before execution begins (the "binding" state);
/// immutable afterwards.
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    indices: HashMap<String, usize>,
}

impl LabelTable {
    /// Scans every `LABEL` instruction and records its index.
    /// Duplicate label names are a semantic error (52).
    pub fn build(program: &[BoundInstruction]) -> Result<LabelTable> {
        let mut indices = HashMap::new();
        for (index, instr) in program.iter().enumerate() {
            if instr.opcode == Opcode::LABEL {
                let name = match instr.operand(0) {
                    Operand::Label(name) => name.clone(),
                    _ => unreachable!("LABEL's sole operand is bound as a label"),
                };
                if indices.insert(name.clone(), index).is_some() {
                    return Err(EngineError::DuplicateLabel(name));
                }
            }
        }
        Ok(LabelTable { indices })
    }

    /// Resolves a label name to its instruction index. A jump to an
    /// undefined label is a semantic error (52).
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.indices
            .get(name)
            .copied()
            .ok_or_else(|| EngineError::UndefinedLabel(name.to_string()))
    }
}

/// The instruction pointer. `fetch_and_advance` returns the current
/// index and moves past it, so `CALL` pushes the address of the
/// *next* instruction: the counter has already been advanced by the
/// time `CALL` runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgramCounter {
    index: usize,
}

impl ProgramCounter {
    pub fn new() -> ProgramCounter {
        ProgramCounter { index: 0 }
    }

    pub fn is_past_end(&self, program_len: usize) -> bool {
        self.index >= program_len
    }

    pub fn fetch_and_advance(&mut self) -> usize {
        let current = self.index;
        self.index += 1;
        current
    }

    pub fn current(&self) -> usize {
        self.index
    }

    pub fn jump_to(&mut self, index: usize) {
        self.index = index;
    }
}

/// LIFO of instruction indices; `CALL` and `RETURN` are its only
/// mutators.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<usize>,
}

impl CallStack {
    pub fn new() -> CallStack {
        CallStack { frames: Vec::new() }
    }

    pub fn push(&mut self, return_index: usize) {
        self.frames.push(return_index);
    }

    pub fn pop(&mut self) -> Result<usize> {
        self.frames
            .pop()
            .ok_or_else(|| EngineError::MissingValue("call stack is empty".to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::QualName;
    use crate::frame::FrameKind;

    fn label(name: &str) -> BoundInstruction {
        BoundInstruction { opcode: Opcode::LABEL, operands: vec![Operand::Label(name.to_string())] }
    }

    fn defvar() -> BoundInstruction {
        BoundInstruction {
            opcode: Opcode::DEFVAR,
            operands: vec![Operand::Var(QualName::new(FrameKind::Global, "x"))],
        }
    }

    #[test]
    fn resolves_label_to_its_index() {
        let program = vec![defvar(), label("L")];
        let table = LabelTable::build(&program).unwrap();
        assert_eq!(table.resolve("L").unwrap(), 1);
    }

    #[test]
    fn duplicate_label_is_semantic_error() {
        let program = vec![label("L"), label("L")];
        let err = LabelTable::build(&program).unwrap_err();
        assert_eq!(err.exit_code(), 52);
    }

    #[test]
    fn undefined_label_is_semantic_error() {
        let table = LabelTable::build(&[]).unwrap();
        assert_eq!(table.resolve("L").unwrap_err().exit_code(), 52);
    }

    #[test]
    fn fetch_and_advance_returns_current_then_moves() {
        let mut pc = ProgramCounter::new();
        assert_eq!(pc.fetch_and_advance(), 0);
        assert_eq!(pc.fetch_and_advance(), 1);
        assert_eq!(pc.current(), 2);
    }

    #[test]
    fn call_stack_is_lifo() {
        let mut calls = CallStack::new();
        calls.push(3);
        calls.push(7);
        assert_eq!(calls.pop().unwrap(), 7);
        assert_eq!(calls.pop().unwrap(), 3);
        assert!(calls.pop().is_err());
    }
}
