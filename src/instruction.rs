use crate::opcode::Opcode;
use crate::operand::Operand;

/// One instruction after binding: a closed opcode plus its already
/// kind-checked operands, in source order. Its position within the
/// program's instruction vector is its address; the program counter
/// and the label table both index into that vector directly.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundInstruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl BoundInstruction {
    pub fn operand(&self, position: usize) -> &Operand {
        &self.operands[position]
    }
}
