//! The fetch-execute loop: binds a whole program up front, then
//! repeatedly fetches and executes until an `EXIT`, the end of the
//! instruction stream, or an unrecovered error.

use std::io::{BufRead, Write};

use log::{debug, trace, warn};

use crate::bind::bind_program;
use crate::error::Result;
use crate::exec::{execute, Control, ExecContext};
use crate::frame::FrameModel;
use crate::instruction::BoundInstruction;
use crate::pc::{CallStack, LabelTable, ProgramCounter};
use crate::raw::RawProgram;
use crate::stack::DataStack;

/// How a run terminated: either ran to completion or hit an
/// explicit `EXIT`. Both cases carry the process exit code (0 unless
/// `EXIT` requested otherwise); a classified failure is reported as
/// `Err(EngineError)` instead, never as a `StopCode`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopCode {
    Completed,
    Exited(i32),
}

impl StopCode {
    pub fn exit_code(self) -> i32 {
        match self {
            StopCode::Completed => 0,
            StopCode::Exited(code) => code,
        }
    }
}

/// Owns every piece of mutable machine state plus the bound
/// instruction stream and the two public counters the CLI driver
/// reads after `run()` returns.
pub struct Executor<'io> {
    program: Vec<BoundInstruction>,
    labels: LabelTable,
    frames: FrameModel,
    stack: DataStack,
    calls: CallStack,
    pc: ProgramCounter,
    input: &'io mut dyn BufRead,
    stdout: &'io mut dyn Write,
    stderr: &'io mut dyn Write,

    pub executed_instructions: u64,
    pub maximum_variables: usize,
}

impl<'io> Executor<'io> {
    /// Binds the raw program and builds its label table, the
    /// "binding" state of the executor's state machine. Any opcode,
    /// operand-kind, or duplicate-label error surfaces here, before
    /// a single instruction runs.
    pub fn new(
        raw: &RawProgram,
        input: &'io mut dyn BufRead,
        stdout: &'io mut dyn Write,
        stderr: &'io mut dyn Write,
    ) -> Result<Executor<'io>> {
        let program = bind_program(raw)?;
        let labels = LabelTable::build(&program)?;
        trace!("bound {} instructions", program.len());

        Ok(Executor {
            program,
            labels,
            frames: FrameModel::new(),
            stack: DataStack::new(),
            calls: CallStack::new(),
            pc: ProgramCounter::new(),
            input,
            stdout,
            stderr,
            executed_instructions: 0,
            maximum_variables: 0,
        })
    }

    /// Runs until `EXIT`, the end of the instruction stream, or an
    /// error. Updates both public counters after every instruction.
    pub fn run(&mut self) -> Result<StopCode> {
        loop {
            if self.pc.is_past_end(self.program.len()) {
                return Ok(StopCode::Completed);
            }

            let index = self.pc.fetch_and_advance();
            let instr = &self.program[index];
            trace!("executing #{} {:?}", index, instr.opcode);

            let mut ctx = ExecContext {
                frames: &mut self.frames,
                stack: &mut self.stack,
                pc: &mut self.pc,
                calls: &mut self.calls,
                labels: &self.labels,
                input: self.input,
                stdout: self.stdout,
                stderr: self.stderr,
                executed_instructions: self.executed_instructions,
            };

            let outcome = execute(instr, &mut ctx);

            match outcome {
                Ok(control) => {
                    self.executed_instructions += 1;
                    self.maximum_variables =
                        self.maximum_variables.max(self.frames.initialized_variable_count());

                    match control {
                        Control::Continue => {}
                        Control::Jump(target) => {
                            debug!("jump to #{}", target);
                            self.pc.jump_to(target);
                        }
                        Control::Exit(code) => {
                            debug!("explicit EXIT {}", code);
                            return Ok(StopCode::Exited(code));
                        }
                    }
                }
                Err(err) => {
                    warn!("run terminated with exit code {}: {}", err.exit_code(), err);
                    return Err(err);
                }
            }
        }
    }
}
