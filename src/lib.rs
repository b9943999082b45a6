//! Frame/stack execution engine for IPPcode20 programs.
//!
//! This crate has no knowledge of XML, CLI argument parsing, or the
//! filesystem; it consumes a [`RawProgram`](raw::RawProgram) (a plain
//! ordered list of opcodes and operands, already extracted from
//! whatever source format produced them) and runs it against a
//! frame/stack machine until termination. The `ippcode20-loader`
//! crate in this workspace builds a `RawProgram` from the IPPcode20
//! XML source format; the `ippcode20-cli` crate wires the loader and
//! this engine together into a runnable interpreter.
//!
//! The entry point is [`Executor`](executor::Executor): construct one
//! from a `RawProgram` plus the three injected I/O channels, then
//! call [`run`](executor::Executor::run).

pub mod bind;
pub mod error;
pub mod exec;
pub mod executor;
pub mod frame;
pub mod hexfloat;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod ops;
pub mod pc;
pub mod raw;
pub mod stack;
pub mod text;
pub mod value;

pub use error::{EngineError, Result};
pub use executor::{Executor, StopCode};
pub use raw::{RawInstruction, RawOperand, RawProgram};
