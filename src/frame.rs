use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::value::{TypeTag, Value};

/// Which of the three frame kinds a variable name's `PREFIX@` selects.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum FrameKind {
    Global,
    Local,
    Temporary,
}

impl FrameKind {
    pub fn from_prefix(prefix: &str) -> Option<FrameKind> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }
}

/// A declared but possibly unassigned variable slot.
#[derive(Clone, Debug, Default)]
struct Variable {
    value: Option<Value>,
}

impl Variable {
    fn type_tag(&self) -> Option<TypeTag> {
        self.value.as_ref().map(Value::type_tag)
    }
}

/// A name-unique mapping of variable name to variable slot.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    variables: HashMap<String, Variable>,
}

impl Frame {
    fn new() -> Frame {
        Frame { variables: HashMap::new() }
    }

    fn declare(&mut self, ident: &str) -> Result<()> {
        if self.variables.contains_key(ident) {
            return Err(EngineError::VariableRedefined(ident.to_string()));
        }
        self.variables.insert(ident.to_string(), Variable::default());
        Ok(())
    }

    fn get(&self, ident: &str) -> Result<&Variable> {
        self.variables
            .get(ident)
            .ok_or_else(|| EngineError::UnknownVariable(ident.to_string()))
    }

    fn get_mut(&mut self, ident: &str) -> Result<&mut Variable> {
        self.variables
            .get_mut(ident)
            .ok_or_else(|| EngineError::UnknownVariable(ident.to_string()))
    }

    fn initialized_count(&self) -> usize {
        self.variables.values().filter(|v| v.value.is_some()).count()
    }
}

/// Owns the Global Frame, an optional Temporary Frame, and the stack
/// of Local Frames; resolves `PREFIX@ident` names against them.
pub struct FrameModel {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl FrameModel {
    pub fn new() -> FrameModel {
        FrameModel {
            global: Frame::new(),
            temporary: None,
            locals: Vec::new(),
        }
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame> {
        match kind {
            FrameKind::Global => Ok(&self.global),
            FrameKind::Local => self
                .locals
                .last()
                .ok_or(EngineError::FrameUnavailable("LF".to_string())),
            FrameKind::Temporary => self
                .temporary
                .as_ref()
                .ok_or(EngineError::FrameUnavailable("TF".to_string())),
        }
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame> {
        match kind {
            FrameKind::Global => Ok(&mut self.global),
            FrameKind::Local => self
                .locals
                .last_mut()
                .ok_or(EngineError::FrameUnavailable("LF".to_string())),
            FrameKind::Temporary => self
                .temporary
                .as_mut()
                .ok_or(EngineError::FrameUnavailable("TF".to_string())),
        }
    }

    pub fn defvar(&mut self, kind: FrameKind, ident: &str) -> Result<()> {
        self.frame_mut(kind)?.declare(ident)
    }

    /// `None` if declared but not yet assigned; does not raise
    /// missing-value, unlike `value_of`.
    pub fn type_of(&self, kind: FrameKind, ident: &str) -> Result<Option<TypeTag>> {
        Ok(self.frame(kind)?.get(ident)?.type_tag())
    }

    pub fn value_of(&self, kind: FrameKind, ident: &str, qualname: &str) -> Result<Value> {
        let variable = self.frame(kind)?.get(ident)?;
        variable
            .value
            .clone()
            .ok_or_else(|| EngineError::MissingValue(format!("{} has no value", qualname)))
    }

    pub fn set(&mut self, kind: FrameKind, ident: &str, value: Value) -> Result<()> {
        self.frame_mut(kind)?.get_mut(ident)?.value = Some(value);
        Ok(())
    }

    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    pub fn push_temporary_to_local(&mut self) -> Result<()> {
        let frame = self
            .temporary
            .take()
            .ok_or(EngineError::FrameUnavailable("TF".to_string()))?;
        self.locals.push(frame);
        Ok(())
    }

    pub fn pop_local_to_temporary(&mut self) -> Result<()> {
        let frame = self.locals.pop().ok_or(EngineError::FrameUnavailable("LF".to_string()))?;
        self.temporary = Some(frame);
        Ok(())
    }

    pub fn initialized_variable_count(&self) -> usize {
        let mut total = self.global.initialized_count();
        if let Some(tf) = &self.temporary {
            total += tf.initialized_count();
        }
        for lf in &self.locals {
            total += lf.initialized_count();
        }
        total
    }
}
