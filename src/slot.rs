use std::ffi::OsStr;

use crate::argument::{Argument, ArgumentMetadata};
use crate::error::ErrorStatus;
use crate::runtime::{Consumed, Cursor};
use crate::values::{ArgValue, Value};

/// A declared argument of any value type, as stored by the parser.
#[derive(Debug)]
pub enum Slot<'a> {
    Str(Argument<'a, String>),
    Int(Argument<'a, i32>),
    Flag(Argument<'a, bool>),
}

macro_rules! dispatch {
    ($self:expr, $arg:ident => $e:expr) => {
        match $self {
            Slot::Str($arg) => $e,
            Slot::Int($arg) => $e,
            Slot::Flag($arg) => $e,
        }
    };
}

impl Slot<'_> {
    #[must_use]
    pub fn metadata(&self) -> &ArgumentMetadata {
        dispatch!(self, arg => arg.metadata())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    /// The type label for help. Empty for flags.
    #[must_use]
    pub fn type_label(&self) -> &'static str {
        match self {
            Slot::Str(_) => String::TYPE_NAME,
            Slot::Int(_) => i32::TYPE_NAME,
            Slot::Flag(_) => bool::TYPE_NAME,
        }
    }

    /// The name of the stored value type, as in [`Value::type_name`].
    #[must_use]
    pub fn value_type(&self) -> &'static str {
        match self {
            Slot::Str(_) => "string",
            Slot::Int(_) => "int",
            Slot::Flag(_) => "bool",
        }
    }

    /// The printable default, if one is set.
    #[must_use]
    pub fn default_string(&self) -> Option<String> {
        dispatch!(self, arg => arg.default_string())
    }

    #[must_use]
    pub fn value(&self, index: usize) -> Option<Value> {
        dispatch!(self, arg => arg.value(index).cloned().map(ArgValue::into_value))
    }

    #[must_use]
    pub fn value_count(&self) -> usize {
        dispatch!(self, arg => arg.values().len())
    }

    pub fn is_correct(&mut self) -> bool {
        dispatch!(self, arg => arg.is_correct())
    }

    pub(crate) fn consume_from<'s>(
        &mut self,
        first: &'s OsStr,
        index: usize,
        cursor: &Cursor<'s, '_>,
    ) -> Consumed<'s> {
        dispatch!(self, arg => arg.consume_from(first, index, cursor))
    }

    pub(crate) fn fail(&mut self, status: ErrorStatus) {
        dispatch!(self, arg => arg.fail(status))
    }

    pub(crate) fn wants_positional(&self) -> bool {
        dispatch!(self, arg => arg.wants_positional())
    }

    /// A flag that takes no value token.
    pub(crate) fn is_switch(&self) -> bool {
        let meta = self.metadata();
        meta.is_flag && !meta.is_multi_value
    }

    pub(crate) fn raise(&mut self) {
        if let Slot::Flag(arg) = self {
            arg.raise();
        }
    }
}
