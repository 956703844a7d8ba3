//! Bound handler arguments.

use std::any::type_name;

use thiserror::Error;

use crate::binding::params::BoundValue;

/// A handler asked for an argument it was not given.
///
/// Raised after binding succeeded, so it indicates a registration mistake
/// (declared and requested types disagree) and surfaces as a handler fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("no parameter named '{0}' was declared")]
    Unknown(String),

    #[error("argument '{0}' was already taken")]
    AlreadyTaken(String),

    #[error("argument '{name}' was declared as {declared}, requested as {requested}")]
    TypeMismatch {
        name: String,
        declared: &'static str,
        requested: &'static str,
    },
}

/// Ordered, typed arguments produced by the binder.
///
/// Each value can be taken exactly once.
#[derive(Default)]
pub struct Arguments {
    slots: Vec<Slot>,
}

struct Slot {
    name: String,
    declared: &'static str,
    value: Option<BoundValue>,
}

impl Arguments {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &str, declared: &'static str, value: BoundValue) {
        self.slots.push(Slot {
            name: name.to_string(),
            declared,
            value: Some(value),
        });
    }

    /// Take the argument bound for parameter `name`.
    pub fn take<T: 'static>(&mut self, name: &str) -> Result<T, ArgumentError> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.name == name)
            .ok_or_else(|| ArgumentError::Unknown(name.to_string()))?;
        self.take_at(index)
    }

    /// Take the argument at declaration position `index`.
    pub fn take_at<T: 'static>(&mut self, index: usize) -> Result<T, ArgumentError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or_else(|| ArgumentError::Unknown(format!("#{}", index)))?;
        let value = slot
            .value
            .take()
            .ok_or_else(|| ArgumentError::AlreadyTaken(slot.name.clone()))?;

        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(original) => {
                slot.value = Some(original);
                Err(ArgumentError::TypeMismatch {
                    name: slot.name.clone(),
                    declared: slot.declared,
                    requested: type_name::<T>(),
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
