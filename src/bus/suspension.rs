//! Pila de suspensión: decide si el cuerpo de un paso ejecuta sus efectos
//! visibles. "Suspender" significa omitir efectos, nunca ceder control.

use serde::{Deserialize, Serialize};

use crate::errors::CoreTrackerError;

/// Compuerta push/pop. La estructura del paso se sigue descubriendo aunque la
/// pila esté activa; solo se omiten los efectos externos.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct SuspensionStack {
    depth: usize,
}

impl SuspensionStack {
    pub fn push(&mut self) {
        self.depth += 1;
    }

    pub fn pop(&mut self) -> Result<(), CoreTrackerError> {
        if self.depth == 0 {
            return Err(CoreTrackerError::UnbalancedSuspensionPop);
        }
        self.depth -= 1;
        Ok(())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub fn clear(&mut self) {
        self.depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_balances() {
        let mut stack = SuspensionStack::default();
        assert!(!stack.is_active());
        stack.push();
        stack.push();
        assert!(stack.is_active());
        stack.pop().expect("depth 2");
        stack.pop().expect("depth 1");
        assert!(!stack.is_active());
    }

    #[test]
    fn pop_on_empty_stack_is_invalid_state() {
        let mut stack = SuspensionStack::default();
        assert!(matches!(stack.pop(), Err(CoreTrackerError::UnbalancedSuspensionPop)));
    }
}
