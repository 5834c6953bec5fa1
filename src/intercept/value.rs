//! Unión tipada para el camino de retorno fluido tras omisión o fallo.
//!
//! Sustituye a la sonda "valor no nulo / receptor asignable / valor vacío"
//! del diseño original: el llamador distingue explícitamente entre un valor
//! real, una referencia al propio receptor (para encadenar) y un valor vacío
//! neutro.

use serde::{Deserialize, Serialize};

/// Valor de mejor esfuerzo devuelto por una operación interceptada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepValue<R> {
    /// Valor real devuelto por el cuerpo del paso.
    Real(R),
    /// El receptor mismo: la cadena fluida continúa sobre el proxy.
    SelfRef,
    /// Valor vacío neutro (no hay valor ni receptor utilizable).
    Empty,
}

impl<R> StepValue<R> {
    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self, StepValue::Real(_))
    }

    pub fn into_option(self) -> Option<R> {
        match self {
            StepValue::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn real_or(self, fallback: R) -> R {
        match self {
            StepValue::Real(v) => v,
            _ => fallback,
        }
    }

    pub fn real_or_else(self, fallback: impl FnOnce() -> R) -> R {
        match self {
            StepValue::Real(v) => v,
            _ => fallback(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> StepValue<U> {
        match self {
            StepValue::Real(v) => StepValue::Real(f(v)),
            StepValue::SelfRef => StepValue::SelfRef,
            StepValue::Empty => StepValue::Empty,
        }
    }
}
