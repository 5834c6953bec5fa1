//! Taxonomía de fallos de un paso y su detalle diagnóstico.
//!
//! `StepFault` distingue el fallo de aserción (FAILURE) de cualquier otro
//! throwable no controlado (ERROR); ambos cuentan en la misma categoría al
//! agregar. `FailureDetail` es el registro que queda adjunto al paso.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::result::TestResult;

/// Cadena de causas de un fallo (mensaje + causa anidada opcional).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCause {
    pub message: String,
    pub cause: Option<Box<FailureCause>>,
}

impl FailureCause {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), cause: None }
    }

    pub fn with_cause(message: impl Into<String>, cause: FailureCause) -> Self {
        Self { message: message.into(), cause: Some(Box::new(cause)) }
    }
}

impl std::fmt::Display for FailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Fallo lanzado por el cuerpo de un paso.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepFault {
    /// Aserción fallida (desajuste esperado/observado).
    #[error("assertion failed: {0}")]
    Failure(FailureCause),
    /// Cualquier otro fallo; se normaliza a la categoría contada FAILURE.
    #[error("step error: {0}")]
    Error(FailureCause),
}

impl StepFault {
    pub fn assertion(message: impl Into<String>) -> Self {
        StepFault::Failure(FailureCause::new(message))
    }

    pub fn error(message: impl Into<String>) -> Self {
        StepFault::Error(FailureCause::new(message))
    }

    pub fn cause(&self) -> &FailureCause {
        match self {
            StepFault::Failure(c) | StepFault::Error(c) => c,
        }
    }

    /// Resultado que este fallo induce en el paso.
    pub fn result(&self) -> TestResult {
        match self {
            StepFault::Failure(_) => TestResult::Failure,
            StepFault::Error(_) => TestResult::Error,
        }
    }
}

/// Detalle registrado junto al paso que falló.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    /// Mensaje preferido para diagnóstico (ver `from_fault`).
    pub message: String,
    pub cause: FailureCause,
    pub result: TestResult,
}

impl FailureDetail {
    /// Construye el detalle prefiriendo el mensaje de la causa anidada cuando
    /// el fallo envuelve exactamente una causa (convención habitual de los
    /// wrappers de aserción). Cadenas más profundas conservan el mensaje
    /// externo.
    pub fn from_fault(fault: &StepFault) -> Self {
        let cause = fault.cause().clone();
        let message = match &cause.cause {
            Some(inner) if inner.cause.is_none() => inner.message.clone(),
            _ => cause.message.clone(),
        };
        Self { message, cause, result: fault.result() }
    }
}
