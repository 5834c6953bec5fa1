//! Proxy de intercepción: envuelve una librería de pasos para que cada
//! operación expuesta emita eventos del bus sin que su autor lo llame.
//!
//! Procedimiento de decisión por invocación:
//! 1. helpers (`helper`) pasan de largo sin eventos;
//! 2. se resuelve la descripción (título > short-name > identificador
//!    humanizado, más argumentos renderizados);
//! 3. se emite `step_started`;
//! 4. si procede omitir (fallo previo, test pendiente, marca declarativa),
//!    el cuerpo se invoca igualmente bajo suspensión para descubrir la
//!    estructura anidada y cualquier fallo se descarta con log;
//! 5. si no, se invoca en real y el fallo queda registrado, nunca relanzado
//!    más allá de esta frontera (salvo los errores de estado, que sí abortan).
//!    Un pánico del cuerpo se contiene y se normaliza a `StepFault::error`.
//!
//! El cuerpo recibe `&mut InterceptedLibrary<T>`, de modo que los pasos
//! anidados vuelven a entrar por `call` y el paso exterior se promueve a
//! grupo en el bus.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use serde_json::Value;

use super::metadata::OperationTable;
use super::value::StepValue;
use crate::bus::{BusHandle, SuspensionScope};
use crate::errors::CoreTrackerError;
use crate::model::{StepDescription, StepFault};

/// Motivo por el que una invocación se cortocircuita.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    PreviousStepFailed,
    TestPending,
    DeclaredPending,
    DeclaredIgnored,
}

/// Envoltorio observable de una librería de pasos.
pub struct InterceptedLibrary<T> {
    library: String,
    inner: T,
    bus: BusHandle,
    table: OperationTable,
}

impl<T> InterceptedLibrary<T> {
    pub fn new(library: impl Into<String>, inner: T, bus: BusHandle, table: OperationTable) -> Self {
        Self { library: library.into(),
               inner,
               bus,
               table }
    }

    pub fn bus(&self) -> &BusHandle {
        &self.bus
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Operación auxiliar no-paso: pasa de largo, sin eventos.
    pub fn helper<R>(&mut self, body: impl FnOnce(&mut T) -> R) -> R {
        body(&mut self.inner)
    }

    /// Invoca el cuerpo conteniendo pánicos: un pánico es el throwable no
    /// controlado de un paso y se normaliza a `StepFault::error`.
    fn invoke_contained<R, F>(&mut self, body: F) -> Result<R, StepFault>
        where F: FnOnce(&mut Self) -> Result<R, StepFault>
    {
        match catch_unwind(AssertUnwindSafe(|| body(self))) {
            Ok(outcome) => outcome,
            Err(payload) => Err(StepFault::error(panic_message(payload.as_ref()))),
        }
    }

    fn skip_reason(&self, pending: bool, ignored: bool) -> Option<SkipReason> {
        let bus = self.bus.borrow();
        if bus.a_step_has_failed() {
            Some(SkipReason::PreviousStepFailed)
        } else if bus.current_test_is_pending() {
            Some(SkipReason::TestPending)
        } else if pending {
            Some(SkipReason::DeclaredPending)
        } else if ignored {
            Some(SkipReason::DeclaredIgnored)
        } else {
            None
        }
    }

    /// Invoca una operación de paso a través del bus.
    ///
    /// Devuelve el valor de mejor esfuerzo: `Real` si el cuerpo produjo valor,
    /// `SelfRef` si la cadena fluida debe continuar sobre el receptor. Los
    /// fallos del cuerpo quedan registrados como resultado, nunca relanzados.
    pub fn call<R, F>(&mut self,
                      operation: &str,
                      args: Vec<Value>,
                      body: F)
                      -> Result<StepValue<R>, CoreTrackerError>
        where F: FnOnce(&mut Self) -> Result<R, StepFault>
    {
        let meta = self.table.resolve(operation);
        let description = StepDescription::resolved(&self.library,
                                                    operation,
                                                    meta.title.as_deref(),
                                                    meta.short_name.as_deref(),
                                                    args,
                                                    meta.group);
        let bus = Rc::clone(&self.bus);
        bus.borrow_mut().step_started(description)?;

        match self.skip_reason(meta.pending, meta.ignored) {
            Some(reason) => {
                // Invocación en seco: la estructura anidada se descubre igual,
                // los efectos externos quedan suspendidos.
                let dry = {
                    let _scope = SuspensionScope::enter(&bus)?;
                    self.invoke_contained(body)
                };
                let value = match dry {
                    Ok(v) => StepValue::Real(v),
                    Err(fault) => {
                        log::debug!("discarded failure during dry run of '{operation}': {fault}");
                        StepValue::SelfRef
                    }
                };
                match reason {
                    SkipReason::DeclaredPending => bus.borrow_mut().step_pending()?,
                    _ => bus.borrow_mut().step_ignored()?,
                }
                Ok(value)
            }
            None => match self.invoke_contained(body) {
                Ok(v) => {
                    bus.borrow_mut().step_finished()?;
                    Ok(StepValue::Real(v))
                }
                Err(fault) => {
                    // Fallo de aserción o error normalizado: se registra y la
                    // cadena fluida continúa sobre el receptor sin relanzar.
                    bus.borrow_mut().step_failed(fault)?;
                    Ok(StepValue::SelfRef)
                }
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "step body panicked".to_string()
    }
}
