//! Contrato de listener del bus de pasos.
//!
//! Los listeners son observadores puros: reciben los objetos de valor del
//! árbol y no mutan el estado del bus. La notificación es síncrona y en orden
//! de registro. Un listener que entra en pánico queda contenido: se registra
//! el incidente y los listeners restantes siguen observando el evento.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::model::{FailureDetail, StepDescription, StepNode, TestOutcome};

/// Observador de los eventos del bus. Todos los métodos tienen implementación
/// vacía por defecto; cada listener implementa solo lo que le interesa.
pub trait StepListener {
    fn test_started(&mut self, _title: &str) {}
    fn test_finished(&mut self, _outcome: &TestOutcome) {}
    fn test_failed(&mut self, _outcome: &TestOutcome, _failure: &FailureDetail) {}
    fn test_ignored(&mut self, _outcome: &TestOutcome) {}
    fn step_started(&mut self, _description: &StepDescription) {}
    fn step_finished(&mut self, _step: &StepNode) {}
    fn step_failed(&mut self, _step: &StepNode, _failure: &FailureDetail) {}
    fn step_ignored(&mut self, _step: &StepNode) {}
    fn step_pending(&mut self, _step: &StepNode) {}
}

/// Notifica a cada listener conteniendo pánicos individuales.
pub(crate) fn notify_each<F>(listeners: &mut [Box<dyn StepListener>], event: &str, mut f: F)
    where F: FnMut(&mut dyn StepListener)
{
    for (i, listener) in listeners.iter_mut().enumerate() {
        let outcome = catch_unwind(AssertUnwindSafe(|| f(listener.as_mut())));
        if outcome.is_err() {
            log::error!("listener #{i} panicked during {event}; remaining listeners still notified");
        }
    }
}
